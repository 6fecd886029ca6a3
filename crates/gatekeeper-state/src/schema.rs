//! Idempotent schema provisioning.
//!
//! [`SchemaProvisioner::ensure_schema`] creates every collection of the
//! catalog that does not exist yet, waits for each new one to become
//! ready before moving on, then enables automatic expiry on collections
//! that declare an expiry attribute. Existing collections are never
//! touched. Failures on one collection are logged and reported but do not
//! stop the others; only an unreadable collection listing is fatal.

use std::time::Duration;

use gatekeeper_core::config::ProvisioningConfig;
use tracing::{error, info, warn};

use crate::error::{StateError, StateResult};
use crate::store::StateStore;
use crate::tables::{CollectionSchema, COLLECTIONS};

/// Backend operations the provisioner relies on.
pub trait SchemaBackend {
    fn list_collections(&self) -> StateResult<Vec<String>>;

    fn create_collection(&self, schema: &CollectionSchema) -> StateResult<()>;

    /// Block until `collection` accepts reads and writes.
    fn wait_until_ready(&self, collection: &str, policy: &ReadyPolicy) -> StateResult<()>;

    /// Fails with [`StateError::ExpiryAlreadyEnabled`] when already on.
    fn enable_expiry(&self, collection: &str, attribute: &str) -> StateResult<()>;
}

impl SchemaBackend for StateStore {
    fn list_collections(&self) -> StateResult<Vec<String>> {
        StateStore::list_collections(self)
    }

    fn create_collection(&self, schema: &CollectionSchema) -> StateResult<()> {
        StateStore::create_collection(self, schema)
    }

    fn wait_until_ready(&self, collection: &str, policy: &ReadyPolicy) -> StateResult<()> {
        self.wait_for_collection(collection, policy.attempts, policy.interval)
    }

    fn enable_expiry(&self, collection: &str, attribute: &str) -> StateResult<()> {
        StateStore::enable_expiry(self, collection, attribute)
    }
}

impl<B: SchemaBackend + ?Sized> SchemaBackend for &B {
    fn list_collections(&self) -> StateResult<Vec<String>> {
        (**self).list_collections()
    }

    fn create_collection(&self, schema: &CollectionSchema) -> StateResult<()> {
        (**self).create_collection(schema)
    }

    fn wait_until_ready(&self, collection: &str, policy: &ReadyPolicy) -> StateResult<()> {
        (**self).wait_until_ready(collection, policy)
    }

    fn enable_expiry(&self, collection: &str, attribute: &str) -> StateResult<()> {
        (**self).enable_expiry(collection, attribute)
    }
}

/// How long to wait for a freshly created collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ReadyPolicy {
    fn default() -> Self {
        Self::from(&ProvisioningConfig::default())
    }
}

impl From<&ProvisioningConfig> for ReadyPolicy {
    fn from(config: &ProvisioningConfig) -> Self {
        Self {
            attempts: config.ready_poll_attempts,
            interval: Duration::from_millis(config.ready_poll_interval_ms),
        }
    }
}

/// A collection the provisioner could not create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFailure {
    pub collection: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiryStatus {
    Enabled,
    AlreadyEnabled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryOutcome {
    pub collection: String,
    pub attribute: String,
    pub status: ExpiryStatus,
}

/// What one `ensure_schema` run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Collections created by this run.
    pub created: Vec<String>,
    /// Collections that already existed and were left alone.
    pub skipped: Vec<String>,
    pub failed: Vec<CollectionFailure>,
    pub expiry: Vec<ExpiryOutcome>,
}

impl ProvisionReport {
    /// True when every collection exists and every expiry setting is in place.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
            && self
                .expiry
                .iter()
                .all(|outcome| !matches!(outcome.status, ExpiryStatus::Failed(_)))
    }
}

/// Creates the collection catalog on a [`SchemaBackend`].
pub struct SchemaProvisioner<B> {
    backend: B,
    policy: ReadyPolicy,
    collections: Vec<CollectionSchema>,
}

impl<B: SchemaBackend> SchemaProvisioner<B> {
    /// Provisioner for the full Gatekeeper catalog.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: ReadyPolicy::default(),
            collections: COLLECTIONS.to_vec(),
        }
    }

    pub fn with_ready_policy(mut self, policy: ReadyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_collections(mut self, collections: Vec<CollectionSchema>) -> Self {
        self.collections = collections;
        self
    }

    /// Create missing collections and enable expiry. Safe to run repeatedly.
    pub fn ensure_schema(&self) -> StateResult<ProvisionReport> {
        let existing = self.backend.list_collections()?;
        let mut report = ProvisionReport::default();

        for schema in &self.collections {
            if existing.iter().any(|name| name == schema.name) {
                info!(collection = schema.name, "collection already exists, skipping");
                report.skipped.push(schema.name.to_string());
                continue;
            }

            info!(collection = schema.name, "creating collection");
            let created = self
                .backend
                .create_collection(schema)
                .and_then(|()| self.backend.wait_until_ready(schema.name, &self.policy));
            match created {
                Ok(()) => {
                    info!(collection = schema.name, "collection created");
                    report.created.push(schema.name.to_string());
                }
                Err(e) => {
                    error!(collection = schema.name, error = %e, "failed to create collection");
                    report.failed.push(CollectionFailure {
                        collection: schema.name.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        for schema in &self.collections {
            let Some(attribute) = schema.expiry_attribute else {
                continue;
            };
            if report.failed.iter().any(|f| f.collection == schema.name) {
                continue;
            }
            let status = self.enable_expiry(schema.name, attribute);
            report.expiry.push(ExpiryOutcome {
                collection: schema.name.to_string(),
                attribute: attribute.to_string(),
                status,
            });
        }

        Ok(report)
    }

    fn enable_expiry(&self, collection: &str, attribute: &str) -> ExpiryStatus {
        info!(%collection, %attribute, "enabling automatic expiry");
        match self.backend.enable_expiry(collection, attribute) {
            Ok(()) => ExpiryStatus::Enabled,
            Err(StateError::ExpiryAlreadyEnabled { .. }) => {
                info!(%collection, %attribute, "automatic expiry already enabled");
                ExpiryStatus::AlreadyEnabled
            }
            Err(e) => {
                warn!(%collection, %attribute, error = %e, "could not enable automatic expiry");
                ExpiryStatus::Failed(e.to_string())
            }
        }
    }
}
