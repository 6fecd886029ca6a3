//! gatekeeper-state — embedded state store for Gatekeeper.
//!
//! Backed by [redb](https://docs.rs/redb), holds the resident registry, the
//! time-bound guest grants, and the access/trespass event logs.
//!
//! # Architecture
//!
//! ```text
//! SchemaProvisioner ──► SchemaBackend (StateStore)
//! AccessGrantStore  ──► StateStore ──► redb tables
//! seed_residents    ──► StateStore::put_residents_batch
//! ExpirySweeper     ──► StateStore::sweep_expired
//! ```
//!
//! Each collection is a redb table whose value column holds a JSON document.
//! Partition-only collections are keyed by `&str`; time-series collections
//! use a `(event_date, event_timestamp)` tuple key, so a day's events are a
//! contiguous, chronologically ordered range.
//!
//! Collections are never created implicitly by writes: they exist only
//! after [`SchemaProvisioner::ensure_schema`] has run. Automatic expiry is
//! recorded per collection in an internal catalog table and enforced by
//! [`StateStore::sweep_expired`].
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across request handlers and the sweeper task.

pub mod error;
pub mod grants;
pub mod schema;
pub mod seed;
pub mod store;
pub mod sweeper;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use grants::{AccessGrantStore, GrantWriter};
pub use schema::{
    CollectionFailure, ExpiryOutcome, ExpiryStatus, ProvisionReport, ReadyPolicy, SchemaBackend,
    SchemaProvisioner,
};
pub use seed::{sample_residents, seed_residents};
pub use store::StateStore;
pub use sweeper::ExpirySweeper;
pub use tables::CollectionSchema;
pub use types::*;
