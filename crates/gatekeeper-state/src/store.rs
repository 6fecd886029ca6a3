//! StateStore — redb-backed persistence for Gatekeeper.
//!
//! Provides the backend primitives the rest of the crate coordinates:
//! collection listing and creation, typed point reads/writes, batched
//! writes, per-day range scans over time-series collections, and the
//! expiry catalog plus sweep. All values are JSON-serialized into redb's
//! `&[u8]` value columns. The store supports both on-disk and in-memory
//! backends (the latter for testing).

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, TableHandle, WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Maximum records written per transaction by batched writes.
pub const BATCH_WRITE_LIMIT: usize = 25;

type KeyedTable<'a> = TableDefinition<'a, &'static str, &'static [u8]>;
type CompositeTable<'a> = TableDefinition<'a, (&'static str, &'static str), &'static [u8]>;

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_catalog()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_catalog()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create the internal expiry catalog. Collections are left to the provisioner.
    fn ensure_catalog(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(EXPIRY_SETTINGS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Begin a write transaction that fails instead of implicitly creating
    /// `collection` when it has not been provisioned.
    fn begin_write_on(&self, collection: &str) -> StateResult<WriteTransaction> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let exists = txn
            .list_tables()
            .map_err(map_err!(Table))?
            .any(|handle| handle.name() == collection);
        if !exists {
            txn.abort().map_err(map_err!(Transaction))?;
            return Err(StateError::NotFound(format!("collection {collection}")));
        }
        Ok(txn)
    }

    // ── Collections ────────────────────────────────────────────────

    /// Names of all provisioned collections.
    pub fn list_collections(&self) -> StateResult<Vec<String>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let names = txn
            .list_tables()
            .map_err(map_err!(Table))?
            .map(|handle| handle.name().to_string())
            .filter(|name| !name.starts_with(INTERNAL_PREFIX))
            .collect();
        Ok(names)
    }

    pub fn has_collection(&self, name: &str) -> StateResult<bool> {
        Ok(self.list_collections()?.iter().any(|existing| existing == name))
    }

    /// Create a collection with the key layout of `schema`. Opening an
    /// existing table leaves its contents untouched.
    pub fn create_collection(&self, schema: &CollectionSchema) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        if schema.is_composite() {
            txn.open_table(composite_table(schema.name))
                .map_err(map_err!(Table))?;
        } else {
            txn.open_table(keyed_table(schema.name))
                .map_err(map_err!(Table))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(collection = schema.name, "collection created");
        Ok(())
    }

    /// Poll until `name` is visible to readers, up to `attempts` times.
    pub fn wait_for_collection(
        &self,
        name: &str,
        attempts: u32,
        interval: Duration,
    ) -> StateResult<()> {
        for attempt in 1..=attempts.max(1) {
            if self.has_collection(name)? {
                debug!(collection = name, attempt, "collection ready");
                return Ok(());
            }
            std::thread::sleep(interval);
        }
        Err(StateError::NotReady(name.to_string()))
    }

    // ── Generic record access ──────────────────────────────────────

    fn put_keyed<T: Serialize>(&self, def: KeyedTable<'_>, key: &str, record: &T) -> StateResult<()> {
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.begin_write_on(def.name())?;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            table.insert(key, value.as_slice()).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get_keyed<T: DeserializeOwned>(&self, def: KeyedTable<'_>, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let record = serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn list_keyed<T: DeserializeOwned>(&self, def: KeyedTable<'_>) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            results.push(serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?);
        }
        Ok(results)
    }

    fn put_composite<T: Serialize>(
        &self,
        def: CompositeTable<'_>,
        key: (&str, &str),
        record: &T,
    ) -> StateResult<()> {
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.begin_write_on(def.name())?;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            table.insert(key, value.as_slice()).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// All records of one partition, in sort-key order.
    fn list_partition<T: DeserializeOwned>(
        &self,
        def: CompositeTable<'_>,
        partition: &str,
    ) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.range((partition, "")..).map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().0 != partition {
                break;
            }
            results.push(serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?);
        }
        Ok(results)
    }

    // ── Residents ──────────────────────────────────────────────────

    /// Insert or replace a resident.
    pub fn put_resident(&self, resident: &Resident) -> StateResult<()> {
        self.put_keyed(RESIDENTS, &resident.license_plate, resident)?;
        debug!(plate = %resident.license_plate, "resident stored");
        Ok(())
    }

    pub fn get_resident(&self, plate: &str) -> StateResult<Option<Resident>> {
        self.get_keyed(RESIDENTS, plate)
    }

    pub fn list_residents(&self) -> StateResult<Vec<Resident>> {
        self.list_keyed(RESIDENTS)
    }

    /// Write residents in transactions of at most [`BATCH_WRITE_LIMIT`]
    /// records. Chunks already committed stay committed if a later one fails.
    pub fn put_residents_batch(&self, residents: &[Resident]) -> StateResult<usize> {
        let mut written = 0;
        for chunk in residents.chunks(BATCH_WRITE_LIMIT) {
            let values = chunk
                .iter()
                .map(|r| serde_json::to_vec(r).map(|v| (r.license_plate.as_str(), v)))
                .collect::<Result<Vec<_>, _>>()
                .map_err(map_err!(Serialize))?;
            let txn = self.begin_write_on(RESIDENT_SCHEMA.name)?;
            {
                let mut table = txn.open_table(RESIDENTS).map_err(map_err!(Table))?;
                for (key, value) in &values {
                    table.insert(*key, value.as_slice()).map_err(map_err!(Write))?;
                }
            }
            txn.commit().map_err(map_err!(Transaction))?;
            written += chunk.len();
            debug!(batch = chunk.len(), written, "resident batch stored");
        }
        Ok(written)
    }

    // ── Guests ─────────────────────────────────────────────────────

    /// Insert or unconditionally replace the grant for its plate.
    pub fn put_guest(&self, grant: &GuestGrant) -> StateResult<()> {
        self.put_keyed(GUESTS, &grant.license_plate, grant)?;
        debug!(
            plate = %grant.license_plate,
            expiration_ttl = grant.expiration_ttl,
            "guest grant stored"
        );
        Ok(())
    }

    pub fn get_guest(&self, plate: &str) -> StateResult<Option<GuestGrant>> {
        self.get_keyed(GUESTS, plate)
    }

    pub fn list_guests(&self) -> StateResult<Vec<GuestGrant>> {
        self.list_keyed(GUESTS)
    }

    // ── Events ─────────────────────────────────────────────────────

    /// Record an access event; an event with the same date and timestamp is replaced.
    pub fn put_access_event(&self, event: &AccessEvent) -> StateResult<()> {
        self.put_composite(ACCESS_EVENTS, event.table_key(), event)
    }

    /// Access events of one day, oldest first.
    pub fn list_access_events(&self, event_date: &str) -> StateResult<Vec<AccessEvent>> {
        self.list_partition(ACCESS_EVENTS, event_date)
    }

    pub fn put_trespass_event(&self, event: &TrespassEvent) -> StateResult<()> {
        self.put_composite(TRESPASS_EVENTS, event.table_key(), event)
    }

    pub fn list_trespass_events(&self, event_date: &str) -> StateResult<Vec<TrespassEvent>> {
        self.list_partition(TRESPASS_EVENTS, event_date)
    }

    // ── Expiry ─────────────────────────────────────────────────────

    /// Mark `attribute` as the expiry attribute of `collection`.
    ///
    /// Fails with [`StateError::ExpiryAlreadyEnabled`] if the same attribute
    /// is already registered and [`StateError::ExpiryConflict`] if another one is.
    pub fn enable_expiry(&self, collection: &str, attribute: &str) -> StateResult<()> {
        let txn = self.begin_write_on(collection)?;
        let existing = txn
            .open_table(EXPIRY_SETTINGS)
            .map_err(map_err!(Table))?
            .get(collection)
            .map_err(map_err!(Read))?
            .map(|guard| guard.value().to_string());
        if let Some(existing) = existing {
            txn.abort().map_err(map_err!(Transaction))?;
            let err = if existing == attribute {
                StateError::ExpiryAlreadyEnabled {
                    collection: collection.to_string(),
                    attribute: attribute.to_string(),
                }
            } else {
                StateError::ExpiryConflict {
                    collection: collection.to_string(),
                    existing,
                    requested: attribute.to_string(),
                }
            };
            return Err(err);
        }
        {
            let mut table = txn.open_table(EXPIRY_SETTINGS).map_err(map_err!(Table))?;
            table.insert(collection, attribute).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        info!(%collection, %attribute, "automatic expiry enabled");
        Ok(())
    }

    /// Expiry attribute per collection, for every collection that has one.
    pub fn expiry_settings(&self) -> StateResult<BTreeMap<String, String>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(EXPIRY_SETTINGS).map_err(map_err!(Table))?;
        let mut settings = BTreeMap::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (collection, attribute) = entry.map_err(map_err!(Read))?;
            settings.insert(collection.value().to_string(), attribute.value().to_string());
        }
        Ok(settings)
    }

    /// Remove every record whose expiry attribute is an integer `<= now`
    /// (Unix seconds), across all expiry-enabled collections. Records
    /// without a numeric attribute are kept. Returns removals per collection.
    pub fn sweep_expired(&self, now: i64) -> StateResult<BTreeMap<String, usize>> {
        let mut removed = BTreeMap::new();
        for (collection, attribute) in self.expiry_settings()? {
            let Some(schema) = crate::tables::collection(&collection) else {
                warn!(%collection, "expiry enabled on unknown collection, skipping");
                continue;
            };
            let count = if schema.is_composite() {
                self.sweep_composite(composite_table(schema.name), &attribute, now)?
            } else {
                self.sweep_keyed(keyed_table(schema.name), &attribute, now)?
            };
            if count > 0 {
                info!(%collection, count, "expired records removed");
            }
            removed.insert(collection, count);
        }
        Ok(removed)
    }

    // Scan and removal share one write transaction, so a record re-written
    // between the two cannot be lost.
    fn sweep_keyed(&self, def: KeyedTable<'_>, attribute: &str, now: i64) -> StateResult<usize> {
        let txn = self.begin_write_on(def.name())?;
        let count;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            let mut expired = Vec::new();
            for entry in table.iter().map_err(map_err!(Read))? {
                let (key, value) = entry.map_err(map_err!(Read))?;
                if is_expired(value.value(), attribute, now) {
                    expired.push(key.value().to_string());
                }
            }
            for key in &expired {
                table.remove(key.as_str()).map_err(map_err!(Write))?;
            }
            count = expired.len();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(count)
    }

    fn sweep_composite(&self, def: CompositeTable<'_>, attribute: &str, now: i64) -> StateResult<usize> {
        let txn = self.begin_write_on(def.name())?;
        let count;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            let mut expired = Vec::new();
            for entry in table.iter().map_err(map_err!(Read))? {
                let (key, value) = entry.map_err(map_err!(Read))?;
                if is_expired(value.value(), attribute, now) {
                    let (partition, sort) = key.value();
                    expired.push((partition.to_string(), sort.to_string()));
                }
            }
            for (partition, sort) in &expired {
                table
                    .remove((partition.as_str(), sort.as_str()))
                    .map_err(map_err!(Write))?;
            }
            count = expired.len();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(count)
    }
}

fn is_expired(document: &[u8], attribute: &str, now: i64) -> bool {
    serde_json::from_slice::<serde_json::Value>(document)
        .ok()
        .and_then(|doc| doc.get(attribute).and_then(serde_json::Value::as_i64))
        .is_some_and(|expires_at| expires_at <= now)
}
