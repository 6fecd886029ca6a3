//! Access grant store — issues and reads time-bound guest grants.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::StateResult;
use crate::store::StateStore;
use crate::types::GuestGrant;

/// Writes a guest grant and reports when it expires.
pub trait GrantWriter {
    /// Persist a grant for `plate` created now, replacing any previous one.
    /// Returns the grant's `expiration_ttl` (Unix seconds).
    fn write_grant(&self, plate: &str, guest_name: &str, granted_by: &str) -> StateResult<i64>;
}

impl<W: GrantWriter + ?Sized> GrantWriter for &W {
    fn write_grant(&self, plate: &str, guest_name: &str, granted_by: &str) -> StateResult<i64> {
        (**self).write_grant(plate, guest_name, granted_by)
    }
}

/// Stateless grant coordinator over a [`StateStore`] handle.
#[derive(Clone)]
pub struct AccessGrantStore {
    state: StateStore,
}

impl AccessGrantStore {
    pub fn new(state: StateStore) -> Self {
        Self { state }
    }

    /// Issue a grant created at `now`. One point write; last writer wins.
    pub fn write_grant_at(
        &self,
        plate: &str,
        guest_name: &str,
        granted_by: &str,
        now: DateTime<Utc>,
    ) -> StateResult<GuestGrant> {
        let grant = GuestGrant::issue(plate, guest_name, granted_by, now);
        self.state.put_guest(&grant)?;
        info!(
            %plate,
            added_by = %granted_by,
            expiration_ttl = grant.expiration_ttl,
            "guest grant issued"
        );
        Ok(grant)
    }

    /// The stored grant for `plate`, expired or not.
    pub fn get_grant(&self, plate: &str) -> StateResult<Option<GuestGrant>> {
        self.state.get_guest(plate)
    }

    /// The grant for `plate` if it is still valid at Unix time `now`. A
    /// grant past its expiry is hidden even if the sweep has not removed it.
    pub fn active_grant(&self, plate: &str, now: i64) -> StateResult<Option<GuestGrant>> {
        Ok(self.get_grant(plate)?.filter(|grant| grant.is_active(now)))
    }
}

impl GrantWriter for AccessGrantStore {
    fn write_grant(&self, plate: &str, guest_name: &str, granted_by: &str) -> StateResult<i64> {
        let grant = self.write_grant_at(plate, guest_name, granted_by, Utc::now())?;
        Ok(grant.expiration_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::error::StateError;
    use crate::schema::SchemaProvisioner;

    fn grant_store() -> AccessGrantStore {
        let state = StateStore::open_in_memory().unwrap();
        SchemaProvisioner::new(state.clone()).ensure_schema().unwrap();
        AccessGrantStore::new(state)
    }

    #[test]
    fn write_grant_expires_a_day_after_now() {
        let store = grant_store();
        let before = Utc::now().timestamp();
        let ttl = store.write_grant("987-65-432", "Jane Smith", "123-45-678").unwrap();
        let after = Utc::now().timestamp();

        assert!(ttl >= before + 86_400 && ttl <= after + 86_400);

        let stored = store.get_grant("987-65-432").unwrap().unwrap();
        assert_eq!(stored.expiration_ttl, ttl);
        assert_eq!(stored.added_by, "123-45-678");
    }

    #[test]
    fn regrant_overwrites_with_second_expiry() {
        let store = grant_store();
        let first = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();

        store
            .write_grant_at("987-65-432", "Jane Smith", "123-45-678", first)
            .unwrap();
        let latest = store
            .write_grant_at("987-65-432", "John Smith", "234-56-789", second)
            .unwrap();

        let stored = store.get_grant("987-65-432").unwrap().unwrap();
        assert_eq!(stored, latest);
        assert_eq!(stored.expiration_ttl, second.timestamp() + 86_400);
        assert_eq!(stored.guest_name, "John Smith");
        assert_eq!(store.state.list_guests().unwrap().len(), 1);
    }

    #[test]
    fn unknown_added_by_is_accepted() {
        let store = grant_store();
        assert!(store.write_grant("987-65-432", "Jane Smith", "not-a-resident").is_ok());
    }

    #[test]
    fn active_grant_hides_expired_unswept_grant() {
        let store = grant_store();
        let issued = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let grant = store
            .write_grant_at("987-65-432", "Jane Smith", "123-45-678", issued)
            .unwrap();

        assert!(store.active_grant("987-65-432", issued.timestamp()).unwrap().is_some());
        assert!(store.active_grant("987-65-432", grant.expiration_ttl).unwrap().is_none());
        assert!(store.get_grant("987-65-432").unwrap().is_some());
    }

    #[test]
    fn write_fails_when_schema_missing() {
        let store = AccessGrantStore::new(StateStore::open_in_memory().unwrap());
        let err = store.write_grant("987-65-432", "Jane Smith", "123-45-678").unwrap_err();
        assert!(matches!(err, StateError::NotFound(_)));
    }
}
