//! Domain records for the Gatekeeper state store.
//!
//! All records are serializable to/from JSON for storage in redb tables.
//! Field names are part of the persisted format; `expiration_ttl` in
//! particular is read by the expiry sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatekeeper_core::time::{format_date, format_timestamp};
use gatekeeper_core::GRANT_DURATION_SECS;

/// Vehicle license plate, the primary identity of residents and guests.
pub type LicensePlate = String;

// ── Resident ──────────────────────────────────────────────────────

/// Permanent resident of the facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    pub license_plate: LicensePlate,
    pub owner_name: String,
    pub address: String,
    /// ISO-8601 UTC creation instant.
    pub created_at: String,
}

// ── Guest grant ───────────────────────────────────────────────────

/// Time-bound access permission for a visitor's vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestGrant {
    pub license_plate: LicensePlate,
    pub guest_name: String,
    /// Plate of the resident who authorized the grant. Not cross-checked.
    pub added_by: LicensePlate,
    /// ISO-8601 UTC creation instant.
    pub created_at: String,
    /// Unix timestamp (seconds) after which the grant is invalid and
    /// eligible for removal.
    pub expiration_ttl: i64,
}

impl GuestGrant {
    /// Build a grant created at `now`, valid for [`GRANT_DURATION_SECS`].
    pub fn issue(
        license_plate: &str,
        guest_name: &str,
        added_by: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            license_plate: license_plate.to_string(),
            guest_name: guest_name.to_string(),
            added_by: added_by.to_string(),
            created_at: format_timestamp(now),
            expiration_ttl: now.timestamp() + GRANT_DURATION_SECS,
        }
    }

    /// Whether the grant still admits the guest at Unix time `now`.
    pub fn is_active(&self, now: i64) -> bool {
        now < self.expiration_ttl
    }
}

// ── Events ────────────────────────────────────────────────────────

/// Gate decision recorded with an access event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    Resident,
    Guest,
    Denied,
}

/// One vehicle passing (or being refused at) the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// `YYYY-MM-DD`, partition key.
    pub event_date: String,
    /// `YYYY-MM-DDTHH:MM:SSZ`, sort key.
    pub event_timestamp: String,
    pub license_plate: LicensePlate,
    pub outcome: AccessOutcome,
}

impl AccessEvent {
    pub fn at(at: DateTime<Utc>, license_plate: &str, outcome: AccessOutcome) -> Self {
        Self {
            event_date: format_date(at),
            event_timestamp: format_timestamp(at),
            license_plate: license_plate.to_string(),
            outcome,
        }
    }

    pub fn table_key(&self) -> (&str, &str) {
        (&self.event_date, &self.event_timestamp)
    }
}

/// An unauthorized vehicle observed on the premises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrespassEvent {
    pub event_date: String,
    pub event_timestamp: String,
    pub license_plate: LicensePlate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TrespassEvent {
    pub fn at(at: DateTime<Utc>, license_plate: &str, note: Option<String>) -> Self {
        Self {
            event_date: format_date(at),
            event_timestamp: format_timestamp(at),
            license_plate: license_plate.to_string(),
            note,
        }
    }

    pub fn table_key(&self) -> (&str, &str) {
        (&self.event_date, &self.event_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn grant_expires_one_day_after_creation() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let grant = GuestGrant::issue("987-65-432", "Jane Smith", "123-45-678", now);

        assert_eq!(grant.created_at, "2025-06-01T12:00:00Z");
        assert_eq!(grant.expiration_ttl, now.timestamp() + 86_400);
        assert!(grant.is_active(now.timestamp()));
        assert!(grant.is_active(grant.expiration_ttl - 1));
        assert!(!grant.is_active(grant.expiration_ttl));
    }

    #[test]
    fn grant_json_uses_integer_ttl() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let grant = GuestGrant::issue("987-65-432", "Jane Smith", "123-45-678", now);
        let json = serde_json::to_value(&grant).unwrap();
        assert!(json["expiration_ttl"].is_i64());
        assert_eq!(json["added_by"], "123-45-678");
    }

    #[test]
    fn event_key_derives_from_single_instant() {
        let at = Utc.with_ymd_and_hms(2025, 3, 5, 23, 59, 59).unwrap();
        let event = AccessEvent::at(at, "123-45-678", AccessOutcome::Resident);
        assert_eq!(event.table_key(), ("2025-03-05", "2025-03-05T23:59:59Z"));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["outcome"], "resident");
    }

    #[test]
    fn trespass_note_is_optional() {
        let at = Utc.with_ymd_and_hms(2025, 3, 5, 1, 0, 0).unwrap();
        let event = TrespassEvent::at(at, "000-00-000", None);
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("note"));
        let back: TrespassEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
