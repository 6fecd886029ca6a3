//! Collection catalog and redb table definitions for the Gatekeeper store.
//!
//! Every collection stores JSON-serialized records in a `&[u8]` value
//! column. Partition-only collections use `&str` keys; time-series
//! collections use `(event_date, event_timestamp)` tuple keys.

use redb::TableDefinition;

/// Key and expiry layout of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSchema {
    /// Collection (redb table) name.
    pub name: &'static str,
    /// Attribute holding the partition key.
    pub partition_key: &'static str,
    /// Attribute holding the sort key, if the key is composite.
    pub sort_key: Option<&'static str>,
    /// Numeric Unix-seconds attribute that drives automatic expiry.
    pub expiry_attribute: Option<&'static str>,
}

impl CollectionSchema {
    pub fn is_composite(&self) -> bool {
        self.sort_key.is_some()
    }
}

/// Permanent resident registry, keyed by `license_plate`.
pub const RESIDENT_SCHEMA: CollectionSchema = CollectionSchema {
    name: "residents",
    partition_key: "license_plate",
    sort_key: None,
    expiry_attribute: None,
};

/// Time-bound guest grants, keyed by `license_plate`, expiring on `expiration_ttl`.
pub const GUEST_SCHEMA: CollectionSchema = CollectionSchema {
    name: "guests",
    partition_key: "license_plate",
    sort_key: None,
    expiry_attribute: Some("expiration_ttl"),
};

/// Gate access events, keyed by `(event_date, event_timestamp)`.
pub const ACCESS_EVENT_SCHEMA: CollectionSchema = CollectionSchema {
    name: "access_events",
    partition_key: "event_date",
    sort_key: Some("event_timestamp"),
    expiry_attribute: None,
};

/// Trespassing events, keyed by `(event_date, event_timestamp)`.
pub const TRESPASS_EVENT_SCHEMA: CollectionSchema = CollectionSchema {
    name: "trespass_events",
    partition_key: "event_date",
    sort_key: Some("event_timestamp"),
    expiry_attribute: None,
};

/// All collections, in provisioning order.
pub const COLLECTIONS: [CollectionSchema; 4] = [
    RESIDENT_SCHEMA,
    GUEST_SCHEMA,
    ACCESS_EVENT_SCHEMA,
    TRESPASS_EVENT_SCHEMA,
];

/// Look up a collection's schema by name.
pub fn collection(name: &str) -> Option<&'static CollectionSchema> {
    COLLECTIONS.iter().find(|schema| schema.name == name)
}

/// Prefix reserved for internal tables; never reported as a collection.
pub const INTERNAL_PREFIX: &str = "__";

/// Expiry settings keyed by collection name, valued by the expiry attribute.
pub const EXPIRY_SETTINGS: TableDefinition<&str, &str> =
    TableDefinition::new("__expiry_settings");

pub const RESIDENTS: TableDefinition<&str, &[u8]> = TableDefinition::new(RESIDENT_SCHEMA.name);

pub const GUESTS: TableDefinition<&str, &[u8]> = TableDefinition::new(GUEST_SCHEMA.name);

pub const ACCESS_EVENTS: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new(ACCESS_EVENT_SCHEMA.name);

pub const TRESPASS_EVENTS: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new(TRESPASS_EVENT_SCHEMA.name);

/// Table definition for a partition-only collection given by name.
pub fn keyed_table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// Table definition for a composite-key collection given by name.
pub fn composite_table(
    name: &str,
) -> TableDefinition<'_, (&'static str, &'static str), &'static [u8]> {
    TableDefinition::new(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_key_layout() {
        assert_eq!(COLLECTIONS.len(), 4);
        assert!(!collection("residents").unwrap().is_composite());
        assert!(!collection("guests").unwrap().is_composite());
        assert!(collection("access_events").unwrap().is_composite());
        assert!(collection("trespass_events").unwrap().is_composite());
        assert!(collection("nope").is_none());
    }

    #[test]
    fn only_guests_expire() {
        let expiring: Vec<_> = COLLECTIONS
            .iter()
            .filter_map(|s| s.expiry_attribute.map(|a| (s.name, a)))
            .collect();
        assert_eq!(expiring, vec![("guests", "expiration_ttl")]);
    }
}
