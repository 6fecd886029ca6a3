use gatekeeper_core::{GateConfig, GuestCreate, GuestResponse};
use gatekeeper_service::{GrantResult, GuestService};
use gatekeeper_state::{AccessGrantStore, StateStore};

use super::open_store;

pub fn grant(
    config: &GateConfig,
    plate: String,
    name: String,
    added_by: String,
) -> anyhow::Result<()> {
    let request = GuestCreate {
        license_plate: plate,
        guest_name: name,
        added_by,
    };
    let store = open_store(config)?;
    let response = create(&store, &request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Validate at the boundary, then hand the request to the service.
fn create(store: &StateStore, request: &GuestCreate) -> GrantResult<GuestResponse> {
    request.validate()?;
    let service = GuestService::new(AccessGrantStore::new(store.clone()));
    service.create_guest_grant(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeeper_service::GrantError;
    use gatekeeper_state::SchemaProvisioner;

    #[test]
    fn empty_field_is_rejected_before_storage() {
        // Unprovisioned store: any write would fail with a storage error.
        let store = StateStore::open_in_memory().unwrap();
        let err = create(&store, &GuestCreate::new("987-65-432", "", "123-45-678")).unwrap_err();
        assert!(matches!(err, GrantError::Validation(_)));
    }

    #[test]
    fn unprovisioned_store_is_unavailable() {
        let store = StateStore::open_in_memory().unwrap();
        let err = create(&store, &GuestCreate::new("987-65-432", "Jane Smith", "123-45-678"))
            .unwrap_err();
        assert!(matches!(err, GrantError::StorageUnavailable(_)));
    }

    #[test]
    fn valid_request_is_stored() {
        let store = StateStore::open_in_memory().unwrap();
        SchemaProvisioner::new(store.clone()).ensure_schema().unwrap();

        let response =
            create(&store, &GuestCreate::new("987-65-432", "Jane Smith", "123-45-678")).unwrap();
        assert_eq!(response.guest_name, "Jane Smith");
        assert!(store.get_guest("987-65-432").unwrap().is_some());
    }
}
