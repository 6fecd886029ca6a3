//! Guest grant lifecycle.

use gatekeeper_core::{GuestCreate, GuestResponse};
use gatekeeper_state::GrantWriter;
use tracing::debug;

use crate::error::GrantResult;

/// Creates guest grants through a [`GrantWriter`].
pub struct GuestService<W> {
    writer: W,
}

impl<W: GrantWriter> GuestService<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Store a grant for the request's plate and return the confirmation.
    ///
    /// The request is assumed to have passed [`GuestCreate::validate`];
    /// storage failures propagate as `StorageUnavailable`.
    pub fn create_guest_grant(&self, request: &GuestCreate) -> GrantResult<GuestResponse> {
        let expiration_timestamp = self.writer.write_grant(
            &request.license_plate,
            &request.guest_name,
            &request.added_by,
        )?;
        debug!(plate = %request.license_plate, expiration_timestamp, "guest grant confirmed");
        Ok(GuestResponse::confirmed(
            request.license_plate.clone(),
            request.guest_name.clone(),
            expiration_timestamp,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use gatekeeper_state::{StateError, StateResult};

    use crate::error::GrantError;

    /// Writer double returning a fixed expiry and capturing its arguments.
    struct FixedWriter {
        expiration: i64,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl GrantWriter for FixedWriter {
        fn write_grant(&self, plate: &str, guest_name: &str, granted_by: &str) -> StateResult<i64> {
            self.calls.lock().unwrap().push((
                plate.to_string(),
                guest_name.to_string(),
                granted_by.to_string(),
            ));
            Ok(self.expiration)
        }
    }

    struct FailingWriter;

    impl GrantWriter for FailingWriter {
        fn write_grant(&self, _: &str, _: &str, _: &str) -> StateResult<i64> {
            Err(StateError::Transaction("connection reset".into()))
        }
    }

    #[test]
    fn maps_request_fields_to_writer_and_response() {
        let writer = FixedWriter {
            expiration: 1_700_086_400,
            calls: Mutex::new(Vec::new()),
        };
        let service = GuestService::new(&writer);
        let request = GuestCreate::new("987-65-432", "Jane Smith", "123-45-678");

        let response = service.create_guest_grant(&request).unwrap();

        assert_eq!(
            response,
            GuestResponse {
                license_plate: "987-65-432".into(),
                guest_name: "Jane Smith".into(),
                message: "Guest added successfully and will have access for 24 hours.".into(),
                expiration_timestamp: 1_700_086_400,
            }
        );
        assert_eq!(
            writer.calls.lock().unwrap().as_slice(),
            [("987-65-432".to_string(), "Jane Smith".to_string(), "123-45-678".to_string())]
        );
    }

    #[test]
    fn storage_failure_propagates_unchanged() {
        let service = GuestService::new(FailingWriter);
        let request = GuestCreate::new("987-65-432", "Jane Smith", "123-45-678");

        let err = service.create_guest_grant(&request).unwrap_err();
        assert!(matches!(
            err,
            GrantError::StorageUnavailable(StateError::Transaction(ref msg)) if msg == "connection reset"
        ));
    }
}
