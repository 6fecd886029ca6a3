//! Request and response contracts shared across Gatekeeper crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long a guest grant stays valid, in seconds.
pub const GRANT_DURATION_SECS: i64 = 24 * 60 * 60;

/// Confirmation text returned with every successful grant.
pub const GRANT_CONFIRMATION_MESSAGE: &str =
    "Guest added successfully and will have access for 24 hours.";

/// A request field failed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
}

/// Body of a create-guest request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCreate {
    /// License plate of the guest's vehicle.
    pub license_plate: String,
    /// Name of the guest.
    pub guest_name: String,
    /// License plate of the resident who is adding the guest.
    pub added_by: String,
}

impl GuestCreate {
    pub fn new(
        license_plate: impl Into<String>,
        guest_name: impl Into<String>,
        added_by: impl Into<String>,
    ) -> Self {
        Self {
            license_plate: license_plate.into(),
            guest_name: guest_name.into(),
            added_by: added_by.into(),
        }
    }

    /// Reject requests with an empty or whitespace-only field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("license_plate", &self.license_plate),
            ("guest_name", &self.guest_name),
            ("added_by", &self.added_by),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyField(name));
            }
        }
        Ok(())
    }
}

/// Confirmation returned after a guest grant has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestResponse {
    pub license_plate: String,
    pub guest_name: String,
    pub message: String,
    /// Unix timestamp (seconds) after which the grant is no longer valid.
    pub expiration_timestamp: i64,
}

impl GuestResponse {
    pub fn confirmed(
        license_plate: impl Into<String>,
        guest_name: impl Into<String>,
        expiration_timestamp: i64,
    ) -> Self {
        Self {
            license_plate: license_plate.into(),
            guest_name: guest_name.into(),
            message: GRANT_CONFIRMATION_MESSAGE.to_string(),
            expiration_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_request_passes() {
        let req = GuestCreate::new("987-65-432", "Jane Smith", "123-45-678");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_fields_are_rejected_by_name() {
        let req = GuestCreate::new("", "Jane Smith", "123-45-678");
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("license_plate")));

        let req = GuestCreate::new("987-65-432", "   ", "123-45-678");
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("guest_name")));

        let req = GuestCreate::new("987-65-432", "Jane Smith", "");
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("added_by")));
    }

    #[test]
    fn response_carries_fixed_message() {
        let resp = GuestResponse::confirmed("987-65-432", "Jane Smith", 1_700_086_400);
        assert_eq!(
            resp.message,
            "Guest added successfully and will have access for 24 hours."
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["expiration_timestamp"], 1_700_086_400);
        assert_eq!(json["license_plate"], "987-65-432");
    }

    #[test]
    fn request_deserializes_from_json() {
        let req: GuestCreate = serde_json::from_str(
            r#"{"license_plate":"987-65-432","guest_name":"Jane Smith","added_by":"123-45-678"}"#,
        )
        .unwrap();
        assert_eq!(req.added_by, "123-45-678");
    }
}
