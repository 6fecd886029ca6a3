//! gatekeeper-service — business orchestration for guest grants.
//!
//! [`GuestService`] turns a [`GuestCreate`] request into a stored grant via
//! any [`GrantWriter`] and shapes the [`GuestResponse`] contract. It holds no
//! state of its own; the store handle is passed in at construction.

pub mod error;
pub mod guests;

pub use error::{GrantError, GrantResult};
pub use guests::GuestService;

pub use gatekeeper_core::{GuestCreate, GuestResponse};
pub use gatekeeper_state::GrantWriter;
