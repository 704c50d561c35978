//! Payment gateway adapter interface.
//!
//! The gateway is an external collaborator: the core asks it to create a
//! hosted checkout and later receives an out-of-band confirmation callback.
//! Only the interface lives here; the HTTP client lives in the api crate.

pub mod error;
pub mod types;

pub use error::GatewayError;
pub use types::{
    CallbackOutcome, CheckoutRequest, CheckoutSession, GatewayCallback, PaymentGateway,
};
