//! Tender recording and the settlement state machine.
//!
//! A settlement attempt moves through
//! `Requested -> {CashSettling | GatewayPending} -> Settled | Failed | Cancelled`.
//! Cash settles synchronously; bank transfers stay pending until the gateway
//! callback closes the loop. The callback handler is explicitly idempotent.

pub mod error;
pub mod service;
pub mod types;

pub use error::SettlementError;
pub use service::{CallbackAction, SettlementPlan, SettlementService};
pub use types::{
    PaymentMethod, SettlementStatus, SettlementTarget, SettlementTransaction, TenderPurpose,
};
