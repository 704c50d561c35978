//! Debt conversion, repayment, and due-date rules.
//!
//! When a handed-over invoice still carries a remainder, it can be converted
//! into a tracked debt with a due date. Repayments then flow through the
//! same settlement machinery until the debt is cleared.

pub mod error;
pub mod service;
pub mod types;

pub use error::DebtError;
pub use service::{DebtConversion, DebtRepayment, DebtService};
pub use types::{Debt, DebtStatus};
