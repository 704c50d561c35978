//! Invoice aggregate and balance computation.
//!
//! An invoice tracks what a service ticket's customer owes: the
//! quotation-derived estimate, an optional discount, the deposit taken up
//! front, and the running total of settled tenders. Balances are always
//! derived from those inputs, never stored independently.

pub mod balance;
pub mod error;
pub mod types;

pub use balance::{AppliedAmounts, InvoiceBalances, apply_transaction, compute_balances};
pub use error::InvoiceError;
pub use types::{Invoice, InvoiceStatus, TicketStage};
