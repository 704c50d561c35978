//! Manual voucher approval workflow.
//!
//! Income and expense vouchers are created by staff, approved or
//! rejected by a manager, and finished once the money actually moves.

pub mod error;
pub mod service;
pub mod types;

pub use error::VoucherError;
pub use service::VoucherService;
pub use types::{Voucher, VoucherAction, VoucherKind, VoucherStatus};
