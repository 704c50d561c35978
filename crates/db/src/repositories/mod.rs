//! Repository abstractions for data access.

pub mod debt;
pub mod invoice;
pub mod settlement;
pub mod voucher;

pub use debt::DebtRepository;
pub use invoice::InvoiceRepository;
pub use settlement::SettlementRepository;
pub use voucher::VoucherRepository;
