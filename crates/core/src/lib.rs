//! Core business logic for Gearbox.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and state machines
//! live here.
//!
//! # Modules
//!
//! - `invoice` - Invoice aggregate and balance computation
//! - `settlement` - Tender recording and the settlement state machine
//! - `gateway` - Payment gateway adapter interface
//! - `debt` - Debt conversion, repayment, and due-date rules
//! - `voucher` - Manual voucher approval workflow

pub mod debt;
pub mod gateway;
pub mod invoice;
pub mod settlement;
pub mod voucher;
