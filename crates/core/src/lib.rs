//! Core business logic for Lodgebook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping logic
//! - `period` - Balance periods, BD/CD carry and trial balance
//! - `reconciliation` - Bank statement matching
//! - `petty_cash` - Petty-cash subledger movements

pub mod ledger;
pub mod period;
pub mod petty_cash;
pub mod reconciliation;
