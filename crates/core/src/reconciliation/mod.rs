//! Bank reconciliation.
//!
//! Book items are snapshots of journal entries; bank items are statement
//! lines. Both carry a signed amount where money into the account is
//! positive, so matching is direction-aware.

pub mod error;
pub mod matcher;
pub mod service;
pub mod types;

#[cfg(test)]
mod matcher_props;

pub use error::ReconciliationError;
pub use matcher::{
    DEFAULT_MATCH_WINDOW_DAYS, auto_match, confidence, confidence_pct, match_reason,
};
pub use service::ReconciliationService;
pub use types::{
    ConfirmedMatch, ItemRef, ItemSource, MatchAction, MatchCandidate, MatchProposal,
    ReconciliationStatus, StatementLineInput, book_amount,
};
