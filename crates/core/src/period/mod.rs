//! Balance periods.
//!
//! Each period holds, per account, a balance brought down (BD), the debits
//! and credits posted inside it, and the derived balance carried down (CD).
//! Closing a period copies every CD into the next period's BD.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PeriodError;
pub use service::PeriodService;
pub use types::{
    BroughtDownAdjustment, ClosePlan, ClosingLine, PeriodBalance, PeriodSpan, TrialBalance,
    TrialBalanceLine,
};
