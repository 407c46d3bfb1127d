//! Period engine: period layout rules, close planning and trial balance.

use chrono::NaiveDate;
use lodgebook_shared::types::AccountId;
use rust_decimal::Decimal;

use super::error::PeriodError;
use super::types::{
    BroughtDownAdjustment, ClosePlan, ClosingLine, PeriodBalance, PeriodSpan, TrialBalance,
    TrialBalanceLine,
};
use crate::ledger::{AccountType, BALANCE_TOLERANCE, BalanceTotals, NormalSide};

/// Stateless period rules. Persistence lives in the db crate.
pub struct PeriodService;

impl PeriodService {
    /// Validates a new period against the existing ones.
    ///
    /// Periods never overlap, and each new period starts the day after the
    /// latest existing period ends.
    pub fn validate_new_period(
        start_date: NaiveDate,
        end_date: NaiveDate,
        existing: &[PeriodSpan],
    ) -> Result<(), PeriodError> {
        if start_date > end_date {
            return Err(PeriodError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        if let Some(clash) = existing
            .iter()
            .find(|p| start_date <= p.end_date && end_date >= p.start_date)
        {
            return Err(PeriodError::Overlap(clash.name.clone()));
        }

        if let Some(expected) = existing
            .iter()
            .max_by_key(|p| p.end_date)
            .and_then(PeriodSpan::next_start_date)
        {
            if start_date != expected {
                return Err(PeriodError::NotContiguous {
                    expected,
                    actual: start_date,
                });
            }
        }

        Ok(())
    }

    /// Finds the period covering a date.
    #[must_use]
    pub fn find_covering(periods: &[PeriodSpan], date: NaiveDate) -> Option<&PeriodSpan> {
        periods.iter().find(|p| p.contains(date))
    }

    /// Finds the period starting the day after `period` ends.
    #[must_use]
    pub fn find_subsequent<'a>(
        periods: &'a [PeriodSpan],
        period: &PeriodSpan,
    ) -> Option<&'a PeriodSpan> {
        let next_start = period.next_start_date()?;
        periods.iter().find(|p| p.start_date == next_start)
    }

    /// Finds the period ending the day before `period` starts.
    #[must_use]
    pub fn find_preceding<'a>(
        periods: &'a [PeriodSpan],
        period: &PeriodSpan,
    ) -> Option<&'a PeriodSpan> {
        periods
            .iter()
            .find(|p| p.next_start_date() == Some(period.start_date))
    }

    /// Checks a period may be closed and returns the period receiving its
    /// carried-down balances.
    ///
    /// Periods close in date order; the period right before must already be closed.
    pub fn check_can_close<'a>(
        period: &PeriodSpan,
        periods: &'a [PeriodSpan],
    ) -> Result<&'a PeriodSpan, PeriodError> {
        if period.is_closed {
            return Err(PeriodError::AlreadyClosed(period.name.clone()));
        }
        if let Some(preceding) = Self::find_preceding(periods, period).filter(|p| !p.is_closed) {
            return Err(PeriodError::PrecedingPeriodOpen {
                period: period.name.clone(),
                preceding: preceding.name.clone(),
            });
        }
        Self::find_subsequent(periods, period)
            .ok_or_else(|| PeriodError::NoSubsequentPeriod(period.name.clone()))
    }

    /// Rebuilds one period row from its brought-down balance and activity.
    #[must_use]
    pub fn rebuild_balance(
        account_id: AccountId,
        account_type: AccountType,
        brought_down: Decimal,
        activity: &BalanceTotals,
    ) -> PeriodBalance {
        PeriodBalance {
            account_id,
            account_type,
            brought_down,
            total_debits: activity.total_debits,
            total_credits: activity.total_credits,
            transaction_count: activity.transaction_count,
        }
    }

    /// Computes every closing line before anything is written.
    #[must_use]
    pub fn plan_close(balances: Vec<PeriodBalance>) -> ClosePlan {
        let closing = balances
            .into_iter()
            .map(|balance| {
                let carried_down = balance.carried_down();
                ClosingLine {
                    balance,
                    carried_down,
                }
            })
            .collect();
        ClosePlan { closing }
    }

    /// Replaces the brought-down balance and recomputes the carried-down.
    #[must_use]
    pub fn adjust_brought_down(
        current: &PeriodBalance,
        new_brought_down: Decimal,
    ) -> (PeriodBalance, BroughtDownAdjustment) {
        let updated = PeriodBalance {
            brought_down: new_brought_down,
            ..current.clone()
        };
        let adjustment = BroughtDownAdjustment {
            previous_balance: current.brought_down,
            new_balance: new_brought_down,
            adjustment_amount: new_brought_down - current.brought_down,
            carried_down: updated.carried_down(),
        };
        (updated, adjustment)
    }

    /// Assembles a trial balance. Debit-normal CDs sum on the debit side,
    /// credit-normal CDs on the credit side.
    #[must_use]
    pub fn build_trial_balance(
        period: &PeriodSpan,
        mut lines: Vec<TrialBalanceLine>,
    ) -> TrialBalance {
        lines.sort_by(|a, b| a.code.cmp(&b.code));

        let mut total_debit_side = Decimal::ZERO;
        let mut total_credit_side = Decimal::ZERO;
        for line in &lines {
            match line.account_type.normal_side() {
                NormalSide::Debit => total_debit_side += line.carried_down,
                NormalSide::Credit => total_credit_side += line.carried_down,
            }
        }

        TrialBalance {
            period_id: period.id,
            period_name: period.name.clone(),
            lines,
            total_debit_side,
            total_credit_side,
            is_balanced: (total_debit_side - total_credit_side).abs() < BALANCE_TOLERANCE,
        }
    }
}
