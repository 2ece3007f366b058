//! Payment reconciliation: which months of the current academic year a student has paid.
//! Pure functions over already-fetched payments; nothing here touches the network or storage.

use crate::models::Payment;
use crate::months::{expected_months, YearMonth};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Payment status of one student for the academic year containing `today`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentStatus {
    /// January of the academic year through the current month, ascending.
    pub expected_months: Vec<YearMonth>,
    /// Distinct affected months paid within the academic year.
    pub paid_months: BTreeSet<YearMonth>,
    /// Expected months without a payment, ascending.
    pub pending_months: Vec<YearMonth>,
    /// "Al día": nothing pending.
    pub is_current: bool,
    /// Sum over every payment supplied, all years included.
    pub total_paid: Decimal,
    pub payment_count: usize,
    pub last_payment_date: Option<NaiveDate>,
    pub current_month_paid: bool,
}

/// Reconcile one student's payments against the months expected up to `today`.
///
/// The caller must pass a single student's payments. Payments for other years are
/// ignored for month accounting but still count toward `total_paid`; a payment whose
/// affected month does not parse is skipped.
pub fn reconcile(payments: &[Payment], today: NaiveDate) -> PaymentStatus {
    let year = today.year();
    let expected = expected_months(today);

    let mut paid_months = BTreeSet::new();
    for payment in payments {
        match payment.affected_year_month() {
            Some(month) if month.year() == year => {
                paid_months.insert(month);
            }
            Some(_) => {}
            None => warn!(
                payment_id = %payment.id,
                affected_month = %payment.affected_month,
                "skipping payment with malformed affected month"
            ),
        }
    }

    let pending_months: Vec<YearMonth> = expected
        .iter()
        .filter(|m| !paid_months.contains(m))
        .copied()
        .collect();

    let current = YearMonth::of(today);

    PaymentStatus {
        is_current: pending_months.is_empty(),
        current_month_paid: paid_months.contains(&current),
        total_paid: payments.iter().map(|p| p.amount).sum(),
        payment_count: payments.len(),
        last_payment_date: payments.iter().filter_map(|p| p.payment_date).max(),
        expected_months: expected,
        paid_months,
        pending_months,
    }
}

/// [`reconcile`] against the local calendar date at call time.
pub fn reconcile_now(payments: &[Payment]) -> PaymentStatus {
    reconcile(payments, today())
}

/// Today's local calendar date, read fresh on every call.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Totals shown on the admin payments cards.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    /// Payments whose affected month is the current month.
    pub month_total: Decimal,
    /// Payments whose affected month falls in the current year.
    pub year_total: Decimal,
    pub grand_total: Decimal,
}

pub fn period_totals(payments: &[Payment], today: NaiveDate) -> PeriodTotals {
    let current = YearMonth::of(today);
    payments.iter().fold(PeriodTotals::default(), |mut acc, p| {
        if let Some(month) = p.affected_year_month() {
            if month == current {
                acc.month_total += p.amount;
            }
            if month.year() == current.year() {
                acc.year_total += p.amount;
            }
        }
        acc.grand_total += p.amount;
        acc
    })
}
