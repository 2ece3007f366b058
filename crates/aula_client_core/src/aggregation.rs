//! Per-student payment aggregation for the admin payments screen.
//! Payments are grouped by `student_id`; display names are never used as a key.

use crate::ids::UserId;
use crate::models::Payment;
use crate::reconciliation::{reconcile, PaymentStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StudentPaymentSummary {
    pub student_id: UserId,
    pub student_name: String,
    /// Newest payment first; undated payments last.
    pub payments: Vec<Payment>,
    pub status: PaymentStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StudentAggregation {
    pub students: Vec<StudentPaymentSummary>,
    /// Payments that carry no student id and so belong to no group.
    pub unattributed: usize,
}

/// Group payments per student and reconcile each group against `today`.
pub fn aggregate_by_student(payments: &[Payment], today: NaiveDate) -> StudentAggregation {
    let mut groups: HashMap<UserId, Vec<Payment>> = HashMap::new();
    let mut unattributed = 0usize;

    for payment in payments {
        match payment.student_id {
            Some(id) => groups.entry(id).or_default().push(payment.clone()),
            None => {
                unattributed += 1;
                warn!(payment_id = %payment.id, "payment without student id left out of aggregation");
            }
        }
    }

    let mut students: Vec<StudentPaymentSummary> = groups
        .into_iter()
        .map(|(student_id, mut group)| {
            group.sort_by(|a, b| a.affected_year_month().cmp(&b.affected_year_month()));
            let status = reconcile(&group, today);

            let student_name = group
                .iter()
                .map(|p| p.student_name.trim())
                .find(|n| !n.is_empty())
                .unwrap_or_default()
                .to_string();

            group.sort_by(newest_first);

            StudentPaymentSummary {
                student_id,
                student_name,
                payments: group,
                status,
            }
        })
        .collect();

    students.sort_by(|a, b| {
        a.student_name
            .to_lowercase()
            .cmp(&b.student_name.to_lowercase())
            .then(a.student_id.cmp(&b.student_id))
    });

    StudentAggregation {
        students,
        unattributed,
    }
}

/// Display order for payment histories: latest payment date first, undated payments last.
pub fn newest_first(a: &Payment, b: &Payment) -> Ordering {
    match (a.payment_date, b.payment_date) {
        (Some(x), Some(y)) => y.cmp(&x).then(b.id.cmp(&a.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    }
}

/// Case-insensitive substring match on the student's display name. Empty query keeps everything.
pub fn filter_by_student<'a>(
    summaries: &'a [StudentPaymentSummary],
    query: &str,
) -> Vec<&'a StudentPaymentSummary> {
    let needle = query.trim().to_lowercase();
    summaries
        .iter()
        .filter(|s| needle.is_empty() || s.student_name.to_lowercase().contains(&needle))
        .collect()
}
