use super::ViewContext;
use crate::aggregation::newest_first;
use crate::error::Result;
use crate::ids::UserId;
use crate::models::{Payment, Role};
use crate::months::YearMonth;
use crate::reconciliation::{reconcile, today, PaymentStatus};
use crate::scope::RequestScope;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MyPaymentRow {
    pub payment: Payment,
    /// The payment covers the current calendar month.
    pub is_current_month: bool,
}

/// "Mis pagos": the logged-in student's payment history and up-to-date status.
pub struct MyPaymentsView {
    ctx: ViewContext,
    scope: RequestScope,
    pub rows: Vec<MyPaymentRow>,
    pub status: Option<PaymentStatus>,
}

impl MyPaymentsView {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self {
            ctx,
            scope,
            rows: Vec::new(),
            status: None,
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        let user = self.ctx.session.require_role(Role::Student)?;
        let payments = self
            .scope
            .run(self.ctx.gateway.student_payments(user.user_id))
            .await?;
        self.apply(payments, user.user_id, today());
        Ok(())
    }

    /// Replace the view state from fetched payments as of `today`.
    pub fn apply(&mut self, payments: Vec<Payment>, owner: UserId, today: NaiveDate) {
        let mut own = owned_by(payments, owner);
        self.status = Some(reconcile(&own, today));

        own.sort_by(newest_first);
        let current = YearMonth::of(today);
        self.rows = own
            .into_iter()
            .map(|payment| MyPaymentRow {
                is_current_month: payment.affected_year_month() == Some(current),
                payment,
            })
            .collect();
    }
}

/// Payments recorded for `owner`; rows for anyone else are dropped.
pub(crate) fn owned_by(payments: Vec<Payment>, owner: UserId) -> Vec<Payment> {
    payments
        .into_iter()
        .filter(|p| {
            let mine = p.student_id == Some(owner);
            if !mine {
                warn!(payment_id = %p.id, "dropping payment that belongs to another student");
            }
            mine
        })
        .collect()
}
