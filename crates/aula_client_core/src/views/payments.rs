use super::{or_empty, ViewContext};
use crate::aggregation::{aggregate_by_student, filter_by_student, StudentAggregation, StudentPaymentSummary};
use crate::error::{ClientError, Result};
use crate::ids::{CourseId, PaymentId, UserId};
use crate::models::{Course, NewPayment, Payment, Role, User};
use crate::months::YearMonth;
use crate::reconciliation::{period_totals, today, PeriodTotals};
use crate::scope::RequestScope;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

/// "Pagos" (admin): every payment, period totals and a per-student breakdown.
pub struct PaymentsView {
    ctx: ViewContext,
    scope: RequestScope,
    pub users: Vec<User>,
    pub courses: Vec<Course>,
    pub payments: Vec<Payment>,
    pub totals: PeriodTotals,
    pub by_student: StudentAggregation,
    /// Student-name filter applied by [`Self::visible`].
    pub filter: String,
    pub errors: Vec<String>,
    today: NaiveDate,
}

impl PaymentsView {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self {
            ctx,
            scope,
            users: Vec::new(),
            courses: Vec::new(),
            payments: Vec::new(),
            totals: PeriodTotals::default(),
            by_student: StudentAggregation::default(),
            filter: String::new(),
            errors: Vec::new(),
            today: today(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.ctx.session.require_role(Role::Administrator)?;
        let gateway = &self.ctx.gateway;
        let (users, courses, payments) = self
            .scope
            .run(async {
                Ok::<_, ClientError>(tokio::join!(
                    gateway.users(),
                    gateway.courses(),
                    gateway.all_payments()
                ))
            })
            .await?;

        let mut errors = Vec::new();
        let users = or_empty("usuarios", users, &mut errors)?;
        let courses = or_empty("cursos", courses, &mut errors)?;
        let payments = or_empty("pagos", payments, &mut errors)?;
        self.apply(users, courses, payments, today());
        self.errors = errors;
        Ok(())
    }

    /// Replace the view state from fetched lists as of `today`.
    pub fn apply(&mut self, users: Vec<User>, courses: Vec<Course>, payments: Vec<Payment>, today: NaiveDate) {
        self.totals = period_totals(&payments, today);
        self.by_student = aggregate_by_student(&payments, today);
        self.users = users;
        self.courses = courses;
        self.payments = payments;
        self.today = today;
    }

    pub fn visible(&self) -> Vec<&StudentPaymentSummary> {
        filter_by_student(&self.by_student.students, &self.filter)
    }

    /// Period totals over the students matching [`Self::filter`]. With no filter this is
    /// [`Self::totals`], unattributed payments included.
    pub fn visible_totals(&self) -> PeriodTotals {
        if self.filter.trim().is_empty() {
            return self.totals.clone();
        }
        let shown: Vec<Payment> = self
            .visible()
            .into_iter()
            .flat_map(|s| s.payments.iter().cloned())
            .collect();
        period_totals(&shown, self.today)
    }

    pub fn students(&self) -> impl Iterator<Item = &User> {
        self.users.iter().filter(|u| u.is_student())
    }

    /// Validate the form, send it, then reload. Nothing is sent when validation fails.
    pub async fn record(&mut self, form: NewPayment) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        let (student_id, course_id, amount, month) = validate_new_payment(&form)?;
        let message = self
            .scope
            .run(self.ctx.gateway.record_payment(student_id, course_id, amount, month))
            .await?;
        info!(student_id = %student_id, month = %month, amount = %amount, "payment recorded");
        self.load().await?;
        Ok(message)
    }

    pub async fn delete(&mut self, id: PaymentId) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        let message = self.scope.run(self.ctx.gateway.delete_payment(id)).await?;
        info!(payment_id = %id, "payment deleted");
        self.load().await?;
        Ok(message)
    }
}

pub(crate) fn validate_new_payment(form: &NewPayment) -> Result<(UserId, CourseId, Decimal, YearMonth)> {
    let student_id = form
        .student_id
        .ok_or_else(|| ClientError::Validation("Selecciona un alumno".to_string()))?;
    let course_id = form
        .course_id
        .ok_or_else(|| ClientError::Validation("Selecciona un curso".to_string()))?;
    if form.amount <= Decimal::ZERO {
        return Err(ClientError::Validation(
            "El monto debe ser mayor a cero".to_string(),
        ));
    }
    let month = YearMonth::parse(&form.month)?;
    Ok((student_id, course_id, form.amount, month))
}
