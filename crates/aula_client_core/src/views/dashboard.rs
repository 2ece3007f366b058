use super::my_payments::owned_by;
use super::{or_empty, ViewContext};
use crate::aggregation::aggregate_by_student;
use crate::error::{ClientError, Result};
use crate::ids::UserId;
use crate::models::{Course, Cursada, Payment, Role, User};
use crate::reconciliation::{period_totals, reconcile, today, PaymentStatus, PeriodTotals};
use crate::scope::RequestScope;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

/// Student home: greeting, payment status and current course.
pub struct StudentDashboard {
    ctx: ViewContext,
    scope: RequestScope,
    pub greeting_name: String,
    pub status: Option<PaymentStatus>,
    pub cursada: Option<Cursada>,
    pub errors: Vec<String>,
}

impl StudentDashboard {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self {
            ctx,
            scope,
            greeting_name: String::new(),
            status: None,
            cursada: None,
            errors: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        let user = self.ctx.session.require_role(Role::Student)?;
        let gateway = &self.ctx.gateway;
        let (payments, cursada) = self
            .scope
            .run(async {
                Ok::<_, ClientError>(tokio::join!(
                    gateway.student_payments(user.user_id),
                    gateway.my_course()
                ))
            })
            .await?;

        let mut errors = Vec::new();
        self.status = student_status(payments, user.user_id, today(), &mut errors)?;
        self.cursada = match cursada {
            Ok(c) => Some(c),
            Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
            Err(e) => {
                warn!(error = %e, "course failed to load");
                errors.push(format!("No se pudo cargar la cursada: {}", e.user_message()));
                None
            }
        };
        self.greeting_name = match user.first_name.trim() {
            "" => "Usuario".to_string(),
            name => name.to_string(),
        };
        self.errors = errors;
        Ok(())
    }
}

/// Status over the student's own payments. A failed fetch leaves no status rather
/// than reporting every month as owed.
fn student_status(
    payments: Result<Vec<Payment>>,
    owner: UserId,
    today: NaiveDate,
    errors: &mut Vec<String>,
) -> Result<Option<PaymentStatus>> {
    match payments {
        Ok(payments) => Ok(Some(reconcile(&owned_by(payments, owner), today))),
        Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
        Err(e) => {
            warn!(error = %e, "payments failed to load");
            errors.push(format!("No se pudieron cargar pagos: {}", e.user_message()));
            Ok(None)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AdminSummary {
    pub user_count: usize,
    pub student_count: usize,
    pub course_count: usize,
    pub totals: PeriodTotals,
    /// Student users with at least one pending month this year, including those with no payments.
    pub students_behind: usize,
    pub unattributed_payments: usize,
}

impl AdminSummary {
    pub fn build(users: &[User], courses: &[Course], payments: &[Payment], today: NaiveDate) -> Self {
        let by_student = aggregate_by_student(payments, today);
        Self {
            user_count: users.len(),
            student_count: users.iter().filter(|u| u.is_student()).count(),
            course_count: courses.len(),
            totals: period_totals(payments, today),
            students_behind: users
                .iter()
                .filter(|u| u.is_student())
                .filter(|u| {
                    by_student
                        .students
                        .iter()
                        .find(|s| s.student_id == u.id)
                        .map_or(true, |s| !s.status.is_current)
                })
                .count(),
            unattributed_payments: by_student.unattributed,
        }
    }
}

/// Administrator home: headline counts and this period's income.
pub struct AdminDashboard {
    ctx: ViewContext,
    scope: RequestScope,
    pub summary: AdminSummary,
    pub errors: Vec<String>,
}

impl AdminDashboard {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self {
            ctx,
            scope,
            summary: AdminSummary::default(),
            errors: Vec::new(),
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
        self.summary = AdminSummary::build(&users, &courses, &payments, today());
        self.errors = errors;
        Ok(())
    }
}
