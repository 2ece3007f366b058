//! Admin payments screen and dashboard: per-student status, totals, recording and deleting.

use crate::common::{TestApp, ADMIN, ANA_ID, BRUNO_ID};
use aula_client_core::ids::{CourseId, PaymentId, UserId};
use aula_client_core::models::NewPayment;
use aula_client_core::reconciliation::today;
use aula_client_core::views::{AdminDashboard, PaymentsView};
use aula_client_core::{ClientError, YearMonth};
use axum::http::Method;
use rust_decimal::Decimal;

fn new_payment(amount: i64, month: &str) -> NewPayment {
    NewPayment {
        student_id: UserId::new(BRUNO_ID).ok(),
        course_id: CourseId::new(2).ok(),
        amount: Decimal::from(amount),
        month: month.to_string(),
    }
}

#[tokio::test]
async fn payments_are_grouped_by_student_id() {
    let app = TestApp::start().await;
    app.login_as(ADMIN).await;
    let mut view = PaymentsView::new(app.ctx.clone());
    view.load().await.expect("load");

    let students = &view.by_student.students;
    assert_eq!(students.len(), 2);
    assert_eq!(view.by_student.unattributed, 1);

    let ana = students.iter().find(|s| s.student_id.get() == ANA_ID).unwrap();
    let bruno = students.iter().find(|s| s.student_id.get() == BRUNO_ID).unwrap();
    assert_eq!(ana.student_name, "Ana Pérez");
    assert!(ana.status.is_current);
    assert!(!bruno.status.is_current);
    assert_eq!(bruno.status.pending_months, bruno.status.expected_months);

    assert_eq!(view.totals.month_total, Decimal::from(15000));
    assert_eq!(view.students().count(), 2);
}

#[tokio::test]
async fn filter_narrows_visible_students() {
    let app = TestApp::start().await;
    app.login_as(ADMIN).await;
    let mut view = PaymentsView::new(app.ctx.clone());
    view.load().await.expect("load");

    view.filter = "díaz".to_string();
    let visible = view.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].student_id.get(), BRUNO_ID);

    view.filter.clear();
    assert_eq!(view.visible().len(), 2);
}

#[tokio::test]
async fn invalid_payment_form_sends_nothing() {
    let app = TestApp::start().await;
    app.login_as(ADMIN).await;
    let mut view = PaymentsView::new(app.ctx.clone());
    view.load().await.expect("load");

    let err = view.record(new_payment(0, "2025-01")).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    let err = view.record(new_payment(100, "enero")).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidMonth(_)));
    assert!(app.backend.writes_to(Method::POST, "/payment/add").is_empty());
}

#[tokio::test]
async fn recording_the_current_month_updates_status() {
    let app = TestApp::start().await;
    app.login_as(ADMIN).await;
    let mut view = PaymentsView::new(app.ctx.clone());
    view.load().await.expect("load");

    let current = YearMonth::of(today());
    let msg = view
        .record(new_payment(12000, &current.to_string()))
        .await
        .expect("record");
    assert_eq!(msg, "Pago para el alumno Bruno Díaz, guardado");

    let writes = app.backend.writes_to(Method::POST, "/payment/add");
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].body["user_id"], BRUNO_ID);
    assert_eq!(writes[0].body["curso_id"], 2);
    assert_eq!(writes[0].body["amount"].as_f64(), Some(12000.0));
    assert_eq!(writes[0].body["affect_month"], current.first_day().format("%Y-%m-%d").to_string());

    let bruno = view
        .by_student
        .students
        .iter()
        .find(|s| s.student_id.get() == BRUNO_ID)
        .unwrap();
    assert!(bruno.status.current_month_paid);
}

#[tokio::test]
async fn deleting_a_payment_reloads() {
    let app = TestApp::start().await;
    app.login_as(ADMIN).await;
    let mut view = PaymentsView::new(app.ctx.clone());
    view.load().await.expect("load");
    let before = view.payments.len();

    view.delete(PaymentId::new(1).unwrap()).await.expect("delete");
    assert_eq!(view.payments.len(), before - 1);
    assert_eq!(app.backend.writes_to(Method::DELETE, "/payment/delete/1").len(), 1);
}

#[tokio::test]
async fn admin_dashboard_summarizes() {
    let app = TestApp::start().await;
    app.login_as(ADMIN).await;
    let mut dash = AdminDashboard::new(app.ctx.clone());
    dash.load().await.expect("load");

    assert_eq!(dash.summary.user_count, 3);
    assert_eq!(dash.summary.student_count, 2);
    assert_eq!(dash.summary.course_count, 2);
    assert_eq!(dash.summary.students_behind, 1);
    assert_eq!(dash.summary.unattributed_payments, 1);
    assert!(dash.errors.is_empty());
}
