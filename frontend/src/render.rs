//! Plain-text rendering of controller state. Nothing here performs I/O.

use aula_client_core::aggregation::StudentPaymentSummary;
use aula_client_core::enrollment::CourseGroup;
use aula_client_core::models::{Course, Cursada, Payment, Profile, SessionUser, Subject, User};
use aula_client_core::reconciliation::{PaymentStatus, PeriodTotals};
use aula_client_core::views::{
    screens_for, AdminSummary, MyPaymentRow, Screen, StateCounts, StudentDashboard,
};
use rust_decimal::Decimal;
use std::fmt::Write;

pub fn format_number_with_commas(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    for (i, c) in chars.into_iter().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// `$ 15,000.00`
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}$ {}.{}", sign, format_number_with_commas(int_part), frac_part)
}

pub fn status_badge(status: &PaymentStatus) -> &'static str {
    if status.is_current {
        "Al día"
    } else {
        "Pendiente"
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn push_errors(out: &mut String, errors: &[String]) {
    for e in errors {
        let _ = writeln!(out, "! {}", e);
    }
}

pub fn menu(user: Option<&SessionUser>) -> String {
    let mut out = String::new();
    match user {
        Some(u) => {
            let _ = writeln!(out, "{} ({})", u.display_name(), u.role);
        }
        None => out.push_str("Sin sesión\n"),
    }
    for screen in screens_for(user.map(|u| &u.role)) {
        let _ = writeln!(out, "  - {}", screen.title());
    }
    out
}

pub fn payment_status(status: &PaymentStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Estado: {}", status_badge(status));
    let _ = writeln!(
        out,
        "Meses pagados: {} de {}",
        status.paid_months.len().min(status.expected_months.len()),
        status.expected_months.len()
    );
    if !status.pending_months.is_empty() {
        let pending: Vec<String> = status.pending_months.iter().map(|m| m.long_name()).collect();
        let _ = writeln!(out, "Meses adeudados: {}", pending.join(", "));
    }
    let _ = writeln!(
        out,
        "Total pagado: {} ({} pagos)",
        format_amount(status.total_paid),
        status.payment_count
    );
    if let Some(date) = status.last_payment_date {
        let _ = writeln!(out, "Último pago: {}", date.format("%d/%m/%Y"));
    }
    out
}

fn payment_line(p: &Payment) -> String {
    let month = p
        .affected_year_month()
        .map(|m| m.long_name())
        .unwrap_or_else(|| or_dash(&p.affected_month).to_string());
    let paid = p
        .payment_date
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "#{:<5} {:<18} {:>14}  {:<10} {}",
        p.id,
        month,
        format_amount(p.amount),
        paid,
        or_dash(&p.course_name)
    )
}

pub fn my_payments(rows: &[MyPaymentRow], status: Option<&PaymentStatus>) -> String {
    let mut out = String::new();
    if let Some(status) = status {
        out.push_str(&payment_status(status));
        out.push('\n');
    }
    if rows.is_empty() {
        out.push_str("No hay pagos registrados\n");
        return out;
    }
    for row in rows {
        let marker = if row.is_current_month { "*" } else { " " };
        let _ = writeln!(out, "{} {}", marker, payment_line(&row.payment));
    }
    out
}

pub fn cursada(cursada: Option<&Cursada>, counts: &StateCounts) -> String {
    let Some(cursada) = cursada else {
        return "No estás inscripto en ningún curso\n".to_string();
    };
    let mut out = String::new();
    let _ = write!(out, "Curso: {}", cursada.course.name);
    if let Some(year) = cursada.course.school_year {
        let _ = write!(out, " ({})", year);
    }
    out.push('\n');
    for s in &cursada.subjects {
        let _ = writeln!(out, "  {:<30} {}", s.name, s.state.label());
    }
    let _ = writeln!(
        out,
        "Cursando {} / Aprobadas {} / Desaprobadas {} / Pendientes {} (total {})",
        counts.cursando,
        counts.aprobado,
        counts.desaprobado,
        counts.pendiente,
        counts.total()
    );
    out
}

pub fn student_dashboard(view: &StudentDashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hola, {}", view.greeting_name);
    push_errors(&mut out, &view.errors);
    if let Some(status) = &view.status {
        out.push_str(&payment_status(status));
    }
    match &view.cursada {
        Some(c) => {
            let _ = writeln!(out, "Curso actual: {} ({} materias)", c.course.name, c.subjects.len());
        }
        None => out.push_str("Sin curso asignado\n"),
    }
    out
}

pub fn totals(totals: &PeriodTotals) -> String {
    format!(
        "Este mes: {}\nEste año: {}\nTotal: {}\n",
        format_amount(totals.month_total),
        format_amount(totals.year_total),
        format_amount(totals.grand_total)
    )
}

pub fn admin_dashboard(summary: &AdminSummary, errors: &[String]) -> String {
    let mut out = String::new();
    push_errors(&mut out, errors);
    let _ = writeln!(
        out,
        "Usuarios: {} ({} alumnos)\nCursos: {}",
        summary.user_count, summary.student_count, summary.course_count
    );
    out.push_str(&totals(&summary.totals));
    let _ = writeln!(out, "Alumnos con pagos pendientes: {}", summary.students_behind);
    if summary.unattributed_payments > 0 {
        let _ = writeln!(out, "Pagos sin alumno: {}", summary.unattributed_payments);
    }
    out
}

pub fn student_summaries(summaries: &[&StudentPaymentSummary]) -> String {
    if summaries.is_empty() {
        return "No hay alumnos con pagos\n".to_string();
    }
    let mut out = String::new();
    for s in summaries {
        let _ = writeln!(
            out,
            "[{}] {} ({}) {} pagos, {}",
            status_badge(&s.status),
            s.student_name,
            s.student_id,
            s.payments.len(),
            format_amount(s.status.total_paid)
        );
        for p in &s.payments {
            let _ = writeln!(out, "    {}", payment_line(p));
        }
    }
    out
}

pub fn course_groups(groups: &[CourseGroup]) -> String {
    if groups.is_empty() {
        return "No hay materias asignadas\n".to_string();
    }
    let mut out = String::new();
    for g in groups {
        let _ = writeln!(out, "{} (#{})", or_dash(&g.course_name), g.course_id);
        for s in &g.subjects {
            let _ = writeln!(
                out,
                "  - {} (#{}, asignación #{})",
                or_dash(&s.subject_name),
                s.subject_id,
                s.assignment_id
            );
        }
    }
    out
}

pub fn courses(courses: &[Course]) -> String {
    let mut out = String::new();
    for c in courses {
        let _ = writeln!(
            out,
            "#{:<5} {:<30} {}",
            c.id,
            c.name,
            c.status.as_deref().unwrap_or("-")
        );
    }
    out
}

pub fn subjects(subjects: &[Subject]) -> String {
    let mut out = String::new();
    for s in subjects {
        let _ = writeln!(out, "#{:<5} {}", s.id, s.name);
    }
    out
}

pub fn users<'a>(users: impl IntoIterator<Item = &'a User>) -> String {
    let mut out = String::new();
    for u in users {
        let _ = writeln!(
            out,
            "#{:<5} {:<16} {:<28} {:<14} {}",
            u.id,
            u.username,
            u.full_name(),
            u.role,
            u.email.as_deref().unwrap_or("-")
        );
    }
    if out.is_empty() {
        out.push_str("No hay usuarios\n");
    }
    out
}

pub fn profile(profile: &Profile) -> String {
    format!(
        "[{}] {} {}\nUsuario: {}\nEmail: {}\nDNI: {}\nTipo: {}\n",
        profile.initials(),
        profile.first_name,
        profile.last_name,
        profile.username,
        profile.email.as_deref().unwrap_or("-"),
        profile.dni.as_deref().unwrap_or("-"),
        profile.role
    )
}

pub fn section(screen: Screen, body: &str) -> String {
    format!("== {} ==\n{}", screen.title(), body)
}
