use crate::cli::{AcademicCommand, Command, PaymentsCommand, UserArgs, UsersCommand};
use crate::render;
use anyhow::Context;
use aula_client_core::models::{NewPayment, Role, UserForm};
use aula_client_core::session::token_claims;
use aula_client_core::views::{
    landing_screen, AcademicView, AdminDashboard, EnrollmentView, LoginView, MyCourseView,
    MyPaymentsView, PaymentsView, ProfileView, Screen, SignupView, StudentDashboard, UsersView,
    ViewContext,
};
use std::io::BufRead;

/// Run one command against the context and return the text to print.
pub async fn run(command: Command, ctx: &ViewContext) -> anyhow::Result<String> {
    match command {
        Command::Login { username, password } => {
            let password = password_or_stdin(password)?;
            let (user, screen) = LoginView::new(ctx.clone()).submit(&username, &password).await?;
            Ok(format!(
                "Bienvenido, {}\nInicio: {}\n{}",
                user.display_name(),
                screen.title(),
                render::menu(Some(&user))
            ))
        }
        Command::Signup { username, password } => {
            let password = password_or_stdin(password)?;
            let created = SignupView::new(ctx.clone()).submit(&username, &password).await?;
            Ok(format!("Cuenta creada: {} (#{})\n", created.username, created.id))
        }
        Command::Logout => {
            LoginView::new(ctx.clone()).logout()?;
            Ok("Sesión cerrada\n".to_string())
        }
        Command::Whoami => {
            let mut out = render::menu(ctx.session.current().as_ref());
            let expires = ctx
                .session
                .token()
                .and_then(|t| token_claims(&t))
                .and_then(|c| c.exp)
                .and_then(|exp| chrono::DateTime::from_timestamp(exp, 0));
            if let Some(expires) = expires {
                out.push_str(&format!("Sesión válida hasta {}\n", expires.format("%d/%m/%Y %H:%M UTC")));
            }
            Ok(out)
        }
        Command::Dashboard => dashboard(ctx).await,
        Command::MyPayments => {
            let mut view = MyPaymentsView::new(ctx.clone());
            view.load().await?;
            Ok(render::section(
                Screen::MyPayments,
                &render::my_payments(&view.rows, view.status.as_ref()),
            ))
        }
        Command::MyCourse => {
            let mut view = MyCourseView::new(ctx.clone());
            view.load().await?;
            Ok(render::section(
                Screen::MyCourse,
                &render::cursada(view.cursada.as_ref(), &view.counts),
            ))
        }
        Command::Profile => {
            let mut view = ProfileView::new(ctx.clone());
            view.load().await?;
            let body = view.profile.as_ref().map(render::profile).unwrap_or_default();
            Ok(render::section(Screen::Profile, &body))
        }
        Command::ChangePassword { current, new, confirm } => {
            let view = ProfileView::new(ctx.clone());
            Ok(line(view.change_password(&current, &new, &confirm).await?))
        }
        Command::Academic(cmd) => academic(cmd, ctx).await,
        Command::Enroll { student, course } => {
            let mut view = EnrollmentView::new(ctx.clone());
            view.load().await?;
            Ok(line(view.enroll(student, course).await?))
        }
        Command::Payments(cmd) => payments(cmd, ctx).await,
        Command::Users(cmd) => users(cmd, ctx).await,
    }
}

async fn dashboard(ctx: &ViewContext) -> anyhow::Result<String> {
    let role = ctx.session.role();
    match landing_screen(role.as_ref()) {
        Screen::StudentDashboard => {
            let mut view = StudentDashboard::new(ctx.clone());
            view.load().await?;
            Ok(render::section(Screen::StudentDashboard, &render::student_dashboard(&view)))
        }
        Screen::AdminDashboard => {
            let mut view = AdminDashboard::new(ctx.clone());
            view.load().await?;
            Ok(render::section(
                Screen::AdminDashboard,
                &render::admin_dashboard(&view.summary, &view.errors),
            ))
        }
        Screen::Login => Ok(render::menu(None)),
        screen => Ok(render::section(screen, &render::menu(ctx.session.current().as_ref()))),
    }
}

async fn academic(cmd: AcademicCommand, ctx: &ViewContext) -> anyhow::Result<String> {
    let mut view = AcademicView::new(ctx.clone());
    let message = match cmd {
        AcademicCommand::Show => {
            view.load().await?;
            let mut body = String::new();
            for e in &view.errors {
                body.push_str(&format!("! {}\n", e));
            }
            body.push_str("Materias\n");
            body.push_str(&render::subjects(&view.subjects));
            body.push_str("\nCursos\n");
            body.push_str(&render::courses(&view.courses));
            body.push_str("\nMaterias por curso\n");
            body.push_str(&render::course_groups(&view.groups));
            return Ok(render::section(Screen::Academic, &body));
        }
        AcademicCommand::AddSubject { name } => view.create_subject(&name).await?,
        AcademicCommand::DeleteSubject { id } => view.delete_subject(id).await?,
        AcademicCommand::AddCourse { name, status } => {
            view.create_course(&name, status.as_deref()).await?
        }
        AcademicCommand::DeleteCourse { id } => view.delete_course(id).await?,
        AcademicCommand::Assign { course, subject } => view.assign(course, subject).await?,
        AcademicCommand::Unassign { id } => view.unassign(id).await?,
    };
    Ok(line(message))
}

async fn payments(cmd: PaymentsCommand, ctx: &ViewContext) -> anyhow::Result<String> {
    let mut view = PaymentsView::new(ctx.clone());
    match cmd {
        PaymentsCommand::Show { filter } => {
            view.load().await?;
            view.filter = filter;
            let mut body = String::new();
            for e in &view.errors {
                body.push_str(&format!("! {}\n", e));
            }
            body.push_str(&render::totals(&view.visible_totals()));
            if view.by_student.unattributed > 0 {
                body.push_str(&format!("Pagos sin alumno: {}\n", view.by_student.unattributed));
            }
            body.push('\n');
            body.push_str(&render::student_summaries(&view.visible()));
            Ok(render::section(Screen::Payments, &body))
        }
        PaymentsCommand::Add { student, course, amount, month } => {
            let form = NewPayment {
                student_id: Some(student),
                course_id: Some(course),
                amount,
                month,
            };
            Ok(line(view.record(form).await?))
        }
        PaymentsCommand::Delete { id } => Ok(line(view.delete(id).await?)),
    }
}

async fn users(cmd: UsersCommand, ctx: &ViewContext) -> anyhow::Result<String> {
    let mut view = UsersView::new(ctx.clone());
    match cmd {
        UsersCommand::List { students } => {
            view.load().await?;
            let body = if students {
                render::users(view.students())
            } else {
                render::users(&view.users)
            };
            Ok(render::section(Screen::Users, &body))
        }
        UsersCommand::Add(args) => Ok(line(view.create(user_form(args)).await?)),
        UsersCommand::Update { id, user } => Ok(line(view.update(id, user_form(user)).await?)),
        UsersCommand::Delete { id } => Ok(line(view.delete(id).await?)),
    }
}

fn user_form(args: UserArgs) -> UserForm {
    UserForm {
        username: args.username,
        password: args.password,
        email: args.email,
        dni: args.dni,
        first_name: args.first_name,
        last_name: args.last_name,
        role: Role::from_type(&args.role),
    }
}

fn line(message: String) -> String {
    format!("{}\n", message)
}

fn password_or_stdin(password: Option<String>) -> anyhow::Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    let mut buf = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut buf)
        .context("failed to read password from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}
