//! One controller per screen: fetch what the screen needs, hold it, derive display state,
//! submit edits. Controllers never render; the front-end reads their public fields.

mod academic;
mod dashboard;
mod enrollment;
mod login;
mod my_course;
mod my_payments;
mod payments;
mod profile;
mod users;

pub use academic::AcademicView;
pub use dashboard::{AdminDashboard, AdminSummary, StudentDashboard};
pub use enrollment::EnrollmentView;
pub use login::{LoginView, SignupView};
pub use my_course::{MyCourseView, StateCounts};
pub use my_payments::{MyPaymentRow, MyPaymentsView};
pub use payments::PaymentsView;
pub use profile::{ProfileView, MIN_PASSWORD_LEN};
pub use users::UsersView;

use crate::api::Gateway;
use crate::error::{ClientError, Result};
use crate::models::Role;
use crate::scope::RequestScope;
use crate::session::Session;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Everything a controller needs, injected once at startup.
#[derive(Clone)]
pub struct ViewContext {
    pub gateway: Arc<Gateway>,
    pub session: Arc<Session>,
    root: Arc<RequestScope>,
}

impl ViewContext {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        let session = Arc::clone(gateway.session());
        Self {
            gateway,
            session,
            root: Arc::new(RequestScope::new()),
        }
    }

    /// A scope for one screen's lifetime; closed with the screen or with [`Self::close_all`].
    pub fn scope(&self) -> RequestScope {
        self.root.child()
    }

    /// Abandon every request still running through any screen of this context.
    pub fn close_all(&self) {
        self.root.cancel();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Screen {
    Login,
    Signup,
    StudentDashboard,
    MyPayments,
    MyCourse,
    Profile,
    AdminDashboard,
    Academic,
    Enrollment,
    Payments,
    Users,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Iniciar sesión",
            Screen::Signup => "Registrarse",
            Screen::StudentDashboard => "Inicio",
            Screen::MyPayments => "Mis pagos",
            Screen::MyCourse => "Mi cursada",
            Screen::Profile => "Mi perfil",
            Screen::AdminDashboard => "Panel de administración",
            Screen::Academic => "Gestión académica",
            Screen::Enrollment => "Inscripciones",
            Screen::Payments => "Pagos",
            Screen::Users => "Usuarios",
        }
    }
}

/// Screen shown right after login (or at startup with a restored session).
pub fn landing_screen(role: Option<&Role>) -> Screen {
    match role {
        None => Screen::Login,
        Some(Role::Student) => Screen::StudentDashboard,
        Some(Role::Administrator) => Screen::AdminDashboard,
        Some(Role::Other(_)) => Screen::Profile,
    }
}

/// Screens reachable for a role, in menu order.
pub fn screens_for(role: Option<&Role>) -> Vec<Screen> {
    match role {
        None => vec![Screen::Login, Screen::Signup],
        Some(Role::Student) => vec![
            Screen::StudentDashboard,
            Screen::MyPayments,
            Screen::MyCourse,
            Screen::Profile,
        ],
        Some(Role::Administrator) => vec![
            Screen::AdminDashboard,
            Screen::Academic,
            Screen::Enrollment,
            Screen::Payments,
            Screen::Users,
            Screen::Profile,
        ],
        Some(Role::Other(_)) => vec![Screen::Profile],
    }
}

/// Keep a list that failed to load as empty, recording the user-facing message.
/// Cancellation is not a load failure and is passed through.
pub(crate) fn or_empty<T>(
    what: &str,
    res: Result<Vec<T>>,
    errors: &mut Vec<String>,
) -> Result<Vec<T>> {
    match res {
        Ok(items) => Ok(items),
        Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
        Err(e) => {
            warn!(list = what, error = %e, "list failed to load");
            errors.push(format!("No se pudieron cargar {}: {}", what, e.user_message()));
            Ok(Vec::new())
        }
    }
}

pub(crate) fn require_non_empty(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}
