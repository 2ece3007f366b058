//! Client error type. Every fallible operation in the crate returns [`Result`].

use crate::ids::{CourseId, SubjectId};
use crate::models::Role;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("backend not configured")]
    NotConfigured,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("this screen requires the {required} role")]
    Forbidden { required: Role },

    /// The backend answered but refused the operation (e.g. bad credentials).
    #[error("{0}")]
    Rejected(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("subject {subject_id} is already assigned to course {course_id}")]
    DuplicateAssignment {
        course_id: CourseId,
        subject_id: SubjectId,
    },

    #[error("{0}")]
    Validation(String),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("invalid year-month token: {0:?}")]
    InvalidMonth(String),
}

impl ClientError {
    /// Text a screen shows to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NotConfigured => "El servidor no está configurado".to_string(),
            ClientError::NotLoggedIn => "Debes iniciar sesión".to_string(),
            ClientError::Forbidden { .. } => "No tienes permiso para ver esta sección".to_string(),
            ClientError::Rejected(msg) | ClientError::Validation(msg) => msg.clone(),
            ClientError::Http { status: 401, .. } => {
                "Token de autenticación inválido o expirado".to_string()
            }
            ClientError::Http { status: 404, message } => format!("No encontrado: {}", message),
            ClientError::Http { status, message } => format!("Error {}: {}", status, message),
            ClientError::Transport(_) => "Error de conexión con el servidor".to_string(),
            ClientError::DuplicateAssignment { .. } => {
                "La materia ya está asignada a ese curso".to_string()
            }
            ClientError::InvalidMonth(raw) => format!("Mes inválido: {}", raw),
            ClientError::InvalidId(raw) => format!("Identificador inválido: {}", raw),
            other => other.to_string(),
        }
    }

    /// True when the session should be dropped and the user sent back to login.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::NotLoggedIn | ClientError::Http { status: 401, .. })
    }
}
