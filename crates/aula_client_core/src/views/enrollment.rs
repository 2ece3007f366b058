use super::{or_empty, ViewContext};
use crate::error::{ClientError, Result};
use crate::ids::{CourseId, UserId};
use crate::models::{Course, Role, User};
use crate::scope::RequestScope;
use tracing::info;

/// "Inscripciones": enroll a student in a course.
pub struct EnrollmentView {
    ctx: ViewContext,
    scope: RequestScope,
    /// Users whose role is student.
    pub students: Vec<User>,
    pub courses: Vec<Course>,
    pub errors: Vec<String>,
}

impl EnrollmentView {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self {
            ctx,
            scope,
            students: Vec::new(),
            courses: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.ctx.session.require_role(Role::Administrator)?;
        let gateway = &self.ctx.gateway;
        let (users, courses) = self
            .scope
            .run(async { Ok::<_, ClientError>(tokio::join!(gateway.users(), gateway.courses())) })
            .await?;

        let mut errors = Vec::new();
        let users = or_empty("alumnos", users, &mut errors)?;
        self.courses = or_empty("cursos", courses, &mut errors)?;
        self.students = users.into_iter().filter(User::is_student).collect();
        self.errors = errors;
        Ok(())
    }

    /// Enroll after checking both selections are among the loaded lists. Returns the
    /// backend's confirmation text.
    pub async fn enroll(&mut self, student_id: UserId, course_id: CourseId) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        if !self.students.iter().any(|s| s.id == student_id) {
            return Err(ClientError::Validation(
                "Por favor selecciona un alumno".to_string(),
            ));
        }
        if !self.courses.iter().any(|c| c.id == course_id) {
            return Err(ClientError::Validation(
                "Por favor selecciona un curso".to_string(),
            ));
        }
        let message = self
            .scope
            .run(self.ctx.gateway.enroll(student_id, course_id))
            .await?;
        info!(student_id = %student_id, course_id = %course_id, "student enrolled");
        Ok(message)
    }
}
