use super::{or_empty, require_non_empty, ViewContext};
use crate::enrollment::{ensure_unique_assignment, group_by_course, CourseGroup};
use crate::error::{ClientError, Result};
use crate::ids::{AssignmentId, CourseId, SubjectId};
use crate::models::{Assignment, Course, Role, Subject};
use crate::scope::RequestScope;
use tracing::info;

/// "Gestión académica": subjects, courses and which subjects each course offers.
pub struct AcademicView {
    ctx: ViewContext,
    scope: RequestScope,
    pub subjects: Vec<Subject>,
    pub courses: Vec<Course>,
    pub assignments: Vec<Assignment>,
    pub groups: Vec<CourseGroup>,
    /// One message per list that failed to load.
    pub errors: Vec<String>,
}

impl AcademicView {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self {
            ctx,
            scope,
            subjects: Vec::new(),
            courses: Vec::new(),
            assignments: Vec::new(),
            groups: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.ctx.session.require_role(Role::Administrator)?;
        let gateway = &self.ctx.gateway;
        let (subjects, courses, assignments) = self
            .scope
            .run(async {
                Ok::<_, ClientError>(tokio::join!(
                    gateway.subjects(),
                    gateway.courses(),
                    gateway.assignments()
                ))
            })
            .await?;

        let mut errors = Vec::new();
        let subjects = or_empty("materias", subjects, &mut errors)?;
        let courses = or_empty("cursos", courses, &mut errors)?;
        let assignments = or_empty("asignaciones", assignments, &mut errors)?;

        self.groups = group_by_course(&assignments);
        self.subjects = subjects;
        self.courses = courses;
        self.assignments = assignments;
        self.errors = errors;
        Ok(())
    }

    pub async fn create_subject(&mut self, name: &str) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        let name = require_non_empty(name, "El nombre de la materia es obligatorio")?;
        let message = self.scope.run(self.ctx.gateway.create_subject(&name)).await?;
        self.load().await?;
        Ok(message)
    }

    pub async fn delete_subject(&mut self, id: SubjectId) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        let message = self.scope.run(self.ctx.gateway.delete_subject(id)).await?;
        self.load().await?;
        Ok(message)
    }

    pub async fn create_course(&mut self, name: &str, status: Option<&str>) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        let name = require_non_empty(name, "El nombre del curso es obligatorio")?;
        let message = self
            .scope
            .run(self.ctx.gateway.create_course(&name, status))
            .await?;
        self.load().await?;
        Ok(message)
    }

    pub async fn delete_course(&mut self, id: CourseId) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        let message = self.scope.run(self.ctx.gateway.delete_course(id)).await?;
        self.load().await?;
        Ok(message)
    }

    /// Offer `subject_id` in `course_id`. The current assignments are fetched and checked
    /// first; a duplicate pair is rejected without sending the create call.
    pub async fn assign(&mut self, course_id: CourseId, subject_id: SubjectId) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        let existing = self.scope.run(self.ctx.gateway.assignments()).await?;
        ensure_unique_assignment(&existing, course_id, subject_id)?;

        let message = self
            .scope
            .run(self.ctx.gateway.create_assignment(course_id, subject_id))
            .await?;
        info!(course_id = %course_id, subject_id = %subject_id, "subject assigned to course");
        self.load().await?;
        Ok(message)
    }

    pub async fn unassign(&mut self, id: AssignmentId) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        let message = self.scope.run(self.ctx.gateway.delete_assignment(id)).await?;
        self.load().await?;
        Ok(message)
    }

    pub fn course_name(&self, id: CourseId) -> Option<&str> {
        self.courses.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }
}
