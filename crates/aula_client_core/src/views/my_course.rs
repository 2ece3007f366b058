use super::ViewContext;
use crate::error::Result;
use crate::models::{Cursada, CursadaSubject, Role, SubjectState};
use crate::scope::RequestScope;
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub cursando: usize,
    pub aprobado: usize,
    pub desaprobado: usize,
    pub pendiente: usize,
    pub other: usize,
}

impl StateCounts {
    pub fn from_subjects(subjects: &[CursadaSubject]) -> Self {
        subjects.iter().fold(Self::default(), |mut acc, s| {
            match s.state {
                SubjectState::Cursando => acc.cursando += 1,
                SubjectState::Aprobado => acc.aprobado += 1,
                SubjectState::Desaprobado => acc.desaprobado += 1,
                SubjectState::Pendiente => acc.pendiente += 1,
                SubjectState::Other(_) => acc.other += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.cursando + self.aprobado + self.desaprobado + self.pendiente + self.other
    }
}

/// "Mi cursada": the student's current course and the state of each subject.
pub struct MyCourseView {
    ctx: ViewContext,
    scope: RequestScope,
    pub cursada: Option<Cursada>,
    pub counts: StateCounts,
}

impl MyCourseView {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self {
            ctx,
            scope,
            cursada: None,
            counts: StateCounts::default(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.ctx.session.require_role(Role::Student)?;
        let cursada = self.scope.run(self.ctx.gateway.my_course()).await?;
        self.counts = StateCounts::from_subjects(&cursada.subjects);
        self.cursada = Some(cursada);
        Ok(())
    }
}
