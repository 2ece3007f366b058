//! Course/subject assignment grouping and the pre-insert duplicate check.

use crate::error::{ClientError, Result};
use crate::ids::{AssignmentId, CourseId, SubjectId};
use crate::models::Assignment;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupedSubject {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub assignment_id: AssignmentId,
}

/// Subjects offered in one course, in the order their assignments were listed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourseGroup {
    pub course_id: CourseId,
    pub course_name: String,
    pub subjects: Vec<GroupedSubject>,
}

/// Group assignments by course, keeping first-seen course order and encounter order within a course.
pub fn group_by_course(assignments: &[Assignment]) -> Vec<CourseGroup> {
    let mut groups: Vec<CourseGroup> = Vec::new();
    let mut index: HashMap<CourseId, usize> = HashMap::new();

    for a in assignments {
        let slot = *index.entry(a.course_id).or_insert_with(|| {
            groups.push(CourseGroup {
                course_id: a.course_id,
                course_name: a.course_name.clone(),
                subjects: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].subjects.push(GroupedSubject {
            subject_id: a.subject_id,
            subject_name: a.subject_name.clone(),
            assignment_id: a.id,
        });
    }
    groups
}

/// Reject `(course_id, subject_id)` if an existing assignment already links them.
/// Must run before the create call is sent.
pub fn ensure_unique_assignment(
    existing: &[Assignment],
    course_id: CourseId,
    subject_id: SubjectId,
) -> Result<()> {
    if existing
        .iter()
        .any(|a| a.course_id == course_id && a.subject_id == subject_id)
    {
        return Err(ClientError::DuplicateAssignment {
            course_id,
            subject_id,
        });
    }
    Ok(())
}
