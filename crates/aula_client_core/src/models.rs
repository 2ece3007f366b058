//! Data models for users, courses, subjects, assignments and payments.
//! Field names are English; the backend's Spanish wire keys are accepted through serde aliases.

use crate::ids::{AssignmentId, CourseId, PaymentId, SubjectId, UserId};
use crate::months::YearMonth;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Role of a logged-in user, read from the backend's free-text `type` column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Administrator,
    /// Any other type. Grants access to neither role's screens.
    Other(String),
}

impl Role {
    pub fn from_type(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        if lower.contains("alumno") || lower.contains("student") {
            Role::Student
        } else if lower.contains("admin") {
            Role::Administrator
        } else {
            Role::Other(raw.trim().to_string())
        }
    }

    pub fn as_type(&self) -> &str {
        match self {
            Role::Student => "Alumno",
            Role::Administrator => "Administrador",
            Role::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_type())
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.as_type())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = Option::<String>::deserialize(de)?.unwrap_or_default();
        Ok(Role::from_type(&s))
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Other(String::new())
    }
}

/// User row as returned by `GET /users/all`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dni: Option<String>,
    #[serde(default, rename = "firstname", alias = "firstName", alias = "first_name")]
    pub first_name: String,
    #[serde(default, rename = "lastname", alias = "lastName", alias = "last_name")]
    pub last_name: String,
    #[serde(default, rename = "type", alias = "role")]
    pub role: Role,
}

impl User {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name, &self.username)
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}

/// Body of `POST /users/signup` (admin create) and `PUT /users/profile/{id}` (admin update).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserForm {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub email: String,
    pub dni: i64,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    #[serde(rename = "type")]
    pub role: Role,
}

/// Identity and role kept in the session after login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        full_name(&self.first_name, &self.last_name, &self.username)
    }
}

/// `user` object in the login response (the backend's `user_details` row).
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct LoginUser {
    pub user_id: UserId,
    #[serde(default, rename = "firstName", alias = "firstname", alias = "first_name")]
    pub first_name: String,
    #[serde(default, rename = "lastName", alias = "lastname", alias = "last_name")]
    pub last_name: String,
    #[serde(default, rename = "type", alias = "role")]
    pub role: Role,
}

/// Envelope shared by the login, signup and profile endpoints.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct StatusEnvelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    pub user: Option<T>,
    #[serde(default, alias = "detail")]
    pub message: Option<String>,
}

impl<T> StatusEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// User created by `POST /users/signup`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedUpUser {
    pub id: UserId,
    pub username: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dni: Option<String>,
    #[serde(default, rename = "firstname", alias = "firstName", alias = "first_name")]
    pub first_name: String,
    #[serde(default, rename = "lastname", alias = "lastName", alias = "last_name")]
    pub last_name: String,
    #[serde(default, rename = "type", alias = "role")]
    pub role: Role,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl Profile {
    pub fn initials(&self) -> String {
        let first = self.first_name.trim().chars().next();
        let last = self.last_name.trim().chars().next();
        match (first, last) {
            (Some(f), Some(l)) => format!("{}{}", f, l).to_uppercase(),
            (Some(c), None) | (None, Some(c)) => c.to_uppercase().to_string(),
            (None, None) => self
                .username
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_else(|| "U".to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A subject taught within courses. Served by the backend's `/careers/*` routes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    #[serde(alias = "nombre")]
    pub name: String,
}

/// "Subject X is offered in course Y."
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    #[serde(rename = "curso_id", alias = "course_id", alias = "courseId")]
    pub course_id: CourseId,
    #[serde(default, rename = "curso_nombre", alias = "course_name", alias = "courseName")]
    pub course_name: String,
    #[serde(
        rename = "carrera_id",
        alias = "subject_id",
        alias = "subjectId",
        alias = "career_id",
        alias = "materia_id"
    )]
    pub subject_id: SubjectId,
    #[serde(
        default,
        rename = "carrera_nombre",
        alias = "subject_name",
        alias = "subjectName",
        alias = "materia_nombre"
    )]
    pub subject_name: String,
}

/// A payment recorded by an administrator. Never mutated once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(alias = "id_pago")]
    pub id: PaymentId,
    #[serde(alias = "monto")]
    pub amount: Decimal,
    #[serde(
        default,
        alias = "fecha_pago",
        alias = "fecha_de_pago",
        alias = "afecha de pago",
        alias = "created_at",
        deserialize_with = "lenient_date"
    )]
    pub payment_date: Option<chrono::NaiveDate>,
    /// Raw wire value; only the leading `YYYY-MM` is significant. Kept unparsed so one
    /// malformed record can be skipped without failing the whole list.
    #[serde(alias = "mes_afectado", alias = "mes_pagado", alias = "affect_month")]
    pub affected_month: String,
    #[serde(
        default,
        alias = "curso",
        alias = "curso_afectado",
        alias = "carrera",
        alias = "carrera afectada"
    )]
    pub course_name: String,
    #[serde(default, alias = "user_id", alias = "id_alumno", alias = "id_usuario")]
    pub student_id: Option<UserId>,
    #[serde(default, alias = "alumno", alias = "usuario")]
    pub student_name: String,
}

impl Payment {
    /// Parsed affected month, or `None` when the wire value is malformed.
    pub fn affected_year_month(&self) -> Option<YearMonth> {
        YearMonth::parse(&self.affected_month).ok()
    }
}

/// Form data for `POST /payment/add`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPayment {
    pub student_id: Option<UserId>,
    pub course_id: Option<CourseId>,
    pub amount: Decimal,
    pub month: String,
}

/// Wire body of `POST /payment/add`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct PaymentRequest {
    pub user_id: UserId,
    pub curso_id: CourseId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub affect_month: chrono::NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SubjectState {
    Cursando,
    Aprobado,
    Desaprobado,
    Pendiente,
    Other(String),
}

impl SubjectState {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "cursando" => SubjectState::Cursando,
            "aprobado" => SubjectState::Aprobado,
            "desaprobado" => SubjectState::Desaprobado,
            "pendiente" => SubjectState::Pendiente,
            _ => SubjectState::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SubjectState::Cursando => "Cursando",
            SubjectState::Aprobado => "Aprobado",
            SubjectState::Desaprobado => "Desaprobado",
            SubjectState::Pendiente => "Pendiente",
            SubjectState::Other(s) => s.as_str(),
        }
    }
}

impl<'de> Deserialize<'de> for SubjectState {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = Option::<String>::deserialize(de)?.unwrap_or_default();
        Ok(SubjectState::from_wire(&s))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CursadaCourse {
    pub id: CourseId,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "anio_escolar")]
    pub school_year: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CursadaSubject {
    pub id: SubjectId,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "estado")]
    pub state: SubjectState,
}

/// Response of `GET /user/mi-cursada`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cursada {
    #[serde(alias = "curso")]
    pub course: CursadaCourse,
    #[serde(default, alias = "materias")]
    pub subjects: Vec<CursadaSubject>,
}

fn full_name(first: &str, last: &str, fallback: &str) -> String {
    let joined = format!("{} {}", first.trim(), last.trim());
    let joined = joined.trim();
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined.to_string()
    }
}

/// Accept `YYYY-MM-DD` or a datetime whose first ten characters are a date.
/// Malformed or missing values become `None` instead of failing the record.
fn lenient_date<'de, D>(de: D) -> Result<Option<chrono::NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.and_then(|s| {
        let head = s.trim().get(..10)?;
        chrono::NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }))
}

/// DNI comes back as a number from `/users/all` and as a string from older endpoints.
fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(de)?;
    Ok(match v {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
