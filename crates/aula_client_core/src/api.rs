//! HTTP client for the institute backend (auth, users, courses, subjects, assignments, payments).
//!
//! Every call is independent: no retries, no ordering between concurrent calls. The bearer
//! token is read from the shared [`Session`] per request.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::ids::{AssignmentId, CourseId, PaymentId, SubjectId, UserId};
use crate::models::{
    Assignment, Course, Cursada, LoginUser, Payment, PaymentRequest, Profile, SessionUser,
    SignedUpUser, StatusEnvelope, Subject, User, UserForm,
};
use crate::months::YearMonth;
use crate::session::Session;
use reqwest::{Method, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Token and identity returned by a successful login.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub token: String,
    pub user: SessionUser,
}

pub struct Gateway {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<Session>,
}

impl Gateway {
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.url(path);
        debug!(%method, %url, "backend request");
        let req = self.http.request(method, url);
        match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send and return the body of a 2xx response; anything else becomes `Http`.
    async fn send(&self, req: RequestBuilder) -> Result<String> {
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            let message = error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            warn!(status = status.as_u16(), %message, "backend returned an error");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(text)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, wrapper_key: &str) -> Result<Vec<T>> {
        let text = self.send(self.request(Method::GET, path)).await?;
        decode_list(&text, wrapper_key)
    }

    async fn write(&self, method: Method, path: &str, body: Option<Value>) -> Result<String> {
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let text = self.send(req).await?;
        let message = ack_message(&text)?;
        info!(path, %message, "backend write accepted");
        Ok(message)
    }

    // Auth

    /// POST /users/loginUser. A 200 without `status: "success"` is a rejection.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let body = json!({ "username": username, "password": password });
        let text = self
            .send(self.request(Method::POST, "/users/loginUser").json(&body))
            .await?;
        let envelope: StatusEnvelope<LoginUser> = serde_json::from_str(&text)?;
        if !envelope.is_success() {
            return Err(ClientError::Rejected(
                envelope.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        let token = envelope
            .token
            .ok_or_else(|| ClientError::Rejected("No token in response".to_string()))?;
        let user = envelope
            .user
            .ok_or_else(|| ClientError::Rejected("No user in response".to_string()))?;
        Ok(LoginOutcome {
            token,
            user: SessionUser {
                user_id: user.user_id,
                username: username.to_string(),
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role,
            },
        })
    }

    /// POST /users/signup with credentials only (self-service account).
    pub async fn signup(&self, username: &str, password: &str) -> Result<SignedUpUser> {
        let body = json!({ "username": username, "password": password });
        let req = self.request(Method::POST, "/users/signup").json(&body);
        let text = match self.send(req).await {
            Ok(text) => text,
            // Signup reports "username taken" as a 400 with a message body.
            Err(ClientError::Http { status: 400, message }) => return Err(ClientError::Rejected(message)),
            Err(e) => return Err(e),
        };
        let envelope: StatusEnvelope<SignedUpUser> = serde_json::from_str(&text)?;
        match (envelope.is_success(), envelope.user) {
            (true, Some(user)) => Ok(user),
            (_, _) => Err(ClientError::Rejected(
                envelope.message.unwrap_or_else(|| "Unknown error".to_string()),
            )),
        }
    }

    // Users

    pub async fn users(&self) -> Result<Vec<User>> {
        self.get_list("/users/all", "users").await
    }

    pub async fn create_user(&self, form: &UserForm) -> Result<String> {
        self.write(Method::POST, "/users/signup", Some(serde_json::to_value(form)?))
            .await
    }

    pub async fn update_user(&self, id: UserId, form: &UserForm) -> Result<String> {
        let path = format!("/users/profile/{}", id);
        self.write(Method::PUT, &path, Some(serde_json::to_value(form)?))
            .await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<String> {
        self.write(Method::DELETE, &format!("/users/{}", id), None).await
    }

    /// GET /users/profile/{id}; the profile arrives wrapped as `{status, user}`.
    pub async fn profile(&self, id: UserId) -> Result<Profile> {
        let text = self
            .send(self.request(Method::GET, &format!("/users/profile/{}", id)))
            .await?;
        let value: Value = serde_json::from_str(&text)?;
        let mut user = match value {
            Value::Object(mut map) if map.contains_key("user") => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        if let Value::Object(map) = &mut user {
            map.entry("user_id").or_insert_with(|| json!(id.get()));
        }
        Ok(serde_json::from_value(user)?)
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<String> {
        let body = json!({ "current_password": current, "new_password": new });
        self.write(Method::PUT, "/users/change-password", Some(body))
            .await
    }

    // Courses and subjects

    pub async fn courses(&self) -> Result<Vec<Course>> {
        self.get_list("/cursos/all", "cursos").await
    }

    pub async fn create_course(&self, name: &str, status: Option<&str>) -> Result<String> {
        let body = json!({ "name": name, "status": status });
        self.write(Method::POST, "/curso/AddCurso", Some(body)).await
    }

    pub async fn delete_course(&self, id: CourseId) -> Result<String> {
        self.write(Method::DELETE, &format!("/curso/delete/{}", id), None)
            .await
    }

    pub async fn subjects(&self) -> Result<Vec<Subject>> {
        self.get_list("/careers/all", "careers").await
    }

    pub async fn create_subject(&self, name: &str) -> Result<String> {
        self.write(Method::POST, "/careers/add", Some(json!({ "name": name })))
            .await
    }

    pub async fn delete_subject(&self, id: SubjectId) -> Result<String> {
        self.write(Method::DELETE, &format!("/careers/{}", id), None)
            .await
    }

    // Assignments and enrollment

    pub async fn assignments(&self) -> Result<Vec<Assignment>> {
        self.get_list("/asignaciones/all", "asignaciones").await
    }

    /// POST /asignaciones/. Callers run the duplicate check first; this only sends.
    pub async fn create_assignment(&self, course_id: CourseId, subject_id: SubjectId) -> Result<String> {
        let body = json!({ "curso_id": course_id.get(), "career_id": subject_id.get() });
        self.write(Method::POST, "/asignaciones/", Some(body)).await
    }

    pub async fn delete_assignment(&self, id: AssignmentId) -> Result<String> {
        self.write(Method::DELETE, &format!("/asignaciones/{}", id), None)
            .await
    }

    pub async fn enroll(&self, student_id: UserId, course_id: CourseId) -> Result<String> {
        let body = json!({ "id_user": student_id.get(), "id_curso": course_id.get() });
        self.write(Method::POST, "/user/addcurso", Some(body)).await
    }

    pub async fn my_course(&self) -> Result<Cursada> {
        let text = self
            .send(self.request(Method::GET, "/user/mi-cursada"))
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    // Payments

    pub async fn all_payments(&self) -> Result<Vec<Payment>> {
        self.get_list("/payment/all/detailled", "payments").await
    }

    pub async fn student_payments(&self, student_id: UserId) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .get_list(&format!("/payment/user/{}", student_id), "payments")
            .await?;
        // The per-student endpoint omits the owner; it is implied by the path.
        for p in payments.iter_mut() {
            p.student_id.get_or_insert(student_id);
        }
        Ok(payments)
    }

    /// POST /payment/add. `month` is sent as the first day of the month.
    pub async fn record_payment(
        &self,
        student_id: UserId,
        course_id: CourseId,
        amount: Decimal,
        month: YearMonth,
    ) -> Result<String> {
        let body = PaymentRequest {
            user_id: student_id,
            curso_id: course_id,
            amount,
            affect_month: month.first_day(),
        };
        self.write(Method::POST, "/payment/add", Some(serde_json::to_value(&body)?))
            .await
    }

    pub async fn delete_payment(&self, id: PaymentId) -> Result<String> {
        self.write(Method::DELETE, &format!("/payment/delete/{}", id), None)
            .await
    }
}

/// A list endpoint answers with a bare array, an object wrapping the array under
/// `wrapper_key`, `null` when the backend swallowed an error, or a plain string message.
fn decode_list<T: DeserializeOwned>(text: &str, wrapper_key: &str) -> Result<Vec<T>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
        Value::Object(mut map) => match map.remove(wrapper_key) {
            Some(items) => Ok(serde_json::from_value(items)?),
            None => Err(ClientError::Rejected(
                object_message(&map).unwrap_or_else(|| "Unexpected response".to_string()),
            )),
        },
        Value::String(message) => Err(ClientError::Rejected(message)),
        other => Err(ClientError::Rejected(format!("Unexpected response: {}", other))),
    }
}

/// Message of a successful write: a JSON string, an object's `message`/`detail`, or the raw text.
/// An object carrying `error` is a rejection reported with status 200.
fn ack_message(text: &str) -> Result<String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::String(s)) => Ok(s),
        Ok(Value::Object(map)) => {
            if let Some(err) = map.get("error").and_then(Value::as_str) {
                return Err(ClientError::Rejected(err.to_string()));
            }
            if map.get("status").and_then(Value::as_str) == Some("error") {
                return Err(ClientError::Rejected(
                    object_message(&map).unwrap_or_else(|| "Unknown error".to_string()),
                ));
            }
            Ok(object_message(&map).unwrap_or_default())
        }
        Ok(Value::Null) => Ok(String::new()),
        Ok(other) => Ok(other.to_string()),
        Err(_) => Ok(text.trim().to_string()),
    }
}

fn object_message(map: &serde_json::Map<String, Value>) -> Option<String> {
    let pick = |key: &str| match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        // FastAPI validation errors: [{ "msg": "...", ... }]
        Value::Array(items) => items
            .iter()
            .find_map(|i| i.get("msg").and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    };
    pick("message").or_else(|| pick("detail"))
}

fn error_message(text: &str) -> Option<String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => object_message(&map),
        Ok(Value::String(s)) => Some(s),
        Ok(_) => None,
        Err(_) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}
