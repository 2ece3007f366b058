//! Axum fake of the institute REST backend, bound to 127.0.0.1:0.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Datelike;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{months_so_far, ANA_ID, BRUNO_ID};

/// A write call the backend received.
#[derive(Clone, Debug)]
pub struct Write {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

#[derive(Clone, Debug)]
pub struct FakeUser {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub dni: i64,
    pub first_name: String,
    pub last_name: String,
    pub kind: String,
}

#[derive(Clone, Debug)]
pub struct FakePayment {
    pub id: i64,
    /// `None` for legacy rows recorded without an owner.
    pub user_id: Option<i64>,
    pub course: String,
    pub amount: f64,
    pub paid_on: String,
    pub month: String,
}

/// Initial backend contents.
#[derive(Clone, Debug, Default)]
pub struct Seed {
    pub users: Vec<FakeUser>,
    pub courses: Vec<(i64, String)>,
    pub subjects: Vec<(i64, String)>,
    /// (id, course id, subject id)
    pub assignments: Vec<(i64, i64, i64)>,
    pub payments: Vec<FakePayment>,
}

impl Seed {
    /// Admin, two students, two courses, two subjects, assignments (1,10), (1,11), (2,10).
    /// Ana has paid every month so far this year; Bruno only last December; one payment
    /// has no owner.
    pub fn standard() -> Self {
        let user = |id: i64, username: &str, first: &str, last: &str, kind: &str| FakeUser {
            id,
            username: username.to_string(),
            password: format!("{}123", username),
            email: format!("{}@instituto.edu", username),
            dni: 40_000_000 + id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            kind: kind.to_string(),
        };
        let year = chrono::Local::now().year();

        let mut payments: Vec<FakePayment> = months_so_far()
            .into_iter()
            .enumerate()
            .map(|(i, month)| FakePayment {
                id: i as i64 + 1,
                user_id: Some(ANA_ID),
                course: "1º A".to_string(),
                amount: 15000.0,
                paid_on: format!("{}T10:00:00", month),
                month,
            })
            .collect();
        let next = payments.len() as i64 + 1;
        payments.push(FakePayment {
            id: next,
            user_id: Some(BRUNO_ID),
            course: "2º B".to_string(),
            amount: 12000.0,
            paid_on: format!("{}-12-05T09:00:00", year - 1),
            month: format!("{}-12-01", year - 1),
        });
        payments.push(FakePayment {
            id: next + 1,
            user_id: None,
            course: "2º B".to_string(),
            amount: 500.0,
            paid_on: format!("{}-06-02T09:00:00", year - 1),
            month: format!("{}-06-01", year - 1),
        });

        Self {
            users: vec![
                user(1, "admin", "Marta", "Suárez", "Administrador"),
                user(ANA_ID, "ana", "Ana", "Pérez", "Alumno"),
                user(BRUNO_ID, "bruno", "Bruno", "Díaz", "Alumno"),
            ],
            courses: vec![(1, "1º A".to_string()), (2, "2º B".to_string())],
            subjects: vec![(10, "Matemática".to_string()), (11, "Historia".to_string())],
            assignments: vec![(1, 1, 10), (2, 1, 11), (3, 2, 10)],
            payments,
        }
    }
}

#[derive(Default)]
struct Db {
    seed: Seed,
    next_id: i64,
    writes: Vec<Write>,
    payments_delay: Option<Duration>,
}

impl Db {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, method: Method, path: impl Into<String>, body: Value) {
        self.writes.push(Write {
            method,
            path: path.into(),
            body,
        });
    }

    fn user(&self, id: i64) -> Option<&FakeUser> {
        self.seed.users.iter().find(|u| u.id == id)
    }

    fn full_name(&self, id: Option<i64>) -> String {
        id.and_then(|id| self.user(id))
            .map(|u| format!("{} {}", u.first_name, u.last_name))
            .unwrap_or_default()
    }

    /// User behind `Authorization: Bearer token-<id>`.
    fn caller(&self, headers: &HeaderMap) -> Option<&FakeUser> {
        let raw = headers.get("authorization")?.to_str().ok()?;
        let id: i64 = raw.strip_prefix("Bearer token-")?.parse().ok()?;
        self.user(id)
    }
}

type Shared = Arc<Mutex<Db>>;

pub struct FakeBackend {
    pub url: String,
    db: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start(seed: Seed) -> Self {
        let next_id = 1000;
        let db: Shared = Arc::new(Mutex::new(Db {
            seed,
            next_id,
            ..Db::default()
        }));
        let app = router(db.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        Self {
            url: format!("http://{}", addr),
            db,
            server,
        }
    }

    pub fn writes(&self) -> Vec<Write> {
        self.db.lock().unwrap().writes.clone()
    }

    pub fn writes_to(&self, method: Method, path: &str) -> Vec<Write> {
        self.writes()
            .into_iter()
            .filter(|w| w.method == method && w.path == path)
            .collect()
    }

    /// Hold every payments response for `delay`.
    pub fn slow_payments(&self, delay: Duration) {
        self.db.lock().unwrap().payments_delay = Some(delay);
    }

    pub fn assignment_count(&self) -> usize {
        self.db.lock().unwrap().seed.assignments.len()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(db: Shared) -> Router {
    Router::new()
        .route("/users/loginUser", post(login))
        .route("/users/signup", post(signup))
        .route("/users/all", get(list_users))
        .route("/users/change-password", put(change_password))
        .route("/users/profile/:id", get(get_profile).put(update_user))
        .route("/users/:id", delete(delete_user))
        .route("/cursos/all", get(list_courses))
        .route("/curso/AddCurso", post(add_course))
        .route("/curso/delete/:id", delete(delete_course))
        .route("/careers/all", get(list_subjects))
        .route("/careers/add", post(add_subject))
        .route("/careers/:id", delete(delete_subject))
        .route("/asignaciones/all", get(list_assignments))
        .route("/asignaciones/", post(add_assignment))
        .route("/asignaciones/:id", delete(delete_assignment))
        .route("/user/addcurso", post(enroll))
        .route("/user/mi-cursada", get(mi_cursada))
        .route("/payment/all/detailled", get(all_payments))
        .route("/payment/user/:id", get(user_payments))
        .route("/payment/add", post(add_payment))
        .route("/payment/delete/:id", delete(delete_payment))
        .with_state(db)
}

fn str_field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn login(State(db): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let db = db.lock().unwrap();
    let found = db.seed.users.iter().find(|u| {
        u.username == str_field(&body, "username") && u.password == str_field(&body, "password")
    });
    Json(match found {
        Some(u) => json!({
            "status": "success",
            "token": format!("token-{}", u.id),
            "user": {
                "id": u.id + 100,
                "dni": u.dni,
                "firstName": u.first_name,
                "lastName": u.last_name,
                "type": u.kind,
                "user_id": u.id
            },
            "message": "User logged in successfully"
        }),
        None => json!({ "message": "Invalid username or password" }),
    })
}

async fn signup(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    db.record(Method::POST, "/users/signup", body.clone());
    let username = str_field(&body, "username").to_string();
    if db.seed.users.iter().any(|u| u.username == username) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "El username ya existe" })),
        )
            .into_response();
    }
    let id = db.next_id();
    db.seed.users.push(FakeUser {
        id,
        username: username.clone(),
        password: str_field(&body, "password").to_string(),
        email: str_field(&body, "email").to_string(),
        dni: body.get("dni").and_then(Value::as_i64).unwrap_or_default(),
        first_name: str_field(&body, "firstname").to_string(),
        last_name: str_field(&body, "lastname").to_string(),
        kind: str_field(&body, "type").to_string(),
    });
    Json(json!({
        "status": "success",
        "user": { "id": id, "username": username },
        "message": "Usuario creado correctamente"
    }))
    .into_response()
}

async fn list_users(State(db): State<Shared>) -> Json<Value> {
    let db = db.lock().unwrap();
    let users: Vec<Value> = db
        .seed
        .users
        .iter()
        .map(|u| {
            json!({
                "id": u.id,
                "username": u.username,
                "email": u.email,
                "dni": u.dni,
                "firstname": u.first_name,
                "lastname": u.last_name,
                "type": u.kind
            })
        })
        .collect();
    Json(Value::Array(users))
}

async fn get_profile(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    let db = db.lock().unwrap();
    match db.user(id) {
        Some(u) => Json(json!({
            "status": "success",
            "user": {
                "username": u.username,
                "email": u.email,
                "dni": u.dni,
                "firstname": u.first_name,
                "lastname": u.last_name,
                "type": u.kind,
                "profile_picture": null
            }
        }))
        .into_response(),
        None => detail(StatusCode::NOT_FOUND, "Usuario no encontrado"),
    }
}

async fn update_user(State(db): State<Shared>, Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    let mut db = db.lock().unwrap();
    db.record(Method::PUT, format!("/users/profile/{}", id), body.clone());
    if let Some(u) = db.seed.users.iter_mut().find(|u| u.id == id) {
        u.first_name = str_field(&body, "firstname").to_string();
        u.last_name = str_field(&body, "lastname").to_string();
        u.email = str_field(&body, "email").to_string();
    }
    Json(json!({ "message": "Usuario actualizado" }))
}

async fn delete_user(State(db): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    let mut db = db.lock().unwrap();
    db.record(Method::DELETE, format!("/users/{}", id), Value::Null);
    db.seed.users.retain(|u| u.id != id);
    Json(json!({ "message": "Usuario eliminado" }))
}

async fn change_password(State(db): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    db.record(Method::PUT, "/users/change-password", body.clone());
    let Some(id) = db.caller(&headers).map(|u| u.id) else {
        return detail(StatusCode::UNAUTHORIZED, "Token inválido");
    };
    let Some(user) = db.seed.users.iter_mut().find(|u| u.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Usuario no encontrado");
    };
    if user.password != str_field(&body, "current_password") {
        return detail(StatusCode::BAD_REQUEST, "La contraseña actual es incorrecta");
    }
    user.password = str_field(&body, "new_password").to_string();
    Json(json!({ "message": "Contraseña actualizada correctamente" })).into_response()
}

async fn list_courses(State(db): State<Shared>) -> Json<Value> {
    let db = db.lock().unwrap();
    Json(
        db.seed
            .courses
            .iter()
            .map(|(id, name)| json!({ "id": id, "name": name, "status": "activo" }))
            .collect(),
    )
}

async fn add_course(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    db.record(Method::POST, "/curso/AddCurso", body.clone());
    let id = db.next_id();
    db.seed.courses.push((id, str_field(&body, "name").to_string()));
    (
        StatusCode::CREATED,
        Json(json!({ "detail": "Curso agregado correctamente" })),
    )
        .into_response()
}

async fn delete_course(State(db): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    let mut db = db.lock().unwrap();
    db.record(Method::DELETE, format!("/curso/delete/{}", id), Value::Null);
    db.seed.courses.retain(|(c, _)| *c != id);
    Json(json!({ "message": "Curso eliminado" }))
}

async fn list_subjects(State(db): State<Shared>) -> Json<Value> {
    let db = db.lock().unwrap();
    Json(
        db.seed
            .subjects
            .iter()
            .map(|(id, name)| json!({ "id": id, "name": name }))
            .collect(),
    )
}

async fn add_subject(State(db): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut db = db.lock().unwrap();
    db.record(Method::POST, "/careers/add", body.clone());
    let name = str_field(&body, "name").to_string();
    let id = db.next_id();
    db.seed.subjects.push((id, name.clone()));
    Json(Value::String(format!("Carrera {} guardada correctamente", name)))
}

async fn delete_subject(State(db): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    let mut db = db.lock().unwrap();
    db.record(Method::DELETE, format!("/careers/{}", id), Value::Null);
    db.seed.subjects.retain(|(s, _)| *s != id);
    Json(json!({ "message": "Materia eliminada" }))
}

async fn list_assignments(State(db): State<Shared>) -> Json<Value> {
    let db = db.lock().unwrap();
    let name = |list: &[(i64, String)], id: i64| {
        list.iter()
            .find(|(i, _)| *i == id)
            .map(|(_, n)| n.clone())
            .unwrap_or_default()
    };
    Json(
        db.seed
            .assignments
            .iter()
            .map(|(id, course, subject)| {
                json!({
                    "id": id,
                    "curso_id": course,
                    "curso_nombre": name(&db.seed.courses, *course),
                    "carrera_id": subject,
                    "carrera_nombre": name(&db.seed.subjects, *subject)
                })
            })
            .collect(),
    )
}

async fn add_assignment(State(db): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut db = db.lock().unwrap();
    db.record(Method::POST, "/asignaciones/", body.clone());
    let course = body.get("curso_id").and_then(Value::as_i64).unwrap_or_default();
    let subject = body.get("career_id").and_then(Value::as_i64).unwrap_or_default();
    let id = db.next_id();
    // Like the real backend, no uniqueness check here.
    db.seed.assignments.push((id, course, subject));
    Json(json!({ "message": "Asignación creada" }))
}

async fn delete_assignment(State(db): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    let mut db = db.lock().unwrap();
    db.record(Method::DELETE, format!("/asignaciones/{}", id), Value::Null);
    db.seed.assignments.retain(|(a, _, _)| *a != id);
    Json(json!({ "message": "Asignación eliminada" }))
}

async fn enroll(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    db.record(Method::POST, "/user/addcurso", body.clone());
    let user = body.get("id_user").and_then(Value::as_i64);
    let course = body.get("id_curso").and_then(Value::as_i64);
    let course_name = db
        .seed
        .courses
        .iter()
        .find(|(id, _)| Some(*id) == course)
        .map(|(_, n)| n.clone());
    match (db.user(user.unwrap_or_default()).is_some(), course_name) {
        (true, Some(course_name)) => {
            let text = format!("{} fue inscripto correctamente a {}", db.full_name(user), course_name);
            text.into_response()
        }
        _ => detail(StatusCode::NOT_FOUND, "Alumno o curso inexistente"),
    }
}

async fn mi_cursada(State(db): State<Shared>, headers: HeaderMap) -> Response {
    let db = db.lock().unwrap();
    if db.caller(&headers).is_none() {
        return detail(StatusCode::UNAUTHORIZED, "Token inválido");
    }
    Json(json!({
        "curso": { "id": 1, "nombre": "1º A", "anio_escolar": chrono::Local::now().year(), "status": "activo" },
        "materias": [
            { "id": 10, "nombre": "Matemática", "estado": "cursando" },
            { "id": 11, "nombre": "Historia", "estado": "aprobado" },
            { "id": 12, "nombre": "Física", "estado": "pendiente" }
        ]
    }))
    .into_response()
}

async fn payments_delay(db: &Shared) {
    let delay = db.lock().unwrap().payments_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

async fn all_payments(State(db): State<Shared>) -> Json<Value> {
    payments_delay(&db).await;
    let db = db.lock().unwrap();
    Json(
        db.seed
            .payments
            .iter()
            .map(|p| {
                let mut row = json!({
                    "id_pago": p.id,
                    "monto": p.amount,
                    "fecha_de_pago": p.paid_on,
                    "mes_pagado": p.month,
                    "alumno": db.full_name(p.user_id),
                    "curso_afectado": p.course
                });
                if let Some(id) = p.user_id {
                    row["id_alumno"] = json!(id);
                }
                row
            })
            .collect(),
    )
}

async fn user_payments(State(db): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    payments_delay(&db).await;
    let db = db.lock().unwrap();
    if db.user(id).is_none() {
        return Json(Value::String("Usuario no encontrado!".to_string()));
    }
    Json(
        db.seed
            .payments
            .iter()
            .filter(|p| p.user_id == Some(id))
            .map(|p| {
                json!({
                    "id": p.id,
                    "amount": p.amount,
                    "fecha_pago": p.paid_on,
                    "usuario": db.full_name(p.user_id),
                    "carrera": p.course,
                    "mes_afectado": p.month
                })
            })
            .collect(),
    )
}

async fn add_payment(State(db): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut db = db.lock().unwrap();
    db.record(Method::POST, "/payment/add", body.clone());
    let user_id = body.get("user_id").and_then(Value::as_i64);
    let course_id = body.get("curso_id").and_then(Value::as_i64);
    let course = db
        .seed
        .courses
        .iter()
        .find(|(id, _)| Some(*id) == course_id)
        .map(|(_, n)| n.clone())
        .unwrap_or_default();
    let id = db.next_id();
    let month = str_field(&body, "affect_month").to_string();
    db.seed.payments.push(FakePayment {
        id,
        user_id,
        course,
        amount: body.get("amount").and_then(Value::as_f64).unwrap_or_default(),
        paid_on: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        month,
    });
    Json(Value::String(format!(
        "Pago para el alumno {}, guardado",
        db.full_name(user_id)
    )))
}

async fn delete_payment(State(db): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    let mut db = db.lock().unwrap();
    db.record(Method::DELETE, format!("/payment/delete/{}", id), Value::Null);
    db.seed.payments.retain(|p| p.id != id);
    Json(json!({ "message": "Pago eliminado" }))
}
