//! Shared fixtures for API tests: a file-backed database, the in-memory
//! object store and a fully layered router.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::NaiveDate;
use chrono_tz::Tz;
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::client::Role;
use shared::models::{Admin, AdminCreate, Gender, Staff, StaffCreate};
use tempfile::TempDir;
use tower::ServiceExt;

use timescale_server::auth::JwtConfig;
use timescale_server::core::config::StorageBackend;
use timescale_server::db::DbService;
use timescale_server::services::superuser::create_superuser;
use timescale_server::storage::MemoryStore;
use timescale_server::{Config, ServerState, api};

pub const BOUNDARY: &str = "timescale-test-boundary";

pub struct TestApp {
    pub state: ServerState,
    pub store: Arc<MemoryStore>,
    app: Router,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn code(&self) -> Option<u64> {
        self.body["code"].as_u64()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

fn test_config(database_url: String) -> Config {
    Config {
        database_url,
        http_port: 0,
        environment: "test".into(),
        business_timezone: Tz::UTC,
        jwt: JwtConfig {
            secret: "integration-test-secret-with-enough-length".into(),
            expiration_minutes: 60,
            issuer: "timescale-server".into(),
            audience: "timescale-clients".into(),
        },
        storage_backend: StorageBackend::Memory,
        s3_endpoint: None,
        images_bucket: "images".into(),
        log_level: "info".into(),
        log_dir: None,
    }
}

pub async fn spawn() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("timescale.db").display());
    let config = test_config(url);
    let db = DbService::new(&config.database_url).await.unwrap();
    let store = Arc::new(MemoryStore::new());
    let state = ServerState::new(config, db.pool, store.clone());
    let app = api::build_app(&state).with_state(state.clone());
    TestApp {
        state,
        store,
        app,
        _dir: dir,
    }
}

pub fn staff_form(aadhar: &str, email: &str, role: &str) -> StaffCreate {
    StaffCreate {
        name: Some("Meera Nair".into()),
        registration_id: None,
        aadhar: Some(aadhar.into()),
        password: Some("staff-pass-1".into()),
        dob: NaiveDate::from_ymd_opt(1990, 3, 12),
        gender: Some(Gender::Female),
        email: Some(email.into()),
        mobile: Some("9876543210".into()),
        alternate_mobile: None,
        role: Some(role.into()),
        address: Some("12 Lake Road".into()),
        city: Some("Kochi".into()),
        pincode: Some("682001".into()),
        schedule_id: None,
    }
}

impl TestApp {
    pub fn token(&self, id: i64, role: Role) -> String {
        self.state.jwt.generate_token(id, "tester", role).unwrap()
    }

    pub async fn admin(&self) -> (Admin, String) {
        let admin = create_superuser(
            &self.state.pool,
            AdminCreate {
                name: "root".into(),
                email: "root@example.com".into(),
                password: "admin-pass-1".into(),
                gender: Gender::Other,
            },
        )
        .await
        .unwrap();
        let token = self.token(admin.id, Role::Admin);
        (admin, token)
    }

    pub async fn staff(&self, aadhar: &str, email: &str) -> (Staff, String) {
        let created = self
            .state
            .staff
            .add(staff_form(aadhar, email, "Cashier"), None)
            .await
            .unwrap();
        let token = self.token(created.staff.id, Role::Staff);
        (created.staff, token)
    }

    pub async fn manager(&self, aadhar: &str, email: &str) -> (Staff, String) {
        let created = self
            .state
            .staff
            .add(staff_form(aadhar, email, "Manager"), None)
            .await
            .unwrap();
        let token = self.token(created.staff.id, Role::Manager);
        (created.staff, token)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        data: &Value,
        picture: Option<(&str, &[u8])>,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(data, picture)))
            .unwrap();
        self.send(request).await
    }
}

pub fn multipart_body(data: &Value, picture: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data\"\r\nContent-Type: application/json\r\n\r\n{data}\r\n"
        )
        .as_bytes(),
    );
    if let Some((file_name, bytes)) = picture {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"picture\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
