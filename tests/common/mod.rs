#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use report_desk_api::auth::hash_password;
use report_desk_api::config::AppConfig;
use report_desk_api::database::models::{NewUser, Role, User};
use report_desk_api::database::store::UserStore;
use report_desk_api::database::MemoryStore;
use report_desk_api::state::AppState;

pub const PASSWORD: &str = "password123";

/// Router plus the state behind it, backed by the in-memory store
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

/// A seeded account and a token for it
pub struct Account {
    pub user: User,
    pub token: String,
}

impl Account {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.storage.upload_dir = std::env::temp_dir()
            .join(format!("report-desk-test-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();
        config.storage.max_attachment_bytes = 1024;
        config.api.enable_request_logging = false;

        let state = AppState::with_local_storage(config, Arc::new(MemoryStore::new()));
        let router = report_desk_api::app(state.clone());
        Self { state, router }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Insert an account directly and mint a token for it
    pub async fn account(&self, email: &str, role: Role, department: Option<&str>) -> Result<Account> {
        let user = self
            .state
            .store
            .create_user(NewUser {
                name: email.split('@').next().unwrap_or(email).to_string(),
                email: email.to_string(),
                password_hash: hash_password(PASSWORD, 4)?,
                role,
                department: department.map(str::to_string),
            })
            .await?;
        let token = self.state.keys.issue(user.id, user.role)?;
        Ok(Account { user, token })
    }

    pub async fn user(&self, email: &str) -> Result<Account> {
        self.account(email, Role::User, None).await
    }

    pub async fn admin(&self, email: &str, department: &str) -> Result<Account> {
        self.account(email, Role::Admin, Some(department)).await
    }

    pub async fn superadmin(&self, email: &str) -> Result<Account> {
        self.account(email, Role::Superadmin, None).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok((status, body))
    }

    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, path, Some(token), None).await
    }

    /// Submit a JSON report and return its id
    pub async fn submit_report(&self, author: &Account, title: &str, category: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/api/reports",
                &author.token,
                serde_json::json!({
                    "title": title,
                    "description": "Quarterly figures",
                    "category": category,
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "submit failed: {} {}", status, body);
        body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("report id missing from response")
    }
}

/// multipart/form-data body with text fields and one optional file part
pub fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"attachment\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                boundary, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
