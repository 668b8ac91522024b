//! In-memory repositories and request helpers for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    app::build_app,
    applications::{
        repo::ApplicationRepository,
        repo_types::{ApplicationPatch, JobApplication, NewApplication},
    },
    auth::{
        repo::UserRepository,
        repo_types::{NewUser, User},
    },
    state::AppState,
};

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<Option<User>> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(created.clone());
        Ok(Some(created))
    }
}

#[derive(Default)]
pub struct MemoryApplications {
    rows: Mutex<Vec<JobApplication>>,
}

#[async_trait]
impl ApplicationRepository for MemoryApplications {
    async fn list(&self, owner_id: Uuid) -> anyhow::Result<Vec<JobApplication>> {
        let rows = self.rows.lock().unwrap();
        // Reverse insertion order first so equal timestamps still list newest first.
        let mut owned: Vec<_> = rows
            .iter()
            .rev()
            .filter(|a| a.user_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn create(&self, owner_id: Uuid, new: NewApplication) -> anyhow::Result<JobApplication> {
        let now = OffsetDateTime::now_utc();
        let row = JobApplication {
            id: Uuid::new_v4(),
            user_id: owner_id,
            company: new.company,
            role_title: new.role_title,
            location: new.location,
            status: new.status,
            url: new.url,
            salary_range: new.salary_range,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> anyhow::Result<Option<JobApplication>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|a| a.id == id && a.user_id == owner_id)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> anyhow::Result<Option<JobApplication>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        row.apply(patch, OffsetDateTime::now_utc());
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.rows.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }
}

/// Sends a JSON request through the router and decodes the JSON reply.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = router
        .clone()
        .oneshot(req.body(body).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Like [`send`] without a body, returning the reply as text.
pub async fn send_raw(router: &Router, method: &str, uri: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            router: build_app(AppState::fake()),
        }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        send(
            &self.router,
            "POST",
            "/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        send(
            &self.router,
            "POST",
            "/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers and logs in, returning the session token.
    pub async fn signup(&self, name: &str, email: &str) -> String {
        let (status, _) = self.register(name, email, "password123").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login(email, "password123").await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}
