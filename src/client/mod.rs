//! HTTP client for the JobTrack API, plus the local filtering and
//! rendering used by the `jobtrack` terminal dashboard.

pub mod filter;
pub mod render;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::{
    applications::{
        dto::{
            ApplicationListResponse, ApplicationResponse, CreateApplicationRequest,
            UpdateApplicationRequest,
        },
        repo_types::JobApplication,
    },
    auth::{dto::LoginResponse, repo_types::Identity},
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("not logged in: run `jobtrack login` and export JOBTRACK_TOKEN")]
    NotLoggedIn,

    #[error("invalid server url: {0}")]
    BadUrl(#[from] url::ParseError),

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Picks a human-readable message out of an error body.
///
/// Understands `{ "error": "msg" }` and the field-grouped shape
/// `{ "error": { "formErrors": [..], "fieldErrors": { "f": [..] } } }`.
pub fn extract_error_message(body: &Value, fallback: &str) -> String {
    let error = &body["error"];
    if let Some(msg) = error.as_str() {
        return msg.to_string();
    }
    let form = error["formErrors"]
        .as_array()
        .and_then(|errs| errs.first())
        .and_then(Value::as_str);
    let field = error["fieldErrors"].as_object().and_then(|fields| {
        fields
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .find_map(Value::as_str)
    });
    form.or(field).unwrap_or(fallback).to_string()
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> ClientResult<Self> {
        let mut base = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.base.join(path)?;
        Ok(self.http.request(method, url))
    }

    fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    async fn decode<T: DeserializeOwned>(res: Response, fallback: &str) -> ClientResult<T> {
        let status = res.status();
        if status.is_success() {
            return Ok(res.json::<T>().await?);
        }
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        Err(ClientError::Api {
            status,
            message: extract_error_message(&body, fallback),
        })
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> ClientResult<()> {
        let res = self
            .request(Method::POST, "register")?
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        Self::decode::<Value>(res, "Failed to register").await?;
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let res = self
            .request(Method::POST, "login")?
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        // Any login failure reads the same to the user.
        Self::decode(res, "Invalid credentials")
            .await
            .map_err(|e| match e {
                ClientError::Api { status, .. } => ClientError::Api {
                    status,
                    message: "Invalid credentials".into(),
                },
                other => other,
            })
    }

    pub async fn me(&self) -> ClientResult<Identity> {
        let res = self.authed(Method::GET, "me")?.send().await?;
        Self::decode(res, "Failed to load session").await
    }

    pub async fn list(&self) -> ClientResult<Vec<JobApplication>> {
        let res = self.authed(Method::GET, "applications")?.send().await?;
        let body: ApplicationListResponse =
            Self::decode(res, "Failed to load applications").await?;
        Ok(body.applications)
    }

    pub async fn create(&self, req: &CreateApplicationRequest) -> ClientResult<JobApplication> {
        let res = self
            .authed(Method::POST, "applications")?
            .json(req)
            .send()
            .await?;
        let body: ApplicationResponse =
            Self::decode(res, "Failed to create application").await?;
        Ok(body.application)
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateApplicationRequest,
    ) -> ClientResult<JobApplication> {
        let res = self
            .authed(Method::PATCH, &format!("applications/{id}"))?
            .json(req)
            .send()
            .await?;
        let body: ApplicationResponse = Self::decode(res, "Failed to update status").await?;
        Ok(body.application)
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        let res = self
            .authed(Method::DELETE, &format!("applications/{id}"))?
            .send()
            .await?;
        Self::decode::<Value>(res, "Failed to delete").await?;
        Ok(())
    }
}
