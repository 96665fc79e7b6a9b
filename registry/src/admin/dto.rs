use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto;
use crate::entity::app_user;
use crate::model::Source;

// ---------- auth ----------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub org_id: String,
    pub is_active: bool,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<app_user::Model> for UserResponse {
    fn from(m: app_user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            org_id: m.org_id,
            is_active: m.is_active,
            last_login_at: m.last_login_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

// ---------- source requests ----------

#[derive(Debug, Deserialize)]
pub struct CreateSourceRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    /// Connection payload; secret fields are sealed before storage.
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSourceRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    /// Partial config, merged into the stored one.
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct CheckNameQuery {
    pub name: String,
}

// ---------- source responses ----------

#[derive(Debug, Serialize)]
pub struct NameAvailableResponse {
    pub available: bool,
}

/// The record as clients see it: same shape, secret config values blanked.
/// A config that is not valid JSON is returned untouched.
pub fn source_response(mut source: Source) -> Source {
    if let Some(text) = source.config.as_deref()
        && let Ok(mut value) = serde_json::from_str::<serde_json::Value>(text)
    {
        crypto::mask_secrets(&mut value);
        source.config = Some(value.to_string());
    }
    source
}
