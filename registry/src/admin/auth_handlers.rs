use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use sea_orm::EntityTrait;

use crate::auth::AuthApiError;
use crate::entity::app_user;

use super::{
    AdminState, ApiErr,
    dto::{LoginRequest, LoginResponse, UserResponse},
    extract::ApiJson,
    jwt::{AuthClaims, Claims, encode_jwt},
};

pub async fn login(
    State(state): State<AdminState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiErr> {
    let user = state
        .auth
        .authenticate(&body.username, &body.password)
        .await
        .map_err(|e| match e {
            AuthApiError::Db(_) | AuthApiError::Hash(_) => ApiErr::internal(e),
            _ => {
                tracing::info!(username = %body.username, reason = %e, "login rejected");
                ApiErr::new(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
        })?;

    let exp = (Utc::now().timestamp() as u64) + state.jwt_expiry_hours * 3600;
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        org_id: user.org_id.clone(),
        exp,
    };

    let token = encode_jwt(&claims, &state.jwt_secret).map_err(ApiErr::internal)?;

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

pub async fn me(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
) -> Result<Json<UserResponse>, ApiErr> {
    let user = app_user::Entity::find_by_id(claims.sub)
        .one(state.auth.db())
        .await
        .map_err(ApiErr::internal)?
        .ok_or_else(|| ApiErr::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}
