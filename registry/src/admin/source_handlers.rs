use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::model::Source;
use crate::source_store::{ListQuery, NewSource, SourceUpdate};

use super::{
    AdminState, ApiErr,
    extract::{ApiJson, ApiQuery},
    dto::{
        CheckNameQuery, CreateSourceRequest, NameAvailableResponse, PaginatedResponse,
        UpdateSourceRequest, source_response,
    },
    jwt::AuthClaims,
};

// ---------- GET /sources ----------

pub async fn list_sources(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
    ApiQuery(params): ApiQuery<ListQuery>,
) -> Result<Json<PaginatedResponse<Source>>, ApiErr> {
    let (items, total) = state.sources.list(&claims.org_id, &params).await?;

    Ok(Json(PaginatedResponse {
        data: items.into_iter().map(source_response).collect(),
        total,
        page: params.page(),
        page_size: params.page_size(),
    }))
}

// ---------- POST /sources ----------

pub async fn create_source(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
    ApiJson(body): ApiJson<CreateSourceRequest>,
) -> Result<(StatusCode, Json<Source>), ApiErr> {
    let input = NewSource {
        name: body.name,
        source_type: body.source_type,
        config: body
            .config
            .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
    };
    let source = state
        .sources
        .create(&claims.org_id, &claims.actor(), input)
        .await?;

    Ok((StatusCode::CREATED, Json(source_response(source))))
}

// ---------- GET /sources/check-name ----------

pub async fn check_name(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
    ApiQuery(params): ApiQuery<CheckNameQuery>,
) -> Result<Json<NameAvailableResponse>, ApiErr> {
    let available = state
        .sources
        .is_name_available(&claims.org_id, params.name.trim())
        .await?;
    Ok(Json(NameAvailableResponse { available }))
}

// ---------- GET /sources/{id} ----------

pub async fn get_source(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Result<Json<Source>, ApiErr> {
    let source = state.sources.get(&claims.org_id, &id).await?;
    Ok(Json(source_response(source)))
}

// ---------- PUT /sources/{id} ----------

pub async fn update_source(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateSourceRequest>,
) -> Result<Json<Source>, ApiErr> {
    let update = SourceUpdate {
        name: body.name,
        source_type: body.source_type,
        config: body.config,
    };
    let source = state
        .sources
        .update(&claims.org_id, &id, &claims.actor(), update)
        .await?;
    Ok(Json(source_response(source)))
}

// ---------- DELETE /sources/{id} ----------

pub async fn delete_source(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiErr> {
    state.sources.delete(&claims.org_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- PUT /sources/{id}/archive ----------

pub async fn archive_source(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Result<Json<Source>, ApiErr> {
    let source = state
        .sources
        .archive(&claims.org_id, &id, &claims.actor())
        .await?;
    Ok(Json(source_response(source)))
}

// ---------- PUT /sources/{id}/unarchive ----------

pub async fn unarchive_source(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Result<Json<Source>, ApiErr> {
    let source = state
        .sources
        .unarchive(&claims.org_id, &id, &claims.actor())
        .await?;
    Ok(Json(source_response(source)))
}
