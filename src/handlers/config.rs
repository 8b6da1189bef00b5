// src/handlers/config.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{OwnerOnly, RequireRole},
    models::config::{
        AppConfig, EffectiveConfig, UpdateAppConfigPayload, UpsertUserOverridePayload, UserConfigOverride,
    },
};

// GET /api/config
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "Config",
    responses((status = 200, description = "Configuração global", body = AppConfig)),
    security(("api_jwt" = []))
)]
pub async fn get_config(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state.config_service.get_app_config().await?;
    Ok(ApiResponse::success("Configuração global.", config))
}

// PUT /api/config
#[utoipa::path(
    put,
    path = "/api/config",
    tag = "Config",
    request_body = UpdateAppConfigPayload,
    responses((status = 200, description = "Configuração atualizada", body = AppConfig)),
    security(("api_jwt" = []))
)]
pub async fn update_config(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Json(payload): Json<UpdateAppConfigPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let config = app_state.config_service.update_app_config(&payload).await?;
    Ok(ApiResponse::success("Configuração atualizada.", config))
}

// GET /api/config/users
#[utoipa::path(
    get,
    path = "/api/config/users",
    tag = "Config",
    responses((status = 200, description = "Overrides por funcionário", body = [UserConfigOverride])),
    security(("api_jwt" = []))
)]
pub async fn list_user_overrides(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
) -> Result<impl IntoResponse, AppError> {
    let overrides = app_state.config_service.list_overrides().await?;
    Ok(ApiResponse::success("Overrides listados.", overrides))
}

// GET /api/config/users/{username}
#[utoipa::path(
    get,
    path = "/api/config/users/{username}",
    tag = "Config",
    params(("username" = String, Path, description = "Funcionário")),
    responses(
        (status = 200, description = "Override do funcionário", body = UserConfigOverride),
        (status = 404, description = "Sem override")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user_override(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = app_state.config_service.get_override(&username).await?;
    Ok(ApiResponse::success("Override do funcionário.", row))
}

// PUT /api/config/users/{username}
#[utoipa::path(
    put,
    path = "/api/config/users/{username}",
    tag = "Config",
    params(("username" = String, Path, description = "Funcionário")),
    request_body = UpsertUserOverridePayload,
    responses((status = 200, description = "Override salvo", body = UserConfigOverride)),
    security(("api_jwt" = []))
)]
pub async fn upsert_user_override(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(username): Path<String>,
    Json(payload): Json<UpsertUserOverridePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let row = app_state.config_service.upsert_override(&username, &payload).await?;
    Ok(ApiResponse::success("Override salvo.", row))
}

// DELETE /api/config/users/{username}
#[utoipa::path(
    delete,
    path = "/api/config/users/{username}",
    tag = "Config",
    params(("username" = String, Path, description = "Funcionário")),
    responses((status = 200, description = "Override removido; volta a herdar o global")),
    security(("api_jwt" = []))
)]
pub async fn delete_user_override(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.config_service.delete_override(&username).await?;
    Ok(ApiResponse::success("Override removido.", ()))
}

// GET /api/config/users/{username}/effective
#[utoipa::path(
    get,
    path = "/api/config/users/{username}/effective",
    tag = "Config",
    params(("username" = String, Path, description = "Funcionário")),
    responses((status = 200, description = "Configuração efetiva", body = EffectiveConfig)),
    security(("api_jwt" = []))
)]
pub async fn get_effective_config(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let effective = app_state.config_service.effective_config(&username).await?;
    Ok(ApiResponse::success("Configuração efetiva.", effective))
}
