// src/handlers/karil.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{OwnerOnly, RequireRole, Staff},
    models::karil::{KarilView, UpsertKarilPayload},
};

// GET /api/karil
#[utoipa::path(
    get,
    path = "/api/karil",
    tag = "Karil",
    responses((status = 200, description = "Todos os registros com cliente e progresso", body = [KarilView])),
    security(("api_jwt" = []))
)]
pub async fn list_karil(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.karil_service.list().await?;
    Ok(ApiResponse::success("Registros de karil.", rows))
}

// GET /api/customers/{id}/karil
#[utoipa::path(
    get,
    path = "/api/customers/{id}/karil",
    tag = "Karil",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Karil do cliente", body = KarilView),
        (status = 404, description = "Cliente ou karil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_karil(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state.karil_service.get(customer_id).await?;
    Ok(ApiResponse::success("Karil do cliente.", view))
}

// PUT /api/customers/{id}/karil
#[utoipa::path(
    put,
    path = "/api/customers/{id}/karil",
    tag = "Karil",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpsertKarilPayload,
    responses(
        (status = 200, description = "Karil criado ou atualizado", body = KarilView),
        (status = 403, description = "Apenas OWNER"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_karil(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<UpsertKarilPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let view = app_state.karil_service.upsert(customer_id, &payload).await?;
    Ok(ApiResponse::success("Karil salvo.", view))
}
