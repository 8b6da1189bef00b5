// src/handlers/gaji.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{OwnerOnly, RequireRole},
    },
    models::gaji::{
        CreateGajiPayload, Gaji, GajiListQuery, GajiSummary, GajiSummaryQuery, OwnerGajiSummary,
        UpdateGajiPayload,
    },
};

// POST /api/gaji
#[utoipa::path(
    post,
    path = "/api/gaji",
    tag = "Gaji",
    request_body = CreateGajiPayload,
    responses(
        (status = 201, description = "Pagamento registrado", body = Gaji),
        (status = 400, description = "Valor inválido ou acima do saldo restante"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_gaji(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Json(payload): Json<CreateGajiPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let gaji = app_state.gaji_service.create(&payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success("Pagamento de gaji registrado.", gaji)))
}

// PATCH /api/gaji/{id}
#[utoipa::path(
    patch,
    path = "/api/gaji/{id}",
    tag = "Gaji",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    request_body = UpdateGajiPayload,
    responses(
        (status = 200, description = "Pagamento atualizado", body = Gaji),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_gaji(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGajiPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let gaji = app_state.gaji_service.update(id, &payload).await?;
    Ok(ApiResponse::success("Pagamento de gaji atualizado.", gaji))
}

// DELETE /api/gaji/{id}
#[utoipa::path(
    delete,
    path = "/api/gaji/{id}",
    tag = "Gaji",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento removido"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_gaji(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.gaji_service.delete(id).await?;
    Ok(ApiResponse::success("Pagamento de gaji removido.", ()))
}

// GET /api/gaji
#[utoipa::path(
    get,
    path = "/api/gaji",
    tag = "Gaji",
    params(("username" = Option<String>, Query, description = "Filtra por funcionário")),
    responses((status = 200, description = "Pagamentos", body = [Gaji])),
    security(("api_jwt" = []))
)]
pub async fn list_gaji(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Query(query): Query<GajiListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.gaji_service.list(query.username.as_deref()).await?;
    Ok(ApiResponse::success("Pagamentos de gaji.", rows))
}

// GET /api/gaji/summary
#[utoipa::path(
    get,
    path = "/api/gaji/summary",
    tag = "Gaji",
    params(("period" = Option<String>, Query, description = "hari | minggu | bulan | total (padrão)")),
    responses((status = 200, description = "Gaji devido, pago e restante por funcionário", body = OwnerGajiSummary)),
    security(("api_jwt" = []))
)]
pub async fn gaji_summary(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Query(query): Query<GajiSummaryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.gaji_service.owner_summary(query.period).await?;
    Ok(ApiResponse::success("Resumo de gaji.", summary))
}

// GET /api/gaji/me
#[utoipa::path(
    get,
    path = "/api/gaji/me",
    tag = "Gaji",
    responses((status = 200, description = "Pagamentos recebidos pelo usuário logado", body = [Gaji])),
    security(("api_jwt" = []))
)]
pub async fn my_gaji(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.gaji_service.list(Some(&user.username)).await?;
    Ok(ApiResponse::success("Seus pagamentos de gaji.", rows))
}

// GET /api/gaji/me/summary
#[utoipa::path(
    get,
    path = "/api/gaji/me/summary",
    tag = "Gaji",
    params(("period" = Option<String>, Query, description = "hari | minggu | bulan | total (padrão)")),
    responses((status = 200, description = "Resumo do usuário logado", body = GajiSummary)),
    security(("api_jwt" = []))
)]
pub async fn my_gaji_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<GajiSummaryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.gaji_service.summary_for(&user, query.period).await?;
    Ok(ApiResponse::success("Seu resumo de gaji.", summary))
}
