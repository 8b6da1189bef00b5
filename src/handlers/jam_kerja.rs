// src/handlers/jam_kerja.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{OwnerOnly, RequireRole},
    },
    models::jam_kerja::{
        EndSessionResponse, JamKerja, OwnerJamSummary, RekapQuery, RekapResponse, StartSessionPayload,
        SummaryQuery, UserJamSummary, UsernameQuery,
    },
};

// POST /api/jam-kerja/start
#[utoipa::path(
    post,
    path = "/api/jam-kerja/start",
    tag = "Jam Kerja",
    request_body(content = StartSessionPayload, description = "Opcional: OWNER pode informar outro funcionário"),
    params(("username" = Option<String>, Query, description = "Alternativa ao corpo (OWNER)")),
    responses(
        (status = 201, description = "Sessão iniciada", body = JamKerja),
        (status = 200, description = "Já havia uma sessão AKTIF; devolvida sem alterações", body = JamKerja),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn start(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<UsernameQuery>,
    payload: Option<Json<StartSessionPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let requested = payload
        .and_then(|Json(p)| p.username)
        .or(query.username);

    let (session, created) = app_state
        .jam_kerja_service
        .start(&user, requested.as_deref())
        .await?;

    if created {
        Ok((StatusCode::CREATED, ApiResponse::success("Jam kerja iniciada.", session)))
    } else {
        Ok((StatusCode::OK, ApiResponse::success("Já existe uma jam kerja em andamento.", session)))
    }
}

// POST /api/jam-kerja/{id}/pause
#[utoipa::path(
    post,
    path = "/api/jam-kerja/{id}/pause",
    tag = "Jam Kerja",
    params(("id" = Uuid, Path, description = "ID da sessão")),
    responses(
        (status = 200, description = "Sessão pausada", body = JamKerja),
        (status = 400, description = "Sessão não está AKTIF"),
        (status = 403, description = "Sessão de outro funcionário")
    ),
    security(("api_jwt" = []))
)]
pub async fn pause(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = app_state.jam_kerja_service.pause(&user, id).await?;
    Ok(ApiResponse::success("Jam kerja pausada.", session))
}

// POST /api/jam-kerja/{id}/resume
#[utoipa::path(
    post,
    path = "/api/jam-kerja/{id}/resume",
    tag = "Jam Kerja",
    params(("id" = Uuid, Path, description = "ID da sessão pausada")),
    responses(
        (status = 200, description = "Nova sessão AKTIF (id diferente da pausada)", body = JamKerja),
        (status = 400, description = "Sessão não está em JEDA ou já existe outra AKTIF")
    ),
    security(("api_jwt" = []))
)]
pub async fn resume(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = app_state.jam_kerja_service.resume(&user, id).await?;
    Ok(ApiResponse::success("Jam kerja retomada.", session))
}

// PATCH /api/jam-kerja/{id}/end
#[utoipa::path(
    patch,
    path = "/api/jam-kerja/{id}/end",
    tag = "Jam Kerja",
    params(("id" = Uuid, Path, description = "ID da sessão")),
    responses(
        (status = 200, description = "Sessão encerrada e contabilizada", body = EndSessionResponse),
        (status = 400, description = "Sessão não está AKTIF")
    ),
    security(("api_jwt" = []))
)]
pub async fn end(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ended = app_state.jam_kerja_service.end(&user, id).await?;
    Ok(ApiResponse::success("Jam kerja encerrada.", ended))
}

// GET /api/jam-kerja
#[utoipa::path(
    get,
    path = "/api/jam-kerja",
    tag = "Jam Kerja",
    params(("username" = Option<String>, Query, description = "OWNER: filtra por funcionário")),
    responses((status = 200, description = "Histórico de sessões", body = [JamKerja])),
    security(("api_jwt" = []))
)]
pub async fn history(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .jam_kerja_service
        .history(&user, query.username.as_deref())
        .await?;
    Ok(ApiResponse::success("Histórico de jam kerja.", rows))
}

// GET /api/jam-kerja/current
#[utoipa::path(
    get,
    path = "/api/jam-kerja/current",
    tag = "Jam Kerja",
    responses((status = 200, description = "Sessão em andamento ou pausada (ou null)", body = Option<JamKerja>)),
    security(("api_jwt" = []))
)]
pub async fn current(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let session = app_state.jam_kerja_service.current(&user).await?;
    Ok(ApiResponse::success("Sessão atual.", session))
}

// GET /api/jam-kerja/rekap
#[utoipa::path(
    get,
    path = "/api/jam-kerja/rekap",
    tag = "Jam Kerja",
    params(
        ("username" = Option<String>, Query, description = "OWNER: outro funcionário"),
        ("period" = Option<String>, Query, description = "hari | minggu | bulan | total (padrão)")
    ),
    responses((status = 200, description = "Total de horas no período", body = RekapResponse)),
    security(("api_jwt" = []))
)]
pub async fn rekap(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<RekapQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rekap = app_state
        .jam_kerja_service
        .rekap(&user, query.username.as_deref(), query.period)
        .await?;
    Ok(ApiResponse::success("Rekap de jam kerja.", rekap))
}

// GET /api/jam-kerja/me/summary
#[utoipa::path(
    get,
    path = "/api/jam-kerja/me/summary",
    tag = "Jam Kerja",
    params(("scope" = Option<String>, Query, description = "selesai (padrão) | active")),
    responses((status = 200, description = "Hoje, semana, mês e total", body = UserJamSummary)),
    security(("api_jwt" = []))
)]
pub async fn my_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.jam_kerja_service.user_summary(&user, query.scope).await?;
    Ok(ApiResponse::success("Resumo de jam kerja.", summary))
}

// GET /api/jam-kerja/summary
#[utoipa::path(
    get,
    path = "/api/jam-kerja/summary",
    tag = "Jam Kerja",
    params(
        ("username" = Option<String>, Query, description = "Limita a um funcionário"),
        ("scope" = Option<String>, Query, description = "selesai (padrão) | active")
    ),
    responses(
        (status = 200, description = "Resumo de todos os funcionários", body = OwnerJamSummary),
        (status = 403, description = "Apenas OWNER")
    ),
    security(("api_jwt" = []))
)]
pub async fn owner_summary(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .jam_kerja_service
        .owner_summary(query.username.as_deref(), query.scope)
        .await?;
    Ok(ApiResponse::success("Resumo geral de jam kerja.", summary))
}
