// src/handlers/tuton.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{OwnerOnly, RequireRole, Staff},
    models::tuton::{
        BulkNilaiPayload, BulkStatusPayload, BulkUpdateResult, ConflictGroup, CourseItems, CreateCoursePayload,
        InitItemsPayload, TutonCourse, TutonItemChange, UpdateItemNilaiPayload, UpdateItemPayload,
        UpdateItemStatusPayload,
    },
};

// =============================================================================
//  COURSES
// =============================================================================

// POST /api/customers/{id}/tuton-courses
#[utoipa::path(
    post,
    path = "/api/customers/{id}/tuton-courses",
    tag = "Tuton",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = CreateCoursePayload,
    responses(
        (status = 201, description = "Matkul criada com a grade padrão", body = CourseItems),
        (status = 400, description = "Matkul já cadastrada para o cliente"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_course(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state.tuton_service.create_course(customer_id, &payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success("Matkul criada.", created)))
}

// GET /api/customers/{id}/tuton-courses
#[utoipa::path(
    get,
    path = "/api/customers/{id}/tuton-courses",
    tag = "Tuton",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses((status = 200, description = "Matkuls do cliente com progresso", body = [TutonCourse])),
    security(("api_jwt" = []))
)]
pub async fn list_courses(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let courses = app_state.tuton_service.list_courses(customer_id).await?;
    Ok(ApiResponse::success("Matkuls do cliente.", courses))
}

// DELETE /api/tuton-courses/{course_id}
#[utoipa::path(
    delete,
    path = "/api/tuton-courses/{course_id}",
    tag = "Tuton",
    params(("course_id" = Uuid, Path, description = "ID da matkul")),
    responses(
        (status = 200, description = "Matkul e itens removidos"),
        (status = 404, description = "Matkul não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_course(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.tuton_service.delete_course(course_id).await?;
    Ok(ApiResponse::success("Matkul removida.", ()))
}

// =============================================================================
//  ITENS
// =============================================================================

// GET /api/tuton-courses/{course_id}/items
#[utoipa::path(
    get,
    path = "/api/tuton-courses/{course_id}/items",
    tag = "Tuton",
    params(("course_id" = Uuid, Path, description = "ID da matkul")),
    responses(
        (status = 200, description = "Matkul e seus itens", body = CourseItems),
        (status = 404, description = "Matkul não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let course_items = app_state.tuton_service.list_items(course_id).await?;
    Ok(ApiResponse::success("Itens da matkul.", course_items))
}

// POST /api/tuton-courses/{course_id}/items/init
#[utoipa::path(
    post,
    path = "/api/tuton-courses/{course_id}/items/init",
    tag = "Tuton",
    params(("course_id" = Uuid, Path, description = "ID da matkul")),
    request_body(content = InitItemsPayload, description = "overwrite=true recria a grade do zero"),
    responses((status = 200, description = "Grade padrão aplicada", body = CourseItems)),
    security(("api_jwt" = []))
)]
pub async fn init_items(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(course_id): Path<Uuid>,
    payload: Option<Json<InitItemsPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let overwrite = payload.map(|Json(p)| p.overwrite).unwrap_or(false);

    let course_items = app_state.tuton_service.init_items(course_id, overwrite).await?;
    Ok(ApiResponse::success("Grade de itens inicializada.", course_items))
}

// POST /api/tuton-courses/{course_id}/items/bulk-status
#[utoipa::path(
    post,
    path = "/api/tuton-courses/{course_id}/items/bulk-status",
    tag = "Tuton",
    params(("course_id" = Uuid, Path, description = "ID da matkul")),
    request_body = BulkStatusPayload,
    responses(
        (status = 200, description = "Status aplicados atomicamente", body = BulkUpdateResult),
        (status = 400, description = "Item repetido ou de outra matkul")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_status(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<BulkStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let result = app_state.tuton_service.bulk_update_status(course_id, &payload).await?;
    Ok(ApiResponse::success("Status atualizados.", result))
}

// POST /api/tuton-courses/{course_id}/items/bulk-nilai
#[utoipa::path(
    post,
    path = "/api/tuton-courses/{course_id}/items/bulk-nilai",
    tag = "Tuton",
    params(("course_id" = Uuid, Path, description = "ID da matkul")),
    request_body = BulkNilaiPayload,
    responses(
        (status = 200, description = "Nilai aplicados atomicamente", body = BulkUpdateResult),
        (status = 400, description = "Nilai fora de 0..100, item ABSEN ou de outra matkul")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_nilai(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<BulkNilaiPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let result = app_state.tuton_service.bulk_update_nilai(course_id, &payload).await?;
    Ok(ApiResponse::success("Nilai atualizados.", result))
}

// PATCH /api/tuton-items/{item_id}
#[utoipa::path(
    patch,
    path = "/api/tuton-items/{item_id}",
    tag = "Tuton",
    params(("item_id" = Uuid, Path, description = "ID do item")),
    request_body(content = UpdateItemPayload, description = "Campos ausentes ficam intactos; null limpa nilai/deskripsi"),
    responses(
        (status = 200, description = "Item e progresso da matkul", body = TutonItemChange),
        (status = 400, description = "ABSEN não aceita nilai/copas ou nilai fora de 0..100"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let change = app_state.tuton_service.update_item(item_id, &payload).await?;
    Ok(ApiResponse::success("Item atualizado.", change))
}

// PATCH /api/tuton-items/{item_id}/status
#[utoipa::path(
    patch,
    path = "/api/tuton-items/{item_id}/status",
    tag = "Tuton",
    params(("item_id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateItemStatusPayload,
    responses((status = 200, description = "Status atualizado", body = TutonItemChange)),
    security(("api_jwt" = []))
)]
pub async fn update_item_status(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let change = app_state
        .tuton_service
        .update_item_status(item_id, payload.status)
        .await?;
    Ok(ApiResponse::success("Status do item atualizado.", change))
}

// PATCH /api/tuton-items/{item_id}/nilai
#[utoipa::path(
    patch,
    path = "/api/tuton-items/{item_id}/nilai",
    tag = "Tuton",
    params(("item_id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateItemNilaiPayload,
    responses(
        (status = 200, description = "Nilai atualizado", body = TutonItemChange),
        (status = 400, description = "Item ABSEN ou nilai fora de 0..100")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item_nilai(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemNilaiPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let change = app_state.tuton_service.update_item_nilai(item_id, payload.nilai).await?;
    Ok(ApiResponse::success("Nilai do item atualizado.", change))
}

// =============================================================================
//  CONFLITOS
// =============================================================================

// GET /api/tuton-courses/conflicts
#[utoipa::path(
    get,
    path = "/api/tuton-courses/conflicts",
    tag = "Tuton",
    responses((status = 200, description = "Matkuls compartilhadas por mais de um cliente", body = [ConflictGroup])),
    security(("api_jwt" = []))
)]
pub async fn list_conflicts(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
) -> Result<impl IntoResponse, AppError> {
    let groups = app_state.tuton_service.list_conflicts().await?;
    Ok(ApiResponse::success("Conflitos de matkul.", groups))
}

// GET /api/tuton-courses/conflicts/{matkul}
#[utoipa::path(
    get,
    path = "/api/tuton-courses/conflicts/{matkul}",
    tag = "Tuton",
    params(("matkul" = String, Path, description = "Nome da matkul")),
    responses(
        (status = 200, description = "Clientes que compartilham a matkul", body = ConflictGroup),
        (status = 404, description = "Sem conflito para a matkul")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_conflict(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(matkul): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state.tuton_service.conflict_by_matkul(&matkul).await?;
    Ok(ApiResponse::success("Conflito de matkul.", group))
}
