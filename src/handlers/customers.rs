// src/handlers/customers.rs

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
    middleware::rbac::{OwnerOnly, RequireRole, Staff},
    models::customer::{
        CreateCustomerPayload, CreateCustomerPaymentPayload, Customer, CustomerPayment, CustomerQuery,
        PaymentResult, UpdateCustomerPayload, UpdateInvoicePayload,
    },
};

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Customer),
        (status = 400, description = "NIM duplicado ou valores inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state.customer_service.create(&payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success("Cliente cadastrado.", customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    params(
        ("jenis" = Option<String>, Query, description = "TUTON | KARIL"),
        ("q" = Option<String>, Query, description = "Busca por nome ou NIM")
    ),
    responses((status = 200, description = "Clientes", body = [Customer])),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Query(query): Query<CustomerQuery>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.customer_service.list(&query).await?;
    Ok(ApiResponse::success("Lista de clientes.", customers))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.customer_service.get(id).await?;
    Ok(ApiResponse::success("Cliente encontrado.", customer))
}

// PATCH /api/customers/{id}
#[utoipa::path(
    patch,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateCustomerPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state.customer_service.update(id, &payload).await?;
    Ok(ApiResponse::success("Cliente atualizado.", customer))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente e dados vinculados removidos"),
        (status = 403, description = "Apenas OWNER"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.customer_service.delete(id).await?;
    Ok(ApiResponse::success("Cliente removido.", ()))
}

// POST /api/customers/{id}/payments
#[utoipa::path(
    post,
    path = "/api/customers/{id}/payments",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = CreateCustomerPaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado; saldo recalculado", body = PaymentResult),
        (status = 400, description = "Valor inválido"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_payment(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCustomerPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let result = app_state.customer_service.add_payment(id, &payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success("Pagamento registrado.", result)))
}

// GET /api/customers/{id}/payments
#[utoipa::path(
    get,
    path = "/api/customers/{id}/payments",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses((status = 200, description = "Histórico de pagamentos", body = [CustomerPayment])),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    _role: RequireRole<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state.customer_service.list_payments(id).await?;
    Ok(ApiResponse::success("Histórico de pagamentos.", payments))
}

// PATCH /api/customers/{id}/invoice
#[utoipa::path(
    patch,
    path = "/api/customers/{id}/invoice",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateInvoicePayload,
    responses(
        (status = 200, description = "Valor total atualizado", body = Customer),
        (status = 400, description = "Total menor que o já pago")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    _role: RequireRole<OwnerOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvoicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state
        .customer_service
        .update_invoice(id, payload.total_bayar)
        .await?;
    Ok(ApiResponse::success("Valor total atualizado.", customer))
}
