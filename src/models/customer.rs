// src/models/customer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_not_negative, validate_positive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "customer_jenis", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomerJenis {
    Tuton,
    Karil,
    Tk,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,

    #[schema(example = "Siti Aminah")]
    pub nama: String,

    #[schema(example = "081234567890")]
    pub no_wa: Option<String>,

    #[schema(example = "041234567")]
    pub nim: String,

    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password_hash: Option<String>,

    #[schema(example = "Manajemen")]
    pub jurusan: Option<String>,

    pub jenis: CustomerJenis,

    // Valor total da fatura
    #[schema(example = "100000.00")]
    pub total_bayar: Decimal,

    // Pago até agora = sudah_bayar_awal + soma do ledger
    #[schema(example = "50000.00")]
    pub sudah_bayar: Decimal,

    // Parte legada de sudah_bayar, fixada no cadastro
    #[schema(example = "20000.00")]
    pub sudah_bayar_awal: Decimal,

    #[schema(example = "50000.00")]
    pub sisa_bayar: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayment {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[schema(example = "30000.00")]
    pub jumlah: Decimal,
    pub catatan: Option<String>,
    pub tanggal_bayar: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// Resultado do lançamento: o pagamento e o customer já recalculado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub payment: CustomerPayment,
    pub customer: Customer,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Siti Aminah")]
    pub nama: String,

    pub no_wa: Option<String>,

    #[validate(length(min = 1, max = 30, message = "O NIM é obrigatório (máx. 30 caracteres)."))]
    #[schema(example = "041234567")]
    pub nim: String,

    // Senha do portal da universidade; guardada com hash
    pub password: Option<String>,

    pub jurusan: Option<String>,

    pub jenis: Option<CustomerJenis>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(value_type = f64, example = 100000)]
    pub total_bayar: Decimal,

    // Valor já pago antes do ledger; vira a base fixa do customer
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(value_type = f64, example = 20000)]
    pub sudah_bayar: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub nama: Option<String>,
    pub no_wa: Option<String>,
    #[validate(length(min = 1, max = 30, message = "O NIM deve ter entre 1 e 30 caracteres."))]
    pub nim: Option<String>,
    pub password: Option<String>,
    pub jurusan: Option<String>,
    pub jenis: Option<CustomerJenis>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPaymentPayload {
    #[validate(custom(function = "validate_positive"))]
    #[schema(value_type = f64, example = 30000)]
    pub jumlah: Decimal,

    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub catatan: Option<String>,

    // Padrão: agora
    pub tanggal_bayar: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoicePayload {
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = f64, example = 150000)]
    pub total_bayar: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub jenis: Option<CustomerJenis>,
    // Busca por nome ou NIM
    pub q: Option<String>,
}
