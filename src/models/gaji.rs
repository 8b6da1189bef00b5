// src/models/gaji.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::periods::Periode;

// Um pagamento de gaji (folha) feito a um funcionário
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Gaji {
    pub id: Uuid,
    #[schema(example = "budi")]
    pub username: String,
    #[schema(example = "250000.00")]
    pub jumlah_bayar: Decimal,
    #[schema(example = "Pagamento da semana 42")]
    pub catatan: Option<String>,
    pub dibayar_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGajiPayload {
    #[validate(length(min = 1, message = "O username é obrigatório."))]
    #[schema(example = "budi")]
    pub username: String,

    // Positividade é regra de negócio: checada no service (BadRequest)
    #[schema(value_type = f64, example = 250000)]
    pub jumlah_bayar: Decimal,

    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub catatan: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGajiPayload {
    #[schema(value_type = Option<f64>, example = 200000)]
    pub jumlah_bayar: Option<Decimal>,

    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub catatan: Option<String>,
}

// Resumo de um funcionário: quanto acumulou, quanto recebeu, quanto falta
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GajiSummary {
    pub username: String,
    pub full_name: String,
    pub total_jam: Decimal,
    pub gaji_per_jam: Decimal,
    pub total_gaji: Decimal,
    pub total_diterima: Decimal,
    pub sisa: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerGajiSummary {
    pub periode: Periode,
    pub users: Vec<GajiSummary>,
    pub total_gaji: Decimal,
    pub total_diterima: Decimal,
    pub total_sisa: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct GajiListQuery {
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GajiSummaryQuery {
    #[serde(default)]
    pub period: Periode,
}
