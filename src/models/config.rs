// src/models/config.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::{validate_not_negative, validate_minutes};

// Singleton global (tabela app_config, id = 1)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[schema(example = "15000")]
    pub gaji_per_jam: Decimal,
    #[schema(example = 60)]
    pub batas_jeda_menit: i32,
    pub jeda_otomatis_aktif: bool,
    pub updated_at: DateTime<Utc>,
}

// Override por funcionário. Campo nulo = herda o valor global.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserConfigOverride {
    pub username: String,
    pub gaji_per_jam: Option<Decimal>,
    pub batas_jeda_menit: Option<i32>,
    pub jeda_otomatis_aktif: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

// Os dois níveis da tarifa, lidos numa única query
#[derive(Debug, Clone, FromRow)]
pub struct RateTiers {
    pub override_rate: Option<Decimal>,
    pub global_rate: Option<Decimal>,
}

// Configuração efetiva de um funcionário (override aplicado sobre o global)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    pub username: String,
    pub gaji_per_jam: Decimal,
    pub batas_jeda_menit: i32,
    pub jeda_otomatis_aktif: bool,
    pub has_override: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppConfigPayload {
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = Option<f64>, example = 15000)]
    pub gaji_per_jam: Option<Decimal>,

    #[validate(custom(function = "validate_minutes"))]
    pub batas_jeda_menit: Option<i32>,

    pub jeda_otomatis_aktif: Option<bool>,
}

// Substitui o override inteiro: o que vier nulo volta a herdar o global.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserOverridePayload {
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = Option<f64>, example = 20000)]
    pub gaji_per_jam: Option<Decimal>,

    #[validate(custom(function = "validate_minutes"))]
    pub batas_jeda_menit: Option<i32>,

    pub jeda_otomatis_aktif: Option<bool>,
}
