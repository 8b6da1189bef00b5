// src/models/jam_kerja.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::periods::Periode;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "jam_kerja_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum JamKerjaStatus {
    Aktif,   // Rodando (jam_selesai nulo)
    Jeda,    // Pausada (jam_selesai = momento da pausa)
    Selesai, // Encerrada e contabilizada
}

impl JamKerjaStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JamKerjaStatus::Aktif => "AKTIF",
            JamKerjaStatus::Jeda => "JEDA",
            JamKerjaStatus::Selesai => "SELESAI",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JamKerja {
    pub id: Uuid,

    #[schema(example = "budi")]
    pub username: String,

    pub jam_mulai: DateTime<Utc>,
    pub jam_selesai: Option<DateTime<Utc>>,

    #[schema(example = "3.25")]
    pub total_jam: Decimal,

    pub status: JamKerjaStatus,

    #[schema(value_type = String, format = Date, example = "2026-10-16")]
    pub tanggal: NaiveDate,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JamKerja {
    /// AKTIF e ainda sem horário de término.
    pub fn is_open_active(&self) -> bool {
        self.status == JamKerjaStatus::Aktif && self.jam_selesai.is_none()
    }
}

// Resposta do PATCH /end
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionResponse {
    pub id: Uuid,
    pub username: String,
    pub status: JamKerjaStatus,
    #[schema(example = "7.50")]
    pub total_jam: Decimal,
    pub jam_selesai: Option<DateTime<Utc>>,
    // Gaji acumulado por este segmento
    #[schema(example = "112500.00")]
    pub gaji: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RekapResponse {
    pub username: String,
    #[schema(example = "21.75")]
    pub total_jam: Decimal,
    #[schema(example = "minggu")]
    pub periode: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JamGaji {
    pub total_jam: Decimal,
    pub total_gaji: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserJamSummary {
    pub username: String,
    pub full_name: String,
    pub gaji_per_jam: Decimal,
    pub hari_ini: JamGaji,
    pub minggu_ini: JamGaji,
    pub bulan_ini: JamGaji,
    pub total: JamGaji,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerJamSummary {
    pub users: Vec<UserJamSummary>,
    pub active_users: i64,
    pub paused_users: i64,
}

#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct OpenSessionCounts {
    pub active_users: i64,
    pub paused_users: i64,
}

// Quais linhas entram nos somatórios
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SummaryScope {
    #[default]
    Selesai, // Apenas sessões encerradas
    Active,  // Sessões em andamento ou pausadas
}

impl SummaryScope {
    pub fn statuses(self) -> &'static [&'static str] {
        match self {
            SummaryScope::Selesai => &["SELESAI"],
            SummaryScope::Active => &["AKTIF", "JEDA"],
        }
    }
}

// --- Payloads / Queries ---

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionPayload {
    // OWNER pode iniciar para outro funcionário
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RekapQuery {
    pub username: Option<String>,
    pub period: Option<Periode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub username: Option<String>,
    #[serde(default)]
    pub scope: SummaryScope,
}
