// src/models/tuton.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_nilai;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tuton_item_jenis", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TutonItemJenis {
    Diskusi,
    Absen,
    Tugas,
}

impl TutonItemJenis {
    pub fn as_str(self) -> &'static str {
        match self {
            TutonItemJenis::Diskusi => "DISKUSI",
            TutonItemJenis::Absen => "ABSEN",
            TutonItemJenis::Tugas => "TUGAS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tuton_item_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TutonItemStatus {
    Belum,
    Selesai,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TutonCourse {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[schema(example = "Pengantar Ilmu Ekonomi")]
    pub matkul: String,
    #[schema(example = 19)]
    pub total_items: i32,
    #[schema(example = 7)]
    pub completed_items: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TutonItem {
    pub id: Uuid,
    pub course_id: Uuid,
    pub jenis: TutonItemJenis,
    #[schema(example = 3)]
    pub sesi: i32,
    pub status: TutonItemStatus,
    // Nulo = ainda sem nota (diferente de 0)
    #[schema(example = "87.5")]
    pub nilai: Option<Decimal>,
    pub selesai_at: Option<DateTime<Utc>>,
    pub deskripsi: Option<String>,
    // Resposta copiada (marcador de plágio)
    pub copas: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Item alterado + progresso da disciplina já recalculado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TutonItemChange {
    pub item: TutonItem,
    pub course: TutonCourse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResult {
    pub updated: usize,
    pub course: TutonCourse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseItems {
    pub course: TutonCourse,
    pub items: Vec<TutonItem>,
}

// --- Conflitos (mesma matkul em vários customers) ---

#[derive(Debug, Clone, FromRow)]
pub struct ConflictRow {
    pub course_id: Uuid,
    pub customer_id: Uuid,
    pub customer_nama: String,
    pub nim: String,
    pub matkul: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictMember {
    pub course_id: Uuid,
    pub customer_id: Uuid,
    pub customer_nama: String,
    pub nim: String,
    pub created_at: DateTime<Utc>,
    pub is_duplicate: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictGroup {
    pub matkul: String,
    pub total: usize,
    pub members: Vec<ConflictMember>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoursePayload {
    #[validate(length(min = 1, max = 200, message = "A matkul é obrigatória (máx. 200 caracteres)."))]
    #[schema(example = "Pengantar Ilmu Ekonomi")]
    pub matkul: String,

    // Não cria os 19 itens padrão
    #[serde(default)]
    pub skip_default_items: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitItemsPayload {
    // Apaga os itens existentes antes de recriar
    #[serde(default)]
    pub overwrite: bool,
}

// Distingue "campo ausente" (None) de "campo = null" (Some(None))
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    pub status: Option<TutonItemStatus>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub nilai: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub deskripsi: Option<Option<String>>,

    pub copas: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemStatusPayload {
    pub status: TutonItemStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemNilaiPayload {
    // null apaga a nota
    #[validate(custom(function = "validate_nilai"))]
    #[schema(value_type = Option<f64>, example = 85)]
    pub nilai: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusEntry {
    pub item_id: Uuid,
    pub status: TutonItemStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkStatusPayload {
    #[validate(length(min = 1, message = "Informe ao menos um item."))]
    pub items: Vec<BulkStatusEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkNilaiEntry {
    pub item_id: Uuid,
    #[schema(value_type = Option<f64>, example = 90)]
    pub nilai: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkNilaiPayload {
    #[validate(length(min = 1, message = "Informe ao menos um item."))]
    pub items: Vec<BulkNilaiEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let absent: UpdateItemPayload = serde_json::from_str(r#"{"status":"SELESAI"}"#).unwrap();
        assert_eq!(absent.nilai, None);
        assert_eq!(absent.status, Some(TutonItemStatus::Selesai));

        let cleared: UpdateItemPayload = serde_json::from_str(r#"{"nilai":null}"#).unwrap();
        assert_eq!(cleared.nilai, Some(None));

        let zero: UpdateItemPayload = serde_json::from_str(r#"{"nilai":0}"#).unwrap();
        assert_eq!(zero.nilai, Some(Some(Decimal::ZERO)));
    }

    #[test]
    fn bulk_entries_use_camel_case_ids() {
        let id = Uuid::new_v4();
        let payload: BulkStatusPayload =
            serde_json::from_str(&format!(r#"{{"items":[{{"itemId":"{id}","status":"BELUM"}}]}}"#)).unwrap();
        assert_eq!(payload.items[0].item_id, id);
        assert_eq!(payload.items[0].status, TutonItemStatus::Belum);
    }
}
