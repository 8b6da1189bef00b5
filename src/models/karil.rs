// src/models/karil.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Acompanhamento do karil (trabalho final), um por customer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KarilDetail {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[schema(example = "Pengaruh Media Sosial terhadap Minat Beli")]
    pub judul: Option<String>,
    pub tugas1: bool,
    pub tugas2: bool,
    pub tugas3: bool,
    pub tugas4: bool,
    pub keterangan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KarilDetail {
    pub fn completed_tasks(&self) -> usize {
        [self.tugas1, self.tugas2, self.tugas3, self.tugas4]
            .iter()
            .filter(|done| **done)
            .count()
    }

    /// Fração das quatro tarefas concluídas (0.0 a 1.0).
    pub fn progress(&self) -> f64 {
        self.completed_tasks() as f64 / 4.0
    }
}

// Linha da listagem (JOIN com customers)
#[derive(Debug, Clone, FromRow)]
pub struct KarilRow {
    #[sqlx(flatten)]
    pub detail: KarilDetail,
    pub customer_nama: String,
    pub nim: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KarilView {
    #[serde(flatten)]
    pub detail: KarilDetail,
    pub customer_nama: Option<String>,
    pub nim: Option<String>,
    #[schema(example = 0.75)]
    pub progress: f64,
}

impl KarilView {
    pub fn from_detail(detail: KarilDetail) -> Self {
        let progress = detail.progress();
        Self { detail, customer_nama: None, nim: None, progress }
    }
}

impl From<KarilRow> for KarilView {
    fn from(row: KarilRow) -> Self {
        let progress = row.detail.progress();
        Self {
            detail: row.detail,
            customer_nama: Some(row.customer_nama),
            nim: Some(row.nim),
            progress,
        }
    }
}

// Upsert: campo ausente mantém o valor atual (ou o padrão, na criação)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertKarilPayload {
    #[validate(length(max = 300, message = "O título deve ter no máximo 300 caracteres."))]
    pub judul: Option<String>,
    pub tugas1: Option<bool>,
    pub tugas2: Option<bool>,
    pub tugas3: Option<bool>,
    pub tugas4: Option<bool>,
    pub keterangan: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(flags: [bool; 4]) -> KarilDetail {
        KarilDetail {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            judul: None,
            tugas1: flags[0],
            tugas2: flags[1],
            tugas3: flags[2],
            tugas4: flags[3],
            keterangan: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn progress_is_fraction_of_four_tasks() {
        assert_eq!(detail([false; 4]).progress(), 0.0);
        assert_eq!(detail([true, false, true, false]).progress(), 0.5);
        assert_eq!(detail([true, true, true, false]).progress(), 0.75);
        assert_eq!(detail([true; 4]).progress(), 1.0);
    }

    #[test]
    fn view_flattens_detail_fields() {
        let view = KarilView::from_detail(detail([true, false, false, false]));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["tugas1"], true);
        assert_eq!(json["progress"], 0.25);
        assert!(json.get("detail").is_none());
    }
}
