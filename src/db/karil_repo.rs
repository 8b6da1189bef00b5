// src/db/karil_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::karil::{KarilDetail, KarilRow, UpsertKarilPayload},
};

#[derive(Clone)]
pub struct KarilRepository {
    pool: PgPool,
}

impl KarilRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Cria ou atualiza; campos ausentes mantêm o valor atual
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        payload: &UpsertKarilPayload,
    ) -> Result<KarilDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, KarilDetail>(
            r#"
            INSERT INTO karil_details (customer_id, judul, tugas1, tugas2, tugas3, tugas4, keterangan)
            VALUES ($1, $2, COALESCE($3, FALSE), COALESCE($4, FALSE), COALESCE($5, FALSE), COALESCE($6, FALSE), $7)
            ON CONFLICT (customer_id) DO UPDATE SET
                judul = COALESCE($2, karil_details.judul),
                tugas1 = COALESCE($3, karil_details.tugas1),
                tugas2 = COALESCE($4, karil_details.tugas2),
                tugas3 = COALESCE($5, karil_details.tugas3),
                tugas4 = COALESCE($6, karil_details.tugas4),
                keterangan = COALESCE($7, karil_details.keterangan),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(payload.judul.as_deref())
        .bind(payload.tugas1)
        .bind(payload.tugas2)
        .bind(payload.tugas3)
        .bind(payload.tugas4)
        .bind(payload.keterangan.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(detail)
    }

    pub async fn find_by_customer(&self, customer_id: Uuid) -> Result<Option<KarilDetail>, AppError> {
        let detail = sqlx::query_as::<_, KarilDetail>("SELECT * FROM karil_details WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(detail)
    }

    pub async fn list_with_customer(&self) -> Result<Vec<KarilRow>, AppError> {
        let rows = sqlx::query_as::<_, KarilRow>(
            r#"
            SELECT k.*, c.nama AS customer_nama, c.nim
            FROM karil_details k
            JOIN customers c ON c.id = k.customer_id
            ORDER BY c.nama
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_by_customer<'e, E>(&self, executor: E, customer_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM karil_details WHERE customer_id = $1")
            .bind(customer_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
