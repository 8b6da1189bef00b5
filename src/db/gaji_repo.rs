// src/db/gaji_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::gaji::Gaji};

#[derive(Clone)]
pub struct GajiRepository {
    pool: PgPool,
}

impl GajiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        username: &str,
        jumlah_bayar: Decimal,
        catatan: Option<&str>,
    ) -> Result<Gaji, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let gaji = sqlx::query_as::<_, Gaji>(
            r#"
            INSERT INTO gaji (username, jumlah_bayar, catatan)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(jumlah_bayar)
        .bind(catatan)
        .fetch_one(executor)
        .await?;
        Ok(gaji)
    }

    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Gaji>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let gaji = sqlx::query_as::<_, Gaji>("SELECT * FROM gaji WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(gaji)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        jumlah_bayar: Decimal,
        catatan: Option<&str>,
    ) -> Result<Gaji, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let gaji = sqlx::query_as::<_, Gaji>(
            r#"
            UPDATE gaji
            SET jumlah_bayar = $2, catatan = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(jumlah_bayar)
        .bind(catatan)
        .fetch_one(executor)
        .await?;
        Ok(gaji)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM gaji WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn list(&self, username: Option<&str>) -> Result<Vec<Gaji>, AppError> {
        let rows = sqlx::query_as::<_, Gaji>(
            r#"
            SELECT * FROM gaji
            WHERE ($1::text IS NULL OR username = $1)
            ORDER BY dibayar_at DESC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Total já pago ao funcionário, opcionalmente ignorando um lançamento (edição)
    /// e/ou limitado aos pagamentos a partir de `since`.
    pub async fn sum_paid<'e, E>(
        &self,
        executor: E,
        username: &str,
        exclude_id: Option<Uuid>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(jumlah_bayar), 0)
            FROM gaji
            WHERE username = $1
              AND ($2::uuid IS NULL OR id <> $2)
              AND ($3::timestamptz IS NULL OR dibayar_at >= $3)
            "#,
        )
        .bind(username)
        .bind(exclude_id)
        .bind(since)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
