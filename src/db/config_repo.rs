// src/db/config_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::config::{AppConfig, RateTiers, UserConfigOverride},
};

#[derive(Clone)]
pub struct ConfigRepository {
    pool: PgPool,
}

impl ConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  GLOBAL (singleton id = 1)
    // =========================================================================

    pub async fn get_app_config(&self) -> Result<Option<AppConfig>, AppError> {
        let config = sqlx::query_as::<_, AppConfig>(
            "SELECT gaji_per_jam, batas_jeda_menit, jeda_otomatis_aktif, updated_at FROM app_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    // Campos nulos mantêm o valor atual
    pub async fn update_app_config<'e, E>(
        &self,
        executor: E,
        gaji_per_jam: Option<Decimal>,
        batas_jeda_menit: Option<i32>,
        jeda_otomatis_aktif: Option<bool>,
    ) -> Result<AppConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let config = sqlx::query_as::<_, AppConfig>(
            r#"
            INSERT INTO app_config (id, gaji_per_jam, batas_jeda_menit, jeda_otomatis_aktif)
            VALUES (1, COALESCE($1, 15000), COALESCE($2, 60), COALESCE($3, FALSE))
            ON CONFLICT (id) DO UPDATE SET
                gaji_per_jam = COALESCE($1, app_config.gaji_per_jam),
                batas_jeda_menit = COALESCE($2, app_config.batas_jeda_menit),
                jeda_otomatis_aktif = COALESCE($3, app_config.jeda_otomatis_aktif),
                updated_at = NOW()
            RETURNING gaji_per_jam, batas_jeda_menit, jeda_otomatis_aktif, updated_at
            "#,
        )
        .bind(gaji_per_jam)
        .bind(batas_jeda_menit)
        .bind(jeda_otomatis_aktif)
        .fetch_one(executor)
        .await?;
        Ok(config)
    }

    // =========================================================================
    //  OVERRIDES POR FUNCIONÁRIO
    // =========================================================================

    pub async fn get_override(&self, username: &str) -> Result<Option<UserConfigOverride>, AppError> {
        let row = sqlx::query_as::<_, UserConfigOverride>(
            "SELECT * FROM user_config_overrides WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_overrides(&self) -> Result<Vec<UserConfigOverride>, AppError> {
        let rows = sqlx::query_as::<_, UserConfigOverride>(
            "SELECT * FROM user_config_overrides ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert_override<'e, E>(
        &self,
        executor: E,
        username: &str,
        gaji_per_jam: Option<Decimal>,
        batas_jeda_menit: Option<i32>,
        jeda_otomatis_aktif: Option<bool>,
    ) -> Result<UserConfigOverride, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, UserConfigOverride>(
            r#"
            INSERT INTO user_config_overrides (username, gaji_per_jam, batas_jeda_menit, jeda_otomatis_aktif)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO UPDATE SET
                gaji_per_jam = EXCLUDED.gaji_per_jam,
                batas_jeda_menit = EXCLUDED.batas_jeda_menit,
                jeda_otomatis_aktif = EXCLUDED.jeda_otomatis_aktif,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(gaji_per_jam)
        .bind(batas_jeda_menit)
        .bind(jeda_otomatis_aktif)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn delete_override<'e, E>(&self, executor: E, username: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM user_config_overrides WHERE username = $1")
            .bind(username)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Override e global numa única ida ao banco
    pub async fn rate_tiers(&self, username: &str) -> Result<RateTiers, AppError> {
        let tiers = sqlx::query_as::<_, RateTiers>(
            r#"
            SELECT
                (SELECT gaji_per_jam FROM user_config_overrides WHERE username = $1) AS override_rate,
                (SELECT gaji_per_jam FROM app_config WHERE id = 1) AS global_rate
            "#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(tiers)
    }
}
