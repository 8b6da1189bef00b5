// src/db/jam_kerja_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::jam_kerja::{JamKerja, JamKerjaStatus, OpenSessionCounts},
};

// Horas de um segmento: gravadas quando fechado, ao vivo quando ainda AKTIF
const LIVE_HOURS_SQL: &str = r#"
    CASE
        WHEN status = 'AKTIF' AND jam_selesai IS NULL
            THEN GREATEST(ROUND((EXTRACT(EPOCH FROM (NOW() - jam_mulai)) / 3600)::numeric, 2), 0)
        ELSE total_jam
    END
"#;

#[derive(Clone)]
pub struct JamKerjaRepository {
    pool: PgPool,
}

impl JamKerjaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURAS
    // =========================================================================

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<JamKerja>, AppError> {
        let row = sqlx::query_as::<_, JamKerja>("SELECT * FROM jam_kerja WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<JamKerja>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, JamKerja>("SELECT * FROM jam_kerja WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    // A sessão AKTIF ainda aberta do funcionário (no máximo uma)
    pub async fn find_open_active<'e, E>(&self, executor: E, username: &str) -> Result<Option<JamKerja>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, JamKerja>(
            r#"
            SELECT * FROM jam_kerja
            WHERE username = $1 AND status = 'AKTIF' AND jam_selesai IS NULL
            ORDER BY jam_mulai DESC
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    // Sessão em andamento ou pausada mais recente
    pub async fn find_current(&self, username: &str) -> Result<Option<JamKerja>, AppError> {
        let row = sqlx::query_as::<_, JamKerja>(
            r#"
            SELECT * FROM jam_kerja
            WHERE username = $1 AND status IN ('AKTIF', 'JEDA')
            ORDER BY jam_mulai DESC
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, username: Option<&str>) -> Result<Vec<JamKerja>, AppError> {
        let rows = sqlx::query_as::<_, JamKerja>(
            r#"
            SELECT * FROM jam_kerja
            WHERE ($1::text IS NULL OR username = $1)
            ORDER BY jam_mulai DESC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Soma as horas das linhas com os status informados, a partir de `since` (inclusive).
    pub async fn sum_hours<'e, E>(
        &self,
        executor: E,
        username: &str,
        statuses: &[&str],
        since: Option<NaiveDate>,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT COALESCE(SUM({LIVE_HOURS_SQL}), 0)
            FROM jam_kerja
            WHERE username = $1
              AND status::text = ANY($2)
              AND ($3::date IS NULL OR tanggal >= $3)
            "#
        );
        let total = sqlx::query_scalar::<_, Decimal>(&sql)
            .bind(username)
            .bind(statuses)
            .bind(since)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn count_open_users(&self) -> Result<OpenSessionCounts, AppError> {
        let counts = sqlx::query_as::<_, OpenSessionCounts>(
            r#"
            SELECT
                COUNT(DISTINCT username) FILTER (WHERE status = 'AKTIF' AND jam_selesai IS NULL) AS active_users,
                COUNT(DISTINCT username) FILTER (WHERE status = 'JEDA') AS paused_users
            FROM jam_kerja
            WHERE status IN ('AKTIF', 'JEDA')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    // Sessões AKTIF iniciadas antes do corte (esquecidas abertas)
    pub async fn find_overdue_active(&self, cutoff: DateTime<Utc>) -> Result<Vec<JamKerja>, AppError> {
        let rows = sqlx::query_as::<_, JamKerja>(
            r#"
            SELECT * FROM jam_kerja
            WHERE status = 'AKTIF' AND jam_selesai IS NULL AND jam_mulai < $1
            ORDER BY jam_mulai
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Pausas que passaram do limite, para quem tem jeda automática ligada
    pub async fn find_expired_pauses(&self, now: DateTime<Utc>) -> Result<Vec<JamKerja>, AppError> {
        let rows = sqlx::query_as::<_, JamKerja>(
            r#"
            SELECT jk.*
            FROM jam_kerja jk
            CROSS JOIN app_config ac
            LEFT JOIN user_config_overrides uo ON uo.username = jk.username
            WHERE ac.id = 1
              AND jk.status = 'JEDA'
              AND jk.jam_selesai IS NOT NULL
              AND COALESCE(uo.jeda_otomatis_aktif, ac.jeda_otomatis_aktif)
              AND jk.jam_selesai + make_interval(mins => COALESCE(uo.batas_jeda_menit, ac.batas_jeda_menit)) < $1
            ORDER BY jk.jam_selesai
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    //  ESCRITAS
    // =========================================================================

    pub async fn insert_active<'e, E>(
        &self,
        executor: E,
        username: &str,
        jam_mulai: DateTime<Utc>,
        tanggal: NaiveDate,
    ) -> Result<JamKerja, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, JamKerja>(
            r#"
            INSERT INTO jam_kerja (username, jam_mulai, status, tanggal)
            VALUES ($1, $2, 'AKTIF', $3)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(jam_mulai)
        .bind(tanggal)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    /// Fecha um segmento AKTIF aberto (pausa ou término).
    /// Retorna `None` se outra transação já o fechou.
    pub async fn close<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: JamKerjaStatus,
        jam_selesai: DateTime<Utc>,
        total_jam: Decimal,
    ) -> Result<Option<JamKerja>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, JamKerja>(
            r#"
            UPDATE jam_kerja
            SET status = $2, jam_selesai = $3, total_jam = $4, updated_at = NOW()
            WHERE id = $1 AND status = 'AKTIF' AND jam_selesai IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(jam_selesai)
        .bind(total_jam)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    // JEDA sem jam_selesai (dados legados): volta a AKTIF na mesma linha
    pub async fn reopen_in_place<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<JamKerja>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, JamKerja>(
            r#"
            UPDATE jam_kerja
            SET status = 'AKTIF', updated_at = NOW()
            WHERE id = $1 AND status = 'JEDA' AND jam_selesai IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    // JEDA -> SELESAI mantendo a duração registrada na pausa
    pub async fn finalize_paused<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<JamKerja>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, JamKerja>(
            r#"
            UPDATE jam_kerja
            SET status = 'SELESAI', updated_at = NOW()
            WHERE id = $1 AND status = 'JEDA' AND jam_selesai IS NOT NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }
}
