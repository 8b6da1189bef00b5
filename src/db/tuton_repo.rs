// src/db/tuton_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::tuton::{ConflictRow, TutonCourse, TutonItem, TutonItemJenis, TutonItemStatus},
};

#[derive(Clone)]
pub struct TutonRepository {
    pool: PgPool,
}

impl TutonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  COURSES
    // =========================================================================

    pub async fn create_course<'e, E>(&self, executor: E, customer_id: Uuid, matkul: &str) -> Result<TutonCourse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TutonCourse>(
            r#"
            INSERT INTO tuton_courses (customer_id, matkul)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(matkul)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, format!("O customer já possui a matkul '{}'.", matkul)))
    }

    pub async fn find_course(&self, id: Uuid) -> Result<Option<TutonCourse>, AppError> {
        let course = sqlx::query_as::<_, TutonCourse>("SELECT * FROM tuton_courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(course)
    }

    pub async fn find_course_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<TutonCourse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let course = sqlx::query_as::<_, TutonCourse>("SELECT * FROM tuton_courses WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(course)
    }

    pub async fn list_courses(&self, customer_id: Uuid) -> Result<Vec<TutonCourse>, AppError> {
        let courses = sqlx::query_as::<_, TutonCourse>(
            "SELECT * FROM tuton_courses WHERE customer_id = $1 ORDER BY matkul",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    pub async fn delete_course<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tuton_courses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Itens caem junto pela FK (ON DELETE CASCADE)
    pub async fn delete_courses_by_customer<'e, E>(&self, executor: E, customer_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tuton_courses WHERE customer_id = $1")
            .bind(customer_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // Mesmo padrão do recálculo de total do pedido: uma única UPDATE com subqueries
    pub async fn recalculate_course_progress<'e, E>(&self, executor: E, course_id: Uuid) -> Result<TutonCourse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let course = sqlx::query_as::<_, TutonCourse>(
            r#"
            UPDATE tuton_courses
            SET total_items = (SELECT COUNT(*) FROM tuton_items WHERE course_id = $1)::int,
                completed_items = (
                    SELECT COUNT(*) FROM tuton_items WHERE course_id = $1 AND status = 'SELESAI'
                )::int,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(course_id)
        .fetch_one(executor)
        .await?;
        Ok(course)
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn delete_items<'e, E>(&self, executor: E, course_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tuton_items WHERE course_id = $1")
            .bind(course_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Insere a grade (jenis, sesi) de uma vez; células já existentes são mantidas.
    pub async fn insert_items<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
        seed: &[(TutonItemJenis, i32)],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let jenis: Vec<&str> = seed.iter().map(|(j, _)| j.as_str()).collect();
        let sesi: Vec<i32> = seed.iter().map(|(_, s)| *s).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO tuton_items (course_id, jenis, sesi)
            SELECT $1, t.jenis::tuton_item_jenis, t.sesi
            FROM UNNEST($2::text[], $3::int4[]) AS t(jenis, sesi)
            ON CONFLICT (course_id, jenis, sesi) DO NOTHING
            "#,
        )
        .bind(course_id)
        .bind(&jenis)
        .bind(&sesi)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_items(&self, course_id: Uuid) -> Result<Vec<TutonItem>, AppError> {
        let items = sqlx::query_as::<_, TutonItem>(
            "SELECT * FROM tuton_items WHERE course_id = $1 ORDER BY jenis, sesi",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn find_item(&self, id: Uuid) -> Result<Option<TutonItem>, AppError> {
        let item = sqlx::query_as::<_, TutonItem>("SELECT * FROM tuton_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn find_item_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<TutonItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, TutonItem>("SELECT * FROM tuton_items WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn find_items_by_ids<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<TutonItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, TutonItem>("SELECT * FROM tuton_items WHERE id = ANY($1) FOR UPDATE")
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    // Grava o estado final do item (já validado e com selesai_at resolvido)
    pub async fn update_item<'e, E>(&self, executor: E, item: &TutonItem) -> Result<TutonItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, TutonItem>(
            r#"
            UPDATE tuton_items
            SET status = $2, nilai = $3, deskripsi = $4, copas = $5, selesai_at = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(item.status)
        .bind(item.nilai)
        .bind(item.deskripsi.as_deref())
        .bind(item.copas)
        .bind(item.selesai_at)
        .fetch_one(executor)
        .await?;
        Ok(updated)
    }

    pub async fn bulk_set_status<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
        entries: &[(Uuid, TutonItemStatus)],
        now: DateTime<Utc>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = entries.iter().map(|(id, _)| *id).collect();
        let statuses: Vec<&str> = entries
            .iter()
            .map(|(_, status)| match status {
                TutonItemStatus::Belum => "BELUM",
                TutonItemStatus::Selesai => "SELESAI",
            })
            .collect();

        let result = sqlx::query(
            r#"
            UPDATE tuton_items ti
            SET status = v.status::tuton_item_status,
                selesai_at = CASE
                    WHEN v.status = 'SELESAI' THEN COALESCE(ti.selesai_at, $4)
                    ELSE NULL
                END,
                updated_at = NOW()
            FROM UNNEST($2::uuid[], $3::text[]) AS v(id, status)
            WHERE ti.id = v.id AND ti.course_id = $1
            "#,
        )
        .bind(course_id)
        .bind(&ids)
        .bind(&statuses)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn bulk_set_nilai<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
        entries: &[(Uuid, Option<Decimal>)],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = entries.iter().map(|(id, _)| *id).collect();
        let nilai: Vec<Option<Decimal>> = entries.iter().map(|(_, n)| *n).collect();

        let result = sqlx::query(
            r#"
            UPDATE tuton_items ti
            SET nilai = v.nilai, updated_at = NOW()
            FROM UNNEST($2::uuid[], $3::numeric[]) AS v(id, nilai)
            WHERE ti.id = v.id AND ti.course_id = $1
            "#,
        )
        .bind(course_id)
        .bind(&ids)
        .bind(&nilai)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  CONFLITOS
    // =========================================================================

    // Courses cuja matkul aparece em mais de um registro
    pub async fn list_conflict_rows(&self, matkul: Option<&str>) -> Result<Vec<ConflictRow>, AppError> {
        let rows = sqlx::query_as::<_, ConflictRow>(
            r#"
            SELECT
                tc.id AS course_id,
                tc.customer_id,
                c.nama AS customer_nama,
                c.nim,
                tc.matkul,
                tc.created_at
            FROM tuton_courses tc
            JOIN customers c ON c.id = tc.customer_id
            WHERE ($1::text IS NULL OR tc.matkul = $1)
              AND tc.matkul IN (
                  SELECT matkul FROM tuton_courses GROUP BY matkul HAVING COUNT(*) > 1
              )
            ORDER BY tc.matkul, tc.created_at, tc.id
            "#,
        )
        .bind(matkul)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
