// src/db/customer_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::customer::{Customer, CustomerJenis, CustomerPayment},
};

// Campos do cadastro, já normalizados pelo service
pub struct NewCustomer<'a> {
    pub nama: &'a str,
    pub no_wa: Option<&'a str>,
    pub nim: &'a str,
    pub password_hash: Option<&'a str>,
    pub jurusan: Option<&'a str>,
    pub jenis: CustomerJenis,
    pub total_bayar: Decimal,
    pub sudah_bayar: Decimal,
    pub sisa_bayar: Decimal,
}

// None = manter; Some(None) = limpar (NULL)
#[derive(Default)]
pub struct CustomerChanges<'a> {
    pub nama: Option<&'a str>,
    pub no_wa: Option<Option<&'a str>>,
    pub nim: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub jurusan: Option<Option<&'a str>>,
    pub jenis: Option<CustomerJenis>,
}

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CUSTOMERS
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, data: NewCustomer<'_>) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // sudah_bayar_awal nasce igual a sudah_bayar e não muda mais
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                nama, no_wa, nim, password_hash, jurusan, jenis,
                total_bayar, sudah_bayar, sudah_bayar_awal, sisa_bayar
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9)
            RETURNING *
            "#,
        )
        .bind(data.nama)
        .bind(data.no_wa)
        .bind(data.nim)
        .bind(data.password_hash)
        .bind(data.jurusan)
        .bind(data.jenis)
        .bind(data.total_bayar)
        .bind(data.sudah_bayar)
        .bind(data.sisa_bayar)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, format!("O NIM '{}' já está cadastrado.", data.nim)))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn list(&self, jenis: Option<CustomerJenis>, search: Option<&str>) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE ($1::customer_jenis IS NULL OR jenis = $1)
              AND ($2::text IS NULL OR nama ILIKE '%' || $2 || '%' OR nim ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            "#,
        )
        .bind(jenis)
        .bind(search)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: CustomerChanges<'_>,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                nama = COALESCE($2, nama),
                no_wa = CASE WHEN $8 THEN $3 ELSE no_wa END,
                nim = COALESCE($4, nim),
                password_hash = COALESCE($5, password_hash),
                jurusan = CASE WHEN $9 THEN $6 ELSE jurusan END,
                jenis = COALESCE($7, jenis),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.nama)
        .bind(changes.no_wa.flatten())
        .bind(changes.nim)
        .bind(changes.password_hash)
        .bind(changes.jurusan.flatten())
        .bind(changes.jenis)
        .bind(changes.no_wa.is_some())
        .bind(changes.jurusan.is_some())
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Este NIM já está cadastrado."))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Grava os agregados de pagamento recalculados
    pub async fn update_paid<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        sudah_bayar: Decimal,
        sisa_bayar: Decimal,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET sudah_bayar = $2, sisa_bayar = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(sudah_bayar)
        .bind(sisa_bayar)
        .fetch_one(executor)
        .await?;
        Ok(customer)
    }

    pub async fn update_invoice<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        total_bayar: Decimal,
        sisa_bayar: Decimal,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET total_bayar = $2, sisa_bayar = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(total_bayar)
        .bind(sisa_bayar)
        .fetch_one(executor)
        .await?;
        Ok(customer)
    }

    // =========================================================================
    //  LEDGER DE PAGAMENTOS
    // =========================================================================

    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        jumlah: Decimal,
        catatan: Option<&str>,
        tanggal_bayar: DateTime<Utc>,
    ) -> Result<CustomerPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, CustomerPayment>(
            r#"
            INSERT INTO customer_payments (customer_id, jumlah, catatan, tanggal_bayar)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(jumlah)
        .bind(catatan)
        .bind(tanggal_bayar)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn list_payments(&self, customer_id: Uuid) -> Result<Vec<CustomerPayment>, AppError> {
        let payments = sqlx::query_as::<_, CustomerPayment>(
            r#"
            SELECT * FROM customer_payments
            WHERE customer_id = $1
            ORDER BY tanggal_bayar DESC, created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    pub async fn sum_payments<'e, E>(&self, executor: E, customer_id: Uuid) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(jumlah), 0) FROM customer_payments WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn delete_payments<'e, E>(&self, executor: E, customer_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customer_payments WHERE customer_id = $1")
            .bind(customer_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
