// src/services/customer_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        customer_repo::{CustomerChanges, NewCustomer},
        CustomerRepository, KarilRepository, TutonRepository,
    },
    models::customer::{
        CreateCustomerPaymentPayload, CreateCustomerPayload, Customer, CustomerJenis, CustomerPayment,
        CustomerQuery, PaymentResult, UpdateCustomerPayload,
    },
    services::auth::hash_password,
};

/// total - pago, nunca negativo.
pub fn sisa_bayar(total_bayar: Decimal, sudah_bayar: Decimal) -> Decimal {
    (total_bayar - sudah_bayar).max(Decimal::ZERO)
}

/// Pago até agora: base fixa do cadastro + soma do ledger.
pub fn sudah_bayar(awal: Decimal, ledger_sum: Decimal) -> Decimal {
    awal + ledger_sum
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Campo opcional num update: ausente mantém, vazio limpa, texto substitui.
fn clearable(value: Option<&str>) -> Option<Option<&str>> {
    value.map(|v| non_empty(Some(v)))
}

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    tuton_repo: TutonRepository,
    karil_repo: KarilRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(
        repo: CustomerRepository,
        tuton_repo: TutonRepository,
        karil_repo: KarilRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, tuton_repo, karil_repo, pool }
    }

    pub async fn create(&self, payload: &CreateCustomerPayload) -> Result<Customer, AppError> {
        if payload.total_bayar < payload.sudah_bayar {
            return Err(AppError::BadRequest(
                "O total da fatura não pode ser menor que o valor já pago.".into(),
            ));
        }

        let password_hash = match non_empty(payload.password.as_deref()) {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let customer = self
            .repo
            .create(
                &self.pool,
                NewCustomer {
                    nama: payload.nama.trim(),
                    no_wa: non_empty(payload.no_wa.as_deref()),
                    nim: payload.nim.trim(),
                    password_hash: password_hash.as_deref(),
                    jurusan: non_empty(payload.jurusan.as_deref()),
                    jenis: payload.jenis.unwrap_or(CustomerJenis::Tuton),
                    total_bayar: payload.total_bayar,
                    sudah_bayar: payload.sudah_bayar,
                    sisa_bayar: sisa_bayar(payload.total_bayar, payload.sudah_bayar),
                },
            )
            .await?;

        tracing::info!("🧾 Customer '{}' ({}) cadastrado", customer.nama, customer.nim);
        Ok(customer)
    }

    pub async fn get(&self, id: Uuid) -> Result<Customer, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".into()))
    }

    pub async fn list(&self, query: &CustomerQuery) -> Result<Vec<Customer>, AppError> {
        self.repo.list(query.jenis, non_empty(query.q.as_deref())).await
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateCustomerPayload) -> Result<Customer, AppError> {
        let password_hash = match non_empty(payload.password.as_deref()) {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let changes = CustomerChanges {
            nama: non_empty(payload.nama.as_deref()),
            no_wa: clearable(payload.no_wa.as_deref()),
            nim: non_empty(payload.nim.as_deref()),
            password_hash: password_hash.as_deref(),
            jurusan: clearable(payload.jurusan.as_deref()),
            jenis: payload.jenis,
        };

        self.repo
            .update_profile(&self.pool, id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".into()))
    }

    /// Remove o customer e tudo que depende dele numa única transação.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".into()))?;

        let payments = self.repo.delete_payments(&mut *tx, id).await?;
        self.karil_repo.delete_by_customer(&mut *tx, id).await?;
        let courses = self.tuton_repo.delete_courses_by_customer(&mut *tx, id).await?;
        self.repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!(
            "🗑️ Customer {} removido ({} pagamentos, {} matkul)",
            id,
            payments,
            courses
        );
        Ok(())
    }

    // =========================================================================
    //  PAGAMENTOS E FATURA
    // =========================================================================

    pub async fn add_payment(&self, id: Uuid, payload: &CreateCustomerPaymentPayload) -> Result<PaymentResult, AppError> {
        if payload.jumlah <= Decimal::ZERO {
            return Err(AppError::BadRequest("O valor do pagamento deve ser maior que zero.".into()));
        }

        let mut tx = self.pool.begin().await?;

        let customer = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".into()))?;

        let payment = self
            .repo
            .insert_payment(
                &mut *tx,
                id,
                payload.jumlah,
                non_empty(payload.catatan.as_deref()),
                payload.tanggal_bayar.unwrap_or_else(Utc::now),
            )
            .await?;

        // Recalcula a partir do ledger em vez de somar incrementalmente
        let ledger_sum = self.repo.sum_payments(&mut *tx, id).await?;
        let paid = sudah_bayar(customer.sudah_bayar_awal, ledger_sum);
        let customer = self
            .repo
            .update_paid(&mut *tx, id, paid, sisa_bayar(customer.total_bayar, paid))
            .await?;

        tx.commit().await?;

        tracing::info!("💰 Pagamento de {} para o customer {}", payment.jumlah, customer.id);
        Ok(PaymentResult { payment, customer })
    }

    pub async fn list_payments(&self, id: Uuid) -> Result<Vec<CustomerPayment>, AppError> {
        self.get(id).await?;
        self.repo.list_payments(id).await
    }

    pub async fn update_invoice(&self, id: Uuid, total_bayar: Decimal) -> Result<Customer, AppError> {
        let mut tx = self.pool.begin().await?;

        let customer = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".into()))?;

        if total_bayar < customer.sudah_bayar {
            return Err(AppError::BadRequest(format!(
                "O total da fatura não pode ser menor que o valor já pago ({}).",
                customer.sudah_bayar
            )));
        }

        let customer = self
            .repo
            .update_invoice(&mut *tx, id, total_bayar, sisa_bayar(total_bayar, customer.sudah_bayar))
            .await?;

        tx.commit().await?;
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{karil::UpsertKarilPayload, tuton::CreateCoursePayload},
        test_support::{customer_payload, state},
    };

    #[test]
    fn sisa_is_floored_at_zero() {
        assert_eq!(sisa_bayar(Decimal::from(100_000), Decimal::from(20_000)), Decimal::from(80_000));
        assert_eq!(sisa_bayar(Decimal::from(100_000), Decimal::from(120_000)), Decimal::ZERO);
    }

    #[test]
    fn payment_scenario_keeps_ledger_and_baseline_consistent() {
        // Cadastro: total 100000, já pago 20000 (base fixa)
        let total = Decimal::from(100_000);
        let awal = Decimal::from(20_000);
        assert_eq!(sisa_bayar(total, awal), Decimal::from(80_000));

        // Pagamento de 30000 no ledger
        let ledger_sum = Decimal::from(30_000);
        let paid = sudah_bayar(awal, ledger_sum);
        assert_eq!(paid, Decimal::from(50_000));
        assert_eq!(sisa_bayar(total, paid), Decimal::from(50_000));

        // A soma do ledger é sempre pago - base
        assert_eq!(paid - awal, ledger_sum);
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(Some(" Manajemen ")), Some("Manajemen"));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn blank_update_clears_instead_of_storing_empty_text() {
        assert_eq!(clearable(None), None);
        assert_eq!(clearable(Some("  ")), Some(None));
        assert_eq!(clearable(Some(" 0812 ")), Some(Some("0812")));
    }

    // --- Com banco ---

    fn payment(jumlah: i64) -> CreateCustomerPaymentPayload {
        CreateCustomerPaymentPayload { jumlah: Decimal::from(jumlah), catatan: Some("transfer".into()), tanggal_bayar: None }
    }

    #[sqlx::test]
    async fn payments_recompute_paid_and_remaining_from_the_ledger(pool: PgPool) {
        let app = state(pool);
        let svc = &app.customer_service;

        let customer = svc.create(&customer_payload("043333333", 100_000, 20_000)).await.unwrap();
        assert_eq!(customer.sudah_bayar, Decimal::from(20_000));
        assert_eq!(customer.sisa_bayar, Decimal::from(80_000));

        let result = svc.add_payment(customer.id, &payment(30_000)).await.unwrap();
        assert_eq!(result.customer.sudah_bayar, Decimal::from(50_000));
        assert_eq!(result.customer.sisa_bayar, Decimal::from(50_000));

        let ledger = svc.list_payments(customer.id).await.unwrap();
        let ledger_sum: Decimal = ledger.iter().map(|p| p.jumlah).sum();
        assert_eq!(ledger_sum, Decimal::from(30_000));
        assert_eq!(result.customer.sudah_bayar - result.customer.sudah_bayar_awal, ledger_sum);

        // A fatura não pode ficar abaixo do que já foi pago
        assert!(matches!(svc.update_invoice(customer.id, Decimal::from(40_000)).await, Err(AppError::BadRequest(_))));
        let raised = svc.update_invoice(customer.id, Decimal::from(150_000)).await.unwrap();
        assert_eq!(raised.sisa_bayar, Decimal::from(100_000));
    }

    #[sqlx::test]
    async fn deleting_a_customer_removes_everything_attached(pool: PgPool) {
        let app = state(pool.clone());
        let customer = app.customer_service.create(&customer_payload("044444444", 100_000, 0)).await.unwrap();

        app.customer_service.add_payment(customer.id, &payment(10_000)).await.unwrap();
        app.tuton_service
            .create_course(customer.id, &CreateCoursePayload { matkul: "Bahasa Inggris".into(), skip_default_items: false })
            .await
            .unwrap();
        app.karil_service
            .upsert(
                customer.id,
                &UpsertKarilPayload {
                    judul: Some("Analisis Laporan Keuangan".into()),
                    tugas1: Some(true),
                    tugas2: None,
                    tugas3: None,
                    tugas4: None,
                    keterangan: None,
                },
            )
            .await
            .unwrap();

        app.customer_service.delete(customer.id).await.unwrap();

        assert!(matches!(app.customer_service.get(customer.id).await, Err(AppError::NotFound(_))));
        for table in ["customer_payments", "tuton_courses", "karil_details"] {
            let left: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE customer_id = $1", table))
                .bind(customer.id)
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(left, 0, "sobrou linha em {}", table);
        }
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tuton_items").fetch_one(&pool).await.unwrap();
        assert_eq!(items, 0);

        assert!(matches!(app.customer_service.delete(customer.id).await, Err(AppError::NotFound(_))));
    }

    #[sqlx::test]
    async fn blank_contact_fields_are_cleared_to_null(pool: PgPool) {
        let app = state(pool);
        let svc = &app.customer_service;
        let customer = svc.create(&customer_payload("045555555", 0, 0)).await.unwrap();
        assert!(customer.no_wa.is_some() && customer.jurusan.is_some());

        let blank = UpdateCustomerPayload {
            nama: None,
            no_wa: Some("   ".into()),
            nim: None,
            password: None,
            jurusan: Some(String::new()),
            jenis: None,
        };
        let cleared = svc.update(customer.id, &blank).await.unwrap();
        assert_eq!(cleared.no_wa, None);
        assert_eq!(cleared.jurusan, None);
        assert_eq!(cleared.nama, customer.nama);

        // Campos ausentes ficam como estão
        let untouched = UpdateCustomerPayload {
            nama: Some("Siti Aminah".into()),
            no_wa: None,
            nim: None,
            password: None,
            jurusan: None,
            jenis: None,
        };
        let renamed = svc.update(customer.id, &untouched).await.unwrap();
        assert_eq!(renamed.nama, "Siti Aminah");
        assert_eq!(renamed.no_wa, None);
        assert_eq!(renamed.nim, customer.nim);
    }
}
