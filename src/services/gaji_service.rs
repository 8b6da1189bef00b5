// src/services/gaji_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        hours::wage_for,
        periods::{local_midnight_utc, local_today, Periode},
    },
    db::{GajiRepository, JamKerjaRepository, UserRepository},
    models::{
        auth::User,
        gaji::{CreateGajiPayload, Gaji, GajiSummary, OwnerGajiSummary, UpdateGajiPayload},
        jam_kerja::SummaryScope,
    },
    services::config_service::ConfigService,
};

/// Quanto ainda falta pagar (nunca negativo).
pub fn remaining(accrued: Decimal, paid: Decimal) -> Decimal {
    (accrued - paid).max(Decimal::ZERO)
}

/// Rejeita pagamentos que ultrapassam o gaji acumulado menos o já pago.
pub fn ensure_within_remaining(amount: Decimal, accrued: Decimal, paid: Decimal) -> Result<(), AppError> {
    let sisa = remaining(accrued, paid);
    if amount > sisa {
        return Err(AppError::GajiExceedsRemaining { sisa });
    }
    Ok(())
}

fn ensure_positive(amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("O valor do gaji deve ser maior que zero.".into()));
    }
    Ok(())
}

fn normalize_note(catatan: Option<&str>) -> Option<&str> {
    catatan.map(str::trim).filter(|c| !c.is_empty())
}

#[derive(Clone)]
pub struct GajiService {
    repo: GajiRepository,
    jam_kerja_repo: JamKerjaRepository,
    user_repo: UserRepository,
    config_service: ConfigService,
    pool: PgPool,
}

impl GajiService {
    pub fn new(
        repo: GajiRepository,
        jam_kerja_repo: JamKerjaRepository,
        user_repo: UserRepository,
        config_service: ConfigService,
        pool: PgPool,
    ) -> Self {
        Self { repo, jam_kerja_repo, user_repo, config_service, pool }
    }

    pub async fn create(&self, payload: &CreateGajiPayload) -> Result<Gaji, AppError> {
        ensure_positive(payload.jumlah_bayar)?;
        let username = payload.username.trim();
        let rate = self.config_service.effective_rate(username).await;

        let mut tx = self.pool.begin().await?;

        // Trava o funcionário: horas acumuladas e pagamentos lidos sem concorrência
        self.user_repo
            .find_by_username_for_update(&mut *tx, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Funcionário '{}'", username)))?;

        let total_jam = self
            .jam_kerja_repo
            .sum_hours(&mut *tx, username, SummaryScope::Selesai.statuses(), None)
            .await?;
        let paid = self.repo.sum_paid(&mut *tx, username, None, None).await?;
        ensure_within_remaining(payload.jumlah_bayar, wage_for(total_jam, rate), paid)?;

        let gaji = self
            .repo
            .insert(&mut *tx, username, payload.jumlah_bayar, normalize_note(payload.catatan.as_deref()))
            .await?;
        self.user_repo.add_paid(&mut *tx, username, gaji.jumlah_bayar).await?;

        tx.commit().await?;

        tracing::info!("💸 Gaji de {} registrado para '{}'", gaji.jumlah_bayar, gaji.username);
        Ok(gaji)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateGajiPayload) -> Result<Gaji, AppError> {
        if let Some(amount) = payload.jumlah_bayar {
            ensure_positive(amount)?;
        }

        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Gaji".into()))?;

        let new_amount = payload.jumlah_bayar.unwrap_or(current.jumlah_bayar);
        let catatan = match payload.catatan.as_deref() {
            Some(note) => normalize_note(Some(note)),
            None => current.catatan.as_deref(),
        };

        // Revalida o saldo em toda edição, mesmo só de observação
        let rate = self.config_service.effective_rate(&current.username).await;
        self.user_repo
            .find_by_username_for_update(&mut *tx, &current.username)
            .await?;

        let total_jam = self
            .jam_kerja_repo
            .sum_hours(&mut *tx, &current.username, SummaryScope::Selesai.statuses(), None)
            .await?;
        // O próprio lançamento não conta como "já pago"
        let paid = self.repo.sum_paid(&mut *tx, &current.username, Some(id), None).await?;
        ensure_within_remaining(new_amount, wage_for(total_jam, rate), paid)?;

        let updated = self.repo.update(&mut *tx, id, new_amount, catatan).await?;
        self.user_repo
            .add_paid(&mut *tx, &updated.username, new_amount - current.jumlah_bayar)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Gaji".into()))?;

        self.repo.delete(&mut *tx, id).await?;
        self.user_repo
            .add_paid(&mut *tx, &current.username, -current.jumlah_bayar)
            .await?;

        tx.commit().await?;

        tracing::info!("🗑️ Gaji {} de '{}' removido", current.id, current.username);
        Ok(())
    }

    pub async fn list(&self, username: Option<&str>) -> Result<Vec<Gaji>, AppError> {
        self.repo.list(username.map(str::trim).filter(|u| !u.is_empty())).await
    }

    /// Resumo de um funcionário, limitado ao período (horas SELESAI e pagamentos).
    pub async fn summary_for(&self, user: &User, periode: Periode) -> Result<GajiSummary, AppError> {
        let rate = self.config_service.effective_rate(&user.username).await;
        let since = periode.start_date(local_today());

        let total_jam = self
            .jam_kerja_repo
            .sum_hours(&self.pool, &user.username, SummaryScope::Selesai.statuses(), since)
            .await?;
        let total_diterima = self
            .repo
            .sum_paid(&self.pool, &user.username, None, since.map(local_midnight_utc))
            .await?;
        let total_gaji = wage_for(total_jam, rate);

        Ok(GajiSummary {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            total_jam,
            gaji_per_jam: rate,
            total_gaji,
            total_diterima,
            sisa: remaining(total_gaji, total_diterima),
        })
    }

    pub async fn owner_summary(&self, periode: Periode) -> Result<OwnerGajiSummary, AppError> {
        let users = self.user_repo.list_users().await?;

        let mut summaries = Vec::with_capacity(users.len());
        for user in &users {
            summaries.push(self.summary_for(user, periode).await?);
        }

        let total_gaji = summaries.iter().map(|s| s.total_gaji).sum();
        let total_diterima = summaries.iter().map(|s| s.total_diterima).sum();
        let total_sisa = summaries.iter().map(|s| s.sisa).sum();

        Ok(OwnerGajiSummary { periode, users: summaries, total_gaji, total_diterima, total_sisa })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{auth::UserRole, config::UpdateAppConfigPayload, jam_kerja::JamKerjaStatus},
        test_support::{insert_session, seed_user, state},
    };
    use chrono::{Duration, Utc};

    #[test]
    fn paying_with_nothing_accrued_exceeds_remaining() {
        let err = ensure_within_remaining(Decimal::from(100_000), Decimal::ZERO, Decimal::ZERO).unwrap_err();
        match err {
            AppError::GajiExceedsRemaining { sisa } => assert_eq!(sisa, Decimal::ZERO),
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn paying_exactly_the_remaining_is_allowed() {
        // 10h x 15000 = 150000, já pagos 100000
        let accrued = wage_for(Decimal::from(10), Decimal::from(15_000));
        assert!(ensure_within_remaining(Decimal::from(50_000), accrued, Decimal::from(100_000)).is_ok());
        assert!(ensure_within_remaining(Decimal::new(5_000_001, 2), accrued, Decimal::from(100_000)).is_err());
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(remaining(Decimal::from(100), Decimal::from(250)), Decimal::ZERO);
        assert_eq!(remaining(Decimal::from(300), Decimal::from(250)), Decimal::from(50));
    }

    #[test]
    fn editing_excludes_the_row_being_edited() {
        // Acumulado 100000; outro pagamento de 30000; o editado (60000) não conta
        let accrued = Decimal::from(100_000);
        let paid_excluding_self = Decimal::from(30_000);
        assert!(ensure_within_remaining(Decimal::from(70_000), accrued, paid_excluding_self).is_ok());
        assert!(ensure_within_remaining(Decimal::from(70_001), accrued, paid_excluding_self).is_err());
    }

    #[test]
    fn non_positive_amounts_are_bad_requests() {
        assert!(matches!(ensure_positive(Decimal::ZERO), Err(AppError::BadRequest(_))));
        assert!(matches!(ensure_positive(Decimal::from(-5)), Err(AppError::BadRequest(_))));
        assert!(ensure_positive(Decimal::ONE).is_ok());
    }

    // --- Com banco ---

    #[sqlx::test]
    async fn gaji_without_accrued_hours_is_refused(pool: PgPool) {
        let app = state(pool.clone());
        seed_user(&pool, "budi", UserRole::User).await;

        let payload = CreateGajiPayload { username: "budi".into(), jumlah_bayar: Decimal::from(100_000), catatan: None };
        match app.gaji_service.create(&payload).await {
            Err(AppError::GajiExceedsRemaining { sisa }) => assert_eq!(sisa, Decimal::ZERO),
            other => panic!("resultado inesperado: {:?}", other),
        }
        assert!(app.gaji_service.list(Some("budi")).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn editing_a_gaji_rechecks_against_the_current_rate(pool: PgPool) {
        let app = state(pool.clone());
        seed_user(&pool, "budi", UserRole::User).await;

        // 10h encerradas x 15000 = 150000
        let mulai = Utc::now() - Duration::hours(12);
        insert_session(&pool, "budi", JamKerjaStatus::Selesai, mulai, Some(mulai + Duration::hours(10)), Decimal::from(10)).await;

        let gaji = app
            .gaji_service
            .create(&CreateGajiPayload { username: "budi".into(), jumlah_bayar: Decimal::from(150_000), catatan: None })
            .await
            .unwrap();

        app.config_service
            .update_app_config(&UpdateAppConfigPayload {
                gaji_per_jam: Some(Decimal::from(10_000)),
                batas_jeda_menit: None,
                jeda_otomatis_aktif: None,
            })
            .await
            .unwrap();

        // Só a observação muda, mas o valor já passa do que é devido
        let note_only = UpdateGajiPayload { jumlah_bayar: None, catatan: Some("bônus".into()) };
        match app.gaji_service.update(gaji.id, &note_only).await {
            Err(AppError::GajiExceedsRemaining { sisa }) => assert_eq!(sisa, Decimal::from(100_000)),
            other => panic!("resultado inesperado: {:?}", other),
        }

        let reduced = UpdateGajiPayload { jumlah_bayar: Some(Decimal::from(100_000)), catatan: Some("bônus".into()) };
        let updated = app.gaji_service.update(gaji.id, &reduced).await.unwrap();
        assert_eq!(updated.jumlah_bayar, Decimal::from(100_000));
        assert_eq!(updated.catatan.as_deref(), Some("bônus"));

        let stored = UserRepository::new(pool.clone()).find_by_username("budi").await.unwrap().unwrap();
        assert_eq!(stored.total_dibayar, Decimal::from(100_000));
    }
}
