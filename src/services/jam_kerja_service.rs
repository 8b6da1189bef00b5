// src/services/jam_kerja_service.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        hours::{elapsed_hours, wage_for, AUTO_CLOSE_HOURS},
        periods::{local_date_of, local_today, Periode},
    },
    db::{JamKerjaRepository, UserRepository},
    models::{
        auth::User,
        jam_kerja::{
            EndSessionResponse, JamGaji, JamKerja, JamKerjaStatus, OwnerJamSummary, RekapResponse, SummaryScope,
            UserJamSummary,
        },
    },
    services::{
        config_service::ConfigService,
        realtime::{
            session_payload, Notifier, JAM_KERJA_AUTO_ENDED, JAM_KERJA_ENDED, JAM_KERJA_PAUSED, JAM_KERJA_RESUMED,
            JAM_KERJA_STARTED,
        },
    },
};

/// USER só age nas próprias sessões; OWNER age em qualquer uma.
pub fn ensure_can_act(actor: &User, session: &JamKerja) -> Result<(), AppError> {
    if actor.is_owner() || actor.username == session.username {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Você só pode alterar as suas próprias sessões de jam kerja.".into(),
    ))
}

/// Funcionário alvo de uma operação: o próprio ator, ou outro se o ator for OWNER.
pub fn resolve_target_username(actor: &User, requested: Option<&str>) -> Result<String, AppError> {
    match requested.map(str::trim).filter(|u| !u.is_empty()) {
        None => Ok(actor.username.clone()),
        Some(username) if username == actor.username => Ok(username.to_string()),
        Some(username) if actor.is_owner() => Ok(username.to_string()),
        Some(_) => Err(AppError::Forbidden(
            "Apenas o OWNER pode consultar ou agir por outro funcionário.".into(),
        )),
    }
}

/// No máximo uma sessão AKTIF aberta por funcionário (além da própria `id`).
pub fn ensure_no_other_open(open: Option<&JamKerja>, id: Uuid) -> Result<(), AppError> {
    match open {
        Some(other) if other.id != id => Err(AppError::BadRequest(
            "Já existe uma sessão AKTIF em andamento para este funcionário.".into(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub auto_closed: usize,
    pub pauses_finalized: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct JamKerjaService {
    repo: JamKerjaRepository,
    user_repo: UserRepository,
    config_service: ConfigService,
    notifier: Arc<dyn Notifier>,
    pool: PgPool,
}

impl JamKerjaService {
    pub fn new(
        repo: JamKerjaRepository,
        user_repo: UserRepository,
        config_service: ConfigService,
        notifier: Arc<dyn Notifier>,
        pool: PgPool,
    ) -> Self {
        Self { repo, user_repo, config_service, notifier, pool }
    }

    // =========================================================================
    //  CICLO DE VIDA
    // =========================================================================

    /// Inicia uma sessão. Se já houver uma AKTIF aberta, devolve-a (`created = false`).
    pub async fn start(&self, actor: &User, requested: Option<&str>) -> Result<(JamKerja, bool), AppError> {
        let username = resolve_target_username(actor, requested)?;

        let mut tx = self.pool.begin().await?;

        // A trava na linha do usuário serializa starts concorrentes
        self.lock_user(&mut tx, &username).await?;

        if let Some(open) = self.repo.find_open_active(&mut *tx, &username).await? {
            tx.commit().await?;
            return Ok((open, false));
        }

        let now = Utc::now();
        let session = self.repo.insert_active(&mut *tx, &username, now, local_date_of(now)).await?;

        tx.commit().await?;

        tracing::info!("▶️ Jam kerja iniciada para '{}' ({})", session.username, session.id);
        self.notifier.emit(JAM_KERJA_STARTED, session_payload(&session));
        Ok((session, true))
    }

    pub async fn pause(&self, actor: &User, id: Uuid) -> Result<JamKerja, AppError> {
        let mut tx = self.pool.begin().await?;

        let session = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sessão de jam kerja".into()))?;
        ensure_can_act(actor, &session)?;

        if !session.is_open_active() {
            return Err(AppError::BadRequest("Só é possível pausar uma sessão AKTIF em andamento.".into()));
        }

        let now = Utc::now();
        let hours = elapsed_hours(session.jam_mulai, now);
        let paused = self
            .repo
            .close(&mut *tx, id, JamKerjaStatus::Jeda, now, hours)
            .await?
            .ok_or_else(|| AppError::BadRequest("A sessão já foi encerrada.".into()))?;

        tx.commit().await?;

        tracing::info!("⏸️ Jam kerja {} pausada ({} h)", paused.id, paused.total_jam);
        self.notifier.emit(JAM_KERJA_PAUSED, session_payload(&paused));
        Ok(paused)
    }

    /// Retoma uma sessão pausada. O segmento pausado é finalizado e contabilizado;
    /// o trabalho continua numa linha nova.
    pub async fn resume(&self, actor: &User, id: Uuid) -> Result<JamKerja, AppError> {
        let session = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sessão de jam kerja".into()))?;
        ensure_can_act(actor, &session)?;

        let rate = self.config_service.effective_rate(&session.username).await;

        let mut tx = self.pool.begin().await?;

        self.lock_user(&mut tx, &session.username).await?;
        let session = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sessão de jam kerja".into()))?;

        if session.status != JamKerjaStatus::Jeda {
            return Err(AppError::BadRequest("Só é possível retomar uma sessão em JEDA.".into()));
        }

        let open = self.repo.find_open_active(&mut *tx, &session.username).await?;
        ensure_no_other_open(open.as_ref(), id)?;

        // Dados legados: JEDA sem horário de pausa volta a AKTIF na mesma linha
        if session.jam_selesai.is_none() {
            let reopened = self
                .repo
                .reopen_in_place(&mut *tx, id)
                .await?
                .ok_or_else(|| AppError::BadRequest("A sessão mudou de estado, tente novamente.".into()))?;
            tx.commit().await?;

            self.notifier.emit(JAM_KERJA_RESUMED, session_payload(&reopened));
            return Ok(reopened);
        }

        let finalized = self
            .repo
            .finalize_paused(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::BadRequest("A sessão mudou de estado, tente novamente.".into()))?;
        self.user_repo
            .accrue(&mut *tx, &finalized.username, finalized.total_jam, wage_for(finalized.total_jam, rate))
            .await?;

        let now = Utc::now();
        let resumed = self
            .repo
            .insert_active(&mut *tx, &finalized.username, now, local_date_of(now))
            .await?;

        tx.commit().await?;

        tracing::info!("⏯️ Jam kerja {} retomada como {}", finalized.id, resumed.id);
        let mut payload = session_payload(&resumed);
        payload["previousId"] = serde_json::json!(finalized.id);
        self.notifier.emit(JAM_KERJA_RESUMED, payload);
        Ok(resumed)
    }

    pub async fn end(&self, actor: &User, id: Uuid) -> Result<EndSessionResponse, AppError> {
        let session = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sessão de jam kerja".into()))?;
        ensure_can_act(actor, &session)?;

        let rate = self.config_service.effective_rate(&session.username).await;

        let mut tx = self.pool.begin().await?;

        // Travas sempre na ordem usuário -> sessão
        self.lock_user(&mut tx, &session.username).await?;
        let session = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sessão de jam kerja".into()))?;
        if !session.is_open_active() {
            return Err(AppError::BadRequest("Só é possível encerrar uma sessão AKTIF em andamento.".into()));
        }

        let now = Utc::now();
        let hours = elapsed_hours(session.jam_mulai, now);
        let ended = self
            .repo
            .close(&mut *tx, id, JamKerjaStatus::Selesai, now, hours)
            .await?
            .ok_or_else(|| AppError::BadRequest("A sessão já foi encerrada.".into()))?;

        let gaji = wage_for(hours, rate);
        self.user_repo.accrue(&mut *tx, &ended.username, hours, gaji).await?;

        tx.commit().await?;

        tracing::info!("⏹️ Jam kerja {} encerrada: {} h, gaji {}", ended.id, hours, gaji);
        self.notifier.emit(JAM_KERJA_ENDED, session_payload(&ended));

        Ok(EndSessionResponse {
            id: ended.id,
            username: ended.username,
            status: ended.status,
            total_jam: ended.total_jam,
            jam_selesai: ended.jam_selesai,
            gaji,
        })
    }

    // =========================================================================
    //  VARREDURA AGENDADA
    // =========================================================================

    /// Fecha sessões AKTIF com mais de 24h (duração fixa de 24h, tarifa global) e,
    /// para quem tem jeda automática, finaliza pausas que passaram do limite.
    pub async fn run_sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let mut report = SweepReport::default();

        let overdue = self
            .repo
            .find_overdue_active(now - Duration::hours(AUTO_CLOSE_HOURS))
            .await?;
        if !overdue.is_empty() {
            let rate = self.config_service.global_rate().await;
            for session in overdue {
                match self.auto_close(&session, rate).await {
                    Ok(true) => report.auto_closed += 1,
                    Ok(false) => {}
                    // Uma linha com problema não segura as demais
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!("Falha ao fechar a jam kerja {} automaticamente: {:?}", session.id, e);
                    }
                }
            }
        }

        for session in self.repo.find_expired_pauses(now).await? {
            let rate = self.config_service.effective_rate(&session.username).await;
            match self.finalize_expired_pause(&session, rate).await {
                Ok(true) => report.pauses_finalized += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Falha ao finalizar a pausa {}: {:?}", session.id, e);
                }
            }
        }

        Ok(report)
    }

    async fn auto_close(&self, session: &JamKerja, rate: Decimal) -> Result<bool, AppError> {
        let hours = Decimal::from(AUTO_CLOSE_HOURS);
        let jam_selesai = session.jam_mulai + Duration::hours(AUTO_CLOSE_HOURS);

        let mut tx = self.pool.begin().await?;
        self.lock_user(&mut tx, &session.username).await?;
        // Encerrada por uma requisição nesse meio tempo: nada a fazer
        let Some(closed) = self
            .repo
            .close(&mut *tx, session.id, JamKerjaStatus::Selesai, jam_selesai, hours)
            .await?
        else {
            return Ok(false);
        };
        self.user_repo
            .accrue(&mut *tx, &closed.username, hours, wage_for(hours, rate))
            .await?;
        tx.commit().await?;

        tracing::info!("⏰ Jam kerja {} de '{}' fechada automaticamente após 24h", closed.id, closed.username);
        self.notifier.emit(JAM_KERJA_AUTO_ENDED, session_payload(&closed));
        Ok(true)
    }

    async fn finalize_expired_pause(&self, session: &JamKerja, rate: Decimal) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        self.lock_user(&mut tx, &session.username).await?;
        let Some(finalized) = self.repo.finalize_paused(&mut *tx, session.id).await? else {
            return Ok(false);
        };
        self.user_repo
            .accrue(&mut *tx, &finalized.username, finalized.total_jam, wage_for(finalized.total_jam, rate))
            .await?;
        tx.commit().await?;

        tracing::info!("⏰ Pausa {} de '{}' excedeu o limite e foi finalizada", finalized.id, finalized.username);
        self.notifier.emit(JAM_KERJA_AUTO_ENDED, session_payload(&finalized));
        Ok(true)
    }

    async fn lock_user(&self, tx: &mut Transaction<'_, Postgres>, username: &str) -> Result<User, AppError> {
        self.user_repo
            .find_by_username_for_update(&mut **tx, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Funcionário '{}'", username)))
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn history(&self, actor: &User, requested: Option<&str>) -> Result<Vec<JamKerja>, AppError> {
        // OWNER sem filtro vê todos
        if actor.is_owner() && requested.map_or(true, |u| u.trim().is_empty()) {
            return self.repo.list(None).await;
        }
        let username = resolve_target_username(actor, requested)?;
        self.repo.list(Some(&username)).await
    }

    pub async fn current(&self, actor: &User) -> Result<Option<JamKerja>, AppError> {
        self.repo.find_current(&actor.username).await
    }

    pub async fn rekap(
        &self,
        actor: &User,
        requested: Option<&str>,
        period: Option<Periode>,
    ) -> Result<RekapResponse, AppError> {
        let username = resolve_target_username(actor, requested)?;
        let periode = period.unwrap_or_default();
        let total_jam = self
            .repo
            .sum_hours(
                &self.pool,
                &username,
                SummaryScope::Selesai.statuses(),
                periode.start_date(local_today()),
            )
            .await?;

        Ok(RekapResponse { username, total_jam, periode: periode.as_str().to_string() })
    }

    pub async fn user_summary(&self, user: &User, scope: SummaryScope) -> Result<UserJamSummary, AppError> {
        let rate = self.config_service.effective_rate(&user.username).await;
        let today = local_today();

        let mut windows = [JamGaji::default(); 4];
        for (slot, periode) in windows
            .iter_mut()
            .zip([Periode::Hari, Periode::Minggu, Periode::Bulan, Periode::Total])
        {
            let total_jam = self
                .repo
                .sum_hours(&self.pool, &user.username, scope.statuses(), periode.start_date(today))
                .await?;
            *slot = JamGaji { total_jam, total_gaji: wage_for(total_jam, rate) };
        }
        let [hari_ini, minggu_ini, bulan_ini, total] = windows;

        Ok(UserJamSummary {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            gaji_per_jam: rate,
            hari_ini,
            minggu_ini,
            bulan_ini,
            total,
        })
    }

    pub async fn owner_summary(&self, username: Option<&str>, scope: SummaryScope) -> Result<OwnerJamSummary, AppError> {
        let users = match username.map(str::trim).filter(|u| !u.is_empty()) {
            Some(username) => vec![self
                .user_repo
                .find_by_username(username)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Funcionário '{}'", username)))?],
            None => self.user_repo.list_users().await?,
        };

        let mut summaries = Vec::with_capacity(users.len());
        for user in &users {
            summaries.push(self.user_summary(user, scope).await?);
        }

        let counts = self.repo.count_open_users().await?;
        Ok(OwnerJamSummary {
            users: summaries,
            active_users: counts.active_users,
            paused_users: counts.paused_users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            auth::UserRole,
            config::{UpdateAppConfigPayload, UpsertUserOverridePayload},
        },
        test_support::{insert_session, seed_user, state},
    };
    use chrono::NaiveDate;

    fn user(username: &str, role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: String::new(),
            full_name: username.to_uppercase(),
            role,
            total_jam_kerja: Decimal::ZERO,
            total_gaji: Decimal::ZERO,
            total_dibayar: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn session_of(username: &str) -> JamKerja {
        JamKerja {
            id: Uuid::new_v4(),
            username: username.into(),
            jam_mulai: Utc::now(),
            jam_selesai: None,
            total_jam: Decimal::ZERO,
            status: JamKerjaStatus::Aktif,
            tanggal: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn users_act_only_on_their_own_sessions() {
        let budi = user("budi", UserRole::User);
        assert!(ensure_can_act(&budi, &session_of("budi")).is_ok());
        assert!(matches!(ensure_can_act(&budi, &session_of("siti")), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn owner_acts_on_any_session() {
        let owner = user("bos", UserRole::Owner);
        assert!(ensure_can_act(&owner, &session_of("siti")).is_ok());
    }

    #[test]
    fn target_defaults_to_the_actor() {
        let budi = user("budi", UserRole::User);
        assert_eq!(resolve_target_username(&budi, None).unwrap(), "budi");
        assert_eq!(resolve_target_username(&budi, Some("  ")).unwrap(), "budi");
        assert_eq!(resolve_target_username(&budi, Some("budi")).unwrap(), "budi");
    }

    #[test]
    fn only_owner_targets_someone_else() {
        let budi = user("budi", UserRole::User);
        let owner = user("bos", UserRole::Owner);
        assert!(matches!(resolve_target_username(&budi, Some("siti")), Err(AppError::Forbidden(_))));
        assert_eq!(resolve_target_username(&owner, Some("siti")).unwrap(), "siti");
    }

    #[test]
    fn only_open_aktif_rows_are_pausable() {
        let mut session = session_of("budi");
        assert!(session.is_open_active());

        session.jam_selesai = Some(Utc::now());
        assert!(!session.is_open_active());

        session.jam_selesai = None;
        session.status = JamKerjaStatus::Jeda;
        assert!(!session.is_open_active());
    }

    #[test]
    fn another_open_session_blocks_a_second_one() {
        let open = session_of("budi");
        assert!(ensure_no_other_open(None, Uuid::new_v4()).is_ok());
        assert!(ensure_no_other_open(Some(&open), open.id).is_ok());
        assert!(matches!(
            ensure_no_other_open(Some(&open), Uuid::new_v4()),
            Err(AppError::BadRequest(_))
        ));
    }

    // --- Com banco ---

    #[sqlx::test]
    async fn resume_finalizes_the_pause_and_continues_on_a_new_row(pool: PgPool) {
        let app = state(pool.clone());
        let budi = seed_user(&pool, "budi", UserRole::User).await;
        let svc = &app.jam_kerja_service;

        let (started, created) = svc.start(&budi, None).await.unwrap();
        assert!(created);
        let paused = svc.pause(&budi, started.id).await.unwrap();
        assert_eq!(paused.status, JamKerjaStatus::Jeda);
        assert!(paused.jam_selesai.is_some());

        let resumed = svc.resume(&budi, started.id).await.unwrap();
        assert_ne!(resumed.id, started.id);
        assert_eq!(resumed.status, JamKerjaStatus::Aktif);
        assert!(resumed.jam_selesai.is_none());

        let old = JamKerjaRepository::new(pool.clone()).find_by_id(started.id).await.unwrap().unwrap();
        assert_eq!(old.status, JamKerjaStatus::Selesai);
        assert_eq!(old.total_jam, paused.total_jam);

        // Retomar de novo a linha antiga não é mais possível
        assert!(matches!(svc.resume(&budi, started.id).await, Err(AppError::BadRequest(_))));
    }

    #[sqlx::test]
    async fn ending_right_after_start_accrues_to_the_user(pool: PgPool) {
        let app = state(pool.clone());
        let budi = seed_user(&pool, "budi", UserRole::User).await;
        let svc = &app.jam_kerja_service;

        let (started, _) = svc.start(&budi, None).await.unwrap();
        // Um segundo start devolve a mesma sessão aberta
        let (again, created) = svc.start(&budi, None).await.unwrap();
        assert_eq!(again.id, started.id);
        assert!(!created);

        let ended = svc.end(&budi, started.id).await.unwrap();
        assert_eq!(ended.status, JamKerjaStatus::Selesai);
        assert!(ended.total_jam <= Decimal::new(1, 2));
        assert!(ended.jam_selesai.is_some());

        let stored = UserRepository::new(pool.clone()).find_by_username("budi").await.unwrap().unwrap();
        assert_eq!(stored.total_jam_kerja, ended.total_jam);
        assert_eq!(stored.total_gaji, ended.gaji);

        assert!(matches!(svc.end(&budi, started.id).await, Err(AppError::BadRequest(_))));
    }

    #[sqlx::test]
    async fn legacy_pause_is_not_reopened_while_another_session_is_open(pool: PgPool) {
        let app = state(pool.clone());
        let budi = seed_user(&pool, "budi", UserRole::User).await;
        let svc = &app.jam_kerja_service;
        let now = Utc::now();

        // JEDA sem horário de pausa, vindo de dados antigos
        let legacy = insert_session(&pool, "budi", JamKerjaStatus::Jeda, now - Duration::hours(3), None, Decimal::ZERO).await;
        let open = insert_session(&pool, "budi", JamKerjaStatus::Aktif, now - Duration::hours(1), None, Decimal::ZERO).await;

        assert!(matches!(svc.resume(&budi, legacy).await, Err(AppError::BadRequest(_))));
        let repo = JamKerjaRepository::new(pool.clone());
        assert_eq!(repo.find_by_id(legacy).await.unwrap().unwrap().status, JamKerjaStatus::Jeda);

        // Sem outra sessão aberta, volta a AKTIF na mesma linha
        svc.end(&budi, open).await.unwrap();
        let reopened = svc.resume(&budi, legacy).await.unwrap();
        assert_eq!(reopened.id, legacy);
        assert_eq!(reopened.status, JamKerjaStatus::Aktif);
    }

    #[sqlx::test]
    async fn sweep_closes_forgotten_sessions_with_24h_at_the_global_rate(pool: PgPool) {
        let app = state(pool.clone());
        seed_user(&pool, "budi", UserRole::User).await;

        app.config_service
            .update_app_config(&UpdateAppConfigPayload {
                gaji_per_jam: Some(Decimal::from(20_000)),
                batas_jeda_menit: None,
                jeda_otomatis_aktif: None,
            })
            .await
            .unwrap();
        // O override do funcionário não vale para o fechamento automático
        app.config_service
            .upsert_override(
                "budi",
                &UpsertUserOverridePayload {
                    gaji_per_jam: Some(Decimal::from(50_000)),
                    batas_jeda_menit: None,
                    jeda_otomatis_aktif: None,
                },
            )
            .await
            .unwrap();

        let now = Utc::now();
        let jam_mulai = now - Duration::hours(30);
        let forgotten = insert_session(&pool, "budi", JamKerjaStatus::Aktif, jam_mulai, None, Decimal::ZERO).await;
        let recent = insert_session(&pool, "budi", JamKerjaStatus::Aktif, now - Duration::hours(2), None, Decimal::ZERO).await;

        let report = app.jam_kerja_service.run_sweep(now).await.unwrap();
        assert_eq!(report, SweepReport { auto_closed: 1, pauses_finalized: 0, failed: 0 });

        let repo = JamKerjaRepository::new(pool.clone());
        let closed = repo.find_by_id(forgotten).await.unwrap().unwrap();
        assert_eq!(closed.status, JamKerjaStatus::Selesai);
        assert_eq!(closed.total_jam, Decimal::from(24));
        let jam_selesai = closed.jam_selesai.unwrap();
        assert!((jam_selesai - (jam_mulai + Duration::hours(24))).num_milliseconds().abs() < 1);

        assert!(repo.find_by_id(recent).await.unwrap().unwrap().is_open_active());

        let stored = UserRepository::new(pool.clone()).find_by_username("budi").await.unwrap().unwrap();
        assert_eq!(stored.total_jam_kerja, Decimal::from(24));
        assert_eq!(stored.total_gaji, Decimal::from(24 * 20_000));

        // Rodar de novo não fecha nada
        assert_eq!(app.jam_kerja_service.run_sweep(now).await.unwrap(), SweepReport::default());
    }

    #[sqlx::test]
    async fn sweep_keeps_going_when_one_session_fails(pool: PgPool) {
        let app = state(pool.clone());
        seed_user(&pool, "budi", UserRole::User).await;
        seed_user(&pool, "siti", UserRole::User).await;

        // O acúmulo de siti estoura NUMERIC(16,2) e falha
        sqlx::query("UPDATE users SET total_gaji = 99999999999999.00 WHERE username = 'siti'")
            .execute(&pool)
            .await
            .unwrap();

        let now = Utc::now();
        let failing = insert_session(&pool, "siti", JamKerjaStatus::Aktif, now - Duration::hours(40), None, Decimal::ZERO).await;
        let healthy = insert_session(&pool, "budi", JamKerjaStatus::Aktif, now - Duration::hours(30), None, Decimal::ZERO).await;

        let report = app.jam_kerja_service.run_sweep(now).await.unwrap();
        assert_eq!(report, SweepReport { auto_closed: 1, pauses_finalized: 0, failed: 1 });

        let repo = JamKerjaRepository::new(pool.clone());
        assert!(repo.find_by_id(failing).await.unwrap().unwrap().is_open_active());
        assert_eq!(repo.find_by_id(healthy).await.unwrap().unwrap().status, JamKerjaStatus::Selesai);
    }
}
