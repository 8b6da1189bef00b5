// src/services/config_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ConfigRepository, UserRepository},
    models::config::{
        AppConfig, EffectiveConfig, UpdateAppConfigPayload, UpsertUserOverridePayload, UserConfigOverride,
    },
};

/// Tarifa usada quando nem o banco nem o ambiente definem uma.
pub const FALLBACK_GAJI_PER_JAM: i64 = 15_000;
const FALLBACK_BATAS_JEDA_MENIT: i32 = 60;

/// override > global > ambiente > constante
pub fn resolve_rate(override_rate: Option<Decimal>, global_rate: Option<Decimal>, env_default: Option<Decimal>) -> Decimal {
    override_rate
        .or(global_rate)
        .or(env_default)
        .unwrap_or_else(|| Decimal::from(FALLBACK_GAJI_PER_JAM))
}

#[derive(Clone)]
pub struct ConfigService {
    repo: ConfigRepository,
    user_repo: UserRepository,
    pool: PgPool,
    env_default_rate: Option<Decimal>,
}

impl ConfigService {
    pub fn new(
        repo: ConfigRepository,
        user_repo: UserRepository,
        pool: PgPool,
        env_default_rate: Option<Decimal>,
    ) -> Self {
        Self { repo, user_repo, pool, env_default_rate }
    }

    /// Tarifa efetiva do funcionário. Nunca falha: erro de leitura cai para o ambiente/constante.
    pub async fn effective_rate(&self, username: &str) -> Decimal {
        match self.repo.rate_tiers(username).await {
            Ok(tiers) => resolve_rate(tiers.override_rate, tiers.global_rate, self.env_default_rate),
            Err(e) => {
                tracing::warn!("Falha ao ler a tarifa de {}, usando o padrão: {:?}", username, e);
                resolve_rate(None, None, self.env_default_rate)
            }
        }
    }

    /// Tarifa global (ignora overrides). Usada pelo fechamento automático.
    pub async fn global_rate(&self) -> Decimal {
        match self.repo.get_app_config().await {
            Ok(config) => resolve_rate(None, config.map(|c| c.gaji_per_jam), self.env_default_rate),
            Err(e) => {
                tracing::warn!("Falha ao ler a tarifa global, usando o padrão: {:?}", e);
                resolve_rate(None, None, self.env_default_rate)
            }
        }
    }

    // --- Administração (OWNER) ---

    pub async fn get_app_config(&self) -> Result<AppConfig, AppError> {
        match self.repo.get_app_config().await? {
            Some(config) => Ok(config),
            // Linha removida manualmente: recria com os padrões
            None => self.repo.update_app_config(&self.pool, None, None, None).await,
        }
    }

    pub async fn update_app_config(&self, payload: &UpdateAppConfigPayload) -> Result<AppConfig, AppError> {
        let config = self
            .repo
            .update_app_config(
                &self.pool,
                payload.gaji_per_jam,
                payload.batas_jeda_menit,
                payload.jeda_otomatis_aktif,
            )
            .await?;
        tracing::info!("Configuração global atualizada: gaji_per_jam={}", config.gaji_per_jam);
        Ok(config)
    }

    pub async fn list_overrides(&self) -> Result<Vec<UserConfigOverride>, AppError> {
        self.repo.list_overrides().await
    }

    pub async fn get_override(&self, username: &str) -> Result<UserConfigOverride, AppError> {
        self.repo
            .get_override(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Configuração de '{}'", username)))
    }

    pub async fn upsert_override(
        &self,
        username: &str,
        payload: &UpsertUserOverridePayload,
    ) -> Result<UserConfigOverride, AppError> {
        self.ensure_user_exists(username).await?;
        self.repo
            .upsert_override(
                &self.pool,
                username,
                payload.gaji_per_jam,
                payload.batas_jeda_menit,
                payload.jeda_otomatis_aktif,
            )
            .await
    }

    pub async fn delete_override(&self, username: &str) -> Result<(), AppError> {
        if !self.repo.delete_override(&self.pool, username).await? {
            return Err(AppError::NotFound(format!("Configuração de '{}'", username)));
        }
        Ok(())
    }

    pub async fn effective_config(&self, username: &str) -> Result<EffectiveConfig, AppError> {
        self.ensure_user_exists(username).await?;
        let global = self.repo.get_app_config().await?;
        let user_override = self.repo.get_override(username).await?;
        Ok(merge_config(username, global.as_ref(), user_override.as_ref(), self.env_default_rate))
    }

    async fn ensure_user_exists(&self, username: &str) -> Result<(), AppError> {
        self.user_repo
            .find_by_username(username)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Funcionário '{}'", username)))
    }
}

fn merge_config(
    username: &str,
    global: Option<&AppConfig>,
    user_override: Option<&UserConfigOverride>,
    env_default_rate: Option<Decimal>,
) -> EffectiveConfig {
    EffectiveConfig {
        username: username.to_string(),
        gaji_per_jam: resolve_rate(
            user_override.and_then(|o| o.gaji_per_jam),
            global.map(|g| g.gaji_per_jam),
            env_default_rate,
        ),
        batas_jeda_menit: user_override
            .and_then(|o| o.batas_jeda_menit)
            .or(global.map(|g| g.batas_jeda_menit))
            .unwrap_or(FALLBACK_BATAS_JEDA_MENIT),
        jeda_otomatis_aktif: user_override
            .and_then(|o| o.jeda_otomatis_aktif)
            .or(global.map(|g| g.jeda_otomatis_aktif))
            .unwrap_or(false),
        has_override: user_override.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn override_wins_over_global() {
        let rate = resolve_rate(Some(Decimal::from(20_000)), Some(Decimal::from(15_000)), None);
        assert_eq!(rate, Decimal::from(20_000));
    }

    #[test]
    fn falls_back_through_every_tier() {
        assert_eq!(resolve_rate(None, Some(Decimal::from(12_000)), Some(Decimal::from(9_000))), Decimal::from(12_000));
        assert_eq!(resolve_rate(None, None, Some(Decimal::from(9_000))), Decimal::from(9_000));
        assert_eq!(resolve_rate(None, None, None), Decimal::from(FALLBACK_GAJI_PER_JAM));
    }

    #[test]
    fn null_override_fields_inherit_global() {
        let global = AppConfig {
            gaji_per_jam: Decimal::from(15_000),
            batas_jeda_menit: 45,
            jeda_otomatis_aktif: true,
            updated_at: Utc::now(),
        };
        let user_override = UserConfigOverride {
            username: "budi".into(),
            gaji_per_jam: Some(Decimal::from(18_000)),
            batas_jeda_menit: None,
            jeda_otomatis_aktif: Some(false),
            updated_at: Utc::now(),
        };

        let effective = merge_config("budi", Some(&global), Some(&user_override), None);
        assert_eq!(effective.gaji_per_jam, Decimal::from(18_000));
        assert_eq!(effective.batas_jeda_menit, 45);
        assert!(!effective.jeda_otomatis_aktif);
        assert!(effective.has_override);

        let plain = merge_config("siti", Some(&global), None, None);
        assert_eq!(plain.gaji_per_jam, Decimal::from(15_000));
        assert!(plain.jeda_otomatis_aktif);
        assert!(!plain.has_override);
    }
}
