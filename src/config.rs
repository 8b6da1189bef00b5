// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ConfigRepository, CustomerRepository, GajiRepository, JamKerjaRepository, KarilRepository, TutonRepository,
        UserRepository,
    },
    services::{
        auth::AuthService, config_service::ConfigService, customer_service::CustomerService,
        gaji_service::GajiService, jam_kerja_service::JamKerjaService, karil_service::KarilService,
        realtime::RealtimeHub, tuton_service::TutonService,
    },
};

const REALTIME_CAPACITY: usize = 256;

// Configuração lida do ambiente (.env) na inicialização
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub default_gaji_per_jam: Option<Decimal>,
    pub jwt_ttl_days: i64,
    pub sweep_interval: Duration,
    pub bootstrap_owner: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).ok_or_else(|| anyhow!("{} deve ser definida", key));

        let bootstrap_owner = match (lookup("BOOTSTRAP_OWNER_USERNAME"), lookup("BOOTSTRAP_OWNER_PASSWORD")) {
            (Some(username), Some(password)) if !username.trim().is_empty() && !password.is_empty() => {
                Some((username.trim().to_string(), password))
            }
            _ => None,
        };

        let sweep_secs: u64 = parse_or(&lookup, "SWEEP_INTERVAL_SECS", 3600)?;
        if sweep_secs == 0 {
            return Err(anyhow!("SWEEP_INTERVAL_SECS deve ser maior que zero"));
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            default_gaji_per_jam: lookup("DEFAULT_GAJI_PER_JAM")
                .map(|raw| Decimal::from_str(raw.trim()).context("DEFAULT_GAJI_PER_JAM inválido"))
                .transpose()?,
            jwt_ttl_days: parse_or(&lookup, "JWT_TTL_DAYS", 7)?,
            sweep_interval: Duration::from_secs(sweep_secs),
            bootstrap_owner,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("{} inválido: '{}'", key, raw)),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub hub: RealtimeHub,
    pub auth_service: AuthService,
    pub config_service: ConfigService,
    pub jam_kerja_service: JamKerjaService,
    pub gaji_service: GajiService,
    pub customer_service: CustomerService,
    pub tuton_service: TutonService,
    pub karil_service: KarilService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(Self::from_parts(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(db_pool: PgPool, config: Config) -> Self {
        let hub = RealtimeHub::new(REALTIME_CAPACITY);

        let user_repo = UserRepository::new(db_pool.clone());
        let config_repo = ConfigRepository::new(db_pool.clone());
        let jam_kerja_repo = JamKerjaRepository::new(db_pool.clone());
        let gaji_repo = GajiRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let tuton_repo = TutonRepository::new(db_pool.clone());
        let karil_repo = KarilRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_days,
            db_pool.clone(),
        );
        let config_service = ConfigService::new(
            config_repo,
            user_repo.clone(),
            db_pool.clone(),
            config.default_gaji_per_jam,
        );
        let jam_kerja_service = JamKerjaService::new(
            jam_kerja_repo.clone(),
            user_repo.clone(),
            config_service.clone(),
            Arc::new(hub.clone()),
            db_pool.clone(),
        );
        let gaji_service = GajiService::new(
            gaji_repo,
            jam_kerja_repo,
            user_repo,
            config_service.clone(),
            db_pool.clone(),
        );
        let customer_service = CustomerService::new(
            customer_repo.clone(),
            tuton_repo.clone(),
            karil_repo.clone(),
            db_pool.clone(),
        );
        let tuton_service = TutonService::new(tuton_repo, customer_repo.clone(), db_pool.clone());
        let karil_service = KarilService::new(karil_repo, customer_repo, db_pool.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            hub,
            auth_service,
            config_service,
            jam_kerja_service,
            gaji_service,
            customer_service,
            tuton_service,
            karil_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/admin"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.jwt_ttl_days, 7);
        assert_eq!(config.sweep_interval, Duration::from_secs(3600));
        assert!(config.default_gaji_per_jam.is_none());
        assert!(config.bootstrap_owner.is_none());
    }

    #[test]
    fn missing_required_vars_fail() {
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", "x")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/admin"),
            ("JWT_SECRET", "segredo"),
            ("DEFAULT_GAJI_PER_JAM", "17500.50"),
            ("SWEEP_INTERVAL_SECS", "60"),
            ("BOOTSTRAP_OWNER_USERNAME", "bos"),
            ("BOOTSTRAP_OWNER_PASSWORD", "rahasia123"),
        ]))
        .unwrap();

        assert_eq!(config.default_gaji_per_jam, Some(Decimal::new(1_750_050, 2)));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.bootstrap_owner, Some(("bos".to_string(), "rahasia123".to_string())));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/admin"),
            ("JWT_SECRET", "segredo"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn zero_sweep_interval_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/admin"),
            ("JWT_SECRET", "segredo"),
            ("SWEEP_INTERVAL_SECS", "0"),
        ]));
        assert!(result.is_err());
    }
}
