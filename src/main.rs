//src/main.rs

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use crate::config::{AppState, Config};
use crate::services::jam_kerja_service::JamKerjaService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG manda; sem ele, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env().context("Falha ao carregar a configuração")?;
    let bind_addr = config.bind_addr.clone();
    let sweep_interval = config.sweep_interval;
    let bootstrap_owner = config.bootstrap_owner.clone();

    let app_state = AppState::new(config)
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some((username, password)) = bootstrap_owner {
        app_state.auth_service.bootstrap_owner(&username, &password).await?;
    }

    tokio::spawn(run_sweep_loop(app_state.jam_kerja_service.clone(), sweep_interval));

    let app = routes::build_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}

// Varredura periódica: fecha sessões esquecidas e pausas vencidas.
// Falhas só são logadas; o próximo tick tenta de novo.
async fn run_sweep_loop(service: JamKerjaService, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match service.run_sweep(Utc::now()).await {
            Ok(report) if report.auto_closed > 0 || report.pauses_finalized > 0 || report.failed > 0 => {
                tracing::info!(
                    "🧹 Varredura: {} sessão(ões) fechada(s), {} pausa(s) finalizada(s), {} falha(s)",
                    report.auto_closed,
                    report.pauses_finalized,
                    report.failed
                );
            }
            Ok(_) => tracing::debug!("Varredura sem pendências"),
            Err(e) => tracing::error!("Falha na varredura de jam kerja: {:?}", e),
        }
    }
}
