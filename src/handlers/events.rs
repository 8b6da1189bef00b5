// src/handlers/events.rs

use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::{
        sse::{KeepAlive, Sse},
        IntoResponse,
    },
};
use serde::Deserialize;

use crate::{common::error::AppError, config::AppState};

const KEEP_ALIVE_SECS: u64 = 30;

// EventSource não envia cabeçalhos, o token vem na query
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub token: Option<String>,
}

// GET /api/events?token=
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Realtime",
    params(("token" = String, Query, description = "JWT do usuário")),
    responses(
        (status = 200, description = "Stream SSE de eventos jamKerja:*", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Token ausente ou inválido")
    )
)]
pub async fn stream_events(
    State(app_state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let token = query.token.ok_or(AppError::InvalidToken)?;
    let user = app_state.auth_service.validate_token(&token).await?;

    tracing::info!(
        "📡 Cliente SSE conectado: {} ({} já conectados)",
        user.username,
        app_state.hub.client_count()
    );

    Ok(Sse::new(app_state.hub.subscribe_stream())
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS))))
}
