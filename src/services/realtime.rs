// src/services/realtime.rs

use std::convert::Infallible;

use axum::response::sse::Event;
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::models::jam_kerja::JamKerja;

pub const JAM_KERJA_STARTED: &str = "jamKerja:started";
pub const JAM_KERJA_PAUSED: &str = "jamKerja:paused";
pub const JAM_KERJA_RESUMED: &str = "jamKerja:resumed";
pub const JAM_KERJA_ENDED: &str = "jamKerja:ended";
pub const JAM_KERJA_AUTO_ENDED: &str = "jamKerja:autoEnded";

/// Canal de publicação best-effort. Nunca falha: quem emite não espera entrega.
pub trait Notifier: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

#[derive(Debug, Clone, Serialize)]
pub struct RealtimeEvent {
    pub event: String,
    pub data: Value,
}

// Hub em memória, um broadcast para todos os clientes SSE conectados
#[derive(Clone)]
pub struct RealtimeHub {
    tx: broadcast::Sender<RealtimeEvent>,
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }

    /// Stream SSE para um novo cliente. Mensagens perdidas por atraso são descartadas.
    pub fn subscribe_stream(&self) -> impl Stream<Item = Result<Event, Infallible>> + use<> {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|result| async move {
            match result {
                Ok(message) => Event::default()
                    .event(message.event)
                    .json_data(&message.data)
                    .ok()
                    .map(Ok),
                Err(e) => {
                    tracing::warn!("Cliente SSE atrasado, eventos descartados: {:?}", e);
                    None
                }
            }
        })
    }
}

impl Notifier for RealtimeHub {
    fn emit(&self, event: &str, payload: Value) {
        // Sem assinantes não é erro
        if let Ok(count) = self.tx.send(RealtimeEvent { event: event.to_string(), data: payload }) {
            tracing::debug!("Evento {} enviado para {} cliente(s)", event, count);
        }
    }
}

/// Payload padrão dos eventos de jam kerja.
pub fn session_payload(session: &JamKerja) -> Value {
    json!({
        "id": session.id,
        "username": session.username,
        "status": session.status,
        "jamMulai": session.jam_mulai,
        "jamSelesai": session.jam_selesai,
        "totalJam": session.total_jam,
        "tanggal": session.tanggal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let hub = RealtimeHub::new(16);
        let mut rx = hub.subscribe();

        hub.emit(JAM_KERJA_STARTED, json!({ "username": "budi" }));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event, "jamKerja:started");
        assert_eq!(received.data["username"], "budi");
    }

    #[test]
    fn emitting_without_subscribers_is_silent() {
        let hub = RealtimeHub::new(4);
        assert_eq!(hub.client_count(), 0);
        hub.emit(JAM_KERJA_ENDED, json!({}));
    }

    #[tokio::test]
    async fn stream_yields_sse_events() {
        let hub = RealtimeHub::new(4);
        let mut stream = Box::pin(hub.subscribe_stream());
        hub.emit(JAM_KERJA_PAUSED, json!({ "id": 1 }));
        assert!(stream.next().await.is_some());
    }
}
