// src/test_support.rs
//
// Ajudantes dos testes com banco (#[sqlx::test] cria um banco novo e roda as migrations).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::periods::local_date_of,
    config::{AppState, Config},
    db::UserRepository,
    models::{
        auth::{User, UserRole},
        customer::{CreateCustomerPayload, CustomerJenis},
        jam_kerja::JamKerjaStatus,
    },
};

/// Estado completo da aplicação sobre o pool do teste.
pub fn state(pool: PgPool) -> AppState {
    let config = Config::from_lookup(|key| match key {
        // O pool já vem pronto; a URL não é usada
        "DATABASE_URL" => Some("postgres://sqlx-test".to_string()),
        "JWT_SECRET" => Some("segredo_de_teste".to_string()),
        _ => None,
    })
    .expect("config de teste");
    AppState::from_parts(pool, config)
}

pub async fn seed_user(pool: &PgPool, username: &str, role: UserRole) -> User {
    UserRepository::new(pool.clone())
        .create_user(pool, username, "hash-de-teste", &username.to_uppercase(), role)
        .await
        .expect("usuário de teste")
}

/// Grava uma sessão diretamente, para montar cenários com horários no passado.
pub async fn insert_session(
    pool: &PgPool,
    username: &str,
    status: JamKerjaStatus,
    jam_mulai: DateTime<Utc>,
    jam_selesai: Option<DateTime<Utc>>,
    total_jam: Decimal,
) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO jam_kerja (username, jam_mulai, jam_selesai, total_jam, status, tanggal)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(jam_mulai)
    .bind(jam_selesai)
    .bind(total_jam)
    .bind(status)
    .bind(local_date_of(jam_mulai))
    .fetch_one(pool)
    .await
    .expect("sessão de teste")
}

pub fn customer_payload(nim: &str, total_bayar: i64, sudah_bayar: i64) -> CreateCustomerPayload {
    CreateCustomerPayload {
        nama: format!("Mahasiswa {}", nim),
        no_wa: Some("081234567890".to_string()),
        nim: nim.to_string(),
        password: None,
        jurusan: Some("Manajemen".to_string()),
        jenis: Some(CustomerJenis::Tuton),
        total_bayar: Decimal::from(total_bayar),
        sudah_bayar: Decimal::from(sudah_bayar),
    }
}
