// src/services/karil_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, KarilRepository},
    models::karil::{KarilView, UpsertKarilPayload},
};

#[derive(Clone)]
pub struct KarilService {
    repo: KarilRepository,
    customer_repo: CustomerRepository,
    pool: PgPool,
}

impl KarilService {
    pub fn new(repo: KarilRepository, customer_repo: CustomerRepository, pool: PgPool) -> Self {
        Self { repo, customer_repo, pool }
    }

    pub async fn upsert(&self, customer_id: Uuid, payload: &UpsertKarilPayload) -> Result<KarilView, AppError> {
        let customer = self
            .customer_repo
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".into()))?;

        let detail = self.repo.upsert(&self.pool, customer_id, payload).await?;

        let mut view = KarilView::from_detail(detail);
        view.customer_nama = Some(customer.nama);
        view.nim = Some(customer.nim);
        Ok(view)
    }

    pub async fn get(&self, customer_id: Uuid) -> Result<KarilView, AppError> {
        let customer = self
            .customer_repo
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".into()))?;

        let detail = self
            .repo
            .find_by_customer(customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Karil".into()))?;

        let mut view = KarilView::from_detail(detail);
        view.customer_nama = Some(customer.nama);
        view.nim = Some(customer.nim);
        Ok(view)
    }

    pub async fn list(&self) -> Result<Vec<KarilView>, AppError> {
        let rows = self.repo.list_with_customer().await?;
        Ok(rows.into_iter().map(KarilView::from).collect())
    }
}
