// src/services/tuton_service.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::nilai_in_domain},
    db::{CustomerRepository, TutonRepository},
    models::tuton::{
        BulkNilaiPayload, BulkStatusPayload, BulkUpdateResult, ConflictGroup, ConflictMember, ConflictRow,
        CourseItems, CreateCoursePayload, TutonCourse, TutonItem, TutonItemChange, TutonItemJenis,
        TutonItemStatus, UpdateItemPayload,
    },
};

const SESSIONS: i32 = 8;
const TUGAS_SESSIONS: [i32; 3] = [3, 5, 7];

/// Grade padrão de uma matkul: 8 DISKUSI, 8 ABSEN e TUGAS nas sessões 3, 5 e 7.
pub fn default_item_seed() -> Vec<(TutonItemJenis, i32)> {
    let mut seed = Vec::with_capacity(2 * SESSIONS as usize + TUGAS_SESSIONS.len());
    seed.extend((1..=SESSIONS).map(|sesi| (TutonItemJenis::Diskusi, sesi)));
    seed.extend((1..=SESSIONS).map(|sesi| (TutonItemJenis::Absen, sesi)));
    seed.extend(TUGAS_SESSIONS.iter().map(|sesi| (TutonItemJenis::Tugas, *sesi)));
    seed
}

fn check_nilai_range(nilai: Decimal) -> Result<(), AppError> {
    if !nilai_in_domain(nilai) {
        return Err(AppError::BadRequest(
            "A nota deve estar entre 0 e 100, com no máximo duas casas decimais.".into(),
        ));
    }
    Ok(())
}

/// ABSEN não tem nota nem marcação de copas.
pub fn validate_patch(jenis: TutonItemJenis, patch: &UpdateItemPayload) -> Result<(), AppError> {
    if jenis == TutonItemJenis::Absen && (patch.nilai.is_some() || patch.copas.is_some()) {
        return Err(AppError::BadRequest("Itens ABSEN não aceitam nilai nem copas.".into()));
    }
    if let Some(Some(nilai)) = patch.nilai {
        check_nilai_range(nilai)?;
    }
    Ok(())
}

/// Estado final do item após o patch. SELESAI carimba `selesai_at`; BELUM limpa.
pub fn apply_patch(item: &TutonItem, patch: &UpdateItemPayload, now: DateTime<Utc>) -> TutonItem {
    let mut next = item.clone();

    if let Some(status) = patch.status {
        next.selesai_at = match status {
            TutonItemStatus::Selesai => item.selesai_at.filter(|_| item.status == TutonItemStatus::Selesai).or(Some(now)),
            TutonItemStatus::Belum => None,
        };
        next.status = status;
    }
    if let Some(nilai) = patch.nilai {
        next.nilai = nilai;
    }
    if let Some(deskripsi) = &patch.deskripsi {
        next.deskripsi = deskripsi.clone();
    }
    if let Some(copas) = patch.copas {
        next.copas = copas;
    }
    next
}

/// Todos os ids pedidos precisam existir, ser únicos e pertencer à matkul.
pub fn ensure_items_belong(course_id: Uuid, requested: &[Uuid], found: &[TutonItem]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(requested.len());
    if let Some(dup) = requested.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::BadRequest(format!("O item {} aparece mais de uma vez.", dup)));
    }

    for id in requested {
        match found.iter().find(|item| item.id == *id) {
            Some(item) if item.course_id == course_id => {}
            _ => {
                return Err(AppError::BadRequest(format!(
                    "O item {} não pertence a esta matkul.",
                    id
                )))
            }
        }
    }
    Ok(())
}

/// Agrupa por matkul; só grupos com mais de um membro. O mais antigo é o original.
pub fn group_conflicts(rows: Vec<ConflictRow>) -> Vec<ConflictGroup> {
    let mut groups: Vec<(String, Vec<ConflictRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(matkul, _)| *matkul == row.matkul) {
            Some((_, members)) => members.push(row),
            None => groups.push((row.matkul.clone(), vec![row])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(matkul, mut members)| {
            members.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.course_id.cmp(&b.course_id)));
            let members: Vec<ConflictMember> = members
                .into_iter()
                .enumerate()
                .map(|(position, row)| ConflictMember {
                    course_id: row.course_id,
                    customer_id: row.customer_id,
                    customer_nama: row.customer_nama,
                    nim: row.nim,
                    created_at: row.created_at,
                    is_duplicate: position > 0,
                })
                .collect();
            ConflictGroup { matkul, total: members.len(), members }
        })
        .collect()
}

#[derive(Clone)]
pub struct TutonService {
    repo: TutonRepository,
    customer_repo: CustomerRepository,
    pool: PgPool,
}

impl TutonService {
    pub fn new(repo: TutonRepository, customer_repo: CustomerRepository, pool: PgPool) -> Self {
        Self { repo, customer_repo, pool }
    }

    // =========================================================================
    //  COURSES
    // =========================================================================

    pub async fn create_course(&self, customer_id: Uuid, payload: &CreateCoursePayload) -> Result<CourseItems, AppError> {
        self.ensure_customer(customer_id).await?;
        let matkul = payload.matkul.trim();
        if matkul.is_empty() {
            return Err(AppError::BadRequest("A matkul é obrigatória.".into()));
        }

        let mut tx = self.pool.begin().await?;

        let course = self.repo.create_course(&mut *tx, customer_id, matkul).await?;
        if !payload.skip_default_items {
            self.repo.insert_items(&mut *tx, course.id, &default_item_seed()).await?;
        }
        let course = self.repo.recalculate_course_progress(&mut *tx, course.id).await?;

        tx.commit().await?;

        tracing::info!("📚 Matkul '{}' criada para o customer {} ({} itens)", course.matkul, customer_id, course.total_items);
        let items = self.repo.list_items(course.id).await?;
        Ok(CourseItems { course, items })
    }

    pub async fn list_courses(&self, customer_id: Uuid) -> Result<Vec<TutonCourse>, AppError> {
        self.ensure_customer(customer_id).await?;
        self.repo.list_courses(customer_id).await
    }

    pub async fn delete_course(&self, course_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_course(&self.pool, course_id).await? {
            return Err(AppError::NotFound("Matkul".into()));
        }
        Ok(())
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn list_items(&self, course_id: Uuid) -> Result<CourseItems, AppError> {
        let course = self
            .repo
            .find_course(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Matkul".into()))?;
        let items = self.repo.list_items(course_id).await?;
        Ok(CourseItems { course, items })
    }

    /// (Re)cria a grade padrão. Com `overwrite`, apaga tudo antes.
    pub async fn init_items(&self, course_id: Uuid, overwrite: bool) -> Result<CourseItems, AppError> {
        let mut tx = self.pool.begin().await?;

        self.repo
            .find_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Matkul".into()))?;

        if overwrite {
            self.repo.delete_items(&mut *tx, course_id).await?;
        }
        self.repo.insert_items(&mut *tx, course_id, &default_item_seed()).await?;
        let course = self.repo.recalculate_course_progress(&mut *tx, course_id).await?;

        tx.commit().await?;

        let items = self.repo.list_items(course_id).await?;
        Ok(CourseItems { course, items })
    }

    pub async fn update_item(&self, item_id: Uuid, patch: &UpdateItemPayload) -> Result<TutonItemChange, AppError> {
        let course_id = self
            .repo
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".into()))?
            .course_id;

        let mut tx = self.pool.begin().await?;

        // Ordem de travas: matkul e depois item (a mesma das operações em lote)
        self.repo
            .find_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Matkul".into()))?;
        let item = self
            .repo
            .find_item_for_update(&mut *tx, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".into()))?;
        validate_patch(item.jenis, patch)?;

        let next = apply_patch(&item, patch, Utc::now());
        let item = self.repo.update_item(&mut *tx, &next).await?;
        let course = self.repo.recalculate_course_progress(&mut *tx, item.course_id).await?;

        tx.commit().await?;
        Ok(TutonItemChange { item, course })
    }

    pub async fn update_item_status(&self, item_id: Uuid, status: TutonItemStatus) -> Result<TutonItemChange, AppError> {
        let patch = UpdateItemPayload { status: Some(status), ..Default::default() };
        self.update_item(item_id, &patch).await
    }

    pub async fn update_item_nilai(&self, item_id: Uuid, nilai: Option<Decimal>) -> Result<TutonItemChange, AppError> {
        let patch = UpdateItemPayload { nilai: Some(nilai), ..Default::default() };
        self.update_item(item_id, &patch).await
    }

    pub async fn bulk_update_status(&self, course_id: Uuid, payload: &BulkStatusPayload) -> Result<BulkUpdateResult, AppError> {
        let entries: Vec<(Uuid, TutonItemStatus)> =
            payload.items.iter().map(|entry| (entry.item_id, entry.status)).collect();
        let ids: Vec<Uuid> = entries.iter().map(|(id, _)| *id).collect();

        let mut tx = self.pool.begin().await?;

        self.repo
            .find_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Matkul".into()))?;

        let found = self.repo.find_items_by_ids(&mut *tx, &ids).await?;
        ensure_items_belong(course_id, &ids, &found)?;

        let updated = self.repo.bulk_set_status(&mut *tx, course_id, &entries, Utc::now()).await?;
        let course = self.repo.recalculate_course_progress(&mut *tx, course_id).await?;

        tx.commit().await?;
        Ok(BulkUpdateResult { updated: updated as usize, course })
    }

    pub async fn bulk_update_nilai(&self, course_id: Uuid, payload: &BulkNilaiPayload) -> Result<BulkUpdateResult, AppError> {
        for entry in &payload.items {
            if let Some(nilai) = entry.nilai {
                check_nilai_range(nilai)?;
            }
        }
        let entries: Vec<(Uuid, Option<Decimal>)> =
            payload.items.iter().map(|entry| (entry.item_id, entry.nilai)).collect();
        let ids: Vec<Uuid> = entries.iter().map(|(id, _)| *id).collect();

        let mut tx = self.pool.begin().await?;

        self.repo
            .find_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Matkul".into()))?;

        let found = self.repo.find_items_by_ids(&mut *tx, &ids).await?;
        ensure_items_belong(course_id, &ids, &found)?;
        if found.iter().any(|item| item.jenis == TutonItemJenis::Absen) {
            return Err(AppError::BadRequest("Itens ABSEN não aceitam nilai.".into()));
        }

        let updated = self.repo.bulk_set_nilai(&mut *tx, course_id, &entries).await?;
        let course = self.repo.recalculate_course_progress(&mut *tx, course_id).await?;

        tx.commit().await?;
        Ok(BulkUpdateResult { updated: updated as usize, course })
    }

    // =========================================================================
    //  CONFLITOS
    // =========================================================================

    pub async fn list_conflicts(&self) -> Result<Vec<ConflictGroup>, AppError> {
        let rows = self.repo.list_conflict_rows(None).await?;
        Ok(group_conflicts(rows))
    }

    pub async fn conflict_by_matkul(&self, matkul: &str) -> Result<ConflictGroup, AppError> {
        let rows = self.repo.list_conflict_rows(Some(matkul.trim())).await?;
        group_conflicts(rows)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Conflito para a matkul '{}'", matkul.trim())))
    }

    async fn ensure_customer(&self, customer_id: Uuid) -> Result<(), AppError> {
        self.customer_repo
            .find_by_id(customer_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Customer".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::tuton::BulkStatusEntry,
        test_support::{customer_payload, state},
    };
    use chrono::Duration;

    fn item(jenis: TutonItemJenis, course_id: Uuid) -> TutonItem {
        TutonItem {
            id: Uuid::new_v4(),
            course_id,
            jenis,
            sesi: 1,
            status: TutonItemStatus::Belum,
            nilai: None,
            selesai_at: None,
            deskripsi: None,
            copas: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn conflict_row(matkul: &str, nama: &str, created_at: DateTime<Utc>) -> ConflictRow {
        ConflictRow {
            course_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            customer_nama: nama.into(),
            nim: format!("NIM-{}", nama),
            matkul: matkul.into(),
            created_at,
        }
    }

    #[test]
    fn seed_has_nineteen_items_in_the_expected_shape() {
        let seed = default_item_seed();
        assert_eq!(seed.len(), 19);

        let count = |jenis| seed.iter().filter(|(j, _)| *j == jenis).count();
        assert_eq!(count(TutonItemJenis::Diskusi), 8);
        assert_eq!(count(TutonItemJenis::Absen), 8);
        assert_eq!(count(TutonItemJenis::Tugas), 3);

        let tugas: Vec<i32> = seed
            .iter()
            .filter(|(j, _)| *j == TutonItemJenis::Tugas)
            .map(|(_, s)| *s)
            .collect();
        assert_eq!(tugas, vec![3, 5, 7]);
    }

    #[test]
    fn absen_rejects_nilai_and_copas() {
        let with_nilai = UpdateItemPayload { nilai: Some(Some(Decimal::from(80))), ..Default::default() };
        let cleared_nilai = UpdateItemPayload { nilai: Some(None), ..Default::default() };
        let with_copas = UpdateItemPayload { copas: Some(true), ..Default::default() };

        for patch in [&with_nilai, &cleared_nilai, &with_copas] {
            assert!(matches!(validate_patch(TutonItemJenis::Absen, patch), Err(AppError::BadRequest(_))));
            assert!(validate_patch(TutonItemJenis::Diskusi, patch).is_ok());
        }

        let status_only = UpdateItemPayload { status: Some(TutonItemStatus::Selesai), ..Default::default() };
        assert!(validate_patch(TutonItemJenis::Absen, &status_only).is_ok());
    }

    #[test]
    fn nilai_outside_zero_to_hundred_is_rejected() {
        let too_high = UpdateItemPayload { nilai: Some(Some(Decimal::new(10001, 2))), ..Default::default() };
        assert!(validate_patch(TutonItemJenis::Tugas, &too_high).is_err());

        let bounds = [Decimal::ZERO, Decimal::ONE_HUNDRED];
        for nilai in bounds {
            let patch = UpdateItemPayload { nilai: Some(Some(nilai)), ..Default::default() };
            assert!(validate_patch(TutonItemJenis::Tugas, &patch).is_ok());
        }
    }

    #[test]
    fn nilai_with_three_decimals_is_rejected_not_rounded() {
        let patch = UpdateItemPayload { nilai: Some(Some(Decimal::new(85_555, 3))), ..Default::default() };
        assert!(matches!(validate_patch(TutonItemJenis::Diskusi, &patch), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn status_changes_stamp_and_clear_selesai_at() {
        let now = Utc::now();
        let belum = item(TutonItemJenis::Diskusi, Uuid::new_v4());

        let done = apply_patch(&belum, &UpdateItemPayload { status: Some(TutonItemStatus::Selesai), ..Default::default() }, now);
        assert_eq!(done.status, TutonItemStatus::Selesai);
        assert_eq!(done.selesai_at, Some(now));

        // Marcar SELESAI de novo mantém o carimbo original
        let later = now + Duration::minutes(10);
        let again = apply_patch(&done, &UpdateItemPayload { status: Some(TutonItemStatus::Selesai), ..Default::default() }, later);
        assert_eq!(again.selesai_at, Some(now));

        let reverted = apply_patch(&done, &UpdateItemPayload { status: Some(TutonItemStatus::Belum), ..Default::default() }, later);
        assert_eq!(reverted.selesai_at, None);
    }

    #[test]
    fn null_nilai_clears_and_absent_nilai_keeps() {
        let mut graded = item(TutonItemJenis::Tugas, Uuid::new_v4());
        graded.nilai = Some(Decimal::from(90));

        let untouched = apply_patch(&graded, &UpdateItemPayload { copas: Some(true), ..Default::default() }, Utc::now());
        assert_eq!(untouched.nilai, Some(Decimal::from(90)));
        assert!(untouched.copas);

        let cleared = apply_patch(&graded, &UpdateItemPayload { nilai: Some(None), ..Default::default() }, Utc::now());
        assert_eq!(cleared.nilai, None);

        let zero = apply_patch(&graded, &UpdateItemPayload { nilai: Some(Some(Decimal::ZERO)), ..Default::default() }, Utc::now());
        assert_eq!(zero.nilai, Some(Decimal::ZERO));
    }

    #[test]
    fn bulk_items_must_belong_to_the_course() {
        let course_id = Uuid::new_v4();
        let own = item(TutonItemJenis::Diskusi, course_id);
        let foreign = item(TutonItemJenis::Diskusi, Uuid::new_v4());

        assert!(ensure_items_belong(course_id, &[own.id], &[own.clone()]).is_ok());
        assert!(ensure_items_belong(course_id, &[own.id, foreign.id], &[own.clone(), foreign.clone()]).is_err());
        // Id inexistente
        assert!(ensure_items_belong(course_id, &[Uuid::new_v4()], &[]).is_err());
        // Id repetido
        assert!(ensure_items_belong(course_id, &[own.id, own.id], &[own]).is_err());
    }

    #[test]
    fn three_customers_with_same_matkul_form_one_group() {
        let t0 = Utc::now();
        let rows = vec![
            conflict_row("Statistika", "cici", t0 + Duration::minutes(5)),
            conflict_row("Statistika", "ani", t0),
            conflict_row("Statistika", "budi", t0 + Duration::minutes(1)),
            conflict_row("Akuntansi", "dedi", t0),
        ];

        let groups = group_conflicts(rows);
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.matkul, "Statistika");
        assert_eq!(group.total, 3);
        assert_eq!(group.members.iter().filter(|m| !m.is_duplicate).count(), 1);
        assert_eq!(group.members[0].customer_nama, "ani");
        assert!(!group.members[0].is_duplicate);
        assert!(group.members[1].is_duplicate && group.members[2].is_duplicate);
    }

    // --- Com banco ---

    #[sqlx::test]
    async fn bulk_status_keeps_completed_items_in_step_with_the_grid(pool: PgPool) {
        let app = state(pool);
        let customer = app.customer_service.create(&customer_payload("041111111", 0, 0)).await.unwrap();
        let created = app
            .tuton_service
            .create_course(customer.id, &CreateCoursePayload { matkul: "Statistika Ekonomi".into(), skip_default_items: false })
            .await
            .unwrap();
        assert_eq!(created.course.total_items, 19);
        assert_eq!(created.course.completed_items, 0);

        let ids: Vec<Uuid> = created.items.iter().map(|item| item.id).collect();
        let mark = |ids: &[Uuid], status| BulkStatusPayload {
            items: ids.iter().map(|id| BulkStatusEntry { item_id: *id, status }).collect(),
        };

        let first = app
            .tuton_service
            .bulk_update_status(created.course.id, &mark(&ids[..5], TutonItemStatus::Selesai))
            .await
            .unwrap();
        assert_eq!(first.updated, 5);
        assert_eq!(first.course.completed_items, 5);

        // Dois voltam para BELUM; repetir SELESAI em outro não conta em dobro
        let second = app
            .tuton_service
            .bulk_update_status(created.course.id, &mark(&ids[..2], TutonItemStatus::Belum))
            .await
            .unwrap();
        assert_eq!(second.course.completed_items, 3);
        app.tuton_service
            .bulk_update_status(created.course.id, &mark(&ids[4..5], TutonItemStatus::Selesai))
            .await
            .unwrap();

        let listed = app.tuton_service.list_items(created.course.id).await.unwrap();
        let selesai = listed.items.iter().filter(|item| item.status == TutonItemStatus::Selesai).count();
        assert_eq!(listed.course.completed_items as usize, selesai);
        assert_eq!(selesai, 3);
        assert!(listed
            .items
            .iter()
            .all(|item| (item.status == TutonItemStatus::Selesai) == item.selesai_at.is_some()));
    }

    #[sqlx::test]
    async fn bulk_status_refuses_items_from_another_course(pool: PgPool) {
        let app = state(pool);
        let customer = app.customer_service.create(&customer_payload("042222222", 0, 0)).await.unwrap();
        let seed = |matkul: &str| CreateCoursePayload { matkul: matkul.into(), skip_default_items: false };
        let a = app.tuton_service.create_course(customer.id, &seed("Matematika")).await.unwrap();
        let b = app.tuton_service.create_course(customer.id, &seed("Akuntansi")).await.unwrap();

        let foreign = BulkStatusPayload {
            items: vec![BulkStatusEntry { item_id: b.items[0].id, status: TutonItemStatus::Selesai }],
        };
        assert!(app.tuton_service.bulk_update_status(a.course.id, &foreign).await.is_err());

        let untouched = app.tuton_service.list_items(b.course.id).await.unwrap();
        assert_eq!(untouched.course.completed_items, 0);
    }
}
