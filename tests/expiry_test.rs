#![allow(clippy::indexing_slicing)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use affairs_daemon::record::expiry::{evaluate, reconcile};
use affairs_daemon::{Actor, EntityType, RecordStatus, RecordStore};
use common::{at, fields, Harness};
use serde_json::json;

#[test]
fn test_evaluation_is_deterministic() {
    let end = Some(at(2024, 6, 1, 10, 0, 0));
    let before = at(2024, 6, 1, 23, 59, 59);
    let after = at(2024, 6, 2, 0, 0, 1);
    assert_eq!(evaluate(end, before), Some(RecordStatus::Active));
    assert_eq!(evaluate(end, after), Some(RecordStatus::Expired));
    assert_eq!(evaluate(end, after), evaluate(end, after));
    assert_eq!(evaluate(None, after), None);
}

#[tokio::test]
async fn test_membership_expiry_boundary() {
    let h = Harness::new(at(2024, 6, 1, 23, 59, 59));
    let created = h
        .engine
        .create(
            EntityType::Membership,
            &fields(json!({
                "name": "ACU",
                "startDate": "2023-06-01",
                "endDate": "2024-06-01T10:00:00"
            })),
            &Actor::employee("emp-1"),
        )
        .await
        .unwrap();
    assert_eq!(created.record_status, Some(RecordStatus::Active));

    h.clock.set(at(2024, 6, 2, 0, 0, 1));
    let report = reconcile(h.store.as_ref(), at(2024, 6, 2, 0, 0, 1)).await.unwrap();
    let entry = report.entry(EntityType::Membership).unwrap();
    assert_eq!(entry.scanned, 1);
    assert_eq!(entry.expired, 1);
    assert_eq!(report.changed(), 1);

    let stored = h
        .engine
        .get(EntityType::Membership, &created.id.to_string())
        .await
        .unwrap();
    assert_eq!(stored.record_status, Some(RecordStatus::Expired));
    assert_eq!(stored.updated_at, created.updated_at);
}

#[tokio::test]
async fn test_sweep_leaves_unchanged_records_alone() {
    let h = Harness::new(at(2024, 6, 1, 9, 0, 0));
    let current = h
        .engine
        .create(
            EntityType::ScholarInResidence,
            &fields(json!({
                "scholarName": "Dr. Rao",
                "country": "India",
                "fromDate": "2024-05-01",
                "toDate": "2024-12-01"
            })),
            &Actor::admin("admin-1"),
        )
        .await
        .unwrap();

    let report = reconcile(h.store.as_ref(), at(2024, 6, 15, 0, 0, 0)).await.unwrap();
    assert_eq!(report.changed(), 0);
    let stored = h
        .store
        .get(EntityType::ScholarInResidence, current.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.revision, current.revision);
    assert!(report.entry(EntityType::Event).is_none());
}

#[tokio::test]
async fn test_write_reevaluates_expiry() {
    let h = Harness::new(at(2024, 6, 1, 9, 0, 0));
    let partner = h
        .engine
        .create(
            EntityType::Partner,
            &fields(json!({
                "university": "Kyoto",
                "country": "Japan",
                "signingDate": "2020-01-01",
                "expiringDate": "2024-01-01"
            })),
            &Actor::admin("admin-1"),
        )
        .await
        .unwrap();
    assert_eq!(partner.record_status, Some(RecordStatus::Expired));

    let renewed = h
        .engine
        .update(
            EntityType::Partner,
            &partner.id.to_string(),
            &fields(json!({"expiringDate": "2029-01-01"})),
            &Actor::admin("admin-1"),
        )
        .await
        .unwrap()
        .into_record();
    assert_eq!(renewed.record_status, Some(RecordStatus::Active));
}

#[tokio::test]
async fn test_approved_edit_reevaluates_expiry() {
    let h = Harness::new(at(2024, 6, 1, 9, 0, 0));
    let membership = h
        .engine
        .create(
            EntityType::Membership,
            &fields(json!({"name": "ACU", "startDate": "2023-01-01", "endDate": "2025-01-01"})),
            &Actor::employee("emp-1"),
        )
        .await
        .unwrap();
    let id = membership.id.to_string();
    h.engine
        .update(
            EntityType::Membership,
            &id,
            &fields(json!({"endDate": "2024-03-01"})),
            &Actor::employee("emp-1"),
        )
        .await
        .unwrap();
    let pending = h.engine.get(EntityType::Membership, &id).await.unwrap();
    assert_eq!(pending.record_status, Some(RecordStatus::Active));

    h.engine
        .approve(EntityType::Membership, &id, &Actor::admin("admin-1"))
        .await
        .unwrap();
    let approved = h.engine.get(EntityType::Membership, &id).await.unwrap();
    assert_eq!(approved.record_status, Some(RecordStatus::Expired));
}
