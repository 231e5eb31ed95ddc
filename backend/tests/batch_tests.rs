//! Processing batch tests
//!
//! Tests for oil and pickling batches including:
//! - Empty tree selections rejected before any store call
//! - Member trees resolved through the membership filter

use std::sync::Arc;

use chrono::NaiveDate;
use grove_backend::error::AppError;
use grove_backend::services::{BatchService, GridSource, TreeRegistry, TreeService};
use grove_backend::store::MemoryStore;
use shared::{NewOilProcessingBatch, NewPicklingBatch, PicklingDetails};
use uuid::Uuid;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 14).unwrap()
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    TreeRegistry::new(
        store.clone(),
        Arc::new(GridSource::from_text("x,x,x\n,x,x")),
        100,
    )
    .initialize()
    .await;
    store
}

#[tokio::test]
async fn test_empty_oil_selection_makes_no_store_call() {
    let store = Arc::new(MemoryStore::new());
    let service = BatchService::new(store.clone());

    let result = service
        .create_oil_batch(NewOilProcessingBatch {
            date: date(),
            tree_ids: Vec::new(),
        })
        .await;

    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "tree_ids"),
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert_eq!(store.calls().total(), 0);
}

#[tokio::test]
async fn test_empty_pickling_selection_makes_no_store_call() {
    let store = Arc::new(MemoryStore::new());
    let service = BatchService::new(store.clone());

    let result = service
        .create_pickling_batch(NewPicklingBatch {
            date: date(),
            tree_ids: Vec::new(),
            details: PicklingDetails::default(),
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
    assert_eq!(store.calls().total(), 0);
}

#[tokio::test]
async fn test_oil_batch_resolves_member_trees() {
    let store = seeded_store().await;
    let trees = TreeService::new(store.clone()).list_trees().await;
    let service = BatchService::new(store);

    // Pick the last and the first tree, out of grid order
    let picked = vec![trees[4].id, trees[0].id];
    let batch = service
        .create_oil_batch(NewOilProcessingBatch {
            date: date(),
            tree_ids: picked.clone(),
        })
        .await
        .unwrap();
    assert_eq!(batch.tree_ids, picked);

    let with_trees = service.get_oil_batch(batch.id).await.unwrap();
    let members: Vec<Uuid> = with_trees.trees.iter().map(|t| t.id).collect();
    assert_eq!(members, vec![trees[0].id, trees[4].id]);
}

#[tokio::test]
async fn test_pickling_batch_blank_fields_stored_as_null() {
    let store = seeded_store().await;
    let trees = TreeService::new(store.clone()).list_trees().await;
    let service = BatchService::new(store);

    let batch = service
        .create_pickling_batch(NewPicklingBatch {
            date: date(),
            tree_ids: vec![trees[1].id],
            details: PicklingDetails {
                ripeness: Some("green".to_string()),
                notes: Some("   ".to_string()),
                bruised: true,
                ..Default::default()
            },
        })
        .await
        .unwrap();

    assert_eq!(batch.ripeness.as_deref(), Some("green"));
    assert_eq!(batch.notes, None);
    assert!(batch.bruised);

    let with_trees = service.get_pickling_batch(batch.id).await.unwrap();
    assert_eq!(with_trees.trees.len(), 1);
    assert!(with_trees.trees[0].is_at(0, 1));
}

#[tokio::test]
async fn test_unknown_batches_are_not_found() {
    let store = Arc::new(MemoryStore::new());
    let service = BatchService::new(store);

    assert!(matches!(
        service.get_oil_batch(Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service
            .update_pickling_batch(Uuid::new_v4(), PicklingDetails::default())
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_views_degrade_to_empty() {
    let store = seeded_store().await;
    let service = BatchService::new(store.clone());
    service
        .create_oil_batch(NewOilProcessingBatch {
            date: date(),
            tree_ids: vec![Uuid::new_v4()],
        })
        .await
        .unwrap();

    store.fail_reads(true);
    assert!(service.list_oil_batches().await.is_empty());
    assert!(service.list_pickling_batches().await.is_empty());
}
