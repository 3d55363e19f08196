//! Write-serialization properties of the in-memory engine under concurrent
//! callers.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use forum_service::models::NewUser;
use forum_service::storage::Storage;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_user_creation_yields_gapless_distinct_ids() {
    let (_dir, storage) = common::empty_storage();

    let mut handles = Vec::new();
    for i in 0..16 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            let mut tx = storage.begin().await.expect("should begin");
            let user = tx
                .create_user(NewUser {
                    username: format!("user-{}", i),
                    password_hash: "$argon2id$fake".to_string(),
                    first_name: "Test".to_string(),
                    last_name: "User".to_string(),
                })
                .await
                .expect("should create user");
            tx.commit().await.expect("should commit");
            user.id
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.expect("task should not panic"));
    }

    // Distinct and gapless: exactly 1..=16, no duplicates
    assert_eq!(ids.len(), 16);
    for n in 1..=16u64 {
        assert!(ids.contains(n.to_string().as_str()), "missing id {}", n);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_serialize_cleanly() {
    let (_dir, storage, domain) = common::test_domain();
    let domain = Arc::new(domain);

    let mut handles = Vec::new();
    for i in 0..8 {
        let domain = Arc::clone(&domain);
        handles.push(tokio::spawn(async move {
            common::register_user(&domain, &format!("user-{}", i)).await.id
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.expect("task should not panic"));
    }

    assert_eq!(ids.len(), 8);
    assert_eq!(storage.users().await.unwrap().len(), 8);
    for n in 1..=8u64 {
        assert!(ids.contains(n.to_string().as_str()), "missing id {}", n);
    }
}
