// Shared fixtures; each test binary uses its own subset.
#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use auth_core::TokenService;
use forum_service::domain::Domain;
use forum_service::models::{LoginInput, RegisterInput, User};
use forum_service::storage::memory::MemoryStorage;
use forum_service::storage::Storage;

pub const TEST_SECRET: &str = "test-secret-key";

/// Seed an empty snapshot directory and load a fresh in-memory engine.
/// The TempDir must stay alive for as long as the engine persists to it.
pub fn empty_storage() -> (TempDir, MemoryStorage) {
    let dir = TempDir::new().expect("should create temp dir");
    std::fs::write(dir.path().join("users.json"), "[]").expect("should seed users.json");
    std::fs::write(dir.path().join("posts.json"), "[]").expect("should seed posts.json");
    let storage = MemoryStorage::load(dir.path()).expect("should load storage");
    (dir, storage)
}

pub fn test_tokens() -> TokenService {
    TokenService::new(TEST_SECRET, "forum")
}

pub fn test_domain() -> (TempDir, Arc<dyn Storage>, Domain) {
    let (dir, storage) = empty_storage();
    let storage: Arc<dyn Storage> = Arc::new(storage);
    let domain = Domain::new(Arc::clone(&storage), test_tokens());
    (dir, storage, domain)
}

pub fn register_input(username: &str, password: &str, first: &str, last: &str) -> RegisterInput {
    RegisterInput {
        username: username.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
    }
}

pub fn login_input(username: &str, password: &str) -> LoginInput {
    LoginInput {
        username: username.to_string(),
        password: password.to_string(),
    }
}

/// Register a user and return the stored record.
pub async fn register_user(domain: &Domain, username: &str) -> User {
    domain
        .register(register_input(username, "secret1", "Test", "User"))
        .await
        .expect("registration should succeed")
        .user
}
