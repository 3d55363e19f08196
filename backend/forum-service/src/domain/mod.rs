/// Authenticated-action layer
///
/// Every mutating action follows the same shape: resolve identity, fetch
/// the target, check ownership and state, validate the payload, persist.
/// The layer holds no locks and no shared mutable state of its own; it
/// closes over the storage contract and the token service only, so it is
/// safe to invoke from any number of concurrent request workers.
mod auth;
mod comments;
mod posts;

use std::sync::Arc;

use auth_core::TokenService;

use crate::storage::Storage;

pub struct Domain {
    storage: Arc<dyn Storage>,
    tokens: TokenService,
}

impl Domain {
    pub fn new(storage: Arc<dyn Storage>, tokens: TokenService) -> Self {
        Self { storage, tokens }
    }
}
