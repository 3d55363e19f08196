//! GraphQL schema for the forum API

pub mod auth;
pub mod content;
pub mod user;

use std::sync::Arc;

use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::domain::Domain;
use crate::storage::Storage;

/// Root query object
#[derive(MergedObject, Default)]
pub struct QueryRoot(user::UserQuery, content::ContentQuery);

/// Root mutation object
#[derive(MergedObject, Default)]
pub struct MutationRoot(auth::AuthMutation, content::ContentMutation);

/// GraphQL app schema type
pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema.
///
/// Mutations go through the domain layer; relation resolvers read through
/// the storage contract directly.
pub fn build_schema(domain: Arc<Domain>, storage: Arc<dyn Storage>) -> AppSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(domain)
    .data(storage)
    .finish()
}
