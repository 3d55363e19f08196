/// Advisory identity resolution for inbound requests
///
/// Resolves a bearer token (Authorization header, falling back to an
/// `access_token` query parameter) to a stored user and inserts it into the
/// request extensions. Resolution failures of any kind leave the request
/// unauthenticated rather than rejecting it; each action decides for itself
/// whether an identity is required.
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;

use auth_core::TokenService;

use crate::models::User;
use crate::storage::Storage;

/// The authenticated user attached to a request, when a token resolved.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Identity middleware factory
pub struct IdentityMiddleware {
    storage: Arc<dyn Storage>,
    tokens: TokenService,
}

impl IdentityMiddleware {
    pub fn new(storage: Arc<dyn Storage>, tokens: TokenService) -> Self {
        Self { storage, tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(IdentityMiddlewareService {
            service: Rc::new(service),
            storage: Arc::clone(&self.storage),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct IdentityMiddlewareService<S> {
    service: Rc<S>,
    storage: Arc<dyn Storage>,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let storage = Arc::clone(&self.storage);
        let tokens = self.tokens.clone();

        Box::pin(async move {
            if let Some(raw_token) = extract_token(&req) {
                if let Some(user_id) = tokens.resolve(&raw_token) {
                    // A token whose user no longer resolves counts as no
                    // token at all.
                    if let Ok(user) = storage.user_by_id(&user_id).await {
                        req.extensions_mut().insert(CurrentUser(user));
                    }
                }
            }

            service.call(req).await
        })
    }
}

/// Bearer token from the Authorization header, or the `access_token` query
/// parameter as a fallback for clients that cannot set headers.
fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(header) = req.headers().get("Authorization") {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    req.query_string()
        .split('&')
        .find_map(|pair| pair.strip_prefix("access_token="))
        .map(|token| token.to_string())
}
