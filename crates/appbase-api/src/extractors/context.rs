//! Extractors for the principals the authorization gates attach.

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use appbase_core::AppError;
use appbase_service::context::{AdminContext, AuthenticatedContext};

use crate::error::ApiError;

/// The tenant (and user, if any) of the request.
///
/// Only available on routes behind one of the tenant gates.
#[derive(Debug, Clone)]
pub struct AppContext(pub AuthenticatedContext);

impl Deref for AppContext {
    type Target = AuthenticatedContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AppContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedContext>()
            .cloned()
            .map(AppContext)
            .ok_or_else(|| AppError::unauthorized("API key required").into())
    }
}

/// The signed-in administrator. Only available behind the admin gate.
#[derive(Debug, Clone)]
pub struct AdminSession(pub AdminContext);

impl Deref for AdminSession {
    type Target = AdminContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminContext>()
            .cloned()
            .map(AdminSession)
            .ok_or_else(|| AppError::unauthorized("Admin session required").into())
    }
}
