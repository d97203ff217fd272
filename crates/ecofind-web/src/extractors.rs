//! Request extractors for the console API

use crate::{error::ApiError, state::AppState};
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Json,
};
use ecofind_core::Session;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use validator::Validate;

/// The logged-in administrator
///
/// The caller must present the console token issued at login as
/// `Authorization: Bearer <token>`; anything else is rejected with 401.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        state.require_admin(token).map(AdminSession)
    }
}

/// Console token from the `Authorization` header
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(ApiError::unauthorized());
    };
    value
        .to_str()
        .ok()
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(ApiError::unauthorized)
}

impl AdminSession {
    /// Bearer token for backend calls
    pub fn token(&self) -> &str {
        &self.0.token
    }
}

/// JSON body that is deserialized and then validated
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| ApiError::bad_request(format!("Invalid JSON: {}", err.body_text())))?;

        data.validate()
            .map_err(|errors| ApiError::bad_request(format!("Validation failed: {errors}")))?;

        Ok(Self(data))
    }
}

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
