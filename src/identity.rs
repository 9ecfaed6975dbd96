//! Caller identity handed to the connection graph by the upstream identity provider.
//!
//! Authentication happens before a request reaches these routes: the host
//! application's middleware validates the session or token and inserts an
//! [`AuthenticatedUser`] into the request extensions. Handlers trust it verbatim.

use anyhow::anyhow;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::AppError;
use crate::error::LibError;
use crate::models::{Role, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    id: UserId,
    role: Role,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| {
                AppError(LibError::unauthorized(
                    "Authentication required",
                    anyhow!("no authenticated user in request extensions"),
                ))
            })?;
        tracing::debug!(
            user_id = %user.id(),
            role = user.role().as_db_value(),
            path = %parts.uri.path(),
            "request authenticated"
        );
        Ok(user)
    }
}
