use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{ErrorKind, LibError};
use crate::identity::AuthenticatedUser;
use crate::models::{
    ListConnectionsQuery, ProfilePatch, RemoveConnectionPayload, RequestActionPayload, RequestId,
    SendConnectionRequestPayload, SuggestionsQuery, UserId,
};
use crate::operations::NetworkOperations;

#[derive(Debug)]
pub struct AppError(pub LibError);

impl From<LibError> for AppError {
    fn from(value: LibError) -> Self {
        Self(value)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind {
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Database => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = ?self.0.kind, code = self.0.code, error = %self.0.source, "network api request failed");
        } else {
            tracing::warn!(kind = ?self.0.kind, code = self.0.code, error = %self.0.source, "network api request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": self.0.code,
                "message": self.0.public,
                "retryable": self.0.is_retryable(),
            }
        }));
        (status, body).into_response()
    }
}

/// JSON body whose rejection is reported through [`AppError`] as invalid input.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError(LibError::invalid_with_code(
                    "invalid_body",
                    "Malformed request body",
                    anyhow!(rejection.body_text()),
                ))
            })?;
        Ok(Self(value))
    }
}

pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError(LibError::invalid_with_code(
                    "invalid_query",
                    "Malformed query string",
                    anyhow!(rejection.body_text()),
                ))
            })?;
        Ok(Self(value))
    }
}

pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError(LibError::invalid_with_code(
                    "invalid_path",
                    "Malformed path parameter",
                    anyhow!(rejection.body_text()),
                ))
            })?;
        Ok(Self(value))
    }
}

pub trait HasPool {
    fn pool(&self) -> Arc<sqlx::PgPool>;
}

pub trait NetworkApp: HasPool {
    fn operations(&self) -> NetworkOperations {
        NetworkOperations::new(self.pool())
    }
}

async fn send_request_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidJson(payload): ValidJson<SendConnectionRequestPayload>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let request = app
        .operations()
        .send_request(auth_user.id(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn accept_request_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidJson(payload): ValidJson<RequestActionPayload>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let connection = app
        .operations()
        .accept_request(auth_user.id(), payload.request_id)
        .await?;
    Ok(Json(connection))
}

async fn reject_request_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidJson(payload): ValidJson<RequestActionPayload>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let request = app
        .operations()
        .reject_request(auth_user.id(), payload.request_id)
        .await?;
    Ok(Json(request))
}

async fn withdraw_request_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidJson(payload): ValidJson<RequestActionPayload>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let request = app
        .operations()
        .withdraw_request(auth_user.id(), payload.request_id)
        .await?;
    Ok(Json(request))
}

async fn get_request_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidPath(request_id): ValidPath<RequestId>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let view = app
        .operations()
        .get_request(auth_user.id(), request_id)
        .await?;
    Ok(Json(view))
}

async fn list_pending_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let requests = app.operations().list_pending(auth_user.id()).await?;
    Ok(Json(json!({ "requests": requests })))
}

async fn list_connections_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidQuery(query): ValidQuery<ListConnectionsQuery>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let page = app
        .operations()
        .list_connections(auth_user.id(), query)
        .await?;
    Ok(Json(page))
}

async fn status_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidPath(other_user_id): ValidPath<UserId>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let status = app
        .operations()
        .status(auth_user.id(), other_user_id)
        .await?;
    Ok(Json(status))
}

async fn remove_connection_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidJson(payload): ValidJson<RemoveConnectionPayload>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    app.operations()
        .remove_connection(auth_user.id(), payload.connection_user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn suggestions_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidQuery(query): ValidQuery<SuggestionsQuery>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let suggestions = app.operations().suggestions(auth_user.id(), query).await?;
    Ok(Json(json!({ "suggestions": suggestions })))
}

async fn get_profile_handler<S>(
    State(app): State<S>,
    _auth_user: AuthenticatedUser,
    ValidPath(user_id): ValidPath<UserId>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let profile = app.operations().get_profile(user_id).await?;
    Ok(Json(profile))
}

async fn update_profile_handler<S>(
    State(app): State<S>,
    auth_user: AuthenticatedUser,
    ValidJson(patch): ValidJson<ProfilePatch>,
) -> Result<impl IntoResponse, AppError>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    let profile = app
        .operations()
        .update_profile(auth_user.id(), patch)
        .await?;
    Ok(Json(profile))
}

pub fn routes<S>() -> Router<S>
where
    S: NetworkApp + Clone + Send + Sync + 'static,
{
    tracing::info!("Registering route /connections/{{request,accept,reject,withdraw}} [POST]");
    tracing::info!("Registering route /connections/{{pending,my,suggestions}} [GET]");
    tracing::info!("Registering route /connections/status/{{other_user_id}} [GET]");
    tracing::info!("Registering route /connections/requests/{{request_id}} [GET]");
    tracing::info!("Registering route /connections/remove [DELETE]");
    tracing::info!("Registering route /profile [PATCH], /profile/{{user_id}} [GET]");

    Router::new()
        .route("/connections/request", post(send_request_handler::<S>))
        .route("/connections/accept", post(accept_request_handler::<S>))
        .route("/connections/reject", post(reject_request_handler::<S>))
        .route("/connections/withdraw", post(withdraw_request_handler::<S>))
        .route("/connections/pending", get(list_pending_handler::<S>))
        .route("/connections/my", get(list_connections_handler::<S>))
        .route(
            "/connections/status/{other_user_id}",
            get(status_handler::<S>),
        )
        .route(
            "/connections/requests/{request_id}",
            get(get_request_handler::<S>),
        )
        .route("/connections/remove", delete(remove_connection_handler::<S>))
        .route("/connections/suggestions", get(suggestions_handler::<S>))
        .route("/profile", patch(update_profile_handler::<S>))
        .route("/profile/{user_id}", get(get_profile_handler::<S>))
}
