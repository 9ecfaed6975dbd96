use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use sqlx::PgPool;
use subseq_network::api::{HasPool, NetworkApp};
use subseq_network::config::NetworkConfig;
use subseq_network::identity::AuthenticatedUser;
use subseq_network::models::{Role, UserId};
use subseq_network::operations::NetworkOperations;

#[derive(Clone)]
struct ServerApp {
    pool: Arc<PgPool>,
    require_dev_header: bool,
}

impl HasPool for ServerApp {
    fn pool(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }
}

impl NetworkApp for ServerApp {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NetworkConfig::from_env()?;
    subseq_network::logging::init(config.log_json);

    let pool = config.connect_pool().await?;
    subseq_network::db::create_network_tables(&pool)
        .await
        .context("failed to run network migrations")?;

    if config.reconcile_on_start {
        let drifts = NetworkOperations::from_pool(&pool)
            .reconcile_connection_counts(None)
            .await
            .map_err(|err| anyhow::anyhow!("failed to reconcile connection counts: {}", err))?;
        tracing::info!(repaired = drifts.len(), "connection counters reconciled");
    }

    let app_state = ServerApp {
        pool: Arc::new(pool),
        require_dev_header: config.require_dev_header,
    };

    let api_v1 = Router::new()
        .route("/healthz", get(health_handler))
        .merge(subseq_network::api::routes::<ServerApp>());

    let app = Router::new()
        .nest("/api/v1", api_v1)
        .layer(from_fn_with_state(
            app_state.clone(),
            dev_identity_middleware,
        ))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind listener on {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "network api listening under /api/v1");
    tracing::info!("identity shim headers: x-dev-user-id, x-dev-role");

    axum::serve(listener, app).await.context("server failed")
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true
    }))
}

/// Stands in for the real identity provider: trusts `x-dev-user-id` and `x-dev-role`.
async fn dev_identity_middleware(
    State(app): State<ServerApp>,
    mut req: Request,
    next: Next,
) -> Response {
    let headers = req.headers();
    let user_id = match header_value(headers, "x-dev-user-id") {
        Some(raw) => match raw.parse::<UserId>() {
            Ok(user_id) => Some(user_id),
            Err(_) => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_dev_user_id",
                    "x-dev-user-id must be an integer",
                );
            }
        },
        None if app.require_dev_header => {
            return json_error(
                StatusCode::UNAUTHORIZED,
                "missing_dev_user_id",
                "x-dev-user-id header is required",
            );
        }
        None => None,
    };

    let role = match header_value(headers, "x-dev-role") {
        Some(raw) => match Role::from_db_value(raw.trim()) {
            Some(role) => role,
            None => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_dev_role",
                    "x-dev-role must be employee, employer or recruiter",
                );
            }
        },
        None => Role::default(),
    };

    if let Some(user_id) = user_id {
        req.extensions_mut()
            .insert(AuthenticatedUser::new(user_id, role));
    }
    next.run(req).await
}

fn header_value<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    headers.get(key).and_then(|value| value.to_str().ok())
}

fn json_error(status: StatusCode, code: &'static str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        })),
    )
        .into_response()
}
