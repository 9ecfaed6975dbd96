use anyhow::anyhow;
use once_cell::sync::Lazy;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};

use crate::error::{LibError, Result, from_store_error};
use crate::invariants::{self, RequestAction, RequestSide};
use crate::models::{
    CanonicalPair, Connection, ConnectionId, ConnectionRequest, ConnectionStatus,
    ConnectionSummary, ConnectionsPage, CounterDrift, PendingRequest, Profile, ProfilePatch,
    RequestId, RequestStatus, RequestView, Role, SendConnectionRequestPayload, Suggestion, UserId,
};

pub static MIGRATOR: Lazy<Migrator> = Lazy::new(|| {
    let mut migrator = sqlx::migrate!("./migrations");
    migrator.set_ignore_missing(true);
    migrator
});

pub async fn create_network_tables(pool: &PgPool) -> std::result::Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[derive(Debug, Clone, FromRow)]
struct RequestRow {
    id: i64,
    from_user_id: i64,
    to_user_id: i64,
    message: Option<String>,
    status: String,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
struct ConnectionRow {
    id: i64,
    user_a: i64,
    user_b: i64,
    created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
struct PendingRequestRow {
    id: i64,
    from_user_id: i64,
    message: Option<String>,
    created_at: chrono::NaiveDateTime,
    name: String,
    email: String,
    role: String,
    headline: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct ConnectionSummaryRow {
    user_id: i64,
    name: String,
    role: String,
    headline: Option<String>,
    location: Option<String>,
    avatar_url: Option<String>,
    connected_since: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
struct SuggestionRow {
    user_id: i64,
    name: String,
    role: String,
    headline: Option<String>,
    location: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct ProfileRow {
    user_id: i64,
    name: String,
    role: String,
    headline: Option<String>,
    location: Option<String>,
    avatar_url: Option<String>,
    connections_count: i32,
    updated_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
struct CounterDriftRow {
    user_id: i64,
    previous: i32,
    actual: i32,
}

const REQUEST_COLUMNS: &str =
    "id, from_user_id, to_user_id, message, status, created_at, updated_at";

fn db_err(public: &'static str, err: sqlx::Error) -> LibError {
    from_store_error(public, err)
}

enum Violation {
    Unique,
    ForeignKey,
}

fn violation(err: &sqlx::Error) -> Option<Violation> {
    let db = err.as_database_error()?;
    if db.is_unique_violation() {
        Some(Violation::Unique)
    } else if db.is_foreign_key_violation() {
        Some(Violation::ForeignKey)
    } else {
        None
    }
}

fn parse_role(value: &str) -> Result<Role> {
    Role::from_db_value(value).ok_or_else(|| {
        LibError::database(
            "Stored user role is invalid",
            anyhow!("unknown role '{}'", value),
        )
    })
}

fn hydrate_request(row: RequestRow) -> Result<ConnectionRequest> {
    let status = RequestStatus::from_db_value(&row.status).ok_or_else(|| {
        LibError::database(
            "Stored request status is invalid",
            anyhow!("request {} has unknown status '{}'", row.id, row.status),
        )
    })?;

    Ok(ConnectionRequest {
        id: RequestId(row.id),
        from_user_id: UserId(row.from_user_id),
        to_user_id: UserId(row.to_user_id),
        message: row.message,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn hydrate_connection(row: ConnectionRow) -> Result<Connection> {
    Ok(Connection {
        id: ConnectionId(row.id),
        pair: CanonicalPair::new(UserId(row.user_a), UserId(row.user_b))?,
        created_at: row.created_at,
    })
}

fn request_not_found(action: &str, request_id: RequestId, actor: UserId) -> LibError {
    // Missing, already resolved and not-yours all look the same to the caller.
    LibError::not_found(
        "Connection request not found",
        anyhow!(
            "{} of request {} by user {} matched no pending row",
            action,
            request_id,
            actor
        ),
    )
}

fn already_connected(pair: CanonicalPair) -> LibError {
    LibError::conflict(
        "already_connected",
        "Already connected with this user",
        anyhow!(
            "connection between {} and {} already exists",
            pair.user_a(),
            pair.user_b()
        ),
    )
}

fn pending_request_exists(from: UserId, to: UserId) -> LibError {
    LibError::conflict(
        "connection_request_pending",
        "Connection request already sent",
        anyhow!("pending request from {} to {} already exists", from, to),
    )
}

async fn is_connected<'e, E>(executor: E, pair: CanonicalPair) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1
            FROM network.connections
            WHERE user_a = $1
              AND user_b = $2
        )
        "#,
    )
    .bind(pair.user_a().0)
    .bind(pair.user_b().0)
    .fetch_one(executor)
    .await
    .map_err(|err| db_err("Failed to query connections", err))?;

    Ok(exists.0)
}

pub async fn send_connection_request(
    pool: &PgPool,
    actor: UserId,
    payload: SendConnectionRequestPayload,
) -> Result<ConnectionRequest> {
    let request = payload.normalize(actor)?;
    let pair = CanonicalPair::new(request.from_user_id, request.to_user_id)?;

    let pending: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1
            FROM network.connection_requests
            WHERE from_user_id = $1
              AND to_user_id = $2
              AND status = 'pending'
        )
        "#,
    )
    .bind(request.from_user_id.0)
    .bind(request.to_user_id.0)
    .fetch_one(pool)
    .await
    .map_err(|err| db_err("Failed to query connection requests", err))?;

    if pending.0 {
        return Err(pending_request_exists(
            request.from_user_id,
            request.to_user_id,
        ));
    }

    if is_connected(pool, pair).await? {
        return Err(already_connected(pair));
    }

    // The partial unique index still catches a concurrent duplicate that slipped
    // past the checks above.
    let row = sqlx::query_as::<_, RequestRow>(&format!(
        r#"
        INSERT INTO network.connection_requests (from_user_id, to_user_id, message, status)
        VALUES ($1, $2, $3, 'pending')
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(request.from_user_id.0)
    .bind(request.to_user_id.0)
    .bind(&request.message)
    .fetch_one(pool)
    .await
    .map_err(|err| match violation(&err) {
        Some(Violation::Unique) => {
            pending_request_exists(request.from_user_id, request.to_user_id)
        }
        Some(Violation::ForeignKey) => LibError::not_found(
            "Recipient not found",
            anyhow!("user {} does not exist", request.to_user_id),
        ),
        None => db_err("Failed to create connection request", err),
    })?;

    hydrate_request(row)
}

/// Conditionally moves a pending request into the action's terminal status.
///
/// Returns `None` when no pending row matched the id and the actor's side.
async fn transition_request<'e, E>(
    executor: E,
    action: RequestAction,
    request_id: RequestId,
    actor: UserId,
) -> Result<Option<RequestRow>>
where
    E: PgExecutor<'e>,
{
    let actor_column = match action.actor_side() {
        RequestSide::Recipient => "to_user_id",
        RequestSide::Sender => "from_user_id",
    };

    sqlx::query_as::<_, RequestRow>(&format!(
        r#"
        UPDATE network.connection_requests
        SET status = $1,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $2
          AND {actor_column} = $3
          AND status = 'pending'
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(action.target_status().as_db_value())
    .bind(request_id.0)
    .bind(actor.0)
    .fetch_optional(executor)
    .await
    .map_err(|err| db_err("Failed to update connection request", err))
}

/// Inserts the canonical edge for an accepted request and bumps both counters.
///
/// An endpoint without a profile row gets one, seeded from its edges (which
/// already include the new one).
async fn materialize_connection(
    tx: &mut Transaction<'_, Postgres>,
    request: &ConnectionRequest,
) -> Result<Connection> {
    let pair = CanonicalPair::new(request.from_user_id, request.to_user_id)?;

    let row = sqlx::query_as::<_, ConnectionRow>(
        r#"
        INSERT INTO network.connections (user_a, user_b, status)
        VALUES ($1, $2, 'accepted')
        ON CONFLICT (user_a, user_b) DO NOTHING
        RETURNING id, user_a, user_b, created_at
        "#,
    )
    .bind(pair.user_a().0)
    .bind(pair.user_b().0)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|err| db_err("Failed to create connection", err))?;

    let Some(row) = row else {
        return Err(already_connected(pair));
    };

    sqlx::query(
        r#"
        INSERT INTO network.profiles AS p (user_id, connections_count)
        SELECT
            u.id,
            (
                SELECT COUNT(*)
                FROM network.connections c
                WHERE c.user_a = u.id
                   OR c.user_b = u.id
            )::int
        FROM network.users u
        WHERE u.id IN ($1, $2)
        ON CONFLICT (user_id) DO UPDATE
        SET connections_count = p.connections_count + 1
        "#,
    )
    .bind(pair.user_a().0)
    .bind(pair.user_b().0)
    .execute(&mut **tx)
    .await
    .map_err(|err| db_err("Failed to update connection counts", err))?;

    hydrate_connection(row)
}

/// Accepts a pending request addressed to `actor` and materializes the edge.
///
/// The status change, edge insert and counter updates commit together. If the
/// pair is already connected the transaction rolls back and the request stays
/// pending.
pub async fn accept_connection_request(
    pool: &PgPool,
    actor: UserId,
    request_id: RequestId,
) -> Result<Connection> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|err| db_err("Failed to start transaction", err))?;

    let Some(row) = transition_request(&mut *tx, RequestAction::Accept, request_id, actor).await?
    else {
        return Err(request_not_found(
            RequestAction::Accept.as_str(),
            request_id,
            actor,
        ));
    };
    let request = hydrate_request(row)?;
    let connection = materialize_connection(&mut tx, &request).await?;

    tx.commit()
        .await
        .map_err(|err| db_err("Failed to commit transaction", err))?;

    Ok(connection)
}

/// Rejects or withdraws a pending request. Neither touches the connection graph.
pub async fn resolve_connection_request(
    pool: &PgPool,
    actor: UserId,
    request_id: RequestId,
    action: RequestAction,
) -> Result<ConnectionRequest> {
    if action == RequestAction::Accept {
        return Err(LibError::invalid(
            "Accepting a request requires materializing the connection",
            anyhow!("accept routed through resolve_connection_request"),
        ));
    }

    match transition_request(pool, action, request_id, actor).await? {
        Some(row) => hydrate_request(row),
        None => Err(request_not_found(action.as_str(), request_id, actor)),
    }
}

pub async fn reject_connection_request(
    pool: &PgPool,
    actor: UserId,
    request_id: RequestId,
) -> Result<ConnectionRequest> {
    resolve_connection_request(pool, actor, request_id, RequestAction::Reject).await
}

pub async fn withdraw_connection_request(
    pool: &PgPool,
    actor: UserId,
    request_id: RequestId,
) -> Result<ConnectionRequest> {
    resolve_connection_request(pool, actor, request_id, RequestAction::Withdraw).await
}

pub async fn get_connection_request(
    pool: &PgPool,
    actor: UserId,
    request_id: RequestId,
) -> Result<RequestView> {
    let row = sqlx::query_as::<_, RequestRow>(&format!(
        r#"
        SELECT {REQUEST_COLUMNS}
        FROM network.connection_requests
        WHERE id = $1
        "#
    ))
    .bind(request_id.0)
    .fetch_optional(pool)
    .await
    .map_err(|err| db_err("Failed to query connection request", err))?;

    let request = match row {
        Some(row) => hydrate_request(row)?,
        None => return Err(request_not_found("lookup", request_id, actor)),
    };
    if !invariants::is_endpoint(&request, actor) {
        return Err(request_not_found("lookup", request_id, actor));
    }

    let allowed_actions = invariants::allowed_actions(&request, actor);
    Ok(RequestView {
        request,
        allowed_actions,
    })
}

pub async fn list_pending_requests(pool: &PgPool, actor: UserId) -> Result<Vec<PendingRequest>> {
    let rows = sqlx::query_as::<_, PendingRequestRow>(
        r#"
        SELECT
            cr.id,
            cr.from_user_id,
            cr.message,
            cr.created_at,
            u.name,
            u.email,
            u.role,
            p.headline,
            p.avatar_url
        FROM network.connection_requests cr
        JOIN network.users u ON u.id = cr.from_user_id
        LEFT JOIN network.profiles p ON p.user_id = u.id
        WHERE cr.to_user_id = $1
          AND cr.status = 'pending'
        ORDER BY cr.created_at DESC, cr.id DESC
        "#,
    )
    .bind(actor.0)
    .fetch_all(pool)
    .await
    .map_err(|err| db_err("Failed to list pending requests", err))?;

    rows.into_iter()
        .map(|row| -> Result<PendingRequest> {
            Ok(PendingRequest {
                id: RequestId(row.id),
                from_user_id: UserId(row.from_user_id),
                message: row.message,
                created_at: row.created_at,
                name: row.name,
                email: row.email,
                role: parse_role(&row.role)?,
                headline: row.headline,
                avatar_url: row.avatar_url,
            })
        })
        .collect()
}

pub async fn list_connections(
    pool: &PgPool,
    actor: UserId,
    limit: u32,
    offset: u32,
) -> Result<ConnectionsPage> {
    let rows = sqlx::query_as::<_, ConnectionSummaryRow>(
        r#"
        SELECT
            u.id AS user_id,
            u.name,
            u.role,
            p.headline,
            p.location,
            p.avatar_url,
            c.created_at AS connected_since
        FROM network.connections c
        JOIN network.users u
          ON u.id = CASE WHEN c.user_a = $1 THEN c.user_b ELSE c.user_a END
        LEFT JOIN network.profiles p ON p.user_id = u.id
        WHERE c.user_a = $1
           OR c.user_b = $1
        ORDER BY c.created_at DESC, c.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(actor.0)
    .bind(limit as i64)
    .bind(offset as i64)
    .fetch_all(pool)
    .await
    .map_err(|err| db_err("Failed to list connections", err))?;

    let items = rows
        .into_iter()
        .map(|row| -> Result<ConnectionSummary> {
            Ok(ConnectionSummary {
                user_id: UserId(row.user_id),
                name: row.name,
                role: parse_role(&row.role)?,
                headline: row.headline,
                location: row.location,
                avatar_url: row.avatar_url,
                connected_since: row.connected_since,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ConnectionsPage {
        limit,
        offset,
        count: items.len(),
        items,
    })
}

pub async fn connection_status(
    pool: &PgPool,
    actor: UserId,
    other: UserId,
) -> Result<ConnectionStatus> {
    let Ok(pair) = CanonicalPair::new(actor, other) else {
        return Ok(ConnectionStatus::default());
    };

    let is_connected = is_connected(pool, pair).await?;

    let pending: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT id, from_user_id
        FROM network.connection_requests
        WHERE status = 'pending'
          AND (
              (from_user_id = $1 AND to_user_id = $2)
              OR (from_user_id = $2 AND to_user_id = $1)
          )
        "#,
    )
    .bind(actor.0)
    .bind(other.0)
    .fetch_all(pool)
    .await
    .map_err(|err| db_err("Failed to query connection requests", err))?;

    let mut status = ConnectionStatus {
        is_connected,
        ..ConnectionStatus::default()
    };
    for (id, from_user_id) in pending {
        if UserId(from_user_id) == actor {
            status.request_sent = true;
            status.sent_request_id = Some(RequestId(id));
        } else {
            status.request_received = true;
            status.received_request_id = Some(RequestId(id));
        }
    }

    Ok(status)
}

/// Deletes the edge between `actor` and `other` and decrements both counters,
/// never below zero.
pub async fn remove_connection(pool: &PgPool, actor: UserId, other: UserId) -> Result<()> {
    let pair = CanonicalPair::new(actor, other)?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|err| db_err("Failed to start transaction", err))?;

    let deleted = sqlx::query(
        r#"
        DELETE FROM network.connections
        WHERE user_a = $1
          AND user_b = $2
        "#,
    )
    .bind(pair.user_a().0)
    .bind(pair.user_b().0)
    .execute(&mut *tx)
    .await
    .map_err(|err| db_err("Failed to remove connection", err))?;

    if deleted.rows_affected() == 0 {
        return Err(LibError::not_found(
            "Connection not found",
            anyhow!("no connection between {} and {}", actor, other),
        ));
    }

    sqlx::query(
        r#"
        UPDATE network.profiles
        SET connections_count = GREATEST(connections_count - 1, 0)
        WHERE user_id IN ($1, $2)
        "#,
    )
    .bind(pair.user_a().0)
    .bind(pair.user_b().0)
    .execute(&mut *tx)
    .await
    .map_err(|err| db_err("Failed to update connection counts", err))?;

    tx.commit()
        .await
        .map_err(|err| db_err("Failed to commit transaction", err))?;

    Ok(())
}

/// Users that are neither `actor`, connected to `actor`, nor on either end of a
/// pending request with `actor`. Order is random on every call.
pub async fn connection_suggestions(
    pool: &PgPool,
    actor: UserId,
    limit: u32,
) -> Result<Vec<Suggestion>> {
    let rows = sqlx::query_as::<_, SuggestionRow>(
        r#"
        SELECT
            u.id AS user_id,
            u.name,
            u.role,
            p.headline,
            p.location,
            p.avatar_url
        FROM network.users u
        LEFT JOIN network.profiles p ON p.user_id = u.id
        WHERE u.id <> $1
          AND NOT EXISTS (
              SELECT 1
              FROM network.connections c
              WHERE (c.user_a = $1 AND c.user_b = u.id)
                 OR (c.user_b = $1 AND c.user_a = u.id)
          )
          AND NOT EXISTS (
              SELECT 1
              FROM network.connection_requests cr
              WHERE cr.status = 'pending'
                AND (
                    (cr.from_user_id = $1 AND cr.to_user_id = u.id)
                    OR (cr.to_user_id = $1 AND cr.from_user_id = u.id)
                )
          )
        ORDER BY RANDOM()
        LIMIT $2
        "#,
    )
    .bind(actor.0)
    .bind(limit as i64)
    .fetch_all(pool)
    .await
    .map_err(|err| db_err("Failed to query connection suggestions", err))?;

    rows.into_iter()
        .map(|row| -> Result<Suggestion> {
            Ok(Suggestion {
                user_id: UserId(row.user_id),
                name: row.name,
                role: parse_role(&row.role)?,
                headline: row.headline,
                location: row.location,
                avatar_url: row.avatar_url,
            })
        })
        .collect()
}

/// Recomputes `connections_count` from the connections table and rewrites any
/// counter that drifted. Pass `None` to reconcile every profile.
pub async fn reconcile_connection_counts(
    pool: &PgPool,
    scope: Option<UserId>,
) -> Result<Vec<CounterDrift>> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|err| db_err("Failed to start transaction", err))?;

    // Blocks accept/remove until the recount commits.
    sqlx::query("LOCK TABLE network.connections IN SHARE MODE")
        .execute(&mut *tx)
        .await
        .map_err(|err| db_err("Failed to lock connections", err))?;

    let rows = sqlx::query_as::<_, CounterDriftRow>(
        r#"
        WITH computed AS (
            SELECT
                p.user_id,
                p.connections_count AS previous,
                (
                    SELECT COUNT(*)
                    FROM network.connections c
                    WHERE c.user_a = p.user_id
                       OR c.user_b = p.user_id
                )::int AS actual
            FROM network.profiles p
            WHERE $1::bigint IS NULL
               OR p.user_id = $1
        )
        UPDATE network.profiles p
        SET connections_count = computed.actual
        FROM computed
        WHERE p.user_id = computed.user_id
          AND computed.previous <> computed.actual
        RETURNING p.user_id, computed.previous, computed.actual
        "#,
    )
    .bind(scope.map(|user| user.0))
    .fetch_all(&mut *tx)
    .await
    .map_err(|err| db_err("Failed to reconcile connection counts", err))?;

    tx.commit()
        .await
        .map_err(|err| db_err("Failed to commit transaction", err))?;

    Ok(rows
        .into_iter()
        .map(|row| CounterDrift {
            user_id: UserId(row.user_id),
            previous: row.previous,
            actual: row.actual,
        })
        .collect())
}

/// Creates the profile row for `user` if missing, seeding its counter from the graph.
pub async fn ensure_profile(pool: &PgPool, user: UserId) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO network.profiles (user_id, connections_count)
        SELECT
            $1,
            (
                SELECT COUNT(*)
                FROM network.connections c
                WHERE c.user_a = $1
                   OR c.user_b = $1
            )::int
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user.0)
    .execute(pool)
    .await
    .map_err(|err| match violation(&err) {
        Some(Violation::ForeignKey) => LibError::not_found(
            "User not found",
            anyhow!("user {} does not exist", user),
        ),
        _ => db_err("Failed to create profile", err),
    })?;

    Ok(())
}

/// Users without a profile row report their live edge count.
pub async fn get_profile(pool: &PgPool, user: UserId) -> Result<Profile> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT
            u.id AS user_id,
            u.name,
            u.role,
            p.headline,
            p.location,
            p.avatar_url,
            COALESCE(
                p.connections_count,
                (
                    SELECT COUNT(*)
                    FROM network.connections c
                    WHERE c.user_a = u.id
                       OR c.user_b = u.id
                )::int
            ) AS connections_count,
            COALESCE(p.updated_at, u.created_at) AS updated_at
        FROM network.users u
        LEFT JOIN network.profiles p ON p.user_id = u.id
        WHERE u.id = $1
        "#,
    )
    .bind(user.0)
    .fetch_optional(pool)
    .await
    .map_err(|err| db_err("Failed to query profile", err))?;

    let Some(row) = row else {
        return Err(LibError::not_found(
            "User not found",
            anyhow!("user {} does not exist", user),
        ));
    };

    Ok(Profile {
        user_id: UserId(row.user_id),
        name: row.name,
        role: parse_role(&row.role)?,
        headline: row.headline,
        location: row.location,
        avatar_url: row.avatar_url,
        connections_count: row.connections_count,
        updated_at: row.updated_at,
    })
}

/// Applies only the fields present in `patch`; an explicit null clears a field.
pub async fn update_profile(pool: &PgPool, actor: UserId, patch: ProfilePatch) -> Result<Profile> {
    let patch = patch.normalize();
    if patch.is_empty() {
        return get_profile(pool, actor).await;
    }

    ensure_profile(pool, actor).await?;

    let (headline_set, headline) = patch.headline.into_bind();
    let (location_set, location) = patch.location.into_bind();
    let (avatar_set, avatar_url) = patch.avatar_url.into_bind();

    sqlx::query(
        r#"
        UPDATE network.profiles
        SET headline = CASE WHEN $2 THEN $3 ELSE headline END,
            location = CASE WHEN $4 THEN $5 ELSE location END,
            avatar_url = CASE WHEN $6 THEN $7 ELSE avatar_url END,
            updated_at = CURRENT_TIMESTAMP
        WHERE user_id = $1
        "#,
    )
    .bind(actor.0)
    .bind(headline_set)
    .bind(headline)
    .bind(location_set)
    .bind(location)
    .bind(avatar_set)
    .bind(avatar_url)
    .execute(pool)
    .await
    .map_err(|err| db_err("Failed to update profile", err))?;

    get_profile(pool, actor).await
}
