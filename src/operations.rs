use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db;
use crate::error::{LibError, Result};
use crate::models::{
    Connection, ConnectionRequest, ConnectionStatus, ConnectionsPage, CounterDrift,
    ListConnectionsQuery, PendingRequest, Profile, ProfilePatch, RequestId, RequestView,
    SendConnectionRequestPayload, Suggestion, SuggestionsQuery, UserId,
};

/// High-level connection graph actions.
///
/// Callers must provide a trusted `actor` sourced from validated auth/session state,
/// not from request arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum NetworkOperation {
    SendRequest {
        payload: SendConnectionRequestPayload,
    },
    AcceptRequest {
        request_id: RequestId,
    },
    RejectRequest {
        request_id: RequestId,
    },
    WithdrawRequest {
        request_id: RequestId,
    },
    GetRequest {
        request_id: RequestId,
    },
    ListPending,
    ListConnections {
        #[serde(default)]
        query: ListConnectionsQuery,
    },
    Status {
        other_user_id: UserId,
    },
    RemoveConnection {
        other_user_id: UserId,
    },
    Suggestions {
        #[serde(default)]
        query: SuggestionsQuery,
    },
    GetProfile {
        user_id: UserId,
    },
    UpdateProfile {
        patch: ProfilePatch,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum NetworkOperationResult {
    Request { request: ConnectionRequest },
    RequestView { view: RequestView },
    Connected { connection: Connection },
    PendingRequests { items: Vec<PendingRequest> },
    Connections { page: ConnectionsPage },
    Status { status: ConnectionStatus },
    Suggestions { items: Vec<Suggestion> },
    Profile { profile: Profile },
    Removed,
}

#[derive(Clone)]
pub struct NetworkOperations {
    pool: Arc<PgPool>,
}

impl NetworkOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn from_pool(pool: &PgPool) -> Self {
        Self {
            pool: Arc::new(pool.clone()),
        }
    }

    pub async fn execute(
        &self,
        actor: UserId,
        operation: NetworkOperation,
    ) -> Result<NetworkOperationResult> {
        match operation {
            NetworkOperation::SendRequest { payload } => {
                let request = self.send_request(actor, payload).await?;
                Ok(NetworkOperationResult::Request { request })
            }
            NetworkOperation::AcceptRequest { request_id } => {
                let connection = self.accept_request(actor, request_id).await?;
                Ok(NetworkOperationResult::Connected { connection })
            }
            NetworkOperation::RejectRequest { request_id } => {
                let request = self.reject_request(actor, request_id).await?;
                Ok(NetworkOperationResult::Request { request })
            }
            NetworkOperation::WithdrawRequest { request_id } => {
                let request = self.withdraw_request(actor, request_id).await?;
                Ok(NetworkOperationResult::Request { request })
            }
            NetworkOperation::GetRequest { request_id } => {
                let view = self.get_request(actor, request_id).await?;
                Ok(NetworkOperationResult::RequestView { view })
            }
            NetworkOperation::ListPending => {
                let items = self.list_pending(actor).await?;
                Ok(NetworkOperationResult::PendingRequests { items })
            }
            NetworkOperation::ListConnections { query } => {
                let page = self.list_connections(actor, query).await?;
                Ok(NetworkOperationResult::Connections { page })
            }
            NetworkOperation::Status { other_user_id } => {
                let status = self.status(actor, other_user_id).await?;
                Ok(NetworkOperationResult::Status { status })
            }
            NetworkOperation::RemoveConnection { other_user_id } => {
                self.remove_connection(actor, other_user_id).await?;
                Ok(NetworkOperationResult::Removed)
            }
            NetworkOperation::Suggestions { query } => {
                let items = self.suggestions(actor, query).await?;
                Ok(NetworkOperationResult::Suggestions { items })
            }
            NetworkOperation::GetProfile { user_id } => {
                let profile = self.get_profile(user_id).await?;
                Ok(NetworkOperationResult::Profile { profile })
            }
            NetworkOperation::UpdateProfile { patch } => {
                let profile = self.update_profile(actor, patch).await?;
                Ok(NetworkOperationResult::Profile { profile })
            }
        }
    }

    pub async fn send_request(
        &self,
        actor: UserId,
        payload: SendConnectionRequestPayload,
    ) -> Result<ConnectionRequest> {
        let request = db::send_connection_request(&self.pool, actor, payload)
            .await
            .map_err(LibError::for_write)?;
        tracing::info!(
            request_id = %request.id,
            from = %request.from_user_id,
            to = %request.to_user_id,
            "connection request sent"
        );
        Ok(request)
    }

    pub async fn accept_request(&self, actor: UserId, request_id: RequestId) -> Result<Connection> {
        let connection = db::accept_connection_request(&self.pool, actor, request_id)
            .await
            .map_err(LibError::for_write)?;
        tracing::info!(
            request_id = %request_id,
            user_a = %connection.pair.user_a(),
            user_b = %connection.pair.user_b(),
            sender = ?connection.pair.counterpart(actor),
            "connection request accepted"
        );
        Ok(connection)
    }

    pub async fn reject_request(
        &self,
        actor: UserId,
        request_id: RequestId,
    ) -> Result<ConnectionRequest> {
        let request = db::reject_connection_request(&self.pool, actor, request_id)
            .await
            .map_err(LibError::for_write)?;
        tracing::info!(request_id = %request_id, actor = %actor, "connection request rejected");
        Ok(request)
    }

    pub async fn withdraw_request(
        &self,
        actor: UserId,
        request_id: RequestId,
    ) -> Result<ConnectionRequest> {
        let request = db::withdraw_connection_request(&self.pool, actor, request_id)
            .await
            .map_err(LibError::for_write)?;
        tracing::info!(request_id = %request_id, actor = %actor, "connection request withdrawn");
        Ok(request)
    }

    pub async fn get_request(&self, actor: UserId, request_id: RequestId) -> Result<RequestView> {
        db::get_connection_request(&self.pool, actor, request_id).await
    }

    pub async fn list_pending(&self, actor: UserId) -> Result<Vec<PendingRequest>> {
        db::list_pending_requests(&self.pool, actor).await
    }

    pub async fn list_connections(
        &self,
        actor: UserId,
        query: ListConnectionsQuery,
    ) -> Result<ConnectionsPage> {
        let (limit, offset) = query.pagination();
        db::list_connections(&self.pool, actor, limit, offset).await
    }

    pub async fn status(&self, actor: UserId, other_user_id: UserId) -> Result<ConnectionStatus> {
        db::connection_status(&self.pool, actor, other_user_id).await
    }

    pub async fn remove_connection(&self, actor: UserId, other_user_id: UserId) -> Result<()> {
        db::remove_connection(&self.pool, actor, other_user_id)
            .await
            .map_err(LibError::for_write)?;
        tracing::info!(actor = %actor, other = %other_user_id, "connection removed");
        Ok(())
    }

    pub async fn suggestions(
        &self,
        actor: UserId,
        query: SuggestionsQuery,
    ) -> Result<Vec<Suggestion>> {
        db::connection_suggestions(&self.pool, actor, query.limit()).await
    }

    pub async fn get_profile(&self, user_id: UserId) -> Result<Profile> {
        db::get_profile(&self.pool, user_id).await
    }

    pub async fn update_profile(&self, actor: UserId, patch: ProfilePatch) -> Result<Profile> {
        db::update_profile(&self.pool, actor, patch)
            .await
            .map_err(LibError::for_write)
    }

    /// Rewrites drifted connection counters. Not exposed to end users.
    pub async fn reconcile_connection_counts(
        &self,
        scope: Option<UserId>,
    ) -> Result<Vec<CounterDrift>> {
        let drifts = db::reconcile_connection_counts(&self.pool, scope)
            .await
            .map_err(LibError::for_write)?;
        for drift in &drifts {
            tracing::warn!(
                user_id = %drift.user_id,
                previous = drift.previous,
                actual = drift.actual,
                "connection counter drift repaired"
            );
        }
        Ok(drifts)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn operations_deserialize_from_tagged_json() {
        let op: NetworkOperation = serde_json::from_value(json!({
            "operation": "send_request",
            "payload": {"toUserId": 8, "message": "hi"}
        }))
        .expect("send operation should parse");
        assert!(matches!(
            op,
            NetworkOperation::SendRequest { payload } if payload.to_user_id == Some(UserId(8))
        ));

        let op: NetworkOperation = serde_json::from_value(json!({
            "operation": "accept_request",
            "request_id": 31
        }))
        .expect("accept operation should parse");
        assert!(matches!(
            op,
            NetworkOperation::AcceptRequest { request_id } if request_id == RequestId(31)
        ));
    }

    #[test]
    fn list_operations_default_their_queries() {
        let op: NetworkOperation =
            serde_json::from_value(json!({"operation": "list_connections"}))
                .expect("list operation should parse");
        let NetworkOperation::ListConnections { query } = op else {
            panic!("expected list_connections");
        };
        assert_eq!(query.pagination(), (50, 0));

        let op: NetworkOperation = serde_json::from_value(json!({"operation": "suggestions"}))
            .expect("suggestions operation should parse");
        let NetworkOperation::Suggestions { query } = op else {
            panic!("expected suggestions");
        };
        assert_eq!(query.limit(), 12);
    }

    #[test]
    fn results_serialize_with_result_tag() {
        let value = serde_json::to_value(NetworkOperationResult::Status {
            status: ConnectionStatus {
                is_connected: false,
                request_sent: true,
                request_received: true,
                sent_request_id: Some(RequestId(1)),
                received_request_id: Some(RequestId(2)),
            },
        })
        .expect("result should serialize");

        assert_eq!(value["result"], "status");
        assert_eq!(value["status"]["requestSent"], true);
        assert_eq!(value["status"]["receivedRequestId"], 2);
        assert_eq!(
            serde_json::to_value(NetworkOperationResult::Removed).expect("serialize")["result"],
            "removed"
        );
    }
}
