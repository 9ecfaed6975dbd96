#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "sqlx")]
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
#[cfg(feature = "api")]
pub mod identity;
pub mod invariants;
pub mod logging;
pub mod models;
#[cfg(feature = "sqlx")]
pub mod operations;

pub mod prelude {
    #[cfg(feature = "api")]
    pub use crate::api::{HasPool, NetworkApp};
    #[cfg(feature = "sqlx")]
    pub use crate::db::{
        accept_connection_request, connection_status, connection_suggestions,
        create_network_tables, list_connections, list_pending_requests,
        reconcile_connection_counts, reject_connection_request, remove_connection,
        send_connection_request, withdraw_connection_request,
    };
    pub use crate::error::{ErrorKind, LibError, Result};
    #[cfg(feature = "api")]
    pub use crate::identity::AuthenticatedUser;
    pub use crate::invariants::{RequestAction, RequestSide};
    pub use crate::models::{
        CanonicalPair, Connection, ConnectionId, ConnectionRequest, ConnectionStatus,
        ConnectionSummary, ConnectionsPage, CounterDrift, ListConnectionsQuery, Patch,
        PendingRequest, Profile, ProfilePatch, RequestId, RequestStatus, Role,
        SendConnectionRequestPayload, Suggestion, SuggestionsQuery, UserId,
    };
    #[cfg(feature = "sqlx")]
    pub use crate::operations::{NetworkOperation, NetworkOperationResult, NetworkOperations};
}
