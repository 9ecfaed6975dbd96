use serde::Serialize;

use crate::models::{ConnectionRequest, RequestStatus, UserId};

/// Which endpoint of a request an actor must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSide {
    Sender,
    Recipient,
}

impl RequestSide {
    pub fn matches(self, from_user_id: UserId, to_user_id: UserId, actor: UserId) -> bool {
        match self {
            RequestSide::Sender => from_user_id == actor,
            RequestSide::Recipient => to_user_id == actor,
        }
    }
}

/// Terminal transitions a pending request can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Accept,
    Reject,
    Withdraw,
}

impl RequestAction {
    pub const ALL: [RequestAction; 3] = [
        RequestAction::Accept,
        RequestAction::Reject,
        RequestAction::Withdraw,
    ];

    pub const fn target_status(self) -> RequestStatus {
        match self {
            RequestAction::Accept => RequestStatus::Accepted,
            RequestAction::Reject => RequestStatus::Rejected,
            RequestAction::Withdraw => RequestStatus::Withdrawn,
        }
    }

    pub const fn actor_side(self) -> RequestSide {
        match self {
            RequestAction::Accept | RequestAction::Reject => RequestSide::Recipient,
            RequestAction::Withdraw => RequestSide::Sender,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RequestAction::Accept => "accept",
            RequestAction::Reject => "reject",
            RequestAction::Withdraw => "withdraw",
        }
    }

    pub fn permits(self, request: &ConnectionRequest, actor: UserId) -> bool {
        !request.status.is_terminal()
            && self
                .actor_side()
                .matches(request.from_user_id, request.to_user_id, actor)
    }
}

/// Actions `actor` may currently take on `request`; empty once it is terminal.
pub fn allowed_actions(request: &ConnectionRequest, actor: UserId) -> Vec<RequestAction> {
    RequestAction::ALL
        .into_iter()
        .filter(|action| action.permits(request, actor))
        .collect()
}

pub fn is_endpoint(request: &ConnectionRequest, actor: UserId) -> bool {
    request.from_user_id == actor || request.to_user_id == actor
}
