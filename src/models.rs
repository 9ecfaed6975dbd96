use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LibError, Result};
use crate::invariants::RequestAction;

macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(UserId);
numeric_id!(RequestId);
numeric_id!(ConnectionId);

/// Account role. All three roles share one user table and one connection graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Employee,
    Employer,
    Recruiter,
}

impl Role {
    pub const fn as_db_value(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Employer => "employer",
            Role::Recruiter => "recruiter",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "employee" => Some(Role::Employee),
            "employer" => Some(Role::Employer),
            "recruiter" => Some(Role::Recruiter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl RequestStatus {
    pub const fn as_db_value(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "accepted" => Some(RequestStatus::Accepted),
            "rejected" => Some(RequestStatus::Rejected),
            "withdrawn" => Some(RequestStatus::Withdrawn),
            _ => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// Endpoints of an undirected connection, smaller identity first.
///
/// The only way to build one is [`CanonicalPair::new`], so a value of this type
/// never holds a self-loop or a reversed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPair {
    user_a: UserId,
    user_b: UserId,
}

impl CanonicalPair {
    pub fn new(first: UserId, second: UserId) -> Result<Self> {
        if first == second {
            return Err(LibError::invalid_with_code(
                "connection_self_loop",
                "Cannot connect a user to themselves",
                anyhow!("self-loop pair for user {}", first),
            ));
        }

        Ok(Self {
            user_a: first.min(second),
            user_b: first.max(second),
        })
    }

    pub const fn user_a(&self) -> UserId {
        self.user_a
    }

    pub const fn user_b(&self) -> UserId {
        self.user_b
    }

    pub fn counterpart(&self, user: UserId) -> Option<UserId> {
        if user == self.user_a {
            Some(self.user_b)
        } else if user == self.user_b {
            Some(self.user_a)
        } else {
            None
        }
    }

}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub id: RequestId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A request as seen by one of its endpoints, with what that endpoint may do next.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub request: ConnectionRequest,
    pub allowed_actions: Vec<RequestAction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub pair: CanonicalPair,
    pub created_at: NaiveDateTime,
}

/// An incoming pending request joined with what the recipient needs to decide on it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub id: RequestId,
    pub from_user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: NaiveDateTime,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub connected_since: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsPage {
    pub limit: u32,
    pub offset: u32,
    pub count: usize,
    pub items: Vec<ConnectionSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Relationship between the caller and another user.
///
/// Both request flags may be set at once when the two users sent each other
/// requests before either was answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub is_connected: bool,
    pub request_sent: bool,
    pub request_received: bool,
    pub sent_request_id: Option<RequestId>,
    pub received_request_id: Option<RequestId>,
}

/// A profile counter that disagreed with the connections table and was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterDrift {
    pub user_id: UserId,
    pub previous: i32,
    pub actual: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub connections_count: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConnectionRequestPayload {
    pub to_user_id: Option<UserId>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConnectionRequest {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestActionPayload {
    pub request_id: RequestId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveConnectionPayload {
    pub connection_user_id: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConnectionsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsQuery {
    pub limit: Option<u32>,
}

/// A field in a partial update: either left alone or overwritten.
///
/// An absent JSON field deserializes to `Unchanged` (with `#[serde(default)]`),
/// while an explicit `null` on a `Patch<Option<T>>` field is `Set(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Unchanged,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unchanged
    }
}

impl<T> Patch<T> {
    pub const fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unchanged => Patch::Unchanged,
            Patch::Set(value) => Patch::Set(f(value)),
        }
    }
}

impl<T> Patch<Option<T>> {
    /// Splits into the "was provided" flag and the value to write.
    pub fn into_bind(self) -> (bool, Option<T>) {
        match self {
            Patch::Unchanged => (false, None),
            Patch::Set(value) => (true, value),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default)]
    pub headline: Patch<Option<String>>,
    #[serde(default)]
    pub location: Patch<Option<String>>,
    #[serde(default)]
    pub avatar_url: Patch<Option<String>>,
}

impl ListConnectionsQuery {
    pub fn pagination(&self) -> (u32, u32) {
        let limit = self.limit.unwrap_or(50).clamp(1, 200);
        let offset = self.offset.unwrap_or(0);
        (limit, offset)
    }
}

impl SuggestionsQuery {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(12).clamp(1, 100)
    }
}

impl SendConnectionRequestPayload {
    pub fn normalize(self, from_user_id: UserId) -> Result<NewConnectionRequest> {
        let Some(to_user_id) = self.to_user_id else {
            return Err(LibError::invalid(
                "Recipient user ID is required",
                anyhow!("connection request from {} had no recipient", from_user_id),
            ));
        };

        if to_user_id == from_user_id {
            return Err(LibError::invalid_with_code(
                "connection_request_self",
                "Cannot send request to yourself",
                anyhow!("user {} sent a connection request to themselves", from_user_id),
            ));
        }

        Ok(NewConnectionRequest {
            from_user_id,
            to_user_id,
            message: trimmed_non_empty(self.message),
        })
    }
}

impl ProfilePatch {
    pub fn normalize(self) -> ProfilePatch {
        ProfilePatch {
            headline: self.headline.map(trimmed_non_empty),
            location: self.location.map(trimmed_non_empty),
            avatar_url: self.avatar_url.map(trimmed_non_empty),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.headline.is_set() && !self.location.is_set() && !self.avatar_url.is_set()
    }
}

fn trimmed_non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
