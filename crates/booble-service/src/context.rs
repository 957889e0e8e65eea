//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Built by the API's auth extractor and passed into service methods so
/// that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// Email from the access token.
    pub email: String,
    /// IP address of the request origin, when known.
    pub ip_address: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, email: String, ip_address: Option<String>) -> Self {
        Self {
            user_id,
            email,
            ip_address,
            request_time: Utc::now(),
        }
    }

    /// Context for operator tooling acting on behalf of a user.
    pub fn system(user_id: Uuid) -> Self {
        Self::new(user_id, String::new(), None)
    }
}
