//! JSON request and response types for the HTTP gateway.

use serde::{Deserialize, Serialize};
use teamdex_core::MemberSpec;

/// Generic success response wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    /// Success flag.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T> SuccessResponse<T> {
    /// Create a new success response.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Gateway version.
    pub version: String,
    /// Whether sled recovered the database from an unclean shutdown.
    pub recovered: bool,
    /// Number of creatures in the catalog.
    pub creatures: usize,
}

/// Body of `POST /teams`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

/// Body of `PUT /teams/:name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTeamRequest {
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

/// Query string of `GET /creatures/:name/moves`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatureMovesQuery {
    /// Only return the move with this name.
    #[serde(default, rename = "move")]
    pub mv: Option<String>,
}
