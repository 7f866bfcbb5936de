//! The response body sent when an update or delete succeeds.

use axum::Json;
use serde::{Deserialize, Serialize};

/// The JSON body `{ "success": true }`.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Success {
    /// Always `true` when sent by the server.
    pub success: bool,
}

impl Success {
    /// Wrap a successful result as a JSON response body.
    pub fn json() -> Json<Self> {
        Json(Self { success: true })
    }
}
