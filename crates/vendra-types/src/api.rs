use serde::{Deserialize, Serialize};

use crate::models::WaitlistEntry;

// -- Waitlist --

#[derive(Debug, Deserialize)]
pub struct JoinWaitlistRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct JoinWaitlistResponse {
    pub success: bool,
    pub entry: WaitlistEntry,
    pub position: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WaitlistCountResponse {
    pub count: u64,
}

// -- Errors --

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
