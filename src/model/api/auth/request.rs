use serde::{Deserialize, Serialize};

/// A voter identifying themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterLoginRequest {
    pub roll_number: String,
}

/// The administrator logging in.
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}
