use crate::error::{Error, Result};

use super::VoterLoginRequest;

/// Decides who may vote, turning login credentials into a voter ID.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, request: &VoterLoginRequest) -> Result<String>;
}

/// Accepts any roll number of the configured length, made only of ASCII digits.
/// The roll number itself becomes the voter ID.
#[derive(Debug, Clone, Copy)]
pub struct RollNumberAuthenticator {
    digits: usize,
}

impl RollNumberAuthenticator {
    pub fn new(digits: usize) -> Self {
        Self { digits }
    }
}

impl Authenticator for RollNumberAuthenticator {
    fn authenticate(&self, request: &VoterLoginRequest) -> Result<String> {
        let roll_number = request.roll_number.trim();
        if roll_number.len() == self.digits && roll_number.bytes().all(|b| b.is_ascii_digit()) {
            Ok(roll_number.to_string())
        } else {
            Err(Error::unauthorized(format!(
                "roll number must be exactly {} digits",
                self.digits
            )))
        }
    }
}
