mod authenticator;
mod request;
mod token;
mod user;

pub use authenticator::{Authenticator, RollNumberAuthenticator};
pub use request::{AdminLoginRequest, VoterLoginRequest};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
pub use user::{Rights, User};
