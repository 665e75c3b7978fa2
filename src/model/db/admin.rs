use crate::error::Result;

/// The election administrator. There is exactly one, configured rather than
/// stored, so all that is known about them is their password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub password_hash: String,
}

/// Fixed identity carried in admin auth tokens.
pub const ADMIN_ID: &str = "admin";

impl Admin {
    pub fn new(password_hash: impl Into<String>) -> Self {
        Self {
            password_hash: password_hash.into(),
        }
    }

    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> Result<bool> {
        Ok(argon2::verify_encoded(
            &self.password_hash,
            password.as_ref(),
        )?)
    }
}


#[cfg(test)]
mod tests {
    use super::examples::EXAMPLE_ADMIN_PASSWORD;
    use super::*;

    #[test]
    fn password_check() {
        let admin = Admin::example();
        assert!(admin.verify_password(EXAMPLE_ADMIN_PASSWORD).unwrap());
        assert!(!admin.verify_password("wrong").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(Admin::new("not a hash").verify_password("anything").is_err());
    }
}
