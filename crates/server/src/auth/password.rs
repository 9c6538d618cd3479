use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Outcome of checking a password against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Valid,
    /// Correct password stored under a legacy bcrypt hash.
    ValidNeedsRehash,
    Invalid,
}

impl PasswordCheck {
    pub fn is_valid(self) -> bool {
        !matches!(self, PasswordCheck::Invalid)
    }
}

/// Hash a password with argon2id.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against an argon2 hash or a migrated bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<PasswordCheck, String> {
    if hash.starts_with("$argon2") {
        let parsed = PasswordHash::new(hash).map_err(|e| e.to_string())?;
        let ok = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        Ok(if ok { PasswordCheck::Valid } else { PasswordCheck::Invalid })
    } else if hash.starts_with("$2b$") || hash.starts_with("$2a$") || hash.starts_with("$2y$") {
        let ok = bcrypt::verify(password, hash).unwrap_or(false);
        Ok(if ok { PasswordCheck::ValidNeedsRehash } else { PasswordCheck::Invalid })
    } else {
        Err("Unknown hash format".to_string())
    }
}
