use crate::model::{Id, user::UserMarker};
use argon2::{
    Argon2, Params,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_STANDARD};
use std::{
    fmt::{Debug, Formatter},
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;
use time::UtcDateTime;

pub const SESSION_TOKEN_CORE_LEN: usize = 24;
pub const SESSION_TOKEN_SALT_LEN: usize = 18;
pub const SESSION_TOKEN_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

/// Length of the cookie-signing key material derived from `SECRET_KEY`.
pub const SIGNING_KEY_LEN: usize = 64;

const SIGNING_KEY_SALT: &[u8] = b"federwerk-cookie-signing";

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing session token failed: {0}")]
pub struct SessionTokenHashError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum SessionTokenDecodeError {
    #[error("Not enough parts separated by ':'")]
    NotEnoughParts,
    #[error("Invalid user id: {0}")]
    InvalidUserId(ParseIntError),
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the core part is incorrect")]
    InvalidCoreLength,
    #[error("The length of the salt part is incorrect")]
    InvalidSaltLength,
}

/// Random credential carried in the session cookie. Only its hash ever
/// reaches the database.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionToken {
    pub user_id: Id<UserMarker>,
    pub core: [u8; SESSION_TOKEN_CORE_LEN],
    pub salt: [u8; SESSION_TOKEN_SALT_LEN],
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionTokenHash(pub Box<[u8; SESSION_TOKEN_HASH_LEN]>);

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Session {
    pub user: Id<UserMarker>,
    pub token_hash: SessionTokenHash,
    pub created_at: UtcDateTime,
}

impl SessionToken {
    #[must_use]
    pub fn generate_random(user_id: Id<UserMarker>) -> Self {
        let core = rand::random();
        let salt = rand::random();

        Self {
            user_id,
            core,
            salt,
        }
    }

    #[must_use]
    pub fn as_cookie_value(&self) -> String {
        let user_id = self.user_id;
        let encoded_core = Base64Display::new(&self.core, &BASE64_STANDARD);
        let encoded_salt = Base64Display::new(&self.salt, &BASE64_STANDARD);

        format!("{user_id}:{encoded_core}:{encoded_salt}")
    }

    pub fn hash(&self) -> Result<SessionTokenHash, SessionTokenHashError> {
        let argon2 = Argon2::default();

        let mut hash = Box::new([0; SESSION_TOKEN_HASH_LEN]);
        argon2
            .hash_password_into(&self.core, &self.salt, &mut *hash)
            .map_err(SessionTokenHashError)?;

        Ok(SessionTokenHash(hash))
    }
}

impl FromStr for SessionToken {
    type Err = SessionTokenDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');

        let user_id_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let core_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let salt_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;

        let user_id = i64::from_str(user_id_part)
            .map_err(Self::Err::InvalidUserId)?
            .into();
        let core = BASE64_STANDARD
            .decode(core_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidCoreLength)?;
        let salt = BASE64_STANDARD
            .decode(salt_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSaltLength)?;

        Ok(Self {
            user_id,
            core,
            salt,
        })
    }
}

impl SessionTokenHash {
    /// Base64 form as stored in the `sessions` table.
    #[must_use]
    pub fn encoded(&self) -> String {
        BASE64_STANDARD.encode(&*self.0)
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The session token hash is invalid")]
pub struct InvalidSessionTokenHashError;

impl FromStr for SessionTokenHash {
    type Err = InvalidSessionTokenHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = BASE64_STANDARD
            .decode(s)
            .map_err(|_| InvalidSessionTokenHashError)?;
        let hash: Box<[u8; SESSION_TOKEN_HASH_LEN]> = bytes
            .into_boxed_slice()
            .try_into()
            .map_err(|_| InvalidSessionTokenHashError)?;

        Ok(Self(hash))
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("user_id", &self.user_id)
            .field("core", &"[redacted]")
            .field("salt", &"[redacted]")
            .finish()
    }
}

impl Debug for SessionTokenHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionTokenHash")
            .field(&"[redacted]")
            .finish()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing password failed: {0}")]
pub struct PasswordHashError(argon2::password_hash::Error);

/// Argon2 PHC-string password hash, as stored in the `users` table.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn hash(password: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(PasswordHashError)
    }

    pub fn verify(&self, password: &str) -> Result<bool, PasswordHashError> {
        let parsed = argon2::password_hash::PasswordHash::new(&self.0).map_err(PasswordHashError)?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Wraps a hash read back from the database.
    #[must_use]
    pub fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for HashedPassword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HashedPassword").field(&"[redacted]").finish()
    }
}

/// Stretches `SECRET_KEY` into full-length cookie-signing key material,
/// so short secrets still yield a usable key.
pub fn derive_signing_material(
    secret: &str,
) -> Result<[u8; SIGNING_KEY_LEN], SessionTokenHashError> {
    let mut out = [0; SIGNING_KEY_LEN];
    Argon2::default()
        .hash_password_into(secret.as_bytes(), SIGNING_KEY_SALT, &mut out)
        .map_err(SessionTokenHashError)?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_survives_cookie_round_trip() {
        let token = SessionToken::generate_random(Id::new(7));
        let parsed: SessionToken = token.as_cookie_value().parse().unwrap();

        assert_eq!(parsed, token);
    }

    #[test]
    fn token_hash_is_deterministic_and_encodable() {
        let token = SessionToken::generate_random(Id::new(1));

        let hash = token.hash().unwrap();
        assert_eq!(token.hash().unwrap(), hash);

        let decoded: SessionTokenHash = hash.encoded().parse().unwrap();
        assert_eq!(decoded, hash);
    }

    #[test]
    fn truncated_cookie_value_is_rejected() {
        assert!(SessionToken::from_str("1:aGk=").is_err());
        assert!(SessionToken::from_str("one:aGk=:aGk=").is_err());
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = HashedPassword::hash("secret1").unwrap();

        assert!(hash.verify("secret1").unwrap());
        assert!(!hash.verify("secret2").unwrap());
    }

    #[test]
    fn signing_material_is_stable_per_secret() {
        let a = derive_signing_material("12345").unwrap();
        let b = derive_signing_material("12345").unwrap();
        let c = derive_signing_material("54321").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
