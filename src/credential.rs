// 🔑 Stored credentials
//
// New credentials are kept as a salted SHA-256 digest. Records written by
// older versions hold the plaintext password; those still verify, and the
// registry upgrades them to a digest after the next successful login.
//
// Persisted form: "sha256$<salt>$<hex digest>" or the legacy plaintext.

use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Hashed { salt: String, digest: String },
    Legacy(String),
}

impl Credential {
    /// Hash a new password under a fresh random salt
    pub fn new(password: &str) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let digest = digest(&salt, password);
        Credential::Hashed { salt, digest }
    }

    /// Parse the persisted credential field
    pub fn parse(stored: &str) -> Self {
        let mut parts = stored.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(SCHEME), Some(salt), Some(digest)) if !salt.is_empty() && is_hex(digest) => {
                Credential::Hashed {
                    salt: salt.to_string(),
                    digest: digest.to_string(),
                }
            }
            _ => Credential::Legacy(stored.to_string()),
        }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            Credential::Hashed { salt, digest: expected } => digest(salt, candidate) == *expected,
            Credential::Legacy(password) => password == candidate,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Credential::Legacy(_))
    }

    /// Value written to the accounts file
    pub fn to_stored(&self) -> String {
        match self {
            Credential::Hashed { salt, digest } => format!("{}${}${}", SCHEME, salt, digest),
            Credential::Legacy(password) => password.clone(),
        }
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}
