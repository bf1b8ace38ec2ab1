//! Bearer token storage (encrypted file)
//!
//! The API token is kept AES-256-GCM encrypted in ~/.config/roost/credentials.enc.
//! The key is derived from machine-specific identifiers, so the file is useless
//! when copied elsewhere. Obtaining the token is up to the user.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

const NONCE_SIZE: usize = 12;

/// Decrypted credential file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    saved_at: DateTime<Utc>,
}

/// Encrypted on-disk token store
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at the default location
    pub fn open() -> Result<Self> {
        Ok(Self::at(paths::credentials_path()?))
    }

    /// Store at a specific path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the encrypted token lives
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save a bearer token, replacing any previous one
    pub fn store_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(anyhow!("Refusing to store an empty token"));
        }

        let stored = StoredToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_vec(&stored)?;

        let cipher = cipher()?;
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill(&mut nonce_bytes);
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), json.as_slice())
            .map_err(|_| anyhow!("Failed to encrypt token"))?;

        let mut output = nonce_bytes.to_vec();
        output.extend(ciphertext);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create credentials directory")?;
        }
        fs::write(&self.path, output).context("Failed to write credentials file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    /// Load the bearer token, if one was stored
    pub fn get_token(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let encrypted = fs::read(&self.path).context("Failed to read credentials file")?;
        if encrypted.len() < NONCE_SIZE {
            return Ok(None);
        }

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
        let plaintext = cipher()?
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| anyhow!("Failed to decrypt credentials"))?;

        let stored: StoredToken =
            serde_json::from_slice(&plaintext).context("Invalid credentials payload")?;
        Ok(Some(stored.token).filter(|t| !t.is_empty()))
    }

    /// Forget the stored token
    pub fn delete_token(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to delete credentials file")?;
        }
        Ok(())
    }

    /// Whether a readable token exists
    pub fn has_token(&self) -> bool {
        self.get_token().map(|t| t.is_some()).unwrap_or(false)
    }
}

fn cipher() -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(&derive_key()).map_err(|_| anyhow!("Invalid key length"))
}

/// Machine identifier used as key material
fn machine_id() -> String {
    #[cfg(target_os = "linux")]
    {
        for candidate in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(id) = fs::read_to_string(candidate) {
                let id = id.trim();
                if !id.is_empty() {
                    return id.to_string();
                }
            }
        }
    }

    dirs::home_dir().map_or_else(
        || "roost-fallback-key".to_string(),
        |p| p.to_string_lossy().to_string(),
    )
}

fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(machine_id().as_bytes());
    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }
    hasher.update(b"roost-follower-tracker-v1");
    hasher.finalize().into()
}
