//! Credential hashing configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Optional server-side pepper prepended to passwords before hashing.
    pub pepper: Option<String>,
    pub min_password_length: usize,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 8,
        }
    }
}

impl CredentialConfig {
    pub fn pepper(&self) -> Option<&str> {
        self.pepper.as_deref()
    }
}
