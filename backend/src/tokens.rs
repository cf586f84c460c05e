//! File-backed storage for the OAuth token pair.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// OAuth2 credential record, in the shape Google's token endpoint returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenPair {
    /// Overlay `newer` on top of `self`: fields present in `newer` win,
    /// fields it leaves out keep their stored value.
    pub fn merged_with(&self, newer: &TokenPair) -> TokenPair {
        TokenPair {
            access_token: if newer.access_token.is_empty() {
                self.access_token.clone()
            } else {
                newer.access_token.clone()
            },
            refresh_token: newer
                .refresh_token
                .clone()
                .or_else(|| self.refresh_token.clone()),
            expiry_date: newer.expiry_date.or(self.expiry_date),
            scope: newer.scope.clone().or_else(|| self.scope.clone()),
            token_type: newer.token_type.clone().or_else(|| self.token_type.clone()),
            id_token: newer.id_token.clone().or_else(|| self.id_token.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the token pair, replacing whatever was stored before.
    pub async fn save(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        let json = serde_json::to_string_pretty(tokens)?;
        if let Err(e) = tokio::fs::write(&self.path, json).await {
            tracing::error!("Error saving tokens to {}: {}", self.path.display(), e);
            return Err(e.into());
        }
        tracing::info!("Tokens saved successfully");
        Ok(())
    }

    /// Load the stored token pair, `None` if nothing has been stored yet.
    pub async fn load(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Remove the stored token pair. Removing an absent record succeeds.
    pub async fn delete(&self) -> Result<(), TokenStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!("Tokens deleted successfully");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
