use async_trait::async_trait;
use std::path::PathBuf;

use crate::account::Account;
use crate::repositories::AccountStore;
use relay_common::error::{RelayError, RelayResult};

/// Whole-file JSON store: a single document holding all connected accounts.
///
/// `save_account` rewrites the full file; last write wins, which matches the
/// idempotent-overwrite contract of the external store this stands in for.
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_all(&self) -> RelayResult<Vec<Account>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| RelayError::Store(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| RelayError::Store(format!("parse {}: {e}", self.path.display())))
    }

    async fn write_all(&self, accounts: &[Account]) -> RelayResult<()> {
        let raw = serde_json::to_string_pretty(accounts)
            .map_err(|e| RelayError::Store(format!("serialize accounts: {e}")))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| RelayError::Store(format!("write {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl AccountStore for JsonFileStore {
    async fn load_accounts(&self) -> RelayResult<Vec<Account>> {
        self.read_all().await
    }

    async fn save_account(&self, account: &Account) -> RelayResult<()> {
        let mut accounts = self.read_all().await?;
        match accounts.iter_mut().find(|a| a.hub_id == account.hub_id) {
            Some(existing) => *existing = account.clone(),
            None => {
                return Err(RelayError::NotFound(format!(
                    "account hub_id={} not present in store",
                    account.hub_id
                )))
            }
        }
        self.write_all(&accounts).await
    }
}
