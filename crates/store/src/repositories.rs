use async_trait::async_trait;

use crate::account::Account;
use relay_common::error::RelayResult;

/// Boundary to the external account document store.
///
/// Checkpoint advancement and token rotation go through `save_account`,
/// which is assumed to have idempotent overwrite semantics.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Load every connected account.
    async fn load_accounts(&self) -> RelayResult<Vec<Account>>;

    /// Persist a mutated account (lastPulledDates, possibly rotated token).
    async fn save_account(&self, account: &Account) -> RelayResult<()>;
}
