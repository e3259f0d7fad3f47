//! Nullable treasury: records forwarded transfers instead of moving funds.

use guild_gateway::{CollaboratorError, Treasury};
use guild_types::{ErrorKind, Identity, Timestamp, TokenId};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub token: TokenId,
    pub recipient: Identity,
    pub amount: u128,
    pub at: Timestamp,
}

/// An in-memory treasury for testing.
///
/// Clone the handle returned by [`NullTreasury::transfers`] before boxing the
/// treasury into a gateway to inspect forwarded transfers afterwards.
pub struct NullTreasury {
    transfers: Arc<Mutex<Vec<TransferRecord>>>,
    /// Transfers above this amount fail with `QuotaExceeded`.
    limit: Option<u128>,
}

impl NullTreasury {
    pub fn new() -> Self {
        Self {
            transfers: Arc::new(Mutex::new(Vec::new())),
            limit: None,
        }
    }

    /// A treasury that refuses any single transfer above `limit`.
    pub fn with_limit(limit: u128) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    pub fn transfers(&self) -> Arc<Mutex<Vec<TransferRecord>>> {
        Arc::clone(&self.transfers)
    }
}

impl Default for NullTreasury {
    fn default() -> Self {
        Self::new()
    }
}

impl Treasury for NullTreasury {
    fn transfer(
        &mut self,
        token: &TokenId,
        recipient: &Identity,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), CollaboratorError> {
        if self.limit.is_some_and(|limit| amount > limit) {
            return Err(CollaboratorError::new(
                ErrorKind::QuotaExceeded,
                format!("transfer of {amount} exceeds period limit"),
            ));
        }
        self.transfers.lock().unwrap().push(TransferRecord {
            token: token.clone(),
            recipient: recipient.clone(),
            amount,
            at: now,
        });
        Ok(())
    }
}
