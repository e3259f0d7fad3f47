//! Nullable fee ledger: programmable standing, recorded exemption resets.

use guild_gateway::{CollaboratorError, FeeLedger};
use guild_types::{MemberId, Timestamp};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Every member is in good standing unless marked delinquent.
#[derive(Clone, Default)]
pub struct NullFeeLedger {
    delinquent: Arc<Mutex<HashSet<MemberId>>>,
    resets: Arc<Mutex<Vec<MemberId>>>,
}

impl NullFeeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a member as behind on fees (or clear the mark).
    pub fn set_delinquent(&self, member: MemberId, delinquent: bool) {
        let mut set = self.delinquent.lock().unwrap();
        if delinquent {
            set.insert(member);
        } else {
            set.remove(&member);
        }
    }

    pub fn resets(&self) -> Vec<MemberId> {
        self.resets.lock().unwrap().clone()
    }
}

impl FeeLedger for NullFeeLedger {
    fn reset_exemption(&mut self, member: MemberId, _now: Timestamp) -> Result<(), CollaboratorError> {
        self.resets.lock().unwrap().push(member);
        Ok(())
    }

    fn in_good_standing(&self, member: MemberId, _now: Timestamp) -> bool {
        !self.delinquent.lock().unwrap().contains(&member)
    }
}
