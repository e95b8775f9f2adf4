use std::collections::{BTreeMap, BTreeSet};

use accrue_core::interfaces::{Authorizer, Capability};
use accrue_core::types::AccountId;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Capability gate: admins hold every capability, other accounts hold
/// individually granted ones.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleGate {
    admins: BTreeSet<AccountId>,
    grants: BTreeMap<AccountId, BTreeSet<Capability>>,
}

impl RoleGate {
    pub fn with_admins(admins: impl IntoIterator<Item = AccountId>) -> Self {
        Self { admins: admins.into_iter().collect(), grants: BTreeMap::new() }
    }

    pub fn is_admin(&self, account: &AccountId) -> bool {
        self.admins.contains(account)
    }

    pub fn grant(&mut self, account: &AccountId, capability: Capability) {
        self.grants.entry(*account).or_default().insert(capability);
        info!(account = %account, ?capability, "capability granted");
    }

    pub fn revoke(&mut self, account: &AccountId, capability: Capability) {
        if let Some(set) = self.grants.get_mut(account) {
            set.remove(&capability);
            if set.is_empty() {
                self.grants.remove(account);
            }
        }
    }
}

impl Authorizer for RoleGate {
    fn has_capability(&self, caller: &AccountId, capability: Capability) -> bool {
        self.admins.contains(caller)
            || self.grants.get(caller).is_some_and(|set| set.contains(&capability))
    }
}
