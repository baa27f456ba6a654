use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use salesdoc_core::UserId;
use salesdoc_engine::{Capability, CapabilityChecker};

/// Capability checker backed by a static grant table.
///
/// An actor holding the wildcard capability `"*"` passes every check.
#[derive(Debug, Default)]
pub struct StaticCapabilityChecker {
    grants: RwLock<HashMap<UserId, HashSet<String>>>,
}

impl StaticCapabilityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, actor: UserId, capability: impl Into<String>) {
        if let Ok(mut grants) = self.grants.write() {
            grants.entry(actor).or_default().insert(capability.into());
        }
    }

    pub fn grant_all(&self, actor: UserId) {
        self.grant(actor, "*");
    }
}

impl CapabilityChecker for StaticCapabilityChecker {
    fn can_perform(&self, actor: UserId, capability: &Capability) -> bool {
        let Ok(grants) = self.grants.read() else {
            return false;
        };
        grants
            .get(&actor)
            .is_some_and(|set| set.contains("*") || set.contains(capability.as_str()))
    }
}
