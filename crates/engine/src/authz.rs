//! Capability-based authorization seam.
//!
//! The engine consumes authorization as an opaque boolean per
//! (actor, capability) pair; how capabilities are granted (roles, tokens,
//! policies) is the collaborator's business.

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use salesdoc_core::UserId;
use salesdoc_documents::{DocumentAction, DocumentKind};

/// Capability identifier.
///
/// Capabilities are modeled as opaque `module.action` strings (e.g.
/// "quotes.send", "orders.fulfill"). A special wildcard capability `"*"`
/// can be used by policy layers to indicate "allow all" without hardcoding
/// the capability set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(Cow<'static, str>);

impl Capability {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability gating `action` on documents of `kind`.
pub fn capability_for(kind: DocumentKind, action: DocumentAction) -> Capability {
    Capability::new(format!("{}.{}", kind.module_name(), action))
}

/// Authorization collaborator.
pub trait CapabilityChecker: Send + Sync {
    fn can_perform(&self, actor: UserId, capability: &Capability) -> bool;
}

impl<C> CapabilityChecker for Arc<C>
where
    C: CapabilityChecker + ?Sized,
{
    fn can_perform(&self, actor: UserId, capability: &Capability) -> bool {
        (**self).can_perform(actor, capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_names_follow_module_action_convention() {
        assert_eq!(
            capability_for(DocumentKind::Quote, DocumentAction::Send).as_str(),
            "quotes.send"
        );
        assert_eq!(
            capability_for(DocumentKind::Order, DocumentAction::Fulfill).as_str(),
            "orders.fulfill"
        );
    }

    #[test]
    fn wildcard_is_recognized() {
        assert!(Capability::new("*").is_wildcard());
        assert!(!Capability::new("quotes.read").is_wildcard());
    }
}
