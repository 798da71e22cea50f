use std::sync::Arc;

use action_locator::ScrollPolicy;
use droidlocate_core_types::Platform;
use parking_lot::RwLock;

/// Runtime settings the bridge reads on every command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgePolicy {
    pub platform: Platform,
    pub scroll: ScrollPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct BridgePolicyHandle {
    inner: Arc<RwLock<BridgePolicy>>,
}

impl BridgePolicyHandle {
    pub fn new(policy: BridgePolicy) -> Self {
        Self {
            inner: Arc::new(RwLock::new(policy)),
        }
    }

    pub fn snapshot(&self) -> BridgePolicy {
        self.inner.read().clone()
    }

    pub fn update(&self, policy: BridgePolicy) {
        *self.inner.write() = policy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_are_visible_to_clones() {
        let handle = BridgePolicyHandle::default();
        let other = handle.clone();
        handle.update(BridgePolicy {
            platform: Platform::Ios,
            scroll: ScrollPolicy::default().with_max_attempts(3),
        });
        let seen = other.snapshot();
        assert_eq!(seen.platform, Platform::Ios);
        assert_eq!(seen.scroll.max_attempts, 3);
    }
}
