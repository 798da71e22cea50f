//! Single/plural element resolution over one snapshot

use droidlocate_core_types::Platform;
use tracing::debug;
use ui_snapshot::{NodeId, UiSnapshot};

use crate::errors::LocatorError;
use crate::strategies::{admit, admit_groups, group_matches, node_matches};
use crate::types::*;
use crate::xpath;

/// Element resolver trait
///
/// Resolution is synchronous and stateless: every call works on the snapshot
/// it is handed and nothing else.
pub trait ElementResolver: Send + Sync {
    /// Platform whose capability rules apply
    fn platform(&self) -> Platform;

    /// Resolve a locator. Singular lookups fail with `NotFound` on zero
    /// matches; plural lookups return a possibly empty set.
    fn find(
        &self,
        snapshot: &UiSnapshot,
        locator: &Locator,
        plural: bool,
    ) -> Result<MatchSet, LocatorError>;

    /// Resolve a disjunction of selector groups
    fn find_any(
        &self,
        snapshot: &UiSnapshot,
        groups: &[SelectorGroup],
        scope: Option<ElementRef>,
    ) -> Result<MatchSet, LocatorError>;

    /// First match of a search target, `None` when nothing matches. Denials
    /// are still errors.
    fn first_match(
        &self,
        snapshot: &UiSnapshot,
        target: &SearchTarget,
    ) -> Result<Option<ElementRef>, LocatorError> {
        let set = match target {
            SearchTarget::Locator(locator) => self.find(snapshot, locator, true)?,
            SearchTarget::AnyOf(groups) => self.find_any(snapshot, groups, None)?,
        };
        Ok(set.first())
    }
}

/// Default resolver implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct LocatorEngine {
    platform: Platform,
}

impl LocatorEngine {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Singular lookup
    pub fn find_one(
        &self,
        snapshot: &UiSnapshot,
        locator: &Locator,
    ) -> Result<ElementRef, LocatorError> {
        let set = self.find(snapshot, locator, false)?;
        set.first().ok_or_else(|| not_found(locator))
    }

    /// Plural lookup
    pub fn find_all(
        &self,
        snapshot: &UiSnapshot,
        locator: &Locator,
    ) -> Result<MatchSet, LocatorError> {
        self.find(snapshot, locator, true)
    }

    fn traverse(
        &self,
        snapshot: &UiSnapshot,
        locator: &Locator,
        root: Option<NodeId>,
    ) -> Result<Vec<NodeId>, LocatorError> {
        match locator.strategy {
            LocatorStrategy::XPath => xpath::evaluate(snapshot, &locator.selector, root),
            LocatorStrategy::IosUiAutomation => Err(LocatorError::UnsupportedStrategy {
                strategy: locator.strategy.name().to_string(),
                platform: self.platform,
            }),
            strategy => {
                let root = root.unwrap_or_else(|| snapshot.root());
                Ok(snapshot
                    .subtree(root)
                    .filter(|id| node_matches(snapshot.get(*id), strategy, &locator.selector))
                    .collect())
            }
        }
    }
}

impl ElementResolver for LocatorEngine {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn find(
        &self,
        snapshot: &UiSnapshot,
        locator: &Locator,
        plural: bool,
    ) -> Result<MatchSet, LocatorError> {
        admit(locator, self.platform)?;
        let root = check_scope(snapshot, locator.scope)?;

        let nodes = self.traverse(snapshot, locator, root)?;
        debug!(
            strategy = %locator.strategy,
            selector = %locator.selector,
            scoped = root.is_some(),
            plural,
            matches = nodes.len(),
            generation = %snapshot.generation(),
            "resolved locator"
        );

        if plural {
            return Ok(MatchSet::new(snapshot.generation(), nodes));
        }
        match nodes.first() {
            Some(first) => Ok(MatchSet::new(snapshot.generation(), vec![*first])),
            None => Err(not_found(locator)),
        }
    }

    fn find_any(
        &self,
        snapshot: &UiSnapshot,
        groups: &[SelectorGroup],
        scope: Option<ElementRef>,
    ) -> Result<MatchSet, LocatorError> {
        admit_groups(groups, self.platform)?;
        let root = check_scope(snapshot, scope)?.unwrap_or_else(|| snapshot.root());

        let nodes: Vec<NodeId> = snapshot
            .subtree(root)
            .filter(|id| {
                let node = snapshot.get(*id);
                groups.iter().any(|group| group_matches(node, group))
            })
            .collect();
        debug!(
            groups = groups.len(),
            matches = nodes.len(),
            generation = %snapshot.generation(),
            "resolved selector groups"
        );
        Ok(MatchSet::new(snapshot.generation(), nodes))
    }
}

/// A scope must come from the snapshot being searched
fn check_scope(
    snapshot: &UiSnapshot,
    scope: Option<ElementRef>,
) -> Result<Option<NodeId>, LocatorError> {
    let Some(scope) = scope else {
        return Ok(None);
    };
    if scope.generation != snapshot.generation() || !snapshot.contains(scope.node) {
        return Err(LocatorError::StaleElement {
            held: scope.generation,
            current: snapshot.generation(),
        });
    }
    Ok(Some(scope.node))
}

fn not_found(locator: &Locator) -> LocatorError {
    LocatorError::NotFound {
        strategy: locator.strategy.name().to_string(),
        selector: locator.selector.clone(),
    }
}
