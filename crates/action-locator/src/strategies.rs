//! Strategy registry
//!
//! Decides whether a strategy may run on a platform and how a single node is
//! matched against a selector. Denials are request-level failures raised
//! before any traversal.

use droidlocate_core_types::Platform;
use tracing::debug;
use ui_snapshot::Node;

use crate::errors::LocatorError;
use crate::types::{Locator, LocatorStrategy, SelectorCode, SelectorGroup};

/// Outcome of a platform capability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Allowed,
    Denied(Denial),
}

/// Why a strategy is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The platform server does not implement the strategy
    NotImplemented,
}

/// Check whether `strategy` is available on `platform`
pub fn resolve_support(strategy: LocatorStrategy, platform: Platform) -> Support {
    let denied = match platform {
        Platform::Android => matches!(strategy, LocatorStrategy::IosUiAutomation),
        Platform::Ios => matches!(
            strategy,
            LocatorStrategy::IosUiAutomation | LocatorStrategy::ResourceId
        ),
    };
    if denied {
        Support::Denied(Denial::NotImplemented)
    } else {
        Support::Allowed
    }
}

/// Tags hidden from `tag name` lookups on a platform
pub fn restricted_categories(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Android => &["secure"],
        Platform::Ios => &[],
    }
}

/// Strategies the platform accepts, in registry order
pub fn supported_strategies(platform: Platform) -> Vec<LocatorStrategy> {
    LocatorStrategy::all()
        .into_iter()
        .filter(|strategy| resolve_support(*strategy, platform) == Support::Allowed)
        .collect()
}

/// Run every request-level check for a locator.
///
/// Order matters: an empty selector is rejected first, then the strategy,
/// then the restricted tag.
pub fn admit(locator: &Locator, platform: Platform) -> Result<(), LocatorError> {
    if locator.selector.trim().is_empty() {
        return Err(LocatorError::invalid_selector(format!(
            "selector for strategy '{}' must not be empty",
            locator.strategy
        )));
    }

    if let Support::Denied(reason) = resolve_support(locator.strategy, platform) {
        debug!(strategy = %locator.strategy, %platform, ?reason, "strategy denied");
        return Err(LocatorError::UnsupportedStrategy {
            strategy: locator.strategy.name().to_string(),
            platform,
        });
    }

    if locator.strategy == LocatorStrategy::TagName {
        let wanted = locator.selector.trim();
        if let Some(category) = restricted_categories(platform)
            .iter()
            .find(|category| category.eq_ignore_ascii_case(wanted))
        {
            return Err(LocatorError::RestrictedCategory {
                category: (*category).to_string(),
                platform,
            });
        }
    }

    Ok(())
}

/// Validate a `mobile: find` disjunction before searching
pub fn admit_groups(groups: &[SelectorGroup], platform: Platform) -> Result<(), LocatorError> {
    if groups.is_empty() || groups.iter().any(|group| group.conditions.is_empty()) {
        return Err(LocatorError::invalid_selector(
            "selector groups must not be empty",
        ));
    }
    for (code, value) in groups.iter().flat_map(|group| group.conditions.iter()) {
        if value.trim().is_empty() {
            return Err(LocatorError::invalid_selector(format!(
                "selector for code {} must not be empty",
                code.code()
            )));
        }
        if *code == SelectorCode::ResourceIdEquals {
            if let Support::Denied(_) = resolve_support(LocatorStrategy::ResourceId, platform) {
                return Err(LocatorError::UnsupportedStrategy {
                    strategy: LocatorStrategy::ResourceId.name().to_string(),
                    platform,
                });
            }
        }
        if *code == SelectorCode::TagEquals
            && restricted_categories(platform)
                .iter()
                .any(|category| category.eq_ignore_ascii_case(value.trim()))
        {
            return Err(LocatorError::RestrictedCategory {
                category: value.trim().to_string(),
                platform,
            });
        }
    }
    Ok(())
}

/// Exact attribute match for the non-XPath strategies
pub fn node_matches(node: &Node, strategy: LocatorStrategy, selector: &str) -> bool {
    match strategy {
        LocatorStrategy::TagName => node.tag == selector,
        LocatorStrategy::ClassName => node.class_name == selector,
        LocatorStrategy::ResourceId => resource_id_matches(node, selector),
        LocatorStrategy::Name | LocatorStrategy::AccessibilityId => {
            node.content_desc == selector
        }
        LocatorStrategy::XPath | LocatorStrategy::IosUiAutomation => false,
    }
}

/// Resource ids match exactly, or as `<package>:id/<selector>` when the
/// selector carries no package. The package is the node's app package or the
/// framework's `android`.
pub fn resource_id_matches(node: &Node, selector: &str) -> bool {
    if node.resource_id.is_empty() {
        return false;
    }
    if node.resource_id == selector {
        return true;
    }
    if selector.contains(":id/") {
        return false;
    }
    node.resource_id
        .split_once(":id/")
        .map(|(package, rest)| {
            rest == selector
                && (node.package.is_empty() || package == node.package || package == "android")
        })
        .unwrap_or(false)
}

pub fn condition_matches(node: &Node, code: SelectorCode, value: &str) -> bool {
    let text = node.logical_text();
    match code {
        SelectorCode::TextEquals => text == value,
        SelectorCode::TextStartsWith => text.starts_with(value),
        SelectorCode::TextContains => contains_ignore_case(text, value),
        SelectorCode::ClassEquals => node.class_name == value,
        SelectorCode::DescriptionEquals => node.content_desc == value,
        SelectorCode::DescriptionStartsWith => node.content_desc.starts_with(value),
        SelectorCode::DescriptionContains => contains_ignore_case(&node.content_desc, value),
        SelectorCode::ResourceIdEquals => resource_id_matches(node, value),
        SelectorCode::TagEquals => node.tag == value,
    }
}

pub fn group_matches(node: &Node, group: &SelectorGroup) -> bool {
    group
        .conditions
        .iter()
        .all(|(code, value)| condition_matches(node, *code, value))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
