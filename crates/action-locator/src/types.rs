//! Core types for the locator engine

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use droidlocate_core_types::{Platform, SnapshotGeneration};
use serde::{Deserialize, Serialize};
use ui_snapshot::{NodeId, ScrollDirection, UiSnapshot};

use crate::errors::LocatorError;

/// Locator strategy enumeration
///
/// Wire names are matched case-insensitively, with spaces, underscores and
/// dashes treated alike (`tag name`, `tag_name`, `tag-name`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorStrategy {
    /// Short tag name (`text`, `list`, ...)
    TagName,

    /// Fully qualified widget class
    ClassName,

    /// Resource id, with `<package>:id/` shorthand
    ResourceId,

    /// Content description
    Name,

    /// Content description, W3C naming
    AccessibilityId,

    /// XPath over the hierarchy
    XPath,

    /// UIAutomation script, iOS only
    IosUiAutomation,
}

impl LocatorStrategy {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::TagName => "tag name",
            LocatorStrategy::ClassName => "class name",
            LocatorStrategy::ResourceId => "id",
            LocatorStrategy::Name => "name",
            LocatorStrategy::AccessibilityId => "accessibility id",
            LocatorStrategy::XPath => "xpath",
            LocatorStrategy::IosUiAutomation => "-ios uiautomation",
        }
    }

    pub fn all() -> [LocatorStrategy; 7] {
        [
            LocatorStrategy::TagName,
            LocatorStrategy::ClassName,
            LocatorStrategy::ResourceId,
            LocatorStrategy::Name,
            LocatorStrategy::AccessibilityId,
            LocatorStrategy::XPath,
            LocatorStrategy::IosUiAutomation,
        ]
    }

    /// Parse a wire strategy name. Unknown names are refused the same way a
    /// platform refuses a known strategy.
    pub fn parse(raw: &str, platform: Platform) -> Result<Self, LocatorError> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '_' => '-',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        let strategy = match normalized.as_str() {
            "tag-name" => LocatorStrategy::TagName,
            "class-name" | "class" => LocatorStrategy::ClassName,
            "id" | "resource-id" => LocatorStrategy::ResourceId,
            "name" | "content-desc" => LocatorStrategy::Name,
            "accessibility-id" => LocatorStrategy::AccessibilityId,
            "xpath" => LocatorStrategy::XPath,
            "-ios-uiautomation" => LocatorStrategy::IosUiAutomation,
            _ => {
                return Err(LocatorError::UnsupportedStrategy {
                    strategy: raw.to_string(),
                    platform,
                })
            }
        };
        Ok(strategy)
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to a node of one specific snapshot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub generation: SnapshotGeneration,
    pub node: NodeId,
}

impl ElementRef {
    pub fn new(generation: SnapshotGeneration, node: NodeId) -> Self {
        Self { generation, node }
    }
}

/// A (strategy, selector, scope) request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub selector: String,
    pub scope: Option<ElementRef>,
}

impl Locator {
    pub fn new(strategy: LocatorStrategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
            scope: None,
        }
    }

    pub fn tag_name(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::TagName, selector)
    }

    pub fn class_name(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::ClassName, selector)
    }

    pub fn id(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::ResourceId, selector)
    }

    pub fn name(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Name, selector)
    }

    pub fn accessibility_id(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::AccessibilityId, selector)
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::XPath, selector)
    }

    /// Restrict resolution to the subtree rooted at `scope`
    pub fn within(mut self, scope: ElementRef) -> Self {
        self.scope = Some(scope);
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.strategy, self.selector)
    }
}

/// Ordered result of a resolution attempt, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    pub generation: SnapshotGeneration,
    pub nodes: Vec<NodeId>,
}

impl MatchSet {
    pub fn new(generation: SnapshotGeneration, nodes: Vec<NodeId>) -> Self {
        Self { generation, nodes }
    }

    pub fn empty(generation: SnapshotGeneration) -> Self {
        Self::new(generation, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<ElementRef> {
        self.nodes
            .first()
            .map(|node| ElementRef::new(self.generation, *node))
    }

    pub fn refs(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.nodes
            .iter()
            .map(|node| ElementRef::new(self.generation, *node))
    }
}

/// Numeric selector codes of the `mobile: find` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorCode {
    TextEquals,
    TextStartsWith,
    TextContains,
    ClassEquals,
    DescriptionEquals,
    DescriptionStartsWith,
    DescriptionContains,
    ResourceIdEquals,
    TagEquals,
}

impl SelectorCode {
    pub fn from_code(code: u64) -> Option<Self> {
        let code = match code {
            1 => SelectorCode::TextEquals,
            2 => SelectorCode::TextStartsWith,
            3 => SelectorCode::TextContains,
            4 => SelectorCode::ClassEquals,
            5 => SelectorCode::DescriptionEquals,
            6 => SelectorCode::DescriptionStartsWith,
            7 => SelectorCode::DescriptionContains,
            8 => SelectorCode::ResourceIdEquals,
            9 => SelectorCode::TagEquals,
            _ => return None,
        };
        Some(code)
    }

    pub fn code(&self) -> u64 {
        match self {
            SelectorCode::TextEquals => 1,
            SelectorCode::TextStartsWith => 2,
            SelectorCode::TextContains => 3,
            SelectorCode::ClassEquals => 4,
            SelectorCode::DescriptionEquals => 5,
            SelectorCode::DescriptionStartsWith => 6,
            SelectorCode::DescriptionContains => 7,
            SelectorCode::ResourceIdEquals => 8,
            SelectorCode::TagEquals => 9,
        }
    }
}

/// Conjunction of selector conditions that one node must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorGroup {
    pub conditions: Vec<(SelectorCode, String)>,
}

impl SelectorGroup {
    pub fn new(conditions: Vec<(SelectorCode, String)>) -> Self {
        Self { conditions }
    }

    pub fn single(code: SelectorCode, value: impl Into<String>) -> Self {
        Self::new(vec![(code, value.into())])
    }
}

/// What a search looks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// A regular locator
    Locator(Locator),

    /// First node matching any of the groups
    AnyOf(Vec<SelectorGroup>),
}

/// Where and how to scroll while searching
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrollSpec {
    pub direction: ScrollDirection,

    /// Scrollable container; defaults to the first scrollable node on screen
    pub container: Option<Locator>,
}

/// Bounds on the scroll-assisted search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollPolicy {
    /// Maximum number of scroll gestures per search
    pub max_attempts: usize,

    /// Time allowed for one gesture to be acknowledged
    pub gesture_timeout: Duration,

    /// Overall wall-clock budget, if any
    pub deadline: Option<Duration>,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            gesture_timeout: Duration::from_secs(5),
            deadline: None,
        }
    }
}

impl ScrollPolicy {
    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_gesture_timeout(mut self, timeout: Duration) -> Self {
        self.gesture_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Successful scroll-assisted search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub element: ElementRef,

    /// Hierarchy the element was matched in
    pub snapshot: Arc<UiSnapshot>,

    /// Gestures performed before the element appeared
    pub attempts: usize,
}
