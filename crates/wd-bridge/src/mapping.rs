use action_locator::{Locator, LocatorError, LocatorStrategy, SelectorCode, SelectorGroup};
use droidlocate_core_types::Platform;
use serde_json::Value;
use ui_snapshot::ScrollDirection;

use crate::model::FindElementRequest;

pub const SCROLL_FORWARD_MARKER: &str = "scroll";
pub const SCROLL_BACKWARD_MARKER: &str = "scroll-backward";

/// Decoded `mobile: find` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileFind {
    /// Set when the request asks for a scroll-assisted search
    pub scroll: Option<ScrollDirection>,
    pub groups: Vec<SelectorGroup>,
}

pub fn to_locator(req: &FindElementRequest, platform: Platform) -> Result<Locator, LocatorError> {
    let strategy = LocatorStrategy::parse(&req.using, platform)?;
    Ok(Locator::new(strategy, req.value.clone()))
}

/// Decode `[[marker?, group, group, ...]]` where each group is a list of
/// `[code, value]` pairs.
pub fn decode_mobile_find(args: &Value) -> Result<MobileFind, LocatorError> {
    let outer = args
        .as_array()
        .ok_or_else(|| malformed("arguments must be a list"))?;
    let items = match outer.as_slice() {
        [Value::Array(items)] => items,
        _ => return Err(malformed("arguments must be a single nested list")),
    };

    let (scroll, rest) = match items.split_first() {
        Some((Value::String(marker), rest)) => (Some(direction(marker)?), rest),
        _ => (None, items.as_slice()),
    };
    if rest.is_empty() {
        return Err(malformed("at least one selector group is required"));
    }

    let groups = rest.iter().map(group).collect::<Result<Vec<_>, _>>()?;
    Ok(MobileFind { scroll, groups })
}

fn direction(marker: &str) -> Result<ScrollDirection, LocatorError> {
    match marker {
        SCROLL_FORWARD_MARKER => Ok(ScrollDirection::Forward),
        SCROLL_BACKWARD_MARKER => Ok(ScrollDirection::Backward),
        other => Err(malformed(format!("unknown direction marker '{other}'"))),
    }
}

fn group(value: &Value) -> Result<SelectorGroup, LocatorError> {
    let pairs = value
        .as_array()
        .ok_or_else(|| malformed("selector group must be a list of [code, value] pairs"))?;
    if pairs.is_empty() {
        return Err(malformed("selector group must not be empty"));
    }
    let conditions = pairs
        .iter()
        .map(|pair| -> Result<(SelectorCode, String), LocatorError> {
            match pair.as_array().map(Vec::as_slice) {
                Some([code, Value::String(selector)]) => {
                    let code = code
                        .as_u64()
                        .and_then(SelectorCode::from_code)
                        .ok_or_else(|| malformed(format!("unknown selector code {code}")))?;
                    Ok((code, selector.clone()))
                }
                _ => Err(malformed(format!("expected a [code, value] pair, got {pair}"))),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SelectorGroup::new(conditions))
}

fn malformed(reason: impl Into<String>) -> LocatorError {
    LocatorError::invalid_selector(format!("mobile: find selector is malformed: {}", reason.into()))
}

/// Human-readable form of a selector disjunction, for messages
pub fn describe_groups(groups: &[SelectorGroup]) -> String {
    groups
        .iter()
        .map(|group| {
            group
                .conditions
                .iter()
                .map(|(code, value)| format!("{}={value:?}", code.code()))
                .collect::<Vec<_>>()
                .join(" & ")
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
