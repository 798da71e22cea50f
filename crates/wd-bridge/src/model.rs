use action_locator::{FindFailure, STATUS_SUCCESS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Key under which element handles travel on the wire
pub const ELEMENT_KEY: &str = "ELEMENT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FindElementRequest {
    pub using: String,
    pub value: String,
}

impl FindElementRequest {
    pub fn new(using: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            using: using.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteRequest {
    pub script: String,
    #[serde(default)]
    pub args: Value,
}

/// `{"status": n, "value": ...}` envelope returned by every command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireResponse {
    pub status: u32,
    pub value: Value,
}

impl WireResponse {
    pub fn success(value: Value) -> Self {
        Self {
            status: STATUS_SUCCESS,
            value,
        }
    }

    pub fn failure(failure: &FindFailure) -> Self {
        Self {
            status: failure.status,
            value: json!({ "message": failure.message }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Failure message, if this is a failure
    pub fn message(&self) -> Option<&str> {
        if self.is_success() {
            return None;
        }
        self.value.get("message").and_then(Value::as_str)
    }

    /// Handle of a single-element success value
    pub fn element(&self) -> Option<&str> {
        self.value.get(ELEMENT_KEY).and_then(Value::as_str)
    }

    /// Handles of a plural success value
    pub fn elements(&self) -> Vec<&str> {
        self.value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(ELEMENT_KEY).and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub fn element_value(handle: &str) -> Value {
    json!({ ELEMENT_KEY: handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::{FailureKind, FindFailure};

    #[test]
    fn failure_envelope_carries_status_and_message() {
        let response = WireResponse::failure(&FindFailure::new(FailureKind::NoSuchElement, "gone"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "status": 7, "value": { "message": "gone" } })
        );
        assert_eq!(response.message(), Some("gone"));
    }

    #[test]
    fn element_values_are_keyed() {
        let single = WireResponse::success(element_value("element-1"));
        assert_eq!(single.element(), Some("element-1"));

        let plural = WireResponse::success(json!([element_value("element-1"), element_value("element-2")]));
        assert_eq!(plural.elements(), ["element-1", "element-2"]);
        assert!(plural.message().is_none());
    }
}
