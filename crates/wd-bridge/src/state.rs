use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use action_locator::ElementRef;
use droidlocate_core_types::SessionId;
use parking_lot::RwLock;
use tracing::debug;
use ui_snapshot::Node;

/// What the bridge remembers about an issued handle. Attributes are captured
/// from the snapshot the element was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementModel {
    pub session_id: SessionId,
    pub element: ElementRef,
    pub using: String,
    pub value: String,
    pub text: String,
    pub attributes: HashMap<String, String>,
}

impl ElementModel {
    pub fn capture(
        session_id: SessionId,
        element: ElementRef,
        using: &str,
        value: &str,
        node: &Node,
    ) -> Self {
        let attributes = [
            ("text", node.text.clone()),
            ("name", node.content_desc.clone()),
            ("contentDescription", node.content_desc.clone()),
            ("resourceId", node.resource_id.clone()),
            ("className", node.class_name.clone()),
            ("tagName", node.tag.clone()),
            ("packageName", node.package.clone()),
            ("bounds", node.bounds.to_string()),
            ("scrollable", node.scrollable.to_string()),
            ("password", node.password.to_string()),
            ("index", node.index.to_string()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
        Self {
            session_id,
            element,
            using: using.to_string(),
            value: value.to_string(),
            text: node.logical_text().to_string(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Handles kept before the oldest are evicted
pub const DEFAULT_ELEMENT_CAPACITY: usize = 4096;

#[derive(Debug, Default)]
struct ElementTable {
    entries: HashMap<String, ElementModel>,
    order: VecDeque<String>,
}

/// Handle table shared by all commands. Bounded: once `capacity` handles are
/// live, each allocation evicts the oldest one.
#[derive(Debug)]
pub struct ElementStore {
    elements: RwLock<ElementTable>,
    next_element_id: AtomicU64,
    capacity: usize,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ELEMENT_CAPACITY)
    }
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: RwLock::new(ElementTable::default()),
            next_element_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    pub fn allocate_element(&self, model: ElementModel) -> String {
        let element_id = format!(
            "element-{}",
            self.next_element_id.fetch_add(1, Ordering::SeqCst)
        );
        let mut table = self.elements.write();
        while table.order.len() >= self.capacity {
            let Some(oldest) = table.order.pop_front() else {
                break;
            };
            table.entries.remove(&oldest);
            debug!(element = %oldest, "evicted element handle");
        }
        table.order.push_back(element_id.clone());
        table.entries.insert(element_id.clone(), model);
        element_id
    }

    /// Entry for `element_id` if it was issued to `session_id`
    pub fn element_entry(&self, session_id: &SessionId, element_id: &str) -> Option<ElementModel> {
        self.elements
            .read()
            .entries
            .get(element_id)
            .filter(|entry| entry.session_id == *session_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.elements.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.read().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidlocate_core_types::SnapshotGeneration;
    use ui_snapshot::{NodeId, NodeSpec, UiSnapshot};

    fn model(session: &SessionId) -> ElementModel {
        let spec = NodeSpec::new("android.widget.TextView")
            .desc("Graphics")
            .id("android:id/text1");
        let snapshot = UiSnapshot::from_spec(&spec, SnapshotGeneration(1)).unwrap();
        let element = ElementRef::new(snapshot.generation(), NodeId(0));
        ElementModel::capture(session.clone(), element, "name", "Graphics", snapshot.get(NodeId(0)))
    }

    #[test]
    fn handles_are_sequential_and_session_bound() {
        let store = ElementStore::new();
        let session = SessionId::from("s-1");
        let first = store.allocate_element(model(&session));
        let second = store.allocate_element(model(&session));
        assert_eq!(first, "element-1");
        assert_eq!(second, "element-2");

        assert!(store.element_entry(&session, &first).is_some());
        assert!(store.element_entry(&SessionId::from("s-2"), &first).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn oldest_handles_are_evicted_at_capacity() {
        let store = ElementStore::with_capacity(3);
        let session = SessionId::from("s-1");
        let handles: Vec<_> = (0..5)
            .map(|_| store.allocate_element(model(&session)))
            .collect();

        assert_eq!(store.len(), 3);
        assert!(store.element_entry(&session, &handles[0]).is_none());
        assert!(store.element_entry(&session, &handles[1]).is_none());
        for handle in &handles[2..] {
            assert!(store.element_entry(&session, handle).is_some());
        }
    }

    #[test]
    fn captured_text_falls_back_to_description() {
        let entry = model(&SessionId::from("s-1"));
        assert_eq!(entry.text, "Graphics");
        assert_eq!(entry.attribute("resourceId"), Some("android:id/text1"));
        assert_eq!(entry.attribute("className"), Some("android.widget.TextView"));
        assert_eq!(entry.attribute("nope"), None);
    }
}
