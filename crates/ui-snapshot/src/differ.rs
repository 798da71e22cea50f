use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::model::{NodeId, UiSnapshot};

/// Hash of everything a scroll can move inside `container`: the visible
/// content of every node in its subtree together with its on-screen bounds.
///
/// Two snapshots yielding the same fingerprint for their scroll container show
/// the same region, so the last gesture hit an edge.
pub fn region_fingerprint(snapshot: &UiSnapshot, container: NodeId) -> u64 {
    let mut hasher = DefaultHasher::new();
    for id in snapshot.subtree(container) {
        let node = snapshot.get(id);
        let child_count = node.children.len();
        node.tag.hash(&mut hasher);
        node.resource_id.hash(&mut hasher);
        node.text.hash(&mut hasher);
        node.content_desc.hash(&mut hasher);
        node.bounds.hash(&mut hasher);
        child_count.hash(&mut hasher);
    }
    hasher.finish()
}
