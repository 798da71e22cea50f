use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use droidlocate_core_types::SnapshotGeneration;
use serde::{Deserialize, Serialize};

use crate::errors::SnapshotError;

/// Index of a node inside one [`UiSnapshot`]. Only meaningful together with
/// the snapshot's generation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Screen rectangle as reported by uiautomator: `[left,top][right,bottom]`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.left + self.width() / 2,
            self.top + self.height() / 2,
        )
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}][{},{}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

impl FromStr for Bounds {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SnapshotError::InvalidBounds(s.to_string());
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(invalid)?;
        let (first, second) = inner.split_once("][").ok_or_else(invalid)?;
        let pair = |part: &str| -> Result<(i32, i32), SnapshotError> {
            let (a, b) = part.split_once(',').ok_or_else(invalid)?;
            let a = a.trim().parse().map_err(|_| invalid())?;
            let b = b.trim().parse().map_err(|_| invalid())?;
            Ok((a, b))
        };
        let (left, top) = pair(first)?;
        let (right, bottom) = pair(second)?;
        Ok(Bounds::new(left, top, right, bottom))
    }
}

/// One element of a snapshot. Parent and children are arena indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub tag: String,
    pub class_name: String,
    pub resource_id: String,
    pub text: String,
    pub content_desc: String,
    pub package: String,
    pub bounds: Bounds,
    pub scrollable: bool,
    pub password: bool,
    /// Sibling index reported by the device.
    pub index: u32,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    subtree_end: u32,
}

impl Node {
    /// Text as the automation server reports it: the text attribute, or the
    /// content description for nodes without text.
    pub fn logical_text(&self) -> &str {
        if self.text.is_empty() {
            &self.content_desc
        } else {
            &self.text
        }
    }
}

/// Immutable capture of the UI hierarchy, stored in document (pre-order) order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiSnapshot {
    generation: SnapshotGeneration,
    nodes: Vec<Node>,
}

impl UiSnapshot {
    pub fn from_spec(spec: &NodeSpec, generation: SnapshotGeneration) -> Result<Self, SnapshotError> {
        let mut nodes = Vec::new();
        push_spec(&mut nodes, spec, None, 0)?;
        Ok(Self { generation, nodes })
    }

    pub fn from_json(json: &str, generation: SnapshotGeneration) -> Result<Self, SnapshotError> {
        let spec: NodeSpec = serde_json::from_str(json)
            .map_err(|err| SnapshotError::InvalidSpec(err.to_string()))?;
        Self::from_spec(&spec, generation)
    }

    pub fn generation(&self) -> SnapshotGeneration {
        self.generation
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Panicking accessor for ids obtained from this same snapshot.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Ids of `id` and all of its descendants, in document order.
    pub fn subtree(&self, id: NodeId) -> impl Iterator<Item = NodeId> {
        self.subtree_range(id).map(|idx| NodeId(idx as u32))
    }

    /// Descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> {
        self.subtree(id).skip(1)
    }

    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.subtree_range(ancestor).contains(&id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx as u32), node))
    }

    fn subtree_range(&self, id: NodeId) -> Range<usize> {
        match self.node(id) {
            Some(node) => id.index()..node.subtree_end as usize,
            None => 0..0,
        }
    }
}

fn push_spec(
    nodes: &mut Vec<Node>,
    spec: &NodeSpec,
    parent: Option<NodeId>,
    sibling_index: u32,
) -> Result<NodeId, SnapshotError> {
    let id = NodeId(nodes.len() as u32);
    let bounds = match spec.bounds.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw.parse()?,
        _ => Bounds::default(),
    };
    if spec.class.is_empty() && spec.tag.is_none() {
        return Err(SnapshotError::InvalidSpec(format!(
            "node {} has neither a class nor a tag",
            id.0
        )));
    }
    let tag = match &spec.tag {
        Some(tag) => tag.clone(),
        None if spec.password => "secure".to_string(),
        None => tag_for_class(&spec.class),
    };
    nodes.push(Node {
        tag,
        class_name: spec.class.clone(),
        resource_id: spec.resource_id.clone(),
        text: spec.text.clone(),
        content_desc: spec.content_desc.clone(),
        package: spec.package.clone(),
        bounds,
        scrollable: spec.scrollable,
        password: spec.password,
        index: spec.index.unwrap_or(sibling_index),
        parent,
        children: Vec::with_capacity(spec.children.len()),
        subtree_end: 0,
    });
    for (position, child) in spec.children.iter().enumerate() {
        let child_id = push_spec(nodes, child, Some(id), position as u32)?;
        nodes[id.index()].children.push(child_id);
    }
    nodes[id.index()].subtree_end = nodes.len() as u32;
    Ok(id)
}

/// Short tag name the Android server reports for a widget class.
pub fn tag_for_class(class_name: &str) -> String {
    let short = class_name.rsplit('.').next().unwrap_or(class_name);
    let tag = match short {
        "TextView" => "text",
        "EditText" | "AutoCompleteTextView" => "textfield",
        "Button" => "button",
        "ImageButton" => "imagebutton",
        "ImageView" => "image",
        "ListView" | "RecyclerView" => "list",
        "FrameLayout" => "frame",
        "LinearLayout" => "linear",
        "RelativeLayout" => "relative",
        "ScrollView" | "HorizontalScrollView" => "scroll",
        "CheckBox" => "checkbox",
        "CheckedTextView" => "checked",
        "RadioButton" => "radio",
        "RadioGroup" => "radiogroup",
        "Spinner" => "spinner",
        "GridView" => "grid",
        "WebView" => "web",
        "Switch" => "switch",
        "ToggleButton" => "toggle",
        "ProgressBar" => "progress",
        "SeekBar" => "seek",
        "TableLayout" => "table",
        "TableRow" => "tablerow",
        "View" => "view",
        other => return other.to_ascii_lowercase(),
    };
    tag.to_string()
}

/// Serialized form of a hierarchy node, nested the way dumps are.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct NodeSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub class: String,
    pub resource_id: String,
    pub text: String,
    pub content_desc: String,
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
    pub scrollable: bool,
    pub password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.content_desc = desc.into();
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = id.into();
        self
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds.to_string());
        self
    }

    pub fn scrollable(mut self) -> Self {
        self.scrollable = true;
        self
    }

    pub fn password(mut self) -> Self {
        self.password = true;
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UiSnapshot {
        let spec = NodeSpec::new("android.widget.FrameLayout")
            .child(
                NodeSpec::new("android.widget.LinearLayout")
                    .child(NodeSpec::new("android.widget.TextView").text("Title")),
            )
            .child(
                NodeSpec::new("android.widget.ListView")
                    .scrollable()
                    .child(NodeSpec::new("android.widget.TextView").text("One"))
                    .child(NodeSpec::new("android.widget.TextView").desc("Two")),
            );
        UiSnapshot::from_spec(&spec, SnapshotGeneration(3)).unwrap()
    }

    #[test]
    fn arena_is_pre_order() {
        let snapshot = sample();
        let tags: Vec<_> = snapshot.iter().map(|(_, node)| node.tag.as_str()).collect();
        assert_eq!(tags, ["frame", "linear", "text", "list", "text", "text"]);
        assert_eq!(snapshot.generation(), SnapshotGeneration(3));
    }

    #[test]
    fn subtree_covers_descendants_only() {
        let snapshot = sample();
        let list = NodeId(3);
        let ids: Vec<_> = snapshot.subtree(list).collect();
        assert_eq!(ids, vec![NodeId(3), NodeId(4), NodeId(5)]);
        assert!(snapshot.is_within(NodeId(5), list));
        assert!(!snapshot.is_within(NodeId(2), list));
        assert_eq!(snapshot.parent(NodeId(4)), Some(list));
        assert_eq!(snapshot.get(NodeId(5)).index, 1);
    }

    #[test]
    fn logical_text_falls_back_to_description() {
        let snapshot = sample();
        assert_eq!(snapshot.get(NodeId(4)).logical_text(), "One");
        assert_eq!(snapshot.get(NodeId(5)).logical_text(), "Two");
    }

    #[test]
    fn bounds_round_trip_through_uiautomator_format() {
        let bounds: Bounds = "[0,210][1080,1794]".parse().unwrap();
        assert_eq!(bounds, Bounds::new(0, 210, 1080, 1794));
        assert_eq!(bounds.center(), (540, 1002));
        assert!("0,0,10,10".parse::<Bounds>().is_err());
    }

    #[test]
    fn tags_follow_widget_classes() {
        assert_eq!(tag_for_class("android.widget.TextView"), "text");
        assert_eq!(tag_for_class("android.widget.ListView"), "list");
        assert_eq!(tag_for_class("com.example.FancyWidget"), "fancywidget");
        let spec = NodeSpec::new("android.widget.EditText").password();
        let snapshot = UiSnapshot::from_spec(&spec, SnapshotGeneration(0)).unwrap();
        assert_eq!(snapshot.get(NodeId(0)).tag, "secure");
    }

    #[test]
    fn json_spec_requires_a_class_or_tag() {
        let err = UiSnapshot::from_json(r#"{"text":"orphan"}"#, SnapshotGeneration(0)).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidSpec(_)));

        let ok = UiSnapshot::from_json(
            r#"{"class":"android.widget.TextView","content-desc":"Hi","bounds":"[0,0][10,10]"}"#,
            SnapshotGeneration(1),
        )
        .unwrap();
        assert_eq!(ok.get(NodeId(0)).content_desc, "Hi");
        assert_eq!(ok.get(NodeId(0)).bounds.width(), 10);
    }
}
