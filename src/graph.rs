use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::id_generator::generate_edge_id;
use crate::node_factory::create_node;
use crate::storage::SavedDiagram;

pub const DEFAULT_DIAGRAM_TITLE: &str = "Untitled Diagram";
pub const DEFAULT_EDGE_COLOR: &str = "#64748b";

/// Offset applied to a pasted node so it does not land on top of the original.
pub const PASTE_OFFSET: f64 = 40.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Process,
    Device,
    Decision,
    Note,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Xray,
    Metal,
    Weight,
}

impl DeviceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Xray => "xray",
            DeviceCategory::Metal => "metal",
            DeviceCategory::Weight => "weight",
        }
    }
}

/// Fields shared by every node kind.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaseProps {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl BaseProps {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMeta {
    pub category: DeviceCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_cycle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_criteria: Option<String>,
}

impl DeviceMeta {
    pub fn for_category(category: DeviceCategory) -> Self {
        Self {
            category,
            manufacturer: None,
            model: None,
            inspection_cycle: None,
            alarm_criteria: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProps {
    #[serde(flatten)]
    pub base: BaseProps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_meta: Option<DeviceMeta>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecisionProps {
    #[serde(flatten)]
    pub base: BaseProps,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub yes_label: String,
    #[serde(default)]
    pub no_label: String,
}

/// The `kind` discriminant plus the kind-specific property record. The kind
/// of a node never changes after creation; only the properties inside the
/// active variant mutate, via [`NodePatch`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "properties", rename_all = "lowercase")]
pub enum NodeData {
    Process(BaseProps),
    Device(DeviceProps),
    Decision(DecisionProps),
    Note(BaseProps),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Process(_) => NodeKind::Process,
            NodeData::Device(_) => NodeKind::Device,
            NodeData::Decision(_) => NodeKind::Decision,
            NodeData::Note(_) => NodeKind::Note,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn base(&self) -> &BaseProps {
        match self {
            NodeData::Process(p) | NodeData::Note(p) => p,
            NodeData::Device(p) => &p.base,
            NodeData::Decision(p) => &p.base,
        }
    }

    fn base_mut(&mut self) -> &mut BaseProps {
        match self {
            NodeData::Process(p) | NodeData::Note(p) => p,
            NodeData::Device(p) => &mut p.base,
            NodeData::Decision(p) => &mut p.base,
        }
    }

    pub fn device_category(&self) -> Option<DeviceCategory> {
        match self {
            NodeData::Device(p) => p.device_meta.as_ref().map(|m| m.category),
            _ => None,
        }
    }

    /// Shallow-merge a patch into the properties. Fields that do not apply
    /// to this node's kind are ignored; the kind itself never changes.
    pub fn apply(&mut self, patch: &NodePatch) {
        let base = self.base_mut();
        if let Some(name) = &patch.name {
            base.name = name.clone();
        }
        if let Some(notes) = &patch.notes {
            base.notes = Some(notes.clone());
        }
        if let Some(inputs) = &patch.inputs {
            base.inputs = Some(inputs.clone());
        }
        if let Some(outputs) = &patch.outputs {
            base.outputs = Some(outputs.clone());
        }
        if let Some(operation) = &patch.operation {
            base.operation = Some(operation.clone());
        }

        match self {
            NodeData::Device(props) => {
                if let Some(meta) = &patch.device_meta {
                    props.device_meta = Some(meta.clone());
                }
            }
            NodeData::Decision(props) => {
                if let Some(condition) = &patch.condition {
                    props.condition = condition.clone();
                }
                if let Some(yes_label) = &patch.yes_label {
                    props.yes_label = yes_label.clone();
                }
                if let Some(no_label) = &patch.no_label {
                    props.no_label = no_label.clone();
                }
            }
            NodeData::Process(_) | NodeData::Note(_) => {}
        }
    }
}

/// Partial update for node properties. Absent fields leave the current
/// value untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePatch {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub inputs: Option<String>,
    pub outputs: Option<String>,
    pub operation: Option<String>,
    pub condition: Option<String>,
    pub yes_label: Option<String>,
    pub no_label: Option<String>,
    pub device_meta: Option<DeviceMeta>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dotted,
    Bold,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArrowType {
    None,
    Forward,
    Backward,
    Both,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub line_style: LineStyle,
    pub color: String,
    pub arrow_type: ArrowType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            line_style: LineStyle::Solid,
            color: DEFAULT_EDGE_COLOR.to_string(),
            arrow_type: ArrowType::Forward,
            label: None,
        }
    }
}

/// Partial update for edge style attributes.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgePatch {
    pub line_style: Option<LineStyle>,
    pub color: Option<String>,
    pub arrow_type: Option<ArrowType>,
    pub label: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    pub style: EdgeStyle,
}

/// A raw connect request from the canvas: which handles on which nodes the
/// user dragged between. Self-loops and parallel edges are permitted.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

/// Primitive structural change from an interactive drag/resize/select
/// gesture on the canvas.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    Move { id: String, position: Position },
    Resize { id: String, width: f64, height: f64 },
    Remove { id: String },
    Select { id: String, selected: bool },
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    Remove { id: String },
    Select { id: String, selected: bool },
}

#[derive(Clone, Debug)]
struct CopiedNode {
    data: NodeData,
    position: Position,
    width: Option<f64>,
    height: Option<f64>,
}

/// The canonical in-memory diagram state: node and edge arrays, selection,
/// diagram metadata, and the copy buffer.
///
/// All mutation is synchronous and total. Node deletion cascades to every
/// touching edge in the same call, so no dangling edge is ever observable.
/// At most one node or one edge is selected at a time; selecting one clears
/// the other.
#[derive(Clone, Debug)]
pub struct DiagramGraph {
    id: Option<String>,
    title: String,
    description: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selected_node_id: Option<String>,
    selected_edge_id: Option<String>,
    copied_node: Option<CopiedNode>,
}

impl Default for DiagramGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramGraph {
    pub fn new() -> Self {
        Self {
            id: None,
            title: DEFAULT_DIAGRAM_TITLE.to_string(),
            description: String::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            selected_node_id: None,
            selected_edge_id: None,
            copied_node: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn selected_node_id(&self) -> Option<&str> {
        self.selected_node_id.as_deref()
    }

    pub fn selected_edge_id(&self) -> Option<&str> {
        self.selected_edge_id.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn get_edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn add_node(&mut self, node: Node) {
        // Ids come from the generator; a duplicate is a logic error upstream.
        debug_assert!(
            self.get_node(&node.id).is_none(),
            "duplicate node id {}",
            node.id
        );
        debug!("Adding node {} ({:?})", node.id, node.kind());
        self.nodes.push(node);
    }

    pub fn update_node_data(&mut self, id: &str, patch: &NodePatch) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.data.apply(patch);
        }
    }

    /// Removes the node and every edge touching it in one state transition,
    /// and clears the selection if the node was selected.
    pub fn delete_node(&mut self, id: &str) {
        self.nodes.retain(|n| n.id != id);
        self.edges.retain(|e| e.source != id && e.target != id);
        if self.selected_node_id.as_deref() == Some(id) {
            self.selected_node_id = None;
        }
    }

    /// Appends a new edge built from the connection request, returning its id.
    pub fn add_edge(&mut self, connection: Connection, style: Option<EdgeStyle>) -> String {
        let edge = Edge {
            id: generate_edge_id(),
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
            style: style.unwrap_or_default(),
        };
        let id = edge.id.clone();
        debug!("Adding edge {} ({} -> {})", id, edge.source, edge.target);
        self.edges.push(edge);
        id
    }

    pub fn update_edge_data(&mut self, id: &str, patch: &EdgePatch) {
        if let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) {
            if let Some(line_style) = patch.line_style {
                edge.style.line_style = line_style;
            }
            if let Some(color) = &patch.color {
                edge.style.color = color.clone();
            }
            if let Some(arrow_type) = patch.arrow_type {
                edge.style.arrow_type = arrow_type;
            }
            if let Some(label) = &patch.label {
                edge.style.label = Some(label.clone());
            }
        }
    }

    pub fn delete_edge(&mut self, id: &str) {
        self.edges.retain(|e| e.id != id);
        if self.selected_edge_id.as_deref() == Some(id) {
            self.selected_edge_id = None;
        }
    }

    /// Applies a batch of primitive node changes, building a fresh array so
    /// downstream change detection sees a new value. `Remove` cascades to
    /// touching edges exactly like [`DiagramGraph::delete_node`].
    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) {
        let mut nodes = self.nodes.clone();
        for change in changes {
            match change {
                NodeChange::Move { id, position } => {
                    if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
                        node.position = position;
                    }
                }
                NodeChange::Resize { id, width, height } => {
                    if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
                        node.width = Some(width);
                        node.height = Some(height);
                    }
                }
                NodeChange::Remove { id } => {
                    nodes.retain(|n| n.id != id);
                    self.edges.retain(|e| e.source != id && e.target != id);
                    if self.selected_node_id.as_deref() == Some(id.as_str()) {
                        self.selected_node_id = None;
                    }
                }
                NodeChange::Select { id, selected } => {
                    if selected {
                        self.selected_node_id = Some(id);
                        self.selected_edge_id = None;
                    } else if self.selected_node_id.as_deref() == Some(id.as_str()) {
                        self.selected_node_id = None;
                    }
                }
            }
        }
        self.nodes = nodes;
    }

    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) {
        let mut edges = self.edges.clone();
        for change in changes {
            match change {
                EdgeChange::Remove { id } => {
                    edges.retain(|e| e.id != id);
                    if self.selected_edge_id.as_deref() == Some(id.as_str()) {
                        self.selected_edge_id = None;
                    }
                }
                EdgeChange::Select { id, selected } => {
                    if selected {
                        self.selected_edge_id = Some(id);
                        self.selected_node_id = None;
                    } else if self.selected_edge_id.as_deref() == Some(id.as_str()) {
                        self.selected_edge_id = None;
                    }
                }
            }
        }
        self.edges = edges;
    }

    pub fn set_selected_node_id(&mut self, id: Option<String>) {
        self.selected_node_id = id;
        self.selected_edge_id = None;
    }

    pub fn set_selected_edge_id(&mut self, id: Option<String>) {
        self.selected_edge_id = id;
        self.selected_node_id = None;
    }

    /// Resets nodes, edges, and selection. Persisted storage is untouched.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.selected_node_id = None;
        self.selected_edge_id = None;
    }

    /// Replaces nodes and edges wholesale and clears the selection. The
    /// caller is responsible for the referential integrity of `edges`.
    pub fn load(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        self.edges = edges;
        self.selected_node_id = None;
        self.selected_edge_id = None;
    }

    fn selected_node_index(&self) -> Option<usize> {
        let id = self.selected_node_id.as_deref()?;
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Moves the selected node to the end of the array (drawn on top).
    pub fn bring_to_front(&mut self) {
        if let Some(idx) = self.selected_node_index() {
            let mut nodes = self.nodes.clone();
            let node = nodes.remove(idx);
            nodes.push(node);
            self.nodes = nodes;
        }
    }

    /// Moves the selected node to the start of the array (drawn underneath).
    pub fn send_to_back(&mut self) {
        if let Some(idx) = self.selected_node_index() {
            let mut nodes = self.nodes.clone();
            let node = nodes.remove(idx);
            nodes.insert(0, node);
            self.nodes = nodes;
        }
    }

    /// Moves the selected node one position later in render order.
    pub fn bring_forward(&mut self) {
        if let Some(idx) = self.selected_node_index() {
            if idx + 1 < self.nodes.len() {
                let mut nodes = self.nodes.clone();
                nodes.swap(idx, idx + 1);
                self.nodes = nodes;
            }
        }
    }

    /// Moves the selected node one position earlier in render order.
    pub fn send_backward(&mut self) {
        if let Some(idx) = self.selected_node_index() {
            if idx > 0 {
                let mut nodes = self.nodes.clone();
                nodes.swap(idx, idx - 1);
                self.nodes = nodes;
            }
        }
    }

    /// Snapshots the selected node's data for a later paste. No-op when
    /// nothing is selected.
    pub fn copy_selected_node(&mut self) {
        let selected = self
            .selected_node_id
            .as_deref()
            .and_then(|id| self.get_node(id));
        if let Some(node) = selected {
            self.copied_node = Some(CopiedNode {
                data: node.data.clone(),
                position: node.position,
                width: node.width,
                height: node.height,
            });
        }
    }

    /// Creates a new node from the copy buffer through the node factory,
    /// offset from the original, preserving the copied properties. Returns
    /// the new node's id, or `None` when nothing was copied.
    pub fn paste_node(&mut self) -> Option<String> {
        let copied = self.copied_node.clone()?;
        let position = Position::new(
            copied.position.x + PASTE_OFFSET,
            copied.position.y + PASTE_OFFSET,
        );
        let mut node = create_node(copied.data.kind(), position, copied.data.device_category());
        node.data = copied.data;
        node.width = copied.width;
        node.height = copied.height;
        let id = node.id.clone();
        self.add_node(node);
        Some(id)
    }

    /// Captures the current graph as a persistable record. The diagram id is
    /// assigned on first snapshot and stable afterwards; timestamps are left
    /// for the persistence gateway to fill in.
    pub fn snapshot(&mut self, is_draft: bool) -> SavedDiagram {
        let id = match &self.id {
            Some(id) => id.clone(),
            None => {
                let id = crate::id_generator::generate_diagram_id();
                self.id = Some(id.clone());
                id
            }
        };
        SavedDiagram {
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            created_at: None,
            updated_at: None,
            is_draft,
        }
    }
}
