//! The single source of truth for what a brand-new node of each kind looks
//! like. Both palette drag-drop and quick-create from a dangling connection
//! route through [`create_node`] so defaults cannot diverge.

use crate::graph::{
    BaseProps, DecisionProps, DeviceCategory, DeviceMeta, DeviceProps, Node, NodeData, NodeKind,
    Position,
};
use crate::id_generator::generate_node_id;

/// Builds a node with a fresh id and kind-appropriate default properties.
/// `device_category` is only consulted for device nodes and falls back to
/// x-ray inspection.
pub fn create_node(
    kind: NodeKind,
    position: Position,
    device_category: Option<DeviceCategory>,
) -> Node {
    let data = match kind {
        NodeKind::Process => NodeData::Process(BaseProps::named("New Process")),
        NodeKind::Device => {
            let name = device_category
                .map(|c| c.as_str().to_uppercase())
                .unwrap_or_else(|| "Device".to_string());
            let category = device_category.unwrap_or(DeviceCategory::Xray);
            NodeData::Device(DeviceProps {
                base: BaseProps::named(name),
                device_meta: Some(DeviceMeta::for_category(category)),
            })
        }
        NodeKind::Decision => NodeData::Decision(DecisionProps {
            base: BaseProps::named("Decision"),
            condition: String::new(),
            yes_label: "Yes".to_string(),
            no_label: "No".to_string(),
        }),
        NodeKind::Note => NodeData::Note(BaseProps {
            name: "Note".to_string(),
            notes: Some(String::new()),
            ..Default::default()
        }),
    };

    Node {
        id: generate_node_id(),
        position,
        width: None,
        height: None,
        data,
    }
}
