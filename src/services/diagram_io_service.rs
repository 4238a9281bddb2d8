//! Local file interchange: a diagram exports as a standalone JSON document
//! and imports from one. Import parses and validates the whole document
//! before anything reaches the graph, so a malformed file can never leave a
//! partially populated diagram behind.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::common::{sanitize_filename, write_string_to_file};
use crate::errors::DiagramError;
use crate::storage::SavedDiagram;

/// `<sanitized-title>_<id>.json`
pub fn export_filename(diagram: &SavedDiagram) -> String {
    format!("{}_{}.json", sanitize_filename(&diagram.title), diagram.id)
}

/// Writes the diagram document into `dir` and returns the written path.
pub fn export_diagram(diagram: &SavedDiagram, dir: &Path) -> Result<PathBuf, DiagramError> {
    let path = dir.join(export_filename(diagram));
    let text = serde_json::to_string_pretty(diagram)?;
    write_string_to_file(&path, &text)?;
    info!("Exported diagram {} to {}", diagram.id, path.display());
    Ok(path)
}

/// Reads and validates a diagram document. Malformed JSON or missing
/// required fields are rejected before any state is touched.
pub fn import_diagram(path: &Path) -> Result<SavedDiagram, DiagramError> {
    let text = std::fs::read_to_string(path)?;
    let diagram: SavedDiagram = serde_json::from_str(&text)?;
    diagram.validate()?;
    Ok(diagram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Connection, DiagramGraph, NodeKind, Position};
    use crate::node_factory::create_node;

    fn sample_diagram() -> SavedDiagram {
        let mut graph = DiagramGraph::new();
        graph.set_title("Wash & rinse");
        let a = create_node(NodeKind::Process, Position::new(0.0, 0.0), None);
        let b = create_node(NodeKind::Note, Position::new(50.0, 50.0), None);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        graph.add_node(a);
        graph.add_node(b);
        graph.add_edge(
            Connection {
                source: a_id,
                target: b_id,
                source_handle: None,
                target_handle: None,
            },
            None,
        );
        graph.snapshot(false)
    }

    #[test]
    fn export_then_import_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let diagram = sample_diagram();

        let path = export_diagram(&diagram, dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("Wash___rinse_diagram-"));

        let imported = import_diagram(&path).unwrap();
        assert_eq!(imported, diagram);
    }

    #[test]
    fn import_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = import_diagram(&path).unwrap_err();
        assert!(matches!(err, DiagramError::InvalidFormat(_)));
    }

    #[test]
    fn import_rejects_documents_without_id_or_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incomplete.json");
        std::fs::write(&path, r#"{"title": "no id here"}"#).unwrap();

        let err = import_diagram(&path).unwrap_err();
        assert!(matches!(err, DiagramError::MissingRequiredFields));
    }

    #[test]
    fn import_missing_file_is_an_io_error() {
        let err = import_diagram(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DiagramError::Io(_)));
    }
}
