use std::collections::HashSet;
use std::fmt::Write;
use std::fs::File;
use std::io::Write as IoWrite;
use std::path::Path;

use super::node::{Node, NodeId};
use super::tape::Tape;

/// Renders a recorded tape as a GraphViz digraph.
#[derive(Debug, Clone, Default)]
pub struct GraphVisualizer {
    pub config: VisualizationConfig,
}

/// Configuration for graph visualization
#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub show_values: bool,
    pub show_adjoints: bool,
    pub input_color: String,
    pub constant_color: String,
    pub op_color: String,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            show_values: true,
            show_adjoints: true,
            input_color: "#E8F5E8".to_string(),
            constant_color: "#E3F2FD".to_string(),
            op_color: "#FFF3E0".to_string(),
        }
    }
}

impl GraphVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: VisualizationConfig) -> Self {
        Self { config }
    }

    /// DOT source for the part of `tape` that `outputs` depend on. An empty
    /// `outputs` slice renders the whole tape.
    pub fn to_dot(&self, tape: &Tape, outputs: &[NodeId]) -> String {
        let relevant = self.find_relevant_nodes(tape, outputs);

        // Writing into a String cannot fail.
        let mut dot = String::new();
        let _ = writeln!(dot, "digraph Tape {{");
        let _ = writeln!(dot, "    rankdir=BT;");
        let _ = writeln!(dot, "    node [shape=box, style=filled];");
        let _ = writeln!(dot, "    edge [color=gray];");

        for node in tape.nodes().iter().filter(|n| relevant.contains(&n.id)) {
            let _ = writeln!(
                dot,
                "    n{} [label=\"{}\", fillcolor=\"{}\"];",
                node.id.0,
                self.create_node_label(node),
                self.get_node_color(node)
            );
        }

        for node in tape.nodes().iter().filter(|n| relevant.contains(&n.id)) {
            for input in node.inputs() {
                let _ = writeln!(dot, "    n{} -> n{};", input.0, node.id.0);
            }
        }

        let _ = writeln!(dot, "}}");
        dot
    }

    pub fn save_dot(
        &self,
        tape: &Tape,
        outputs: &[NodeId],
        path: impl AsRef<Path>,
    ) -> Result<(), std::io::Error> {
        let dot_content = self.to_dot(tape, outputs);
        let mut file = File::create(path)?;
        file.write_all(dot_content.as_bytes())?;
        Ok(())
    }

    fn find_relevant_nodes(&self, tape: &Tape, outputs: &[NodeId]) -> HashSet<NodeId> {
        if outputs.is_empty() {
            return tape.nodes().iter().map(|node| node.id).collect();
        }

        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = outputs.to_vec();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(node) = tape.node(id) {
                stack.extend_from_slice(node.inputs());
            }
        }
        visited
    }

    fn create_node_label(&self, node: &Node) -> String {
        let mut label = format!("{}\\n{}", node.id.0, node.op);
        if self.config.show_values {
            let _ = write!(label, "\\nvalue: {}", node.value);
        }
        if self.config.show_adjoints {
            let _ = write!(label, "\\nadjoint: {}", node.adjoint);
        }
        label
    }

    fn get_node_color(&self, node: &Node) -> &str {
        match node.op {
            crate::ops::OpKind::Input => &self.config.input_color,
            crate::ops::OpKind::Constant => &self.config.constant_color,
            _ => &self.config.op_color,
        }
    }
}

impl Tape {
    /// DOT rendering with the default configuration.
    pub fn to_dot(&self, outputs: &[NodeId]) -> String {
        GraphVisualizer::new().to_dot(self, outputs)
    }
}
