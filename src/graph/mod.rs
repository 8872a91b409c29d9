pub mod array;
pub mod branch;
pub mod engine;
pub mod node;
pub mod plot;
pub mod tape;

pub use array::TrackedArray;
pub use branch::{Boundary, BranchPolicy, Cond};
pub use node::{Node, NodeId, TapeId, Var, next_tape_id};
pub use plot::{GraphVisualizer, VisualizationConfig};
pub use tape::Tape;
