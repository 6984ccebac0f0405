//! # Tenkai - Workflow Flattening Engine
//!
//! **Tenkai** lowers the node graphs a visual workflow editor saves into the flat,
//! execution-ready form its backend runs: a mapping from node id to an operator type and
//! a set of *named* inputs, where every connection points at a concrete producing node
//! and output slot.
//!
//! ## Core Workflow
//!
//! 1.  **Detect**: the document is either already flat (returned as-is), the editor's
//!     nested save format, or unrecognized (handed back untouched).
//! 2.  **Expand**: subgraph instances are inlined with fresh ids, one per round, until none
//!     remain or the round cap is hit.
//! 3.  **Map**: links are traced through routing nodes to their real producers, and
//!     positional widget values become named parameters via a per-operator schema table.
//! 4.  **Bind**: the caller applies per-run values (uploaded filenames, prompts, seeds)
//!     with [`LateBindings`](binding::LateBindings).
//!
//! Nothing in this pipeline fails hard. Every problem is logged through the `log` facade
//! and returned as a diagnostic next to the best-effort graph.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tenkai::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let text = std::fs::read_to_string("workflow.json")?;
//!
//!     let flattener = Flattener::builder()
//!         .with_type_mapping("MyPromptNode", "CLIPTextEncode")
//!         .build();
//!     let flattened = flattener.flatten_str(&text);
//!
//!     for diagnostic in &flattened.diagnostics {
//!         eprintln!("warning: {}", diagnostic);
//!     }
//!
//!     if let Some(mut graph) = flattened.into_graph() {
//!         LateBindings::new()
//!             .set_nth_of_type("LoadImage", 0, "image", json!("sketch.png"))
//!             .randomize_seed("KSampler", "seed")
//!             .apply(&mut graph);
//!         println!("{}", graph.to_json_string(true)?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod binding;
pub mod error;
pub mod flatten;
pub mod prelude;
pub mod workflow;

use serde_json::Value;

/// Flattens `document` with the default configuration.
pub fn flatten(document: &Value) -> flatten::Flattened {
    flatten::Flattener::default().flatten_value(document)
}
