//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the tenkai crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use tenkai::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let text = std::fs::read_to_string("path/to/workflow.json")?;
//! let flattened = Flattener::default().flatten_str(&text);
//! println!("{} diagnostic(s)", flattened.diagnostics.len());
//! # Ok(())
//! # }
//! ```

// Flattening
pub use crate::flatten::schema::{FieldSelector, WidgetSchema};
pub use crate::flatten::{
    DocumentShape, FlatOutput, Flattened, Flattener, FlattenerBuilder, detect_shape,
};

// Workflow model
pub use crate::workflow::{
    BoundaryPort, Edge, EdgeId, FlatGraph, FlatNode, InputSlot, IntoWorkflow, Node, NodeId,
    NodeKind, OutputSlot, OverrideEdge, Parameter, RawWorkflow, SlotIndex, SubgraphDefinition,
    Workflow,
};

// Late bindings
pub use crate::binding::{Binding, BindingAction, LateBindings, NodeSelector};

// Error types
pub use crate::error::{ConversionError, FlattenError, UnresolvedReason};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
