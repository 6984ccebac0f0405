pub mod conversion;
pub mod definition;
pub mod flat;
pub mod wire;

pub use conversion::*;
pub use definition::*;
pub use flat::*;
pub use wire::RawWorkflow;
