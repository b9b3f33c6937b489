// Shapecheck Model
// Queryable type graph and unit descriptors consumed by the shapecheck analyzer

pub mod error;
pub mod graph;
pub mod program;
pub mod span;
pub mod types;

pub use error::*;
pub use graph::*;
pub use program::*;
pub use span::*;
pub use types::*;

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
