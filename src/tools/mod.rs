//! Tool system for function calling.

pub mod arguments;
pub mod image_gen;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use image_gen::ImageGenTool;
pub use registry::ToolRegistry;
pub use tool::{FunctionTool, Tool};
pub use types::ToolParameters;
