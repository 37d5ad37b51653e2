pub mod generate;
pub mod list;

pub use generate::{GenerateConfig, generate_graph};
pub use list::list_operations;
