pub mod api;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod resolver;
pub mod tracker;
pub mod tree;
pub mod utils;
mod serialization;

pub use api::{load, resolve};
pub use resolver::{ResolvedOutput, Resolver, ResolverConfig};
pub use serialization::{node_from_value, to_value, tree_from_value};
pub use tree::{ModifierSelection, TokenMap, TokenNode, TokenTree};
