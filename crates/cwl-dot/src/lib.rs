//! Renders workflow documents as Graphviz DOT.
//!
//! load document -> object tree -> clusters, nodes and buffered edges -> DOT
//! text. Each call to [`render_workflow`] owns its own counters and registries,
//! so independent renderings never share state.

pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod endpoint;
pub mod errors;
pub mod expression;
pub mod graph;
pub mod ids;
pub mod inspect;
pub mod load;
pub mod model;
pub mod render;
pub mod scatter;
pub mod transforms;

mod session;
mod traverse;

pub use config::*;
pub use diagnostics::*;
pub use emit::escape_literal;
pub use endpoint::*;
pub use errors::*;
pub use expression::*;
pub use graph::*;
pub use ids::*;
pub use inspect::*;
pub use load::*;
pub use model::*;
pub use render::*;
pub use scatter::*;
pub use transforms::*;
