//! Built-in pipes.
//!
//! Every built-in stage kind maps to one pipe type here. Filters keep the
//! default path behaviour; pipes that produce new values extend the path.

mod adjacency;
mod block_filter;
mod dedup;
mod graph_elements;
mod label;
mod random;
mod range;
mod script_filter;
mod source;

pub use adjacency::{AdjacencyPipe, Step};
pub use block_filter::BlockFilterPipe;
pub use dedup::DuplicateFilterPipe;
pub use graph_elements::GraphElementsPipe;
pub use label::LabelFilterPipe;
pub use random::RandomFilterPipe;
pub use range::RangeFilterPipe;
pub use script_filter::ScriptFilterPipe;
pub use source::{EmptyPipe, IdentityPipe, IterPipe};
