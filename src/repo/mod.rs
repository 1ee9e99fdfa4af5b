//! Repository side of the pipeline: locate, list, select, fetch.

pub mod content;
pub mod filter;
pub mod locator;
pub mod tree;

pub use content::fetch_all;
pub use filter::{select, selection_rule, SelectionRule, MAX_SELECTED};
pub use locator::locate;
pub use tree::{fetch_tree, CANDIDATE_BRANCHES};
