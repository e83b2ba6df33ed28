//! Query evaluation stages.

pub mod combine;
pub mod overlap;
pub mod project;
pub mod resolver;

pub use combine::{combine, merge_feature_pair};
pub use overlap::compute_overlaps;
pub use project::{parse_results, project};
pub use resolver::{resolve_set, RecordPair};
