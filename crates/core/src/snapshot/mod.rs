//! Portfolio snapshot module: raw holdings, the immutable snapshot, and the
//! normalizer that derives weights, returns and holding ages.

mod normalizer;
mod snapshot_model;

pub use normalizer::*;
pub use snapshot_model::*;
