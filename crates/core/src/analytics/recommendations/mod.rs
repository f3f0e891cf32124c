//! Rule-based rebalancing recommendations.
//!
//! The rules form an ordered decision table (`default_rules`). Each rule pairs
//! a predicate with an action builder; the engine evaluates them in order,
//! ranks the output by confidence and keeps the top entries.

mod recommendation_engine;
mod recommendation_model;
mod rules;

pub use recommendation_engine::*;
pub use recommendation_model::*;
pub use rules::*;

#[cfg(test)]
mod recommendation_engine_tests;
