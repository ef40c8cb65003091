//! Move tables and exact pruning tables for the shape space of a Square-1.
//!
//! The shape of a Square-1 is the arrangement of corners (two 30° slots wide)
//! and edges (one slot wide) around the top and bottom layers, ignoring which
//! piece sits where. Before a solver can permute pieces it must restore a
//! cube shape, and the tables built here give it exact distances to do so.
//!
//! Everything is built once by [`ShapeSpace::try_new`] and is immutable
//! afterwards. [`initialize`] shares a single process-wide instance.

#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod compositions;
pub mod move_tables;
pub mod pruning;
pub mod shape;
pub mod shape_space;

pub use compositions::{COMPOSITION_COUNT, Compositions, STATE_COUNT, StateIndex};
pub use move_tables::{MoveTables, Rotation, ShapeMove};
pub use pruning::{Metric, ParseMetricError, PruningTable};
pub use shape::{Shape, ShapeError};
pub use shape_space::ShapeSpace;

use std::sync::OnceLock;
use thiserror::Error;

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

/// A defect in the static tables themselves. None of these can be caused by
/// user input, and a table set that produced one must not be served.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Expected {expected} shape compositions but enumerated {actual}")]
    WrongCompositionCount { expected: usize, actual: usize },
    #[error("Shape compositions are not in strictly ascending order")]
    UnsortedCompositions,
    #[error(
        "A move from state {from} leads to composition {composition:#08x}, which is not a valid shape"
    )]
    InvalidMoveTarget { from: StateIndex, composition: u32 },
    #[error("Seed shape {0:#09x} is not a valid state")]
    InvalidSeed(u32),
    #[error("{count} states were never reached under the {metric} metric")]
    UnreachableStates { metric: Metric, count: usize },
}

static SHAPE_SPACE: OnceLock<Result<ShapeSpace, ConstructionError>> = OnceLock::new();

/// Get the process-wide shape space, building it on the first call. Every
/// later call returns the same tables, or the same error if building failed.
///
/// # Errors
///
/// If the tables violate one of their construction invariants. See
/// `ConstructionError`.
pub fn initialize() -> Result<&'static ShapeSpace, ConstructionError> {
    SHAPE_SPACE
        .get_or_init(ShapeSpace::try_new)
        .as_ref()
        .map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_initialize_is_idempotent() {
        let first = initialize().unwrap();
        let second = initialize().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test_log::test]
    fn test_initialize_from_many_threads() {
        let handles = (0..4)
            .map(|_| std::thread::spawn(|| std::ptr::from_ref(initialize().unwrap()) as usize))
            .collect::<Vec<_>>();
        let addresses = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
