use crate::{
    ConstructionError,
    compositions::{Compositions, StateIndex},
    move_tables::{MoveTables, ShapeMove},
    pruning::{Metric, PruningTable},
    shape::{Shape, ShapeError},
    start, success,
};
use log::info;
use std::time::Instant;

/// The complete, immutable set of shape tables: canonical numbering, move
/// tables and one pruning table per metric.
#[derive(Debug)]
pub struct ShapeSpace {
    compositions: Compositions,
    move_tables: MoveTables,
    face_turn: PruningTable,
    combined: PruningTable,
}

impl ShapeSpace {
    /// Build every table from scratch.
    ///
    /// # Errors
    ///
    /// If any table violates its construction invariants. See
    /// `ConstructionError`.
    pub fn try_new() -> Result<Self, ConstructionError> {
        info!(start!("Building shape space"));
        let start = Instant::now();

        let compositions = Compositions::enumerate()?;
        let move_tables = MoveTables::generate(&compositions)?;
        let face_turn = PruningTable::generate(Metric::FaceTurn, &compositions, &move_tables)?;
        let combined = PruningTable::generate(Metric::Combined, &compositions, &move_tables)?;

        info!(
            success!("Shape space built in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
        Ok(Self {
            compositions,
            move_tables,
            face_turn,
            combined,
        })
    }

    #[must_use]
    pub fn compositions(&self) -> &Compositions {
        &self.compositions
    }

    #[must_use]
    pub fn move_tables(&self) -> &MoveTables {
        &self.move_tables
    }

    #[must_use]
    pub fn pruning_table(&self, metric: Metric) -> &PruningTable {
        match metric {
            Metric::FaceTurn => &self.face_turn,
            Metric::Combined => &self.combined,
        }
    }

    /// Find the state index of two 12-bit layers and a parity bit.
    ///
    /// # Errors
    ///
    /// If `parity` is not 0 or 1, or the layers are not a valid shape.
    pub fn encode(&self, top: u32, bottom: u32, parity: u8) -> Result<StateIndex, ShapeError> {
        let parity = match parity {
            0 => false,
            1 => true,
            _ => return Err(ShapeError::InvalidParity(parity)),
        };
        self.compositions.encode(Shape {
            top,
            bottom,
            parity,
        })
    }

    /// Find the state index of a `parity << 24 | top << 12 | bottom` value.
    ///
    /// # Errors
    ///
    /// If the value has bits above the parity bit or is not a valid shape.
    pub fn encode_packed(&self, shape2: u32) -> Result<StateIndex, ShapeError> {
        let shape = Shape::from_packed(shape2);
        if shape2 >> 25 != 0 {
            return Err(ShapeError::InvalidComposition {
                top: shape2 >> 12,
                bottom: shape.bottom,
            });
        }
        self.compositions.encode(shape)
    }

    #[must_use]
    pub fn decode(&self, index: StateIndex) -> Shape {
        self.compositions.decode(index)
    }

    /// Rotate the top layer to its next cut position, returning the new
    /// state and the 30° units used (1 to 6).
    #[must_use]
    pub fn apply_top_move(&self, index: StateIndex) -> (StateIndex, u8) {
        let rotation = self.move_tables.top(index);
        (rotation.next(), rotation.units())
    }

    /// Rotate the bottom layer to its next cut position, returning the new
    /// state and the 30° units used (1 to 6).
    #[must_use]
    pub fn apply_bottom_move(&self, index: StateIndex) -> (StateIndex, u8) {
        let rotation = self.move_tables.bottom(index);
        (rotation.next(), rotation.units())
    }

    #[must_use]
    pub fn apply_twist(&self, index: StateIndex) -> StateIndex {
        self.move_tables.twist(index)
    }

    /// Every state reachable by rotating the top layer less than a full
    /// turn, with the units turned.
    pub fn top_turns(&self, index: StateIndex) -> impl Iterator<Item = (StateIndex, u8)> + '_ {
        self.move_tables.top_turns(index)
    }

    /// Every state reachable by rotating the bottom layer less than a full
    /// turn, with the units turned.
    pub fn bottom_turns(
        &self,
        index: StateIndex,
    ) -> impl Iterator<Item = (StateIndex, u8)> + '_ {
        self.move_tables.bottom_turns(index)
    }

    /// Apply a shape move, turning the top layer before the bottom layer.
    ///
    /// # Errors
    ///
    /// If a layer cannot stop after the requested number of units because a
    /// corner would straddle the cut.
    pub fn apply_move(
        &self,
        index: StateIndex,
        move_: ShapeMove,
    ) -> Result<StateIndex, ShapeError> {
        match move_ {
            ShapeMove::Twist => Ok(self.apply_twist(index)),
            ShapeMove::Turn { top, bottom } => {
                let index = turn_layer(self.move_tables.top_turns(index), index, top)?;
                turn_layer(self.move_tables.bottom_turns(index), index, bottom)
            }
        }
    }

    /// A lower bound on the moves needed to restore a cube shape. The
    /// tables are exact, so the bound is attained.
    #[must_use]
    pub fn pruning_lower_bound(&self, index: StateIndex, metric: Metric) -> u8 {
        self.pruning_table(metric).distance(index)
    }

    /// An optimal sequence of shape moves under `metric` taking `index` to a
    /// state at distance zero. Each step moves to any neighbor one closer.
    ///
    /// Returns `None` if a state on the way has no neighbor one move closer.
    /// Tables built by `try_new` are exact, so this does not happen for them.
    #[must_use]
    pub fn solve_shape(&self, index: StateIndex, metric: Metric) -> Option<Vec<ShapeMove>> {
        let table = self.pruning_table(metric);
        let mut current = index;
        let mut distance = table.distance(current);
        let mut solution = Vec::with_capacity(usize::from(distance));
        while distance > 0 {
            let (move_, next) = metric
                .successors(&self.move_tables, current)
                .into_iter()
                .find(|&(_, next)| table.distance(next) + 1 == distance)?;
            solution.push(move_);
            current = next;
            distance -= 1;
        }
        Some(solution)
    }
}

fn turn_layer(
    mut turns: impl Iterator<Item = (StateIndex, u8)>,
    index: StateIndex,
    units: u8,
) -> Result<StateIndex, ShapeError> {
    if units == 0 {
        return Ok(index);
    }
    turns
        .find(|&(_, turned)| turned >= units)
        .filter(|&(_, turned)| turned == units)
        .map(|(next, _)| next)
        .ok_or(ShapeError::InvalidTurn { units })
}
