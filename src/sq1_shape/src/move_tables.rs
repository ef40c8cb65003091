//! Precomputed transitions of every state under the three elementary moves.

use crate::{
    ConstructionError,
    compositions::{Compositions, STATE_COUNT, StateIndex},
    shape::{FULL_TURN, Shape},
    start, success,
};
use log::{debug, info};
use std::{fmt, iter, time::Instant};

/// A layer rotation to the next cut position: the resulting state packed
/// above four bits holding the 30° units it took (1 to 6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rotation(u32);

impl Rotation {
    fn new(next: StateIndex, units: u8) -> Self {
        Self(u32::from(next.0) << 4 | u32::from(units))
    }

    #[must_use]
    pub fn next(self) -> StateIndex {
        StateIndex((self.0 >> 4) as u16)
    }

    #[must_use]
    pub fn units(self) -> u8 {
        (self.0 & 0xf) as u8
    }
}

/// A move in shape space. `Turn` counts 30° units of the top and bottom
/// layers in the direction `Shape::top_move` and `Shape::bottom_move`
/// rotate, each in `0..12`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeMove {
    Turn { top: u8, bottom: u8 },
    Twist,
}

impl fmt::Display for ShapeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ShapeMove::Turn { top, bottom } => {
                write!(f, "({},{})", signed_units(top), signed_units(bottom))
            }
            ShapeMove::Twist => write!(f, "/"),
        }
    }
}

/// Units in `0..12` as the shortest signed turn in `-5..=6`.
fn signed_units(units: u8) -> i8 {
    let units = (units % FULL_TURN) as i8;
    if units > 6 { units - 12 } else { units }
}

/// Transitions of every state index under a top rotation, a bottom rotation
/// and a twist. Built once and never mutated.
#[derive(Debug)]
pub struct MoveTables {
    top: Box<[Rotation]>,
    bottom: Box<[Rotation]>,
    twist: Box<[StateIndex]>,
}

impl MoveTables {
    /// Apply each move to the decoded form of every state and re-encode the
    /// result.
    ///
    /// # Errors
    ///
    /// If a move produces a composition missing from `compositions`.
    pub fn generate(compositions: &Compositions) -> Result<Self, ConstructionError> {
        info!(start!("Generating shape move tables"));
        let start = Instant::now();

        let mut top = Vec::with_capacity(STATE_COUNT);
        let mut bottom = Vec::with_capacity(STATE_COUNT);
        let mut twist = Vec::with_capacity(STATE_COUNT);
        let encode = |from: StateIndex, shape: Shape| {
            compositions
                .encode(shape)
                .map_err(|_| ConstructionError::InvalidMoveTarget {
                    from,
                    composition: shape.composition(),
                })
        };

        for index in StateIndex::all() {
            let mut shape = compositions.decode(index);
            let units = shape.top_move();
            top.push(Rotation::new(encode(index, shape)?, units));

            let mut shape = compositions.decode(index);
            let units = shape.bottom_move();
            bottom.push(Rotation::new(encode(index, shape)?, units));

            let mut shape = compositions.decode(index);
            shape.twist_move();
            twist.push(encode(index, shape)?);
        }

        debug!(
            success!("Shape move tables generated in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
        Ok(Self {
            top: top.into_boxed_slice(),
            bottom: bottom.into_boxed_slice(),
            twist: twist.into_boxed_slice(),
        })
    }

    #[must_use]
    pub fn top(&self, index: StateIndex) -> Rotation {
        self.top[index.index()]
    }

    #[must_use]
    pub fn bottom(&self, index: StateIndex) -> Rotation {
        self.bottom[index.index()]
    }

    #[must_use]
    pub fn twist(&self, index: StateIndex) -> StateIndex {
        self.twist[index.index()]
    }

    /// Every state the top layer passes through in less than a full turn,
    /// with the units turned so far.
    pub fn top_turns(&self, index: StateIndex) -> impl Iterator<Item = (StateIndex, u8)> + '_ {
        layer_turns(&self.top, index)
    }

    /// Every state the bottom layer passes through in less than a full turn,
    /// with the units turned so far.
    pub fn bottom_turns(
        &self,
        index: StateIndex,
    ) -> impl Iterator<Item = (StateIndex, u8)> + '_ {
        layer_turns(&self.bottom, index)
    }
}

fn layer_turns(
    table: &[Rotation],
    start: StateIndex,
) -> impl Iterator<Item = (StateIndex, u8)> + '_ {
    let mut current = start;
    let mut units = 0;
    iter::from_fn(move || {
        if units >= FULL_TURN {
            return None;
        }
        let rotation = table[current.index()];
        current = rotation.next();
        units += rotation.units();
        (units < FULL_TURN).then_some((current, units))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> (Compositions, MoveTables) {
        let compositions = Compositions::enumerate().unwrap();
        let move_tables = MoveTables::generate(&compositions).unwrap();
        (compositions, move_tables)
    }

    /// Slots, counted clockwise from the cut, at which a piece begins.
    fn piece_starts(layer: u32) -> Vec<u8> {
        let mut starts = vec![];
        let mut slot = 0;
        while slot < FULL_TURN {
            starts.push(slot);
            slot += if layer >> (11 - slot) & 1 == 1 { 2 } else { 1 };
        }
        starts
    }

    /// Whether turning by `units` puts both cut positions on piece boundaries.
    fn cut_fits(starts: &[u8], units: u8) -> bool {
        starts.contains(&units) && starts.contains(&((units + 6) % FULL_TURN))
    }

    #[test_log::test]
    fn test_rotation_units_in_range() {
        let (_, move_tables) = tables();
        for index in StateIndex::all() {
            assert!((1..=6).contains(&move_tables.top(index).units()));
            assert!((1..=6).contains(&move_tables.bottom(index).units()));
        }
    }

    #[test_log::test]
    fn test_rotation_stops_at_first_fitting_cut() {
        let (compositions, move_tables) = tables();
        for index in StateIndex::all() {
            let shape = compositions.decode(index);
            for (layer, rotation) in [
                (shape.top, move_tables.top(index)),
                (shape.bottom, move_tables.bottom(index)),
            ] {
                let starts = piece_starts(layer);
                let units = rotation.units();
                assert!(cut_fits(&starts, units), "{shape} by {units}");
                // Any shorter turn leaves a corner straddling a cut.
                assert!((1..units).all(|shorter| !cut_fits(&starts, shorter)), "{shape}");
            }
        }
    }

    #[test_log::test]
    fn test_long_rotations() {
        let mut shape = Shape::from_packed(0x0fc07bf);
        assert_eq!(shape.bottom_move(), 6);
        let mut shape = Shape::from_packed(0x0fc06ff);
        assert_eq!(shape.bottom_move(), 4);
    }

    #[test_log::test]
    fn test_twist_is_involution() {
        let (_, move_tables) = tables();
        for index in StateIndex::all() {
            assert_eq!(move_tables.twist(move_tables.twist(index)), index);
        }
    }

    #[test_log::test]
    fn test_full_turn_returns_home() {
        let (_, move_tables) = tables();
        for index in StateIndex::all() {
            for rotate in [MoveTables::top, MoveTables::bottom] {
                let mut current = index;
                let mut units = 0;
                while units < FULL_TURN {
                    let rotation = rotate(&move_tables, current);
                    current = rotation.next();
                    units += rotation.units();
                }
                assert_eq!(units, FULL_TURN);
                assert_eq!(current, index);
            }
        }
    }

    #[test_log::test]
    fn test_top_move_leaves_bottom_alone() {
        let (compositions, move_tables) = tables();
        for index in StateIndex::all() {
            let before = compositions.decode(index);
            let after = compositions.decode(move_tables.top(index).next());
            assert_eq!(before.bottom, after.bottom);
            let after = compositions.decode(move_tables.bottom(index).next());
            assert_eq!(before.top, after.top);
        }
    }

    #[test_log::test]
    fn test_cube_top_turns() {
        let (compositions, move_tables) = tables();
        let cube = compositions.encode(Shape::from_packed(0x0db66db)).unwrap();
        // Corners and edges alternate, so every step is 2 or 1 units.
        let units = move_tables.top_turns(cube).map(|(_, units)| units).collect::<Vec<_>>();
        assert_eq!(units, vec![2, 3, 5, 6, 8, 9, 11]);
    }

    #[test_log::test]
    fn test_rotation_packing() {
        let rotation = Rotation::new(StateIndex(7355), 2);
        assert_eq!(rotation.next(), StateIndex(7355));
        assert_eq!(rotation.units(), 2);
    }

    #[test_log::test]
    fn test_move_display() {
        assert_eq!(ShapeMove::Twist.to_string(), "/");
        assert_eq!(ShapeMove::Turn { top: 1, bottom: 0 }.to_string(), "(1,0)");
        assert_eq!(ShapeMove::Turn { top: 6, bottom: 9 }.to_string(), "(6,-3)");
        assert_eq!(ShapeMove::Turn { top: 11, bottom: 7 }.to_string(), "(-1,-5)");
    }
}
