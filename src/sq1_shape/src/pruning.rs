//! Exact distance-to-cube-shape tables for two ways of counting moves.

use crate::{
    ConstructionError,
    compositions::{Compositions, STATE_COUNT, StateIndex},
    move_tables::{MoveTables, ShapeMove},
    shape::{CUBE_SHAPES, Shape},
    start, success, working,
};
use log::{debug, info, trace};
use std::{fmt, iter, str::FromStr, time::Instant};
use thiserror::Error;

/// Marks a state no search pass has reached yet.
const UNVISITED: u8 = u8::MAX;

/// The shape of a solved puzzle, `parity << 24 | top << 12 | bottom`.
const SOLVED_SHAPE: u32 = 0x06dbdb6;

/// How moves are counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Every twist, and every rotation of one layer, is one move.
    FaceTurn,
    /// Every twist is one move, and so is rotating the top layer and then
    /// the bottom layer before the next twist.
    Combined,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown metric {0:?}, expected `face-turn` or `combined`")]
pub struct ParseMetricError(String);

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::FaceTurn, Metric::Combined];

    /// Packed shapes at distance zero. Face turns accept any of the four
    /// cube shapes, the combined metric only the solved alignment.
    fn seeds(self) -> &'static [u32] {
        match self {
            Metric::FaceTurn => &CUBE_SHAPES,
            Metric::Combined => &[SOLVED_SHAPE],
        }
    }

    /// Every state one move away from `index` under this metric, with the
    /// move that leads there. Turns that bring a state back to itself are
    /// not listed unless the layer passes through it on the way round.
    #[must_use]
    pub fn successors(
        self,
        move_tables: &MoveTables,
        index: StateIndex,
    ) -> Vec<(ShapeMove, StateIndex)> {
        let mut successors = vec![(ShapeMove::Twist, move_tables.twist(index))];
        match self {
            Metric::FaceTurn => {
                successors.extend(
                    move_tables
                        .top_turns(index)
                        .map(|(next, top)| (ShapeMove::Turn { top, bottom: 0 }, next)),
                );
                successors.extend(
                    move_tables
                        .bottom_turns(index)
                        .map(|(next, bottom)| (ShapeMove::Turn { top: 0, bottom }, next)),
                );
            }
            Metric::Combined => {
                let tops = iter::once((index, 0)).chain(move_tables.top_turns(index));
                for (after_top, top) in tops {
                    successors.extend(
                        iter::once((after_top, 0))
                            .chain(move_tables.bottom_turns(after_top))
                            .filter(|&(_, bottom)| top != 0 || bottom != 0)
                            .map(|(next, bottom)| (ShapeMove::Turn { top, bottom }, next)),
                    );
                }
            }
        }
        successors
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::FaceTurn => "face-turn",
            Metric::Combined => "combined",
        })
    }
}

impl FromStr for Metric {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "face-turn" | "ftm" => Ok(Metric::FaceTurn),
            "combined" | "wca" => Ok(Metric::Combined),
            _ => Err(ParseMetricError(s.to_owned())),
        }
    }
}

/// The exact number of moves from the nearest seed state to every state.
#[derive(Debug)]
pub struct PruningTable {
    metric: Metric,
    distances: Box<[u8]>,
}

impl PruningTable {
    /// Fill the table by breadth-first search from the metric's seeds. Each
    /// pass expands the states at the current depth, and the search stops
    /// once a pass discovers nothing new.
    ///
    /// # Errors
    ///
    /// If a seed is not a valid state, or if any state is still unreached
    /// when the search stops.
    pub fn generate(
        metric: Metric,
        compositions: &Compositions,
        move_tables: &MoveTables,
    ) -> Result<Self, ConstructionError> {
        info!(start!("Generating {} shape pruning table"), metric);
        let start = Instant::now();

        let mut distances = vec![UNVISITED; STATE_COUNT].into_boxed_slice();
        let mut discovered = 0;
        for &seed in metric.seeds() {
            let index = compositions
                .encode(Shape::from_packed(seed))
                .map_err(|_| ConstructionError::InvalidSeed(seed))?;
            trace!("Seeding {} at state {index}", Shape::from_packed(seed));
            if distances[index.index()] == UNVISITED {
                distances[index.index()] = 0;
                discovered += 1;
            }
        }

        let mut depth = 0;
        loop {
            let discovered_before = discovered;
            for index in StateIndex::all() {
                if distances[index.index()] != depth {
                    continue;
                }
                for (_, next) in metric.successors(move_tables, index) {
                    if distances[next.index()] == UNVISITED {
                        distances[next.index()] = depth + 1;
                        discovered += 1;
                    }
                }
            }
            if discovered == discovered_before {
                break;
            }
            depth += 1;
            debug!(
                working!("Depth {}: {} new states, {} total"),
                depth,
                discovered - discovered_before,
                discovered
            );
        }

        if discovered != STATE_COUNT {
            return Err(ConstructionError::UnreachableStates {
                metric,
                count: STATE_COUNT - discovered,
            });
        }
        info!(
            success!("{} shape pruning table generated in {:.3}s with depth {}"),
            metric,
            start.elapsed().as_secs_f64(),
            depth
        );
        Ok(Self { metric, distances })
    }

    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// The exact distance of `index` to the nearest seed.
    #[must_use]
    pub fn distance(&self, index: StateIndex) -> u8 {
        self.distances[index.index()]
    }

    /// The number of states at each distance, starting from zero.
    #[must_use]
    pub fn depth_histogram(&self) -> Vec<usize> {
        let mut histogram = vec![0; usize::from(self.max_depth()) + 1];
        for &distance in &self.distances {
            histogram[usize::from(distance)] += 1;
        }
        histogram
    }

    /// The largest distance of any state.
    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.distances.iter().copied().max().unwrap_or(0)
    }
}
