//! The canonical numbering of shapes.
//!
//! Every valid composition gets an ordinal from its position in a sorted
//! table, and a state index is that ordinal with the parity bit appended.

use crate::{
    ConstructionError,
    shape::{CORNER_SLOTS, HALF_LAYERS, LAYER_MASK, Shape, ShapeError},
};
use itertools::{Itertools, iproduct};
use log::debug;
use std::fmt;

/// Four half-layers whose slots hold exactly eight corners.
pub const COMPOSITION_COUNT: usize = 3678;

/// Compositions times the two parities.
pub const STATE_COUNT: usize = COMPOSITION_COUNT * 2;

/// Dense handle of a shape state, in `0..STATE_COUNT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateIndex(pub(crate) u16);

impl StateIndex {
    pub(crate) fn from_parts(ordinal: usize, parity: bool) -> Self {
        Self((ordinal << 1 | usize::from(parity)) as u16)
    }

    /// Position of the composition in the canonical table.
    #[must_use]
    pub fn ordinal(self) -> usize {
        usize::from(self.0 >> 1)
    }

    #[must_use]
    pub fn parity(self) -> bool {
        self.0 & 1 != 0
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Every state index in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..STATE_COUNT as u16).map(Self)
    }
}

impl TryFrom<usize> for StateIndex {
    type Error = ShapeError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        if index < STATE_COUNT {
            Ok(Self(index as u16))
        } else {
            Err(ShapeError::InvalidIndex(index))
        }
    }
}

impl From<StateIndex> for usize {
    fn from(index: StateIndex) -> Self {
        index.index()
    }
}

impl fmt::Display for StateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The sorted table of every composition a Square-1 can physically take.
#[derive(Debug)]
pub struct Compositions(Box<[u32]>);

impl Compositions {
    /// Enumerate all compositions of four half-layers with sixteen corner
    /// slots in total. Half-layers are combined most significant first from
    /// an ascending list, so the result comes out sorted.
    ///
    /// # Errors
    ///
    /// If the result is not exactly `COMPOSITION_COUNT` strictly ascending
    /// values.
    pub fn enumerate() -> Result<Self, ConstructionError> {
        let compositions = iproduct!(HALF_LAYERS, HALF_LAYERS, HALF_LAYERS, HALF_LAYERS)
            .map(|(top_left, top_right, bottom_left, bottom_right)| {
                top_left << 18 | top_right << 12 | bottom_left << 6 | bottom_right
            })
            .filter(|composition| composition.count_ones() == CORNER_SLOTS)
            .collect_vec();

        if compositions.len() != COMPOSITION_COUNT {
            return Err(ConstructionError::WrongCompositionCount {
                expected: COMPOSITION_COUNT,
                actual: compositions.len(),
            });
        }
        if !compositions.iter().tuple_windows().all(|(a, b)| a < b) {
            return Err(ConstructionError::UnsortedCompositions);
        }
        debug!("Enumerated {} shape compositions", compositions.len());
        Ok(Self(compositions.into_boxed_slice()))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// The ordinal of `composition`, if it is a valid shape.
    #[must_use]
    pub fn ordinal(&self, composition: u32) -> Option<usize> {
        self.0.binary_search(&composition).ok()
    }

    /// Find the state index of a shape.
    ///
    /// # Errors
    ///
    /// If either layer does not fit in twelve bits or the pair is not a
    /// valid composition.
    pub fn encode(&self, shape: Shape) -> Result<StateIndex, ShapeError> {
        let invalid = ShapeError::InvalidComposition {
            top: shape.top,
            bottom: shape.bottom,
        };
        if shape.top > LAYER_MASK || shape.bottom > LAYER_MASK {
            return Err(invalid);
        }
        self.ordinal(shape.composition())
            .map(|ordinal| StateIndex::from_parts(ordinal, shape.parity))
            .ok_or(invalid)
    }

    #[must_use]
    pub fn decode(&self, index: StateIndex) -> Shape {
        let composition = self.0[index.ordinal()];
        Shape {
            top: composition >> 12,
            bottom: composition & LAYER_MASK,
            parity: index.parity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_enumerate_size_and_order() {
        let compositions = Compositions::enumerate().unwrap();
        let slice = compositions.as_slice();
        assert_eq!(slice.len(), COMPOSITION_COUNT);
        assert!(slice.iter().all(|composition| composition.count_ones() == 16));
        assert!(slice.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test_log::test]
    fn test_round_trip_every_state() {
        let compositions = Compositions::enumerate().unwrap();
        for index in StateIndex::all() {
            let shape = compositions.decode(index);
            assert_eq!(compositions.encode(shape), Ok(index));
        }
    }

    #[test_log::test]
    fn test_parity_is_low_bit() {
        let compositions = Compositions::enumerate().unwrap();
        let shape = Shape::from_packed(0x0db66db);
        let even = compositions.encode(shape).unwrap();
        let odd = compositions
            .encode(Shape {
                parity: true,
                ..shape
            })
            .unwrap();
        assert_eq!(even.ordinal(), odd.ordinal());
        assert_eq!(even.index() + 1, odd.index());
        assert!(!even.parity());
        assert!(odd.parity());
    }

    #[test_log::test]
    fn test_invalid_compositions() {
        let compositions = Compositions::enumerate().unwrap();
        // Too many corners
        assert_eq!(
            compositions.encode(Shape {
                top: 0xfff,
                bottom: 0xfff,
                parity: false
            }),
            Err(ShapeError::InvalidComposition {
                top: 0xfff,
                bottom: 0xfff
            })
        );
        // A corner straddling the twisting cut
        assert!(
            compositions
                .encode(Shape {
                    top: 0xd9b << 1 & LAYER_MASK,
                    bottom: 0xdb6,
                    parity: false
                })
                .is_err()
        );
        // A bottom layer spilling into the top layer's bits
        assert!(
            compositions
                .encode(Shape {
                    top: 0,
                    bottom: 0xdb66db,
                    parity: false
                })
                .is_err()
        );
    }

    #[test_log::test]
    fn test_state_index_bounds() {
        assert!(StateIndex::try_from(STATE_COUNT - 1).is_ok());
        assert_eq!(
            StateIndex::try_from(STATE_COUNT),
            Err(ShapeError::InvalidIndex(STATE_COUNT))
        );
        assert_eq!(StateIndex::all().count(), STATE_COUNT);
    }
}
