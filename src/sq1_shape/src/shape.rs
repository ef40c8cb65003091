//! The piece-width layout of both outer layers and the three elementary
//! moves acting on it.
//!
//! A layer is a 12-bit mask over its twelve 30° slots, read clockwise from
//! the slot just right of the middle-layer cut (bit 11) round to the slot
//! just left of it (bit 0). A set bit is covered by a corner, which always
//! takes two adjacent bits; a clear bit is an edge. The low six bits are the
//! half of the layer that the middle-layer twist swaps.

use std::fmt;
use thiserror::Error;

/// The only 6-slot tilings by corners (`11`) and edges (`0`), ascending.
pub const HALF_LAYERS: [u32; 13] = [
    0x00, 0x03, 0x06, 0x0c, 0x0f, 0x18, 0x1b, 0x1e, 0x30, 0x33, 0x36, 0x3c, 0x3f,
];

/// All twelve slots of one layer.
pub const LAYER_MASK: u32 = 0xfff;

/// The half of a layer on the twisting side of the cut.
const TWIST_HALF: u32 = 0x03f;

/// Eight corners of width two.
pub const CORNER_SLOTS: u32 = 16;

/// Sub-steps of 30° in a whole layer rotation.
pub const FULL_TURN: u8 = 12;

/// The four cube shapes, written as `parity << 24 | top << 12 | bottom`.
pub const CUBE_SHAPES: [u32; 4] = [0x0db66db, 0x1db6db6, 0x16db6db, 0x06dbdb6];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Composition {top:#05x}/{bottom:#05x} is not a physically reachable shape")]
    InvalidComposition { top: u32, bottom: u32 },
    #[error("State index {0} is out of range, expected a value below {max}", max = crate::STATE_COUNT)]
    InvalidIndex(usize),
    #[error("Parity must be 0 or 1 but got {0}")]
    InvalidParity(u8),
    #[error("A layer of this shape cannot be turned by {units} units of 30°")]
    InvalidTurn { units: u8 },
}

/// One shape: both layers plus the parity bit that tells apart the two
/// states sharing a composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    pub top: u32,
    pub bottom: u32,
    pub parity: bool,
}

impl Shape {
    /// Split a packed `parity << 24 | top << 12 | bottom` value.
    #[must_use]
    pub fn from_packed(shape2: u32) -> Self {
        Self {
            top: (shape2 >> 12) & LAYER_MASK,
            bottom: shape2 & LAYER_MASK,
            parity: (shape2 >> 24) & 1 != 0,
        }
    }

    /// The 24-bit composition, top layer in the high half.
    #[must_use]
    pub fn composition(&self) -> u32 {
        self.top << 12 | self.bottom
    }

    #[must_use]
    pub fn packed(&self) -> u32 {
        u32::from(self.parity) << 24 | self.composition()
    }

    /// Whether both layers have the layout of a solved cube, in any of the
    /// four cut alignments. Parity is not considered.
    #[must_use]
    pub fn is_cube_shape(&self) -> bool {
        CUBE_SHAPES
            .iter()
            .any(|&cube_shape| cube_shape & 0xff_ffff == self.composition())
    }

    /// Rotate the top layer to its next valid cut position, returning the
    /// number of 30° units used (1 to 6).
    pub fn top_move(&mut self) -> u8 {
        rotate_layer(&mut self.top, &mut self.parity)
    }

    /// Rotate the bottom layer to its next valid cut position, returning the
    /// number of 30° units used (1 to 6).
    pub fn bottom_move(&mut self) -> u8 {
        rotate_layer(&mut self.bottom, &mut self.parity)
    }

    /// Turn the middle layer 180°, exchanging the twisting half of the top
    /// layer with the twisting half of the bottom layer. The bottom layer is
    /// seen upside down, so its twisting half is its high six bits.
    pub fn twist_move(&mut self) {
        let top_half = self.top & TWIST_HALF;
        let top_corners = top_half.count_ones();
        let bottom_corners = (self.bottom & (TWIST_HALF << 6)).count_ones();
        // Flips when both swapped halves hold an odd number of corners.
        self.parity ^= (top_corners & bottom_corners) & 2 != 0;

        self.top = (self.top & (TWIST_HALF << 6)) | ((self.bottom >> 6) & TWIST_HALF);
        self.bottom = (self.bottom & TWIST_HALF) | top_half << 6;
    }
}

/// Rotate one layer by the fewest 30° units that leave the cut between two
/// whole pieces again.
fn rotate_layer(layer: &mut u32, parity: &mut bool) -> u8 {
    let mut units = 0;
    let mut move_parity = false;
    loop {
        if *layer & 0x800 == 0 {
            // An edge leads; it re-enters at bit 0 as a clear bit.
            units += 1;
            *layer <<= 1;
        } else {
            // A corner covers bits 11 and 10. Shifting by two pushes it to
            // bits 13 and 12, and the xor moves it back down to bits 1 and 0.
            units += 2;
            *layer = (*layer << 2) ^ 0x3003;
        }
        move_parity = !move_parity;
        // An odd count of corner slots on the twisting side means a corner
        // straddles the cut.
        if (*layer & TWIST_HALF).count_ones() & 1 == 0 {
            break;
        }
    }
    // Only a layer with an even number of corners carries the step parity
    // over into the state parity.
    if layer.count_ones() & 2 == 0 {
        *parity ^= move_parity;
    }
    units
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:03x}/{:03x}/{}",
            self.top,
            self.bottom,
            u8::from(self.parity)
        )
    }
}
