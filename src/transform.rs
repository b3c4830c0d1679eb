// Copyright (C) 2026 pixscram developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use rand::prelude::*;
use thiserror::Error;

/// One RGB pixel. Images are normalized to 3-channel color before the
/// transform core ever sees them; there is no alpha.
pub type Pixel = [u8; 3];

/// Channel offset used when the caller does not pick one.
pub const DEFAULT_OFFSET_KEY: u8 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("permutation has {permutation} indices but the image has {pixels} pixels")]
    LengthMismatch { permutation: usize, pixels: usize },

    #[error("permutation is not a bijection: index {0} is duplicated or out of range")]
    NotBijective(u32),
}

/// Bijective mapping from shuffled pixel position to original position.
///
/// `indices()[i]` is where the pixel now sitting at shuffled position `i`
/// belongs in the original row-major order. A `Permutation` is validated on
/// construction, so [`unshuffle`] only has to check its length against the
/// buffer it is applied to.
///
/// Indices are `u32`: the key artifact stays compact and the `image` crate
/// caps dimensions at `u32` anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<u32>);

impl Permutation {
    /// Builds a permutation from raw indices, rejecting duplicates and
    /// out-of-range values.
    pub fn from_indices(indices: Vec<u32>) -> Result<Self, TransformError> {
        let mut seen = vec![false; indices.len()];
        for &i in &indices {
            match seen.get_mut(i as usize) {
                Some(s) if !*s => *s = true,
                _ => return Err(TransformError::NotBijective(i)),
            }
        }
        Ok(Permutation(indices))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }
}

/// Reorders `pixels` by a freshly drawn uniform permutation.
///
/// Returns the shuffled buffer together with the permutation that produced
/// it; the caller must persist the permutation or the shuffle is
/// irreversible. Pass a seeded [`Rng`] for a reproducible result.
pub fn shuffle<R: Rng + ?Sized>(pixels: &[Pixel], random: &mut R) -> (Vec<Pixel>, Permutation) {
    let mut indices: Vec<u32> = (0..pixels.len() as u32).collect();
    indices.shuffle(random);

    let shuffled = indices.iter().map(|&i| pixels[i as usize]).collect();
    (shuffled, Permutation(indices))
}

/// Scatters each shuffled pixel back to its original position.
///
/// `permutation` must be the one returned by the matching [`shuffle`] call.
/// A permutation of the wrong length is reported instead of producing a
/// silently corrupted image.
pub fn unshuffle(
    pixels: &[Pixel],
    permutation: &Permutation,
) -> Result<Vec<Pixel>, TransformError> {
    if permutation.len() != pixels.len() {
        return Err(TransformError::LengthMismatch {
            permutation: permutation.len(),
            pixels: pixels.len(),
        });
    }

    let mut original = vec![[0u8; 3]; pixels.len()];
    for (shuffled_pos, &original_pos) in permutation.indices().iter().enumerate() {
        original[original_pos as usize] = pixels[shuffled_pos];
    }
    Ok(original)
}

/// Adds `key` to every channel of every pixel, wrapping mod 256.
pub fn offset_apply(pixels: &mut [Pixel], key: u8) {
    for pixel in pixels {
        for channel in pixel {
            *channel = channel.wrapping_add(key);
        }
    }
}

/// Subtracts `key` from every channel, wrapping mod 256. Exact inverse of
/// [`offset_apply`] for any key.
pub fn offset_reverse(pixels: &mut [Pixel], key: u8) {
    for pixel in pixels {
        for channel in pixel {
            *channel = channel.wrapping_sub(key);
        }
    }
}
