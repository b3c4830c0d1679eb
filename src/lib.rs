//! Library to reversibly scramble image pixel data.
//!
//! Two engines make up the core:
//!
//! * [transform::shuffle] / [transform::unshuffle] reorder pixels by a
//!   uniformly random permutation and scatter them back.
//! * [transform::offset_apply] / [transform::offset_reverse] add or
//!   subtract a constant from every color channel, mod 256.
//!
//! Encrypting is shuffle then offset; decrypting is offset-reverse then
//! unshuffle, with the permutation persisted through [keyfile] in between.
//! The permutation IS the key: this hides an image from casual viewing,
//! nothing more.

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
//

pub mod keyfile;
pub mod transform;

#[doc(inline)]
pub use crate::keyfile::KeyfileError;
#[doc(inline)]
pub use crate::transform::{
    offset_apply, offset_reverse, shuffle, unshuffle, Permutation, Pixel, TransformError,
    DEFAULT_OFFSET_KEY,
};
