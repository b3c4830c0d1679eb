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

//! Key artifact persistence.
//!
//! A key file stores the permutation needed to unshuffle an image. Two
//! formats are understood:
//!
//! * Versioned (always written): a header line
//!   `pixscram-key v1 <count> <sha256-hex>` followed by one line of
//!   comma-separated decimal indices. The digest covers the index line, so
//!   truncation and editing are caught before a decrypt scrambles the image.
//! * Legacy (read only): a bare comma-separated index list with no header,
//!   no length, no checksum.
//!
//! Either way the parsed permutation is checked for bijectivity before it
//! is handed back.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::transform::{Permutation, TransformError};

const MAGIC: &str = "pixscram-key";
const VERSION: &str = "v1";

#[derive(Debug, Error)]
pub enum KeyfileError {
    #[error("key file I/O failed")]
    Io(#[from] std::io::Error),

    #[error("key file contains a malformed index: {0:?}")]
    Parse(String),

    #[error("malformed key file header: {0:?}")]
    Header(String),

    #[error("unsupported key file version {0:?}")]
    Version(String),

    #[error("key file header declares {declared} indices but the body has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("key file checksum mismatch, the file is truncated or edited")]
    ChecksumMismatch,

    #[error(transparent)]
    InvalidPermutation(#[from] TransformError),
}

/// Writes `permutation` to `path` in the versioned format.
pub fn write(path: &Path, permutation: &Permutation) -> Result<(), KeyfileError> {
    let body = permutation
        .indices()
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let contents = format!(
        "{MAGIC} {VERSION} {} {}\n{body}\n",
        permutation.len(),
        hex_digest(body.as_bytes()),
    );
    fs::write(path, contents)?;
    Ok(())
}

/// Reads a permutation from `path`, accepting both formats.
pub fn read(path: &Path) -> Result<Permutation, KeyfileError> {
    let text = fs::read_to_string(path)?;
    let indices = if text.starts_with(MAGIC) {
        parse_versioned(&text)?
    } else {
        parse_indices(text.trim())?
    };
    Ok(Permutation::from_indices(indices)?)
}

fn parse_versioned(text: &str) -> Result<Vec<u32>, KeyfileError> {
    let (header, body) = text
        .split_once('\n')
        .ok_or_else(|| KeyfileError::Header(text.to_owned()))?;

    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() != 4 || fields[0] != MAGIC {
        return Err(KeyfileError::Header(header.to_owned()));
    }
    if fields[1] != VERSION {
        return Err(KeyfileError::Version(fields[1].to_owned()));
    }
    let declared: usize = fields[2]
        .parse()
        .map_err(|_| KeyfileError::Header(header.to_owned()))?;

    let body = body.trim_end();
    if hex_digest(body.as_bytes()) != fields[3] {
        return Err(KeyfileError::ChecksumMismatch);
    }

    let indices = parse_indices(body)?;
    if indices.len() != declared {
        return Err(KeyfileError::LengthMismatch {
            declared,
            actual: indices.len(),
        });
    }
    Ok(indices)
}

fn parse_indices(body: &str) -> Result<Vec<u32>, KeyfileError> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    body.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<u32>()
                .map_err(|_| KeyfileError::Parse(token.to_owned()))
        })
        .collect()
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn permutation() -> Permutation {
        Permutation::from_indices(vec![2, 0, 1]).unwrap()
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.key");

        write(&path, &permutation()).unwrap();
        assert_eq!(read(&path).unwrap(), permutation());
    }

    #[test]
    fn empty_permutation_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.key");

        let empty = Permutation::from_indices(Vec::new()).unwrap();
        write(&path, &empty).unwrap();
        assert_eq!(read(&path).unwrap(), empty);
    }

    #[test]
    fn legacy_bare_list_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.key");

        fs::write(&path, "2,0,1").unwrap();
        assert_eq!(read(&path).unwrap(), permutation());
    }

    #[test]
    fn edited_body_fails_the_checksum() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edited.key");

        write(&path, &permutation()).unwrap();
        let tampered = fs::read_to_string(&path).unwrap().replace("2,0,1", "1,0,2");
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            read(&path).unwrap_err(),
            KeyfileError::ChecksumMismatch
        ));
    }

    #[test]
    fn malformed_index_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.key");

        fs::write(&path, "2,zero,1").unwrap();
        assert!(matches!(
            read(&path).unwrap_err(),
            KeyfileError::Parse(token) if token == "zero"
        ));
    }

    #[test]
    fn header_count_must_match_body() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.key");

        let body = "2,0,1";
        let contents = format!("{MAGIC} {VERSION} 4 {}\n{body}\n", hex_digest(body.as_bytes()));
        fs::write(&path, contents).unwrap();

        assert!(matches!(
            read(&path).unwrap_err(),
            KeyfileError::LengthMismatch {
                declared: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.key");

        let body = "0";
        let contents = format!("{MAGIC} v9 1 {}\n{body}\n", hex_digest(body.as_bytes()));
        fs::write(&path, contents).unwrap();

        assert!(matches!(
            read(&path).unwrap_err(),
            KeyfileError::Version(v) if v == "v9"
        ));
    }

    #[test]
    fn non_bijective_key_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dupes.key");

        fs::write(&path, "0,0,2").unwrap();
        assert!(matches!(
            read(&path).unwrap_err(),
            KeyfileError::InvalidPermutation(TransformError::NotBijective(0))
        ));
    }
}
