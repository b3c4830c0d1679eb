//! Main program for pixscram
//! Run with `--help` for more instruction

// Copyright (C) 2026 pixscram developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};
use clap::{Parser, Subcommand};
use image::codecs::jpeg::JpegEncoder;
use image::io::Reader as ImageReader;
use image::{ImageFormat, RgbImage};
use log::{info, warn};
use rand::SeedableRng;
use sha2::{Digest, Sha256};

use pixscram::{keyfile, transform};
use pixscram::{Pixel, DEFAULT_OFFSET_KEY};

// The original tool always saved JPEG at this quality.
const JPEG_QUALITY: u8 = 85;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shuffle pixels, offset channels and write the key file
    Encrypt {
        /// Input image (PNG/JPEG)
        input: PathBuf,

        /// Output image
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Where to write the permutation key
        #[arg(short = 'k', long)]
        key_file: PathBuf,

        /// Channel offset, 0-255
        #[arg(long, default_value_t = DEFAULT_OFFSET_KEY)]
        offset_key: u8,

        /// Random seed, for a reproducible permutation
        #[arg(long)]
        seed: Option<String>,
    },

    /// Reverse a previous encrypt using its key file
    Decrypt {
        /// Encrypted image
        input: PathBuf,

        /// Output image
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Permutation key written by encrypt
        #[arg(short = 'k', long)]
        key_file: PathBuf,

        /// Channel offset used when encrypting
        #[arg(long, default_value_t = DEFAULT_OFFSET_KEY)]
        offset_key: u8,
    },
}

fn main() -> Result<(), Error> {
    env_logger::init();

    match Args::parse().command {
        Command::Encrypt {
            input,
            output,
            key_file,
            offset_key,
            seed,
        } => encrypt(&input, &output, &key_file, offset_key, seed),
        Command::Decrypt {
            input,
            output,
            key_file,
            offset_key,
        } => decrypt(&input, &output, &key_file, offset_key),
    }
}

fn encrypt(
    input: &Path,
    output: &Path,
    key_file: &Path,
    offset_key: u8,
    seed: Option<String>,
) -> Result<(), Error> {
    let im = load_rgb(input)?;
    let (width, height) = im.dimensions();
    let pixels = to_pixels(&im);

    let mut random = if let Some(seed) = seed {
        let mut hasher = Sha256::new();
        hasher.update(seed);

        rand_xoshiro::Xoshiro256StarStar::from_seed(hasher.finalize().into())
    } else {
        rand_xoshiro::Xoshiro256StarStar::from_entropy()
    };

    let (mut encrypted, permutation) = transform::shuffle(&pixels, &mut random);
    transform::offset_apply(&mut encrypted, offset_key);

    keyfile::write(key_file, &permutation)
        .with_context(|| format!("Failed to write key file {}", key_file.display()))?;
    info!("key saved to {}", key_file.display());

    if is_lossy(output) {
        warn!(
            "saving the encrypted image as JPEG is lossy and will break decryption; \
             use a .png output to get the original back exactly"
        );
    }
    save_rgb(output, width, height, encrypted)?;
    info!("encrypted image saved to {}", output.display());

    Ok(())
}

fn decrypt(input: &Path, output: &Path, key_file: &Path, offset_key: u8) -> Result<(), Error> {
    let permutation = keyfile::read(key_file)
        .with_context(|| format!("Failed to read key file {}", key_file.display()))?;

    let im = load_rgb(input)?;
    let (width, height) = im.dimensions();
    let mut pixels = to_pixels(&im);

    transform::offset_reverse(&mut pixels, offset_key);
    let original = transform::unshuffle(&pixels, &permutation)
        .context("Key file does not match this image")?;

    save_rgb(output, width, height, original)?;
    info!("decrypted image saved to {}", output.display());

    Ok(())
}

fn load_rgb(path: &Path) -> Result<RgbImage, Error> {
    let im = ImageReader::new(BufReader::new(
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
    ))
    .with_guessed_format()?
    .decode()
    .with_context(|| format!("Failed to decode {}", path.display()))?;

    let pixel_count = u64::from(im.width()) * u64::from(im.height());
    if pixel_count > u64::from(u32::MAX) {
        bail!("Image has too many pixels ({pixel_count}) for the key format");
    }

    Ok(im.into_rgb8())
}

fn to_pixels(im: &RgbImage) -> Vec<Pixel> {
    im.pixels().map(|p| p.0).collect()
}

fn save_rgb(path: &Path, width: u32, height: u32, pixels: Vec<Pixel>) -> Result<(), Error> {
    let im = RgbImage::from_raw(width, height, pixels.concat())
        .expect("Pixel buffer matches image dimensions");

    if is_lossy(path) {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
        encoder.encode_image(&im)?;
    } else {
        im.save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }
    Ok(())
}

fn is_lossy(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(e) if e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg")
    )
}
