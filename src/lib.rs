// Copyright 2017, Reizner Evgeniy <razrfalcon@gmail.com>.
// See the COPYRIGHT file at the top-level directory of this distribution.
// Licensed under the MIT license, see the LICENSE file or <http://opensource.org/licenses/MIT>

//! *mmcq-palette* grabs a small representative palette from a set of sampled
//! pixels using MMCQ (Modified Median Cut Quantization), the algorithm behind
//! [color-thief](https://github.com/lokesh/color-thief) and
//! [Leptonica](http://www.leptonica.com/).
//!
//! The core entry point is [`quantize`], which takes already filtered opaque
//! pixels and returns a [`ColorMap`]. The `get_*` functions wrap it with the
//! usual sampling policy for raw image buffers (see [`Options`]).
//!
//! ```
//! use mmcq_palette::{quantize, Color};
//!
//! let pixels = vec![Color::new(200, 10, 10); 50]
//!     .into_iter()
//!     .chain(vec![Color::new(10, 10, 200); 50])
//!     .collect::<Vec<_>>();
//!
//! let cmap = quantize(&pixels, 4).unwrap();
//! assert_eq!(cmap.palette().len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cmap;
pub mod color;
mod histogram;
mod mmcq;
mod pqueue;
pub mod sampling;
mod vbox;

use std::str::FromStr;
use thiserror::Error;

pub use cmap::ColorMap;
pub use histogram::Histogram;
pub use mmcq::{MmcqError, median_cut_apply, quantize};
pub use pqueue::PQueue;
pub use rgb::RGB8 as Color;
pub use sampling::Options;
pub use vbox::{ColorChannel, VBox};

/// Number of significant bits kept per channel in the histogram.
pub const SIGNAL_BITS: u32 = 5;
const RIGHT_SHIFT: u32 = 8 - SIGNAL_BITS;
const MULTIPLIER: u32 = 1 << RIGHT_SHIFT;
/// Number of buckets in the reduced color cube.
pub const HISTOGRAM_SIZE: usize = 1 << (3 * SIGNAL_BITS);
const VBOX_LENGTH: usize = 1 << SIGNAL_BITS;
const FRACTION_BY_POPULATION: f64 = 0.75;
const MAX_ITERATIONS: usize = 1000;
/// Smallest palette size accepted by [`quantize`].
pub const MIN_COLORS: usize = 2;
/// Largest palette size accepted by [`quantize`].
pub const MAX_COLORS: usize = 256;

/// Palette size used by [`get_color`].
const DOMINANT_PALETTE_SIZE: usize = 5;

/// Represent a color format of an underlying image data.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ColorFormat {
    /// Red, Green, Blue color format.
    Rgb,
    /// Red, Green, Blue, Alpha color format.
    Rgba,
    /// Alpha, Red, Green, Blue color format.
    Argb,
    /// Blue, Green, Red color format.
    Bgr,
    /// Blue, Green, Red, Alpha color format.
    Bgra,
}

impl ColorFormat {
    /// Returns the number of channels in a color format.
    pub fn channels(&self) -> usize {
        match self {
            ColorFormat::Rgb => 3,
            ColorFormat::Rgba => 4,
            ColorFormat::Argb => 4,
            ColorFormat::Bgr => 3,
            ColorFormat::Bgra => 4,
        }
    }

    /// Splits the pixel starting at `pos` into `(r, g, b, a)`.
    ///
    /// Formats without alpha report a fully opaque pixel.
    fn color_parts(&self, pixels: &[u8], pos: usize) -> (u8, u8, u8, u8) {
        match self {
            ColorFormat::Rgb => (pixels[pos], pixels[pos + 1], pixels[pos + 2], 255),
            ColorFormat::Rgba => (
                pixels[pos],
                pixels[pos + 1],
                pixels[pos + 2],
                pixels[pos + 3],
            ),
            ColorFormat::Argb => (
                pixels[pos + 1],
                pixels[pos + 2],
                pixels[pos + 3],
                pixels[pos],
            ),
            ColorFormat::Bgr => (pixels[pos + 2], pixels[pos + 1], pixels[pos], 255),
            ColorFormat::Bgra => (
                pixels[pos + 2],
                pixels[pos + 1],
                pixels[pos],
                pixels[pos + 3],
            ),
        }
    }
}

/// Represents an error that can occur during color palette generation.
#[derive(Debug, Error)]
pub enum Error {
    /// There are no pixels to quantize, either because the input was empty
    /// or because every pixel was filtered out.
    #[error("no pixels to quantize")]
    EmptyInput,
    /// The requested palette size is outside of `2..=256`.
    #[error("max_colors should be between 2 and 256, got {0}")]
    InvalidMaxColors(usize),
    /// The sampling stride is zero.
    #[error("quality should be greater than 0, got {0}")]
    InvalidQuality(usize),
    /// The quantizer reached a state its region queue should never produce.
    #[error(transparent)]
    InvariantViolation(#[from] MmcqError),
}

/// Represents an error for invalid input when parsing a color format
#[derive(Debug, Error)]
#[error("invalid color format")]
pub struct ColorParseError;

impl FromStr for ColorFormat {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<ColorFormat, Self::Err> {
        const VARIANTS: &[(&str, ColorFormat)] = &[
            ("rgb", ColorFormat::Rgb),
            ("rgba", ColorFormat::Rgba),
            ("argb", ColorFormat::Argb),
            ("bgr", ColorFormat::Bgr),
            ("bgra", ColorFormat::Bgra),
        ];

        VARIANTS
            .iter()
            .find(|(name, _)| s.eq_ignore_ascii_case(name))
            .map(|(_, fmt)| *fmt)
            .ok_or(ColorParseError)
    }
}

/// Returns the color map built from an image buffer.
///
/// * `pixels` - A raw image data.
/// * `color_format` - Represent a color format of the image data.
/// * `options` - Sampling and filtering policy.
/// * `max_colors` - Maximum number of colors in the palette, between 2 and 256.
///
/// Unlike the other `get_*` functions this ignores [`Options::default_color`]:
/// a buffer without usable pixels is always [`Error::EmptyInput`].
pub fn get_color_map(
    pixels: &[u8],
    color_format: ColorFormat,
    options: &Options,
    max_colors: usize,
) -> Result<ColorMap, Error> {
    let samples = sampling::sample_pixels(pixels, color_format, options)?;
    quantize(&samples, max_colors)
}

/// Returns a representative color palette of an image.
///
/// Colors are ordered from the most to the least significant region
/// (population times volume).
///
/// * `pixels` - A raw image data.
/// * `color_format` - Represent a color format of the image data.
/// * `options` - Sampling and filtering policy.
/// * `max_colors` - Maximum number of colors in the output palette, between 2 and 256.
pub fn get_palette(
    pixels: &[u8],
    color_format: ColorFormat,
    options: &Options,
    max_colors: usize,
) -> Result<Vec<Color>, Error> {
    match get_color_map(pixels, color_format, options, max_colors) {
        Ok(cmap) => Ok(cmap.palette()),
        Err(Error::EmptyInput) => options.default_color.map(|c| vec![c]).ok_or(Error::EmptyInput),
        Err(e) => Err(e),
    }
}

/// Same as [`get_palette`], but each color is paired with the fraction of
/// sampled pixels it represents.
///
/// The default color, if used, gets the whole distribution.
pub fn get_palette_distribution(
    pixels: &[u8],
    color_format: ColorFormat,
    options: &Options,
    max_colors: usize,
) -> Result<Vec<(Color, f64)>, Error> {
    match get_color_map(pixels, color_format, options, max_colors) {
        Ok(cmap) => Ok(cmap.distribution()),
        Err(Error::EmptyInput) => options
            .default_color
            .map(|c| vec![(c, 1.0)])
            .ok_or(Error::EmptyInput),
        Err(e) => Err(e),
    }
}

/// Returns the dominant color of an image.
///
/// This is the first entry of a five color palette.
pub fn get_color(
    pixels: &[u8],
    color_format: ColorFormat,
    options: &Options,
) -> Result<Color, Error> {
    let palette = get_palette(pixels, color_format, options, DOMINANT_PALETTE_SIZE)?;
    palette.first().copied().ok_or(Error::EmptyInput)
}
