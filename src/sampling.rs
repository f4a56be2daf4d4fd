//! Turning a raw image buffer into the pixels fed to the quantizer.

use super::{Color, ColorFormat, Error};

/// Sampling and filtering policy applied before quantization.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Options {
    /// Step size for sampling pixels. 1 looks at every pixel, larger values
    /// are faster but may miss colors.
    pub quality: usize,
    /// Pixels with a smaller alpha are skipped.
    pub alpha_threshold: u8,
    /// A pixel is white when every channel is above this value.
    pub white_threshold: u8,
    /// A pixel is black when every channel is below this value.
    pub black_threshold: u8,
    /// Skip white pixels.
    pub skip_white: bool,
    /// Skip black pixels.
    pub skip_black: bool,
    /// Color returned by the palette functions when no pixel survives the filter.
    pub default_color: Option<Color>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            quality: 1,
            alpha_threshold: 100,
            white_threshold: 0xF0,
            black_threshold: 0x0F,
            skip_white: true,
            skip_black: true,
            default_color: None,
        }
    }
}

impl Options {
    /// Returns `true` if all channels are above the white threshold.
    pub fn is_white(&self, color: Color) -> bool {
        color.r > self.white_threshold
            && color.g > self.white_threshold
            && color.b > self.white_threshold
    }

    /// Returns `true` if all channels are below the black threshold.
    pub fn is_black(&self, color: Color) -> bool {
        color.r < self.black_threshold
            && color.g < self.black_threshold
            && color.b < self.black_threshold
    }

    fn keeps(&self, color: Color, alpha: u8) -> bool {
        if alpha < self.alpha_threshold {
            return false;
        }
        !(self.skip_white && self.is_white(color)) && !(self.skip_black && self.is_black(color))
    }
}

/// Collects every `quality`-th pixel of `pixels` that passes the filter.
///
/// A trailing partial pixel is ignored.
pub fn sample_pixels(
    pixels: &[u8],
    color_format: ColorFormat,
    options: &Options,
) -> Result<Vec<Color>, Error> {
    let colors_count = color_format.channels();
    let step = match colors_count.checked_mul(options.quality) {
        Some(step) if step > 0 => step,
        _ => return Err(Error::InvalidQuality(options.quality)),
    };

    // Estimate final length of `samples` from the for loop
    let mut samples = Vec::with_capacity(pixels.len() / step + 1);

    for i in (0..pixels.len()).step_by(step) {
        if i + colors_count > pixels.len() {
            break;
        }
        let (r, g, b, a) = color_format.color_parts(pixels, i);
        let color = Color::new(r, g, b);
        if options.keeps(color, a) {
            samples.push(color);
        }
    }

    Ok(samples)
}
