use super::{Color, HISTOGRAM_SIZE, RIGHT_SHIFT, SIGNAL_BITS, VBOX_LENGTH};

use rayon::prelude::*;

/// Pixels handled by one worker when the histogram is built in parallel.
const CHUNK_SIZE: usize = 1 << 16;

/// Number of pixels in each bucket of the reduced color cube.
///
/// Built once per quantization and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u32>,
    total: u32,
}

impl Histogram {
    /// Builds a histogram over the reduced color cube.
    ///
    /// Large inputs are split into chunks counted in parallel, and the partial
    /// histograms are summed bucket by bucket.
    pub fn from_pixels(pixels: &[Color]) -> Histogram {
        let counts = pixels
            .par_chunks(CHUNK_SIZE)
            .map(|chunk| {
                let mut counts = vec![0; HISTOGRAM_SIZE];
                for pixel in chunk {
                    counts[index_of_pixel(*pixel)] += 1;
                }
                counts
            })
            .reduce_with(merge_partial)
            .unwrap_or_else(|| vec![0; HISTOGRAM_SIZE]);

        let total = counts.iter().sum();
        Histogram { counts, total }
    }

    /// Number of pixels in the bucket at the given reduced coordinates.
    ///
    /// Coordinates past the reduced cube hold no pixels.
    #[inline]
    pub fn get(&self, red: u8, green: u8, blue: u8) -> u32 {
        let max = (VBOX_LENGTH - 1) as u8;
        if red > max || green > max || blue > max {
            return 0;
        }
        self.counts[make_color_index_of(red, green, blue)]
    }

    /// Number of pixels the histogram was built from.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Number of non-empty buckets.
    pub fn len(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Returns `true` if no pixel was counted.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterates over non-empty buckets as `(index, count)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(i, &c)| (i, c))
    }
}

fn merge_partial(mut a: Vec<u32>, b: Vec<u32>) -> Vec<u32> {
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
    a
}

/// Reduces a channel value to the histogram precision.
#[inline]
pub(crate) fn reduce(value: u8) -> u8 {
    value >> RIGHT_SHIFT
}

/// Get reduced-space color index for a pixel.
#[inline]
pub(crate) fn make_color_index_of(red: u8, green: u8, blue: u8) -> usize {
    ((red as usize) << (2 * SIGNAL_BITS)) + ((green as usize) << SIGNAL_BITS) + blue as usize
}

/// Splits a cube index back into reduced coordinates.
#[inline]
pub(crate) fn coordinates_of(index: usize) -> (u8, u8, u8) {
    let mask = (1 << SIGNAL_BITS) - 1;
    (
        (index >> (2 * SIGNAL_BITS)) as u8,
        ((index >> SIGNAL_BITS) & mask) as u8,
        (index & mask) as u8,
    )
}

#[inline]
fn index_of_pixel(pixel: Color) -> usize {
    make_color_index_of(reduce(pixel.r), reduce(pixel.g), reduce(pixel.b))
}
