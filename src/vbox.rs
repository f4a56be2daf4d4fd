use super::{Color, Histogram, MULTIPLIER, VBOX_LENGTH};
use crate::histogram::reduce;

use std::cmp;
use std::fmt;

/// A channel of the reduced color cube.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorChannel {
    /// Red channel.
    Red,
    /// Green channel.
    Green,
    /// Blue channel.
    Blue,
}

/// A box of the reduced color cube, `[r_min, r_max] x [g_min, g_max] x [b_min, b_max]`
/// with inclusive bounds.
///
/// Statistics are computed once against the histogram the box was created
/// with; a box is never resized in place.
#[derive(Clone, PartialEq, Eq)]
pub struct VBox {
    r_min: u8,
    r_max: u8,
    g_min: u8,
    g_max: u8,
    b_min: u8,
    b_max: u8,
    average: Color,
    volume: u32,
    count: u32,
    populated: u32,
}

impl VBox {
    /// Creates a box and computes its statistics.
    ///
    /// Returns `None` if a range is reversed or reaches past the reduced cube.
    pub fn new(
        r_min: u8,
        r_max: u8,
        g_min: u8,
        g_max: u8,
        b_min: u8,
        b_max: u8,
        histogram: &Histogram,
    ) -> Option<VBox> {
        let max = (VBOX_LENGTH - 1) as u8;
        if r_min > r_max || g_min > g_max || b_min > b_max {
            return None;
        }
        if r_max > max || g_max > max || b_max > max {
            return None;
        }

        let mut vbox = VBox {
            r_min,
            r_max,
            g_min,
            g_max,
            b_min,
            b_max,
            average: Color::new(0, 0, 0),
            volume: 0,
            count: 0,
            populated: 0,
        };
        vbox.calc(histogram);
        Some(vbox)
    }

    /// The smallest box enclosing every pixel of the histogram.
    pub fn enclosing(histogram: &Histogram) -> Option<VBox> {
        let mut r_min = u8::MAX;
        let mut r_max = u8::MIN;
        let mut g_min = u8::MAX;
        let mut g_max = u8::MIN;
        let mut b_min = u8::MAX;
        let mut b_max = u8::MIN;

        for (index, _) in histogram.iter() {
            let (r, g, b) = crate::histogram::coordinates_of(index);
            r_min = cmp::min(r_min, r);
            r_max = cmp::max(r_max, r);
            g_min = cmp::min(g_min, g);
            g_max = cmp::max(g_max, g);
            b_min = cmp::min(b_min, b);
            b_max = cmp::max(b_max, b);
        }

        VBox::new(r_min, r_max, g_min, g_max, b_min, b_max, histogram)
    }

    fn calc(&mut self, histogram: &Histogram) {
        let mut ntot = 0u64;
        let mut populated = 0;
        // Sums are kept in units of MULTIPLIER / 2 so bucket centers stay integral.
        let mut r_sum = 0u64;
        let mut g_sum = 0u64;
        let mut b_sum = 0u64;

        for i in self.r_min..=self.r_max {
            for j in self.g_min..=self.g_max {
                for k in self.b_min..=self.b_max {
                    let hval = histogram.get(i, j, k) as u64;
                    if hval == 0 {
                        continue;
                    }
                    populated += 1;
                    ntot += hval;
                    r_sum += hval * (2 * i as u64 + 1);
                    g_sum += hval * (2 * j as u64 + 1);
                    b_sum += hval * (2 * k as u64 + 1);
                }
            }
        }

        self.count = ntot as u32;
        self.populated = populated;
        self.volume = self.width(ColorChannel::Red)
            * self.width(ColorChannel::Green)
            * self.width(ColorChannel::Blue);

        let half = MULTIPLIER as u64 / 2;
        self.average = if ntot > 0 {
            Color::new(
                channel_average(r_sum * half, ntot),
                channel_average(g_sum * half, ntot),
                channel_average(b_sum * half, ntot),
            )
        } else {
            Color::new(
                self.midpoint(ColorChannel::Red),
                self.midpoint(ColorChannel::Green),
                self.midpoint(ColorChannel::Blue),
            )
        };
    }

    fn midpoint(&self, channel: ColorChannel) -> u8 {
        let (min, max) = self.range(channel);
        let mid = MULTIPLIER * (min as u32 + max as u32 + 1) / 2;
        cmp::min(mid, 255) as u8
    }

    /// Number of buckets covered by the box.
    #[inline]
    pub fn volume(&self) -> u32 {
        self.volume
    }

    /// Number of pixels inside the box.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Population-weighted average color of the box.
    ///
    /// An empty box reports the center of its range instead.
    #[inline]
    pub fn average(&self) -> Color {
        self.average
    }

    /// Whether a cut can give two non-empty boxes, i.e. more than one bucket
    /// of the box holds pixels.
    #[inline]
    pub fn is_splittable(&self) -> bool {
        self.populated > 1
    }

    /// Inclusive bounds along a channel, in reduced coordinates.
    pub fn range(&self, channel: ColorChannel) -> (u8, u8) {
        match channel {
            ColorChannel::Red => (self.r_min, self.r_max),
            ColorChannel::Green => (self.g_min, self.g_max),
            ColorChannel::Blue => (self.b_min, self.b_max),
        }
    }

    /// Number of slices along a channel.
    pub fn width(&self, channel: ColorChannel) -> u32 {
        let (min, max) = self.range(channel);
        max as u32 - min as u32 + 1
    }

    /// Channels ordered from the widest to the narrowest. Equal widths keep
    /// the red, green, blue order.
    pub fn channels_by_width(&self) -> [ColorChannel; 3] {
        let mut channels = [ColorChannel::Red, ColorChannel::Green, ColorChannel::Blue];
        channels.sort_by_key(|&c| cmp::Reverse(self.width(c)));
        channels
    }

    /// A new box with the same bounds except along `channel`.
    pub fn with_range(
        &self,
        channel: ColorChannel,
        min: u8,
        max: u8,
        histogram: &Histogram,
    ) -> Option<VBox> {
        let (r_min, r_max, g_min, g_max, b_min, b_max) = match channel {
            ColorChannel::Red => (min, max, self.g_min, self.g_max, self.b_min, self.b_max),
            ColorChannel::Green => (self.r_min, self.r_max, min, max, self.b_min, self.b_max),
            ColorChannel::Blue => (self.r_min, self.r_max, self.g_min, self.g_max, min, max),
        };
        VBox::new(r_min, r_max, g_min, g_max, b_min, b_max, histogram)
    }

    /// Checks whether a full precision color falls inside the box.
    pub fn contains(&self, color: Color) -> bool {
        let r = reduce(color.r);
        let g = reduce(color.g);
        let b = reduce(color.b);
        (self.r_min..=self.r_max).contains(&r)
            && (self.g_min..=self.g_max).contains(&g)
            && (self.b_min..=self.b_max).contains(&b)
    }
}

impl fmt::Debug for VBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VBox(r: {}..={}, g: {}..={}, b: {}..={}, count: {}, volume: {})",
            self.r_min, self.r_max, self.g_min, self.g_max, self.b_min, self.b_max, self.count,
            self.volume
        )
    }
}

#[inline]
fn channel_average(sum: u64, total: u64) -> u8 {
    cmp::min(sum / total, 255) as u8
}
