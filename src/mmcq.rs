use super::{
    Color, ColorChannel, ColorMap, Error, FRACTION_BY_POPULATION, Histogram, MAX_COLORS,
    MAX_ITERATIONS, MIN_COLORS, PQueue, VBOX_LENGTH, VBox,
};

use log::{debug, trace};
use std::cmp;

/// List of all errors.
#[derive(Clone, Copy, PartialEq, Debug, thiserror::Error)]
pub enum MmcqError {
    /// A VBox without any pixel was handed to the median cut. The queue only
    /// ever holds non-empty boxes, so this means its bookkeeping is broken.
    #[error("cannot cut an empty VBox")]
    EmptyVBox,
    /// No cut plane was found for a VBox holding more than one populated bucket.
    #[error("failed to cut a VBox")]
    VBoxCutFailed,
}

/// Builds a palette of at most `max_colors` colors from `pixels`.
///
/// The pixels are expected to be already filtered; each one counts.
/// `max_colors` should be between 2 and 256.
pub fn quantize(pixels: &[Color], max_colors: usize) -> Result<ColorMap, Error> {
    if pixels.is_empty() {
        return Err(Error::EmptyInput);
    }
    if !(MIN_COLORS..=MAX_COLORS).contains(&max_colors) {
        return Err(Error::InvalidMaxColors(max_colors));
    }

    let histogram = Histogram::from_pixels(pixels);
    let vbox = VBox::enclosing(&histogram).ok_or(Error::EmptyInput)?;
    debug!(
        "quantizing {} pixels in {} buckets into {} colors",
        pixels.len(),
        histogram.len(),
        max_colors
    );

    // First set of colors, sorted by population.
    let mut pq = PQueue::new(count_key);
    pq.push(vbox);
    let target = (FRACTION_BY_POPULATION * max_colors as f64).ceil() as usize;
    iterate(&mut pq, target, &histogram)?;

    // Re-sort by the product of pixel occupancy times the size in color space.
    let mut pq2 = PQueue::new(product_key);
    for vbox in pq.drain_sorted() {
        pq2.push(vbox);
    }
    iterate(&mut pq2, max_colors, &histogram)?;

    Ok(ColorMap::new(pq2.drain_sorted()))
}

/// Splits `queue` until it holds `target` boxes, every box left is terminal,
/// or the iteration limit is reached.
fn iterate<K, F>(
    queue: &mut PQueue<VBox, K, F>,
    target: usize,
    histogram: &Histogram,
) -> Result<(), MmcqError>
where
    K: Ord,
    F: Fn(&VBox) -> K,
{
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS && queue.len() < target {
        iterations += 1;
        let Some(vbox) = queue.pop() else {
            break;
        };

        // Terminal boxes sort below the others, so nothing is left to cut.
        if !vbox.is_splittable() {
            queue.push(vbox);
            debug!("every box is terminal at {} colors", queue.len());
            break;
        }

        let (vbox1, vbox2) = median_cut_apply(histogram, &vbox)?;
        queue.push(vbox1);
        if let Some(vbox2) = vbox2 {
            queue.push(vbox2);
        }
    }

    debug!(
        "phase finished with {} colors after {} iterations (target {})",
        queue.len(),
        iterations,
        target
    );
    Ok(())
}

fn count_key(vbox: &VBox) -> (bool, u32) {
    (vbox.is_splittable(), vbox.count())
}

fn product_key(vbox: &VBox) -> (bool, u64) {
    (
        vbox.is_splittable(),
        vbox.count() as u64 * vbox.volume() as u64,
    )
}

/// Cuts a box in two at the population median of its widest channel.
///
/// A box whose pixels all sit in one bucket cannot be cut and is returned
/// as `(copy, None)`.
pub fn median_cut_apply(
    histogram: &Histogram,
    vbox: &VBox,
) -> Result<(VBox, Option<VBox>), MmcqError> {
    if vbox.count() == 0 {
        return Err(MmcqError::EmptyVBox);
    }
    if vbox.count() == 1 || !vbox.is_splittable() {
        return Ok((vbox.clone(), None));
    }

    // The widest channel is preferred; a channel whose pixels all fall in
    // one slice would leave an empty half, so the next one is tried.
    for axis in vbox.channels_by_width() {
        let sums = PartialSums::compute(histogram, vbox, axis);
        if sums.populated_slices < 2 {
            continue;
        }
        let (vbox1, vbox2) = cut(axis, vbox, histogram, &sums)?;
        return Ok((vbox1, Some(vbox2)));
    }

    Err(MmcqError::VBoxCutFailed)
}

/// Cumulative population of a box along one channel.
struct PartialSums {
    total: u32,
    /// Pixels in all slices up to and including the index; `None` outside the box.
    partial: [Option<u32>; VBOX_LENGTH],
    populated_slices: usize,
}

impl PartialSums {
    fn compute(histogram: &Histogram, vbox: &VBox, axis: ColorChannel) -> PartialSums {
        let mut total = 0;
        let mut partial = [None; VBOX_LENGTH];
        let mut populated_slices = 0;

        let (min, max) = vbox.range(axis);
        let (o1, o2) = match axis {
            ColorChannel::Red => (ColorChannel::Green, ColorChannel::Blue),
            ColorChannel::Green => (ColorChannel::Red, ColorChannel::Blue),
            ColorChannel::Blue => (ColorChannel::Red, ColorChannel::Green),
        };
        let (o1_min, o1_max) = vbox.range(o1);
        let (o2_min, o2_max) = vbox.range(o2);

        for i in min..=max {
            let mut sum = 0;
            for j in o1_min..=o1_max {
                for k in o2_min..=o2_max {
                    sum += match axis {
                        ColorChannel::Red => histogram.get(i, j, k),
                        ColorChannel::Green => histogram.get(j, i, k),
                        ColorChannel::Blue => histogram.get(j, k, i),
                    };
                }
            }
            if sum > 0 {
                populated_slices += 1;
            }
            total += sum;
            partial[i as usize] = Some(total);
        }

        PartialSums {
            total,
            partial,
            populated_slices,
        }
    }

    /// Partial sum at `i`, zero outside the box.
    fn partial_at(&self, i: i32) -> u32 {
        usize::try_from(i)
            .ok()
            .and_then(|i| self.partial.get(i).copied().flatten())
            .unwrap_or(0)
    }

    /// Pixels in all slices above `i`, zero outside the box.
    fn look_ahead_at(&self, i: i32) -> u32 {
        usize::try_from(i)
            .ok()
            .and_then(|i| self.partial.get(i).copied().flatten())
            .map_or(0, |p| self.total - p)
    }
}

fn cut(
    axis: ColorChannel,
    vbox: &VBox,
    histogram: &Histogram,
    sums: &PartialSums,
) -> Result<(VBox, VBox), MmcqError> {
    let (vbox_min, vbox_max) = vbox.range(axis);
    let (vbox_min, vbox_max) = (vbox_min as i32, vbox_max as i32);
    let total = sums.total;

    let i = (vbox_min..=vbox_max)
        .find(|&i| 2 * sums.partial_at(i) as u64 > total as u64)
        .ok_or(MmcqError::VBoxCutFailed)?;

    let left = i - vbox_min;
    let right = vbox_max - i;

    // Cut halfway into the larger side.
    let mut d2 = if left <= right {
        cmp::min(vbox_max - 1, i + right / 2)
    } else {
        // floor(i - 1 - left / 2)
        cmp::max(vbox_min, i - 1 - (left + 1) / 2)
    };

    // Avoid 0-count boxes.
    while d2 < vbox_max && sums.partial_at(d2) == 0 {
        d2 += 1;
    }
    while sums.look_ahead_at(d2) == 0 && sums.partial_at(d2 - 1) > 0 {
        d2 -= 1;
    }

    if d2 < vbox_min || d2 >= vbox_max {
        return Err(MmcqError::VBoxCutFailed);
    }

    let vbox1 = vbox
        .with_range(axis, vbox_min as u8, d2 as u8, histogram)
        .ok_or(MmcqError::VBoxCutFailed)?;
    let vbox2 = vbox
        .with_range(axis, (d2 + 1) as u8, vbox_max as u8, histogram)
        .ok_or(MmcqError::VBoxCutFailed)?;

    trace!(
        "cut {:?} at {}: {} + {} pixels",
        axis,
        d2,
        vbox1.count(),
        vbox2.count()
    );
    Ok((vbox1, vbox2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram_of(colors: &[(u8, u8, u8)]) -> Histogram {
        let pixels: Vec<Color> = colors.iter().map(|&(r, g, b)| Color::new(r, g, b)).collect();
        Histogram::from_pixels(&pixels)
    }

    #[test]
    fn single_pixel_is_not_cut() {
        let histogram = histogram_of(&[(10, 20, 30)]);
        let vbox = VBox::enclosing(&histogram).unwrap();
        let (vbox1, vbox2) = median_cut_apply(&histogram, &vbox).unwrap();
        assert_eq!(vbox1, vbox);
        assert!(vbox2.is_none());
    }

    #[test]
    fn single_bucket_is_not_cut() {
        let histogram = histogram_of(&[(255, 0, 0); 10]);
        let vbox = VBox::enclosing(&histogram).unwrap();
        let (vbox1, vbox2) = median_cut_apply(&histogram, &vbox).unwrap();
        assert_eq!(vbox1.count(), 10);
        assert!(vbox2.is_none());
    }

    #[test]
    fn empty_box_is_an_error() {
        let histogram = histogram_of(&[(0, 0, 0)]);
        let vbox = VBox::new(4, 8, 0, 0, 0, 0, &histogram).unwrap();
        assert_eq!(
            median_cut_apply(&histogram, &vbox),
            Err(MmcqError::EmptyVBox)
        );
    }

    #[test]
    fn cut_splits_widest_channel() {
        // Red spans 0..=31, green and blue a single slice.
        let histogram = histogram_of(&[(0, 0, 0), (0, 0, 0), (255, 0, 0), (255, 0, 0)]);
        let vbox = VBox::enclosing(&histogram).unwrap();
        let (vbox1, vbox2) = median_cut_apply(&histogram, &vbox).unwrap();
        let vbox2 = vbox2.unwrap();

        // Slice 31 is the first past half the population.
        // left = 31 > right = 0, d2 = max(0, floor(31 - 1 - 15.5)) = 14
        assert_eq!(vbox1.range(ColorChannel::Red), (0, 14));
        assert_eq!(vbox2.range(ColorChannel::Red), (15, 31));
        assert_eq!(vbox1.range(ColorChannel::Green), (0, 0));
        assert_eq!(vbox1.count(), 2);
        assert_eq!(vbox2.count(), 2);
    }

    #[test]
    fn cut_moves_toward_the_larger_side() {
        // Pixels at red slices 0 (x3) and 31 (x1): the median is slice 0.
        let histogram = histogram_of(&[(0, 0, 0), (0, 0, 0), (0, 0, 0), (255, 0, 0)]);
        let vbox = VBox::enclosing(&histogram).unwrap();
        let (vbox1, vbox2) = median_cut_apply(&histogram, &vbox).unwrap();
        let vbox2 = vbox2.unwrap();

        // i = 0, left = 0 <= right = 31, d2 = min(30, 0 + 15) = 15
        assert_eq!(vbox1.range(ColorChannel::Red), (0, 15));
        assert_eq!(vbox2.range(ColorChannel::Red), (16, 31));
        assert_eq!(vbox1.count(), 3);
        assert_eq!(vbox2.count(), 1);
    }

    #[test]
    fn flat_widest_channel_falls_back_to_next() {
        // Red is the widest channel but holds every pixel in one slice,
        // blue separates them.
        let histogram = histogram_of(&[(0, 0, 0), (0, 0, 64)]);
        let vbox = VBox::new(0, 31, 0, 7, 0, 31, &histogram).unwrap();
        assert_eq!(vbox.channels_by_width()[0], ColorChannel::Red);

        let (vbox1, vbox2) = median_cut_apply(&histogram, &vbox).unwrap();
        let vbox2 = vbox2.unwrap();
        assert_eq!(vbox1.range(ColorChannel::Red), (0, 31));
        assert_eq!(vbox1.range(ColorChannel::Blue), (0, 7));
        assert_eq!(vbox2.range(ColorChannel::Blue), (8, 31));
        assert_eq!(vbox1.count(), 1);
        assert_eq!(vbox2.count(), 1);
    }

    #[test]
    fn cut_children_partition_the_parent() {
        let colors: Vec<(u8, u8, u8)> = (0..=255u8)
            .step_by(5)
            .map(|v| (v, v.wrapping_mul(7), 255 - v))
            .collect();
        let histogram = histogram_of(&colors);
        let vbox = VBox::enclosing(&histogram).unwrap();
        let (vbox1, vbox2) = median_cut_apply(&histogram, &vbox).unwrap();
        let vbox2 = vbox2.unwrap();
        assert_eq!(vbox1.count() + vbox2.count(), vbox.count());
        assert!(vbox1.count() > 0 && vbox2.count() > 0);
        for &(r, g, b) in &colors {
            let c = Color::new(r, g, b);
            assert!(vbox1.contains(c) ^ vbox2.contains(c));
        }
    }

    #[test]
    fn quantize_rejects_bad_arguments() {
        let pixels = vec![Color::new(1, 2, 3); 4];
        assert!(matches!(quantize(&[], 4), Err(Error::EmptyInput)));
        assert!(matches!(quantize(&pixels, 1), Err(Error::InvalidMaxColors(1))));
        assert!(matches!(
            quantize(&pixels, 257),
            Err(Error::InvalidMaxColors(257))
        ));
    }

    #[test]
    fn two_colors_stop_at_two_boxes() {
        let mut pixels = vec![Color::new(200, 10, 10); 30];
        pixels.extend(vec![Color::new(10, 10, 200); 10]);
        let cmap = quantize(&pixels, 8).unwrap();
        assert_eq!(cmap.len(), 2);
    }
}
