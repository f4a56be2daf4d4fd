use super::{Color, VBox};

use std::cmp::Reverse;

/// The result of a quantization: retained boxes with their average colors,
/// ordered from the largest to the smallest `count * volume`.
#[derive(Clone, Debug)]
pub struct ColorMap {
    vboxes: Vec<VBox>,
}

impl ColorMap {
    pub(crate) fn new<I>(vboxes: I) -> ColorMap
    where
        I: IntoIterator<Item = VBox>,
    {
        // Stable, so boxes with the same product keep the order they came in.
        let mut vboxes: Vec<VBox> = vboxes.into_iter().collect();
        vboxes.sort_by_key(|v| Reverse(v.count() as u64 * v.volume() as u64));
        ColorMap { vboxes }
    }

    /// Average colors of the retained boxes.
    pub fn palette(&self) -> Vec<Color> {
        self.vboxes.iter().map(VBox::average).collect()
    }

    /// Average colors paired with the fraction of pixels in their box.
    pub fn distribution(&self) -> Vec<(Color, f64)> {
        let total: u64 = self.vboxes.iter().map(|v| v.count() as u64).sum();
        self.vboxes
            .iter()
            .map(|v| {
                let fraction = if total > 0 {
                    v.count() as f64 / total as f64
                } else {
                    0.0
                };
                (v.average(), fraction)
            })
            .collect()
    }

    /// Maps a color to the average color of the first box containing it,
    /// falling back to [`ColorMap::nearest`].
    pub fn lookup(&self, color: Color) -> Color {
        self.vboxes
            .iter()
            .find(|v| v.contains(color))
            .map(VBox::average)
            .unwrap_or_else(|| self.nearest(color))
    }

    /// The palette color with the smallest Euclidean distance to `color`.
    /// Ties go to the first one in palette order.
    pub fn nearest(&self, color: Color) -> Color {
        self.vboxes
            .iter()
            .map(VBox::average)
            .min_by_key(|c| color_distance(c, &color))
            .unwrap_or(color)
    }

    /// Retained boxes in palette order.
    pub fn iter(&self) -> impl Iterator<Item = &VBox> {
        self.vboxes.iter()
    }

    /// Number of colors in the palette.
    pub fn len(&self) -> usize {
        self.vboxes.len()
    }

    /// Returns `true` if the palette has no colors.
    pub fn is_empty(&self) -> bool {
        self.vboxes.is_empty()
    }
}

/// Squared Euclidean distance, which orders colors like the distance itself.
#[inline]
fn color_distance(c1: &Color, c2: &Color) -> u32 {
    let dr = c1.r.abs_diff(c2.r) as u32;
    let dg = c1.g.abs_diff(c2.g) as u32;
    let db = c1.b.abs_diff(c2.b) as u32;
    dr * dr + dg * dg + db * db
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize;

    #[test]
    fn lookup_finds_containing_box() {
        let mut pixels = vec![Color::new(250, 5, 5); 20];
        pixels.extend(vec![Color::new(5, 5, 250); 10]);
        let cmap = quantize(&pixels, 2).unwrap();
        assert_eq!(cmap.len(), 2);

        let red = cmap.lookup(Color::new(250, 5, 5));
        let blue = cmap.lookup(Color::new(5, 5, 250));
        assert!(red.r > 200 && red.b < 50);
        assert!(blue.b > 200 && blue.r < 50);
    }

    fn two_bucket_map() -> (ColorMap, VBox, VBox) {
        let histogram =
            crate::Histogram::from_pixels(&[Color::new(0, 0, 0), Color::new(64, 0, 0)]);
        let a = VBox::new(0, 0, 0, 0, 0, 0, &histogram).unwrap();
        let b = VBox::new(8, 8, 0, 0, 0, 0, &histogram).unwrap();
        let cmap = ColorMap {
            vboxes: vec![a.clone(), b.clone()],
        };
        (cmap, a, b)
    }

    #[test]
    fn equal_products_keep_push_order() {
        let (_, a, b) = two_bucket_map();
        assert_eq!(a.count() as u64 * a.volume() as u64, b.count() as u64 * b.volume() as u64);

        let cmap = ColorMap::new(vec![a.clone(), b.clone()]);
        assert_eq!(cmap.palette(), vec![a.average(), b.average()]);
        let cmap = ColorMap::new(vec![b.clone(), a.clone()]);
        assert_eq!(cmap.palette(), vec![b.average(), a.average()]);
    }

    #[test]
    fn larger_product_comes_first() {
        let histogram = crate::Histogram::from_pixels(&[
            Color::new(0, 0, 0),
            Color::new(64, 0, 0),
            Color::new(64, 0, 0),
        ]);
        let small = VBox::new(0, 0, 0, 0, 0, 0, &histogram).unwrap();
        let large = VBox::new(8, 8, 0, 0, 0, 0, &histogram).unwrap();
        let cmap = ColorMap::new(vec![small.clone(), large.clone()]);
        assert_eq!(cmap.palette(), vec![large.average(), small.average()]);
    }

    #[test]
    fn lookup_falls_back_to_nearest() {
        let (cmap, _, b) = two_bucket_map();
        let white = Color::new(255, 255, 255);
        assert!(cmap.iter().all(|v| !v.contains(white)));
        assert_eq!(cmap.lookup(white), b.average());
        assert_eq!(cmap.lookup(Color::new(70, 1, 2)), b.average());
    }

    #[test]
    fn nearest_prefers_first_on_ties() {
        let (cmap, a, b) = two_bucket_map();
        // averages are (4, 4, 4) and (68, 4, 4); 36 is equally far from both
        assert_eq!(cmap.nearest(Color::new(36, 4, 4)), a.average());
        assert_eq!(cmap.nearest(Color::new(37, 4, 4)), b.average());
    }

    #[test]
    fn order_is_descending_product() {
        let mut pixels = vec![Color::new(10, 10, 10); 5];
        pixels.extend(vec![Color::new(200, 100, 50); 50]);
        pixels.extend(vec![Color::new(100, 200, 150); 20]);
        let cmap = quantize(&pixels, 4).unwrap();
        let products: Vec<u64> = cmap
            .iter()
            .map(|v| v.count() as u64 * v.volume() as u64)
            .collect();
        assert!(products.windows(2).all(|w| w[0] >= w[1]));
    }
}
