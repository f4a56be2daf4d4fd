#[macro_use]
extern crate bencher;
extern crate mmcq_palette;

use bencher::Bencher;
use mmcq_palette::{Color, ColorFormat, Options};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn random_buffer(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..len * 4)
        .map(|i| if i % 4 == 3 { 255 } else { rng.random() })
        .collect()
}

fn quantize_10(bencher: &mut Bencher) {
    let mut rng = StdRng::seed_from_u64(1);
    let pixels: Vec<Color> = (0..100_000)
        .map(|_| Color::new(rng.random(), rng.random(), rng.random()))
        .collect();
    bencher.iter(|| mmcq_palette::quantize(&pixels, 10).unwrap());
}

fn quantize_256(bencher: &mut Bencher) {
    let mut rng = StdRng::seed_from_u64(2);
    let pixels: Vec<Color> = (0..100_000)
        .map(|_| Color::new(rng.random(), rng.random(), rng.random()))
        .collect();
    bencher.iter(|| mmcq_palette::quantize(&pixels, 256).unwrap());
}

fn palette_from_buffer(bencher: &mut Bencher) {
    let buffer = random_buffer(640 * 480);
    let options = Options {
        quality: 10,
        ..Options::default()
    };
    bencher.iter(|| {
        mmcq_palette::get_palette(&buffer, ColorFormat::Rgba, &options, 10).unwrap()
    });
}

benchmark_group!(benches, quantize_10, quantize_256, palette_from_buffer);
benchmark_main!(benches);
