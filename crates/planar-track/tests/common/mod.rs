#![allow(dead_code)]

use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random piecewise-constant texture: `block x block` cells of random grey.
pub fn block_texture(width: u32, height: u32, block: u32, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let cols = width.div_ceil(block);
    let rows = height.div_ceil(block);
    let levels: Vec<u8> = (0..cols * rows).map(|_| rng.random_range(0..=255)).collect();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([levels[((y / block) * cols + x / block) as usize]])
    })
}

/// `background` with `patch` pasted at integer offset `(dx, dy)`.
pub fn paste(background: &GrayImage, patch: &GrayImage, dx: u32, dy: u32) -> GrayImage {
    let mut out = background.clone();
    for (x, y, p) in patch.enumerate_pixels() {
        let (tx, ty) = (x + dx, y + dy);
        if tx < out.width() && ty < out.height() {
            out.put_pixel(tx, ty, *p);
        }
    }
    out
}
