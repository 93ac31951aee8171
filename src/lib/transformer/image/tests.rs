use image::{Rgb, RgbImage};
use tempfile::TempDir;

use super::{InvertCache, mean_lightness};
use crate::config::BuildOptions;

fn options() -> BuildOptions {
    BuildOptions {
        no_preview: true,
        ..BuildOptions::default()
    }
}

fn solid(width: u32, height: u32, px: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(px))
}

#[test]
fn lightness_extremes() {
    assert!(mean_lightness(&solid(4, 4, [0, 0, 0])) < 0.01);
    assert!(mean_lightness(&solid(4, 4, [255, 255, 255])) > 0.99);
    // Mid gray sits in the middle.
    let mid = mean_lightness(&solid(4, 4, [128, 128, 128]));
    assert!((mid - 0.5).abs() < 0.01, "{mid}");
}

#[test]
fn dark_image_is_invertible_light_one_is_not() {
    let tmp = TempDir::new().unwrap();
    let dark_path = tmp.path().join("dark.png");
    solid(8, 8, [10, 10, 10]).save(&dark_path).unwrap();
    let light_path = tmp.path().join("light.png");
    solid(8, 8, [240, 240, 240]).save(&light_path).unwrap();

    let cache = InvertCache::new(tmp.path(), &options()).unwrap();
    assert_eq!(cache.local_is_invertible("/dark.png"), Some(true));
    assert_eq!(cache.local_is_invertible("/light.png"), Some(false));
    // Deterministic on repeat (memoized).
    assert_eq!(cache.local_is_invertible("/dark.png"), Some(true));
}

#[test]
fn unreadable_image_yields_no_verdict() {
    let tmp = TempDir::new().unwrap();
    let cache = InvertCache::new(tmp.path(), &options()).unwrap();
    assert_eq!(cache.local_is_invertible("/missing.png"), None);
}

#[test]
fn threshold_sits_at_the_configured_lightness() {
    // L = 0.09 corresponds to channel value 23; a pixel just below
    // inverts, one just above does not.
    let tmp = TempDir::new().unwrap();
    let below = tmp.path().join("below.png");
    solid(8, 8, [20, 20, 20]).save(&below).unwrap();
    let above = tmp.path().join("above.png");
    solid(8, 8, [26, 26, 26]).save(&above).unwrap();

    let cache = InvertCache::new(tmp.path(), &options()).unwrap();
    assert_eq!(cache.local_is_invertible("/below.png"), Some(true));
    assert_eq!(cache.local_is_invertible("/above.png"), Some(false));
}
