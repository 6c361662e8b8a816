//! Image URL pattern.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::shared::validation::FieldErrors;

static IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*\.(jpe?g|png|gif|webp|heic)(\?[^\s]*)?$")
        .expect("image URL pattern is valid")
});

/// Whether `url` is an http(s) URL ending in an image extension.
pub fn is_image_url(url: &str) -> bool {
    IMAGE_URL.is_match(url)
}

/// Record an error for `field` unless `url` is an image URL.
pub fn check_image_url(field: &str, url: &str, errors: &mut FieldErrors) {
    if !is_image_url(url) {
        errors.add(field, "Must be a valid image URL (jpg, jpeg, png, gif, webp, heic)", url);
    }
}
