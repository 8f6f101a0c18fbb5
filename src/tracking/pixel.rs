//! The tracking pixel payload
//!
//! A fixed 43-byte transparent 1x1 GIF. Served with no-cache headers so
//! mail clients re-request it on every render instead of reusing a cached
//! copy.

/// Transparent 1x1 GIF89a
pub const TRANSPARENT_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // "GIF89a"
    0x01, 0x00, 0x01, 0x00, // 1x1
    0x80, 0x00, 0x00, // global color table of 2 entries
    0x00, 0x00, 0x00, // color 0: black
    0xff, 0xff, 0xff, // color 1: white
    0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, // graphic control: transparent index 0
    0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, // image descriptor
    0x02, 0x02, 0x44, 0x01, 0x00, // image data
    0x3b, // trailer
];

pub const CONTENT_TYPE: &str = "image/gif";
pub const CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate, private";
