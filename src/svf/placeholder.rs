//! `PlaceholderImages`: a pure function of file extension to bytes (§9).
//!
//! Four 1x1 opaque-black fixtures, one per extension the spec names
//! (JPG/PNG/BMP/GIF), embedded at build time with `include_bytes!` rather
//! than generated at runtime — there's no state to own, so a lookup over
//! constants is the whole implementation.

const PNG: &[u8] = include_bytes!("../../assets/placeholders/placeholder.png");
const JPG: &[u8] = include_bytes!("../../assets/placeholders/placeholder.jpg");
const BMP: &[u8] = include_bytes!("../../assets/placeholders/placeholder.bmp");
const GIF: &[u8] = include_bytes!("../../assets/placeholders/placeholder.gif");

/// Returns the placeholder bytes for a URI's extension, or `None` if the
/// extension isn't one of the four known raster kinds.
pub fn for_uri(uri: &str) -> Option<&'static [u8]> {
    let ext = uri.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(PNG),
        "jpg" | "jpeg" => Some(JPG),
        "bmp" => Some(BMP),
        "gif" => Some(GIF),
        _ => None,
    }
}
