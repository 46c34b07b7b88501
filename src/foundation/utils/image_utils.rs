use lofty::picture::PictureInformation;

/// Reads the pixel size of a JPEG or PNG image from its header.
///
/// Returns `None` for other formats and for headers without a frame size.
pub fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let info = if data.starts_with(b"\x89PNG") {
        PictureInformation::from_png(data).ok()?
    } else if data.starts_with(&[0xff, 0xd8, 0xff]) {
        PictureInformation::from_jpeg(data).ok()?
    } else {
        return None;
    };

    if info.width == 0 || info.height == 0 {
        return None;
    }
    Some((info.width, info.height))
}
