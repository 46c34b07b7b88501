mod image_utils;
mod json_utils;
mod string_utils;

pub use image_utils::image_dimensions;
pub use json_utils::to_pretty_json;
pub use string_utils::*;

#[cfg(test)]
pub(crate) use image_utils::tests::jpeg_header;
