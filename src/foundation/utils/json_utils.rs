use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Serializes a value as pretty-printed JSON indented with four spaces,
/// the layout used for both the cache files and the config file.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}
