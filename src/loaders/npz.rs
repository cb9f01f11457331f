use std::io::{Cursor, Read};

use super::npy::decode_npy;
use super::LoadedFrames;

/// Local file header signature that starts every zip archive
pub const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Decode array `entry` from an in-memory `.npz` archive
///
/// numpy stores each array as `<name>.npy`; a bare `<name>` member is accepted too.
pub fn load_npz_entry(bytes: &[u8], entry: &str) -> Result<LoadedFrames, String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("failed to read npz archive: {}", e))?;

    let member = [format!("{}.npy", entry), entry.to_string()]
        .into_iter()
        .find(|name| archive.index_for_name(name).is_some())
        .ok_or_else(|| {
            let available: Vec<&str> = archive.file_names().collect();
            format!("archive has no '{}' entry (found: {})", entry, available.join(", "))
        })?;

    let mut file = archive
        .by_name(&member)
        .map_err(|e| format!("failed to open entry '{}': {}", member, e))?;

    let mut data = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut data)
        .map_err(|e| format!("failed to read entry '{}': {}", member, e))?;

    log::debug!("Read {} bytes from npz entry '{}'", data.len(), member);
    decode_npy(&data).map_err(|e| format!("entry '{}': {}", member, e))
}
