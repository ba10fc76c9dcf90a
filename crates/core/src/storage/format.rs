use crate::errors::CoreError;

/// Magic bytes identifying a Stockfolio holdings file.
pub const MAGIC: &[u8; 4] = b"SFOL";

/// Current file format version.
pub const CURRENT_VERSION: u16 = 1;

/// Header size in bytes: magic(4) + version(2).
pub const HEADER_SIZE: usize = 6;

/// Write a complete holdings file to bytes.
///
/// Layout:
/// ```text
/// [SFOL: 4B] [version: 2B LE] [payload: variable]
/// ```
pub fn write_file(version: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());

    // Magic
    buf.extend_from_slice(MAGIC);
    // Version
    buf.extend_from_slice(&version.to_le_bytes());
    // Payload
    buf.extend_from_slice(payload);

    buf
}

/// Parse the header from raw file bytes.
/// Returns the format version and the payload slice.
pub fn read_file(data: &[u8]) -> Result<(u16, &[u8]), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a valid SFOL file".into(),
        ));
    }

    // Validate magic bytes
    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes — not an SFOL file".into(),
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    Ok((version, &data[HEADER_SIZE..]))
}
