//! Tile layer `<data>` decoding.
//!
//! Turns the payload of a layer's `<data>` element into a flat, row-major
//! list of raw 32-bit GIDs (flip bits still set). Supports every layout Tiled
//! writes for finite maps:
//!
//! | `encoding` | `compression` | Payload |
//! |------------|---------------|---------|
//! | (none) | - | one `<tile gid="..."/>` child per cell |
//! | `csv` | - | comma-separated rows |
//! | `base64` | (none), `gzip`, `zlib` | little-endian `u32` stream |
//!
//! Decoding is pure: no I/O beyond the supplied text.

use std::io::Read;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::read::{GzDecoder, ZlibDecoder};
use thiserror::Error;

/// The `encoding` attribute of a `<data>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Explicit `<tile>` nodes.
    #[default]
    None,
    Csv,
    Base64,
}

impl FromStr for Encoding {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Encoding::None),
            "csv" => Ok(Encoding::Csv),
            "base64" => Ok(Encoding::Base64),
            other => Err(DecodeError::UnsupportedFormat {
                kind: "encoding",
                tag: other.to_string(),
            }),
        }
    }
}

/// The `compression` attribute of a `<data>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zlib,
}

impl FromStr for Compression {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Compression::None),
            "gzip" => Ok(Compression::Gzip),
            "zlib" => Ok(Compression::Zlib),
            other => Err(DecodeError::UnsupportedFormat {
                kind: "compression",
                tag: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported tile data {kind}: {tag:?}")]
    UnsupportedFormat { kind: &'static str, tag: String },

    #[error("Expected {expected} tile ids, found {found}")]
    StructuralMismatch { expected: usize, found: usize },

    #[error("Layer of {width}x{height} tiles is too large to decode")]
    GridTooLarge { width: u32, height: u32 },

    #[error("Row {row}: expected {expected} tile ids, found {found}")]
    RowMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Malformed tile id {token:?} at row {row}, column {column}")]
    MalformedNumber {
        row: usize,
        column: usize,
        token: String,
    },

    #[error("Invalid base64 tile data: {0}")]
    MalformedBase64(#[from] base64::DecodeError),

    #[error("Failed to decompress {kind} tile data")]
    DecompressionFailure {
        kind: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Tile data too short: expected {expected} bytes, found {found}")]
    TruncatedData { expected: usize, found: usize },
}

/// Raw content of a `<data>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataContent {
    /// Text payload (CSV or base64, or whitespace-separated ids).
    Text(String),
    /// The `gid` attribute of each `<tile>` child, empty when absent.
    Tiles(Vec<String>),
}

/// A layer's `<data>` element, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerData {
    pub encoding: Encoding,
    pub compression: Compression,
    pub content: DataContent,
}

impl LayerData {
    /// Decode into exactly `width * height` raw GIDs.
    pub fn decode(&self, width: u32, height: u32) -> Result<Vec<u32>, DecodeError> {
        match &self.content {
            DataContent::Tiles(gids) => {
                decode_tokens(gids.iter().map(String::as_str), width, height)
            }
            DataContent::Text(text) => {
                decode(text, width, height, self.encoding, self.compression)
            }
        }
    }
}

/// Decode a text payload into exactly `width * height` raw GIDs.
///
/// `compression` only applies to base64 payloads; Tiled never compresses CSV
/// or node lists, so it is ignored for those.
pub fn decode(
    payload: &str,
    width: u32,
    height: u32,
    encoding: Encoding,
    compression: Compression,
) -> Result<Vec<u32>, DecodeError> {
    match encoding {
        Encoding::None => decode_tokens(payload.split_whitespace(), width, height),
        Encoding::Csv => decode_csv(payload, width, height),
        Encoding::Base64 => decode_base64(payload, width, height, compression),
    }
}

fn cell_count(width: u32, height: u32) -> Result<usize, DecodeError> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(DecodeError::GridTooLarge { width, height })
}

fn parse_gid(token: &str, row: usize, column: usize) -> Result<u32, DecodeError> {
    let token = token.trim();
    // A `<tile/>` node without a gid is an empty cell
    if token.is_empty() {
        return Ok(0);
    }
    token.parse().map_err(|_| DecodeError::MalformedNumber {
        row,
        column,
        token: token.to_string(),
    })
}

fn decode_tokens<'a>(
    tokens: impl Iterator<Item = &'a str>,
    width: u32,
    height: u32,
) -> Result<Vec<u32>, DecodeError> {
    let expected = cell_count(width, height)?;
    let tokens: Vec<&str> = tokens.collect();
    if tokens.len() != expected {
        return Err(DecodeError::StructuralMismatch {
            expected,
            found: tokens.len(),
        });
    }

    let width = width as usize;
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| parse_gid(token, index / width, index % width))
        .collect()
}

fn decode_csv(payload: &str, width: u32, height: u32) -> Result<Vec<u32>, DecodeError> {
    let expected = cell_count(width, height)?;
    // Grown row by row; the declared size is not trusted for allocation
    let mut gids = Vec::new();

    let rows = payload
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let mut row_count = 0;
    for (row, line) in rows.enumerate() {
        row_count += 1;
        if row >= height as usize {
            continue;
        }

        // Tiled ends every row but the last with a comma
        let tokens: Vec<&str> = line
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.len() != width as usize {
            return Err(DecodeError::RowMismatch {
                row,
                expected: width as usize,
                found: tokens.len(),
            });
        }

        for (column, token) in tokens.into_iter().enumerate() {
            gids.push(parse_gid(token, row, column)?);
        }
    }

    if row_count != height as usize {
        return Err(DecodeError::StructuralMismatch {
            expected,
            found: row_count.saturating_mul(width as usize),
        });
    }

    Ok(gids)
}

fn decode_base64(
    payload: &str,
    width: u32,
    height: u32,
    compression: Compression,
) -> Result<Vec<u32>, DecodeError> {
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned.as_bytes())?;

    let bytes = match compression {
        Compression::None => bytes,
        Compression::Gzip => inflate(GzDecoder::new(bytes.as_slice()), "gzip")?,
        Compression::Zlib => inflate(ZlibDecoder::new(bytes.as_slice()), "zlib")?,
    };

    let needed = cell_count(width, height)?
        .checked_mul(4)
        .ok_or(DecodeError::GridTooLarge { width, height })?;
    if bytes.len() < needed {
        return Err(DecodeError::TruncatedData {
            expected: needed,
            found: bytes.len(),
        });
    }

    Ok(bytes[..needed]
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn inflate(mut reader: impl Read, kind: &'static str) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(|source| DecodeError::DecompressionFailure { kind, source })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::{GzEncoder, ZlibEncoder};

    use super::*;

    fn le_bytes(gids: &[u32]) -> Vec<u8> {
        gids.iter().flat_map(|gid| gid.to_le_bytes()).collect()
    }

    fn zlib(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_node_list_exact_count() {
        let data = LayerData {
            encoding: Encoding::None,
            compression: Compression::None,
            content: DataContent::Tiles(
                ["1", "2", "", "2147483651", "0", "7"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
        };
        let gids = data.decode(3, 2).unwrap();
        assert_eq!(gids, vec![1, 2, 0, 0x8000_0003, 0, 7]);
    }

    #[test]
    fn test_node_list_count_mismatch() {
        for (width, height) in [(1, 1), (2, 3), (4, 4)] {
            let count = (width * height) as usize;
            let ok = vec!["1".to_string(); count];
            let short = vec!["1".to_string(); count - 1];
            let long = vec!["1".to_string(); count + 1];

            let decode = |tiles: Vec<String>| {
                LayerData {
                    encoding: Encoding::None,
                    compression: Compression::None,
                    content: DataContent::Tiles(tiles),
                }
                .decode(width, height)
            };

            assert_eq!(decode(ok).unwrap().len(), count);
            assert!(matches!(
                decode(short),
                Err(DecodeError::StructuralMismatch { .. })
            ));
            assert!(matches!(
                decode(long),
                Err(DecodeError::StructuralMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_plain_text_tokens() {
        let gids = decode("1 2\n3 4", 2, 2, Encoding::None, Compression::None).unwrap();
        assert_eq!(gids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_csv_as_written_by_tiled() {
        let payload = "\n1,2,3,\n4,5,6\n";
        let gids = decode(payload, 3, 2, Encoding::Csv, Compression::None).unwrap();
        assert_eq!(gids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_csv_ignores_compression() {
        let gids = decode("1,2,\n3,4", 2, 2, Encoding::Csv, Compression::Zlib).unwrap();
        assert_eq!(gids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_csv_malformed_token_reports_position() {
        let err = decode("1,2,\n3,x4", 2, 2, Encoding::Csv, Compression::None).unwrap_err();
        match err {
            DecodeError::MalformedNumber { row, column, token } => {
                assert_eq!((row, column), (1, 1));
                assert_eq!(token, "x4");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_csv_wrong_shape() {
        assert!(matches!(
            decode("1,2,3,\n4", 3, 2, Encoding::Csv, Compression::None),
            Err(DecodeError::RowMismatch { row: 1, .. })
        ));
        assert!(matches!(
            decode("1,2,3", 3, 2, Encoding::Csv, Compression::None),
            Err(DecodeError::StructuralMismatch { expected: 6, found: 3 })
        ));
    }

    #[test]
    fn test_base64_uncompressed() {
        let gids = [1, 0, 0x4000_0002, 9];
        let payload = STANDARD.encode(le_bytes(&gids));
        let decoded = decode(&payload, 2, 2, Encoding::Base64, Compression::None).unwrap();
        assert_eq!(decoded, gids);
    }

    #[test]
    fn test_base64_zlib_round_trip() {
        for (width, height) in [(1u32, 1u32), (3, 2), (16, 9)] {
            let gids: Vec<u32> = (0..width * height).map(|i| (i * 7) % 23).collect();
            let payload = STANDARD.encode(zlib(&le_bytes(&gids)));
            let decoded =
                decode(&payload, width, height, Encoding::Base64, Compression::Zlib).unwrap();
            assert_eq!(decoded, gids);
        }
    }

    #[test]
    fn test_base64_gzip_with_whitespace() {
        let gids: Vec<u32> = vec![5, 6, 7, 0x8000_0001];
        let encoded = STANDARD.encode(gzip(&le_bytes(&gids)));
        let payload = format!("\n   {encoded}\n  ");
        let decoded = decode(&payload, 4, 1, Encoding::Base64, Compression::Gzip).unwrap();
        assert_eq!(decoded, gids);
    }

    #[test]
    fn test_base64_too_short() {
        let payload = STANDARD.encode(le_bytes(&[1, 2, 3]));
        let err = decode(&payload, 2, 2, Encoding::Base64, Compression::None).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedData {
                expected: 16,
                found: 12
            }
        ));
    }

    #[test]
    fn test_huge_grid_is_an_error() {
        let err = decode("AAAAAA==", 1 << 31, 1 << 31, Encoding::Base64, Compression::None)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::GridTooLarge {
                width: 0x8000_0000,
                height: 0x8000_0000
            }
        ));

        let err = decode("1", u32::MAX, u32::MAX, Encoding::Csv, Compression::None).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::RowMismatch { row: 0, found: 1, .. } | DecodeError::GridTooLarge { .. }
        ));

        let err = decode("1", u32::MAX, u32::MAX, Encoding::None, Compression::None).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::StructuralMismatch { found: 1, .. } | DecodeError::GridTooLarge { .. }
        ));
    }

    #[test]
    fn test_corrupt_zlib_stream() {
        let payload = STANDARD.encode(b"definitely not a zlib stream");
        let err = decode(&payload, 2, 2, Encoding::Base64, Compression::Zlib).unwrap_err();
        assert!(matches!(err, DecodeError::DecompressionFailure { kind: "zlib", .. }));
    }

    #[test]
    fn test_cut_off_gzip_stream() {
        let gids: Vec<u32> = (0..64).collect();
        let compressed = gzip(&le_bytes(&gids));
        let payload = STANDARD.encode(&compressed[..compressed.len() / 2]);
        let err = decode(&payload, 8, 8, Encoding::Base64, Compression::Gzip).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::DecompressionFailure { .. } | DecodeError::TruncatedData { .. }
        ));
    }

    #[test]
    fn test_invalid_base64() {
        let err = decode("@@@@", 1, 1, Encoding::Base64, Compression::None).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedBase64(_)));
    }

    #[test]
    fn test_unknown_tags() {
        assert!(matches!(
            "xml".parse::<Encoding>(),
            Err(DecodeError::UnsupportedFormat { kind: "encoding", .. })
        ));
        assert!(matches!(
            "zstd".parse::<Compression>(),
            Err(DecodeError::UnsupportedFormat { kind: "compression", .. })
        ));
        assert_eq!("".parse::<Encoding>().unwrap(), Encoding::None);
        assert_eq!("gzip".parse::<Compression>().unwrap(), Compression::Gzip);
    }
}
