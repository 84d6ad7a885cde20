//! Parser for (user, item, rating) triplet files.
//!
//! Each line holds `user<sep>item<sep>rating[<sep>anything else]`, e.g. the
//! MovieLens `ratings.dat` layout `userId::movieId::rating::timestamp`.
//! Fields past the third are ignored.

use crate::error::{DataError, Result};
use crate::types::{RawTriplet, TripletFormat};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a file as ISO-8859-1 (Latin-1) text.
///
/// MovieLens files are Latin-1, where each byte maps directly to a Unicode
/// code point, so the conversion never fails.
fn read_latin1(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Parse a triplet file from disk
pub fn parse_triplets(path: &Path, format: &TripletFormat) -> Result<Vec<RawTriplet>> {
    let content = read_latin1(path)?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let triplets = parse_triplets_str(&content, format, &source)?;
    tracing::debug!("Parsed {} triplets from {}", triplets.len(), source);
    Ok(triplets)
}

/// Parse triplets from in-memory text.
///
/// `source` only names the input in error messages.
pub fn parse_triplets_str(
    content: &str,
    format: &TripletFormat,
    source: &str,
) -> Result<Vec<RawTriplet>> {
    if format.separator.is_empty() {
        return Err(DataError::ParseError {
            file: source.to_string(),
            line: 0,
            reason: "Empty field separator".to_string(),
        });
    }

    let mut triplets = Vec::new();

    for (idx, line) in content.lines().enumerate().skip(format.skip_lines) {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue; // Skip empty lines
        }

        let fields: Vec<&str> = line_trimmed
            .split(format.separator.as_str())
            .take(3)
            .map(str::trim)
            .collect();

        let [user, item, rating] = fields.as_slice() else {
            return Err(DataError::FieldCountMismatch {
                expected: 3,
                found: fields.len(),
                line: line_no,
            });
        };

        if user.is_empty() {
            return Err(DataError::ParseError {
                file: source.to_string(),
                line: line_no,
                reason: "Missing user id".to_string(),
            });
        }
        if item.is_empty() {
            return Err(DataError::ParseError {
                file: source.to_string(),
                line: line_no,
                reason: "Missing item id".to_string(),
            });
        }

        triplets.push((user.to_string(), item.to_string(), rating.to_string()));
    }

    Ok(triplets)
}

/// Parse a train file and a test file in parallel.
///
/// Rayon's `join` runs both closures at once; the first error wins.
pub fn load_split(
    train_path: &Path,
    test_path: &Path,
    format: &TripletFormat,
) -> Result<(Vec<RawTriplet>, Vec<RawTriplet>)> {
    let (train, test) = rayon::join(
        || parse_triplets(train_path, format),
        || parse_triplets(test_path, format),
    );

    let train = train?;
    let test = test?;

    tracing::info!(
        "Loaded {} train and {} test triplets",
        train.len(),
        test.len()
    );
    Ok((train, test))
}
