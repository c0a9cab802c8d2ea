use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

/// Reads a catalog file to text. TS files are UTF-8 in practice, but
/// editors re-save them with BOMs or as UTF-16 often enough that the
/// loader has to cope.
pub fn read_to_string(path: &Path) -> Result<String, CoreError> {
    let bytes = fs::read(path)?;
    Ok(decode(&bytes))
}

pub fn decode(bytes: &[u8]) -> String {
    // Encoding::decode BOM-sniffs UTF-8/UTF-16 before falling back to
    // the given encoding
    if has_bom(bytes) {
        return UTF_8.decode(bytes).0.into_owned();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(
            encoding = encoding.name(),
            "decoded with replacement characters"
        );
    }
    text.into_owned()
}

pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult, CoreError> {
    let bytes = fs::read(path)?;
    Ok(detect_from_bytes(&bytes))
}

pub fn detect_from_bytes(bytes: &[u8]) -> EncodingDetectionResult {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return bom_result("utf-8-sig", "utf-8");
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return bom_result("utf-16le", "utf-16");
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return bom_result("utf-16be", "utf-16");
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);

    let encoding = detector.guess(None, true);
    let best = encoding.name().to_lowercase();
    let confidence = estimate_confidence(bytes, encoding);

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    // common ambiguities for the Latin-script catalogs we see
    if best == "windows-1252" {
        candidates.push(EncodingCandidate {
            name: "iso-8859-1".into(),
            confidence: (confidence - 0.03).max(0.0),
        });
    } else if best == "iso-8859-1" {
        candidates.push(EncodingCandidate {
            name: "windows-1252".into(),
            confidence: (confidence - 0.02).max(0.0),
        });
    }

    if best == "utf-8" {
        candidates.push(EncodingCandidate {
            name: "utf-8-sig".into(),
            confidence: (confidence - 0.20).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        candidates,
    }
}

fn bom_result(best: &str, alt: &str) -> EncodingDetectionResult {
    EncodingDetectionResult {
        best: best.into(),
        confidence: 0.99,
        candidates: vec![
            EncodingCandidate {
                name: best.into(),
                confidence: 0.99,
            },
            EncodingCandidate {
                name: alt.into(),
                confidence: 0.90,
            },
        ],
    }
}

fn has_bom(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xEF, 0xBB, 0xBF])
        || bytes.starts_with(&[0xFF, 0xFE])
        || bytes.starts_with(&[0xFE, 0xFF])
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}
