use std::{collections::HashMap, fs, path::Path};

use super::model::TmEntry;
use super::{hash, normalize};
use crate::error::CoreError;
use crate::services::fsio;

pub(crate) const TM_FILE: &str = "translation_memory.json";

pub fn load() -> Vec<TmEntry> {
    load_from(Path::new(TM_FILE))
}

pub fn save(entries: &[TmEntry]) -> Result<(), CoreError> {
    save_to(Path::new(TM_FILE), entries)
}

pub(crate) fn load_from(path: &Path) -> Vec<TmEntry> {
    if !path.exists() {
        return Vec::new();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", path.display());
            return Vec::new();
        }
    };

    let mut entries: Vec<TmEntry> = match serde_json::from_str(&data) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("failed to parse {}: {e}", path.display());
            return Vec::new();
        }
    };

    let mut migrated = false;

    for e in entries.iter_mut() {
        migrated |= ensure_norm_hash(e);
    }

    let (deduped, removed) = dedup(entries);
    if removed > 0 {
        migrated = true;
    }

    let mut final_entries = deduped;
    sort_entries(&mut final_entries);

    if migrated {
        if let Err(e) = save_to(path, &final_entries) {
            tracing::warn!("failed to persist tm migration: {e}");
        }
    }

    final_entries
}

pub(crate) fn save_to(path: &Path, entries: &[TmEntry]) -> Result<(), CoreError> {
    let mut v: Vec<TmEntry> = entries.to_vec();

    for e in v.iter_mut() {
        ensure_norm_hash(e);
    }

    let (mut v, _removed) = dedup(v);
    sort_entries(&mut v);

    let json = serde_json::to_string_pretty(&v)?;

    fsio::write_atomic(path, json.as_bytes())?;

    Ok(())
}

/// Entries written by older builds may predate the normalized/hash
/// columns.
fn ensure_norm_hash(e: &mut TmEntry) -> bool {
    let mut changed = false;

    if e.normalized.is_empty() {
        e.normalized = normalize::normalize(&e.source_text);
        changed = true;
    }

    if e.hash.is_empty() {
        e.hash = hash::hash_norm(&e.normalized);
        changed = true;
    }

    changed
}

fn dedup(entries: Vec<TmEntry>) -> (Vec<TmEntry>, usize) {
    let mut map: HashMap<(String, String, String), TmEntry> = HashMap::new();
    let mut removed = 0usize;

    for mut e in entries {
        ensure_norm_hash(&mut e);

        let key = (e.source_lang.clone(), e.target_lang.clone(), e.hash.clone());

        match map.get_mut(&key) {
            None => {
                map.insert(key, e);
            }
            Some(existing) => {
                if pick_better(existing, &e) {
                    *existing = e;
                }
                removed += 1;
            }
        }
    }

    let out: Vec<TmEntry> = map.into_values().collect();
    (out, removed)
}

fn pick_better(current: &TmEntry, candidate: &TmEntry) -> bool {
    let cur_empty = current.translation.trim().is_empty();
    let cand_empty = candidate.translation.trim().is_empty();

    if cur_empty && !cand_empty {
        return true;
    }
    if !cur_empty && cand_empty {
        return false;
    }

    candidate.translation.len() > current.translation.len()
}

fn sort_entries(entries: &mut Vec<TmEntry>) {
    entries.sort_by(|a, b| {
        (
            a.source_lang.as_str(),
            a.target_lang.as_str(),
            a.hash.as_str(),
            a.normalized.as_str(),
            a.source_text.as_str(),
            a.translation.as_str(),
        )
            .cmp(&(
                b.source_lang.as_str(),
                b.target_lang.as_str(),
                b.hash.as_str(),
                b.normalized.as_str(),
                b.source_text.as_str(),
                b.translation.as_str(),
            ))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source_text: &str, translation: &str) -> TmEntry {
        TmEntry {
            source_lang: "en_US".into(),
            target_lang: "de_DE".into(),
            source_text: source_text.into(),
            translation: translation.into(),
            normalized: String::new(),
            hash: String::new(),
        }
    }

    #[test]
    fn dedup_keeps_the_better_translation() {
        let (out, removed) = dedup(vec![
            entry("Exposure Active", ""),
            entry("Exposure Active", "Belichtung aktiv"),
        ]);
        assert_eq!(removed, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].translation, "Belichtung aktiv");
    }

    #[test]
    fn missing_norm_and_hash_are_backfilled() {
        let mut e = entry("Invert", "Umkehren");
        assert!(ensure_norm_hash(&mut e));
        assert_eq!(e.normalized, "invert");
        assert!(!e.hash.is_empty());
        assert!(!ensure_norm_hash(&mut e));
    }
}
