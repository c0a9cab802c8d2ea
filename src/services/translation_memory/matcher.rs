use super::model::TmEntry;
use super::{hash, normalize};

pub fn exact_match<'a>(
    entries: &'a [TmEntry],
    source_lang: &str,
    target_lang: &str,
    source_text: &str,
) -> Option<&'a TmEntry> {
    let trimmed = source_text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let norm = normalize::normalize(trimmed);
    let h = hash::hash_norm(&norm);

    entries.iter().find(|e| {
        e.source_lang == source_lang
            && e.target_lang == target_lang
            && e.hash == h
            && e.normalized == norm
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source_text: &str, translation: &str) -> TmEntry {
        let normalized = normalize::normalize(source_text);
        let hash = hash::hash_norm(&normalized);
        TmEntry {
            source_lang: "en_US".into(),
            target_lang: "de_DE".into(),
            source_text: source_text.into(),
            translation: translation.into(),
            normalized,
            hash,
        }
    }

    #[test]
    fn matches_modulo_normalization() {
        let entries = vec![entry("Exposure Active", "Belichtung aktiv")];
        let hit = exact_match(&entries, "en_US", "de_DE", "  exposure ACTIVE ").unwrap();
        assert_eq!(hit.translation, "Belichtung aktiv");
    }

    #[test]
    fn language_pair_must_match() {
        let entries = vec![entry("Invert", "Umkehren")];
        assert!(exact_match(&entries, "en_US", "fr_FR", "Invert").is_none());
    }

    #[test]
    fn empty_lookup_never_matches() {
        let entries = vec![entry("", "")];
        assert!(exact_match(&entries, "en_US", "de_DE", "   ").is_none());
    }
}
