use std::path::Path;

use crate::error::CoreError;
use crate::model::catalog::Catalog;
use crate::model::message::MessageStatus;
use crate::services::{
    merge::{self, MergeReport},
    translation_memory::{hash, matcher, model::TmEntry, normalize, store},
};

pub struct UpdateConfig<'a> {
    pub source_lang: &'a str,
    pub target_lang: &'a str,
    pub drop_vanished: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct UpdateReport {
    pub merge: MergeReport,
    pub tm_filled: usize,
    pub tm_learned: usize,
}

/// Fills unfinished messages from the TM by exact normalized match.
/// Plural messages are skipped; a flat TM hit cannot supply numerus
/// forms.
pub fn fill_from_tm(
    catalog: &mut Catalog,
    tm_entries: &[TmEntry],
    source_lang: &str,
    target_lang: &str,
) -> usize {
    let mut filled = 0usize;

    for ctx in catalog.contexts.iter_mut() {
        for msg in ctx.messages.iter_mut() {
            if msg.status != MessageStatus::Unfinished || msg.numerus {
                continue;
            }
            if !msg.translation.trim().is_empty() {
                continue;
            }

            if let Some(hit) = matcher::exact_match(tm_entries, source_lang, target_lang, &msg.source)
            {
                msg.translation = hit.translation.clone();
                msg.status = MessageStatus::Finished;
                filled += 1;
            }
        }
    }

    filled
}

/// The catalog update flow: reconcile with a freshly extracted template,
/// fill what the TM already knows, then harvest the finished pairs back
/// into the TM store.
pub fn update(
    catalog: &Catalog,
    template: &Catalog,
    cfg: UpdateConfig,
) -> Result<(Catalog, UpdateReport), CoreError> {
    update_with_store(catalog, template, cfg, Path::new(store::TM_FILE))
}

fn update_with_store(
    catalog: &Catalog,
    template: &Catalog,
    cfg: UpdateConfig,
    tm_path: &Path,
) -> Result<(Catalog, UpdateReport), CoreError> {
    let (mut merged, merge_report) = merge::merge(catalog, template, cfg.drop_vanished);

    let mut tm_entries = store::load_from(tm_path);

    let tm_filled = fill_from_tm(&mut merged, &tm_entries, cfg.source_lang, cfg.target_lang);

    let mut tm_learned = 0usize;
    for ctx in &merged.contexts {
        for msg in &ctx.messages {
            if msg.status != MessageStatus::Finished || msg.numerus {
                continue;
            }
            if msg.translation.trim().is_empty() {
                continue;
            }
            if matcher::exact_match(&tm_entries, cfg.source_lang, cfg.target_lang, &msg.source)
                .is_some()
            {
                continue;
            }

            let norm = normalize::normalize(&msg.source);
            let h = hash::hash_norm(&norm);

            tm_entries.push(TmEntry {
                source_lang: cfg.source_lang.to_string(),
                target_lang: cfg.target_lang.to_string(),
                source_text: msg.source.clone(),
                translation: msg.translation.clone(),
                normalized: norm,
                hash: h,
            });
            tm_learned += 1;
        }
    }

    store::save_to(tm_path, &tm_entries)?;

    Ok((
        merged,
        UpdateReport {
            merge: merge_report,
            tm_filled,
            tm_learned,
        },
    ))
}
