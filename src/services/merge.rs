use std::collections::HashMap;

use serde::Serialize;

use crate::model::catalog::{Catalog, Context};
use crate::model::message::{Message, MessageStatus};

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct MergeReport {
    /// Template messages not previously in the catalog, added unfinished.
    pub added: usize,
    /// Active messages still referenced by the template.
    pub kept: usize,
    /// Vanished/obsolete messages that reappeared in the template.
    pub revived: usize,
    /// Active messages no longer referenced, now marked vanished.
    pub vanished: usize,
    /// Messages pruned instead of kept as vanished.
    pub dropped: usize,
}

/// The extraction-tooling lifecycle step: reconcile a translated catalog
/// with a freshly extracted template. Translations survive by
/// `(context, source, comment)` key; locations always come from the
/// template, since the old back-references are stale by definition.
pub fn merge(catalog: &Catalog, template: &Catalog, drop_vanished: bool) -> (Catalog, MergeReport) {
    let mut report = MergeReport::default();

    // first occurrence wins on duplicate keys; the leftovers fall through
    // to the vanished pass and stay visible to QA
    let mut index: HashMap<(&str, &str, Option<&str>), (usize, usize)> = HashMap::new();
    for (ci, ctx) in catalog.contexts.iter().enumerate() {
        for (mi, m) in ctx.messages.iter().enumerate() {
            index
                .entry((ctx.name.as_str(), m.source.as_str(), m.comment.as_deref()))
                .or_insert((ci, mi));
        }
    }
    let mut consumed: Vec<Vec<bool>> = catalog
        .contexts
        .iter()
        .map(|c| vec![false; c.messages.len()])
        .collect();

    let mut out = Catalog {
        version: pick(&catalog.version, &template.version),
        language: pick(&catalog.language, &template.language),
        source_language: pick(&catalog.source_language, &template.source_language),
        contexts: Vec::new(),
    };

    for t_ctx in &template.contexts {
        let mut out_ctx = Context {
            name: t_ctx.name.clone(),
            messages: Vec::new(),
        };

        for t_msg in &t_ctx.messages {
            let key = (
                t_ctx.name.as_str(),
                t_msg.source.as_str(),
                t_msg.comment.as_deref(),
            );

            match index.get(&key) {
                Some(&(ci, mi)) if !consumed[ci][mi] => {
                    consumed[ci][mi] = true;
                    let old = &catalog.contexts[ci].messages[mi];

                    let status = match old.status {
                        MessageStatus::Finished | MessageStatus::Unfinished => {
                            report.kept += 1;
                            old.status
                        }
                        MessageStatus::Vanished | MessageStatus::Obsolete => {
                            report.revived += 1;
                            if has_translation(old) {
                                MessageStatus::Finished
                            } else {
                                MessageStatus::Unfinished
                            }
                        }
                    };

                    out_ctx.messages.push(Message {
                        source: t_msg.source.clone(),
                        translation: old.translation.clone(),
                        status,
                        locations: t_msg.locations.clone(),
                        comment: t_msg.comment.clone(),
                        numerus: t_msg.numerus,
                        numerus_forms: old.numerus_forms.clone(),
                    });
                }
                _ => {
                    // new to this catalog, so whatever status the template
                    // claims, the translator has not seen it yet
                    report.added += 1;
                    out_ctx.messages.push(Message {
                        status: MessageStatus::Unfinished,
                        ..t_msg.clone()
                    });
                }
            }
        }

        out.contexts.push(out_ctx);
    }

    // messages the template no longer references
    for (ci, ctx) in catalog.contexts.iter().enumerate() {
        let mut leftovers: Vec<Message> = Vec::new();

        for (mi, m) in ctx.messages.iter().enumerate() {
            if consumed[ci][mi] {
                continue;
            }
            if drop_vanished {
                report.dropped += 1;
                continue;
            }

            let status = match m.status {
                MessageStatus::Obsolete => MessageStatus::Obsolete,
                MessageStatus::Vanished => MessageStatus::Vanished,
                _ => {
                    report.vanished += 1;
                    MessageStatus::Vanished
                }
            };

            leftovers.push(Message {
                status,
                locations: Vec::new(),
                ..m.clone()
            });
        }

        if leftovers.is_empty() {
            continue;
        }

        match out.contexts.iter_mut().find(|c| c.name == ctx.name) {
            Some(out_ctx) => out_ctx.messages.extend(leftovers),
            None => out.contexts.push(Context {
                name: ctx.name.clone(),
                messages: leftovers,
            }),
        }
    }

    (out, report)
}

fn pick(own: &str, fallback: &str) -> String {
    if own.is_empty() {
        fallback.to_string()
    } else {
        own.to_string()
    }
}

fn has_translation(m: &Message) -> bool {
    if m.numerus {
        m.numerus_forms.iter().any(|f| !f.trim().is_empty())
    } else {
        !m.translation.trim().is_empty()
    }
}
