use serde::Serialize;

use crate::model::catalog::Catalog;
use crate::model::message::MessageStatus;

#[derive(Debug, Serialize)]
pub struct ContextStats {
    pub name: String,
    pub total: usize,
    pub finished: usize,
    pub unfinished: usize,
}

#[derive(Debug, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub finished: usize,
    pub unfinished: usize,
    pub vanished: usize,
    pub obsolete: usize,
    /// finished / (finished + unfinished); 1.0 for a catalog with no
    /// active messages.
    pub completion: f32,
    pub contexts: Vec<ContextStats>,
}

pub fn collect(catalog: &Catalog) -> CatalogStats {
    let mut stats = CatalogStats {
        total: 0,
        finished: 0,
        unfinished: 0,
        vanished: 0,
        obsolete: 0,
        completion: 1.0,
        contexts: Vec::new(),
    };

    for ctx in &catalog.contexts {
        let mut ctx_stats = ContextStats {
            name: ctx.name.clone(),
            total: ctx.messages.len(),
            finished: 0,
            unfinished: 0,
        };

        for m in &ctx.messages {
            stats.total += 1;
            match m.status {
                MessageStatus::Finished => {
                    stats.finished += 1;
                    ctx_stats.finished += 1;
                }
                MessageStatus::Unfinished => {
                    stats.unfinished += 1;
                    ctx_stats.unfinished += 1;
                }
                MessageStatus::Vanished => stats.vanished += 1,
                MessageStatus::Obsolete => stats.obsolete += 1,
            }
        }

        stats.contexts.push(ctx_stats);
    }

    let active = stats.finished + stats.unfinished;
    if active > 0 {
        stats.completion = stats.finished as f32 / active as f32;
    }

    stats
}
