use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TmEntry {
    pub source_lang: String,
    pub target_lang: String,

    /// Source string as it appeared in the catalog.
    #[serde(alias = "original")]
    pub source_text: String,
    pub translation: String,

    pub normalized: String,

    pub hash: String,
}
