use serde::{Deserialize, Serialize};

/// One translation unit: a source string and its translation, grouped
/// under a context by the owning UI component.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Message {
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub status: MessageStatus,

    /// Back-references into the application source tree. A message may
    /// carry many (the extraction tooling emits one per call site).
    #[serde(default)]
    pub locations: Vec<Location>,

    /// Disambiguation comment; part of the lookup key when present.
    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub numerus: bool,

    /// One form per plural class of the target language; only meaningful
    /// when `numerus` is set.
    #[serde(default)]
    pub numerus_forms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Finished,
    Unfinished,
    /// No longer referenced by the current UI source; retained for
    /// translator reference until removed.
    Vanished,
    Obsolete,
}

impl Default for MessageStatus {
    fn default() -> Self {
        MessageStatus::Unfinished
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Location {
    #[serde(default)]
    pub filename: String,

    #[serde(default)]
    pub line: u32,
}
