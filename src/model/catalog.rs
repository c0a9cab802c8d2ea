use serde::{Deserialize, Serialize};

use super::message::Message;

/// One TS document: catalog metadata plus messages grouped by context.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub language: String,

    #[serde(default, alias = "sourcelanguage")]
    pub source_language: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Context {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub messages: Vec<Message>,
}
