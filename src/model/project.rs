use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub project_path: String,

    /// Root of the application source tree the catalogs belong to.
    #[serde(default, alias = "app_root")]
    pub root_path: String,

    #[serde(default, alias = "source_lang")]
    pub source_language: String,

    #[serde(default, alias = "target_lang")]
    pub target_language: String,

    /// Catalog file path, relative to `root_path`
    /// (e.g. "Source/Resources/Translations/german.ts").
    #[serde(default)]
    pub catalog_file: String,
}
