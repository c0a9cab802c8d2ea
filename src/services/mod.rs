pub mod encoding;
pub mod fsio;
pub mod lookup;
pub mod merge;
pub mod pipeline;
pub mod project;
pub mod qa;
pub mod render;
pub mod stats;
pub mod translation_memory;
