pub mod ts;
pub mod xml;
