//! Lecteurs de sources: tables délimitées et couches de bases géographiques

pub mod delimited;
pub mod layer;

pub use delimited::LoadOptions;
