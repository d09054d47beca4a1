// Domain layer - Pure types and transformations, no I/O
pub mod aggregate;
pub mod chart;
pub mod config_document;
pub mod provider;
pub mod script;
pub mod series;
