pub mod assembly;
pub mod media;
pub mod recency;
