pub mod aggregate;
pub mod classifier;
pub mod dedup;
pub mod entry;
