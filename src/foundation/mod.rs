/// Pipeline tunables loaded from JSON or CLI flags.
pub mod config;
/// Value types shared by every stage.
pub mod core;
/// Error taxonomy.
pub mod error;
