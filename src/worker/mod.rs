/// Coordinator-side management of worker processes.
pub mod pool;
/// Task-serving loop run inside each worker process.
pub mod process;
/// Pixel generator seam and the built-in test pattern.
pub mod render;
