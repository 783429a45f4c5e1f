/// Single-threaded control loop: generations, backpressure, round-robin dispatch.
pub mod dispatcher;
/// Index-ordered reassembly of completed frames.
pub mod queue;
