/*!
 * Process Management
 * Control blocks, the creation-ordered process set, and the factory
 * that builds it from a workload
 */

mod factory;
mod types;

pub use factory::{next_cpu_cycles, ProcessFactory};
pub use types::{Process, ProcessSet, ProcessState};
