/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type (0-based, assigned in creation order)
pub type Pid = u32;

/// Address type for memory operations (byte offset into simulated memory)
pub type Address = u64;

/// Size type for memory operations
pub type Size = u64;

/// Simulated time in milliseconds since system start
pub type Millis = u64;

/// Common result type for simulation operations
pub type SimResult<T> = Result<T, super::errors::SimulationError>;
