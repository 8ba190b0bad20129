/*!
 * Workload
 * Immutable, pre-parsed operation sequence executed by the simulation
 *
 * The sequence is compiled once from structured input: structure is
 * validated, per-operation durations are precomputed from the config
 * cycle rates, and the result is never mutated afterwards. Per-process
 * ownership is expressed as index ranges computed during process
 * construction, not as mutation of shared operations.
 */

use crate::config::SimConfig;
use crate::core::errors::WorkloadError;
use crate::core::types::{Address, Millis, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Device transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoDirection {
    In,
    Out,
}

impl fmt::Display for IoDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "input"),
            Self::Out => write!(f, "output"),
        }
    }
}

/// Memory operation flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemAction {
    Allocate,
    Access,
}

impl fmt::Display for MemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocate => write!(f, "allocate"),
            Self::Access => write!(f, "access"),
        }
    }
}

/// One instruction of the scripted workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpCode {
    /// System boundary markers delimiting the whole sequence
    SysStart,
    SysEnd,
    /// Program boundary markers delimiting one process
    AppStart,
    AppEnd,
    /// CPU burst consuming `cycles` CPU cycles
    Cpu { label: String, cycles: u32 },
    /// Device I/O consuming `cycles` I/O cycles
    Io {
        device: String,
        direction: IoDirection,
        cycles: u32,
    },
    /// Memory request against the shared address space
    Mem {
        action: MemAction,
        offset: Address,
        size: Size,
    },
}

/// A compiled operation: its op code plus precomputed duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub code: OpCode,
    /// Simulated milliseconds this operation consumes when run to
    /// completion (0 for boundaries and memory requests)
    pub duration_ms: Millis,
}

/// The validated, immutable operation sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    ops: Vec<Operation>,
}

impl Workload {
    /// Compile a raw op-code sequence into a validated workload
    ///
    /// Enforces the external input contract: the sequence begins with a
    /// system-start marker, ends with a system-end marker, contains one
    /// or more non-nested program segments, and every CPU/IO/memory
    /// operation lies inside a program segment. Durations are computed
    /// from the configured cycle rates.
    pub fn compile(codes: Vec<OpCode>, config: &SimConfig) -> Result<Self, WorkloadError> {
        if codes.is_empty() {
            return Err(WorkloadError::Empty);
        }
        if codes.first() != Some(&OpCode::SysStart) {
            return Err(WorkloadError::MissingSystemStart);
        }
        if codes.last() != Some(&OpCode::SysEnd) {
            return Err(WorkloadError::MissingSystemEnd);
        }

        let mut in_program = false;
        let mut programs = 0usize;
        for (index, code) in codes.iter().enumerate() {
            match code {
                OpCode::SysStart if index != 0 => {
                    return Err(WorkloadError::UnbalancedProgram { index });
                }
                OpCode::SysEnd if index != codes.len() - 1 => {
                    return Err(WorkloadError::UnbalancedProgram { index });
                }
                OpCode::AppStart => {
                    if in_program {
                        return Err(WorkloadError::UnbalancedProgram { index });
                    }
                    in_program = true;
                    programs += 1;
                }
                OpCode::AppEnd => {
                    if !in_program {
                        return Err(WorkloadError::UnbalancedProgram { index });
                    }
                    in_program = false;
                }
                OpCode::Cpu { .. } | OpCode::Io { .. } | OpCode::Mem { .. } => {
                    if !in_program {
                        return Err(WorkloadError::OperationOutsideProgram { index });
                    }
                }
                _ => {}
            }
        }
        if in_program {
            return Err(WorkloadError::UnbalancedProgram { index: codes.len() - 1 });
        }
        if programs == 0 {
            return Err(WorkloadError::NoPrograms);
        }

        let ops = codes
            .into_iter()
            .map(|code| {
                let duration_ms = match &code {
                    OpCode::Cpu { cycles, .. } => u64::from(*cycles) * config.cpu_cycle_rate_ms,
                    OpCode::Io { cycles, .. } => u64::from(*cycles) * config.io_cycle_rate_ms,
                    _ => 0,
                };
                Operation { code, duration_ms }
            })
            .collect();

        Ok(Self { ops })
    }

    #[inline(always)]
    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline(always)]
    pub fn op(&self, index: usize) -> &Operation {
        &self.ops[index]
    }

    /// Inclusive index ranges of each program segment, in order
    /// (start marker through matching end marker)
    pub fn program_ranges(&self) -> Vec<RangeInclusive<usize>> {
        let mut ranges = Vec::new();
        let mut open = None;
        for (index, op) in self.ops.iter().enumerate() {
            match op.code {
                OpCode::AppStart => open = Some(index),
                OpCode::AppEnd => {
                    if let Some(start) = open.take() {
                        ranges.push(start..=index);
                    }
                }
                _ => {}
            }
        }
        ranges
    }
}
