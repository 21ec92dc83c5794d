// src/sequence.rs

//! Stepwise Fibonacci generation.
//!
//! [`SequenceComputer`] is the pure arithmetic; [`SequencePrefix`] is the
//! append-only buffer a goal grows one element per step.

use thiserror::Error;

/// Seed every goal starts from.
pub const SEED: [u64; 2] = [0, 1];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// The prefix is too short to derive the next element from.
    #[error("invalid sequence state: need at least 2 elements, got {0}")]
    InvalidState(usize),

    /// The next element does not fit in a `u64`.
    #[error("sequence overflow computing element {index}")]
    Overflow { index: usize },
}

/// Stateless generator for the next element of a prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceComputer;

impl SequenceComputer {
    /// `prefix[last] + prefix[last - 1]`.
    pub fn next(prefix: &[u64]) -> Result<u64, SequenceError> {
        match prefix {
            [.., before, last] => {
                last.checked_add(*before)
                    .ok_or(SequenceError::Overflow {
                        index: prefix.len(),
                    })
            }
            _ => Err(SequenceError::InvalidState(prefix.len())),
        }
    }

    /// Number of elements a completed goal of `order` carries.
    pub fn target_len(order: u32) -> usize {
        (order as usize).max(SEED.len())
    }
}

/// Append-only sequence prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePrefix {
    values: Vec<u64>,
}

impl SequencePrefix {
    pub fn seed() -> Self {
        Self {
            values: SEED.to_vec(),
        }
    }

    /// Wrap an arbitrary starting prefix. Used to resume from, or test
    /// against, a malformed state.
    pub fn from_values(values: Vec<u64>) -> Self {
        Self { values }
    }

    /// Append the next element and return it.
    ///
    /// On error the prefix is left untouched.
    pub fn step(&mut self) -> Result<u64, SequenceError> {
        let next = SequenceComputer::next(&self.values)?;
        self.values.push(next);
        Ok(next)
    }

    pub fn is_complete(&self, order: u32) -> bool {
        self.values.len() >= SequenceComputer::target_len(order)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.values
    }
}
