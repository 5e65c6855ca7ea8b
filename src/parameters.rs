// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use alloc::sync::Arc;

use num_bigint::BigUint;
use snafu::prelude::*;

use crate::{group::DlogGroup, util::pow2};

/// Public parameters used by Sigma protocol computations.
///
/// Parameters consist of a [`DlogGroup`] and a soundness parameter `t`, the bit length of the challenge space. A
/// cheating prover succeeds with probability at most `2^-t`. Both parties must use the same parameters.
pub struct SigmaParameters<G: DlogGroup> {
    group: Arc<G>,
    t: u32,
    challenge_bound: BigUint,
}

// Manual implementation, since `G` itself need not be `Clone`
impl<G: DlogGroup> Clone for SigmaParameters<G> {
    fn clone(&self) -> Self {
        Self {
            group: self.group.clone(),
            t: self.t,
            challenge_bound: self.challenge_bound.clone(),
        }
    }
}

/// Errors that can arise relating to [`SigmaParameters`].
#[derive(Debug, Snafu)]
pub enum ParameterError {
    /// An invalid parameter was provided.
    #[snafu(display("An invalid parameter was provided: {reason}"))]
    InvalidParameter {
        /// The reason for the parameter error.
        reason: &'static str,
    },
}

impl<G: DlogGroup> SigmaParameters<G> {
    /// Generate new [`SigmaParameters`] from a [`DlogGroup`] `group` and soundness parameter `t`.
    ///
    /// The group must pass [`DlogGroup::validate_group`], and it must be the case that `2^t < q`, where `q` is the group
    /// order. If any of these conditions is not met, returns a [`ParameterError`].
    pub fn new(group: &Arc<G>, t: u32) -> Result<Self, ParameterError> {
        if !group.validate_group() {
            return Err(ParameterError::InvalidParameter {
                reason: "group parameters are invalid",
            });
        }

        // `2^t < q` needs `t` below the bit length of `q`, which also keeps `2^t` small
        if u64::from(t) >= group.order().bits() {
            return Err(ParameterError::InvalidParameter {
                reason: "soundness parameter does not satisfy `2^t < q`",
            });
        }
        let challenge_bound = pow2(t);
        if &challenge_bound >= group.order() {
            return Err(ParameterError::InvalidParameter {
                reason: "soundness parameter does not satisfy `2^t < q`",
            });
        }

        Ok(Self {
            group: group.clone(),
            t,
            challenge_bound,
        })
    }

    /// Get the [`DlogGroup`] from these [`SigmaParameters`].
    pub fn get_group(&self) -> &Arc<G> {
        &self.group
    }

    /// Get the soundness parameter `t` from these [`SigmaParameters`].
    pub fn get_t(&self) -> u32 {
        self.t
    }

    /// Get the exclusive upper bound `2^t` on challenges.
    pub fn get_challenge_bound(&self) -> &BigUint {
        &self.challenge_bound
    }
}
