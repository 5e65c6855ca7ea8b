// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Sigma protocols.
//!
//! A Sigma protocol is split into pure computations, which implement the three-move math for a statement, and the
//! [`protocol`] drivers, which exchange messages over a channel. Computations are stateful only between the first
//! and second message of a single run.
//!
//! Statements are expressed as [`SigmaCommonInput`] (public) and [`SigmaProverInput`] (public input plus witness)
//! values. Composite statements nest: an AND-composition takes a list of inputs, one per component.

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::fmt::{self, Debug};

use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use snafu::prelude::*;
use tracing::{error, warn};

use crate::{
    channel::ChannelError,
    group::DlogGroup,
    message::{Challenge, MessageError, MessageLayout, SigmaProtocolMsg},
    sigma::dlog::{SigmaDlogCommonInput, SigmaDlogProverInput},
};

/// AND-composition of Sigma protocols.
pub mod and;
/// Knowledge of a discrete logarithm.
pub mod dlog;
/// Networked drivers for bare Sigma protocols.
pub mod protocol;

/// Errors that can arise relating to Sigma protocols.
#[derive(Debug, Snafu)]
pub enum SigmaError {
    /// An invalid parameter was provided at construction.
    #[snafu(display("An invalid parameter was provided: {reason}"))]
    InvalidParameter {
        /// The reason for the parameter error.
        reason: &'static str,
    },
    /// A protocol step was called out of order.
    #[snafu(display("Protocol step called out of order: {reason}"))]
    OrderingViolation {
        /// The reason for the ordering error.
        reason: &'static str,
    },
    /// The other party deviated from the protocol.
    #[snafu(display("Cheat attempt detected: {reason}"))]
    CheatAttempt {
        /// The reason for the cheating condition.
        reason: &'static str,
    },
    /// An input or message does not match the shape of the statement.
    #[snafu(display("Invalid input: {reason}"))]
    InvalidInput {
        /// The reason for the input error.
        reason: &'static str,
    },
    /// A message could not be encoded or decoded.
    #[snafu(context(false), display("Sigma message error: {source}"))]
    Message {
        /// The underlying error.
        source: MessageError,
    },
    /// A channel operation failed.
    #[snafu(context(false), display("Sigma channel error: {source}"))]
    Channel {
        /// The underlying error.
        source: ChannelError,
    },
}

/// The public input to a Sigma protocol.
pub enum SigmaCommonInput<G: DlogGroup> {
    /// Input for knowledge of a discrete logarithm.
    Dlog(SigmaDlogCommonInput<G>),
    /// Inputs for an AND-composition, one per component.
    And(Vec<SigmaCommonInput<G>>),
}

impl<G: DlogGroup> SigmaCommonInput<G> {
    /// Generate input for knowledge of the discrete logarithm of `h`.
    pub fn dlog(h: &G::Element) -> Self {
        Self::Dlog(SigmaDlogCommonInput::new(h))
    }

    /// Generate input for an AND-composition.
    pub fn and(inputs: Vec<SigmaCommonInput<G>>) -> Self {
        Self::And(inputs)
    }
}

impl<G: DlogGroup> Clone for SigmaCommonInput<G> {
    fn clone(&self) -> Self {
        match self {
            Self::Dlog(input) => Self::Dlog(input.clone()),
            Self::And(inputs) => Self::And(inputs.clone()),
        }
    }
}

impl<G: DlogGroup> Debug for SigmaCommonInput<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dlog(input) => f.debug_tuple("Dlog").field(input.get_h()).finish(),
            Self::And(inputs) => f.debug_tuple("And").field(inputs).finish(),
        }
    }
}

/// The prover's input to a Sigma protocol: the public input and a witness.
///
/// Witnesses are wiped on drop, and are never sent.
pub enum SigmaProverInput<G: DlogGroup> {
    /// Input for knowledge of a discrete logarithm.
    Dlog(SigmaDlogProverInput<G>),
    /// Inputs for an AND-composition, one per component.
    And(Vec<SigmaProverInput<G>>),
}

impl<G: DlogGroup> SigmaProverInput<G> {
    /// Generate input for knowledge of a witness `w` with `g^w = h`.
    ///
    /// The relation itself is not checked; a prover with a bad witness simply fails to convince the verifier.
    pub fn dlog(h: &G::Element, w: &BigUint) -> Self {
        Self::Dlog(SigmaDlogProverInput::new(h, w))
    }

    /// Generate input for an AND-composition.
    pub fn and(inputs: Vec<SigmaProverInput<G>>) -> Self {
        Self::And(inputs)
    }

    /// Get the public part of this input.
    pub fn common_input(&self) -> SigmaCommonInput<G> {
        match self {
            Self::Dlog(input) => SigmaCommonInput::Dlog(input.common_input()),
            Self::And(inputs) => SigmaCommonInput::And(inputs.iter().map(|input| input.common_input()).collect()),
        }
    }
}

/// An accepting transcript produced without a witness.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimulatorOutput {
    /// The first message.
    pub a: SigmaProtocolMsg,
    /// The challenge.
    pub e: Challenge,
    /// The second message.
    pub z: SigmaProtocolMsg,
}

/// The prover's computations for a Sigma protocol.
pub trait SigmaProverComputation<G: DlogGroup>: Send {
    /// Get the group used by the protocol.
    fn get_group(&self) -> &Arc<G>;

    /// Get the soundness parameter `t`.
    fn soundness_param(&self) -> u32;

    /// Compute the first message `a`, remembering the input and randomness for the second message.
    fn compute_first_msg(
        &mut self,
        input: &SigmaProverInput<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaProtocolMsg, SigmaError>;

    /// Compute the second message `z` for a challenge.
    ///
    /// This must follow [`SigmaProverComputation::compute_first_msg`], and consumes its state. A challenge outside
    /// `[0, 2^t)` is a cheating condition.
    fn compute_second_msg(&mut self, challenge: &Challenge) -> Result<SigmaProtocolMsg, SigmaError>;

    /// Get a simulator for the same statement.
    fn simulator(&self) -> Box<dyn SigmaSimulator<G>>;
}

/// The verifier's computations for a Sigma protocol.
pub trait SigmaVerifierComputation<G: DlogGroup>: Send {
    /// Get the group used by the protocol.
    fn get_group(&self) -> &Arc<G>;

    /// Get the soundness parameter `t`.
    fn soundness_param(&self) -> u32;

    /// Set the challenge to be used for verification.
    fn set_challenge(&mut self, challenge: &Challenge);

    /// Get the current challenge, if one has been set.
    fn challenge(&self) -> Option<&Challenge>;

    /// Remove and return the current challenge, so it cannot be used for another transcript.
    fn take_challenge(&mut self) -> Option<Challenge>;

    /// Sample and set a uniformly random challenge in `[0, 2^t)`.
    fn sample_challenge(&mut self, rng: &mut dyn CryptoRngCore) -> Challenge {
        let challenge = Challenge::random(self.soundness_param(), rng);
        self.set_challenge(&challenge);

        challenge
    }

    /// Get the layout of the first message.
    fn first_message_layout(&self) -> MessageLayout;

    /// Get the layout of the second message.
    fn second_message_layout(&self) -> MessageLayout;

    /// Verify a transcript against the current challenge.
    ///
    /// A rejected proof is `Ok(false)`. Errors indicate misuse or malformed inputs: calling this before a challenge
    /// is set, or messages that do not match the statement's shape.
    fn verify(
        &mut self,
        input: &SigmaCommonInput<G>,
        a: &SigmaProtocolMsg,
        z: &SigmaProtocolMsg,
    ) -> Result<bool, SigmaError>;
}

/// A simulator for a Sigma protocol, producing accepting transcripts without a witness.
pub trait SigmaSimulator<G: DlogGroup>: Send {
    /// Get the soundness parameter `t`.
    fn soundness_param(&self) -> u32;

    /// Simulate a transcript for a given challenge.
    ///
    /// A challenge outside `[0, 2^t)` is a cheating condition.
    fn simulate(
        &self,
        input: &SigmaCommonInput<G>,
        challenge: &Challenge,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatorOutput, SigmaError>;

    /// Simulate a transcript for a uniformly random challenge.
    fn simulate_random(
        &self,
        input: &SigmaCommonInput<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatorOutput, SigmaError> {
        let challenge = Challenge::random(self.soundness_param(), rng);
        self.simulate(input, &challenge, rng)
    }
}

impl<G: DlogGroup, T: SigmaProverComputation<G> + ?Sized> SigmaProverComputation<G> for Box<T> {
    fn get_group(&self) -> &Arc<G> {
        (**self).get_group()
    }

    fn soundness_param(&self) -> u32 {
        (**self).soundness_param()
    }

    fn compute_first_msg(
        &mut self,
        input: &SigmaProverInput<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaProtocolMsg, SigmaError> {
        (**self).compute_first_msg(input, rng)
    }

    fn compute_second_msg(&mut self, challenge: &Challenge) -> Result<SigmaProtocolMsg, SigmaError> {
        (**self).compute_second_msg(challenge)
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<G>> {
        (**self).simulator()
    }
}

impl<G: DlogGroup, T: SigmaVerifierComputation<G> + ?Sized> SigmaVerifierComputation<G> for Box<T> {
    fn get_group(&self) -> &Arc<G> {
        (**self).get_group()
    }

    fn soundness_param(&self) -> u32 {
        (**self).soundness_param()
    }

    fn set_challenge(&mut self, challenge: &Challenge) {
        (**self).set_challenge(challenge)
    }

    fn challenge(&self) -> Option<&Challenge> {
        (**self).challenge()
    }

    fn take_challenge(&mut self) -> Option<Challenge> {
        (**self).take_challenge()
    }

    fn sample_challenge(&mut self, rng: &mut dyn CryptoRngCore) -> Challenge {
        (**self).sample_challenge(rng)
    }

    fn first_message_layout(&self) -> MessageLayout {
        (**self).first_message_layout()
    }

    fn second_message_layout(&self) -> MessageLayout {
        (**self).second_message_layout()
    }

    fn verify(
        &mut self,
        input: &SigmaCommonInput<G>,
        a: &SigmaProtocolMsg,
        z: &SigmaProtocolMsg,
    ) -> Result<bool, SigmaError> {
        (**self).verify(input, a, z)
    }
}

impl<G: DlogGroup, T: SigmaSimulator<G> + ?Sized> SigmaSimulator<G> for Box<T> {
    fn soundness_param(&self) -> u32 {
        (**self).soundness_param()
    }

    fn simulate(
        &self,
        input: &SigmaCommonInput<G>,
        challenge: &Challenge,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatorOutput, SigmaError> {
        (**self).simulate(input, challenge, rng)
    }

    fn simulate_random(
        &self,
        input: &SigmaCommonInput<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatorOutput, SigmaError> {
        (**self).simulate_random(input, rng)
    }
}

// Reject a challenge outside `[0, 2^t)`
pub(crate) fn check_challenge(challenge: &Challenge, t: u32) -> Result<(), SigmaError> {
    if !challenge.check(t) {
        error!(t, "Challenge is out of range");
        return Err(SigmaError::CheatAttempt {
            reason: "challenge is not in `[0, 2^t)`",
        });
    }

    Ok(())
}

// Decode a message received from the prover; a malformed message rejects the proof rather than failing the run
pub(crate) fn decode_prover_msg(
    bytes: &[u8],
    layout: &MessageLayout,
    which: &'static str,
) -> Option<SigmaProtocolMsg> {
    match SigmaProtocolMsg::from_bytes(bytes, layout) {
        Ok(message) => Some(message),
        Err(error) => {
            warn!(which, %error, "Prover message is malformed");
            None
        },
    }
}
