// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Networked drivers for bare Sigma protocols.
//!
//! These run a Sigma protocol directly over a [`Channel`], with no commitment to the challenge. The result is only
//! honest-verifier zero knowledge; see the [`zk`](`crate::zk`) module for full zero knowledge.

use core::marker::PhantomData;

use rand_core::CryptoRngCore;
use tracing::{debug, error, instrument, warn};

use crate::{
    channel::Channel,
    group::DlogGroup,
    message::{Challenge, SigmaProtocolMsg},
    sigma::{
        decode_prover_msg,
        SigmaCommonInput,
        SigmaError,
        SigmaProverComputation,
        SigmaProverInput,
        SigmaVerifierComputation,
    },
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ProverState {
    Idle,
    AwaitingSecondMessage,
}

/// The prover side of a bare Sigma protocol.
pub struct SigmaProver<G: DlogGroup, P: SigmaProverComputation<G>, C: Channel, R: CryptoRngCore> {
    channel: C,
    computation: P,
    rng: R,
    state: ProverState,
    _group: PhantomData<G>,
}

impl<G: DlogGroup, P: SigmaProverComputation<G>, C: Channel, R: CryptoRngCore> SigmaProver<G, P, C, R> {
    /// Generate a new [`SigmaProver`].
    pub fn new(channel: C, computation: P, rng: R) -> Self {
        Self {
            channel,
            computation,
            rng,
            state: ProverState::Idle,
            _group: PhantomData,
        }
    }

    /// Get the underlying computation.
    pub fn get_computation(&self) -> &P {
        &self.computation
    }

    /// Run the whole protocol: send the first message, then answer the challenge.
    #[instrument(skip_all, err(Debug))]
    pub fn prove(&mut self, input: &SigmaProverInput<G>) -> Result<(), SigmaError> {
        self.process_first_msg(input)?;
        self.process_second_msg()
    }

    /// Compute and send the first message.
    ///
    /// This cannot be called again until [`SigmaProver::process_second_msg`] has run.
    pub fn process_first_msg(&mut self, input: &SigmaProverInput<G>) -> Result<(), SigmaError> {
        if self.state != ProverState::Idle {
            return Err(SigmaError::OrderingViolation {
                reason: "first message requested while awaiting the challenge",
            });
        }

        let a = self.computation.compute_first_msg(input, &mut self.rng)?;
        self.channel.write(&a.to_bytes()?)?;
        self.state = ProverState::AwaitingSecondMessage;
        debug!("Sent first message");

        Ok(())
    }

    /// Receive the challenge, then compute and send the second message.
    ///
    /// This blocks until the challenge arrives, and must follow [`SigmaProver::process_first_msg`].
    pub fn process_second_msg(&mut self) -> Result<(), SigmaError> {
        if self.state != ProverState::AwaitingSecondMessage {
            return Err(SigmaError::OrderingViolation {
                reason: "second message requested before first message",
            });
        }
        self.state = ProverState::Idle;

        let challenge = Challenge::from_bytes(&self.channel.read_one()?).map_err(|_| {
            error!("Received a negative challenge");
            SigmaError::CheatAttempt {
                reason: "challenge is negative",
            }
        })?;
        let z = self.computation.compute_second_msg(&challenge)?;
        self.channel.write(&z.to_bytes()?)?;
        debug!("Sent second message");

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VerifierState {
    Idle,
    ChallengeSampled,
    FirstMessageReceived,
    ChallengeSent,
}

/// The verifier side of a bare Sigma protocol.
///
/// Each run needs a fresh challenge, which is used up by [`SigmaVerifier::process_verify`] whatever its outcome.
pub struct SigmaVerifier<G: DlogGroup, V: SigmaVerifierComputation<G>, C: Channel, R: CryptoRngCore> {
    channel: C,
    computation: V,
    rng: R,
    state: VerifierState,
    // `None` once received means the first message was malformed
    first_msg: Option<SigmaProtocolMsg>,
    _group: PhantomData<G>,
}

impl<G: DlogGroup, V: SigmaVerifierComputation<G>, C: Channel, R: CryptoRngCore> SigmaVerifier<G, V, C, R> {
    /// Generate a new [`SigmaVerifier`].
    pub fn new(channel: C, computation: V, rng: R) -> Self {
        Self {
            channel,
            computation,
            rng,
            state: VerifierState::Idle,
            first_msg: None,
            _group: PhantomData,
        }
    }

    /// Get the underlying computation.
    pub fn get_computation(&self) -> &V {
        &self.computation
    }

    /// Run the whole protocol, returning whether the proof is accepted.
    #[instrument(skip_all, err(Debug))]
    pub fn verify(&mut self, input: &SigmaCommonInput<G>) -> Result<bool, SigmaError> {
        self.sample_challenge()?;
        self.receive_first_msg()?;
        self.send_challenge()?;
        self.process_verify(input)
    }

    /// Sample a fresh challenge.
    ///
    /// This may replace a challenge that has not been sent yet, but not one in use by a run in progress.
    pub fn sample_challenge(&mut self) -> Result<Challenge, SigmaError> {
        self.check_can_set_challenge()?;
        let challenge = self.computation.sample_challenge(&mut self.rng);
        self.state = VerifierState::ChallengeSampled;

        Ok(challenge)
    }

    /// Set the challenge, instead of sampling one.
    pub fn set_challenge(&mut self, challenge: &Challenge) -> Result<(), SigmaError> {
        self.check_can_set_challenge()?;
        self.computation.set_challenge(challenge);
        self.state = VerifierState::ChallengeSampled;

        Ok(())
    }

    fn check_can_set_challenge(&self) -> Result<(), SigmaError> {
        match self.state {
            VerifierState::Idle | VerifierState::ChallengeSampled => Ok(()),
            VerifierState::FirstMessageReceived | VerifierState::ChallengeSent => Err(SigmaError::OrderingViolation {
                reason: "challenge changed during a run",
            }),
        }
    }

    /// Receive the first message, blocking until it arrives.
    ///
    /// This must follow [`SigmaVerifier::sample_challenge`] or [`SigmaVerifier::set_challenge`]. A malformed message is
    /// not an error here; the run continues and the proof is rejected.
    pub fn receive_first_msg(&mut self) -> Result<(), SigmaError> {
        if self.state != VerifierState::ChallengeSampled {
            return Err(SigmaError::OrderingViolation {
                reason: "first message received before a fresh challenge was sampled",
            });
        }

        let bytes = self.channel.read_one()?;
        self.first_msg = decode_prover_msg(&bytes, &self.computation.first_message_layout(), "first");
        self.state = VerifierState::FirstMessageReceived;
        debug!("Received first message");

        Ok(())
    }

    /// Send the current challenge.
    ///
    /// This must follow [`SigmaVerifier::receive_first_msg`].
    pub fn send_challenge(&mut self) -> Result<(), SigmaError> {
        if self.state != VerifierState::FirstMessageReceived {
            return Err(SigmaError::OrderingViolation {
                reason: "challenge sent before the first message was received",
            });
        }
        let challenge = self.computation.challenge().ok_or(SigmaError::OrderingViolation {
            reason: "challenge sent before one was sampled",
        })?;
        self.channel.write(&challenge.to_bytes())?;
        self.state = VerifierState::ChallengeSent;
        debug!("Sent challenge");

        Ok(())
    }

    /// Receive the second message and verify the transcript, returning whether the proof is accepted.
    ///
    /// This blocks until the second message arrives, and must follow [`SigmaVerifier::send_challenge`]. The challenge
    /// is cleared afterward, so the next run needs a fresh one.
    pub fn process_verify(&mut self, input: &SigmaCommonInput<G>) -> Result<bool, SigmaError> {
        if self.state != VerifierState::ChallengeSent {
            return Err(SigmaError::OrderingViolation {
                reason: "verification requested before the challenge was sent",
            });
        }
        self.state = VerifierState::Idle;

        let a = self.first_msg.take();
        let result = self.finish_verify(input, a);
        self.computation.take_challenge();

        result
    }

    fn finish_verify(
        &mut self,
        input: &SigmaCommonInput<G>,
        a: Option<SigmaProtocolMsg>,
    ) -> Result<bool, SigmaError> {
        let bytes = self.channel.read_one()?;
        let z = decode_prover_msg(&bytes, &self.computation.second_message_layout(), "second");
        let (Some(a), Some(z)) = (a, z) else {
            warn!("Rejected a malformed transcript");
            return Ok(false);
        };

        let accepted = self.computation.verify(input, &a, &z)?;
        debug!(accepted, "Verified transcript");

        Ok(accepted)
    }
}
