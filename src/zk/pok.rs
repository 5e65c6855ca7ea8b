// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use core::mem;

use rand::Rng;
use rand_core::CryptoRngCore;
use tracing::{debug, error, instrument, warn};

use crate::{
    channel::Channel,
    commitment::{
        trapdoor::{PedersenTrapdoorCommitter, PedersenTrapdoorReceiver},
        CommitPhaseOutput,
        CommitValue,
    },
    group::DlogGroup,
    message::Challenge,
    sigma::{
        decode_prover_msg,
        SigmaCommonInput,
        SigmaError,
        SigmaProverComputation,
        SigmaProverInput,
        SigmaVerifierComputation,
    },
    zk::ZkError,
};

enum ProverState {
    Idle,
    CommitReceived(CommitPhaseOutput),
    FirstMessageSent(CommitPhaseOutput),
    DecommitReceived(CommitPhaseOutput, Challenge),
}

/// The prover side of a zero-knowledge proof of knowledge compiled from a Sigma protocol.
///
/// The prover receives the verifier's challenge under a trapdoor Pedersen commitment, and returns its record of the
/// commit phase alongside its response so the verifier can check that both saw the same commitment.
///
/// Construction sends the commitment key to the verifier, so it must be matched by the construction of a
/// [`ZkPokFromSigmaCmtPedersenVerifier`] on the other end of the channel.
pub struct ZkPokFromSigmaCmtPedersenProver<G: DlogGroup, P: SigmaProverComputation<G>, C: Channel, R: CryptoRngCore> {
    channel: C,
    computation: P,
    receiver: PedersenTrapdoorReceiver<G>,
    rng: R,
    state: ProverState,
}

impl<G: DlogGroup, P: SigmaProverComputation<G>, C: Channel, R: CryptoRngCore>
    ZkPokFromSigmaCmtPedersenProver<G, P, C, R>
{
    /// Generate a new [`ZkPokFromSigmaCmtPedersenProver`], sending the commitment key to the verifier.
    #[instrument(skip_all, err(Debug))]
    pub fn new(mut channel: C, computation: P, mut rng: R) -> Result<Self, ZkError> {
        let receiver = PedersenTrapdoorReceiver::new(&mut channel, computation.get_group(), &mut rng)?;

        Ok(Self {
            channel,
            computation,
            receiver,
            rng,
            state: ProverState::Idle,
        })
    }

    /// Prove knowledge of a witness for a statement.
    ///
    /// If the verifier's decommitment to its challenge is invalid, returns a cheating condition.
    #[instrument(skip_all, err(Debug))]
    pub fn prove(&mut self, input: &SigmaProverInput<G>) -> Result<(), ZkError> {
        self.receive_commit()?;
        self.process_first_msg(input)?;
        self.receive_decommit()?;
        self.process_second_msg()
    }

    /// Run the commit phase as the commitment receiver, returning its record.
    ///
    /// This starts a run, and cannot be called while another is in progress. A failure in any step ends the run.
    pub fn receive_commit(&mut self) -> Result<CommitPhaseOutput, ZkError> {
        if !matches!(self.state, ProverState::Idle) {
            return Err(ordering_violation("commitment received during a run"));
        }

        let trap = self.receiver.receive_commitment(&mut self.channel)?;
        self.state = ProverState::CommitReceived(trap.clone());

        Ok(trap)
    }

    /// Compute and send the first Sigma message.
    ///
    /// This must follow [`ZkPokFromSigmaCmtPedersenProver::receive_commit`].
    pub fn process_first_msg(&mut self, input: &SigmaProverInput<G>) -> Result<(), ZkError> {
        let trap = match mem::replace(&mut self.state, ProverState::Idle) {
            ProverState::CommitReceived(trap) => trap,
            state => {
                self.state = state;
                return Err(ordering_violation("first message requested before the challenge commitment"));
            },
        };

        let a = self.computation.compute_first_msg(input, &mut self.rng)?;
        self.channel.write(&a.to_bytes()?)?;
        self.state = ProverState::FirstMessageSent(trap);
        debug!("Sent first message");

        Ok(())
    }

    /// Receive and verify the decommitment, returning the challenge.
    ///
    /// This must follow [`ZkPokFromSigmaCmtPedersenProver::process_first_msg`].
    pub fn receive_decommit(&mut self) -> Result<Challenge, ZkError> {
        let trap = match mem::replace(&mut self.state, ProverState::Idle) {
            ProverState::FirstMessageSent(trap) => trap,
            state => {
                self.state = state;
                return Err(ordering_violation("decommitment received before the first message was sent"));
            },
        };

        let value = self.receiver.receive_decommitment(&mut self.channel, trap.id)?;
        let challenge = Challenge::from(value.to_biguint().clone());
        self.state = ProverState::DecommitReceived(trap, challenge.clone());

        Ok(challenge)
    }

    /// Compute and send the second Sigma message for the decommitted challenge, followed by the commit phase record.
    ///
    /// This must follow [`ZkPokFromSigmaCmtPedersenProver::receive_decommit`], and ends the run.
    pub fn process_second_msg(&mut self) -> Result<(), ZkError> {
        let (trap, challenge) = match mem::replace(&mut self.state, ProverState::Idle) {
            ProverState::DecommitReceived(trap, challenge) => (trap, challenge),
            state => {
                self.state = state;
                return Err(ordering_violation("second message requested before the challenge was decommitted"));
            },
        };

        let z = self.computation.compute_second_msg(&challenge)?;
        self.channel.write(&z.to_bytes()?)?;
        self.channel.write(&trap.to_bytes())?;
        debug!("Sent second message");

        Ok(())
    }
}

fn ordering_violation(reason: &'static str) -> ZkError {
    SigmaError::OrderingViolation { reason }.into()
}

/// The verifier side of a zero-knowledge proof of knowledge compiled from a Sigma protocol.
pub struct ZkPokFromSigmaCmtPedersenVerifier<
    G: DlogGroup,
    V: SigmaVerifierComputation<G>,
    C: Channel,
    R: CryptoRngCore,
> {
    channel: C,
    computation: V,
    committer: PedersenTrapdoorCommitter<G>,
    rng: R,
}

impl<G: DlogGroup, V: SigmaVerifierComputation<G>, C: Channel, R: CryptoRngCore>
    ZkPokFromSigmaCmtPedersenVerifier<G, V, C, R>
{
    /// Generate a new [`ZkPokFromSigmaCmtPedersenVerifier`], blocking until the commitment key arrives from the
    /// prover.
    #[instrument(skip_all, err(Debug))]
    pub fn new(mut channel: C, computation: V, rng: R) -> Result<Self, ZkError> {
        let committer = PedersenTrapdoorCommitter::new(&mut channel, computation.get_group())?;

        Ok(Self {
            channel,
            computation,
            committer,
            rng,
        })
    }

    /// Verify a statement, returning whether the proof is accepted.
    ///
    /// The proof is accepted only if the prover's commit phase record matches this verifier's commitment and the
    /// Sigma transcript verifies. A malformed message from the prover rejects the proof. The challenge and its
    /// commitment are discarded afterward, whatever the outcome.
    #[instrument(skip_all, err(Debug))]
    pub fn verify(&mut self, input: &SigmaCommonInput<G>) -> Result<bool, ZkError> {
        let id: u64 = self.rng.gen();
        let result = self.run(input, id);
        self.committer.remove_commitment(id);
        self.computation.take_challenge();

        result
    }

    fn run(&mut self, input: &SigmaCommonInput<G>, id: u64) -> Result<bool, ZkError> {
        // Commit to a fresh challenge
        let challenge = self.computation.sample_challenge(&mut self.rng);
        self.committer.commit(
            &mut self.channel,
            &CommitValue::from_biguint(challenge.value().clone()),
            id,
            &mut self.rng,
        )?;

        // Receive the first message
        let a = decode_prover_msg(
            &self.channel.read_one()?,
            &self.computation.first_message_layout(),
            "first",
        );
        debug!("Received first message");

        // Reveal the challenge
        self.committer.decommit(&mut self.channel, id)?;

        // Receive the second message and the commit phase record
        let z = decode_prover_msg(
            &self.channel.read_one()?,
            &self.computation.second_message_layout(),
            "second",
        );
        let trap = CommitPhaseOutput::from_bytes(
            &self.channel.read_one()?,
            self.computation.get_group().element_size(),
        );
        let (Some(a), Some(z), Ok(trap)) = (a, z, trap) else {
            warn!("Rejected a malformed transcript");
            return Ok(false);
        };

        // Check both, so each failure is reported
        let trap_valid = trap.id == id && self.committer.validate(&trap);
        if !trap_valid {
            error!("Commit phase record does not match the commitment");
        }
        let accepted = self.computation.verify(input, &a, &z)?;
        debug!(accepted, trap_valid, "Verified transcript");

        Ok(trap_valid && accepted)
    }
}
