// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use rand::Rng;
use rand_core::CryptoRngCore;
use tracing::{debug, instrument, warn};

use crate::{
    channel::Channel,
    commitment::{
        trapdoor::{PedersenTrapdoorCommitter, PedersenTrapdoorReceiver},
        CommitValue,
    },
    group::DlogGroup,
    message::Challenge,
    sigma::{
        decode_prover_msg,
        SigmaCommonInput,
        SigmaProverComputation,
        SigmaProverInput,
        SigmaVerifierComputation,
    },
    zk::ZkError,
};

/// The prover side of a zero-knowledge proof compiled from a Sigma protocol.
///
/// Construction sends the commitment key to the verifier, so it must be matched by the construction of a
/// [`ZkFromSigmaVerifier`] on the other end of the channel.
pub struct ZkFromSigmaProver<G: DlogGroup, P: SigmaProverComputation<G>, C: Channel, R: CryptoRngCore> {
    channel: C,
    computation: P,
    receiver: PedersenTrapdoorReceiver<G>,
    rng: R,
}

impl<G: DlogGroup, P: SigmaProverComputation<G>, C: Channel, R: CryptoRngCore> ZkFromSigmaProver<G, P, C, R> {
    /// Generate a new [`ZkFromSigmaProver`], sending the commitment key to the verifier.
    #[instrument(skip_all, err(Debug))]
    pub fn new(mut channel: C, computation: P, mut rng: R) -> Result<Self, ZkError> {
        let receiver = PedersenTrapdoorReceiver::new(&mut channel, computation.get_group(), &mut rng)?;

        Ok(Self {
            channel,
            computation,
            receiver,
            rng,
        })
    }

    /// Prove a statement.
    ///
    /// If the verifier's decommitment to its challenge is invalid, returns a cheating condition.
    #[instrument(skip_all, err(Debug))]
    pub fn prove(&mut self, input: &SigmaProverInput<G>) -> Result<(), ZkError> {
        // Receive the challenge commitment
        let trap = self.receiver.receive_commitment(&mut self.channel)?;

        // Send the first message
        let a = self.computation.compute_first_msg(input, &mut self.rng)?;
        self.channel.write(&a.to_bytes()?)?;
        debug!("Sent first message");

        // Learn the challenge
        let challenge = Challenge::from(
            self.receiver
                .receive_decommitment(&mut self.channel, trap.id)?
                .to_biguint()
                .clone(),
        );

        // Send the second message
        let z = self.computation.compute_second_msg(&challenge)?;
        self.channel.write(&z.to_bytes()?)?;
        debug!("Sent second message");

        Ok(())
    }
}

/// The verifier side of a zero-knowledge proof compiled from a Sigma protocol.
pub struct ZkFromSigmaVerifier<G: DlogGroup, V: SigmaVerifierComputation<G>, C: Channel, R: CryptoRngCore> {
    channel: C,
    computation: V,
    committer: PedersenTrapdoorCommitter<G>,
    rng: R,
}

impl<G: DlogGroup, V: SigmaVerifierComputation<G>, C: Channel, R: CryptoRngCore> ZkFromSigmaVerifier<G, V, C, R> {
    /// Generate a new [`ZkFromSigmaVerifier`], blocking until the commitment key arrives from the prover.
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
    /// A malformed message from the prover rejects the proof. The challenge and its commitment are discarded
    /// afterward, whatever the outcome.
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

        // Receive the second message and check the transcript
        let z = decode_prover_msg(
            &self.channel.read_one()?,
            &self.computation.second_message_layout(),
            "second",
        );
        let (Some(a), Some(z)) = (a, z) else {
            warn!("Rejected a malformed transcript");
            return Ok(false);
        };
        let accepted = self.computation.verify(input, &a, &z)?;
        debug!(accepted, "Verified transcript");

        Ok(accepted)
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use alloc::{boxed::Box, vec::Vec};
    use std::thread;

    use num_bigint::BigUint;
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;

    use crate::{
        channel::{Channel, LoopbackChannel},
        commitment::{pedersen::PedersenCommitter, CommitValue},
        group::{zp::ZpSafePrimeGroup, DlogGroup},
        message::SigmaProtocolMsg,
        sigma::{
            and::{SigmaAndProverComputation, SigmaAndVerifierComputation},
            dlog::{SigmaDlogProverComputation, SigmaDlogVerifierComputation},
            SigmaCommonInput,
            SigmaProverComputation,
            SigmaProverInput,
            SigmaVerifierComputation,
        },
        test_utils::{large_params, small_params, TamperingChannel},
        zk::{
            from_sigma::{ZkFromSigmaProver, ZkFromSigmaVerifier},
            ZkError,
        },
    };

    #[test]
    fn test_dlog() {
        let params = small_params();
        let group = params.get_group();
        let w = BigUint::from(4u32);
        let h = group.exponentiate(group.generator(), &w);

        let (prover_channel, verifier_channel) = LoopbackChannel::pair();

        let prover_params = params.clone();
        let prover_input = SigmaProverInput::dlog(&h, &w);
        let handle = thread::spawn(move || {
            let mut prover = ZkFromSigmaProver::new(
                prover_channel,
                SigmaDlogProverComputation::new(&prover_params),
                ChaCha12Rng::seed_from_u64(8675309),
            )
            .unwrap();

            // Several proofs share one commitment key
            for _ in 0..4 {
                prover.prove(&prover_input).unwrap();
            }
        });

        let mut verifier = ZkFromSigmaVerifier::new(
            verifier_channel,
            SigmaDlogVerifierComputation::new(&params),
            ChaCha12Rng::seed_from_u64(8675310),
        )
        .unwrap();
        for _ in 0..4 {
            assert!(verifier.verify(&SigmaCommonInput::dlog(&h)).unwrap());
        }
        handle.join().unwrap();

        // Nothing from the finished runs is kept
        assert_eq!(verifier.committer.commitment_count(), 0);
        assert!(verifier.computation.challenge().is_none());
    }

    #[test]
    fn test_malformed_second_message() {
        let params = small_params();
        let group = params.get_group();
        let w = BigUint::from(4u32);
        let h = group.exponentiate(group.generator(), &w);

        let (prover_channel, verifier_channel) = LoopbackChannel::pair();

        // The response is a single byte; inverting it sets the sign bit
        let prover_params = params.clone();
        let prover_input = SigmaProverInput::dlog(&h, &w);
        let handle = thread::spawn(move || {
            let mut prover = ZkFromSigmaProver::new(
                TamperingChannel::new(prover_channel, Some((2, 0, 0xFF))),
                SigmaDlogProverComputation::new(&prover_params),
                ChaCha12Rng::seed_from_u64(8675309),
            )
            .unwrap();
            prover.prove(&prover_input)
        });

        let mut verifier = ZkFromSigmaVerifier::new(
            verifier_channel,
            SigmaDlogVerifierComputation::new(&params),
            ChaCha12Rng::seed_from_u64(8675310),
        )
        .unwrap();
        assert!(!verifier.verify(&SigmaCommonInput::dlog(&h)).unwrap());
        assert!(handle.join().unwrap().is_ok());
        assert_eq!(verifier.committer.commitment_count(), 0);
    }

    #[test]
    fn test_and() {
        let params = large_params();
        let group = params.get_group();
        let witnesses = [BigUint::from(11u32), BigUint::from(22u32), BigUint::from(33u32)];
        let statements = witnesses
            .iter()
            .map(|w| group.exponentiate(group.generator(), w))
            .collect::<Vec<_>>();

        let (prover_channel, verifier_channel) = LoopbackChannel::pair();

        let prover_params = params.clone();
        let prover_input = SigmaProverInput::and(
            statements
                .iter()
                .zip(witnesses.iter())
                .map(|(h, w)| SigmaProverInput::dlog(h, w))
                .collect(),
        );
        let handle = thread::spawn(move || {
            let computation = SigmaAndProverComputation::new(
                (0..3)
                    .map(|_| {
                        Box::new(SigmaDlogProverComputation::new(&prover_params)) as Box<dyn SigmaProverComputation<_>>
                    })
                    .collect(),
            )
            .unwrap();
            let mut prover =
                ZkFromSigmaProver::new(prover_channel, computation, ChaCha12Rng::seed_from_u64(8675309)).unwrap();
            prover.prove(&prover_input)
        });

        let computation = SigmaAndVerifierComputation::new(
            (0..3)
                .map(|_| {
                    Box::new(SigmaDlogVerifierComputation::new(&params)) as Box<dyn SigmaVerifierComputation<_>>
                })
                .collect(),
        )
        .unwrap();
        let mut verifier =
            ZkFromSigmaVerifier::new(verifier_channel, computation, ChaCha12Rng::seed_from_u64(8675310)).unwrap();
        let input: SigmaCommonInput<ZpSafePrimeGroup> =
            SigmaCommonInput::and(statements.iter().map(SigmaCommonInput::dlog).collect());
        assert!(verifier.verify(&input).unwrap());
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn test_cheating_decommitment() {
        let params = large_params();
        let group = params.get_group().clone();
        let w = BigUint::from(4u32);
        let h = group.exponentiate(group.generator(), &w);

        let (prover_channel, mut verifier_channel) = LoopbackChannel::pair();

        let prover_params = params.clone();
        let prover_input = SigmaProverInput::dlog(&h, &w);
        let handle = thread::spawn(move || {
            let mut prover = ZkFromSigmaProver::new(
                prover_channel,
                SigmaDlogProverComputation::new(&prover_params),
                ChaCha12Rng::seed_from_u64(8675309),
            )
            .unwrap();
            prover.prove(&prover_input)
        });

        // A verifier that opens its commitment to a different challenge
        let mut rng = ChaCha12Rng::seed_from_u64(8675310);
        let mut committer = PedersenCommitter::new(&mut verifier_channel, &group).unwrap();
        committer
            .commit(
                &mut verifier_channel,
                &CommitValue::from_biguint(BigUint::from(1u32)),
                0,
                &mut rng,
            )
            .unwrap();
        verifier_channel.read_one().unwrap();

        let mut decommitment = committer.generate_decommitment_msg(0).unwrap();
        decommitment.x = CommitValue::from_biguint(BigUint::from(2u32));
        verifier_channel
            .write(&decommitment.to_bytes(group.scalar_size()).unwrap())
            .unwrap();

        assert!(matches!(
            handle.join().unwrap(),
            Err(ZkError::CheatAttempt { .. })
        ));
    }

    #[test]
    fn test_out_of_range_challenge() {
        let params = small_params();
        let group = params.get_group().clone();
        let w = BigUint::from(4u32);
        let h = group.exponentiate(group.generator(), &w);

        let (prover_channel, mut verifier_channel) = LoopbackChannel::pair();

        let prover_params = params.clone();
        let prover_input = SigmaProverInput::dlog(&h, &w);
        let handle = thread::spawn(move || {
            let mut prover = ZkFromSigmaProver::new(
                prover_channel,
                SigmaDlogProverComputation::new(&prover_params),
                ChaCha12Rng::seed_from_u64(8675309),
            )
            .unwrap();
            prover.prove(&prover_input)
        });

        // A verifier that honestly commits to a challenge outside `[0, 2^3)`
        let mut rng = ChaCha12Rng::seed_from_u64(8675310);
        let mut committer = PedersenCommitter::new(&mut verifier_channel, &group).unwrap();
        committer
            .commit(
                &mut verifier_channel,
                &CommitValue::from_biguint(BigUint::from(9u32)),
                0,
                &mut rng,
            )
            .unwrap();
        let a = verifier_channel.read_one().unwrap();
        let layout = SigmaDlogVerifierComputation::new(&params).first_message_layout();
        assert!(SigmaProtocolMsg::from_bytes(&a, &layout).is_ok());
        committer.decommit(&mut verifier_channel, 0).unwrap();

        assert!(matches!(
            handle.join().unwrap(),
            Err(ZkError::CheatAttempt { .. })
        ));
    }
}
