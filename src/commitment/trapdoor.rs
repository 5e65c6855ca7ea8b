// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use alloc::sync::Arc;

use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use subtle::{Choice, ConstantTimeEq};
use tracing::instrument;

use crate::{
    channel::Channel,
    commitment::{
        pedersen::{CommitmentPhaseValues, PedersenCommitter, PedersenReceiver},
        CommitPhaseOutput,
        CommitValue,
        CommitmentError,
    },
    group::DlogGroup,
};

/// The committing party of a trapdoor Pedersen commitment.
///
/// This commits exactly like [`PedersenCommitter`], and can additionally check a receiver's [`CommitPhaseOutput`]
/// against its own transcript.
pub struct PedersenTrapdoorCommitter<G: DlogGroup> {
    committer: PedersenCommitter<G>,
}

impl<G: DlogGroup> PedersenTrapdoorCommitter<G> {
    /// Generate a new [`PedersenTrapdoorCommitter`] by receiving the preprocessed value `h` from the receiver.
    pub fn new<C: Channel + ?Sized>(channel: &mut C, group: &Arc<G>) -> Result<Self, CommitmentError> {
        Ok(Self {
            committer: PedersenCommitter::new(channel, group)?,
        })
    }

    /// Generate a new [`PedersenTrapdoorCommitter`] from an encoded preprocessed value `h`.
    pub fn from_preprocessed_h(group: &Arc<G>, h: &[u8]) -> Result<Self, CommitmentError> {
        Ok(Self {
            committer: PedersenCommitter::from_preprocessed_h(group, h)?,
        })
    }

    /// Get the preprocessed value `h`.
    pub fn get_preprocessed_h(&self) -> &G::Element {
        self.committer.get_preprocessed_h()
    }

    /// Get the values recorded for a commitment, if any.
    pub fn get_commitment_phase_values(&self, id: u64) -> Option<&CommitmentPhaseValues<G>> {
        self.committer.get_commitment_phase_values(id)
    }

    /// Remove the values recorded for a commitment once it is no longer needed, returning them if any.
    pub fn remove_commitment(&mut self, id: u64) -> Option<CommitmentPhaseValues<G>> {
        self.committer.remove_commitment(id)
    }

    /// Get the number of commitments still recorded.
    pub fn commitment_count(&self) -> usize {
        self.committer.commitment_count()
    }

    /// Sample a uniformly random value that can be committed.
    pub fn sample_random_commit_value(&self, rng: &mut dyn CryptoRngCore) -> CommitValue {
        self.committer.sample_random_commit_value(rng)
    }

    /// Commit to `x` under identifier `id` and send the commitment.
    pub fn commit<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
        x: &CommitValue,
        id: u64,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(), CommitmentError> {
        self.committer.commit(channel, x, id, rng)
    }

    /// Send the decommitment for a recorded commitment.
    pub fn decommit<C: Channel + ?Sized>(&mut self, channel: &mut C, id: u64) -> Result<(), CommitmentError> {
        self.committer.decommit(channel, id)
    }

    /// Check that a receiver's commit phase output matches this committer's transcript.
    ///
    /// The output must name a recorded commitment, and carry the same `h` and `c` this committer used.
    pub fn validate(&self, trap: &CommitPhaseOutput) -> bool {
        let Some(values) = self.committer.get_commitment_phase_values(trap.id) else {
            return false;
        };
        let group = self.committer.get_group();

        let h = group.element_to_bytes(self.committer.get_preprocessed_h());
        let c = group.element_to_bytes(values.get_c());
        let valid: Choice = h.as_slice().ct_eq(trap.h.as_slice()) & c.as_slice().ct_eq(trap.c.as_slice());

        valid.into()
    }
}

/// The receiving party of a trapdoor Pedersen commitment.
///
/// The trapdoor `a` with `h = g^a` lets its holder open any commitment to any value. It is never sent.
pub struct PedersenTrapdoorReceiver<G: DlogGroup> {
    receiver: PedersenReceiver<G>,
}

impl<G: DlogGroup> PedersenTrapdoorReceiver<G> {
    /// Generate a new [`PedersenTrapdoorReceiver`] and send the preprocessed value `h` to the committer.
    pub fn new<C: Channel + ?Sized>(
        channel: &mut C,
        group: &Arc<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Self, CommitmentError> {
        Ok(Self {
            receiver: PedersenReceiver::new(channel, group, rng)?,
        })
    }

    /// Get the trapdoor `a`.
    pub fn get_trapdoor(&self) -> &BigUint {
        self.receiver.trapdoor()
    }

    /// Get the preprocessed value `h`.
    pub fn get_preprocessed_h(&self) -> &G::Element {
        self.receiver.get_preprocessed_h()
    }

    /// Receive a commitment, returning the record of this commit phase.
    #[instrument(skip_all, err(Debug))]
    pub fn receive_commitment<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
    ) -> Result<CommitPhaseOutput, CommitmentError> {
        let id = self.receiver.receive_commitment(channel)?;
        let group = self.receiver.get_group();

        // The commitment was just recorded
        let c = self.receiver.get_commitment(id).ok_or(CommitmentError::InvalidParameter {
            reason: "commitment was not recorded",
        })?;

        Ok(CommitPhaseOutput {
            id,
            h: group.element_to_bytes(self.receiver.get_preprocessed_h()),
            c: group.element_to_bytes(c),
        })
    }

    /// Receive and verify the decommitment for identifier `id`, returning the committed value.
    pub fn receive_decommitment<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
        id: u64,
    ) -> Result<CommitValue, CommitmentError> {
        self.receiver.receive_decommitment(channel, id)
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use alloc::sync::Arc;

    use num_bigint::BigUint;
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;

    use crate::{
        channel::LoopbackChannel,
        commitment::{
            trapdoor::{PedersenTrapdoorCommitter, PedersenTrapdoorReceiver},
            CommitValue,
        },
        group::DlogGroup,
        test_utils::large_group,
    };

    #[test]
    fn test_trapdoor() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);
        let group = Arc::new(large_group());
        let (mut committer_channel, mut receiver_channel) = LoopbackChannel::pair();

        let mut receiver = PedersenTrapdoorReceiver::new(&mut receiver_channel, &group, &mut rng).unwrap();
        let mut committer = PedersenTrapdoorCommitter::new(&mut committer_channel, &group).unwrap();

        // `h = g^a`
        assert_eq!(
            &group.exponentiate(group.generator(), receiver.get_trapdoor()),
            receiver.get_preprocessed_h()
        );

        let x = committer.sample_random_commit_value(&mut rng);
        committer.commit(&mut committer_channel, &x, 5, &mut rng).unwrap();
        let trap = receiver.receive_commitment(&mut receiver_channel).unwrap();
        assert_eq!(trap.id, 5);
        assert!(committer.validate(&trap));

        committer.decommit(&mut committer_channel, 5).unwrap();
        assert_eq!(receiver.receive_decommitment(&mut receiver_channel, 5).unwrap(), x);
    }

    #[test]
    fn test_trapdoor_opens_anything() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);
        let group = Arc::new(large_group());
        let (mut committer_channel, mut receiver_channel) = LoopbackChannel::pair();

        let receiver = PedersenTrapdoorReceiver::new(&mut receiver_channel, &group, &mut rng).unwrap();
        let mut committer = PedersenTrapdoorCommitter::new(&mut committer_channel, &group).unwrap();

        let x = CommitValue::from_biguint(BigUint::from(10u32));
        committer.commit(&mut committer_channel, &x, 0, &mut rng).unwrap();
        let values = committer.get_commitment_phase_values(0).unwrap();

        // With `a`, the opening `(r', x')` with `r' = r + a(x - x') mod q` opens the same commitment
        let q = group.order();
        let a = receiver.get_trapdoor();
        let x_prime = BigUint::from(3u32);
        let r_prime = (values.get_r() + a * (BigUint::from(10u32) - &x_prime)) % q;
        let opened = group.multiply(
            &group.exponentiate(group.generator(), &r_prime),
            &group.exponentiate(receiver.get_preprocessed_h(), &x_prime),
        );
        assert_eq!(&opened, values.get_c());
    }

    #[test]
    fn test_validate_mismatch() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);
        let group = Arc::new(large_group());
        let (mut committer_channel, mut receiver_channel) = LoopbackChannel::pair();

        let mut receiver = PedersenTrapdoorReceiver::new(&mut receiver_channel, &group, &mut rng).unwrap();
        let mut committer = PedersenTrapdoorCommitter::new(&mut committer_channel, &group).unwrap();

        let x = committer.sample_random_commit_value(&mut rng);
        committer.commit(&mut committer_channel, &x, 1, &mut rng).unwrap();
        let trap = receiver.receive_commitment(&mut receiver_channel).unwrap();

        // Unknown identifier
        let mut evil = trap.clone();
        evil.id = 2;
        assert!(!committer.validate(&evil));

        // Different commitment
        let mut evil = trap.clone();
        evil.c = group.element_to_bytes(&group.random_element(&mut rng));
        assert!(!committer.validate(&evil));

        // Different preprocessed value
        let mut evil = trap;
        evil.h = group.element_to_bytes(&group.random_element(&mut rng));
        assert!(!committer.validate(&evil));
    }
}
