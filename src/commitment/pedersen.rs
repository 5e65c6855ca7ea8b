// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use alloc::{collections::BTreeMap, sync::Arc};

use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;
use tracing::{debug, error, instrument};

use crate::{
    channel::Channel,
    commitment::{check_group, decode_element, CommitValue, CommitmentError, CommitmentMsg, DecommitmentMsg},
    group::DlogGroup,
    util::{random_below, SecretInt},
};

/// The values a [`PedersenCommitter`] records when it commits.
pub struct CommitmentPhaseValues<G: DlogGroup> {
    r: SecretInt,
    x: CommitValue,
    c: G::Element,
}

impl<G: DlogGroup> CommitmentPhaseValues<G> {
    /// Get the commitment randomness `r`.
    pub fn get_r(&self) -> &BigUint {
        &self.r
    }

    /// Get the committed value `x`.
    pub fn get_x(&self) -> &CommitValue {
        &self.x
    }

    /// Get the commitment `c = g^r * h^x`.
    pub fn get_c(&self) -> &G::Element {
        &self.c
    }
}

/// The committing party of a Pedersen commitment.
pub struct PedersenCommitter<G: DlogGroup> {
    group: Arc<G>,
    h: G::Element,
    commitments: BTreeMap<u64, CommitmentPhaseValues<G>>,
}

impl<G: DlogGroup> PedersenCommitter<G> {
    /// Generate a new [`PedersenCommitter`] by receiving the preprocessed value `h` from the receiver.
    ///
    /// This blocks until `h` arrives. If `h` is not a group member, returns a cheating condition.
    #[instrument(skip_all, err(Debug))]
    pub fn new<C: Channel + ?Sized>(channel: &mut C, group: &Arc<G>) -> Result<Self, CommitmentError> {
        let h = channel.read_one()?;

        Self::from_preprocessed_h(group, &h)
    }

    /// Generate a new [`PedersenCommitter`] from an encoded preprocessed value `h`.
    pub fn from_preprocessed_h(group: &Arc<G>, h: &[u8]) -> Result<Self, CommitmentError> {
        check_group(group.as_ref(), None)?;
        let h = decode_element(group.as_ref(), h)?;

        Ok(Self {
            group: group.clone(),
            h,
            commitments: BTreeMap::new(),
        })
    }

    /// Get the group.
    pub fn get_group(&self) -> &Arc<G> {
        &self.group
    }

    /// Get the preprocessed value `h`.
    pub fn get_preprocessed_h(&self) -> &G::Element {
        &self.h
    }

    /// Get the values recorded for a commitment, if any.
    pub fn get_commitment_phase_values(&self, id: u64) -> Option<&CommitmentPhaseValues<G>> {
        self.commitments.get(&id)
    }

    /// Remove the values recorded for a commitment once it is no longer needed, returning them if any.
    ///
    /// The randomness is wiped when the returned values are dropped.
    pub fn remove_commitment(&mut self, id: u64) -> Option<CommitmentPhaseValues<G>> {
        self.commitments.remove(&id)
    }

    /// Get the number of commitments still recorded.
    pub fn commitment_count(&self) -> usize {
        self.commitments.len()
    }

    /// Sample a uniformly random value that can be committed.
    pub fn sample_random_commit_value(&self, rng: &mut dyn CryptoRngCore) -> CommitValue {
        CommitValue::from_biguint(random_below(self.group.order(), rng))
    }

    /// Commit to `x` under identifier `id`, recording the commitment and returning the message to send.
    ///
    /// Committing again under an existing identifier replaces the earlier commitment. If `x` is not in `[0, q)`,
    /// returns a [`CommitmentError`].
    pub fn generate_commitment_msg(
        &mut self,
        x: &CommitValue,
        id: u64,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<CommitmentMsg, CommitmentError> {
        let group = self.group.as_ref();
        if x.to_biguint() >= group.order() {
            return Err(CommitmentError::InvalidParameter {
                reason: "commit value is not in `[0, q)`",
            });
        }

        // `c = g^r * h^x`
        let r = SecretInt::new(random_below(group.order(), rng));
        let c = group.multiply(
            &group.exponentiate(group.generator(), &r),
            &group.exponentiate(&self.h, x.to_biguint()),
        );

        let message = CommitmentMsg {
            id,
            c: group.element_to_bytes(&c),
        };
        self.commitments.insert(id, CommitmentPhaseValues { r, x: x.clone(), c });

        Ok(message)
    }

    /// Generate the decommitment message for a recorded commitment.
    pub fn generate_decommitment_msg(&self, id: u64) -> Result<DecommitmentMsg, CommitmentError> {
        let values = self.commitments.get(&id).ok_or(CommitmentError::InvalidParameter {
            reason: "no commitment was made under this identifier",
        })?;

        Ok(DecommitmentMsg {
            id,
            r: (*values.r).clone(),
            x: values.x.clone(),
        })
    }

    /// Commit to `x` under identifier `id` and send the commitment.
    #[instrument(skip_all, err(Debug))]
    pub fn commit<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
        x: &CommitValue,
        id: u64,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(), CommitmentError> {
        let message = self.generate_commitment_msg(x, id, rng)?;
        channel.write(&message.to_bytes())?;
        debug!(id, "Sent commitment");

        Ok(())
    }

    /// Send the decommitment for a recorded commitment.
    #[instrument(skip_all, err(Debug))]
    pub fn decommit<C: Channel + ?Sized>(&mut self, channel: &mut C, id: u64) -> Result<(), CommitmentError> {
        let message = self.generate_decommitment_msg(id)?;
        channel.write(&message.to_bytes(self.group.scalar_size())?)?;
        debug!(id, "Sent decommitment");

        Ok(())
    }
}

/// The receiving party of a Pedersen commitment.
pub struct PedersenReceiver<G: DlogGroup> {
    group: Arc<G>,
    trapdoor: SecretInt,
    h: G::Element,
    commitments: BTreeMap<u64, G::Element>,
}

impl<G: DlogGroup> PedersenReceiver<G> {
    /// Generate a new [`PedersenReceiver`] and send the preprocessed value `h` to the committer.
    ///
    /// The group must declare at least [`SecurityLevel::Dlog`](`crate::group::SecurityLevel::Dlog`) hardness and pass
    /// validation.
    #[instrument(skip_all, err(Debug))]
    pub fn new<C: Channel + ?Sized>(
        channel: &mut C,
        group: &Arc<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Self, CommitmentError> {
        let receiver = Self::generate(group, rng)?;
        channel.write(&receiver.group.element_to_bytes(&receiver.h))?;
        debug!("Sent preprocessed value");

        Ok(receiver)
    }

    /// Generate a new [`PedersenReceiver`] without sending anything, by sampling a trapdoor `a` and computing `h = g^a`.
    pub fn generate(group: &Arc<G>, rng: &mut dyn CryptoRngCore) -> Result<Self, CommitmentError> {
        check_group(group.as_ref(), Some(&mut *rng))?;

        let trapdoor = SecretInt::new(random_below(group.order(), rng));
        let h = group.exponentiate(group.generator(), &trapdoor);

        Ok(Self {
            group: group.clone(),
            trapdoor,
            h,
            commitments: BTreeMap::new(),
        })
    }

    /// Get the group.
    pub fn get_group(&self) -> &Arc<G> {
        &self.group
    }

    /// Get the preprocessed value `h`.
    pub fn get_preprocessed_h(&self) -> &G::Element {
        &self.h
    }

    pub(crate) fn trapdoor(&self) -> &BigUint {
        &self.trapdoor
    }

    /// Get the commitment recorded under an identifier, if any.
    pub fn get_commitment(&self, id: u64) -> Option<&G::Element> {
        self.commitments.get(&id)
    }

    /// Record a commitment message, returning its identifier.
    ///
    /// If the commitment is not a group element, returns a cheating condition.
    pub fn record_commitment(&mut self, message: &CommitmentMsg) -> Result<u64, CommitmentError> {
        let c = decode_element(self.group.as_ref(), &message.c)?;
        self.commitments.insert(message.id, c);

        Ok(message.id)
    }

    /// Verify a decommitment against its recorded commitment, returning the committed value.
    ///
    /// The recorded commitment is consumed whether or not verification succeeds. Any failure is a cheating condition:
    /// an identifier with no recorded commitment, a value outside `[0, q)`, or an opening that does not match.
    pub fn verify_decommitment(&mut self, message: &DecommitmentMsg) -> Result<CommitValue, CommitmentError> {
        let group = self.group.as_ref();

        let c = self.commitments.remove(&message.id).ok_or_else(|| {
            error!(id = message.id, "Decommitment for an unknown identifier");
            CommitmentError::CheatAttempt {
                reason: "no commitment was received under this identifier",
            }
        })?;
        if message.x.to_biguint() >= group.order() {
            error!(id = message.id, "Decommitted value is out of range");
            return Err(CommitmentError::CheatAttempt {
                reason: "committed value is not in `[0, q)`",
            });
        }

        // Check that `c == g^r * h^x`
        let expected = group.multiply(
            &group.exponentiate(group.generator(), &message.r),
            &group.exponentiate(&self.h, message.x.to_biguint()),
        );
        let matches: bool = group
            .element_to_bytes(&c)
            .as_slice()
            .ct_eq(group.element_to_bytes(&expected).as_slice())
            .into();
        if !matches {
            error!(id = message.id, "Decommitment does not open the commitment");
            return Err(CommitmentError::CheatAttempt {
                reason: "decommitment does not open the commitment",
            });
        }

        Ok(message.x.clone())
    }

    /// Receive a commitment, returning its identifier.
    #[instrument(skip_all, err(Debug))]
    pub fn receive_commitment<C: Channel + ?Sized>(&mut self, channel: &mut C) -> Result<u64, CommitmentError> {
        let bytes = channel.read_one()?;
        let message = CommitmentMsg::from_bytes(&bytes, self.group.element_size())?;
        let id = self.record_commitment(&message)?;
        debug!(id, "Received commitment");

        Ok(id)
    }

    /// Receive and verify the decommitment for identifier `id`, returning the committed value.
    ///
    /// The commitment under `id` is consumed whether or not verification succeeds.
    #[instrument(skip_all, err(Debug))]
    pub fn receive_decommitment<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
        id: u64,
    ) -> Result<CommitValue, CommitmentError> {
        let bytes = channel.read_one()?;
        let message = DecommitmentMsg::from_bytes(&bytes, self.group.scalar_size())?;
        if message.id != id {
            // The expected commitment can no longer be opened either
            self.commitments.remove(&id);
            error!(expected = id, received = message.id, "Decommitment has the wrong identifier");
            return Err(CommitmentError::CheatAttempt {
                reason: "decommitment has the wrong identifier",
            });
        }

        let x = self.verify_decommitment(&message)?;
        debug!(id, "Verified decommitment");

        Ok(x)
    }
}
