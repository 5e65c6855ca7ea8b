// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Pedersen commitments.
//!
//! The receiver samples a trapdoor `a` and sends `h = g^a` to the committer once per session. To commit to `x` in
//! `[0, q)`, the committer samples `r` and sends `c = g^r * h^x` under an application-chosen identifier; to decommit, it
//! sends `(r, x)` under the same identifier. The scheme is perfectly hiding, and binding under the discrete logarithm
//! assumption.
//!
//! Each party offers pure halves that produce or consume messages, as well as networked operations that exchange them
//! over a [`Channel`](`crate::channel::Channel`).

use alloc::vec::Vec;

use num_bigint::BigUint;
use rand_core::CryptoRngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use tracing::error;

use crate::{
    channel::ChannelError,
    group::{DlogGroup, GroupError, SecurityLevel},
    message::MessageError,
    util::{from_signed_bytes, to_fixed_bytes, to_signed_bytes},
};

/// Plain Pedersen commitments.
pub mod pedersen;
/// Pedersen commitments whose receiver exposes its trapdoor.
pub mod trapdoor;

// Size of an encoded commitment identifier
const ID_BYTES: usize = 8;

/// Errors that can arise relating to commitments.
#[derive(Debug, Snafu)]
pub enum CommitmentError {
    /// An invalid parameter was provided.
    #[snafu(display("An invalid parameter was provided: {reason}"))]
    InvalidParameter {
        /// The reason for the parameter error.
        reason: &'static str,
    },
    /// The other party deviated from the protocol.
    #[snafu(display("Cheat attempt detected: {reason}"))]
    CheatAttempt {
        /// The reason for the cheating condition.
        reason: &'static str,
    },
    /// A message could not be encoded or decoded.
    #[snafu(context(false), display("Commitment message error: {source}"))]
    Message {
        /// The underlying error.
        source: MessageError,
    },
    /// A channel operation failed.
    #[snafu(context(false), display("Commitment channel error: {source}"))]
    Channel {
        /// The underlying error.
        source: ChannelError,
    },
}

/// A value to be committed, an integer in `[0, q)`.
///
/// Values convert freely between integers and their two's-complement big-endian byte encodings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommitValue(BigUint);

impl CommitValue {
    /// Generate a [`CommitValue`] from an integer.
    pub fn from_biguint(value: BigUint) -> Self {
        Self(value)
    }

    /// Generate a [`CommitValue`] from a two's-complement big-endian encoding, rejecting negative values.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CommitmentError> {
        from_signed_bytes(bytes).map(Self).ok_or(CommitmentError::InvalidParameter {
            reason: "commit value is negative",
        })
    }

    /// Get the integer value.
    pub fn to_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Get the two's-complement big-endian encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        to_signed_bytes(&self.0)
    }
}

/// The commitment `c` sent under an identifier.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommitmentMsg {
    /// The commitment identifier.
    pub id: u64,
    /// The encoded commitment element.
    pub c: Vec<u8>,
}

impl CommitmentMsg {
    /// Encode as the identifier followed by the element encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(ID_BYTES + self.c.len());
        result.extend_from_slice(&self.id.to_be_bytes());
        result.extend_from_slice(&self.c);

        result
    }

    /// Decode a message whose element encoding has `element_size` bytes.
    pub fn from_bytes(bytes: &[u8], element_size: usize) -> Result<Self, MessageError> {
        if bytes.len() != ID_BYTES + element_size {
            return Err(MessageError::InvalidEncoding {
                reason: "commitment message has the wrong size",
            });
        }
        let (id, c) = split_id(bytes)?;

        Ok(Self { id, c: c.to_vec() })
    }
}

/// The opening `(r, x)` sent under an identifier.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecommitmentMsg {
    /// The commitment identifier.
    pub id: u64,
    /// The commitment randomness.
    pub r: BigUint,
    /// The committed value.
    pub x: CommitValue,
}

impl DecommitmentMsg {
    /// Encode as the identifier, then `r` as a fixed-width integer of `scalar_size` bytes, then the encoding of `x`.
    pub fn to_bytes(&self, scalar_size: usize) -> Result<Vec<u8>, MessageError> {
        let r = to_fixed_bytes(&self.r, scalar_size).ok_or(MessageError::InvalidEncoding {
            reason: "randomness does not fit its declared width",
        })?;

        let mut result = Vec::with_capacity(ID_BYTES + scalar_size);
        result.extend_from_slice(&self.id.to_be_bytes());
        result.extend_from_slice(&r);
        result.extend_from_slice(&self.x.to_bytes());

        Ok(result)
    }

    /// Decode a message whose randomness has `scalar_size` bytes; the committed value takes the remainder.
    pub fn from_bytes(bytes: &[u8], scalar_size: usize) -> Result<Self, MessageError> {
        let (id, rest) = split_id(bytes)?;
        if rest.len() < scalar_size {
            return Err(MessageError::InvalidEncoding {
                reason: "decommitment message is truncated",
            });
        }
        let (r, x) = rest.split_at(scalar_size);

        Ok(Self {
            id,
            r: BigUint::from_bytes_be(r),
            x: CommitValue(from_signed_bytes(x).ok_or(MessageError::InvalidEncoding {
                reason: "committed value is negative",
            })?),
        })
    }
}

/// The receiver's record of a commit phase: the identifier, the preprocessed value `h`, and the commitment `c`.
///
/// This is a transcript reference that lets the committer confirm which commit phase the receiver observed. It
/// contains no secret material.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommitPhaseOutput {
    /// The commitment identifier.
    pub id: u64,
    /// The encoded preprocessed value `h`.
    pub h: Vec<u8>,
    /// The encoded commitment `c`.
    pub c: Vec<u8>,
}

impl CommitPhaseOutput {
    /// Encode as the identifier followed by the encodings of `h` and `c`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(ID_BYTES + self.h.len() + self.c.len());
        result.extend_from_slice(&self.id.to_be_bytes());
        result.extend_from_slice(&self.h);
        result.extend_from_slice(&self.c);

        result
    }

    /// Decode an output whose element encodings each have `element_size` bytes.
    pub fn from_bytes(bytes: &[u8], element_size: usize) -> Result<Self, MessageError> {
        if bytes.len() != ID_BYTES + 2 * element_size {
            return Err(MessageError::InvalidEncoding {
                reason: "commit phase output has the wrong size",
            });
        }
        let (id, rest) = split_id(bytes)?;
        let (h, c) = rest.split_at(element_size);

        Ok(Self {
            id,
            h: h.to_vec(),
            c: c.to_vec(),
        })
    }
}

// Split a leading identifier from the rest of a message
fn split_id(bytes: &[u8]) -> Result<(u64, &[u8]), MessageError> {
    if bytes.len() < ID_BYTES {
        return Err(MessageError::InvalidEncoding {
            reason: "message is missing its identifier",
        });
    }
    let (id, rest) = bytes.split_at(ID_BYTES);
    let mut id_bytes = [0u8; ID_BYTES];
    id_bytes.copy_from_slice(id);

    Ok((u64::from_be_bytes(id_bytes), rest))
}

// Check that a group is suitable for Pedersen commitments
fn check_group<G: DlogGroup>(group: &G, rng: Option<&mut dyn CryptoRngCore>) -> Result<(), CommitmentError> {
    if group.security_level() < SecurityLevel::Dlog {
        return Err(CommitmentError::InvalidParameter {
            reason: "group does not declare discrete logarithm hardness",
        });
    }
    let valid = match rng {
        Some(rng) => group.validate_group_with_rng(rng),
        None => group.validate_group(),
    };
    if !valid {
        return Err(CommitmentError::InvalidParameter {
            reason: "group parameters are invalid",
        });
    }

    Ok(())
}

// Decode an element received from the other party; a bad element is a cheating condition
fn decode_element<G: DlogGroup>(group: &G, bytes: &[u8]) -> Result<G::Element, CommitmentError> {
    group.element_from_bytes(bytes).map_err(|error| {
        let reason = match error {
            GroupError::InvalidElement { reason } | GroupError::InvalidParameter { reason } => reason,
        };
        error!(reason, "Received an invalid group element");

        CommitmentError::CheatAttempt {
            reason: "received an invalid group element",
        }
    })
}
