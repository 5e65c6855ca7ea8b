// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use alloc::vec::Vec;

use num_bigint::{BigUint, RandBigInt};
use rand_core::CryptoRngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::util::{from_signed_bytes, pow2, to_fixed_bytes, to_signed_bytes};

/// Errors that can arise relating to message encoding.
#[derive(Debug, Snafu)]
pub enum MessageError {
    /// A message could not be encoded or decoded.
    #[snafu(display("Invalid message encoding: {reason}"))]
    InvalidEncoding {
        /// The reason for the encoding error.
        reason: &'static str,
    },
}

/// The expected shape of a [`SigmaProtocolMsg`].
///
/// Encoded messages carry no framing, so a decoder must know the shape in advance. Each Sigma protocol verifier
/// declares the layout of the messages it expects to receive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MessageLayout {
    /// A group element encoding of the given size in bytes.
    GroupElement(usize),
    /// A fixed-width integer of the given size in bytes.
    BigInteger(usize),
    /// An ordered list of messages.
    Multiple(Vec<MessageLayout>),
}

impl MessageLayout {
    /// Get the size in bytes of any message with this layout.
    pub fn serialized_size(&self) -> usize {
        match self {
            Self::GroupElement(size) | Self::BigInteger(size) => *size,
            Self::Multiple(layouts) => layouts.iter().map(|layout| layout.serialized_size()).sum(),
        }
    }
}

/// A message sent by a Sigma protocol prover.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SigmaProtocolMsg {
    /// A group element, held in the group's sendable encoding.
    GroupElement(Vec<u8>),
    /// An integer modulo the group order, encoded as a fixed-width two's-complement big-endian integer.
    BigInteger {
        /// The integer value.
        value: BigUint,
        /// The encoded width in bytes.
        size: usize,
    },
    /// An ordered list of messages, as produced by AND-composition.
    Multiple(Vec<SigmaProtocolMsg>),
}

impl SigmaProtocolMsg {
    /// Get the layout of this message.
    pub fn layout(&self) -> MessageLayout {
        match self {
            Self::GroupElement(bytes) => MessageLayout::GroupElement(bytes.len()),
            Self::BigInteger { size, .. } => MessageLayout::BigInteger(*size),
            Self::Multiple(messages) => MessageLayout::Multiple(messages.iter().map(|m| m.layout()).collect()),
        }
    }

    /// Get the size in bytes of the encoded message.
    pub fn serialized_size(&self) -> usize {
        self.layout().serialized_size()
    }

    /// Encode the message.
    ///
    /// Lists are encoded as the concatenation of their children in order, without framing. If an integer does not fit
    /// its declared width with a zero sign bit, returns a [`MessageError`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, MessageError> {
        let mut result = Vec::with_capacity(self.serialized_size());
        self.write_bytes(&mut result)?;

        Ok(result)
    }

    fn write_bytes(&self, buffer: &mut Vec<u8>) -> Result<(), MessageError> {
        match self {
            Self::GroupElement(bytes) => buffer.extend_from_slice(bytes),
            Self::BigInteger { value, size } => {
                // The top bit is reserved for the sign
                if value.bits() >= 8 * (*size as u64) {
                    return Err(MessageError::InvalidEncoding {
                        reason: "integer does not fit its declared width",
                    });
                }
                let bytes = to_fixed_bytes(value, *size).ok_or(MessageError::InvalidEncoding {
                    reason: "integer does not fit its declared width",
                })?;
                buffer.extend_from_slice(&bytes);
            },
            Self::Multiple(messages) => {
                for message in messages {
                    message.write_bytes(buffer)?;
                }
            },
        }

        Ok(())
    }

    /// Decode a message with a given layout.
    ///
    /// The input must be consumed exactly, and integers must be nonnegative. Group element encodings are only checked
    /// for size here; membership is checked by the party that interprets them.
    pub fn from_bytes(bytes: &[u8], layout: &MessageLayout) -> Result<Self, MessageError> {
        let mut remaining = bytes;
        let message = Self::read_bytes(&mut remaining, layout)?;
        if !remaining.is_empty() {
            return Err(MessageError::InvalidEncoding {
                reason: "trailing bytes after message",
            });
        }

        Ok(message)
    }

    fn read_bytes(remaining: &mut &[u8], layout: &MessageLayout) -> Result<Self, MessageError> {
        match layout {
            MessageLayout::GroupElement(size) => Ok(Self::GroupElement(take(remaining, *size)?.to_vec())),
            MessageLayout::BigInteger(size) => {
                let value = from_signed_bytes(take(remaining, *size)?).ok_or(MessageError::InvalidEncoding {
                    reason: "integer is negative",
                })?;

                Ok(Self::BigInteger { value, size: *size })
            },
            MessageLayout::Multiple(layouts) => Ok(Self::Multiple(
                layouts
                    .iter()
                    .map(|layout| Self::read_bytes(remaining, layout))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        }
    }
}

// Split off the next `size` bytes
fn take<'a>(remaining: &mut &'a [u8], size: usize) -> Result<&'a [u8], MessageError> {
    if remaining.len() < size {
        return Err(MessageError::InvalidEncoding {
            reason: "message is truncated",
        });
    }
    let (head, tail) = remaining.split_at(size);
    *remaining = tail;

    Ok(head)
}

/// A Sigma protocol challenge, an integer in `[0, 2^t)`.
///
/// On the wire, a challenge is its natural two's-complement big-endian encoding, so its length varies with its value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Challenge(BigUint);

impl Challenge {
    /// Sample a uniformly random challenge of `t` bits.
    pub fn random(t: u32, rng: &mut dyn CryptoRngCore) -> Self {
        Self(rng.gen_biguint(u64::from(t)))
    }

    /// Get the integer value of the challenge.
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    /// Check that the challenge lies in `[0, 2^t)`.
    pub fn check(&self, t: u32) -> bool {
        self.0 < pow2(t)
    }

    /// Encode the challenge.
    pub fn to_bytes(&self) -> Vec<u8> {
        to_signed_bytes(&self.0)
    }

    /// Decode a challenge of any length.
    ///
    /// Negative encodings are rejected. The range is not checked here; use [`Challenge::check`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        from_signed_bytes(bytes)
            .map(Self)
            .ok_or(MessageError::InvalidEncoding {
                reason: "challenge is negative",
            })
    }
}

impl From<BigUint> for Challenge {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}
