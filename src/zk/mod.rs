// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Zero-knowledge protocols compiled from Sigma protocols.
//!
//! The verifier commits to its challenge before seeing the prover's first message, and decommits only afterward. The
//! prover plays the receiver of the commitment, so it holds the trapdoor; this inversion of roles is what makes the
//! result zero knowledge against any verifier.
//!
//! Both compilers accept any pair of Sigma computations, including AND-compositions.

use snafu::{prelude::*, IntoError};

use crate::{channel::ChannelError, commitment::CommitmentError, message::MessageError, sigma::SigmaError};

/// Zero-knowledge proofs from Sigma protocols.
pub mod from_sigma;
/// Zero-knowledge proofs of knowledge from Sigma protocols and trapdoor Pedersen commitments.
pub mod pok;

/// Errors that can arise relating to zero-knowledge protocols.
#[derive(Debug, Snafu)]
pub enum ZkError {
    /// The other party deviated from the protocol.
    #[snafu(display("Cheat attempt detected: {reason}"))]
    CheatAttempt {
        /// The reason for the cheating condition.
        reason: &'static str,
    },
    /// The underlying Sigma protocol failed.
    #[snafu(display("Sigma protocol error: {source}"))]
    Sigma {
        /// The underlying error.
        source: SigmaError,
    },
    /// The challenge commitment failed.
    #[snafu(display("Commitment error: {source}"))]
    Commitment {
        /// The underlying error.
        source: CommitmentError,
    },
    /// A message could not be encoded or decoded.
    #[snafu(context(false), display("Message error: {source}"))]
    Message {
        /// The underlying error.
        source: MessageError,
    },
    /// A channel operation failed.
    #[snafu(context(false), display("Channel error: {source}"))]
    Channel {
        /// The underlying error.
        source: ChannelError,
    },
}

// Cheating conditions surface directly, regardless of which layer detected them
impl From<SigmaError> for ZkError {
    fn from(error: SigmaError) -> Self {
        match error {
            SigmaError::CheatAttempt { reason } => Self::CheatAttempt { reason },
            SigmaError::Channel { source } => Self::Channel { source },
            SigmaError::Message { source } => Self::Message { source },
            source => SigmaSnafu.into_error(source),
        }
    }
}

impl From<CommitmentError> for ZkError {
    fn from(error: CommitmentError) -> Self {
        match error {
            CommitmentError::CheatAttempt { reason } => Self::CheatAttempt { reason },
            CommitmentError::Channel { source } => Self::Channel { source },
            CommitmentError::Message { source } => Self::Message { source },
            source => CommitmentSnafu.into_error(source),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        channel::ChannelError,
        commitment::CommitmentError,
        sigma::SigmaError,
        zk::ZkError,
    };

    #[test]
    fn test_error_conversion() {
        assert!(matches!(
            ZkError::from(SigmaError::CheatAttempt { reason: "test" }),
            ZkError::CheatAttempt { reason: "test" }
        ));
        assert!(matches!(
            ZkError::from(CommitmentError::CheatAttempt { reason: "test" }),
            ZkError::CheatAttempt { reason: "test" }
        ));
        assert!(matches!(
            ZkError::from(CommitmentError::Channel {
                source: ChannelError::Disconnected
            }),
            ZkError::Channel { .. }
        ));
        assert!(matches!(
            ZkError::from(SigmaError::OrderingViolation { reason: "test" }),
            ZkError::Sigma { .. }
        ));
        assert!(matches!(
            ZkError::from(CommitmentError::InvalidParameter { reason: "test" }),
            ZkError::Commitment { .. }
        ));
    }
}
