// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive Sigma protocols, and their compilation into zero-knowledge proofs of knowledge.
//!
//! # Overview
//!
//! A Sigma protocol is a three-move interactive proof of knowledge: the prover sends a first message `a`, the verifier
//! replies with a random challenge `e` of `t` bits, and the prover answers with a response `z`. Sigma protocols are
//! only honest-verifier zero knowledge: a verifier that picks its challenge after seeing `a` may learn something.
//!
//! This library compiles any Sigma protocol into a full zero-knowledge protocol by having the verifier commit to its
//! challenge _before_ the prover sends `a`, using a [Pedersen](`crate::commitment`) commitment. The prover plays the
//! commitment receiver and learns `e` only when the verifier decommits. Two compilers are provided:
//! - [`ZkFromSigmaProver`] and [`ZkFromSigmaVerifier`] yield a zero-knowledge proof.
//! - [`ZkPokFromSigmaCmtPedersenProver`] and [`ZkPokFromSigmaCmtPedersenVerifier`] use a trapdoor commitment and yield
//!   a zero-knowledge proof of knowledge.
//!
//! The shipped statement is [knowledge of a discrete logarithm](`crate::sigma::dlog`): `{ h ; w : g^w = h }`.
//! Any number of statements can be proven at once with a single shared challenge using
//! [AND-composition](`crate::sigma::and`), which works with both compilers and nests arbitrarily.
//!
//! # Implementation notes
//!
//! This implementation makes several opinionated choices:
//! - Group arithmetic is consumed through the [`DlogGroup`] trait. Two backends are provided: a prime-order subgroup of
//!   `Z_p^*` for a safe prime `p`, and [Ristretto](https://ristretto.group/).
//! - All randomness is supplied by the caller as a [`CryptoRngCore`](`rand_core::CryptoRngCore`).
//! - Messages are exchanged over a caller-supplied [`Channel`] that preserves message boundaries.
//!
//! The implementation is `no_std` friendly. There are several features available.
//!
//! | Feature | Default? | Description |
//! | :--- | :---: | :--- |
//! | `serde` | | Adds message serialization and deserialization via [`serde`](https://crates.io/crates/serde) |
//! | `std` | ✓ | Adds an in-memory loopback channel, and corresponding dependency features |
//!
//! # Warning
//!
//! While this implementation is written with security in mind, it is currently **experimental** and not suitable for
//! production use.
//!
//! # Example
//!
//! Here's a complete example of a zero-knowledge proof of knowledge of a discrete logarithm, run over an in-memory
//! channel between two threads.
//!
//! ```
//! # #[cfg(feature = "std")]
//! # {
//! use std::{sync::Arc, thread};
//!
//! use num_bigint::BigUint;
//! use rand_chacha::ChaCha12Rng;
//! use rand_core::SeedableRng;
//! use sigma_zkpok::*;
//!
//! // A small safe-prime group: p = 23, q = 11, g = 2
//! let group = Arc::new(
//!     ZpSafePrimeGroup::new(&BigUint::from(23u32), &BigUint::from(11u32), &BigUint::from(2u32)).unwrap(),
//! );
//!
//! // The soundness parameter must satisfy 2^t < q
//! let params = SigmaParameters::new(&group, 3).unwrap();
//!
//! // The prover knows `w` such that `g^w = h`
//! let w = BigUint::from(4u32);
//! let h = group.exponentiate(group.generator(), &w);
//!
//! let (prover_channel, verifier_channel) = LoopbackChannel::pair();
//!
//! // In practice you should use an actual random number generator; this is just for easier testing
//! let prover_rng = ChaCha12Rng::seed_from_u64(8675309);
//! let verifier_rng = ChaCha12Rng::seed_from_u64(8675310);
//!
//! let prover_input = SigmaProverInput::dlog(&h, &w);
//! let prover_params = params.clone();
//! let prover = thread::spawn(move || {
//!     let mut prover =
//!         ZkPokFromSigmaCmtPedersenProver::new(prover_channel, SigmaDlogProverComputation::new(&prover_params), prover_rng)
//!             .unwrap();
//!     prover.prove(&prover_input)
//! });
//!
//! let mut verifier =
//!     ZkPokFromSigmaCmtPedersenVerifier::new(verifier_channel, SigmaDlogVerifierComputation::new(&params), verifier_rng)
//!         .unwrap();
//! assert!(verifier.verify(&SigmaCommonInput::dlog(&h)).unwrap());
//! assert!(prover.join().unwrap().is_ok());
//! # }
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// Communication channels between the two parties.
pub mod channel;
pub use channel::{Channel, ChannelError};
#[cfg(feature = "std")]
pub use channel::LoopbackChannel;
/// Commitment schemes used to bind the verifier's challenge.
pub mod commitment;
pub use commitment::{
    pedersen::{PedersenCommitter, PedersenReceiver},
    trapdoor::{PedersenTrapdoorCommitter, PedersenTrapdoorReceiver},
    CommitPhaseOutput,
    CommitValue,
    CommitmentError,
    CommitmentMsg,
    DecommitmentMsg,
};
/// Discrete logarithm groups.
pub mod group;
pub use group::{ristretto::RistrettoGroup, zp::ZpSafePrimeGroup, DlogGroup, GroupError, SecurityLevel};
/// Sigma protocol messages and challenges.
pub mod message;
pub use message::{Challenge, MessageError, MessageLayout, SigmaProtocolMsg};
/// Public parameters shared by Sigma protocol computations.
pub mod parameters;
pub use parameters::{ParameterError, SigmaParameters};
/// Sigma protocols.
pub mod sigma;
pub use sigma::{
    and::{SigmaAndProverComputation, SigmaAndSimulator, SigmaAndVerifierComputation},
    dlog::{
        SigmaDlogCommonInput,
        SigmaDlogProverComputation,
        SigmaDlogProverInput,
        SigmaDlogSimulator,
        SigmaDlogVerifierComputation,
    },
    protocol::{SigmaProver, SigmaVerifier},
    SigmaCommonInput,
    SigmaError,
    SigmaProverComputation,
    SigmaProverInput,
    SigmaSimulator,
    SigmaVerifierComputation,
    SimulatorOutput,
};
/// Shared fixtures for tests.
#[cfg(test)]
pub(crate) mod test_utils;
/// Various utility functionality.
pub(crate) mod util;
/// Zero-knowledge protocols compiled from Sigma protocols.
pub mod zk;
pub use zk::{
    from_sigma::{ZkFromSigmaProver, ZkFromSigmaVerifier},
    pok::{ZkPokFromSigmaCmtPedersenProver, ZkPokFromSigmaCmtPedersenVerifier},
    ZkError,
};
