// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Discrete logarithm groups.
//!
//! Every protocol in this library treats its group as an opaque capability: a cyclic group of prime order `q` with a
//! fixed generator `g`, whose elements can be multiplied, exponentiated, checked for membership, and converted to and
//! from a fixed-size byte encoding. Exponents are always integers, reduced modulo `q`.

use alloc::vec::Vec;
use core::fmt::Debug;

use num_bigint::{BigInt, BigUint, Sign};
use rand_core::CryptoRngCore;
use snafu::prelude::*;

/// A prime-order subgroup of `Z_p^*` for a safe prime `p`.
pub mod zp;
/// The Ristretto255 group.
pub mod ristretto;

/// The hardness assumption a [`DlogGroup`] declares it satisfies.
///
/// Levels are ordered: a group satisfying [`SecurityLevel::Ddh`] also satisfies [`SecurityLevel::Cdh`] and
/// [`SecurityLevel::Dlog`].
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum SecurityLevel {
    /// No hardness assumption is declared.
    Unspecified,
    /// Discrete logarithms are hard.
    Dlog,
    /// The computational Diffie-Hellman problem is hard.
    Cdh,
    /// The decisional Diffie-Hellman problem is hard.
    Ddh,
}

/// Errors that can arise relating to [`DlogGroup`].
#[derive(Debug, Snafu)]
pub enum GroupError {
    /// An invalid parameter was provided.
    #[snafu(display("An invalid parameter was provided: {reason}"))]
    InvalidParameter {
        /// The reason for the parameter error.
        reason: &'static str,
    },
    /// An encoded element was malformed or not a group member.
    #[snafu(display("An invalid group element was provided: {reason}"))]
    InvalidElement {
        /// The reason for the element error.
        reason: &'static str,
    },
}

/// A cyclic group of prime order in which discrete logarithms are hard.
///
/// Implementations must be safe for concurrent read-only use, since a single group is shared by every party and
/// protocol instance that uses it.
pub trait DlogGroup: Send + Sync + 'static {
    /// The type of group elements.
    type Element: Clone + Debug + Eq + Send + Sync + 'static;

    /// Get the fixed generator `g` of the group.
    fn generator(&self) -> &Self::Element;

    /// Get the prime order `q` of the group.
    fn order(&self) -> &BigUint;

    /// Get the identity element.
    fn identity(&self) -> Self::Element;

    /// Sample a uniformly random group element.
    fn random_element(&self, rng: &mut dyn CryptoRngCore) -> Self::Element;

    /// Compute `base^exponent`, where the exponent is reduced modulo the group order.
    fn exponentiate(&self, base: &Self::Element, exponent: &BigUint) -> Self::Element;

    /// Compute the group operation on two elements.
    fn multiply(&self, left: &Self::Element, right: &Self::Element) -> Self::Element;

    /// Compute the inverse of an element.
    fn invert(&self, element: &Self::Element) -> Self::Element;

    /// Check if an element is a member of the group.
    fn is_member(&self, element: &Self::Element) -> bool;

    /// Check that the group parameters are valid.
    ///
    /// This includes checking that the order is prime and that the generator actually generates the group.
    fn validate_group(&self) -> bool;

    /// Check that the group parameters are valid, using randomness to strengthen any probabilistic checks.
    fn validate_group_with_rng(&self, _rng: &mut dyn CryptoRngCore) -> bool {
        self.validate_group()
    }

    /// Get the hardness assumption this group declares.
    fn security_level(&self) -> SecurityLevel;

    /// Get the size in bytes of an encoded group element.
    fn element_size(&self) -> usize;

    /// Encode a group element as sendable bytes of exactly [`DlogGroup::element_size`] bytes.
    fn element_to_bytes(&self, element: &Self::Element) -> Vec<u8>;

    /// Decode a group element from sendable bytes, checking that it is a group member.
    fn element_from_bytes(&self, bytes: &[u8]) -> Result<Self::Element, GroupError>;

    /// Get the size in bytes of an encoded integer modulo the group order.
    ///
    /// This is a two's-complement width: it always leaves room for a zero sign bit above the order's bit length.
    fn scalar_size(&self) -> usize {
        // This can't truncate, since the order's bit length is bounded by memory
        #[allow(clippy::cast_possible_truncation)]
        let bits = self.order().bits() as usize;

        bits / 8 + 1
    }

    /// Compute `base^exponent` for a signed exponent.
    ///
    /// A negative exponent `-x` is treated as `q - (x mod q)`.
    fn exponentiate_signed(&self, base: &Self::Element, exponent: &BigInt) -> Self::Element {
        let q = BigInt::from_biguint(Sign::Plus, self.order().clone());
        let reduced = ((exponent % &q) + &q) % &q;

        // The reduced exponent is nonnegative by construction
        let reduced = reduced.to_biguint().unwrap_or_default();
        self.exponentiate(base, &reduced)
    }
}
