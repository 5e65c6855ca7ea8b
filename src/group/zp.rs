// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use alloc::vec::Vec;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;

use crate::{
    group::{DlogGroup, GroupError, SecurityLevel},
    util::{random_below, to_fixed_bytes},
};

// Bases used for Miller-Rabin primality testing; these are deterministic for all values below `3.18 * 10^23`
const PRIMALITY_BASES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

// Extra Miller-Rabin rounds with random bases, each passed by a composite with probability at most `1/4`
const RANDOM_PRIMALITY_ROUNDS: usize = 64;

/// An element of a [`ZpSafePrimeGroup`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ZpElement(BigUint);

impl ZpElement {
    /// Get the integer value of this element in `[1, p)`.
    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

/// The subgroup of quadratic residues of `Z_p^*`, where `p = 2q + 1` is a safe prime.
///
/// This subgroup has prime order `q`. The group is defined entirely by the parameters `(p, q, g)` supplied by the
/// caller; use [`DlogGroup::validate_group`] to check them. Primality checks there use fixed bases, which are only
/// exact for small parameters, so [`DlogGroup::validate_group_with_rng`] should be preferred for parameters from an
/// untrusted source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ZpSafePrimeGroup {
    p: BigUint,
    q: BigUint,
    g: ZpElement,
}

impl ZpSafePrimeGroup {
    /// Generate a new [`ZpSafePrimeGroup`] from a modulus `p`, order `q`, and generator `g`.
    ///
    /// It must be the case that `p = 2q + 1` and `1 < g < p`. If any of these conditions is not met, returns a
    /// [`GroupError`]. Primality and the order of `g` are not checked here; those are checked by
    /// [`DlogGroup::validate_group`].
    pub fn new(p: &BigUint, q: &BigUint, g: &BigUint) -> Result<Self, GroupError> {
        if q <= &BigUint::one() {
            return Err(GroupError::InvalidParameter { reason: "`q <= 1`" });
        }
        if p != &((q << 1u32) + 1u32) {
            return Err(GroupError::InvalidParameter {
                reason: "`p != 2q + 1`",
            });
        }
        if g <= &BigUint::one() || g >= p {
            return Err(GroupError::InvalidParameter {
                reason: "`g` is not in `(1, p)`",
            });
        }

        Ok(Self {
            p: p.clone(),
            q: q.clone(),
            g: ZpElement(g.clone()),
        })
    }

    /// Get the modulus `p`.
    pub fn get_p(&self) -> &BigUint {
        &self.p
    }

    // Check everything but primality
    fn validate_structure(&self) -> bool {
        if self.p != (&self.q << 1u32) + 1u32 {
            return false;
        }

        // The generator must have order exactly `q`, which is prime
        self.is_member(&self.g) && !self.g.0.is_one()
    }

    /// Generate an element from an integer value, checking that it is a group member.
    pub fn element(&self, value: &BigUint) -> Result<ZpElement, GroupError> {
        let element = ZpElement(value.clone());
        if !self.is_member(&element) {
            return Err(GroupError::InvalidElement {
                reason: "value is not a quadratic residue modulo `p`",
            });
        }

        Ok(element)
    }
}

/// Test for primality using Miller-Rabin over fixed bases.
///
/// This is exact below `3.18 * 10^23`, and only heuristic above it: a composite can be constructed to pass.
fn is_probable_prime(n: &BigUint) -> bool {
    if n < &BigUint::from(2u32) {
        return false;
    }

    // Handle small primes and trial division
    for base in PRIMALITY_BASES {
        let base = BigUint::from(base);
        if n == &base {
            return true;
        }
        if n.is_multiple_of(&base) {
            return false;
        }
    }

    PRIMALITY_BASES
        .iter()
        .all(|base| miller_rabin_round(n, &BigUint::from(*base)))
}

/// Test for primality using Miller-Rabin over fixed bases, followed by rounds with random bases.
fn is_prime_with_rng(n: &BigUint, rng: &mut dyn CryptoRngCore) -> bool {
    if !is_probable_prime(n) {
        return false;
    }

    // Small primes were handled exactly
    if n <= &BigUint::from(PRIMALITY_BASES[PRIMALITY_BASES.len() - 1]) {
        return true;
    }

    // Bases are drawn from `[2, n - 2]`
    let bound = n - 3u32;
    (0..RANDOM_PRIMALITY_ROUNDS).all(|_| miller_rabin_round(n, &(random_below(&bound, rng) + 2u32)))
}

/// Run one round of Miller-Rabin on an odd `n > 2`, returning `false` if `base` witnesses that `n` is composite.
fn miller_rabin_round(n: &BigUint, base: &BigUint) -> bool {
    // Write `n - 1 = d * 2^s` with `d` odd
    let n_minus_one = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;
    let two = BigUint::from(2u32);

    let mut x = base.modpow(&d, n);
    if x.is_one() || x == n_minus_one {
        return true;
    }
    for _ in 1..s {
        x = x.modpow(&two, n);
        if x == n_minus_one {
            return true;
        }
    }

    false
}

impl DlogGroup for ZpSafePrimeGroup {
    type Element = ZpElement;

    fn generator(&self) -> &ZpElement {
        &self.g
    }

    fn order(&self) -> &BigUint {
        &self.q
    }

    fn identity(&self) -> ZpElement {
        ZpElement(BigUint::one())
    }

    fn random_element(&self, rng: &mut dyn CryptoRngCore) -> ZpElement {
        let exponent = random_below(&self.q, rng);
        self.exponentiate(&self.g, &exponent)
    }

    fn exponentiate(&self, base: &ZpElement, exponent: &BigUint) -> ZpElement {
        ZpElement(base.0.modpow(&(exponent % &self.q), &self.p))
    }

    fn multiply(&self, left: &ZpElement, right: &ZpElement) -> ZpElement {
        ZpElement((&left.0 * &right.0) % &self.p)
    }

    fn invert(&self, element: &ZpElement) -> ZpElement {
        // Members have order `q`, so `x^(q - 1)` is the inverse
        ZpElement(element.0.modpow(&(&self.q - 1u32), &self.p))
    }

    fn is_member(&self, element: &ZpElement) -> bool {
        if element.0.is_zero() || element.0 >= self.p {
            return false;
        }

        element.0.modpow(&self.q, &self.p).is_one()
    }

    fn validate_group(&self) -> bool {
        is_probable_prime(&self.q) && is_probable_prime(&self.p) && self.validate_structure()
    }

    fn validate_group_with_rng(&self, rng: &mut dyn CryptoRngCore) -> bool {
        is_prime_with_rng(&self.q, rng) && is_prime_with_rng(&self.p, rng) && self.validate_structure()
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::Ddh
    }

    fn element_size(&self) -> usize {
        // This can't truncate, since the modulus bit length is bounded by memory
        #[allow(clippy::cast_possible_truncation)]
        let bits = self.p.bits() as usize;

        bits.div_ceil(8)
    }

    fn element_to_bytes(&self, element: &ZpElement) -> Vec<u8> {
        // Elements are reduced modulo `p`, so they always fit
        to_fixed_bytes(&element.0, self.element_size()).unwrap_or_default()
    }

    fn element_from_bytes(&self, bytes: &[u8]) -> Result<ZpElement, GroupError> {
        if bytes.len() != self.element_size() {
            return Err(GroupError::InvalidElement {
                reason: "encoded element has the wrong size",
            });
        }

        self.element(&BigUint::from_bytes_be(bytes))
    }
}
