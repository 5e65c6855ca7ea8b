// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use alloc::vec::Vec;

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::CompressedRistretto,
    traits::Identity,
    RistrettoPoint,
    Scalar,
};
use num_bigint::BigUint;
use num_traits::One;
use rand_core::CryptoRngCore;

use crate::group::{DlogGroup, GroupError, SecurityLevel};

// Number of bytes in an encoded point or scalar
const ENCODING_BYTES: usize = 32;

/// The Ristretto255 prime-order group.
///
/// The generator is the standard Ristretto basepoint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RistrettoGroup {
    order: BigUint,
    generator: RistrettoPoint,
}

impl Default for RistrettoGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl RistrettoGroup {
    /// Generate a new [`RistrettoGroup`].
    pub fn new() -> Self {
        // The group order is `2^252 + 27742317777372353535851937790883648493`
        let order = (BigUint::one() << 252u32) + 27742317777372353535851937790883648493u128;

        Self {
            order,
            generator: RISTRETTO_BASEPOINT_POINT,
        }
    }

    /// Convert an integer exponent to a [`Scalar`], reducing it modulo the group order.
    pub fn to_scalar(&self, value: &BigUint) -> Scalar {
        let mut bytes = [0u8; ENCODING_BYTES];
        let reduced = (value % &self.order).to_bytes_le();
        bytes[..reduced.len()].copy_from_slice(&reduced);

        Scalar::from_bytes_mod_order(bytes)
    }
}

impl DlogGroup for RistrettoGroup {
    type Element = RistrettoPoint;

    fn generator(&self) -> &RistrettoPoint {
        &self.generator
    }

    fn order(&self) -> &BigUint {
        &self.order
    }

    fn identity(&self) -> RistrettoPoint {
        RistrettoPoint::identity()
    }

    fn random_element(&self, mut rng: &mut dyn CryptoRngCore) -> RistrettoPoint {
        RistrettoPoint::random(&mut rng)
    }

    fn exponentiate(&self, base: &RistrettoPoint, exponent: &BigUint) -> RistrettoPoint {
        self.to_scalar(exponent) * base
    }

    fn multiply(&self, left: &RistrettoPoint, right: &RistrettoPoint) -> RistrettoPoint {
        left + right
    }

    fn invert(&self, element: &RistrettoPoint) -> RistrettoPoint {
        -element
    }

    fn is_member(&self, _element: &RistrettoPoint) -> bool {
        // Every decoded Ristretto point is a group element
        true
    }

    fn validate_group(&self) -> bool {
        // The generator must be nontrivial and have the expected order
        self.generator != RistrettoPoint::identity() && self.exponentiate(&self.generator, &self.order) == self.identity()
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::Ddh
    }

    fn element_size(&self) -> usize {
        ENCODING_BYTES
    }

    fn element_to_bytes(&self, element: &RistrettoPoint) -> Vec<u8> {
        element.compress().to_bytes().to_vec()
    }

    fn element_from_bytes(&self, bytes: &[u8]) -> Result<RistrettoPoint, GroupError> {
        CompressedRistretto::from_slice(bytes)
            .map_err(|_| GroupError::InvalidElement {
                reason: "encoded element has the wrong size",
            })?
            .decompress()
            .ok_or(GroupError::InvalidElement {
                reason: "encoding is not a canonical Ristretto point",
            })
    }
}

#[cfg(test)]
mod test {
    use curve25519_dalek::{RistrettoPoint, Scalar};
    use num_bigint::BigUint;
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;

    use crate::group::{ristretto::RistrettoGroup, DlogGroup};

    #[test]
    fn test_order_and_validate() {
        let group = RistrettoGroup::new();
        assert!(group.validate_group());

        // The order reduces to zero as a scalar
        assert_eq!(group.to_scalar(group.order()), Scalar::ZERO);
        assert_eq!(group.to_scalar(&(group.order() - 1u32)), -Scalar::ONE);
    }

    #[test]
    fn test_arithmetic() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);
        let group = RistrettoGroup::new();

        let x = group.random_element(&mut rng);
        assert_eq!(group.multiply(&x, &group.invert(&x)), group.identity());

        let e = BigUint::from(12345u32);
        assert_eq!(group.exponentiate(group.generator(), &e), Scalar::from(12345u32) * group.generator());
    }

    #[test]
    fn test_encoding() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);
        let group = RistrettoGroup::new();

        let x: RistrettoPoint = group.random_element(&mut rng);
        let bytes = group.element_to_bytes(&x);
        assert_eq!(group.element_from_bytes(&bytes).unwrap(), x);

        // Wrong size
        assert!(group.element_from_bytes(&bytes[1..]).is_err());

        // Noncanonical encoding
        assert!(group.element_from_bytes(&[0xFFu8; 32]).is_err());
    }
}
