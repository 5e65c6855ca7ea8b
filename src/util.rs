// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use alloc::{vec, vec::Vec};
use core::ops::Deref;

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

/// A secret integer that is wiped when dropped.
///
/// `BigUint` keeps its limbs in a heap buffer, so wiping overwrites that buffer in place before the length is reset.
#[derive(Clone, Default)]
pub(crate) struct SecretInt(BigUint);

impl SecretInt {
    pub(crate) fn new(value: BigUint) -> Self {
        Self(value)
    }
}

impl Deref for SecretInt {
    type Target = BigUint;

    fn deref(&self) -> &BigUint {
        &self.0
    }
}

impl Zeroize for SecretInt {
    fn zeroize(&mut self) {
        #[allow(clippy::cast_possible_truncation)]
        let digits = self.0.bits().div_ceil(32) as usize;
        self.0.assign_from_slice(&vec![0u32; digits]);
    }
}

impl Drop for SecretInt {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Sample an integer uniformly from `[0, bound)`.
pub(crate) fn random_below(bound: &BigUint, rng: &mut dyn CryptoRngCore) -> BigUint {
    rng.gen_biguint_below(bound)
}

/// Compute `2^t`.
pub(crate) fn pow2(t: u32) -> BigUint {
    BigUint::one() << t
}

/// Encode a nonnegative integer as big-endian bytes of exactly `width` bytes.
///
/// Returns `None` if the value does not fit.
pub(crate) fn to_fixed_bytes(value: &BigUint, width: usize) -> Option<Vec<u8>> {
    if value.is_zero() {
        return Some(vec![0u8; width]);
    }
    let bytes = value.to_bytes_be();
    if bytes.len() > width {
        return None;
    }

    let mut result = vec![0u8; width - bytes.len()];
    result.extend_from_slice(&bytes);
    Some(result)
}

/// Decode a two's-complement big-endian integer, rejecting negative values.
pub(crate) fn from_signed_bytes(bytes: &[u8]) -> Option<BigUint> {
    let value = BigInt::from_signed_bytes_be(bytes);
    match value.sign() {
        Sign::Minus => None,
        _ => value.to_biguint(),
    }
}

/// Encode a nonnegative integer in its natural two's-complement big-endian form.
pub(crate) fn to_signed_bytes(value: &BigUint) -> Vec<u8> {
    BigInt::from_biguint(Sign::Plus, value.clone()).to_signed_bytes_be()
}

#[cfg(test)]
mod test {
    use num_bigint::BigUint;
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;
    use zeroize::Zeroize;

    use super::*;

    #[test]
    fn test_secret_int_zeroize() {
        let mut secret = SecretInt::new(BigUint::from(0xdead_beef_cafe_f00d_u64) << 100);
        assert!(!secret.is_zero());

        secret.zeroize();
        assert!(secret.is_zero());
    }

    #[test]
    fn test_random_below() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);
        let bound = BigUint::from(11u32);

        for _ in 0..256 {
            assert!(random_below(&bound, &mut rng) < bound);
        }
    }

    #[test]
    fn test_fixed_bytes() {
        assert_eq!(to_fixed_bytes(&BigUint::from(0u32), 2).unwrap(), [0u8, 0u8]);
        assert_eq!(to_fixed_bytes(&BigUint::from(0x0102u32), 3).unwrap(), [0u8, 1u8, 2u8]);
        assert!(to_fixed_bytes(&BigUint::from(0x010203u32), 2).is_none());
    }

    #[test]
    fn test_signed_bytes() {
        // A set high bit needs a leading zero byte to stay positive
        let value = BigUint::from(0x80u32);
        assert_eq!(to_signed_bytes(&value), [0u8, 0x80u8]);
        assert_eq!(from_signed_bytes(&[0u8, 0x80u8]).unwrap(), value);

        // Negative encodings are rejected
        assert!(from_signed_bytes(&[0x80u8]).is_none());

        // Leading zeros are accepted
        assert_eq!(from_signed_bytes(&[0u8, 0u8, 5u8]).unwrap(), BigUint::from(5u32));
    }
}
