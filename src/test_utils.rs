// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

use alloc::{sync::Arc, vec::Vec};

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use crate::{
    channel::{Channel, ChannelError},
    group::{
        ristretto::RistrettoGroup,
        zp::{ZpElement, ZpSafePrimeGroup},
        DlogGroup,
        GroupError,
        SecurityLevel,
    },
    parameters::SigmaParameters,
};

// The toy group `p = 23, q = 11, g = 2`
pub(crate) fn small_group() -> Arc<ZpSafePrimeGroup> {
    Arc::new(ZpSafePrimeGroup::new(&BigUint::from(23u32), &BigUint::from(11u32), &BigUint::from(2u32)).unwrap())
}

// A 129-bit safe prime group: `p = 2^128 + 12451`
pub(crate) fn large_group() -> ZpSafePrimeGroup {
    let p = (BigUint::from(1u32) << 128u32) + 12451u32;
    let q = (&p - 1u32) >> 1u32;
    ZpSafePrimeGroup::new(&p, &q, &BigUint::from(4u32)).unwrap()
}

// Parameters over the toy group with the largest valid soundness parameter
pub(crate) fn small_params() -> SigmaParameters<ZpSafePrimeGroup> {
    SigmaParameters::new(&small_group(), 3).unwrap()
}

// Parameters over the large safe prime group
pub(crate) fn large_params() -> SigmaParameters<ZpSafePrimeGroup> {
    SigmaParameters::new(&Arc::new(large_group()), 80).unwrap()
}

// Parameters over Ristretto
pub(crate) fn ristretto_params() -> SigmaParameters<RistrettoGroup> {
    SigmaParameters::new(&Arc::new(RistrettoGroup::new()), 128).unwrap()
}

// A safe prime group that declares no hardness assumption
pub(crate) struct UnspecifiedGroup(pub(crate) ZpSafePrimeGroup);

impl DlogGroup for UnspecifiedGroup {
    type Element = ZpElement;

    fn generator(&self) -> &ZpElement {
        self.0.generator()
    }

    fn order(&self) -> &BigUint {
        self.0.order()
    }

    fn identity(&self) -> ZpElement {
        self.0.identity()
    }

    fn random_element(&self, rng: &mut dyn CryptoRngCore) -> ZpElement {
        self.0.random_element(rng)
    }

    fn exponentiate(&self, base: &ZpElement, exponent: &BigUint) -> ZpElement {
        self.0.exponentiate(base, exponent)
    }

    fn multiply(&self, left: &ZpElement, right: &ZpElement) -> ZpElement {
        self.0.multiply(left, right)
    }

    fn invert(&self, element: &ZpElement) -> ZpElement {
        self.0.invert(element)
    }

    fn is_member(&self, element: &ZpElement) -> bool {
        self.0.is_member(element)
    }

    fn validate_group(&self) -> bool {
        self.0.validate_group()
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::Unspecified
    }

    fn element_size(&self) -> usize {
        self.0.element_size()
    }

    fn element_to_bytes(&self, element: &ZpElement) -> Vec<u8> {
        self.0.element_to_bytes(element)
    }

    fn element_from_bytes(&self, bytes: &[u8]) -> Result<ZpElement, GroupError> {
        self.0.element_from_bytes(bytes)
    }
}

// A channel that XORs a mask into one byte of one outgoing message
pub(crate) struct TamperingChannel<C: Channel> {
    inner: C,
    // Index of the message to tamper, the byte within it, and the mask
    target: Option<(usize, usize, u8)>,
    written: usize,
}

impl<C: Channel> TamperingChannel<C> {
    pub(crate) fn new(inner: C, target: Option<(usize, usize, u8)>) -> Self {
        Self {
            inner,
            target,
            written: 0,
        }
    }
}

impl<C: Channel> Channel for TamperingChannel<C> {
    fn write(&mut self, message: &[u8]) -> Result<(), ChannelError> {
        let mut message = message.to_vec();
        if let Some((index, byte, mask)) = self.target {
            if index == self.written {
                message[byte] ^= mask;
            }
        }
        self.written += 1;

        self.inner.write(&message)
    }

    fn read_one(&mut self) -> Result<Vec<u8>, ChannelError> {
        self.inner.read_one()
    }

    fn close(&mut self) {
        self.inner.close()
    }
}
