// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Knowledge of a discrete logarithm.
//!
//! The prover convinces the verifier that it knows `w` with `g^w = h`:
//! 1. The prover samples `r` and sends `a = g^r`.
//! 2. The verifier sends a challenge `e` in `[0, 2^t)`.
//! 3. The prover sends `z = r + e*w mod q`.
//!
//! The verifier accepts if `h` is a group member and `g^z = a * h^e`.

use alloc::{boxed::Box, sync::Arc};

use num_bigint::{BigInt, BigUint, Sign};
use rand_core::CryptoRngCore;
use tracing::warn;

use crate::{
    group::DlogGroup,
    message::{Challenge, MessageLayout, SigmaProtocolMsg},
    parameters::SigmaParameters,
    sigma::{
        check_challenge,
        SigmaCommonInput,
        SigmaError,
        SigmaProverComputation,
        SigmaProverInput,
        SigmaSimulator,
        SigmaVerifierComputation,
        SimulatorOutput,
    },
    util::{random_below, SecretInt},
};

/// Public input for knowledge of a discrete logarithm: the element `h`.
pub struct SigmaDlogCommonInput<G: DlogGroup> {
    h: G::Element,
}

impl<G: DlogGroup> SigmaDlogCommonInput<G> {
    /// Generate a new [`SigmaDlogCommonInput`].
    pub fn new(h: &G::Element) -> Self {
        Self { h: h.clone() }
    }

    /// Get the element `h`.
    pub fn get_h(&self) -> &G::Element {
        &self.h
    }
}

impl<G: DlogGroup> Clone for SigmaDlogCommonInput<G> {
    fn clone(&self) -> Self {
        Self { h: self.h.clone() }
    }
}

/// Prover input for knowledge of a discrete logarithm: the element `h` and witness `w`.
pub struct SigmaDlogProverInput<G: DlogGroup> {
    h: G::Element,
    w: SecretInt,
}

impl<G: DlogGroup> SigmaDlogProverInput<G> {
    /// Generate a new [`SigmaDlogProverInput`].
    pub fn new(h: &G::Element, w: &BigUint) -> Self {
        Self {
            h: h.clone(),
            w: SecretInt::new(w.clone()),
        }
    }

    /// Get the element `h`.
    pub fn get_h(&self) -> &G::Element {
        &self.h
    }

    /// Get the witness `w`.
    pub fn get_w(&self) -> &BigUint {
        &self.w
    }

    /// Get the public part of this input.
    pub fn common_input(&self) -> SigmaDlogCommonInput<G> {
        SigmaDlogCommonInput::new(&self.h)
    }
}

// Prover state between the first and second messages
struct DlogProverState {
    r: SecretInt,
    w: SecretInt,
}

/// The prover's computations for knowledge of a discrete logarithm.
pub struct SigmaDlogProverComputation<G: DlogGroup> {
    params: SigmaParameters<G>,
    state: Option<DlogProverState>,
}

impl<G: DlogGroup> SigmaDlogProverComputation<G> {
    /// Generate a new [`SigmaDlogProverComputation`].
    pub fn new(params: &SigmaParameters<G>) -> Self {
        Self {
            params: params.clone(),
            state: None,
        }
    }
}

impl<G: DlogGroup> SigmaProverComputation<G> for SigmaDlogProverComputation<G> {
    fn get_group(&self) -> &Arc<G> {
        self.params.get_group()
    }

    fn soundness_param(&self) -> u32 {
        self.params.get_t()
    }

    fn compute_first_msg(
        &mut self,
        input: &SigmaProverInput<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaProtocolMsg, SigmaError> {
        let SigmaProverInput::Dlog(input) = input else {
            return Err(SigmaError::InvalidInput {
                reason: "expected discrete logarithm prover input",
            });
        };
        let group = self.params.get_group();

        // `a = g^r`
        let r = SecretInt::new(random_below(group.order(), rng));
        let a = group.exponentiate(group.generator(), &r);

        self.state = Some(DlogProverState {
            r,
            w: input.w.clone(),
        });

        Ok(SigmaProtocolMsg::GroupElement(group.element_to_bytes(&a)))
    }

    fn compute_second_msg(&mut self, challenge: &Challenge) -> Result<SigmaProtocolMsg, SigmaError> {
        let state = self.state.take().ok_or(SigmaError::OrderingViolation {
            reason: "second message requested before first message",
        })?;
        check_challenge(challenge, self.params.get_t())?;
        let group = self.params.get_group();

        // `z = r + e*w mod q`
        let z = (&*state.r + challenge.value() * &*state.w) % group.order();

        Ok(SigmaProtocolMsg::BigInteger {
            value: z,
            size: group.scalar_size(),
        })
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<G>> {
        Box::new(SigmaDlogSimulator::new(&self.params))
    }
}

/// The verifier's computations for knowledge of a discrete logarithm.
pub struct SigmaDlogVerifierComputation<G: DlogGroup> {
    params: SigmaParameters<G>,
    challenge: Option<Challenge>,
}

impl<G: DlogGroup> SigmaDlogVerifierComputation<G> {
    /// Generate a new [`SigmaDlogVerifierComputation`].
    pub fn new(params: &SigmaParameters<G>) -> Self {
        Self {
            params: params.clone(),
            challenge: None,
        }
    }
}

impl<G: DlogGroup> SigmaVerifierComputation<G> for SigmaDlogVerifierComputation<G> {
    fn get_group(&self) -> &Arc<G> {
        self.params.get_group()
    }

    fn soundness_param(&self) -> u32 {
        self.params.get_t()
    }

    fn set_challenge(&mut self, challenge: &Challenge) {
        self.challenge = Some(challenge.clone());
    }

    fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    fn take_challenge(&mut self) -> Option<Challenge> {
        self.challenge.take()
    }

    fn first_message_layout(&self) -> MessageLayout {
        MessageLayout::GroupElement(self.params.get_group().element_size())
    }

    fn second_message_layout(&self) -> MessageLayout {
        MessageLayout::BigInteger(self.params.get_group().scalar_size())
    }

    fn verify(
        &mut self,
        input: &SigmaCommonInput<G>,
        a: &SigmaProtocolMsg,
        z: &SigmaProtocolMsg,
    ) -> Result<bool, SigmaError> {
        let SigmaCommonInput::Dlog(input) = input else {
            return Err(SigmaError::InvalidInput {
                reason: "expected discrete logarithm common input",
            });
        };
        let (SigmaProtocolMsg::GroupElement(a), SigmaProtocolMsg::BigInteger { value: z, .. }) = (a, z) else {
            return Err(SigmaError::InvalidInput {
                reason: "expected a group element and an integer",
            });
        };
        let challenge = self.challenge.as_ref().ok_or(SigmaError::OrderingViolation {
            reason: "verification requested before a challenge was set",
        })?;
        let group = self.params.get_group();

        if !group.is_member(&input.h) {
            warn!("Common input is not a group member");
            return Ok(false);
        }
        let Ok(a) = group.element_from_bytes(a) else {
            warn!("First message is not a group member");
            return Ok(false);
        };

        // Check that `g^z = a * h^e`
        let left = group.exponentiate(group.generator(), z);
        let right = group.multiply(&a, &group.exponentiate(&input.h, challenge.value()));

        Ok(left == right)
    }
}

/// A simulator for knowledge of a discrete logarithm.
pub struct SigmaDlogSimulator<G: DlogGroup> {
    params: SigmaParameters<G>,
}

impl<G: DlogGroup> SigmaDlogSimulator<G> {
    /// Generate a new [`SigmaDlogSimulator`].
    pub fn new(params: &SigmaParameters<G>) -> Self {
        Self { params: params.clone() }
    }
}

impl<G: DlogGroup> SigmaSimulator<G> for SigmaDlogSimulator<G> {
    fn soundness_param(&self) -> u32 {
        self.params.get_t()
    }

    fn simulate(
        &self,
        input: &SigmaCommonInput<G>,
        challenge: &Challenge,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatorOutput, SigmaError> {
        let SigmaCommonInput::Dlog(input) = input else {
            return Err(SigmaError::InvalidInput {
                reason: "expected discrete logarithm common input",
            });
        };
        check_challenge(challenge, self.params.get_t())?;
        let group = self.params.get_group();

        // `a = g^z * h^(-e)`
        let z = random_below(group.order(), rng);
        let minus_e = BigInt::from_biguint(Sign::Minus, challenge.value().clone());
        let a = group.multiply(
            &group.exponentiate(group.generator(), &z),
            &group.exponentiate_signed(&input.h, &minus_e),
        );

        Ok(SimulatorOutput {
            a: SigmaProtocolMsg::GroupElement(group.element_to_bytes(&a)),
            e: challenge.clone(),
            z: SigmaProtocolMsg::BigInteger {
                value: z,
                size: group.scalar_size(),
            },
        })
    }
}
