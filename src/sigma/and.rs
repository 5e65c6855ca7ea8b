// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! AND-composition of Sigma protocols.
//!
//! Any number of Sigma protocols run in parallel under a single shared challenge, proving that every statement
//! holds. Components may themselves be compositions. All components must use the same soundness parameter, and every
//! call must supply exactly one input or message per component.

use alloc::{boxed::Box, sync::Arc, vec::Vec};

use itertools::izip;
use rand_core::CryptoRngCore;
use tracing::warn;

use crate::{
    group::DlogGroup,
    message::{Challenge, MessageLayout, SigmaProtocolMsg},
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
};

// Check that a nonempty list of components agrees on the soundness parameter, returning it
fn common_soundness_param(params: impl Iterator<Item = u32>) -> Result<u32, SigmaError> {
    let mut params = params;
    let t = params.next().ok_or(SigmaError::InvalidParameter {
        reason: "composition has no components",
    })?;
    if params.any(|other| other != t) {
        return Err(SigmaError::InvalidParameter {
            reason: "components use different soundness parameters",
        });
    }

    Ok(t)
}

// Unpack a composite input or message, checking its length
fn components<T>(items: &[T], n: usize) -> Result<&[T], SigmaError> {
    if items.len() != n {
        return Err(SigmaError::InvalidInput {
            reason: "number of components does not match the composition",
        });
    }

    Ok(items)
}

fn multiple_components(message: &SigmaProtocolMsg, n: usize) -> Result<&[SigmaProtocolMsg], SigmaError> {
    match message {
        SigmaProtocolMsg::Multiple(messages) => components(messages, n),
        _ => Err(SigmaError::InvalidInput {
            reason: "expected a composite message",
        }),
    }
}

/// The prover's computations for an AND-composition.
pub struct SigmaAndProverComputation<G: DlogGroup> {
    provers: Vec<Box<dyn SigmaProverComputation<G>>>,
    t: u32,
}

impl<G: DlogGroup> SigmaAndProverComputation<G> {
    /// Generate a new [`SigmaAndProverComputation`] from a nonempty list of provers.
    ///
    /// If the list is empty, or the provers use different soundness parameters, returns a [`SigmaError`].
    pub fn new(provers: Vec<Box<dyn SigmaProverComputation<G>>>) -> Result<Self, SigmaError> {
        let t = common_soundness_param(provers.iter().map(|prover| prover.soundness_param()))?;

        Ok(Self { provers, t })
    }
}

impl<G: DlogGroup> SigmaProverComputation<G> for SigmaAndProverComputation<G> {
    fn get_group(&self) -> &Arc<G> {
        // Construction guarantees a first component
        self.provers[0].get_group()
    }

    fn soundness_param(&self) -> u32 {
        self.t
    }

    fn compute_first_msg(
        &mut self,
        input: &SigmaProverInput<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaProtocolMsg, SigmaError> {
        let SigmaProverInput::And(inputs) = input else {
            return Err(SigmaError::InvalidInput {
                reason: "expected composite prover input",
            });
        };
        let inputs = components(inputs, self.provers.len())?;

        let messages = izip!(self.provers.iter_mut(), inputs)
            .map(|(prover, input)| prover.compute_first_msg(input, rng))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SigmaProtocolMsg::Multiple(messages))
    }

    fn compute_second_msg(&mut self, challenge: &Challenge) -> Result<SigmaProtocolMsg, SigmaError> {
        check_challenge(challenge, self.t)?;

        // Every component answers the same challenge
        let messages = self
            .provers
            .iter_mut()
            .map(|prover| prover.compute_second_msg(challenge))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SigmaProtocolMsg::Multiple(messages))
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<G>> {
        Box::new(SigmaAndSimulator {
            simulators: self.provers.iter().map(|prover| prover.simulator()).collect(),
            t: self.t,
        })
    }
}

/// The verifier's computations for an AND-composition.
pub struct SigmaAndVerifierComputation<G: DlogGroup> {
    verifiers: Vec<Box<dyn SigmaVerifierComputation<G>>>,
    t: u32,
    challenge: Option<Challenge>,
}

impl<G: DlogGroup> SigmaAndVerifierComputation<G> {
    /// Generate a new [`SigmaAndVerifierComputation`] from a nonempty list of verifiers.
    ///
    /// If the list is empty, or the verifiers use different soundness parameters, returns a [`SigmaError`].
    pub fn new(verifiers: Vec<Box<dyn SigmaVerifierComputation<G>>>) -> Result<Self, SigmaError> {
        let t = common_soundness_param(verifiers.iter().map(|verifier| verifier.soundness_param()))?;

        Ok(Self {
            verifiers,
            t,
            challenge: None,
        })
    }
}

impl<G: DlogGroup> SigmaVerifierComputation<G> for SigmaAndVerifierComputation<G> {
    fn get_group(&self) -> &Arc<G> {
        // Construction guarantees a first component
        self.verifiers[0].get_group()
    }

    fn soundness_param(&self) -> u32 {
        self.t
    }

    fn set_challenge(&mut self, challenge: &Challenge) {
        for verifier in &mut self.verifiers {
            verifier.set_challenge(challenge);
        }
        self.challenge = Some(challenge.clone());
    }

    fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    fn take_challenge(&mut self) -> Option<Challenge> {
        for verifier in &mut self.verifiers {
            verifier.take_challenge();
        }
        self.challenge.take()
    }

    fn first_message_layout(&self) -> MessageLayout {
        MessageLayout::Multiple(self.verifiers.iter().map(|verifier| verifier.first_message_layout()).collect())
    }

    fn second_message_layout(&self) -> MessageLayout {
        MessageLayout::Multiple(self.verifiers.iter().map(|verifier| verifier.second_message_layout()).collect())
    }

    fn verify(
        &mut self,
        input: &SigmaCommonInput<G>,
        a: &SigmaProtocolMsg,
        z: &SigmaProtocolMsg,
    ) -> Result<bool, SigmaError> {
        if self.challenge.is_none() {
            return Err(SigmaError::OrderingViolation {
                reason: "verification requested before a challenge was set",
            });
        }
        let SigmaCommonInput::And(inputs) = input else {
            return Err(SigmaError::InvalidInput {
                reason: "expected composite common input",
            });
        };
        let n = self.verifiers.len();
        let inputs = components(inputs, n)?;
        let a = multiple_components(a, n)?;
        let z = multiple_components(z, n)?;

        // Check every component, so each failure is reported
        let mut accepted = true;
        for (index, (verifier, input, a, z)) in izip!(self.verifiers.iter_mut(), inputs, a, z).enumerate() {
            if !verifier.verify(input, a, z)? {
                warn!(index, "Component proof was rejected");
                accepted = false;
            }
        }

        Ok(accepted)
    }
}

/// A simulator for an AND-composition.
pub struct SigmaAndSimulator<G: DlogGroup> {
    simulators: Vec<Box<dyn SigmaSimulator<G>>>,
    t: u32,
}

impl<G: DlogGroup> SigmaAndSimulator<G> {
    /// Generate a new [`SigmaAndSimulator`] from a nonempty list of simulators.
    ///
    /// If the list is empty, or the simulators use different soundness parameters, returns a [`SigmaError`].
    pub fn new(simulators: Vec<Box<dyn SigmaSimulator<G>>>) -> Result<Self, SigmaError> {
        let t = common_soundness_param(simulators.iter().map(|simulator| simulator.soundness_param()))?;

        Ok(Self { simulators, t })
    }
}

impl<G: DlogGroup> SigmaSimulator<G> for SigmaAndSimulator<G> {
    fn soundness_param(&self) -> u32 {
        self.t
    }

    fn simulate(
        &self,
        input: &SigmaCommonInput<G>,
        challenge: &Challenge,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatorOutput, SigmaError> {
        let SigmaCommonInput::And(inputs) = input else {
            return Err(SigmaError::InvalidInput {
                reason: "expected composite common input",
            });
        };
        let inputs = components(inputs, self.simulators.len())?;
        check_challenge(challenge, self.t)?;

        let mut a = Vec::with_capacity(inputs.len());
        let mut z = Vec::with_capacity(inputs.len());
        for (simulator, input) in izip!(&self.simulators, inputs) {
            let output = simulator.simulate(input, challenge, rng)?;
            a.push(output.a);
            z.push(output.z);
        }

        Ok(SimulatorOutput {
            a: SigmaProtocolMsg::Multiple(a),
            e: challenge.clone(),
            z: SigmaProtocolMsg::Multiple(z),
        })
    }
}
