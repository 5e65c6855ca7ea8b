// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

//! A service holds two public keys for a user: one used for signing, and one used for key agreement.
//! Before granting access, it wants the user to prove knowledge of both private keys at once, without learning
//! anything about them.
//!
//! This example shows how to run such a proof over a channel between two threads.
#[cfg(test)]
mod test {
    use std::{sync::Arc, thread};

    use curve25519_dalek::Scalar;
    use num_bigint::BigUint;
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;
    use sigma_zkpok::*;

    #[test]
    fn zkpok_dlog() {
        // In practice you should use an actual random number generator; this is just for easier testing
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        // We use the Ristretto group, with a 128-bit challenge for strong soundness
        let group = Arc::new(RistrettoGroup::new());
        let params = SigmaParameters::new(&group, 128).unwrap();

        // The user's private keys are scalars, and the public keys are the corresponding group elements
        let signing_key = BigUint::from_bytes_le(Scalar::random(&mut rng).as_bytes());
        let agreement_key = BigUint::from_bytes_le(Scalar::random(&mut rng).as_bytes());
        let signing_public = group.exponentiate(group.generator(), &signing_key);
        let agreement_public = group.exponentiate(group.generator(), &agreement_key);

        // Both statements are proven together under a single challenge using AND-composition
        let prover_input = SigmaProverInput::and(vec![
            SigmaProverInput::dlog(&signing_public, &signing_key),
            SigmaProverInput::dlog(&agreement_public, &agreement_key),
        ]);
        let common_input = prover_input.common_input();

        // In practice the channel would be a network connection; here it's in memory
        let (prover_channel, verifier_channel) = LoopbackChannel::pair();

        // The user runs the prover on its own thread
        let prover_params = params.clone();
        let prover_rng = ChaCha12Rng::seed_from_u64(8675310);
        let user = thread::spawn(move || {
            let computation = SigmaAndProverComputation::new(vec![
                Box::new(SigmaDlogProverComputation::new(&prover_params)) as Box<dyn SigmaProverComputation<_>>,
                Box::new(SigmaDlogProverComputation::new(&prover_params)),
            ])
            .unwrap();

            // Setting up the prover sends a fresh commitment key to the verifier
            let mut prover = ZkPokFromSigmaCmtPedersenProver::new(prover_channel, computation, prover_rng).unwrap();
            prover.prove(&prover_input)
        });

        // The service runs the verifier, which must use the same component structure as the prover
        let computation = SigmaAndVerifierComputation::new(vec![
            Box::new(SigmaDlogVerifierComputation::new(&params)) as Box<dyn SigmaVerifierComputation<_>>,
            Box::new(SigmaDlogVerifierComputation::new(&params)),
        ])
        .unwrap();
        let mut verifier = ZkPokFromSigmaCmtPedersenVerifier::new(verifier_channel, computation, rng).unwrap();

        // The proof should verify
        assert!(verifier.verify(&common_input).unwrap());
        assert!(user.join().unwrap().is_ok());
    }
}
