// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause

#![expect(missing_docs)]

#[macro_use]
extern crate criterion;

use std::{sync::Arc, thread};

use criterion::{BatchSize, Criterion};
use num_bigint::BigUint;
use rand_chacha::ChaCha12Rng;
use rand_core::{CryptoRngCore, SeedableRng};
use sigma_zkpok::{
    DlogGroup,
    LoopbackChannel,
    RistrettoGroup,
    SigmaAndProverComputation,
    SigmaAndVerifierComputation,
    SigmaCommonInput,
    SigmaDlogProverComputation,
    SigmaDlogVerifierComputation,
    SigmaParameters,
    SigmaProverComputation,
    SigmaProverInput,
    SigmaVerifierComputation,
    ZkPokFromSigmaCmtPedersenProver,
    ZkPokFromSigmaCmtPedersenVerifier,
};

// Parameters
const T: u32 = 128;
const AND_SIZES: [usize; 3] = [1, 2, 4];

// Generate a batch of discrete logarithm statements and witnesses
fn generate_data<R: CryptoRngCore>(
    group: &RistrettoGroup,
    n: usize,
    rng: &mut R,
) -> (SigmaProverInput<RistrettoGroup>, SigmaCommonInput<RistrettoGroup>) {
    let witnesses = (0..n)
        .map(|_| {
            let mut bytes = [0u8; 16];
            rng.fill_bytes(&mut bytes);
            BigUint::from_bytes_be(&bytes)
        })
        .collect::<Vec<BigUint>>();
    let inputs = witnesses
        .iter()
        .map(|w| SigmaProverInput::dlog(&group.exponentiate(group.generator(), w), w))
        .collect::<Vec<_>>();

    let common = SigmaCommonInput::and(inputs.iter().map(SigmaProverInput::common_input).collect());
    (SigmaProverInput::and(inputs), common)
}

fn provers(params: &SigmaParameters<RistrettoGroup>, n: usize) -> SigmaAndProverComputation<RistrettoGroup> {
    SigmaAndProverComputation::new(
        (0..n)
            .map(|_| Box::new(SigmaDlogProverComputation::new(params)) as Box<dyn SigmaProverComputation<_>>)
            .collect(),
    )
    .unwrap()
}

fn verifiers(params: &SigmaParameters<RistrettoGroup>, n: usize) -> SigmaAndVerifierComputation<RistrettoGroup> {
    SigmaAndVerifierComputation::new(
        (0..n)
            .map(|_| Box::new(SigmaDlogVerifierComputation::new(params)) as Box<dyn SigmaVerifierComputation<_>>)
            .collect(),
    )
    .unwrap()
}

fn sigma_transcript(c: &mut Criterion) {
    let mut group = c.benchmark_group("sigma_transcript");
    let mut rng = ChaCha12Rng::seed_from_u64(8675309);
    let ristretto = Arc::new(RistrettoGroup::new());
    let params = SigmaParameters::new(&ristretto, T).unwrap();

    for n in AND_SIZES {
        let (prover_input, common_input) = generate_data(&ristretto, n, &mut rng);

        let label = format!("Prove: {}-statement AND", n);
        group.bench_function(&label, |b| {
            let mut prover = provers(&params, n);
            let mut verifier = verifiers(&params, n);

            b.iter(|| {
                let _a = prover.compute_first_msg(&prover_input, &mut rng).unwrap();
                let e = verifier.sample_challenge(&mut rng);
                prover.compute_second_msg(&e).unwrap();
            })
        });

        let label = format!("Verify: {}-statement AND", n);
        group.bench_function(&label, |b| {
            let mut prover = provers(&params, n);
            let mut verifier = verifiers(&params, n);

            // Generate the transcript
            let a = prover.compute_first_msg(&prover_input, &mut rng).unwrap();
            let e = verifier.sample_challenge(&mut rng);
            let z = prover.compute_second_msg(&e).unwrap();

            b.iter(|| {
                assert!(verifier.verify(&common_input, &a, &z).unwrap());
            })
        });
    }
    group.finish();
}

fn zkpok(c: &mut Criterion) {
    let mut group = c.benchmark_group("zkpok");
    let mut rng = ChaCha12Rng::seed_from_u64(8675309);
    let ristretto = Arc::new(RistrettoGroup::new());
    let params = SigmaParameters::new(&ristretto, T).unwrap();

    for n in AND_SIZES {
        let (prover_input, common_input) = generate_data(&ristretto, n, &mut rng);
        let prover_input = Arc::new(prover_input);

        let label = format!("ZKPOK over loopback: {}-statement AND", n);
        group.bench_function(&label, |b| {
            b.iter_batched(
                || {
                    (
                        LoopbackChannel::pair(),
                        ChaCha12Rng::from_rng(&mut rng).unwrap(),
                        ChaCha12Rng::from_rng(&mut rng).unwrap(),
                    )
                },
                |((prover_channel, verifier_channel), prover_rng, verifier_rng)| {
                    // Run the prover on its own thread
                    let prover_computation = provers(&params, n);
                    let prover_input = prover_input.clone();
                    let handle = thread::spawn(move || {
                        let mut prover =
                            ZkPokFromSigmaCmtPedersenProver::new(prover_channel, prover_computation, prover_rng)
                                .unwrap();
                        prover.prove(&prover_input).unwrap();
                    });

                    let mut verifier =
                        ZkPokFromSigmaCmtPedersenVerifier::new(verifier_channel, verifiers(&params, n), verifier_rng)
                            .unwrap();
                    assert!(verifier.verify(&common_input).unwrap());
                    handle.join().unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group! {
    name = sigma;
    config = Criterion::default();
    targets = sigma_transcript
}

criterion_group! {
    name = zk;
    config = Criterion::default();
    targets = zkpok
}

criterion_main!(sigma, zk);
