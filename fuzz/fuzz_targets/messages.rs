// Copyright (c) 2024, The Sigma ZKPOK Developers
// SPDX-License-Identifier: BSD-3-Clause


#![no_main]

use libfuzzer_sys::fuzz_target;
use sigma_zkpok::{CommitPhaseOutput, MessageLayout, SigmaProtocolMsg};

// Element and scalar widths for Ristretto
const ELEMENT_SIZE: usize = 32;
const SCALAR_SIZE: usize = 32;

// Test basic deserialization and canonical serialization
fuzz_target!(|data: &[u8]| {
	// A two-statement AND transcript message
	let layout = MessageLayout::Multiple(vec![
		MessageLayout::Multiple(vec![MessageLayout::GroupElement(ELEMENT_SIZE), MessageLayout::BigInteger(SCALAR_SIZE)]),
		MessageLayout::BigInteger(SCALAR_SIZE),
	]);
	if let Ok(message) = SigmaProtocolMsg::from_bytes(data, &layout) {
		assert_eq!(&message.to_bytes().unwrap(), data);
	}

	if let Ok(output) = CommitPhaseOutput::from_bytes(data, ELEMENT_SIZE) {
		assert_eq!(&output.to_bytes(), data);
	}
});
