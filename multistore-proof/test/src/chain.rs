// Copyright 2021 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Two-stage proofs: a value in a sub-store, then the sub-store in the multi-store.

use std::sync::Arc;
use std::thread;

use merkle_proof::{ProofOps, PROOF_OP_SIMPLE_VALUE};
use multistore_proof::{
	default_proof_runtime, multi_store_proof_op_decoder, Error, MultiStoreProof,
	MultiStoreProofOp, ProofOperator, ProofRuntime, StoreInfo, PROOF_OP_MULTI_STORE,
};
use proof_hasher::{Hasher, Sha256Hasher};
use reference_proof::{key_path, test_hashers, test_multi_store, with_last_op, MultiStore};

fn keys(name: &str, key: &[u8]) -> Vec<Vec<u8>> {
	vec![name.as_bytes().to_vec(), key.to_vec()]
}

test_hashers!(two_stage_chain_verifies, two_stage_chain_verifies_internal);
fn two_stage_chain_verifies_internal<H: Hasher>() {
	let _ = env_logger::try_init();
	let store = test_multi_store::<H>();
	let root = store.root();
	let runtime = default_proof_runtime::<H>();

	for (name, key, value) in [
		("bank", "alice", "100"),
		("bank", "carol", "7"),
		("acc", "alice", "nonce=3"),
		("staking", "validator-2", "unbonding"),
	]
	.iter()
	{
		let (key, value) = (key.as_bytes(), value.as_bytes());
		let proof = store.prove(name, key).unwrap();
		runtime.verify_value(&proof.0, root.as_ref(), &keys(name, key), value).unwrap();
		runtime
			.verify_value_with_key_path(&proof.0, root.as_ref(), &key_path(name, key), value)
			.unwrap();
	}
}

test_hashers!(tampered_root_fails, tampered_root_fails_internal);
fn tampered_root_fails_internal<H: Hasher>() {
	let store = test_multi_store::<H>();
	let proof = store.prove("bank", b"bob").unwrap();
	let runtime = default_proof_runtime::<H>();

	let root = store.root();
	for i in [0, H::LENGTH - 1].iter() {
		let mut tampered = root.as_ref().to_vec();
		tampered[*i] ^= 1;
		match runtime.verify_value(&proof.0, &tampered, &keys("bank", b"bob"), b"42") {
			Err(Error::RootMismatch { expected, computed }) => {
				assert_eq!(expected, tampered);
				assert_eq!(computed, vec![root.as_ref().to_vec()]);
			},
			result => panic!("expected Error::RootMismatch, got {:?}", result),
		}
	}
}

test_hashers!(wrong_value_fails_in_first_stage, wrong_value_fails_in_first_stage_internal);
fn wrong_value_fails_in_first_stage_internal<H: Hasher>() {
	let store = test_multi_store::<H>();
	let proof = store.prove("bank", b"bob").unwrap();
	let runtime = default_proof_runtime::<H>();
	assert!(matches!(
		runtime.verify_value(&proof.0, store.root().as_ref(), &keys("bank", b"bob"), b"43"),
		Err(Error::LeafMismatch { ref key, .. }) if key == b"bob"
	));
}

test_hashers!(key_continuity, key_continuity_internal);
fn key_continuity_internal<H: Hasher>() {
	let store = test_multi_store::<H>();
	let root = store.root();
	let proof = store.prove("bank", b"alice").unwrap();
	let runtime = default_proof_runtime::<H>();

	// Proof of `/bank/alice` used for `/acc/alice`.
	match runtime.verify_value(&proof.0, root.as_ref(), &keys("acc", b"alice"), b"100") {
		Err(Error::KeyMismatch { expected, got }) => {
			assert_eq!(expected, b"acc".to_vec());
			assert_eq!(got, b"bank".to_vec());
		},
		result => panic!("expected Error::KeyMismatch, got {:?}", result),
	}

	// Segments given leaf first.
	let reversed = vec![b"alice".to_vec(), b"bank".to_vec()];
	assert!(matches!(
		runtime.verify_value(&proof.0, root.as_ref(), &reversed, b"100"),
		Err(Error::KeyMismatch { .. })
	));

	let short = vec![b"alice".to_vec()];
	assert!(matches!(
		runtime.verify_value(&proof.0, root.as_ref(), &short, b"100"),
		Err(Error::KeyPathExhausted(ref key)) if key == b"bank"
	));

	let long = vec![b"app".to_vec(), b"bank".to_vec(), b"alice".to_vec()];
	assert!(matches!(
		runtime.verify_value(&proof.0, root.as_ref(), &long, b"100"),
		Err(Error::KeyPathNotConsumed(ref left)) if left == &vec![b"app".to_vec()]
	));
}

test_hashers!(forged_multistore_stage, forged_multistore_stage_internal);
fn forged_multistore_stage_internal<H: Hasher>() {
	let store = test_multi_store::<H>();
	let root = store.root();
	let proof = store.prove("bank", b"alice").unwrap();
	let runtime = default_proof_runtime::<H>();

	// Forged list recording another commitment for `bank`.
	let forged = MultiStoreProof::new(vec![
		StoreInfo::new("bank", H::hash(b"forged").as_ref().to_vec()),
		StoreInfo::new("acc", store.store("acc").unwrap().root().as_ref().to_vec()),
	]);
	let forged_op = MultiStoreProofOp::<H>::new(b"bank".to_vec(), forged).proof_op();
	let forged_proof = with_last_op(&proof, forged_op);
	assert!(matches!(
		runtime.verify_value(&forged_proof.0, root.as_ref(), &keys("bank", b"alice"), b"100"),
		Err(Error::HashMismatch { ref name, .. }) if name == "bank"
	));

	// Correct commitments but a dropped sub-store: membership holds, the root does not.
	let partial = MultiStoreProof::new(vec![StoreInfo::new(
		"bank",
		store.store("bank").unwrap().root().as_ref().to_vec(),
	)]);
	let partial_op = MultiStoreProofOp::<H>::new(b"bank".to_vec(), partial).proof_op();
	let partial_proof = with_last_op(&proof, partial_op);
	assert!(matches!(
		runtime.verify_value(&partial_proof.0, root.as_ref(), &keys("bank", b"alice"), b"100"),
		Err(Error::RootMismatch { .. })
	));
}

test_hashers!(stale_proof_fails, stale_proof_fails_internal);
fn stale_proof_fails_internal<H: Hasher>() {
	let old = test_multi_store::<H>();
	let proof = old.prove("bank", b"bob").unwrap();

	let new: MultiStore<H> = MultiStore::new()
		.with_store("bank", &[("alice", "100"), ("bob", "41"), ("carol", "7")])
		.with_store("acc", &[("alice", "nonce=3")])
		.with_store("staking", &[("validator-1", "bonded"), ("validator-2", "unbonding")]);
	let runtime = default_proof_runtime::<H>();
	assert!(matches!(
		runtime.verify_value(&proof.0, new.root().as_ref(), &keys("bank", b"bob"), b"42"),
		Err(Error::RootMismatch { .. })
	));
}

#[test]
fn wire_bytes_round_trip() {
	let store = test_multi_store::<Sha256Hasher>();
	let proof = store.prove("staking", b"validator-1").unwrap();
	let bytes = proof.to_bytes();
	let decoded = ProofOps::from_bytes(&bytes).unwrap();
	assert_eq!(decoded, proof);

	let runtime = default_proof_runtime::<Sha256Hasher>();
	let ops = runtime.decode_proof(&decoded.0).unwrap();
	assert_eq!(ops.len(), 2);
	assert_eq!(ops.proof_ops(), proof);
	ops.verify_value(&store.root(), &keys("staking", b"validator-1"), b"bonded").unwrap();
}

#[test]
fn missing_decoder_for_substore_proof() {
	let store = test_multi_store::<Sha256Hasher>();
	let proof = store.prove("bank", b"alice").unwrap();

	let mut runtime = ProofRuntime::new();
	runtime.register_op_decoder(PROOF_OP_MULTI_STORE, multi_store_proof_op_decoder::<Sha256Hasher>);
	match runtime.verify_value(&proof.0, &store.root(), &keys("bank", b"alice"), b"100") {
		Err(Error::UnknownOperatorType(ty)) => assert_eq!(ty, PROOF_OP_SIMPLE_VALUE),
		result => panic!("expected Error::UnknownOperatorType, got {:?}", result),
	}
}

#[test]
fn absence_needs_an_absence_operator() {
	let store = test_multi_store::<Sha256Hasher>();
	let proof = store.prove("bank", b"alice").unwrap();
	let runtime = default_proof_runtime::<Sha256Hasher>();
	// Membership operators refuse to run without a value.
	assert!(matches!(
		runtime.verify_absence_with_key_path(&proof.0, &store.root(), &key_path("bank", b"alice")),
		Err(Error::InvalidArity { expected: 1, got: 0 })
	));
}

#[test]
fn multistore_stage_alone() {
	// bank's commitment verified directly against the multi-store root.
	let store = test_multi_store::<Sha256Hasher>();
	let proof = store.prove("bank", b"alice").unwrap();
	let runtime = default_proof_runtime::<Sha256Hasher>();
	let bank_root = store.store("bank").unwrap().root();
	runtime
		.verify_value(&proof.0[1..], &store.root(), &[b"bank"], &bank_root)
		.unwrap();
}

#[test]
fn shared_runtime_across_threads() {
	fn assert_send_sync<T: Send + Sync>() {}
	assert_send_sync::<ProofRuntime>();

	let runtime = Arc::new(default_proof_runtime::<Sha256Hasher>());
	let store = Arc::new(test_multi_store::<Sha256Hasher>());
	let handles: Vec<_> = ["alice", "bob", "carol"]
		.iter()
		.map(|key| {
			let runtime = runtime.clone();
			let store = store.clone();
			let key = key.as_bytes().to_vec();
			thread::spawn(move || {
				let proof = store.prove("bank", &key).unwrap();
				let ops = runtime.decode_proof(&proof.0).unwrap();
				// Values are 100, 42 and 7; only the right one passes.
				["100", "42", "7"]
					.iter()
					.filter(|v| ops.verify_value(&store.root(), &keys("bank", &key), v.as_bytes()).is_ok())
					.count()
			})
		})
		.collect();
	for handle in handles {
		assert_eq!(handle.join().unwrap(), 1);
	}
}

#[test]
fn operators_print_their_key() {
	let store = test_multi_store::<Sha256Hasher>();
	let proof = store.prove("bank", b"alice").unwrap();
	let ops = default_proof_runtime::<Sha256Hasher>().decode_proof(&proof.0).unwrap();
	assert_eq!(format!("{:?}", ops.0[0]), "SimpleValueOp{616c696365}");
	assert_eq!(format!("{:?}", ops.0[1]), "MultiStoreProofOp{62616e6b}");
	assert_eq!(ops.0[1].key(), b"bank");
}
