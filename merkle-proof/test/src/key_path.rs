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

use merkle_proof::simple::simple_value_op_decoder;
use merkle_proof::{
	key_path_to_keys, Error, KeyEncoding, KeyPath, ProofOperator, ProofRuntime, PROOF_OP_SIMPLE_VALUE,
};
use proof_hasher::Sha256Hasher;
use reference_proof::SimpleStore;

#[test]
fn every_byte_round_trips() {
	let all: Vec<u8> = (0..=255u8).collect();
	for enc in [KeyEncoding::Url, KeyEncoding::Hex].iter() {
		let path = KeyPath::new().append_key(&b"store"[..], *enc).append_key(all.clone(), *enc);
		assert_eq!(key_path_to_keys(&path.to_string()).unwrap(), vec![b"store".to_vec(), all.clone()]);
	}
}

#[test]
fn unreserved_bytes_are_kept() {
	let path = KeyPath::new().append_key(&b"Az09-._~!"[..], KeyEncoding::Url);
	assert_eq!(path.to_string(), "/Az09-._~%21");
}

#[test]
fn empty_segments() {
	assert_eq!(key_path_to_keys("/").unwrap(), vec![Vec::<u8>::new()]);
	assert_eq!(key_path_to_keys("/a//b").unwrap(), vec![b"a".to_vec(), vec![], b"b".to_vec()]);
	assert_eq!(key_path_to_keys("/x:").unwrap(), vec![Vec::<u8>::new()]);
}

#[test]
fn escaped_keys_in_a_proof() {
	let key = b"dir/file name";
	let store = SimpleStore::<Sha256Hasher>::new(&[("dir/file name", "contents"), ("other", "x")]);
	let proof = vec![store.prove(key).unwrap().proof_op()];

	let mut runtime = ProofRuntime::new();
	runtime.register_op_decoder(PROOF_OP_SIMPLE_VALUE, simple_value_op_decoder::<Sha256Hasher>);

	let escaped = KeyPath::new().append_key(&key[..], KeyEncoding::Url).to_string();
	assert_eq!(escaped, "/dir%2Ffile%20name");
	runtime.verify_value_with_key_path(&proof, &store.root(), &escaped, b"contents").unwrap();

	// Unescaped, the slash splits the key in two.
	assert!(matches!(
		runtime.verify_value_with_key_path(&proof, &store.root(), "/dir/file name", b"contents"),
		Err(Error::KeyMismatch { .. })
	));
}
