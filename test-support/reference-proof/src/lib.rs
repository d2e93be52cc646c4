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

//! Reference proof generation, for tests only.
//!
//! Builds simple Merkle sub-stores and a multi-store over them, and produces the proof
//! chains a verifier is expected to accept.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use merkle_proof::simple::{empty_hash, inner_hash, kv_leaf, leaf_hash, split_point};
use merkle_proof::{KeyEncoding, KeyPath, ProofOp, ProofOperator, ProofOps, SimpleProof, SimpleValueOp};
use multistore_proof::{CommitInfo, MultiStoreProofOp, StoreInfo};
use proof_hasher::Hasher;

pub use keccak_hasher::KeccakHasher;
pub use proof_hasher::Sha256Hasher;

/// Run a generic test once per supported hasher.
#[macro_export]
macro_rules! test_hashers {
	($test:ident, $test_internal:ident) => {
		#[test]
		fn $test() {
			eprintln!("Running with hasher `Sha256Hasher`");
			$test_internal::<$crate::Sha256Hasher>();
			eprintln!("Running with hasher `KeccakHasher`");
			$test_internal::<$crate::KeccakHasher>();
		}
	};
}

/// Root and per-leaf aunts of the simple tree over `leaf_hashes`.
fn trails<H: Hasher>(leaf_hashes: &[H::Out]) -> (H::Out, Vec<Vec<H::Out>>) {
	match leaf_hashes.len() {
		0 => (empty_hash::<H>(), Vec::new()),
		1 => (leaf_hashes[0], vec![Vec::new()]),
		n => {
			let k = split_point(n as u64) as usize;
			let (left, mut left_trails) = trails::<H>(&leaf_hashes[..k]);
			let (right, mut right_trails) = trails::<H>(&leaf_hashes[k..]);
			for trail in left_trails.iter_mut() {
				trail.push(right);
			}
			for trail in right_trails.iter_mut() {
				trail.push(left);
			}
			left_trails.extend(right_trails);
			(inner_hash::<H>(left.as_ref(), right.as_ref()), left_trails)
		},
	}
}

/// Root of the simple tree over `items` and one membership proof per item.
pub fn simple_proofs<H: Hasher, I: AsRef<[u8]>>(items: &[I]) -> (H::Out, Vec<SimpleProof>) {
	let leaf_hashes: Vec<H::Out> = items.iter().map(|i| leaf_hash::<H>(i.as_ref())).collect();
	let (root, trails) = trails::<H>(&leaf_hashes);
	let total = items.len() as u64;
	let proofs = trails
		.into_iter()
		.zip(leaf_hashes.iter())
		.enumerate()
		.map(|(index, (aunts, leaf))| SimpleProof {
			total,
			index: index as u64,
			leaf_hash: leaf.as_ref().to_vec(),
			aunts: aunts.iter().map(|a| a.as_ref().to_vec()).collect(),
		})
		.collect();
	(root, proofs)
}

/// Key-value store committed to by a simple Merkle tree of [`kv_leaf`]s sorted by key.
pub struct SimpleStore<H> {
	entries: BTreeMap<Vec<u8>, Vec<u8>>,
	_marker: PhantomData<H>,
}

impl<H: Hasher> SimpleStore<H> {
	pub fn new<K: AsRef<[u8]>, V: AsRef<[u8]>>(entries: &[(K, V)]) -> Self {
		SimpleStore {
			entries: entries
				.iter()
				.map(|(k, v)| (k.as_ref().to_vec(), v.as_ref().to_vec()))
				.collect(),
			_marker: PhantomData,
		}
	}

	fn leaves(&self) -> Vec<Vec<u8>> {
		self.entries.iter().map(|(k, v)| kv_leaf::<H>(k, v)).collect()
	}

	pub fn root(&self) -> H::Out {
		simple_proofs::<H, _>(&self.leaves()).0
	}

	/// Membership proof of `key`, if present.
	pub fn prove(&self, key: &[u8]) -> Option<SimpleValueOp<H>> {
		let index = self.entries.keys().position(|k| &k[..] == key)?;
		let (_, mut proofs) = simple_proofs::<H, _>(&self.leaves());
		Some(SimpleValueOp::new(key.to_vec(), proofs.swap_remove(index)))
	}
}

/// Named simple stores, folded into a multi-store root in insertion order.
pub struct MultiStore<H> {
	stores: Vec<(String, SimpleStore<H>)>,
}

impl<H: Hasher> MultiStore<H> {
	pub fn new() -> Self {
		MultiStore { stores: Vec::new() }
	}

	pub fn with_store<K: AsRef<[u8]>, V: AsRef<[u8]>>(mut self, name: &str, entries: &[(K, V)]) -> Self {
		self.stores.push((name.to_string(), SimpleStore::new(entries)));
		self
	}

	pub fn store(&self, name: &str) -> Option<&SimpleStore<H>> {
		self.stores.iter().find(|(n, _)| n == name).map(|(_, s)| s)
	}

	pub fn commit_info(&self, version: i64) -> CommitInfo {
		CommitInfo::new(
			version,
			self.stores
				.iter()
				.map(|(name, store)| StoreInfo::new(name.as_str(), store.root().as_ref().to_vec()))
				.collect(),
		)
	}

	pub fn root(&self) -> H::Out {
		self.commit_info(0).hash::<H>()
	}

	/// Two-stage proof of `key` in sub-store `name`: value in sub-store, then sub-store
	/// in multi-store.
	pub fn prove(&self, name: &str, key: &[u8]) -> Option<ProofOps> {
		let value_op = self.store(name)?.prove(key)?;
		let store_op = MultiStoreProofOp::<H>::new(
			name.as_bytes().to_vec(),
			self.commit_info(0).multi_store_proof(),
		);
		Some(ProofOps(vec![value_op.proof_op(), store_op.proof_op()]))
	}
}

impl<H: Hasher> Default for MultiStore<H> {
	fn default() -> Self {
		Self::new()
	}
}

/// Key path string of `key` in sub-store `name`.
pub fn key_path(name: &str, key: &[u8]) -> String {
	KeyPath::new()
		.append_key(name.as_bytes(), KeyEncoding::Url)
		.append_key(key, KeyEncoding::Hex)
		.to_string()
}

/// The fixture most tests run against.
pub fn test_multi_store<H: Hasher>() -> MultiStore<H> {
	MultiStore::new()
		.with_store("bank", &[("alice", "100"), ("bob", "42"), ("carol", "7")])
		.with_store("acc", &[("alice", "nonce=3")])
		.with_store("staking", &[("validator-1", "bonded"), ("validator-2", "unbonding")])
}

/// Replace the last operation of a proof, e.g. to tamper with the multi-store stage.
pub fn with_last_op(proof: &ProofOps, op: ProofOp) -> ProofOps {
	let mut ops = proof.0.clone();
	ops.pop();
	ops.push(op);
	ProofOps(ops)
}
