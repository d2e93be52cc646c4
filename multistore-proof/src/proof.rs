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

//! The multi-store proof operator.

use crate::rstd::{boxed::Box, fmt, marker::PhantomData, vec, vec::Vec};
use crate::{CommitInfo, StoreInfo};
use codec::{Decode, DecodeAll, Encode};
use log::trace;
use merkle_proof::{Error, Hasher, ProofOp, ProofOperator, Result};

/// Type tag of [`MultiStoreProofOp`].
pub const PROOF_OP_MULTI_STORE: &str = "multistore";

/// The ordered commitments of every sub-store, enough to recompute the multi-store root.
#[derive(Clone, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct MultiStoreProof {
	pub store_infos: Vec<StoreInfo>,
}

impl MultiStoreProof {
	pub fn new(store_infos: Vec<StoreInfo>) -> Self {
		MultiStoreProof { store_infos }
	}

	/// Root hash of the multi-store the proof was taken from.
	pub fn compute_root_hash<H: Hasher>(&self) -> H::Out {
		// Version is not hashed.
		let info = CommitInfo { version: -1, store_infos: self.store_infos.clone() };
		info.hash::<H>()
	}
}

/// Proves that the commitment of the sub-store named by `key` is part of a multi-store
/// root.
///
/// Takes the claimed sub-store commitment as single input and outputs the multi-store
/// root. The sub-store is looked up by name; the order of the store infos only matters
/// for the root hash.
pub struct MultiStoreProofOp<H> {
	key: Vec<u8>,
	proof: MultiStoreProof,
	_marker: PhantomData<H>,
}

impl<H: Hasher> MultiStoreProofOp<H> {
	pub fn new(key: Vec<u8>, proof: MultiStoreProof) -> Self {
		MultiStoreProofOp { key, proof, _marker: PhantomData }
	}

	pub fn proof(&self) -> &MultiStoreProof {
		&self.proof
	}

	/// Inverse of [`ProofOperator::proof_op`].
	///
	/// The key comes from the operation key, the store infos from its payload. Every
	/// commit hash must have the digest length and sub-store names must be unique.
	pub fn decode(op: &ProofOp) -> Result<Self> {
		if op.ty != PROOF_OP_MULTI_STORE {
			return Err(Error::WrongOperatorType {
				expected: PROOF_OP_MULTI_STORE,
				got: op.ty.clone(),
			})
		}
		let proof = MultiStoreProof::decode_all(&mut &op.data[..])?;
		for (i, info) in proof.store_infos.iter().enumerate() {
			if info.commit_hash.len() != H::LENGTH {
				return Err(Error::InvalidCommitHash {
					name: info.name.clone(),
					len: info.commit_hash.len(),
					expected: H::LENGTH,
				})
			}
			if proof.store_infos[..i].iter().any(|other| other.name == info.name) {
				return Err(Error::DuplicateStore(info.name.clone()))
			}
		}
		Ok(MultiStoreProofOp::new(op.key.clone(), proof))
	}
}

/// [`merkle_proof::OpDecoder`] for [`MultiStoreProofOp`].
pub fn multi_store_proof_op_decoder<H: Hasher>(op: &ProofOp) -> Result<Box<dyn ProofOperator>> {
	Ok(Box::new(MultiStoreProofOp::<H>::decode(op)?))
}

impl<H> Clone for MultiStoreProofOp<H> {
	fn clone(&self) -> Self {
		MultiStoreProofOp { key: self.key.clone(), proof: self.proof.clone(), _marker: PhantomData }
	}
}

impl<H> fmt::Display for MultiStoreProofOp<H> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("MultiStoreProofOp{")?;
		for b in rustc_hex::ToHexIter::new(self.key.iter()) {
			write!(f, "{}", b)?;
		}
		f.write_str("}")
	}
}

impl<H> fmt::Debug for MultiStoreProofOp<H> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl<H: Hasher> ProofOperator for MultiStoreProofOp<H> {
	fn run(&self, args: &[Vec<u8>]) -> Result<Vec<Vec<u8>>> {
		if args.len() != 1 {
			return Err(Error::InvalidArity { expected: 1, got: args.len() })
		}
		let value = &args[0];
		let root = self.proof.compute_root_hash::<H>();

		let info = self
			.proof
			.store_infos
			.iter()
			.find(|info| info.name.as_bytes() == &self.key[..])
			.ok_or_else(|| Error::KeyNotFound(self.key.clone()))?;
		if &info.commit_hash != value {
			return Err(Error::HashMismatch {
				name: info.name.clone(),
				expected: info.commit_hash.clone(),
				got: value.clone(),
			})
		}
		trace!(target: "proof", "substore {} found in multistore proof", info.name);
		Ok(vec![root.as_ref().to_vec()])
	}

	fn key(&self) -> &[u8] {
		&self.key
	}

	fn proof_op(&self) -> ProofOp {
		ProofOp::new(PROOF_OP_MULTI_STORE, self.key.clone(), self.proof.encode())
	}
}
