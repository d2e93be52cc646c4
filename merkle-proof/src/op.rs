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

//! Proof operations and their replay.

use crate::rstd::{boxed::Box, string::String, vec, vec::Vec};
use crate::{Error, Result, ToHex};
use codec::{Decode, DecodeAll, Encode};
use log::trace;
use proof_hasher::MaybeDebug;

/// A proof operation as carried on the wire: a type tag selecting the decoder, the key
/// the operation proves something about, and an opaque payload only the decoder
/// understands.
#[derive(Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct ProofOp {
	/// Type tag, e.g. `"multistore"`.
	pub ty: String,
	/// Key of the operation, compared against the requested key path.
	pub key: Vec<u8>,
	/// Operator specific payload.
	pub data: Vec<u8>,
}

impl ProofOp {
	pub fn new(ty: impl Into<String>, key: Vec<u8>, data: Vec<u8>) -> Self {
		ProofOp { ty: ty.into(), key, data }
	}

	/// Decode a single operation from its wire form. Trailing bytes are rejected.
	pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
		Ok(ProofOp::decode_all(&mut bytes)?)
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		self.encode()
	}
}

/// The operations of a whole proof, ordered from leaf to root.
#[derive(Clone, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct ProofOps(pub Vec<ProofOp>);

impl ProofOps {
	/// Decode a proof from its wire form. Trailing bytes are rejected.
	pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
		Ok(ProofOps::decode_all(&mut bytes)?)
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		self.encode()
	}
}

impl From<Vec<ProofOp>> for ProofOps {
	fn from(ops: Vec<ProofOp>) -> Self {
		ProofOps(ops)
	}
}

/// One verifiable step of a proof.
///
/// `run` maps the values produced by the previous step (or the leaf values, for the
/// first step) to the values this step proves, usually a single root hash.
pub trait ProofOperator: MaybeDebug + Send + Sync {
	/// Replay this step.
	fn run(&self, args: &[Vec<u8>]) -> Result<Vec<Vec<u8>>>;

	/// Key this step proves something about. An empty key takes no part in the key
	/// path check.
	fn key(&self) -> &[u8];

	/// Encode back into a wire operation.
	fn proof_op(&self) -> ProofOp;
}

/// Reconstruct an operator from a wire operation.
pub type OpDecoder = fn(&ProofOp) -> Result<Box<dyn ProofOperator>>;

/// A decoded proof: operators ordered from leaf to root.
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Default)]
pub struct ProofOperators(pub Vec<Box<dyn ProofOperator>>);

impl ProofOperators {
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Encode every operator back into its wire operation.
	pub fn proof_ops(&self) -> ProofOps {
		ProofOps(self.0.iter().map(|op| op.proof_op()).collect())
	}

	/// Replay the chain on `args` and check it ends on `root`.
	///
	/// `keys` is the requested key path ordered from the root down to the leaf, so the
	/// leaf-most operator consumes its last segment. Each operator with a non-empty key
	/// takes the last unconsumed segment and must be equal to it. All segments must be
	/// consumed and the final output must be exactly `[root]`.
	pub fn verify<K: AsRef<[u8]>>(&self, root: &[u8], keys: &[K], args: Vec<Vec<u8>>) -> Result<()> {
		let mut remaining = keys.len();
		let mut args = args;
		for (i, op) in self.0.iter().enumerate() {
			let key = op.key();
			if !key.is_empty() {
				if remaining == 0 {
					return Err(Error::KeyPathExhausted(key.to_vec()))
				}
				let expected = keys[remaining - 1].as_ref();
				if expected != key {
					return Err(Error::KeyMismatch { expected: expected.to_vec(), got: key.to_vec() })
				}
				remaining -= 1;
			}
			args = op.run(&args)?;
			trace!(target: "proof", "op {} (key {:?}) ok", i, ToHex(key));
		}

		if args.len() != 1 || args[0] != root {
			return Err(Error::RootMismatch { expected: root.to_vec(), computed: args })
		}
		if remaining != 0 {
			return Err(Error::KeyPathNotConsumed(
				keys[..remaining].iter().map(|k| k.as_ref().to_vec()).collect(),
			))
		}
		Ok(())
	}

	/// Replay the chain on a single leaf value.
	pub fn verify_value<K: AsRef<[u8]>>(&self, root: &[u8], keys: &[K], value: &[u8]) -> Result<()> {
		self.verify(root, keys, vec![value.to_vec()])
	}

	/// Replay the chain without a leaf value, for proofs whose first operator proves the
	/// absence of its key.
	pub fn verify_absence<K: AsRef<[u8]>>(&self, root: &[u8], keys: &[K]) -> Result<()> {
		self.verify(root, keys, Vec::new())
	}
}

impl From<Vec<Box<dyn ProofOperator>>> for ProofOperators {
	fn from(ops: Vec<Box<dyn ProofOperator>>) -> Self {
		ProofOperators(ops)
	}
}
