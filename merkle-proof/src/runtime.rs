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

//! Registry of operator decoders.

use crate::rstd::{boxed::Box, fmt, string::String, vec::Vec};
use crate::{
	key_path_to_keys, Error, OpDecoder, ProofOp, ProofOperator, ProofOperators, Result, ToHex,
};
use hashbrown::HashMap;
use log::{debug, trace};

/// Decodes proofs and verifies them.
///
/// Built once with every decoder the expected proofs need, then shared read-only:
/// registration needs `&mut self` and decoders are plain function pointers, so a
/// runtime behind a shared reference or an `Arc` can verify from many threads.
#[derive(Default, Clone)]
pub struct ProofRuntime {
	decoders: HashMap<String, OpDecoder>,
}

impl ProofRuntime {
	/// Runtime without any decoder.
	pub fn new() -> Self {
		ProofRuntime { decoders: HashMap::new() }
	}

	/// Register the decoder for operations tagged `ty`.
	///
	/// Registering a tag again replaces its decoder; the replaced one is returned.
	pub fn register_op_decoder(&mut self, ty: impl Into<String>, decoder: OpDecoder) -> Option<OpDecoder> {
		let ty = ty.into();
		let previous = self.decoders.insert(ty.clone(), decoder);
		if previous.is_some() {
			debug!(target: "proof", "decoder for {} overridden", ty);
		}
		previous
	}

	/// Whether a decoder is registered for `ty`.
	pub fn is_registered(&self, ty: &str) -> bool {
		self.decoders.contains_key(ty)
	}

	/// Decode a single operation with the decoder registered for its tag.
	pub fn decode(&self, op: &ProofOp) -> Result<Box<dyn ProofOperator>> {
		let decoder = self
			.decoders
			.get(op.ty.as_str())
			.ok_or_else(|| Error::UnknownOperatorType(op.ty.clone()))?;
		trace!(target: "proof", "decoding {} op, key {:?}", op.ty, ToHex(&op.key));
		decoder(op)
	}

	/// Decode an operation given as its separate parts.
	pub fn decode_operator(&self, ty: &str, key: &[u8], data: &[u8]) -> Result<Box<dyn ProofOperator>> {
		self.decode(&ProofOp::new(ty, key.to_vec(), data.to_vec()))
	}

	/// Decode a whole proof, leaf operation first. Fails on the first operation that does
	/// not decode.
	pub fn decode_proof(&self, proof: &[ProofOp]) -> Result<ProofOperators> {
		proof
			.iter()
			.map(|op| self.decode(op))
			.collect::<Result<Vec<_>>>()
			.map(ProofOperators)
	}

	/// Decode `proof` and check that it proves `value` under `keys` in `root`.
	///
	/// `keys` is ordered from the root down to the leaf.
	pub fn verify_value<K: AsRef<[u8]>>(
		&self,
		proof: &[ProofOp],
		root: &[u8],
		keys: &[K],
		value: &[u8],
	) -> Result<()> {
		self.decode_proof(proof)?.verify_value(root, keys, value)
	}

	/// Decode `proof` and check that it proves `keys` has no value in `root`.
	pub fn verify_absence<K: AsRef<[u8]>>(&self, proof: &[ProofOp], root: &[u8], keys: &[K]) -> Result<()> {
		self.decode_proof(proof)?.verify_absence(root, keys)
	}

	/// Decode `proof` and replay it on arbitrary leaf inputs.
	pub fn verify<K: AsRef<[u8]>>(
		&self,
		proof: &[ProofOp],
		root: &[u8],
		keys: &[K],
		args: Vec<Vec<u8>>,
	) -> Result<()> {
		self.decode_proof(proof)?.verify(root, keys, args)
	}

	/// [`Self::verify_value`] with the keys given as a key path string.
	pub fn verify_value_with_key_path(
		&self,
		proof: &[ProofOp],
		root: &[u8],
		key_path: &str,
		value: &[u8],
	) -> Result<()> {
		let keys = key_path_to_keys(key_path)?;
		self.verify_value(proof, root, &keys, value)
	}

	/// [`Self::verify_absence`] with the keys given as a key path string.
	pub fn verify_absence_with_key_path(&self, proof: &[ProofOp], root: &[u8], key_path: &str) -> Result<()> {
		let keys = key_path_to_keys(key_path)?;
		self.verify_absence(proof, root, &keys)
	}
}

impl fmt::Debug for ProofRuntime {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut tags: Vec<&String> = self.decoders.keys().collect();
		tags.sort();
		f.debug_struct("ProofRuntime").field("decoders", &tags).finish()
	}
}
