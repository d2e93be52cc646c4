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

//! Simple binary Merkle tree over an ordered list of byte strings.
//!
//! Leaves and inner nodes are domain separated the way RFC 6962 does it:
//!
//! - `leaf_hash(x) = H(0x00 || x)`
//! - `inner_hash(l, r) = H(0x01 || l || r)`
//!
//! A list of `n > 1` items is split after the `k` first items where `k` is the largest
//! power of two strictly below `n`. The empty list hashes to `H("")`.
//!
//! The tree is order sensitive: the same items in another order give another root.

use crate::rstd::{boxed::Box, fmt, marker::PhantomData, vec, vec::Vec};
use crate::{Error, ProofOp, ProofOperator, Result, ToHex};
use codec::{Decode, DecodeAll, Encode};
use proof_hasher::Hasher;

/// Type tag of [`SimpleValueOp`].
pub const PROOF_OP_SIMPLE_VALUE: &str = "simple:v";

const LEAF_PREFIX: u8 = 0;
const INNER_PREFIX: u8 = 1;

/// Depth of a tree with `u64::MAX` leaves.
const MAX_AUNTS: usize = 64;

/// Root of the empty tree.
pub fn empty_hash<H: Hasher>() -> H::Out {
	H::hash(&[])
}

pub fn leaf_hash<H: Hasher>(leaf: &[u8]) -> H::Out {
	H::hash_concat(&[&[LEAF_PREFIX], leaf])
}

pub fn inner_hash<H: Hasher>(left: &[u8], right: &[u8]) -> H::Out {
	H::hash_concat(&[&[INNER_PREFIX], left, right])
}

/// Number of items going to the left subtree of a tree of `total > 1` items.
pub fn split_point(total: u64) -> u64 {
	debug_assert!(total > 1);
	1 << (63 - (total - 1).leading_zeros())
}

/// Root hash of the tree whose leaves are `items`, in order.
pub fn hash_from_byte_slices<H: Hasher, I: AsRef<[u8]>>(items: &[I]) -> H::Out {
	match items.len() {
		0 => empty_hash::<H>(),
		1 => leaf_hash::<H>(items[0].as_ref()),
		n => {
			let k = split_point(n as u64) as usize;
			let left = hash_from_byte_slices::<H, _>(&items[..k]);
			let right = hash_from_byte_slices::<H, _>(&items[k..]);
			inner_hash::<H>(left.as_ref(), right.as_ref())
		},
	}
}

/// Leaf bytes committing to a key and the hash of its value.
pub fn kv_leaf<H: Hasher>(key: &[u8], value: &[u8]) -> Vec<u8> {
	let value_hash = H::hash(value);
	(key, value_hash.as_ref()).encode()
}

fn to_out<H: Hasher>(bytes: &[u8]) -> Option<H::Out> {
	if bytes.len() != H::LENGTH {
		return None
	}
	let mut out = H::Out::default();
	out.as_mut().copy_from_slice(bytes);
	Some(out)
}

/// Membership proof of one leaf: the sibling hashes ("aunts") from the leaf up to the
/// root.
#[derive(Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct SimpleProof {
	/// Number of leaves in the tree.
	pub total: u64,
	/// Position of the proven leaf.
	pub index: u64,
	/// Hash of the proven leaf.
	pub leaf_hash: Vec<u8>,
	/// Sibling hashes, leaf side first.
	pub aunts: Vec<Vec<u8>>,
}

impl SimpleProof {
	/// Root hash implied by the proof, or `None` if the aunts do not fit the shape of a
	/// tree with `total` leaves.
	pub fn compute_root_hash<H: Hasher>(&self) -> Option<H::Out> {
		if self.aunts.len() > MAX_AUNTS {
			return None
		}
		let leaf = to_out::<H>(&self.leaf_hash)?;
		hash_from_aunts::<H>(self.index, self.total, leaf, &self.aunts)
	}

	/// Check that `leaf` is at `index` in the tree with root `root`.
	pub fn verify<H: Hasher>(&self, root: &[u8], leaf: &[u8]) -> Result<()> {
		let computed = leaf_hash::<H>(leaf);
		if computed.as_ref() != &self.leaf_hash[..] {
			return Err(Error::LeafMismatch {
				key: Vec::new(),
				expected: self.leaf_hash.clone(),
				computed: computed.as_ref().to_vec(),
			})
		}
		let computed = self.compute_root_hash::<H>().ok_or(Error::InvalidProof("malformed aunts"))?;
		if computed.as_ref() != root {
			return Err(Error::RootMismatch {
				expected: root.to_vec(),
				computed: vec![computed.as_ref().to_vec()],
			})
		}
		Ok(())
	}
}

fn hash_from_aunts<H: Hasher>(
	index: u64,
	total: u64,
	leaf: H::Out,
	aunts: &[Vec<u8>],
) -> Option<H::Out> {
	if index >= total {
		return None
	}
	if total == 1 {
		return if aunts.is_empty() { Some(leaf) } else { None }
	}
	let (last, rest) = aunts.split_last()?;
	let last = to_out::<H>(last)?;
	let left = split_point(total);
	if index < left {
		let left_hash = hash_from_aunts::<H>(index, left, leaf, rest)?;
		Some(inner_hash::<H>(left_hash.as_ref(), last.as_ref()))
	} else {
		let right_hash = hash_from_aunts::<H>(index - left, total - left, leaf, rest)?;
		Some(inner_hash::<H>(last.as_ref(), right_hash.as_ref()))
	}
}

/// Proves that a value is stored under `key` in a simple Merkle tree of key/value
/// leaves (see [`kv_leaf`]).
///
/// Takes the value as single input and outputs the tree root.
pub struct SimpleValueOp<H> {
	key: Vec<u8>,
	proof: SimpleProof,
	_marker: PhantomData<H>,
}

impl<H: Hasher> SimpleValueOp<H> {
	pub fn new(key: Vec<u8>, proof: SimpleProof) -> Self {
		SimpleValueOp { key, proof, _marker: PhantomData }
	}

	pub fn proof(&self) -> &SimpleProof {
		&self.proof
	}

	/// Inverse of [`ProofOperator::proof_op`].
	pub fn decode(op: &ProofOp) -> Result<Self> {
		if op.ty != PROOF_OP_SIMPLE_VALUE {
			return Err(Error::WrongOperatorType {
				expected: PROOF_OP_SIMPLE_VALUE,
				got: op.ty.clone(),
			})
		}
		let proof = SimpleProof::decode_all(&mut &op.data[..])?;
		Ok(SimpleValueOp::new(op.key.clone(), proof))
	}
}

/// [`crate::OpDecoder`] for [`SimpleValueOp`].
pub fn simple_value_op_decoder<H: Hasher>(op: &ProofOp) -> Result<Box<dyn ProofOperator>> {
	Ok(Box::new(SimpleValueOp::<H>::decode(op)?))
}

impl<H> Clone for SimpleValueOp<H> {
	fn clone(&self) -> Self {
		SimpleValueOp { key: self.key.clone(), proof: self.proof.clone(), _marker: PhantomData }
	}
}

impl<H> fmt::Debug for SimpleValueOp<H> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "SimpleValueOp{{{}}}", ToHex(&self.key))
	}
}

impl<H: Hasher> ProofOperator for SimpleValueOp<H> {
	fn run(&self, args: &[Vec<u8>]) -> Result<Vec<Vec<u8>>> {
		if args.len() != 1 {
			return Err(Error::InvalidArity { expected: 1, got: args.len() })
		}
		let leaf = kv_leaf::<H>(&self.key, &args[0]);
		let computed = leaf_hash::<H>(&leaf);
		if computed.as_ref() != &self.proof.leaf_hash[..] {
			return Err(Error::LeafMismatch {
				key: self.key.clone(),
				expected: self.proof.leaf_hash.clone(),
				computed: computed.as_ref().to_vec(),
			})
		}
		let root = self.proof.compute_root_hash::<H>().ok_or(Error::InvalidProof("malformed aunts"))?;
		Ok(vec![root.as_ref().to_vec()])
	}

	fn key(&self) -> &[u8] {
		&self.key
	}

	fn proof_op(&self) -> ProofOp {
		ProofOp::new(PROOF_OP_SIMPLE_VALUE, self.key.clone(), self.proof.encode())
	}
}
