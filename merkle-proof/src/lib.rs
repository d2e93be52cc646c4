// Copyright 2017, 2021 Parity Technologies
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
#![cfg_attr(not(feature = "std"), no_std)]

//! Chained Merkle proofs.
//!
//! A proof for a value stored deep inside a hierarchy of Merkle structures is a sequence
//! of [`ProofOp`]s, ordered from the leaf up to the root. Each operation is decoded into a
//! [`ProofOperator`] by the decoder registered for its type tag in a [`ProofRuntime`]. The
//! runtime then replays the operators: the leaf value goes into the first one, its output
//! into the next, and the output of the last operator must be exactly the trusted root.
//!
//! Every operator declares the key it proves something about. Those keys must match the
//! segments of the requested key path, see [`ProofOperators::verify`].

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
mod rstd {
	pub use std::{boxed, error::Error, fmt, marker, result, string, vec};
}

#[cfg(not(feature = "std"))]
mod rstd {
	pub use alloc::{boxed, string, vec};
	pub use core::{fmt, marker, result};
	pub trait Error {}
	impl<T> Error for T {}
}

use self::rstd::{fmt, string::String, vec::Vec};

pub mod key_path;
pub mod simple;

mod op;
mod runtime;

pub use self::{
	key_path::{key_path_to_keys, KeyEncoding, KeyPath},
	op::{OpDecoder, ProofOp, ProofOperator, ProofOperators, ProofOps},
	runtime::ProofRuntime,
	simple::{SimpleProof, SimpleValueOp, PROOF_OP_SIMPLE_VALUE},
};
pub use proof_hasher::Hasher;

/// Errors raised while decoding or replaying a proof.
///
/// Every failure is terminal: proof replay is a pure function of its inputs, so the
/// same inputs always fail the same way.
#[cfg_attr(feature = "std", derive(Debug))]
pub enum Error {
	/// An operator was given the wrong number of input values.
	InvalidArity { expected: usize, got: usize },
	/// The key of an operator is absent from the structure it proves membership in.
	KeyNotFound(Vec<u8>),
	/// The claimed commitment of a named sub-store differs from the recorded one.
	HashMismatch { name: String, expected: Vec<u8>, got: Vec<u8> },
	/// The leaf hash computed from a key-value pair differs from the one in the proof.
	LeafMismatch { key: Vec<u8>, expected: Vec<u8>, computed: Vec<u8> },
	/// The proof is structurally unable to produce a root.
	InvalidProof(&'static str),
	/// No decoder is registered for the type tag.
	UnknownOperatorType(String),
	/// A decoder was handed an operation tagged for another operator.
	WrongOperatorType { expected: &'static str, got: String },
	/// The payload of an operation could not be decoded.
	Decode(codec::Error),
	/// A decoded commitment hash does not have the length of the digest.
	InvalidCommitHash { name: String, len: usize, expected: usize },
	/// A decoded multi-store proof lists the same sub-store twice.
	DuplicateStore(String),
	/// The key of an operator does not match the key path segment it consumes.
	KeyMismatch { expected: Vec<u8>, got: Vec<u8> },
	/// An operator has a key but every key path segment was already consumed.
	KeyPathExhausted(Vec<u8>),
	/// The chain finished before consuming the whole key path. Holds the leftover
	/// segments, root side first.
	KeyPathNotConsumed(Vec<Vec<u8>>),
	/// The output of the last operator is not the expected root.
	RootMismatch { expected: Vec<u8>, computed: Vec<Vec<u8>> },
	/// A key path string could not be parsed.
	InvalidKeyPath(String),
}

impl From<codec::Error> for Error {
	fn from(err: codec::Error) -> Self {
		Error::Decode(err)
	}
}

#[cfg(feature = "std")]
impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::InvalidArity { expected, got } =>
				write!(f, "Expected exactly {} input value(s), got {}", expected, got),
			Error::KeyNotFound(key) =>
				write!(f, "Key {} not found in proof", ToHex(key)),
			Error::HashMismatch { name, expected, got } => write!(
				f,
				"Hash mismatch for substore {}: recorded {}, claimed {}",
				name,
				ToHex(expected),
				ToHex(got),
			),
			Error::LeafMismatch { key, expected, computed } => write!(
				f,
				"Leaf hash mismatch for key {}: proof has {}, computed {}",
				ToHex(key),
				ToHex(expected),
				ToHex(computed),
			),
			Error::InvalidProof(reason) => write!(f, "Invalid proof: {}", reason),
			Error::UnknownOperatorType(ty) =>
				write!(f, "Unrecognized proof operator type: {}", ty),
			Error::WrongOperatorType { expected, got } =>
				write!(f, "Unexpected proof operator type; got {}, want {}", got, expected),
			Error::Decode(err) => write!(f, "Unable to decode proof operator: {:?}", err),
			Error::InvalidCommitHash { name, len, expected } => write!(
				f,
				"Commit hash of substore {} has length {}, expected {}",
				name, len, expected,
			),
			Error::DuplicateStore(name) =>
				write!(f, "Substore {} appears more than once in proof", name),
			Error::KeyMismatch { expected, got } => write!(
				f,
				"Key mismatch on operation: key path expects {}, operator has {}",
				ToHex(expected),
				ToHex(got),
			),
			Error::KeyPathExhausted(key) => write!(
				f,
				"Key path has insufficient number of parts for operator key {}",
				ToHex(key),
			),
			Error::KeyPathNotConsumed(keys) =>
				write!(f, "Key path not fully consumed: {} part(s) left", keys.len()),
			Error::RootMismatch { expected, computed } => {
				write!(f, "Calculated root hash is invalid: expected {}, got [", ToHex(expected))?;
				for (i, value) in computed.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{}", ToHex(value))?;
				}
				write!(f, "]")
			},
			Error::InvalidKeyPath(path) => write!(f, "Invalid key path: {}", path),
		}
	}
}

#[cfg(feature = "std")]
impl rstd::Error for Error {
	fn source(&self) -> Option<&(dyn rstd::Error + 'static)> {
		match self {
			Error::Decode(err) => Some(err),
			_ => None,
		}
	}
}

/// Proof result type.
pub type Result<T> = rstd::result::Result<T, Error>;

/// Lowercase hex rendering of a byte slice, for logs and error messages.
pub(crate) struct ToHex<'a>(pub &'a [u8]);

impl<'a> fmt::Display for ToHex<'a> {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		let hex = rustc_hex::ToHexIter::new(self.0.iter());
		for b in hex {
			write!(fmt, "{}", b)?;
		}
		Ok(())
	}
}

impl<'a> fmt::Debug for ToHex<'a> {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(self, fmt)
	}
}
