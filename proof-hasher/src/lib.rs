// Copyright 2017, 2018 Parity Technologies
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

//! Digest abstraction shared by proof operators.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::fmt::Debug;
#[cfg(feature = "std")]
use std::hash;
#[cfg(not(feature = "std"))]
use core::hash;

#[cfg(feature = "std")]
pub trait MaybeDebug: Debug {}
#[cfg(feature = "std")]
impl<T: Debug> MaybeDebug for T {}
#[cfg(not(feature = "std"))]
pub trait MaybeDebug {}
#[cfg(not(feature = "std"))]
impl<T> MaybeDebug for T {}

/// Trait describing an object that can hash a slice of bytes. Used to abstract
/// proof operators over the hashing algorithm. Defines a single `hash` method and an
/// `Out` associated type with the necessary bounds.
///
/// Every commitment hash checked by a proof has exactly `LENGTH` bytes.
pub trait Hasher: Sync + Send + 'static {
	/// The output type of the `Hasher`.
	type Out: AsRef<[u8]> + AsMut<[u8]> + Default + MaybeDebug + PartialEq + Eq
		+ hash::Hash + Send + Sync + Clone + Copy;
	/// The length in bytes of the `Hasher` output.
	const LENGTH: usize;

	/// Compute the hash of the provided slice of bytes returning the `Out` type of the `Hasher`.
	fn hash(x: &[u8]) -> Self::Out;

	/// Compute the hash of the concatenation of `parts`, without allocating the
	/// concatenated buffer when the implementation allows it.
	fn hash_concat(parts: &[&[u8]]) -> Self::Out {
		let len = parts.iter().map(|p| p.len()).sum();
		let mut buf = Vec::with_capacity(len);
		for part in parts {
			buf.extend_from_slice(part);
		}
		Self::hash(&buf)
	}
}

#[cfg(feature = "sha256")]
pub use self::sha256::Sha256Hasher;

#[cfg(feature = "sha256")]
mod sha256 {
	use super::Hasher;
	use sha2::{Digest, Sha256};

	/// Concrete `Hasher` impl for SHA-256, the digest multi-store roots are
	/// published with.
	#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
	pub struct Sha256Hasher;

	impl Hasher for Sha256Hasher {
		type Out = [u8; 32];

		const LENGTH: usize = 32;

		fn hash(x: &[u8]) -> Self::Out {
			Sha256::digest(x).into()
		}

		fn hash_concat(parts: &[&[u8]]) -> Self::Out {
			let mut hasher = Sha256::new();
			for part in parts {
				hasher.update(part);
			}
			hasher.finalize().into()
		}
	}
}
