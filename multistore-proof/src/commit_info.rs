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

use crate::rstd::{string::String, vec::Vec};
use crate::MultiStoreProof;
use codec::{Decode, Encode};
use merkle_proof::{simple::hash_from_byte_slices, Hasher};

/// Commitment of one named sub-store.
#[derive(Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct StoreInfo {
	pub name: String,
	/// Root hash of the sub-store, as long as the digest.
	pub commit_hash: Vec<u8>,
}

impl StoreInfo {
	pub fn new(name: impl Into<String>, commit_hash: impl Into<Vec<u8>>) -> Self {
		StoreInfo { name: name.into(), commit_hash: commit_hash.into() }
	}
}

/// Commitments of every sub-store at one version.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct CommitInfo {
	pub version: i64,
	/// Sub-store commitments, in the order they are folded into the root.
	pub store_infos: Vec<StoreInfo>,
}

impl CommitInfo {
	pub fn new(version: i64, store_infos: Vec<StoreInfo>) -> Self {
		CommitInfo { version, store_infos }
	}

	/// Root hash of the multi-store.
	///
	/// The SCALE encoding of each [`StoreInfo`] is a leaf of a simple Merkle tree (see
	/// [`merkle_proof::simple`]), taken in list order. `version` is not part of the hash.
	pub fn hash<H: Hasher>(&self) -> H::Out {
		let leaves: Vec<Vec<u8>> = self.store_infos.iter().map(Encode::encode).collect();
		hash_from_byte_slices::<H, _>(&leaves)
	}

	pub fn store_info(&self, name: &str) -> Option<&StoreInfo> {
		self.store_infos.iter().find(|info| info.name == name)
	}

	/// Proof of every sub-store commitment against [`Self::hash`].
	pub fn multi_store_proof(&self) -> MultiStoreProof {
		MultiStoreProof::new(self.store_infos.clone())
	}
}
