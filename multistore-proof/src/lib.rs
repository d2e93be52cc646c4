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
#![cfg_attr(not(feature = "std"), no_std)]

//! Multi-store proofs.
//!
//! A multi-store is made of several named sub-stores, each committing to its own root.
//! The commitments are folded, in a fixed order, into the single root hash that gets
//! published (see [`CommitInfo::hash`]). A [`MultiStoreProofOp`] carries that ordered
//! list and proves that one sub-store commitment is part of the published root; it is
//! the last operator of a proof chain whose earlier operators prove a value inside the
//! sub-store.

#[cfg(not(feature = "std"))]
extern crate alloc;

mod rstd {
	#[cfg(not(feature = "std"))]
	pub use alloc::{boxed, string, vec};
	#[cfg(not(feature = "std"))]
	pub use core::{fmt, marker};
	#[cfg(feature = "std")]
	pub use std::{boxed, fmt, marker, string, vec};
}

mod commit_info;
mod proof;

pub use self::{
	commit_info::{CommitInfo, StoreInfo},
	proof::{multi_store_proof_op_decoder, MultiStoreProof, MultiStoreProofOp, PROOF_OP_MULTI_STORE},
};
pub use merkle_proof::{Error, ProofOp, ProofOperator, ProofRuntime, Result};

use merkle_proof::{simple::simple_value_op_decoder, Hasher, PROOF_OP_SIMPLE_VALUE};

/// Query sub-path whose responses carry a proof.
pub const PROOF_SUBPATH: &str = "/key";

/// Whether a query on `subpath` gets a proof attached to its response.
///
/// Only raw key lookups are proven. The store answering queries must attach proofs in
/// exactly the same cases.
pub fn require_proof(subpath: &str) -> bool {
	subpath == PROOF_SUBPATH
}

/// Runtime able to decode simple value proofs and multi-store proofs.
///
/// Decoders for the sub-store tree proofs are registered on top by the caller.
pub fn default_proof_runtime<H: Hasher>() -> ProofRuntime {
	let mut runtime = ProofRuntime::new();
	runtime.register_op_decoder(PROOF_OP_SIMPLE_VALUE, simple_value_op_decoder::<H>);
	runtime.register_op_decoder(PROOF_OP_MULTI_STORE, multi_store_proof_op_decoder::<H>);
	runtime
}
