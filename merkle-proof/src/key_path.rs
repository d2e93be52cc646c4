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

//! Textual key paths.
//!
//! A key path lists the keys of a proof from the root down to the leaf, e.g.
//! `/bank/x:0a0b` for the raw key `0x0a0b` in the sub-store `bank`. Each segment is
//! either percent-encoded (everything but ASCII alphanumerics and `-._~` is escaped) or,
//! when prefixed with `x:`, hex encoded.

use crate::rstd::{fmt, result::Result as StdResult, string::String, vec::Vec};
use crate::{Error, Result};

const HEX_PREFIX: &str = "x:";
const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

/// How a segment is written out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyEncoding {
	Url,
	Hex,
}

/// Builder for key path strings, root segment first.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct KeyPath(Vec<(Vec<u8>, KeyEncoding)>);

impl KeyPath {
	pub fn new() -> Self {
		KeyPath(Vec::new())
	}

	/// Append a segment below the current ones.
	pub fn append_key(mut self, key: impl Into<Vec<u8>>, enc: KeyEncoding) -> Self {
		self.0.push((key.into(), enc));
		self
	}

	/// The raw keys, root segment first.
	pub fn keys(&self) -> Vec<Vec<u8>> {
		self.0.iter().map(|(k, _)| k.clone()).collect()
	}
}

impl fmt::Display for KeyPath {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (key, enc) in &self.0 {
			f.write_str("/")?;
			match enc {
				KeyEncoding::Url => f.write_str(&url_escape(key))?,
				KeyEncoding::Hex => {
					f.write_str(HEX_PREFIX)?;
					for b in rustc_hex::ToHexIter::new(key.iter()) {
						write!(f, "{}", b)?;
					}
				},
			}
		}
		Ok(())
	}
}

fn url_escape(key: &[u8]) -> String {
	let mut out = String::with_capacity(key.len());
	for &b in key {
		if b.is_ascii_alphanumeric() || b == b'-' || b == b'.' || b == b'_' || b == b'~' {
			out.push(b as char);
		} else {
			out.push('%');
			out.push(UPPER_HEX[(b >> 4) as usize] as char);
			out.push(UPPER_HEX[(b & 0x0f) as usize] as char);
		}
	}
	out
}

fn url_unescape(part: &str) -> Option<Vec<u8>> {
	let bytes = part.as_bytes();
	let mut out = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			let hi = (*bytes.get(i + 1)? as char).to_digit(16)?;
			let lo = (*bytes.get(i + 2)? as char).to_digit(16)?;
			out.push((hi << 4 | lo) as u8);
			i += 3;
		} else {
			out.push(bytes[i]);
			i += 1;
		}
	}
	Some(out)
}

/// Parse a key path string into its raw keys, root segment first.
pub fn key_path_to_keys(path: &str) -> Result<Vec<Vec<u8>>> {
	let rest = path
		.strip_prefix('/')
		.ok_or_else(|| Error::InvalidKeyPath(path.into()))?;
	rest.split('/')
		.map(|part| {
			let key = match part.strip_prefix(HEX_PREFIX) {
				Some(hex) if hex.len() % 2 == 0 =>
					rustc_hex::FromHexIter::new(hex).collect::<StdResult<Vec<u8>, _>>().ok(),
				Some(_) => None,
				None => url_unescape(part),
			};
			key.ok_or_else(|| Error::InvalidKeyPath(path.into()))
		})
		.collect()
}
