/*
Copyright 2022 Daniel Brotsky. All rights reserved.

All of the copyrighted work in this repository is licensed under the
GNU Affero General Public License, reproduced in the LICENSE-AGPL file.

Attribution:

Some source files in this repository are derived from files in two Adobe Open
Source projects: the Adobe License Decoder repository found at this URL:
    https://github.com/adobe/adobe-license-decoder.rs
and the FRL Online Proxy repository found at this URL:
    https://github.com/adobe/frl-online-proxy

The files in those original works are copyright 2022 Adobe and the use of those
materials in this work is permitted by the MIT license under which they were
released.  That license is reproduced here in the LICENSE-MIT file.
*/
//! Reads and writes TrueLicense-style license blobs: license terms in a
//! self-describing XML document, signed with SHA-1/DSA, wrapped in a
//! certificate document, gzipped, and encrypted with password-based DES.
//!
//! ```no_run
//! use tlc_base::DsaKey;
//! use tlc_codec::{LicenseCodec, LicenseData};
//!
//! # fn main() -> eyre::Result<()> {
//! let key = DsaKey::load_pem_file("license-signing.pem", None)?;
//! let codec = LicenseCodec::new("my secret password", &key)?;
//! let license = LicenseData {
//!     consumer_type: "User".to_string(),
//!     subject: "Some product".to_string(),
//!     holder: "CN=Some Customer".into(),
//!     issuer: "CN=Some Vendor".into(),
//!     ..Default::default()
//! };
//! let blob = codec.encode(&license)?;
//! assert_eq!(codec.decode(&blob)?, license);
//! # Ok(())
//! # }
//! ```
pub use certificate::{Certificate, CERTIFICATE_CLASS};
pub use codec::LicenseCodec;
pub use content::{LicenseData, Principal, LICENSE_CONTENT_CLASS};
pub use error::{CodecError, Result};
pub use signature::{SIGNATURE_ALGORITHM, SIGNATURE_ENCODING};
pub use tlc_base::{DsaKey, Timestamp};

pub mod certificate;
pub mod cipher;
mod codec;
pub mod compress;
mod content;
pub mod document;
mod error;
pub mod signature;
