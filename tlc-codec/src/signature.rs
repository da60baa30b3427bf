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
use log::debug;
use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::pkey::{HasPublic, PKeyRef, Private};
use openssl::sign::{Signer, Verifier};

/// The only signature scheme certificates are produced with: a SHA-1
/// digest signed with DSA, the signature being the DER `(r, s)` pair.
pub const SIGNATURE_ALGORITHM: &str = "SHA1withDSA";

/// How the signature bytes are embedded in a certificate.
pub const SIGNATURE_ENCODING: &str = "US-ASCII/Base64";

pub fn sign(key: &PKeyRef<Private>, data: &[u8]) -> Result<Vec<u8>, ErrorStack> {
    let mut signer = Signer::new(MessageDigest::sha1(), key)?;
    signer.update(data)?;
    signer.sign_to_vec()
}

/// Works with private keys as well as public ones, since only the
/// public component is used.  Signatures that can't even be parsed
/// simply don't verify.
pub fn verify<T: HasPublic>(key: &PKeyRef<T>, data: &[u8], signature: &[u8]) -> bool {
    let outcome = Verifier::new(MessageDigest::sha1(), key).and_then(|mut verifier| {
        verifier.update(data)?;
        verifier.verify(signature)
    });
    match outcome {
        Ok(valid) => valid,
        Err(err) => {
            debug!("Signature verification failed: {}", err);
            false
        }
    }
}
