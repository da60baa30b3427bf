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
use openssl::error::ErrorStack;
use thiserror::Error;

use crate::document::DocumentError;

pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Everything that can go wrong encoding or decoding a license blob.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Encoding needs a private key, and only a public key was supplied.
    #[error("cannot use a public key to encode a license")]
    PrivateKeyNeeded,

    /// The blob did not decrypt.  A wrong password and a corrupted
    /// ciphertext are indistinguishable at the cipher layer.  This is
    /// also the error when the blob decrypts but what comes out has no
    /// gzip header: a wrong key passes the padding check about once in
    /// 256 tries, and the result is still garbage.  Content with a gzip
    /// header that fails to decompress is an [`InvalidLicense`].
    ///
    /// [`InvalidLicense`]: CodecError::InvalidLicense
    #[error("could not decrypt license blob")]
    InvalidPassword,

    /// The blob decrypted but its content is malformed, or its
    /// signature does not match the configured key.
    #[error("invalid license: {0}")]
    InvalidLicense(String),

    #[error("signature algorithm {0} is not supported")]
    UnsupportedAlgorithm(String),

    #[error("signature encoding {0} is not supported")]
    UnsupportedEncoding(String),

    #[error("cryptographic failure: {0}")]
    Crypto(#[from] ErrorStack),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DocumentError> for CodecError {
    fn from(err: DocumentError) -> Self {
        CodecError::InvalidLicense(format!("malformed document: {}", err))
    }
}
