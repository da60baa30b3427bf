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
use openssl::pkcs5::bytes_to_key;
use openssl::symm::{self, Cipher};

use crate::error::{CodecError, Result};

/// Key derivation salt.  Part of the wire format: blobs produced by
/// other implementations only decrypt with exactly these bytes.
pub const SALT: [u8; 8] = [0xCE, 0xFB, 0xDE, 0xAC, 0x05, 0x02, 0x19, 0x71];

/// Key derivation iteration count, also part of the wire format.
pub const ITERATIONS: i32 = 2005;

/// Password-based DES/CBC/PKCS5Padding, with key and IV derived by
/// PKCS#5 v1.5 (MD5) from the password, [`SALT`], and [`ITERATIONS`].
///
/// Key material is derived once; every call builds its own cipher
/// context, so one engine can serve any number of threads.
pub struct PbeCipher {
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl std::fmt::Debug for PbeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PbeCipher").finish_non_exhaustive()
    }
}

impl PbeCipher {
    pub fn new(password: &str) -> Result<Self> {
        load_legacy_provider();
        let cipher = Cipher::des_cbc();
        let derived =
            bytes_to_key(cipher, MessageDigest::md5(), password.as_bytes(), Some(&SALT), ITERATIONS)?;
        let iv = derived.iv.ok_or_else(ErrorStack::get)?;
        let engine = Self { key: derived.key, iv };
        // fail now, rather than on first use, if DES isn't available
        engine.encrypt(b"")?;
        Ok(engine)
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        Ok(symm::encrypt(Cipher::des_cbc(), &self.key, Some(&self.iv), plaintext)?)
    }

    /// Any failure here means the key is wrong or the ciphertext has
    /// been damaged, and there's no telling which.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        symm::decrypt(Cipher::des_cbc(), &self.key, Some(&self.iv), ciphertext).map_err(|err| {
            debug!("DES decryption failed: {}", err);
            CodecError::InvalidPassword
        })
    }
}

#[cfg(ossl300)]
fn load_legacy_provider() {
    use openssl::provider::Provider;
    use std::sync::Once;

    static LEGACY: Once = Once::new();
    LEGACY.call_once(|| match Provider::try_load(None, "legacy", true) {
        // providers unload when dropped, and DES must stay available
        Ok(provider) => std::mem::forget(provider),
        Err(err) => log::warn!("Can't load the OpenSSL legacy provider: {}", err),
    });
}

#[cfg(not(ossl300))]
fn load_legacy_provider() {}
