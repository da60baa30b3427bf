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
use log::{debug, warn};
use openssl::pkey::{PKey, Private, Public};
use tlc_base::DsaKey;

use crate::certificate::Certificate;
use crate::cipher::PbeCipher;
use crate::compress::{gunzip, gzip, is_gzip};
use crate::content::LicenseData;
use crate::error::{CodecError, Result};
use crate::signature;

/// Reads and writes license blobs for one password and key.
///
/// A blob is the license content document, signed and wrapped in a
/// certificate document, then gzipped, then DES-encrypted.  Writing
/// needs a private key; reading only ever uses the public one.
pub struct LicenseCodec {
    cipher: PbeCipher,
    signing_key: Option<PKey<Private>>,
    verifying_key: PKey<Public>,
}

impl std::fmt::Debug for LicenseCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseCodec")
            .field("can_encode", &self.can_encode())
            .field("key_bits", &self.verifying_key.bits())
            .finish()
    }
}

impl LicenseCodec {
    pub fn new(password: &str, key: &DsaKey) -> Result<Self> {
        Ok(Self {
            cipher: PbeCipher::new(password)?,
            signing_key: key.private_key().cloned(),
            verifying_key: key.public_key()?,
        })
    }

    pub fn can_encode(&self) -> bool {
        self.signing_key.is_some()
    }

    pub fn encode(&self, license: &LicenseData) -> Result<Vec<u8>> {
        let signing_key = self.signing_key.as_ref().ok_or(CodecError::PrivateKeyNeeded)?;
        let inner = license.to_xml();
        let signature = signature::sign(signing_key, inner.as_bytes())?;
        let outer = Certificate::new(inner, signature).to_xml();
        let compressed = gzip(outer.as_bytes())?;
        let blob = self.cipher.encrypt(&compressed)?;
        debug!(
            "Encoded license for '{}': {} byte certificate, {} byte blob",
            license.subject,
            outer.len(),
            blob.len()
        );
        Ok(blob)
    }

    pub fn decode(&self, blob: &[u8]) -> Result<LicenseData> {
        let certificate = self.decode_certificate(blob)?;
        let license = LicenseData::from_xml(&certificate.encoded)?;
        debug!("Decoded license for '{}'", license.subject);
        Ok(license)
    }

    /// Decrypt a blob and check its signature, without interpreting
    /// the license content inside.
    pub fn decode_certificate(&self, blob: &[u8]) -> Result<Certificate> {
        let compressed = self.cipher.decrypt(blob)?;
        // with the wrong key, padding checks out once in 256 tries,
        // but the decrypted header is still garbage
        if !is_gzip(&compressed) {
            debug!("Decrypted blob has no gzip header");
            return Err(CodecError::InvalidPassword);
        }
        let outer = gunzip(&compressed)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| {
                CodecError::InvalidLicense("malformed compressed content".to_string())
            })?;
        debug!("Decrypted {} byte blob into {} byte certificate", blob.len(), outer.len());
        let certificate = Certificate::from_xml(&outer)?;
        if !signature::verify(
            &self.verifying_key,
            certificate.encoded.as_bytes(),
            &certificate.signature,
        ) {
            warn!("License signature does not match the configured key");
            return Err(CodecError::InvalidLicense("signature mismatch".to_string()));
        }
        Ok(certificate)
    }
}
