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
use log::warn;
use tlc_base::{b64decode, b64encode};

use crate::document::{self, Record, Value};
use crate::error::{CodecError, Result};
use crate::signature::{SIGNATURE_ALGORITHM, SIGNATURE_ENCODING};

pub const CERTIFICATE_CLASS: &str = "de.schlichtherle.xml.GenericCertificate";

/// The signed envelope around an encoded license document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub encoded: String,
    pub signature: Vec<u8>,
    pub signature_algorithm: String,
    pub signature_encoding: String,
}

impl Certificate {
    pub fn new(encoded: String, signature: Vec<u8>) -> Self {
        Self {
            encoded,
            signature,
            signature_algorithm: SIGNATURE_ALGORITHM.to_string(),
            signature_encoding: SIGNATURE_ENCODING.to_string(),
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new(CERTIFICATE_CLASS);
        record.push("encoded", Value::String(self.encoded.clone()));
        record.push("signature", Value::String(b64encode(&self.signature)));
        record.push("signatureAlgorithm", Value::String(self.signature_algorithm.clone()));
        record.push("signatureEncoding", Value::String(self.signature_encoding.clone()));
        record
    }

    /// Rejects envelopes that declare any signature scheme other
    /// than the one we produce.
    pub fn from_record(record: &Record) -> Result<Self> {
        if record.class != CERTIFICATE_CLASS {
            return Err(CodecError::InvalidLicense(format!(
                "certificate has unexpected class {}",
                record.class
            )));
        }
        let signature_algorithm = string_property(record, "signatureAlgorithm")?;
        if signature_algorithm != SIGNATURE_ALGORITHM {
            warn!("Rejecting certificate signed with {}", signature_algorithm);
            return Err(CodecError::UnsupportedAlgorithm(signature_algorithm));
        }
        let signature_encoding = string_property(record, "signatureEncoding")?;
        if signature_encoding != SIGNATURE_ENCODING {
            warn!("Rejecting certificate with signature encoding {}", signature_encoding);
            return Err(CodecError::UnsupportedEncoding(signature_encoding));
        }
        let signature = b64decode(&string_property(record, "signature")?)
            .map_err(|err| CodecError::InvalidLicense(format!("{}", err)))?;
        let encoded = string_property(record, "encoded")?;
        Ok(Self { encoded, signature, signature_algorithm, signature_encoding })
    }

    /// The outer certificate document.
    pub fn to_xml(&self) -> String {
        document::to_xml(&Value::Record(self.to_record()))
    }

    pub fn from_xml(text: &str) -> Result<Self> {
        match document::from_xml(text)? {
            Value::Record(record) => Self::from_record(&record),
            other => Err(CodecError::InvalidLicense(format!(
                "certificate is a {} rather than an object",
                other.tag()
            ))),
        }
    }
}

fn string_property(record: &Record, name: &str) -> Result<String> {
    match record.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(CodecError::InvalidLicense(format!(
            "certificate property {} should be a string but is a {}",
            name,
            other.tag()
        ))),
        None => Err(CodecError::InvalidLicense(format!(
            "certificate property {} is missing",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Certificate {
        Certificate::new("<inner/>".to_string(), vec![0x30, 0x2c, 0x02, 0x14, 0xff])
    }

    #[test]
    fn test_envelope_round_trip() {
        let cert = sample();
        let xml = cert.to_xml();
        assert!(xml.contains("<string>MCwCFP8=</string>"));
        assert!(xml.contains("<string>SHA1withDSA</string>"));
        assert!(xml.contains("<string>US-ASCII/Base64</string>"));
        assert_eq!(Certificate::from_xml(&xml).unwrap(), cert);
    }

    #[test]
    fn test_unsupported_schemes() {
        let mut cert = sample();
        cert.signature_algorithm = "SHA256withRSA".to_string();
        let err = Certificate::from_xml(&cert.to_xml()).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedAlgorithm(ref alg) if alg == "SHA256withRSA"));
        let mut cert = sample();
        cert.signature_encoding = "UTF-8/Hex".to_string();
        let err = Certificate::from_xml(&cert.to_xml()).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedEncoding(ref enc) if enc == "UTF-8/Hex"));
    }

    #[test]
    fn test_multiline_signature() {
        let mut record = sample().to_record();
        for (name, value) in record.properties.iter_mut() {
            if name == "signature" {
                *value = Value::String("MCwC\nFP8=\n".to_string());
            }
        }
        assert_eq!(Certificate::from_record(&record).unwrap(), sample());
    }

    #[test]
    fn test_malformed_envelopes() {
        let mut record = sample().to_record();
        record.properties.retain(|(name, _)| name != "encoded");
        assert!(matches!(Certificate::from_record(&record), Err(CodecError::InvalidLicense(_))));
        let mut record = sample().to_record();
        record.class = "de.schlichtherle.license.LicenseContent".to_string();
        assert!(matches!(Certificate::from_record(&record), Err(CodecError::InvalidLicense(_))));
        let mut record = sample().to_record();
        for (name, value) in record.properties.iter_mut() {
            if name == "signature" {
                *value = Value::String("%%%".to_string());
            }
        }
        assert!(matches!(Certificate::from_record(&record), Err(CodecError::InvalidLicense(_))));
        assert!(matches!(
            Certificate::from_xml("<java><string>x</string></java>"),
            Err(CodecError::InvalidLicense(_))
        ));
    }
}
