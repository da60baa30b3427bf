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
use std::sync::Arc;

use lazy_static::lazy_static;
use openssl::dsa::Dsa;
use openssl::pkey::PKey;
use tlc_codec::cipher::PbeCipher;
use tlc_codec::document::{self, Value};
use tlc_codec::{
    compress, signature, Certificate, CodecError, DsaKey, LicenseCodec, LicenseData, Timestamp,
};

const PASSWORD: &str = "my secret password";

lazy_static! {
    static ref KEY1: DsaKey = generate();
    static ref KEY2: DsaKey = generate();
}

fn generate() -> DsaKey {
    let dsa = Dsa::generate(1024).expect("Can't generate DSA key");
    DsaKey::from_private(PKey::from_dsa(dsa).unwrap()).unwrap()
}

fn license() -> LicenseData {
    let now = Timestamp::now();
    LicenseData {
        consumer_type: "0".to_string(),
        not_before: Some(now.plus_days(-5)),
        not_after: Some(now.plus_days(10)),
        extra: Some("an <html><document /></html>".to_string()),
        subject: "Some subject".to_string(),
        holder: "CN=Name".into(),
        issued: now,
        issuer: "CN=Name".into(),
    }
}

fn writer() -> LicenseCodec {
    LicenseCodec::new(PASSWORD, &KEY1).unwrap()
}

fn reader(password: &str, key: &DsaKey) -> LicenseCodec {
    LicenseCodec::new(password, &key.to_public().unwrap()).unwrap()
}

#[test]
fn test_encode_decode() {
    let license = license();
    let blob = writer().encode(&license).unwrap();
    let decoded = reader(PASSWORD, &KEY1).decode(&blob).unwrap();
    assert_eq!(decoded, license, "License data should not change through encoding");
    // the private key can read its own licenses too
    assert_eq!(writer().decode(&blob).unwrap(), license);
}

#[test]
fn test_millisecond_precision() {
    let mut license = license();
    license.issued = Timestamp::from_millis(1_700_000_000_999);
    license.not_before = Some(Timestamp::from_millis(-1));
    license.not_after = Some(Timestamp::from_millis(i64::MAX));
    let blob = writer().encode(&license).unwrap();
    assert_eq!(reader(PASSWORD, &KEY1).decode(&blob).unwrap(), license);
}

#[test]
fn test_unusual_content() {
    let mut license = license();
    license.consumer_type = String::new();
    license.extra = Some("<![CDATA[ nested ]]> & \"quotes\"\r\n\ttabs  ".to_string());
    license.subject = "Grüße aus 東京".to_string();
    license.holder = "CN=Doe\\, Jane,O=Ex & Co,C=US".into();
    license.issuer = "".into();
    let blob = writer().encode(&license).unwrap();
    assert_eq!(reader(PASSWORD, &KEY1).decode(&blob).unwrap(), license);
}

#[test]
fn test_exception_on_encoding_with_public_key() {
    let codec = reader(PASSWORD, &KEY1);
    let err = codec.encode(&license()).unwrap_err();
    assert!(matches!(err, CodecError::PrivateKeyNeeded), "Got {:?}", err);
}

#[test]
fn test_license_invalid_if_signed_with_other_key() {
    let blob = writer().encode(&license()).unwrap();
    let err = reader(PASSWORD, &KEY2).decode(&blob).unwrap_err();
    assert!(
        matches!(err, CodecError::InvalidLicense(ref msg) if msg == "signature mismatch"),
        "Got {:?}",
        err
    );
}

#[test]
fn test_license_invalid_if_wrong_password() {
    let blob = writer().encode(&license()).unwrap();
    let err = reader("wrong password", &KEY1).decode(&blob).unwrap_err();
    assert!(matches!(err, CodecError::InvalidPassword), "Got {:?}", err);
}

#[test]
fn test_wrong_password_never_decodes() {
    // corruption and wrong passwords are reported alike at the cipher layer
    let blob = writer().encode(&license()).unwrap();
    for password in ["", "my secret passwor", "My secret password", "my secret password "] {
        let err = reader(password, &KEY1).decode(&blob).unwrap_err();
        assert!(matches!(err, CodecError::InvalidPassword), "{:?}: {:?}", password, err);
    }
}

#[test]
fn test_tampering_is_detected() {
    let codec = writer();
    let blob = codec.encode(&license()).unwrap();
    for i in 0..blob.len() {
        let mut damaged = blob.clone();
        damaged[i] ^= 1 << (i % 8);
        match codec.decode(&damaged) {
            Err(CodecError::InvalidPassword) | Err(CodecError::InvalidLicense(_)) => {}
            other => panic!("Flipping a bit in byte {} gave {:?}", i, other),
        }
    }
    let truncated = &blob[..blob.len() - 8];
    assert!(codec.decode(truncated).is_err());
}

#[test]
fn test_encoding_is_randomized_but_stable() {
    let codec = writer();
    let license = license();
    let first = codec.encode(&license).unwrap();
    let second = codec.encode(&license).unwrap();
    assert_ne!(first, second, "DSA signatures should differ between encodings");
    assert_eq!(codec.decode(&first).unwrap(), license);
    assert_eq!(codec.decode(&second).unwrap(), license);
}

#[test]
fn test_shared_between_threads() {
    let codec = Arc::new(writer());
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let codec = Arc::clone(&codec);
            std::thread::spawn(move || {
                let mut license = license();
                license.subject = format!("Subject {}", n);
                for _ in 0..5 {
                    let blob = codec.encode(&license).unwrap();
                    assert_eq!(codec.decode(&blob).unwrap(), license);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

/// Build a blob by hand, the way another producer might.
fn assemble(certificate: &Certificate, signature_text: Option<&str>) -> Vec<u8> {
    let mut record = certificate.to_record();
    if let Some(text) = signature_text {
        for (name, value) in record.properties.iter_mut() {
            if name == "signature" {
                *value = Value::String(text.to_string());
            }
        }
    }
    seal(document::to_xml(&Value::Record(record)).as_bytes())
}

/// Compress and encrypt an outer document as is.
fn seal(outer: &[u8]) -> Vec<u8> {
    let compressed = compress::gzip(outer).unwrap();
    PbeCipher::new(PASSWORD).unwrap().encrypt(&compressed).unwrap()
}

#[test]
fn test_line_broken_signature_accepted() {
    let license = license();
    let inner = license.to_xml();
    let sig = signature::sign(KEY1.private_key().unwrap(), inner.as_bytes()).unwrap();
    let b64 = tlc_base::b64encode(&sig);
    let wrapped = b64
        .as_bytes()
        .chunks(60)
        .map(|line| format!("{}\n", std::str::from_utf8(line).unwrap()))
        .collect::<String>();
    let blob = assemble(&Certificate::new(inner, sig), Some(&wrapped));
    assert_eq!(reader(PASSWORD, &KEY1).decode(&blob).unwrap(), license);
}

#[test]
fn test_unsupported_signature_schemes() {
    let inner = license().to_xml();
    let sig = signature::sign(KEY1.private_key().unwrap(), inner.as_bytes()).unwrap();
    let mut certificate = Certificate::new(inner, sig);
    certificate.signature_algorithm = "SHA256withDSA".to_string();
    let err = reader(PASSWORD, &KEY1).decode(&assemble(&certificate, None)).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedAlgorithm(ref alg) if alg == "SHA256withDSA"));
    certificate.signature_algorithm = tlc_codec::SIGNATURE_ALGORITHM.to_string();
    certificate.signature_encoding = "US-ASCII/Hex".to_string();
    let err = reader(PASSWORD, &KEY1).decode(&assemble(&certificate, None)).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedEncoding(ref enc) if enc == "US-ASCII/Hex"));
}

#[test]
fn test_altered_content_fails_signature() {
    let license = license();
    let inner = license.to_xml();
    let sig = signature::sign(KEY1.private_key().unwrap(), inner.as_bytes()).unwrap();
    let forged = inner.replace("Some subject", "Some other subject");
    let blob = assemble(&Certificate::new(forged, sig), None);
    let err = reader(PASSWORD, &KEY1).decode(&blob).unwrap_err();
    assert!(matches!(err, CodecError::InvalidLicense(ref msg) if msg == "signature mismatch"));
}

#[test]
fn test_signed_garbage_content() {
    let inner = "<java><string>not a license</string></java>".to_string();
    let sig = signature::sign(KEY1.private_key().unwrap(), inner.as_bytes()).unwrap();
    let blob = assemble(&Certificate::new(inner, sig), None);
    let err = reader(PASSWORD, &KEY1).decode(&blob).unwrap_err();
    assert!(matches!(err, CodecError::InvalidLicense(_)), "Got {:?}", err);
}

#[test]
fn test_sparse_license_content() {
    // a producer that never set the validity window or the extra data
    let inner = r#"<?xml version="1.0" encoding="UTF-8"?>
<java version="1.6.0_45" class="java.beans.XMLDecoder">
 <object class="de.schlichtherle.license.LicenseContent">
  <void property="consumerType">
   <string>User</string>
  </void>
  <void property="holder">
   <object class="javax.security.auth.x500.X500Principal">
    <string>CN=Holder</string>
   </object>
  </void>
  <void property="issued">
   <object class="java.util.Date">
    <long>1700000000000</long>
   </object>
  </void>
  <void property="issuer">
   <object class="javax.security.auth.x500.X500Principal">
    <string>CN=Issuer</string>
   </object>
  </void>
  <void property="subject">
   <string>Some subject</string>
  </void>
 </object>
</java>
"#
    .to_string();
    let sig = signature::sign(KEY1.private_key().unwrap(), inner.as_bytes()).unwrap();
    let blob = assemble(&Certificate::new(inner, sig), None);
    let decoded = reader(PASSWORD, &KEY1).decode(&blob).unwrap();
    assert_eq!(decoded.consumer_type, "User");
    assert_eq!(decoded.holder.name(), "CN=Holder");
    assert_eq!(decoded.issuer.name(), "CN=Issuer");
    assert_eq!(decoded.issued, Timestamp::from_millis(1_700_000_000_000));
    assert_eq!(decoded.subject, "Some subject");
    assert_eq!(decoded.not_before, None);
    assert_eq!(decoded.not_after, None);
    assert_eq!(decoded.extra, None);

    // and the codec writes such content back without the absent properties
    let blob = writer().encode(&decoded).unwrap();
    assert_eq!(reader(PASSWORD, &KEY1).decode(&blob).unwrap(), decoded);
}

#[test]
fn test_deeply_nested_certificate_rejected() {
    let mut outer = String::from("<java>");
    for _ in 0..100_000 {
        outer.push_str(r#"<object class="x"><void property="a">"#);
    }
    outer.push_str("<string>deep</string>");
    for _ in 0..100_000 {
        outer.push_str("</void></object>");
    }
    outer.push_str("</java>");
    let err = reader(PASSWORD, &KEY1).decode(&seal(outer.as_bytes())).unwrap_err();
    assert!(matches!(err, CodecError::InvalidLicense(_)), "Got {:?}", err);
}

#[test]
fn test_oversized_content_rejected() {
    let zeros = vec![0u8; compress::MAX_DECOMPRESSED as usize + 1];
    let blob = seal(&zeros);
    assert!(blob.len() < 64 * 1024, "Zeros should compress well, got {} bytes", blob.len());
    let err = reader(PASSWORD, &KEY1).decode(&blob).unwrap_err();
    assert!(
        matches!(err, CodecError::InvalidLicense(ref msg) if msg == "malformed compressed content"),
        "Got {:?}",
        err
    );
}
