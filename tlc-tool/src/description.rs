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
use tlc_base::Timestamp;
use tlc_codec::{Certificate, LicenseData};

/// Where a license stands relative to the given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    NotYetValid,
    Valid,
    Expired,
}

impl std::fmt::Display for Validity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Validity::NotYetValid => write!(f, "not yet valid"),
            Validity::Valid => write!(f, "valid"),
            Validity::Expired => write!(f, "expired"),
        }
    }
}

/// A missing bound leaves that side of the window open.
pub fn validity(license: &LicenseData, now: Timestamp) -> Validity {
    if license.not_before.map_or(false, |start| now < start) {
        Validity::NotYetValid
    } else if license.not_after.map_or(false, |end| now > end) {
        Validity::Expired
    } else {
        Validity::Valid
    }
}

pub fn describe_license(license: &LicenseData, now: Timestamp) -> String {
    let mut lines = vec![
        format!("License subject: {}", license.subject),
        format!("    Holder: {}", license.holder),
        format!("    Issuer: {}", license.issuer),
        format!("    Issued: {}", license.issued.to_local_date()),
        format!(
            "    Valid from {} through {} ({})",
            license.not_before.map_or("any time".to_string(), |ts| ts.to_local_date()),
            license.not_after.map_or("any time".to_string(), |ts| ts.to_local_date()),
            validity(license, now)
        ),
        format!("    Consumer type: {}", license.consumer_type),
    ];
    let extra = license.extra.as_deref().unwrap_or_default();
    if !extra.is_empty() {
        lines.push("    Extra:".to_string());
        for line in extra.lines() {
            lines.push(format!("        {}", line));
        }
    }
    lines.join("\n") + "\n"
}

pub fn describe_certificate(certificate: &Certificate) -> String {
    let signature = tlc_base::b64encode(&certificate.signature);
    let mut result = format!(
        "Signature algorithm: {}\nSignature encoding: {}\nSignature ({} bytes): {}\n",
        certificate.signature_algorithm,
        certificate.signature_encoding,
        certificate.signature.len(),
        signature,
    );
    result.push_str("Signed document:\n");
    result.push_str(&certificate.encoded);
    if !certificate.encoded.ends_with('\n') {
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license() -> LicenseData {
        let issued = "2024-03-01T12:00:00.000+0000".parse::<Timestamp>().unwrap();
        LicenseData {
            consumer_type: "User".to_string(),
            not_before: Some(issued),
            not_after: Some(issued.plus_days(30)),
            extra: Some("line one\nline two".to_string()),
            subject: "Some product".to_string(),
            holder: "CN=Customer".into(),
            issued,
            issuer: "CN=Vendor".into(),
        }
    }

    #[test]
    fn test_validity() {
        let license = license();
        assert_eq!(validity(&license, license.issued.plus_days(-1)), Validity::NotYetValid);
        assert_eq!(validity(&license, license.issued), Validity::Valid);
        assert_eq!(validity(&license, license.issued.plus_days(30)), Validity::Valid);
        assert_eq!(validity(&license, license.issued.plus_days(31)), Validity::Expired);
    }

    #[test]
    fn test_open_validity_window() {
        let mut license = license();
        license.not_before = None;
        assert_eq!(validity(&license, license.issued.plus_days(-1000)), Validity::Valid);
        assert_eq!(validity(&license, license.issued.plus_days(31)), Validity::Expired);
        license.not_after = None;
        assert_eq!(validity(&license, license.issued.plus_days(1000)), Validity::Valid);
        let text = describe_license(&license, license.issued);
        assert!(text.contains("    Valid from any time through any time (valid)\n"));
    }

    #[test]
    fn test_describe_license() {
        let license = license();
        let text = describe_license(&license, license.issued.plus_days(40));
        assert!(text.starts_with("License subject: Some product\n"));
        assert!(text.contains("    Holder: CN=Customer\n"));
        assert!(text.contains("    Issuer: CN=Vendor\n"));
        assert!(text.contains("(expired)\n"));
        assert!(text.contains("    Consumer type: User\n"));
        assert!(text.ends_with("    Extra:\n        line one\n        line two\n"));
        let mut license = license;
        license.extra = Some(String::new());
        assert!(!describe_license(&license, license.issued).contains("Extra"));
        license.extra = None;
        assert!(!describe_license(&license, license.issued).contains("Extra"));
    }

    #[test]
    fn test_describe_certificate() {
        let signature = vec![0x30, 0x2c, 0x02, 0x14, 0xff];
        let certificate = Certificate::new("<java/>".to_string(), signature);
        let text = describe_certificate(&certificate);
        assert!(text.contains("Signature algorithm: SHA1withDSA\n"));
        assert!(text.contains("Signature encoding: US-ASCII/Base64\n"));
        assert!(text.contains("Signature (5 bytes): MCwCFP8=\n"));
        assert!(text.ends_with("Signed document:\n<java/>\n"));
    }
}
