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
use eyre::{Result, WrapErr};

pub use key::DsaKey;
pub use timestamp::Timestamp;

mod key;
mod timestamp;

/// Standard padded base64 on a single line, the form signatures are
/// embedded in license certificates.
pub fn b64encode(bytes: &[u8]) -> String {
    base64::encode_config(bytes, base64::STANDARD)
}

/// Standard base64, tolerant of embedded whitespace.  Some producers
/// break their base64 into lines of 60 or 76 characters.
pub fn b64decode(s: &str) -> Result<Vec<u8>> {
    let compact: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::decode_config(&compact, base64::STANDARD).wrap_err("Illegal base64 data")
}

#[cfg(test)]
mod tests {
    use super::{b64decode, b64encode};

    #[test]
    fn test_b64_line_breaks() {
        let data: Vec<u8> = (0u8..=200).collect();
        let encoded = b64encode(&data);
        assert!(!encoded.contains('\n'));
        let broken = encoded
            .as_bytes()
            .chunks(60)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<&str>>()
            .join("\n");
        assert_eq!(b64decode(&broken).unwrap(), data);
        assert_eq!(b64decode(&format!("{}\n", encoded)).unwrap(), data);
    }

    #[test]
    fn test_b64_rejects_garbage() {
        assert!(b64decode("not*base64!").is_err());
    }
}
