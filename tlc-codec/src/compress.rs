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
use std::io::{Error, ErrorKind, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// The most a certificate may decompress to.  Real certificates are a
/// few kilobytes.
pub const MAX_DECOMPRESSED: u64 = 16 * 1024 * 1024;

pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Checks the gzip trailer, so damaged content is an error rather
/// than garbage.  Content larger than [`MAX_DECOMPRESSED`] is an error.
pub fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    gunzip_limited(data, MAX_DECOMPRESSED)
}

fn gunzip_limited(data: &[u8], limit: u64) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data).take(limit + 1);
    let mut result = Vec::new();
    decoder.read_to_end(&mut result)?;
    if result.len() as u64 > limit {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("decompressed content exceeds {} bytes", limit),
        ));
    }
    Ok(result)
}

pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}
