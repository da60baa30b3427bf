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
use eyre::{eyre, Result, WrapErr};
use log::{debug, info};
use tlc_base::{DsaKey, Timestamp};
use tlc_codec::{Certificate, LicenseCodec, LicenseData};

use crate::description::{describe_certificate, describe_license};
use crate::settings::License;

pub fn encode_file(conf: &License, terms_path: &str, out_path: &str) -> Result<()> {
    let license = read_terms(terms_path)?;
    let codec = LicenseCodec::new(password(conf)?, &signing_key(conf)?)
        .wrap_err("Cannot prepare license encoder")?;
    let blob = codec.encode(&license).wrap_err("Cannot encode license")?;
    let path = expand(out_path);
    std::fs::write(&path, &blob).wrap_err(format!("Cannot write license file '{}'", &path))?;
    info!("Wrote {}-byte license for '{}' to '{}'", blob.len(), license.subject, &path);
    Ok(())
}

pub fn decode_file(conf: &License, in_path: &str, json: bool) -> Result<()> {
    let license = read_license(conf, in_path)?;
    if json {
        let text = serde_json::to_string_pretty(&license)
            .wrap_err("Cannot serialize license terms")?;
        println!("{}", text);
    } else {
        print!("{}", describe_license(&license, Timestamp::now()));
    }
    Ok(())
}

pub fn inspect_file(conf: &License, in_path: &str) -> Result<()> {
    let certificate = read_certificate(conf, in_path)?;
    print!("{}", describe_certificate(&certificate));
    Ok(())
}

/// Read license terms from a JSON file.
pub fn read_terms(path: &str) -> Result<LicenseData> {
    let path = expand(path);
    let json = std::fs::read_to_string(&path)
        .wrap_err(format!("Cannot read license terms file '{}'", &path))?;
    serde_json::from_str(&json).wrap_err(format!("Invalid license terms in '{}'", &path))
}

pub fn read_license(conf: &License, path: &str) -> Result<LicenseData> {
    let blob = read_blob(path)?;
    decoder(conf)?.decode(&blob).wrap_err(format!("Cannot decode license file '{}'", path))
}

/// The verified certificate a license file holds.
pub fn read_certificate(conf: &License, path: &str) -> Result<Certificate> {
    let blob = read_blob(path)?;
    decoder(conf)?
        .decode_certificate(&blob)
        .wrap_err(format!("Cannot decode license file '{}'", path))
}

fn read_blob(path: &str) -> Result<Vec<u8>> {
    let path = expand(path);
    let blob = std::fs::read(&path).wrap_err(format!("Cannot read license file '{}'", &path))?;
    debug!("Read {} bytes from '{}'", blob.len(), &path);
    Ok(blob)
}

fn decoder(conf: &License) -> Result<LicenseCodec> {
    let codec = LicenseCodec::new(password(conf)?, &verifying_key(conf)?)
        .wrap_err("Cannot prepare license decoder")?;
    Ok(codec)
}

fn password(conf: &License) -> Result<&str> {
    if conf.password.is_empty() {
        Err(eyre!("No license password configured"))
    } else {
        Ok(&conf.password)
    }
}

fn signing_key(conf: &License) -> Result<DsaKey> {
    if conf.private_key_path.is_empty() {
        return Err(eyre!("No private key configured"));
    }
    let path = expand(&conf.private_key_path);
    let passphrase = match conf.key_password.as_str() {
        "" => None,
        pass => Some(pass),
    };
    let key = DsaKey::load_pem_file(&path, passphrase)?;
    if !key.is_private() {
        return Err(eyre!("Key file '{}' doesn't hold a private key", &path));
    }
    Ok(key)
}

/// The public key when one is configured, else the private key.
fn verifying_key(conf: &License) -> Result<DsaKey> {
    if !conf.public_key_path.is_empty() {
        DsaKey::load_pem_file(&expand(&conf.public_key_path), None)
    } else if !conf.private_key_path.is_empty() {
        signing_key(conf)
    } else {
        Err(eyre!("No public or private key configured"))
    }
}

fn expand(path: &str) -> String {
    shellexpand::tilde(path).into_owned()
}
