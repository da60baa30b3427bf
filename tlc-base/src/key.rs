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
use log::debug;
use openssl::error::ErrorStack;
use openssl::pkey::{Id, PKey, Private, Public};

/// DSA key material used to sign or verify license certificates.
/// Signing needs the private key; verification only ever uses the
/// public component, which can always be derived from a private key.
#[derive(Clone)]
pub struct DsaKey {
    material: KeyMaterial,
}

#[derive(Clone)]
enum KeyMaterial {
    Private(PKey<Private>),
    Public(PKey<Public>),
}

impl std::fmt::Debug for DsaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DsaKey")
            .field("private", &self.is_private())
            .field("bits", &self.bits())
            .finish()
    }
}

impl DsaKey {
    pub fn from_private(key: PKey<Private>) -> Result<Self> {
        if key.id() != Id::DSA {
            return Err(eyre!("Not a DSA private key"));
        }
        Ok(Self { material: KeyMaterial::Private(key) })
    }

    pub fn from_public(key: PKey<Public>) -> Result<Self> {
        if key.id() != Id::DSA {
            return Err(eyre!("Not a DSA public key"));
        }
        Ok(Self { material: KeyMaterial::Public(key) })
    }

    /// Accepts a private key (PKCS#8 or traditional) or, failing that,
    /// a SubjectPublicKeyInfo public key.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        if let Ok(key) = PKey::private_key_from_pem(pem) {
            Self::from_private(key)
        } else {
            let key = PKey::public_key_from_pem(pem)
                .wrap_err("Can't read key data as a private or public key")?;
            Self::from_public(key)
        }
    }

    pub fn load_pem_file(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let key_data =
            std::fs::read(path).wrap_err(format!("Can't load key file '{}'", path))?;
        let key = if let Some(pass) = passphrase {
            let key = PKey::private_key_from_pem_passphrase(&key_data, pass.as_bytes())
                .wrap_err("Can't decrypt key data using password")?;
            Self::from_private(key)?
        } else {
            Self::from_pem(&key_data).wrap_err(format!("Can't use key file '{}'", path))?
        };
        debug!(
            "Loaded {}-bit DSA {} key from '{}'",
            key.bits(),
            if key.is_private() { "private" } else { "public" },
            path
        );
        Ok(key)
    }

    pub fn is_private(&self) -> bool {
        matches!(self.material, KeyMaterial::Private(_))
    }

    pub fn bits(&self) -> u32 {
        match &self.material {
            KeyMaterial::Private(key) => key.bits(),
            KeyMaterial::Public(key) => key.bits(),
        }
    }

    pub fn private_key(&self) -> Option<&PKey<Private>> {
        match &self.material {
            KeyMaterial::Private(key) => Some(key),
            KeyMaterial::Public(_) => None,
        }
    }

    /// The public component, derived from the private key if necessary.
    pub fn public_key(&self) -> Result<PKey<Public>, ErrorStack> {
        match &self.material {
            KeyMaterial::Private(key) => PKey::public_key_from_der(&key.public_key_to_der()?),
            KeyMaterial::Public(key) => Ok(key.clone()),
        }
    }

    pub fn to_public(&self) -> Result<Self> {
        let key = self.public_key().wrap_err("Can't get public key from private key")?;
        Self::from_public(key)
    }

    pub fn public_key_pem(&self) -> Result<Vec<u8>> {
        let key = self.public_key().wrap_err("Can't get public key from private key")?;
        key.public_key_to_pem().wrap_err("Can't encode public key in PEM format")
    }
}
