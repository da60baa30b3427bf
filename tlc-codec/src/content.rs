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
use serde::{Deserialize, Deserializer, Serialize};
use tlc_base::Timestamp;

use crate::document::{self, Record, Tag, Value};
use crate::error::{CodecError, Result};

pub const LICENSE_CONTENT_CLASS: &str = "de.schlichtherle.license.LicenseContent";

/// An X.500 distinguished name.  Principals are encoded with their own
/// type tag, so they never travel as plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Principal {
    name: String,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<String> for Principal {
    fn from(name: String) -> Self {
        Self { name }
    }
}

impl From<&str> for Principal {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.name
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name.fmt(f)
    }
}

/// The terms of a license.
///
/// The validity window and the extra data are optional: producers
/// leave unset properties out of the document entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseData {
    #[serde(deserialize_with = "coerce_to_string")]
    pub consumer_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    pub subject: String,
    pub holder: Principal,
    pub issued: Timestamp,
    pub issuer: Principal,
}

// consumer types are sometimes written as numbers
fn coerce_to_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
    }
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Flag(b) => b.to_string(),
    })
}

struct Field {
    name: &'static str,
    tag: Tag,
    required: bool,
    get: fn(&LicenseData) -> Option<Value>,
    set: fn(&mut LicenseData, Value) -> bool,
}

const FIELD_COUNT: usize = 8;

/// License content properties in the order bean introspection lists them.
static FIELDS: [Field; FIELD_COUNT] = [
    Field {
        name: "consumerType",
        tag: Tag::String,
        required: true,
        get: |l| Some(Value::String(l.consumer_type.clone())),
        set: |l, v| set_string(&mut l.consumer_type, v),
    },
    Field {
        name: "extra",
        tag: Tag::String,
        required: false,
        get: |l| l.extra.clone().map(Value::String),
        set: |l, v| set_optional(&mut l.extra, v, set_string),
    },
    Field {
        name: "holder",
        tag: Tag::Principal,
        required: true,
        get: |l| Some(Value::Principal(l.holder.name.clone())),
        set: |l, v| set_principal(&mut l.holder, v),
    },
    Field {
        name: "issued",
        tag: Tag::Timestamp,
        required: true,
        get: |l| Some(Value::Timestamp(l.issued)),
        set: |l, v| set_timestamp(&mut l.issued, v),
    },
    Field {
        name: "issuer",
        tag: Tag::Principal,
        required: true,
        get: |l| Some(Value::Principal(l.issuer.name.clone())),
        set: |l, v| set_principal(&mut l.issuer, v),
    },
    Field {
        name: "notAfter",
        tag: Tag::Timestamp,
        required: false,
        get: |l| l.not_after.map(Value::Timestamp),
        set: |l, v| set_optional(&mut l.not_after, v, set_timestamp),
    },
    Field {
        name: "notBefore",
        tag: Tag::Timestamp,
        required: false,
        get: |l| l.not_before.map(Value::Timestamp),
        set: |l, v| set_optional(&mut l.not_before, v, set_timestamp),
    },
    Field {
        name: "subject",
        tag: Tag::String,
        required: true,
        get: |l| Some(Value::String(l.subject.clone())),
        set: |l, v| set_string(&mut l.subject, v),
    },
];

fn set_string(slot: &mut String, value: Value) -> bool {
    if let Value::String(s) = value {
        *slot = s;
        true
    } else {
        false
    }
}

fn set_timestamp(slot: &mut Timestamp, value: Value) -> bool {
    if let Value::Timestamp(ts) = value {
        *slot = ts;
        true
    } else {
        false
    }
}

fn set_optional<T: Default>(
    slot: &mut Option<T>,
    value: Value,
    set: fn(&mut T, Value) -> bool,
) -> bool {
    let mut inner = T::default();
    if set(&mut inner, value) {
        *slot = Some(inner);
        true
    } else {
        false
    }
}

fn set_principal(slot: &mut Principal, value: Value) -> bool {
    if let Value::Principal(name) = value {
        *slot = Principal::from(name);
        true
    } else {
        false
    }
}

impl LicenseData {
    /// Consumer types are always strings on the wire, whatever the
    /// caller thinks of them as.
    pub fn set_consumer_type(&mut self, consumer_type: impl std::fmt::Display) {
        self.consumer_type = consumer_type.to_string();
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new(LICENSE_CONTENT_CLASS);
        for field in FIELDS.iter() {
            if let Some(value) = (field.get)(self) {
                record.push(field.name, value);
            }
        }
        record
    }

    pub fn from_record(record: Record) -> Result<Self> {
        if record.class != LICENSE_CONTENT_CLASS {
            return Err(CodecError::InvalidLicense(format!(
                "license content has unexpected class {}",
                record.class
            )));
        }
        let mut license = LicenseData::default();
        let mut seen = [false; FIELD_COUNT];
        for (name, value) in record.properties {
            let Some(index) = FIELDS.iter().position(|field| field.name == name) else {
                debug!("Ignoring unknown license property '{}'", name);
                continue;
            };
            let field = &FIELDS[index];
            if seen[index] {
                return Err(CodecError::InvalidLicense(format!(
                    "license property {} appears more than once",
                    name
                )));
            }
            let found = value.tag();
            if !(field.set)(&mut license, value) {
                return Err(CodecError::InvalidLicense(format!(
                    "license property {} should be a {} but is a {}",
                    name, field.tag, found
                )));
            }
            seen[index] = true;
        }
        if let Some((field, _)) =
            FIELDS.iter().zip(seen.iter()).find(|(field, present)| field.required && !**present)
        {
            return Err(CodecError::InvalidLicense(format!(
                "license property {} is missing",
                field.name
            )));
        }
        Ok(license)
    }

    /// The inner license document.
    pub fn to_xml(&self) -> String {
        document::to_xml(&Value::Record(self.to_record()))
    }

    pub fn from_xml(text: &str) -> Result<Self> {
        match document::from_xml(text)? {
            Value::Record(record) => Self::from_record(record),
            other => Err(CodecError::InvalidLicense(format!(
                "license content is a {} rather than an object",
                other.tag()
            ))),
        }
    }
}
