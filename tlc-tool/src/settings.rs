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
use std::convert::{TryFrom, TryInto};
use std::fmt::{Debug, Formatter};
use std::path::Path;

use config::{Config, Environment, File as ConfigFile, FileFormat};
use eyre::{eyre, Report, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::cli::{Command, ToolArgs, DEFAULT_CONFIG_FILE};

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct License {
    pub password: String,
    pub private_key_path: String,
    pub public_key_path: String,
    pub key_password: String,
}

impl Debug for License {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("License")
            .field("password", &"[OBSCURED]")
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .field("key_password", &"[OBSCURED]")
            .finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Logging {
    pub level: LogLevel,
    pub destination: LogDestination,
    pub file_path: String,
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: LogLevel::Warn,
            destination: LogDestination::Console,
            file_path: "tlc-tool.log".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    pub license: License,
    pub logging: Logging,
}

impl Settings {
    /// Load settings: defaults, then the config file, then the environment,
    /// then the command line.
    pub fn load_config(args: &ToolArgs) -> Result<Self> {
        let default_str = toml::to_string(&Settings::default())
            .wrap_err("Cannot serialize default configuration")?;
        let path = shellexpand::tilde(&args.config_file).into_owned();
        // only the default config file is allowed to be missing
        let required = args.config_file != DEFAULT_CONFIG_FILE;
        let builder = Config::builder()
            .add_source(ConfigFile::from_str(&default_str, FileFormat::Toml))
            .add_source(ConfigFile::new(&path, FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix("tlc_tool").prefix_separator("_").separator("__"),
            );
        let mut settings: Self = builder
            .build()
            .wrap_err(format!("Cannot read config file '{}'", &path))?
            .try_deserialize()
            .wrap_err(format!("Invalid configuration in '{}'", &path))?;
        settings.apply_args(args)?;
        Ok(settings)
    }

    fn apply_args(&mut self, args: &ToolArgs) -> Result<()> {
        match args.debug {
            0 => {}
            1 => self.logging.level = LogLevel::Debug,
            _ => self.logging.level = LogLevel::Trace,
        }
        if let Some(log_to) = &args.log_to {
            self.logging.destination = log_to
                .as_str()
                .try_into()
                .wrap_err(format!("Not a recognized log destination: {}", log_to))?;
        }
        match &args.cmd {
            Command::Encode { keys, .. } => {
                if let Some(password) = &keys.password {
                    self.license.password = password.clone();
                }
                if let Some(key) = &keys.key {
                    self.license.private_key_path = key.clone();
                }
            }
            Command::Decode { keys, .. } | Command::Inspect { keys, .. } => {
                if let Some(password) = &keys.password {
                    self.license.password = password.clone();
                }
                if let Some(key) = &keys.key {
                    self.license.public_key_path = key.clone();
                }
            }
            Command::InitConfig { .. } => {}
        }
        Ok(())
    }
}

/// Write a template config file holding the default settings.
/// No logging on this path, because logging isn't configured yet.
pub fn write_config_template(path: &str, force: bool) -> Result<()> {
    let path = shellexpand::tilde(path).into_owned();
    if !force && Path::new(&path).exists() {
        return Err(eyre!("Config file '{}' exists; use --force to replace it", &path));
    }
    let toml = toml::to_string(&Settings::default())
        .wrap_err("Cannot serialize default configuration")?;
    std::fs::write(&path, toml).wrap_err(format!("Cannot write config file: {}", &path))?;
    eprintln!("Wrote config file '{}'", &path);
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogDestination {
    #[serde(alias = "c")]
    Console,
    #[serde(alias = "f")]
    File,
}

impl Default for LogDestination {
    fn default() -> Self {
        LogDestination::Console
    }
}

impl TryFrom<&str> for LogDestination {
    type Error = Report;

    fn try_from(s: &str) -> Result<Self> {
        let sl = s.to_ascii_lowercase();
        if sl.is_empty() {
            Err(eyre!("log destination must not be empty"))
        } else if "console".starts_with(&sl) {
            Ok(LogDestination::Console)
        } else if "file".starts_with(&sl) {
            Ok(LogDestination::File)
        } else {
            Err(eyre!("log destination '{}' must be a prefix of console or file", s))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Warn
    }
}

impl TryFrom<String> for LogLevel {
    type Error = Report;

    fn try_from(s: String) -> Result<Self> {
        s.as_str().try_into()
    }
}

impl TryFrom<&str> for LogLevel {
    type Error = Report;

    fn try_from(s: &str) -> Result<Self> {
        let sl = s.to_ascii_lowercase();
        if sl.is_empty() {
            Err(eyre!("log level must not be empty"))
        } else if "off".starts_with(&sl) {
            Ok(LogLevel::Off)
        } else if "error".starts_with(&sl) {
            Ok(LogLevel::Error)
        } else if "warn".starts_with(&sl) {
            Ok(LogLevel::Warn)
        } else if "info".starts_with(&sl) {
            Ok(LogLevel::Info)
        } else if "debug".starts_with(&sl) {
            Ok(LogLevel::Debug)
        } else if "trace".starts_with(&sl) {
            Ok(LogLevel::Trace)
        } else {
            Err(eyre!(
                "Log level '{}' must be a prefix of off, error, warn, info, debug, or trace",
                s
            ))
        }
    }
}
