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
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_CONFIG_FILE: &str = "tlc-conf.toml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ToolArgs {
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    /// Path to config file.
    pub config_file: String,

    #[arg(short, long, action = clap::ArgAction::Count)]
    /// Specify once to force log level to debug.
    /// Specify twice to force log level to trace.
    pub debug: u8,

    #[arg(short, long)]
    /// Override configured log destination: 'console' or 'file'.
    /// You can use just the first letter, so '-l c' and '-l f' work.
    pub log_to: Option<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Default, Clone)]
/// Overrides for the configured license password and key
pub struct KeyArgs {
    #[arg(short, long)]
    /// License password.  Overrides the config file setting.
    pub password: Option<String>,

    #[arg(short, long)]
    /// Path to a PEM key file.  Overrides the config file setting.
    pub key: Option<String>,
}

#[derive(Subcommand, Debug)]
/// License file commands
pub enum Command {
    /// Write a license file from license terms in JSON
    Encode {
        /// path to the JSON license terms
        terms: String,
        /// path of the license file to write
        output: String,
        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Describe the terms in a license file
    Decode {
        /// path to the license file
        input: String,
        #[arg(long)]
        /// Print the license terms as JSON.
        json: bool,
        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Show the signed certificate inside a license file
    Inspect {
        /// path to the license file
        input: String,
        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Write a template config file
    InitConfig {
        /// where to write it (defaults to the config file path)
        path: Option<String>,
        #[arg(short, long)]
        /// Replace an existing file
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Command, ToolArgs, DEFAULT_CONFIG_FILE};

    #[test]
    fn test_global_options() {
        let args = ToolArgs::try_parse_from(["tlc-tool", "-dd", "-l", "f", "decode", "a.lic"])
            .unwrap();
        assert_eq!(args.config_file, DEFAULT_CONFIG_FILE);
        assert_eq!(args.debug, 2);
        assert_eq!(args.log_to.as_deref(), Some("f"));
        match args.cmd {
            Command::Decode { input, json, keys } => {
                assert_eq!(input, "a.lic");
                assert!(!json);
                assert!(keys.password.is_none() && keys.key.is_none());
            }
            other => panic!("Parsed wrong command: {:?}", other),
        }
    }

    #[test]
    fn test_key_overrides() {
        let args = ToolArgs::try_parse_from([
            "tlc-tool", "-c", "other.toml", "encode", "terms.json", "out.lic", "-p", "secret",
            "--key", "signer.pem",
        ])
        .unwrap();
        assert_eq!(args.config_file, "other.toml");
        match args.cmd {
            Command::Encode { terms, output, keys } => {
                assert_eq!((terms.as_str(), output.as_str()), ("terms.json", "out.lic"));
                assert_eq!(keys.password.as_deref(), Some("secret"));
                assert_eq!(keys.key.as_deref(), Some("signer.pem"));
            }
            other => panic!("Parsed wrong command: {:?}", other),
        }
    }

    #[test]
    fn test_missing_arguments() {
        assert!(ToolArgs::try_parse_from(["tlc-tool", "encode", "terms.json"]).is_err());
        assert!(ToolArgs::try_parse_from(["tlc-tool"]).is_err());
    }
}
