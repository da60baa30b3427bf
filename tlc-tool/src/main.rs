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
use clap::Parser;
use eyre::{Result, WrapErr};
use log::debug;

use cli::{Command, ToolArgs};
use settings::Settings;

mod cli;
mod commands;
mod description;
mod logging;
mod settings;

fn main() {
    let args = ToolArgs::parse();
    if let Err(err) = run(&args) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(args: &ToolArgs) -> Result<()> {
    if let Command::InitConfig { path, force } = &args.cmd {
        // no logging on this path, because there may not be a config yet
        let path = path.as_deref().unwrap_or(&args.config_file);
        return settings::write_config_template(path, *force);
    }
    let settings = Settings::load_config(args)?;
    logging::init(&settings)?;
    debug!("Loaded config: {:?}", &settings);
    let conf = &settings.license;
    match &args.cmd {
        Command::Encode { terms, output, .. } => commands::encode_file(conf, terms, output)
            .wrap_err(format!("Failed to write license file '{}'", output)),
        Command::Decode { input, json, .. } => commands::decode_file(conf, input, *json),
        Command::Inspect { input, .. } => commands::inspect_file(conf, input),
        Command::InitConfig { .. } => Ok(()),
    }
}
