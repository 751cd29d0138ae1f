// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "zoophyd",
    version,
    about,
    long_about = None,
    after_help = "zoophyd server\n\
\n\
Configuration precedence: defaults < config file < command-line flags.\n\
Config path precedence: defaults < ZOOPHY_CONFIG_PATH < command-line flags.\n\
If --config is omitted, zoophyd tries ZOOPHY_CONFIG_PATH, then the default config file location; missing default config is OK.\n\
Paths in the config file are resolved relative to the config file directory; paths passed as flags are resolved relative to the current working directory."
)]
pub struct Opts {
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Path to a TOML config file. When omitted, zoophyd uses ZOOPHY_CONFIG_PATH if set, otherwise the default config file location if available."
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        value_name = "URL",
        help = "Base URL of the ZooPhy compute API. Overrides `api_uri` from the config file."
    )]
    pub api_uri: Option<String>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Directory where predictor uploads are staged. Overrides `upload_dir` from the config file."
    )]
    pub upload_dir: Option<PathBuf>,
    #[arg(
        long,
        value_name = "BYTES",
        help = "Largest accepted predictor upload. Overrides `max_upload_bytes` from the config file."
    )]
    pub max_upload_bytes: Option<u64>,
    #[arg(
        short,
        long,
        action = clap::ArgAction::SetTrue,
        help = "Enable debug logging and include logs from dependencies. Overrides `verbose` from the config file."
    )]
    pub verbose: bool,
    #[arg(
        long,
        value_name = "PORT",
        help = "Port to bind the HTTP server on. Overrides `port` from the config file."
    )]
    pub port: Option<u16>,
}

pub struct ParsedOpts {
    pub opts: Opts,
    pub verbose_override: Option<bool>,
}

pub fn parse_opts() -> ParsedOpts {
    parse_from(std::env::args_os())
}

fn parse_from<I, T>(args: I) -> ParsedOpts
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = Opts::command().get_matches_from(args);
    let verbose_override = matches.get_flag("verbose").then_some(true);
    let opts = Opts::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    ParsedOpts {
        opts,
        verbose_override,
    }
}
