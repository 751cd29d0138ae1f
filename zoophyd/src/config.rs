// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

const APP_DIR_NAME: &str = "zoophy";
const CONFIG_FILE_NAME: &str = "zoophyd.toml";
const CONFIG_ENV_VAR: &str = "ZOOPHY_CONFIG_PATH";
const UPLOAD_DIR_NAME: &str = "uploads";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50_000;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_uri: Option<String>,
    port: Option<u16>,
    upload_dir: Option<String>,
    max_upload_bytes: Option<u64>,
    verbose: Option<bool>,
}

#[derive(Debug)]
pub struct Config {
    pub api_uri: Url,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Override,
    Env,
    ConfigFile,
    Default,
}

impl ConfigSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigSource::Override => "override",
            ConfigSource::Env => "env",
            ConfigSource::ConfigFile => "config",
            ConfigSource::Default => "default",
        }
    }
}

#[derive(Debug)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

#[derive(Debug)]
pub struct ConfigReport {
    pub config_path: Option<PathBuf>,
    pub config_path_source: Option<ConfigSource>,
    pub config_file_present: bool,
    pub api_uri: ConfigValue<Url>,
    pub port: ConfigValue<u16>,
    pub upload_dir: ConfigValue<PathBuf>,
    pub max_upload_bytes: ConfigValue<u64>,
    pub verbose: ConfigValue<bool>,
}

#[derive(Debug)]
pub struct LoadResult {
    pub config: Config,
    pub report: ConfigReport,
}

#[derive(Debug, Default)]
pub struct Overrides {
    pub api_uri: Option<String>,
    pub port: Option<u16>,
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<u64>,
    pub verbose: Option<bool>,
}

fn pick<T>(override_value: Option<T>, file_value: Option<T>) -> Option<(T, ConfigSource)> {
    match override_value {
        Some(value) => Some((value, ConfigSource::Override)),
        None => file_value.map(|value| (value, ConfigSource::ConfigFile)),
    }
}

pub fn load_with_report(
    config_path_override: Option<PathBuf>,
    overrides: Overrides,
) -> Result<LoadResult> {
    let (config_path, config_path_source, required) = match config_path_override {
        Some(path) => (Some(expand_path(path)), Some(ConfigSource::Override), true),
        None => match config_path_from_env()? {
            Some(path) => (Some(expand_path(path)), Some(ConfigSource::Env), true),
            None => match default_config_path().ok() {
                Some(path) => (Some(path), Some(ConfigSource::Default), false),
                None => (None, None, false),
            },
        },
    };
    let config_file_present = config_path
        .as_deref()
        .map(|path| path.exists())
        .unwrap_or(false);

    let file_config = match config_path.as_deref() {
        Some(path) => read_config_file(path, required)?,
        None => FileConfig::default(),
    };

    let (raw_api_uri, api_uri_source) = pick(overrides.api_uri, file_config.api_uri)
        .context("api_uri is required; pass --api-uri or set api_uri in the config file")?;
    let api_uri = parse_api_uri(&raw_api_uri)?;

    let (upload_dir, upload_dir_source) = match overrides.upload_dir {
        Some(path) => (expand_path(path), ConfigSource::Override),
        None => match file_config.upload_dir {
            Some(raw) => (
                resolve_path(
                    &raw,
                    config_path.as_deref().and_then(|path| path.parent()),
                ),
                ConfigSource::ConfigFile,
            ),
            None => (
                default_upload_dir().with_context(|| {
                    "failed to resolve default upload directory; specify --upload-dir or set upload_dir in the config file"
                })?,
                ConfigSource::Default,
            ),
        },
    };

    let (port, port_source) =
        pick(overrides.port, file_config.port).unwrap_or((DEFAULT_PORT, ConfigSource::Default));
    if port == 0 {
        anyhow::bail!("port must be between 1 and 65535");
    }
    let (max_upload_bytes, max_upload_bytes_source) =
        pick(overrides.max_upload_bytes, file_config.max_upload_bytes)
            .unwrap_or((DEFAULT_MAX_UPLOAD_BYTES, ConfigSource::Default));
    if max_upload_bytes == 0 {
        anyhow::bail!("max_upload_bytes must be greater than zero");
    }
    let (verbose, verbose_source) =
        pick(overrides.verbose, file_config.verbose).unwrap_or((false, ConfigSource::Default));

    let config = Config {
        api_uri,
        port,
        upload_dir,
        max_upload_bytes,
        verbose,
    };

    let report = ConfigReport {
        config_path,
        config_path_source,
        config_file_present,
        api_uri: ConfigValue {
            value: config.api_uri.clone(),
            source: api_uri_source,
        },
        port: ConfigValue {
            value: config.port,
            source: port_source,
        },
        upload_dir: ConfigValue {
            value: config.upload_dir.clone(),
            source: upload_dir_source,
        },
        max_upload_bytes: ConfigValue {
            value: config.max_upload_bytes,
            source: max_upload_bytes_source,
        },
        verbose: ConfigValue {
            value: config.verbose,
            source: verbose_source,
        },
    };

    Ok(LoadResult { config, report })
}

pub fn ensure_upload_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create upload directory {}", path.display()))
}

fn parse_api_uri(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid api_uri {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("api_uri must use http or https, got {:?}", url.scheme());
    }
    Ok(url)
}

fn read_config_file(path: &Path, required: bool) -> Result<FileConfig> {
    if !path.exists() {
        if required {
            anyhow::bail!("config file not found at {}", path.display());
        }
        return Ok(FileConfig::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn resolve_path(raw: &str, base_dir: Option<&Path>) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        return path;
    }
    match base_dir {
        Some(dir) => dir.join(path),
        None => path,
    }
}

fn expand_path(path: PathBuf) -> PathBuf {
    let path_string = path.to_string_lossy().to_string();
    let expanded = shellexpand::tilde(&path_string);
    PathBuf::from(expanded.as_ref())
}

fn config_path_from_env() -> Result<Option<PathBuf>> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(value) => {
            if value.is_empty() {
                anyhow::bail!("{CONFIG_ENV_VAR} is set but empty");
            }
            Ok(Some(PathBuf::from(value)))
        }
        None => Ok(None),
    }
}

fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("failed to resolve config directory")?;
    Ok(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn default_upload_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("failed to resolve data directory")?;
    Ok(base.join(APP_DIR_NAME).join(UPLOAD_DIR_NAME))
}
