//! CLI command handler: layer defaults, voxname.toml and flags, then run the converter.

use anyhow::Result;
use log::warn;

use crate::engine::arg_parser::Cli;
use crate::utils::{Defaults, setup_logging};
use crate::utils::voxname_toml::{apply_file_to_config, load_voxname_toml};
use crate::{ConverterConfig, RecognizerBackend, RunSummary};

/// Overwrite config field from CLI when present.
macro_rules! apply_cli_opt {
    ($cli:expr, $config:expr, $field:ident => $config_field:ident) => {
        if let Some(v) = $cli.$field.clone() {
            $config.$config_field = v;
        }
    };
}

/// Defaults → `voxname.toml` in the data root → CLI flags.
pub fn build_config(cli: &Cli) -> ConverterConfig {
    let mut config = ConverterConfig::for_root(&cli.dir);
    if let Some(file) = load_voxname_toml(&cli.dir) {
        apply_file_to_config(&file, &cli.dir, &mut config);
    }

    apply_cli_opt!(cli, config, language => language);
    apply_cli_opt!(cli, config, normalize => normalize);
    apply_cli_opt!(cli, config, normalize_window => normalize_window);
    apply_cli_opt!(cli, config, recognize_window => recognize_window);
    apply_cli_opt!(cli, config, channel_cap => channel_cap);
    apply_cli_opt!(cli, config, source => source_dir);
    apply_cli_opt!(cli, config, target => target_dir);
    apply_cli_opt!(cli, config, temp => temp_dir);
    apply_cli_opt!(cli, config, normalizer => normalizer_program);
    apply_cli_opt!(cli, config, strict => strict);
    apply_cli_opt!(cli, config, progress => progress);
    if cli.include.is_some() {
        config.include_list = cli.include.clone();
    }
    if let Some(path) = cli.manifest_path() {
        config.manifest_path = Some(path);
    }

    if cli.echo.unwrap_or(false) {
        config.recognizer = RecognizerBackend::Echo;
    } else if cli.endpoint.is_some() || cli.api_key.is_some() {
        let (mut endpoint, mut api_key) = match &config.recognizer {
            RecognizerBackend::Http { endpoint, api_key } => (endpoint.clone(), api_key.clone()),
            RecognizerBackend::Echo => (Defaults::ENDPOINT.to_string(), None),
        };
        if let Some(e) = &cli.endpoint {
            endpoint = e.clone();
        }
        if cli.api_key.is_some() {
            api_key = cli.api_key.clone();
        }
        config.recognizer = RecognizerBackend::Http { endpoint, api_key };
    }
    config
}

/// Run one conversion batch. Blocks until every file is handled or a fatal error occurs.
pub fn handle_run(cli: &Cli) -> Result<RunSummary> {
    setup_logging(cli.verbose.unwrap_or(false));
    let config = build_config(cli);
    if config.recognizer == RecognizerBackend::Echo {
        warn!("Echo recognizer selected: files are labelled with their own names.");
    }

    crate::convert(config)
}
