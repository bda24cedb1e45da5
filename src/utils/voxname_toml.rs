//! Load `voxname.toml` from the data root (CLI only). Library callers build a `ConverterConfig` directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::DataLayout;
use crate::{ConverterConfig, RecognizerBackend};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VoxnameToml {
    #[serde(default)]
    settings: SettingsSection,
    #[serde(default)]
    recognizer: RecognizerSection,
    #[serde(default)]
    normalizer: NormalizerSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    source_dir: Option<String>,
    target_dir: Option<String>,
    temp_dir: Option<String>,
    language: Option<String>,
    normalize: Option<bool>,
    normalize_window: Option<usize>,
    recognize_window: Option<usize>,
    channel_cap: Option<usize>,
    strict: Option<bool>,
    include_list: Option<String>,
    manifest: Option<String>,
    progress: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizerSection {
    /// `http` (default) or `echo`.
    backend: Option<String>,
    endpoint: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NormalizerSection {
    program: Option<String>,
    args: Option<Vec<String>>,
}

/// Load `voxname.toml` from `root` if present. Returns None if missing or unparsable (logged). CLI only.
pub(crate) fn load_voxname_toml(root: &Path) -> Option<VoxnameToml> {
    let path = root.join(DataLayout::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_voxname_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_voxname_toml(s: &str) -> Result<VoxnameToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite config field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $config:expr, $field:ident => $config_field:ident) => {
        if let Some(v) = $section.$field.clone() {
            $config.$config_field = v;
        }
    };
}

/// Apply file config on top of defaults (only fields present in the file). Relative
/// directories are resolved against `root`. Call before applying CLI flags.
pub(crate) fn apply_file_to_config(file: &VoxnameToml, root: &Path, config: &mut ConverterConfig) {
    let s = &file.settings;
    let under_root = |p: &String| -> PathBuf { root.join(p) };
    if let Some(ref p) = s.source_dir {
        config.source_dir = under_root(p);
    }
    if let Some(ref p) = s.target_dir {
        config.target_dir = under_root(p);
    }
    if let Some(ref p) = s.temp_dir {
        config.temp_dir = under_root(p);
    }
    if let Some(ref p) = s.include_list {
        config.include_list = Some(under_root(p));
    }
    if let Some(ref p) = s.manifest {
        config.manifest_path = Some(under_root(p));
    }
    apply_file_opt!(s, config, language => language);
    apply_file_opt!(s, config, normalize => normalize);
    apply_file_opt!(s, config, normalize_window => normalize_window);
    apply_file_opt!(s, config, recognize_window => recognize_window);
    apply_file_opt!(s, config, channel_cap => channel_cap);
    apply_file_opt!(s, config, strict => strict);
    apply_file_opt!(s, config, progress => progress);

    let n = &file.normalizer;
    apply_file_opt!(n, config, program => normalizer_program);
    apply_file_opt!(n, config, args => normalizer_args);

    let r = &file.recognizer;
    match r.backend.as_deref() {
        Some("echo") => config.recognizer = RecognizerBackend::Echo,
        Some("http") | None => {
            if let RecognizerBackend::Http { endpoint, api_key } = &mut config.recognizer {
                if let Some(ref e) = r.endpoint {
                    *endpoint = e.clone();
                }
                if r.api_key.is_some() {
                    *api_key = r.api_key.clone();
                }
            }
        }
        Some(other) => log::warn!("Unknown recognizer backend {:?} in config; keeping default", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_file_overrides_only_present_fields() {
        let file = parse_voxname_toml(
            r#"
            [settings]
            language = "en-US"
            recognize_window = 4
            normalize = false
            target_dir = "out"

            [recognizer]
            endpoint = "http://speech.local/v1"
            "#,
        )
        .unwrap();
        let root = Path::new("/data");
        let mut config = ConverterConfig::for_root(root);
        let normalize_window = config.normalize_window;
        apply_file_to_config(&file, root, &mut config);

        assert_eq!(config.language, "en-US");
        assert_eq!(config.recognize_window, 4);
        assert!(!config.normalize);
        assert_eq!(config.target_dir, PathBuf::from("/data/out"));
        assert_eq!(config.source_dir, PathBuf::from("/data/SPEECH"));
        assert_eq!(config.normalize_window, normalize_window);
        assert_eq!(
            config.recognizer,
            RecognizerBackend::Http {
                endpoint: "http://speech.local/v1".to_string(),
                api_key: None
            }
        );
    }

    #[test]
    fn test_echo_backend() {
        let file = parse_voxname_toml("[recognizer]\nbackend = \"echo\"\n").unwrap();
        let root = Path::new("/data");
        let mut config = ConverterConfig::for_root(root);
        apply_file_to_config(&file, root, &mut config);
        assert_eq!(config.recognizer, RecognizerBackend::Echo);
    }

    #[test]
    fn test_normalizer_section() {
        let file = parse_voxname_toml(
            "[normalizer]\nprogram = \"sox\"\nargs = [\"{input}\", \"-r\", \"16000\", \"{output}\"]\n",
        )
        .unwrap();
        let root = Path::new("/data");
        let mut config = ConverterConfig::for_root(root);
        apply_file_to_config(&file, root, &mut config);
        assert_eq!(config.normalizer_program, "sox");
        assert_eq!(config.normalizer_args.len(), 4);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(parse_voxname_toml("[settings\nlanguage = ").is_err());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_voxname_toml(dir.path()).is_none());
    }
}
