//! Configuración de la aplicación desde variables de entorno (.env incluido).
//!
//! Se lee una sola vez al arrancar; los componentes reciben un `RunContext`
//! y nunca consultan el entorno por su cuenta.

use once_cell::sync::Lazy;
use dotenvy::dotenv;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use mri_adapters::{ArtifactNames, RunContext, StructureLabels, DEFAULT_TOOLKIT_ROOT};

pub const ENV_TOOLKIT_ROOT: &str = "FSLDIR";
pub const ENV_LEFT_LABEL: &str = "MRIFLOW_LEFT_HIPPOCAMPUS_LABEL";
pub const ENV_RIGHT_LABEL: &str = "MRIFLOW_RIGHT_HIPPOCAMPUS_LABEL";
pub const ENV_STAGE_TIMEOUT: &str = "MRIFLOW_STAGE_TIMEOUT_SECS";
pub const ENV_REPORT_FILE: &str = "MRIFLOW_REPORT_FILE";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub toolkit_root: PathBuf,
    pub labels: StructureLabels,
    /// `None` = sin límite.
    pub stage_timeout: Option<Duration>,
    pub report_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { toolkit_root: PathBuf::from(DEFAULT_TOOLKIT_ROOT),
               labels: StructureLabels::default(),
               stage_timeout: None,
               report_file: ArtifactNames::default().report }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de valores arbitraria.
    /// Valores vacíos cuentan como ausentes.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let toolkit_root = get(ENV_TOOLKIT_ROOT).map(PathBuf::from).unwrap_or(defaults.toolkit_root);
        let left = parse_u32(ENV_LEFT_LABEL, get(ENV_LEFT_LABEL))?.unwrap_or(defaults.labels.left);
        let right = parse_u32(ENV_RIGHT_LABEL, get(ENV_RIGHT_LABEL))?.unwrap_or(defaults.labels.right);
        let stage_timeout = parse_u64(ENV_STAGE_TIMEOUT, get(ENV_STAGE_TIMEOUT))?.filter(|s| *s > 0)
                                                                                 .map(Duration::from_secs);
        let report_file = match lookup(ENV_REPORT_FILE) {
            Some(v) if v.trim().is_empty() => return Err(ConfigError::Empty { var: ENV_REPORT_FILE }),
            Some(v) => v.trim().to_string(),
            None => defaults.report_file,
        };

        Ok(Self { toolkit_root,
                  labels: StructureLabels { left, right },
                  stage_timeout,
                  report_file })
    }

    pub fn run_context(&self, working_dir: &Path) -> RunContext {
        let names = ArtifactNames { report: self.report_file.clone(), ..ArtifactNames::default() };
        RunContext::new(working_dir).with_toolkit_root(&self.toolkit_root)
                                    .with_names(names)
                                    .with_labels(self.labels)
                                    .with_timeout(self.stage_timeout)
    }
}

fn parse_u32(var: &'static str, value: Option<String>) -> Result<Option<u32>, ConfigError> {
    value.map(|v| v.parse().map_err(|_| ConfigError::InvalidNumber { var, value: v })).transpose()
}

fn parse_u64(var: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    value.map(|v| v.parse().map_err(|_| ConfigError::InvalidNumber { var, value: v })).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.toolkit_root, PathBuf::from("/usr/local/fsl"));
        assert_eq!(cfg.labels, StructureLabels { left: 17, right: 53 });
        assert_eq!(cfg.stage_timeout, None);
        assert_eq!(cfg.report_file, "advanced_mri_report.txt");
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[("FSLDIR", "/opt/fsl"),
                                                  ("MRIFLOW_LEFT_HIPPOCAMPUS_LABEL", "10"),
                                                  ("MRIFLOW_RIGHT_HIPPOCAMPUS_LABEL", " 49 "),
                                                  ("MRIFLOW_STAGE_TIMEOUT_SECS", "600"),
                                                  ("MRIFLOW_REPORT_FILE", "out.txt")])).unwrap();
        assert_eq!(cfg.toolkit_root, PathBuf::from("/opt/fsl"));
        assert_eq!(cfg.labels, StructureLabels { left: 10, right: 49 });
        assert_eq!(cfg.stage_timeout, Some(Duration::from_secs(600)));
        assert_eq!(cfg.report_file, "out.txt");
    }

    #[test]
    fn zero_timeout_disables_limit() {
        let cfg = AppConfig::from_lookup(lookup(&[("MRIFLOW_STAGE_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(cfg.stage_timeout, None);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("MRIFLOW_LEFT_HIPPOCAMPUS_LABEL", "left")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidNumber { var: ENV_LEFT_LABEL, value: "left".into() });
        assert!(AppConfig::from_lookup(lookup(&[("MRIFLOW_STAGE_TIMEOUT_SECS", "-5")])).is_err());
    }

    #[test]
    fn blank_report_file_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("MRIFLOW_REPORT_FILE", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty { var: ENV_REPORT_FILE });
    }

    #[test]
    fn run_context_carries_configuration() {
        let cfg = AppConfig::from_lookup(lookup(&[("FSLDIR", "/opt/fsl"), ("MRIFLOW_REPORT_FILE", "r.txt")])).unwrap();
        let ctx = cfg.run_context(Path::new("/work"));
        assert_eq!(ctx.report_path(), PathBuf::from("/work/r.txt"));
        assert_eq!(ctx.template_path(), "/opt/fsl/data/standard/MNI152_T1_1mm_brain.nii.gz");
        assert_eq!(ctx.names.brain_extracted, "brain_extracted.nii.gz");
    }
}
