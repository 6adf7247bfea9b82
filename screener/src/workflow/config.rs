use crate::generator::ScenarioConfig;
use anyhow::Context;
use conjcore::math::MinimizerKind;
use conjcore::prelude::ScreeningConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT: &str = "data/collision_warnings.csv";

/// Where the catalog comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    File(PathBuf),
    Generated(ScenarioConfig),
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource::Generated(ScenarioConfig::default())
    }
}

/// One screening run as described on the command line or in YAML.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub catalog: CatalogSource,
    pub target: Option<u32>,
    pub target_name: Option<String>,
    pub minimizer: MinimizerKind,
    pub screening: ScreeningConfig,
    pub output: PathBuf,
    pub json_output: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogSource::default(),
            target: None,
            target_name: None,
            minimizer: MinimizerKind::default(),
            screening: ScreeningConfig::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            json_output: None,
            timeout_secs: None,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .screening
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        catalog: CatalogSource,
        target: Option<u32>,
        target_name: Option<String>,
        screening: ScreeningConfig,
    ) -> Self {
        Self {
            catalog,
            target,
            target_name,
            screening,
            ..Default::default()
        }
    }

    pub fn to_screening_config(&self) -> ScreeningConfig {
        self.screening.clone()
    }
}
