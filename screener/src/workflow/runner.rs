use crate::ephemeris::{CatalogFile, KeplerEphemeris};
use crate::generator::build_catalog;
use crate::workflow::config::{CatalogSource, WorkflowConfig};
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use conjcore::catalog::Catalog;
use conjcore::screening::{CancelToken, ScanReport, Screener};
use log::{info, warn};

pub struct WorkflowResult {
    pub report: ScanReport,
    pub target_id: u32,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Reads the element file or synthesizes a scenario around `start`.
    pub fn load_catalog(&self, start: DateTime<Utc>) -> anyhow::Result<CatalogFile> {
        let file = match &self.config.catalog {
            CatalogSource::File(path) => CatalogFile::load(path)?,
            CatalogSource::Generated(scenario) => build_catalog(scenario, start),
        };
        info!("catalog holds {} element records", file.objects.len());
        Ok(file)
    }

    /// Explicit id wins; otherwise the first case-insensitive name match.
    pub fn resolve_target(&self, catalog: &Catalog) -> anyhow::Result<u32> {
        if let Some(id) = self.config.target {
            return Ok(id);
        }
        match &self.config.target_name {
            Some(name) => match catalog.find_by_name(name) {
                Some(object) => {
                    info!("found target: {} (#{})", object.name, object.catalog_id);
                    Ok(object.catalog_id)
                }
                None => bail!("could not find an object matching '{}'", name),
            },
            None => match &self.config.catalog {
                CatalogSource::Generated(scenario) => Ok(scenario.target_id),
                CatalogSource::File(_) => bail!("no target given, use --target or --target-name"),
            },
        }
    }

    pub fn execute(
        &self,
        file: &CatalogFile,
        start: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> anyhow::Result<WorkflowResult> {
        let catalog = file.catalog();
        let target_id = self.resolve_target(&catalog)?;

        let ephemeris = KeplerEphemeris::from_records(&file.objects);
        let unusable = ephemeris.unusable();
        if unusable > 0 {
            warn!(
                "{} of {} element records cannot be propagated",
                unusable,
                ephemeris.object_count()
            );
        }

        let screener = Screener::new(
            self.config.to_screening_config(),
            ephemeris,
            self.config.minimizer,
        );
        let report = screener
            .scan(&catalog, target_id, start, cancel)
            .with_context(|| format!("screening target {}", target_id))?;

        Ok(WorkflowResult { report, target_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::elements::ElementRecord;
    use crate::generator::ScenarioConfig;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use conjcore::catalog::AlertLevel;
    use conjcore::prelude::ScreeningConfig;

    const A_KM: f64 = 6778.0;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn record(catalog_id: u32, name: &str, raan_deg: f64, mean_anomaly_deg: f64) -> ElementRecord {
        ElementRecord {
            catalog_id,
            name: name.into(),
            epoch: "2024-01-01T00:00:00Z".into(),
            semi_major_axis_km: A_KM,
            eccentricity: 0.0,
            inclination_deg: 51.6,
            raan_deg,
            arg_perigee_deg: 0.0,
            mean_anomaly_deg,
        }
    }

    /// A leader/follower pair on the same circular orbit plus one far object.
    fn formation() -> CatalogFile {
        CatalogFile {
            objects: vec![
                record(100, "LEADER", 0.0, 0.0),
                record(200, "FOLLOWER", 0.0, 0.05),
                record(300, "POLAR DEBRIS", 90.0, 180.0),
            ],
        }
    }

    fn runner(target: Option<u32>, target_name: Option<&str>) -> Runner {
        Runner::new(WorkflowConfig::from_args(
            CatalogSource::File("unused.yaml".into()),
            target,
            target_name.map(str::to_string),
            ScreeningConfig {
                hours: 4.0,
                ..Default::default()
            },
        ))
    }

    #[test]
    fn runner_finds_formation_companion() {
        let result = runner(Some(100), None)
            .execute(&formation(), start(), &CancelToken::new())
            .unwrap();

        let expected = 2.0 * A_KM * (0.025f64).to_radians().sin();
        let report = result.report;
        assert!(!report.approaches.is_empty());
        for approach in &report.approaches {
            assert_eq!(approach.other().catalog_id, 200);
            assert_eq!(approach.alert_level(), AlertLevel::Red);
            assert_relative_eq!(approach.distance_km(), expected, max_relative = 1e-6);
        }
        assert_eq!(report.statistics.objects_screened, 2);
    }

    #[test]
    fn target_is_resolved_by_name() {
        let catalog = formation().catalog();
        assert_eq!(runner(None, Some("follow")).resolve_target(&catalog).unwrap(), 200);
        assert_eq!(runner(Some(300), Some("follow")).resolve_target(&catalog).unwrap(), 300);
        assert!(runner(None, Some("hubble")).resolve_target(&catalog).is_err());
        assert!(runner(None, None).resolve_target(&catalog).is_err());
    }

    #[test]
    fn unknown_target_id_fails_the_run() {
        let err = runner(Some(999), None)
            .execute(&formation(), start(), &CancelToken::new())
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("999"));
    }

    #[test]
    fn generated_scenario_defaults_to_its_target() {
        let scenario = ScenarioConfig {
            neighbours: 2,
            background: 2,
            stale: 1,
            ..Default::default()
        };
        let runner = Runner::new(WorkflowConfig {
            catalog: CatalogSource::Generated(scenario),
            screening: ScreeningConfig {
                hours: 2.0,
                ..Default::default()
            },
            ..Default::default()
        });

        let file = runner.load_catalog(start()).unwrap();
        let result = runner.execute(&file, start(), &CancelToken::new()).unwrap();
        assert_eq!(result.target_id, 25544);
        assert_eq!(result.report.statistics.epoch_stale, 1);
        // The docked companion never shows up as an approach.
        assert!(result
            .report
            .approaches
            .iter()
            .all(|approach| approach.distance_km() >= 0.1));
    }
}
