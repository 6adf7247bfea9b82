use crate::ephemeris::elements::{CatalogFile, ElementRecord};
use crate::ephemeris::kepler::EARTH_RADIUS_KM;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Shape of a synthetic screening scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub target_id: u32,
    pub target_name: String,
    pub altitude_km: f64,
    pub inclination_deg: f64,
    /// Objects on nearly the same orbit as the target, phased to cross it.
    pub neighbours: usize,
    /// Objects on unrelated orbits.
    pub background: usize,
    /// Neighbours whose epoch is older than the freshness limit.
    pub stale: usize,
    /// Adds a companion parked a few tens of metres from the target.
    pub docked_companion: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            target_id: 25544,
            target_name: "TARGET-SAT".into(),
            altitude_km: 420.0,
            inclination_deg: 51.6,
            neighbours: 12,
            background: 40,
            stale: 3,
            docked_companion: true,
        }
    }
}

const FIRST_GENERATED_ID: u32 = 90_000;

fn format_epoch(epoch: DateTime<Utc>) -> String {
    epoch.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds an element catalog around `reference`, which becomes the freshest
/// epoch in the scenario.
pub fn build_catalog(config: &ScenarioConfig, reference: DateTime<Utc>) -> CatalogFile {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let target_a = EARTH_RADIUS_KM + config.altitude_km;
    let target_epoch = format_epoch(reference);
    let mut objects = Vec::with_capacity(2 + config.neighbours + config.background + config.stale);
    let mut next_id = FIRST_GENERATED_ID;
    let mut allocate = || {
        next_id += 1;
        next_id
    };

    objects.push(ElementRecord {
        catalog_id: config.target_id,
        name: config.target_name.clone(),
        epoch: target_epoch,
        semi_major_axis_km: target_a,
        eccentricity: 0.0005,
        inclination_deg: config.inclination_deg,
        raan_deg: 0.0,
        arg_perigee_deg: 0.0,
        mean_anomaly_deg: 0.0,
    });

    if config.docked_companion {
        // ~50 m along-track at this altitude.
        let offset_deg = (0.05 / target_a).to_degrees();
        let companion = ElementRecord {
            catalog_id: allocate(),
            name: format!("{} MODULE", config.target_name),
            mean_anomaly_deg: offset_deg,
            ..objects[0].clone()
        };
        objects.push(companion);
    }

    for index in 0..config.neighbours + config.stale {
        let stale = index >= config.neighbours;
        let age = if stale {
            Duration::hours(rng.gen_range(30..96))
        } else {
            Duration::minutes(rng.gen_range(0..360))
        };
        objects.push(ElementRecord {
            catalog_id: allocate(),
            name: format!("{}-{:03}", if stale { "STALE" } else { "NEIGHBOUR" }, index + 1),
            epoch: format_epoch(reference - age),
            semi_major_axis_km: target_a + rng.gen_range(-15.0..15.0),
            eccentricity: rng.gen_range(0.0..0.002),
            inclination_deg: config.inclination_deg + rng.gen_range(-0.3..0.3),
            raan_deg: rng.gen_range(-0.5..0.5),
            arg_perigee_deg: rng.gen_range(0.0..360.0),
            mean_anomaly_deg: rng.gen_range(0.0..360.0),
        });
    }

    for index in 0..config.background {
        objects.push(ElementRecord {
            catalog_id: allocate(),
            name: format!("DEBRIS-{:03}", index + 1),
            epoch: format_epoch(reference - Duration::minutes(rng.gen_range(0..720))),
            semi_major_axis_km: EARTH_RADIUS_KM + rng.gen_range(300.0..1500.0),
            eccentricity: rng.gen_range(0.0..0.02),
            inclination_deg: rng.gen_range(0.0..110.0),
            raan_deg: rng.gen_range(0.0..360.0),
            arg_perigee_deg: rng.gen_range(0.0..360.0),
            mean_anomaly_deg: rng.gen_range(0.0..360.0),
        });
    }

    CatalogFile { objects }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::kepler::KeplerEphemeris;
    use chrono::TimeZone;
    use conjcore::catalog::parse_epoch;
    use conjcore::ephemeris::EphemerisProvider;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn same_seed_gives_same_catalog() {
        let config = ScenarioConfig {
            seed: 7,
            ..Default::default()
        };
        assert_eq!(build_catalog(&config, reference()), build_catalog(&config, reference()));

        let other = ScenarioConfig {
            seed: 8,
            ..Default::default()
        };
        assert_ne!(build_catalog(&config, reference()), build_catalog(&other, reference()));
    }

    #[test]
    fn catalog_has_requested_population() {
        let config = ScenarioConfig::default();
        let file = build_catalog(&config, reference());
        assert_eq!(file.objects.len(), 1 + 1 + 12 + 3 + 40);
        assert_eq!(file.catalog().len(), file.objects.len());
        assert_eq!(file.objects[0].catalog_id, 25544);

        let stale: Vec<_> = file
            .objects
            .iter()
            .filter(|record| record.name.starts_with("STALE"))
            .collect();
        assert_eq!(stale.len(), 3);
        for record in stale {
            let age = reference() - parse_epoch(&record.epoch).unwrap();
            assert!(age > Duration::days(1));
        }
    }

    #[test]
    fn docked_companion_sits_inside_docking_floor() {
        let file = build_catalog(&ScenarioConfig::default(), reference());
        let ephemeris = KeplerEphemeris::from_records(&file.objects);
        let target = file.objects[0].object();
        let companion = file.objects[1].object();

        for hours in [0, 6, 30] {
            let at = reference() + Duration::hours(hours);
            let a = ephemeris.propagate(&target, at).unwrap();
            let b = ephemeris.propagate(&companion, at).unwrap();
            let distance = (0..3)
                .map(|axis| (a.position[axis] - b.position[axis]).powi(2))
                .sum::<f64>()
                .sqrt();
            assert!(distance < 0.1, "companion drifted to {} km", distance);
        }
        assert_eq!(ephemeris.unusable(), 0);
    }
}
