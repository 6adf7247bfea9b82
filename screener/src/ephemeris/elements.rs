use anyhow::Context;
use conjcore::catalog::{Catalog, OrbitingObject};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Mean Keplerian elements of one catalog object. Angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub catalog_id: u32,
    pub name: String,
    pub epoch: String,
    pub semi_major_axis_km: f64,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination_deg: f64,
    #[serde(default)]
    pub raan_deg: f64,
    #[serde(default)]
    pub arg_perigee_deg: f64,
    #[serde(default)]
    pub mean_anomaly_deg: f64,
}

impl ElementRecord {
    pub fn object(&self) -> OrbitingObject {
        OrbitingObject::new(self.catalog_id, self.name.clone(), self.epoch.clone())
    }
}

/// On-disk element catalog, YAML or JSON depending on the file extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub objects: Vec<ElementRecord>,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

impl CatalogFile {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading catalog {}", path_ref.display()))?;
        let file: CatalogFile = if is_json(path_ref) {
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing catalog {}", path_ref.display()))?
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("parsing catalog {}", path_ref.display()))?
        };
        Ok(file)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = if is_json(path_ref) {
            serde_json::to_string_pretty(self).context("serializing catalog as JSON")?
        } else {
            serde_yaml::to_string(self).context("serializing catalog as YAML")?
        };
        fs::write(path_ref, contents)
            .with_context(|| format!("writing catalog {}", path_ref.display()))
    }

    /// Screening metadata for every record. Later duplicates of a catalog
    /// id replace earlier ones.
    pub fn catalog(&self) -> Catalog {
        let mut catalog = Catalog::new();
        for record in &self.objects {
            if catalog.insert(record.object()).is_some() {
                warn!("duplicate catalog id {}, keeping the last entry", record.catalog_id);
            }
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YAML: &str = "objects:
  - catalog_id: 25544
    name: ISS (ZARYA)
    epoch: 2024-01-01T00:00:00Z
    semi_major_axis_km: 6798.0
    inclination_deg: 51.6
  - catalog_id: 43013
    name: NOAA 20
    epoch: 2024-01-01 02:00:00
    semi_major_axis_km: 7200.0
    eccentricity: 0.001
";

    #[test]
    fn loads_yaml_with_defaulted_angles() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(YAML.as_bytes()).unwrap();
        let path = temp.into_temp_path();

        let file = CatalogFile::load(&path).unwrap();
        assert_eq!(file.objects.len(), 2);
        assert_eq!(file.objects[0].raan_deg, 0.0);
        assert_eq!(file.objects[1].eccentricity, 0.001);

        let catalog = file.catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find_by_name("iss").map(|o| o.catalog_id), Some(25544));
        assert!(catalog.get(43013).unwrap().parsed_epoch().is_ok());
    }

    #[test]
    fn json_round_trip_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");
        let file: CatalogFile = serde_yaml::from_str(YAML).unwrap();

        file.save(&path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.trim_start().starts_with('{'));
        assert_eq!(CatalogFile::load(&path).unwrap(), file);
    }

    #[test]
    fn duplicate_ids_keep_last_entry() {
        let mut file: CatalogFile = serde_yaml::from_str(YAML).unwrap();
        let mut duplicate = file.objects[0].clone();
        duplicate.name = "ISS (DUPLICATE)".into();
        file.objects.push(duplicate);

        let catalog = file.catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(25544).unwrap().name, "ISS (DUPLICATE)");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CatalogFile::load("/nonexistent/catalog.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/catalog.yaml"));
    }
}
