use anyhow::Context;
use chrono::SecondsFormat;
use conjcore::catalog::CloseApproach;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: [&str; 20] = [
    "alert_level",
    "tca_time",
    "sat1_name",
    "sat1_catalog",
    "sat2_name",
    "sat2_catalog",
    "distance_km",
    "relative_velocity_km_s",
    "sat1_x",
    "sat1_y",
    "sat1_z",
    "sat2_x",
    "sat2_y",
    "sat2_z",
    "sat1_vx",
    "sat1_vy",
    "sat1_vz",
    "sat2_vx",
    "sat2_vy",
    "sat2_vz",
];

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn tca_text(approach: &CloseApproach) -> String {
    approach.tca().to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// One CSV line, fields in [`CSV_HEADER`] order.
pub fn csv_row(approach: &CloseApproach) -> String {
    let target = approach.target_state();
    let other = approach.other_state();
    let mut fields = vec![
        approach.alert_level().as_str().to_string(),
        tca_text(approach),
        escape(&approach.target().name),
        approach.target().catalog_id.to_string(),
        escape(&approach.other().name),
        approach.other().catalog_id.to_string(),
        format!("{:.6}", approach.distance_km()),
        format!("{:.4}", approach.relative_velocity_km_s()),
    ];
    fields.extend(target.position.iter().map(|v| format!("{:.4}", v)));
    fields.extend(other.position.iter().map(|v| format!("{:.4}", v)));
    fields.extend(target.velocity.iter().map(|v| format!("{:.6}", v)));
    fields.extend(other.velocity.iter().map(|v| format!("{:.6}", v)));
    fields.join(",")
}

pub fn write_csv<W: Write>(mut writer: W, approaches: &[CloseApproach]) -> std::io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER.join(","))?;
    for approach in approaches {
        writeln!(writer, "{}", csv_row(approach))?;
    }
    writer.flush()
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

pub fn save_csv<P: AsRef<Path>>(path: P, approaches: &[CloseApproach]) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    create_parent(path_ref)?;
    let file = fs::File::create(path_ref)
        .with_context(|| format!("creating {}", path_ref.display()))?;
    write_csv(std::io::BufWriter::new(file), approaches)
        .with_context(|| format!("writing {}", path_ref.display()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocityRecord {
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideRecord {
    pub name: String,
    pub catalog: u32,
    pub position: PositionRecord,
    pub velocity: VelocityRecord,
}

/// Nested per-approach record for downstream viewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConjunctionRecord {
    pub alert_level: String,
    pub tca_time: String,
    pub distance_km: f64,
    pub relative_velocity_km_s: f64,
    pub sat1: SideRecord,
    pub sat2: SideRecord,
}

fn side(name: &str, catalog: u32, position: [f64; 3], velocity: [f64; 3]) -> SideRecord {
    SideRecord {
        name: name.to_string(),
        catalog,
        position: PositionRecord {
            x: position[0],
            y: position[1],
            z: position[2],
        },
        velocity: VelocityRecord {
            vx: velocity[0],
            vy: velocity[1],
            vz: velocity[2],
        },
    }
}

impl From<&CloseApproach> for ConjunctionRecord {
    fn from(approach: &CloseApproach) -> Self {
        let target = approach.target_state();
        let other = approach.other_state();
        Self {
            alert_level: approach.alert_level().as_str().to_string(),
            tca_time: tca_text(approach),
            distance_km: approach.distance_km(),
            relative_velocity_km_s: approach.relative_velocity_km_s(),
            sat1: side(
                &approach.target().name,
                approach.target().catalog_id,
                target.position,
                target.velocity,
            ),
            sat2: side(
                &approach.other().name,
                approach.other().catalog_id,
                other.position,
                other.velocity,
            ),
        }
    }
}

pub fn save_json<P: AsRef<Path>>(path: P, approaches: &[CloseApproach]) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    create_parent(path_ref)?;
    let records: Vec<ConjunctionRecord> = approaches.iter().map(ConjunctionRecord::from).collect();
    let contents = serde_json::to_string_pretty(&records).context("serializing conjunctions")?;
    fs::write(path_ref, contents).with_context(|| format!("writing {}", path_ref.display()))
}
