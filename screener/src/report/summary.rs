use conjcore::catalog::{AlertLevel, AlertThresholds};
use conjcore::screening::ScanReport;
use std::fmt;

const TOP_APPROACHES: usize = 20;
const RULE_WIDTH: usize = 70;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn band_label(level: AlertLevel, thresholds: &AlertThresholds) -> String {
    match level {
        AlertLevel::Red => format!("(< {} km)", thresholds.red_km),
        AlertLevel::Yellow => format!("({}-{} km)", thresholds.red_km, thresholds.yellow_km),
        AlertLevel::Green => format!("({}-{} km)", thresholds.yellow_km, thresholds.green_km),
    }
}

/// Console summary: alert breakdown, closest approaches, distance and
/// velocity spread, then the scan counters.
pub struct Summary<'a> {
    report: &'a ScanReport,
    threshold_km: f64,
    thresholds: &'a AlertThresholds,
}

impl<'a> Summary<'a> {
    pub fn new(report: &'a ScanReport, threshold_km: f64, thresholds: &'a AlertThresholds) -> Self {
        Self {
            report,
            threshold_km,
            thresholds,
        }
    }

    fn write_approaches(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "Total close approaches: {}", report.approaches.len())?;
        writeln!(f, "\n{}\nALERT LEVEL BREAKDOWN\n{}", rule(), rule())?;
        for level in AlertLevel::ALL {
            let tag = format!("{} {}", level.symbol(), level.as_str());
            writeln!(
                f,
                "  {:<13} {:<16} {:>5} approaches",
                tag,
                band_label(level, self.thresholds),
                report.count_by_level(level)
            )?;
        }

        writeln!(f, "\n{}\nTOP {} CLOSEST APPROACHES\n{}", rule(), TOP_APPROACHES, rule())?;
        writeln!(
            f,
            "{:<7} {:<12} {:<24} {:<10} {:<15}",
            "Alert", "Distance", "TCA Time", "Rel Vel", "Object"
        )?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        for approach in report.approaches.iter().take(TOP_APPROACHES) {
            let name: String = approach.other().name.chars().take(14).collect();
            writeln!(
                f,
                "{:<7} {:>6.3} km   {}   {:>6.2} km/s  {}",
                approach.alert_level().symbol(),
                approach.distance_km(),
                approach.tca().format("%Y-%m-%d %H:%M:%S%.3f"),
                approach.relative_velocity_km_s(),
                name
            )?;
        }

        if let Some(summary) = report.summary() {
            writeln!(f, "\n{}\nSTATISTICS\n{}", rule(), rule())?;
            writeln!(
                f,
                "Distance - Min: {:.6} km, Max: {:.6} km, Avg: {:.6} km",
                summary.min_distance_km, summary.max_distance_km, summary.mean_distance_km
            )?;
            writeln!(
                f,
                "Velocity - Min: {:.4} km/s, Max: {:.4} km/s, Avg: {:.4} km/s",
                summary.min_velocity_km_s, summary.max_velocity_km_s, summary.mean_velocity_km_s
            )?;
        }
        writeln!(f, "Unique objects at risk: {}", report.unique_objects_at_risk())
    }

    fn write_scan(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.report.statistics;
        writeln!(f, "\n{}\nSCAN\n{}", rule(), rule())?;
        writeln!(
            f,
            "Objects screened: {} of {} ({} stale, {} unparsable epochs{})",
            stats.objects_screened,
            stats.catalog_size,
            stats.epoch_stale,
            stats.epoch_unparsable,
            if stats.filter_fallback { ", filter fell back to full catalog" } else { "" }
        )?;
        writeln!(
            f,
            "Minima: {} raw, {} after merge, {} docked, {} beyond threshold",
            stats.minima_found, stats.minima_after_dedup, stats.docked_dropped, stats.distant_dropped
        )?;
        match stats.min_distance_seen_km {
            Some(distance) => writeln!(f, "Minimum distance seen (non-docked): {:.2} km", distance)?,
            None => writeln!(f, "Minimum distance seen (non-docked): none")?,
        }
        if stats.pairs_with_failures > 0 {
            writeln!(
                f,
                "Propagation failures in {} pairs: {} samples, {} segments, {} at TCA",
                stats.pairs_with_failures,
                stats.failed_samples,
                stats.failed_segments,
                stats.tca_propagation_dropped
            )?;
        }
        if stats.cancelled {
            writeln!(
                f,
                "Scan cancelled: {} of {} pairs screened, results are partial",
                stats.pairs_completed, stats.objects_screened
            )?;
        }
        for warning in &self.report.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }
        Ok(())
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "{}", rule())?;
        writeln!(f, "CLOSE APPROACH SUMMARY")?;
        writeln!(f, "{}", rule())?;
        writeln!(f, "Target: {} (#{})", report.target.name, report.target.catalog_id)?;
        writeln!(
            f,
            "Window: {} to {}",
            report.window.start.to_rfc3339(),
            report.window.end().to_rfc3339()
        )?;
        writeln!(f, "Threshold: {} km", self.threshold_km)?;

        if report.approaches.is_empty() {
            writeln!(f, "\nNo close approaches detected.")?;
        } else {
            self.write_approaches(f)?;
        }
        self.write_scan(f)
    }
}
