use crate::telemetry::events::{EventSink, ScanEvent};
use log::{debug, info, warn};

/// Renders scan events through the `log` facade.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogManager {
    fn emit(&self, event: &ScanEvent) {
        match event {
            ScanEvent::Started {
                target,
                objects,
                segments,
                window,
                min_distance_km,
                threshold_km,
            } => {
                self.record(&format!(
                    "screening {} (#{}) against {} objects, {} segments, {} to {}",
                    target.name,
                    target.catalog_id,
                    objects,
                    segments,
                    window.start.to_rfc3339(),
                    window.end().to_rfc3339()
                ));
                self.record(&format!(
                    "distance range {} - {} km (closer objects treated as docked)",
                    min_distance_km, threshold_km
                ));
            }
            ScanEvent::Warning(warning) => warn!("{}", warning),
            ScanEvent::Progress { completed, total } => {
                debug!("screened {}/{} pairs", completed, total)
            }
            ScanEvent::Finished(stats) => {
                self.record(&format!(
                    "scan finished: {} pairs, {} raw minima, {} approaches",
                    stats.pairs_completed, stats.minima_found, stats.approaches
                ));
                match stats.min_distance_seen_km {
                    Some(distance) => {
                        self.record(&format!("minimum distance seen (non-docked): {:.2} km", distance))
                    }
                    None => self.record("minimum distance seen (non-docked): none within screening threshold"),
                }
                if stats.pairs_with_failures > 0 {
                    warn!(
                        "{} propagation failures, {} failed segments absorbed across {} pairs",
                        stats.failed_samples, stats.failed_segments, stats.pairs_with_failures
                    );
                }
            }
        }
    }
}
