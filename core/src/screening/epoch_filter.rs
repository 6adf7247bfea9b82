use crate::catalog::{Catalog, OrbitingObject};
use crate::prelude::{ScanError, ScreenResult, ScreeningConfig};
use crate::telemetry::ScanWarning;
use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Outcome of the freshness check over a whole catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpochSelection {
    /// Catalog ids with an epoch no older than the limit, in catalog order.
    pub fresh: Vec<u32>,
    pub stale: usize,
    pub unparsable: Vec<u32>,
}

impl EpochSelection {
    pub fn skipped(&self) -> usize {
        self.stale + self.unparsable.len()
    }
}

/// Objects chosen for one scan: the target plus everything it is screened against.
#[derive(Debug, Clone)]
pub struct ScanSet<'c> {
    pub target: &'c OrbitingObject,
    pub others: Vec<&'c OrbitingObject>,
    pub selection: EpochSelection,
    pub fell_back: bool,
    pub target_forced: bool,
    pub warnings: Vec<ScanWarning>,
}

#[derive(Debug, Clone, Copy)]
pub struct EpochFilter {
    max_age_days: f64,
    min_filtered_objects: usize,
}

impl EpochFilter {
    pub fn new(max_age_days: f64) -> Self {
        Self {
            max_age_days,
            min_filtered_objects: 1,
        }
    }

    pub fn from_config(config: &ScreeningConfig) -> Self {
        Self {
            max_age_days: config.max_epoch_age_days,
            min_filtered_objects: config.min_filtered_objects,
        }
    }

    /// Age of `epoch` relative to `reference` in days. Negative for future epochs.
    pub fn age_days(epoch: DateTime<Utc>, reference: DateTime<Utc>) -> f64 {
        (reference - epoch).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
    }

    pub fn apply(&self, catalog: &Catalog, reference: DateTime<Utc>) -> EpochSelection {
        let mut selection = EpochSelection::default();
        for object in catalog.iter() {
            match object.parsed_epoch() {
                Ok(epoch) if Self::age_days(epoch, reference) <= self.max_age_days => {
                    selection.fresh.push(object.catalog_id)
                }
                Ok(_) => selection.stale += 1,
                Err(_) => selection.unparsable.push(object.catalog_id),
            }
        }
        selection
    }

    /// Resolves the objects to screen for `target_id`.
    ///
    /// Falls back to the full catalog when too few objects are fresh, and
    /// re-adds the target when only its own epoch is stale.
    pub fn select_for_target<'c>(
        &self,
        catalog: &'c Catalog,
        target_id: u32,
        reference: DateTime<Utc>,
    ) -> ScreenResult<ScanSet<'c>> {
        if catalog.is_empty() {
            return Err(ScanError::EmptyCatalog);
        }

        let selection = self.apply(catalog, reference);
        let mut warnings = Vec::new();

        if let Some(&first) = selection.unparsable.first() {
            warnings.push(ScanWarning::UnparsableEpochs {
                count: selection.unparsable.len(),
                first,
            });
        }

        let fell_back = selection.fresh.len() < self.min_filtered_objects;
        let mut ids: Vec<u32> = if fell_back {
            warnings.push(ScanWarning::FilterFallback {
                fresh: selection.fresh.len(),
                total: catalog.len(),
            });
            catalog.iter().map(|object| object.catalog_id).collect()
        } else {
            selection.fresh.clone()
        };

        let target = catalog
            .get(target_id)
            .ok_or(ScanError::TargetNotFound(target_id))?;

        let target_forced = !ids.contains(&target_id);
        if target_forced {
            warnings.push(ScanWarning::TargetForceIncluded {
                catalog_id: target_id,
            });
            ids.push(target_id);
        }

        let others: Vec<&OrbitingObject> = ids
            .iter()
            .filter(|&&id| id != target_id)
            .filter_map(|&id| catalog.get(id))
            .collect();

        if others.is_empty() {
            warnings.push(ScanWarning::NoOtherObjects {
                catalog_size: catalog.len(),
            });
        }

        Ok(ScanSet {
            target,
            others,
            selection,
            fell_back,
            target_forced,
            warnings,
        })
    }
}
