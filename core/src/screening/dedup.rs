use crate::catalog::CandidateMinimum;

/// Collapses minima that belong to the same physical pass.
///
/// A true minimum close to a segment boundary is usually found by both
/// neighbouring segments at slightly different offsets and distances.
#[derive(Debug, Clone, Copy)]
pub struct Deduplicator {
    merge_seconds: f64,
}

impl Deduplicator {
    pub fn new(merge_seconds: f64) -> Self {
        Self { merge_seconds }
    }

    /// Groups offset-sorted candidates while each one lies within the merge
    /// window of the previous group member, then keeps the closest of each group.
    pub fn merge(&self, mut candidates: Vec<CandidateMinimum>) -> Vec<CandidateMinimum> {
        candidates.sort_by(|a, b| a.offset_s.total_cmp(&b.offset_s));

        let mut merged: Vec<CandidateMinimum> = Vec::with_capacity(candidates.len());
        let mut previous_offset: Option<f64> = None;

        for candidate in candidates {
            let same_group = previous_offset
                .map(|offset| candidate.offset_s - offset <= self.merge_seconds)
                .unwrap_or(false);

            match merged.last_mut() {
                Some(best) if same_group => {
                    if candidate.distance_km < best.distance_km {
                        *best = candidate;
                    }
                }
                _ => merged.push(candidate),
            }
            previous_offset = Some(candidate.offset_s);
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(candidates: &[(f64, f64)]) -> Vec<(f64, f64)> {
        Deduplicator::new(300.0)
            .merge(
                candidates
                    .iter()
                    .map(|&(offset, distance)| CandidateMinimum::new(offset, distance))
                    .collect(),
            )
            .into_iter()
            .map(|c| (c.offset_s, c.distance_km))
            .collect()
    }

    #[test]
    fn candidates_inside_window_collapse_to_closest() {
        assert_eq!(merge(&[(100.0, 12.0), (350.0, 8.0)]), vec![(350.0, 8.0)]);
    }

    #[test]
    fn candidates_outside_window_stay_separate() {
        assert_eq!(
            merge(&[(100.0, 12.0), (500.0, 8.0)]),
            vec![(100.0, 12.0), (500.0, 8.0)]
        );
    }

    #[test]
    fn grouping_chains_through_consecutive_members() {
        // 600 is 500s after 100 but only 250s after 350.
        assert_eq!(
            merge(&[(600.0, 9.0), (100.0, 5.0), (350.0, 7.0), (1200.0, 3.0)]),
            vec![(100.0, 5.0), (1200.0, 3.0)]
        );
    }

    #[test]
    fn boundary_gap_counts_as_same_event() {
        assert_eq!(merge(&[(0.0, 4.0), (300.0, 6.0)]), vec![(0.0, 4.0)]);
        assert!(merge(&[]).is_empty());
    }
}
