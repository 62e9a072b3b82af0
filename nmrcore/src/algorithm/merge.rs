use ordered_float::OrderedFloat;

use crate::data::association::{AssociationRecord, MergedPeak};

/// Deduplicates near-coincident association records before multiplet expansion.
///
/// Records are sorted ascending by ppm and folded in a single left-to-right
/// pass: a record closer than `tolerance_ppm` (strict) to the running
/// accumulator is merged into it, anything else flushes the accumulator and
/// starts a new one. The comparison is against the accumulator's current
/// weighted center, so the merge only depends on sorted order.
///
/// The pass is idempotent on input that is already pairwise at least
/// `tolerance_ppm` apart.
///
/// # Arguments
///
/// * `records` - predicted peak groups from the inference collaborator
/// * `tolerance_ppm` - maximum center distance for two records to merge
///
/// # Returns
///
/// * `Vec<MergedPeak>` - merged peaks in ascending ppm order
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use nmrcore::algorithm::merge::merge_associations;
/// use nmrcore::data::association::AssociationRecord;
///
/// let records = vec![
///     AssociationRecord::new(1.00, Some(2), None, vec![], BTreeSet::from([0])),
///     AssociationRecord::new(1.05, Some(1), None, vec![], BTreeSet::from([1])),
/// ];
/// let merged = merge_associations(records, 0.15);
/// assert_eq!(merged.len(), 1);
/// assert!((merged[0].ppm - 3.05 / 3.0).abs() < 1e-9);
/// ```
pub fn merge_associations(
    records: Vec<AssociationRecord>,
    tolerance_ppm: f64,
) -> Vec<MergedPeak> {
    let mut sorted = records;
    sorted.sort_by_key(|record| OrderedFloat(record.ppm));

    let mut merged: Vec<MergedPeak> = Vec::new();
    let mut iter = sorted.into_iter();

    let mut current: MergedPeak = match iter.next() {
        Some(record) => record.into(),
        None => return merged,
    };

    for record in iter {
        if (record.ppm - current.ppm).abs() < tolerance_ppm {
            absorb(&mut current, record);
        } else {
            merged.push(current);
            current = record.into();
        }
    }
    merged.push(current);

    merged
}

/// Folds one record into the accumulator peak: atom-count-weighted center,
/// summed counts, unioned atom sets. The pattern fields follow the record
/// with the strictly higher pattern complexity; on a tie the earlier
/// (lower-ppm) record wins.
fn absorb(current: &mut MergedPeak, record: AssociationRecord) {
    let weight_current = current.effective_nb_atoms() as f64;
    let weight_record = record.effective_nb_atoms() as f64;
    let total_nb = current.effective_nb_atoms() + record.effective_nb_atoms();

    current.ppm = (current.ppm * weight_current + record.ppm * weight_record)
        / (weight_current + weight_record);
    current.nb_atoms = Some(total_nb);

    if record.pattern_complexity() > current.pattern_complexity() {
        current.multiplicity = record.multiplicity;
        current.couplings = record.couplings;
    }
    current.atoms.extend(record.atoms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record(
        ppm: f64,
        nb_atoms: Option<u32>,
        multiplicity: Option<&str>,
        couplings: Vec<f64>,
        atoms: &[u32],
    ) -> AssociationRecord {
        AssociationRecord::new(
            ppm,
            nb_atoms,
            multiplicity.map(|m| m.to_string()),
            couplings,
            atoms.iter().copied().collect(),
        )
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let merged = merge_associations(Vec::new(), 0.15);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_weighted_merge_of_two_records() {
        let records = vec![
            record(1.00, Some(2), None, vec![], &[0, 1]),
            record(1.05, Some(1), None, vec![], &[2]),
        ];
        let merged = merge_associations(records, 0.15);

        assert_eq!(merged.len(), 1);
        assert!((merged[0].ppm - 1.0166666666666666).abs() < 1e-9);
        assert_eq!(merged[0].nb_atoms, Some(3));
        assert_eq!(merged[0].atoms, BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_idempotent_on_well_separated_records() {
        let records = vec![
            record(1.0, Some(1), Some("d"), vec![7.0], &[0]),
            record(2.0, Some(2), Some("t"), vec![6.5], &[1]),
            record(3.5, None, None, vec![], &[2]),
        ];
        let merged = merge_associations(records.clone(), 0.15);

        assert_eq!(merged.len(), records.len());
        for (peak, original) in merged.iter().zip(records.iter()) {
            assert_eq!(peak.ppm, original.ppm);
            assert_eq!(peak.nb_atoms, original.nb_atoms);
            assert_eq!(peak.multiplicity, original.multiplicity);
        }
    }

    #[test]
    fn test_tolerance_is_strict() {
        // centers exactly tolerance apart stay separate
        let records = vec![
            record(1.00, Some(1), None, vec![], &[0]),
            record(1.15, Some(1), None, vec![], &[1]),
        ];
        let merged = merge_associations(records, 0.15);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_higher_complexity_pattern_wins() {
        let records = vec![
            record(1.00, Some(1), Some("s"), vec![1.0], &[0]),
            record(1.05, Some(1), Some("dd"), vec![7.0, 2.0], &[1]),
        ];
        let merged = merge_associations(records, 0.15);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].multiplicity.as_deref(), Some("dd"));
        assert_eq!(merged[0].couplings, vec![7.0, 2.0]);
    }

    #[test]
    fn test_complexity_tie_keeps_earlier_record() {
        let records = vec![
            record(1.00, Some(1), Some("d"), vec![7.0], &[0]),
            record(1.05, Some(1), Some("t"), vec![6.0], &[1]),
        ];
        let merged = merge_associations(records, 0.15);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].multiplicity.as_deref(), Some("d"));
        assert_eq!(merged[0].couplings, vec![7.0]);
    }

    #[test]
    fn test_missing_nb_atoms_weighs_as_one() {
        let records = vec![
            record(2.0, None, None, vec![], &[0]),
            record(2.1, Some(3), None, vec![], &[1]),
        ];
        let merged = merge_associations(records, 0.15);

        assert_eq!(merged.len(), 1);
        // (2.0 * 1 + 2.1 * 3) / 4
        assert!((merged[0].ppm - 2.075).abs() < 1e-9);
        assert_eq!(merged[0].nb_atoms, Some(4));
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let records = vec![
            record(3.0, Some(1), None, vec![], &[2]),
            record(1.0, Some(1), None, vec![], &[0]),
            record(2.0, Some(1), None, vec![], &[1]),
        ];
        let merged = merge_associations(records, 0.15);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].ppm, 1.0);
        assert_eq!(merged[1].ppm, 2.0);
        assert_eq!(merged[2].ppm, 3.0);
    }

    #[test]
    fn test_chain_merge_tracks_running_center() {
        // each neighbor is within tolerance of the running weighted center
        let records = vec![
            record(1.00, Some(1), None, vec![], &[0]),
            record(1.10, Some(1), None, vec![], &[1]),
            record(1.18, Some(1), None, vec![], &[2]),
        ];
        let merged = merge_associations(records, 0.15);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].nb_atoms, Some(3));
        assert_eq!(merged[0].atoms, BTreeSet::from([0, 1, 2]));
    }
}
