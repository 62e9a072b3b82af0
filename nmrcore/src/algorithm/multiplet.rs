use itertools::Itertools;

use crate::data::association::{MergedPeak, Multiplicity};

/// Expands the coupling pattern of a merged peak into weighted sub-lines.
///
/// Each (pattern letter, coupling constant) pair contributes `n` evenly
/// spaced Hz offsets spanning ±J·(n−1)/2 with intensities from the letter's
/// base template normalized to sum 1. The full multiplet is the Cartesian
/// product across all pairs: offsets add up, weights multiply, and the
/// offsets convert to ppm through the spectrometer reference frequency. The
/// number of sub-lines is the product of the template lengths.
///
/// Peaks without a usable pattern collapse to a single line at the center:
///
/// * null or empty multiplicity, or no couplings,
/// * a pattern letter outside the {s, d, t, q, m} alphabet,
/// * a letter/coupling count mismatch that broadcasting a single letter
///   cannot resolve.
///
/// The returned weights are renormalized to sum to 1.
///
/// # Arguments
///
/// * `peak` - the merged peak to expand
/// * `spectrometer_freq_mhz` - reference frequency converting Hz to ppm
///
/// # Returns
///
/// * `Vec<(f64, f64)>` - (position in ppm, weight) per sub-line
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use nmrcore::algorithm::multiplet::expand_multiplet;
/// use nmrcore::data::association::MergedPeak;
///
/// let peak = MergedPeak {
///     ppm: 1.5,
///     nb_atoms: Some(3),
///     multiplicity: Some("t".to_string()),
///     couplings: vec![7.0],
///     atoms: BTreeSet::new(),
/// };
/// let lines = expand_multiplet(&peak, 500.0);
/// assert_eq!(lines.len(), 3);
/// assert!((lines[1].1 - 0.5).abs() < 1e-9);
/// ```
pub fn expand_multiplet(peak: &MergedPeak, spectrometer_freq_mhz: f64) -> Vec<(f64, f64)> {
    let pattern = match &peak.multiplicity {
        Some(multiplicity) if !multiplicity.is_empty() && !peak.couplings.is_empty() => {
            match Multiplicity::parse_pattern(multiplicity) {
                Some(pattern) => pattern,
                None => {
                    log::warn!(
                        "unknown letter in multiplicity {:?} at {} ppm, collapsing to a single line",
                        multiplicity,
                        peak.ppm
                    );
                    return vec![(peak.ppm, 1.0)];
                }
            }
        }
        _ => return vec![(peak.ppm, 1.0)],
    };

    // a single predicted letter is broadcast over all coupling constants
    let pattern = if pattern.len() == 1 && peak.couplings.len() > 1 {
        vec![pattern[0]; peak.couplings.len()]
    } else {
        pattern
    };

    if pattern.len() != peak.couplings.len() {
        log::warn!(
            "multiplicity {:?} disagrees with {} coupling constants at {} ppm, collapsing to a single line",
            peak.multiplicity,
            peak.couplings.len(),
            peak.ppm
        );
        return vec![(peak.ppm, 1.0)];
    }

    let line_sets: Vec<Vec<(f64, f64)>> = pattern
        .iter()
        .zip(peak.couplings.iter())
        .map(|(kind, &coupling)| {
            let template = kind.intensity_template();
            let template_sum: f64 = template.iter().sum();
            let n = template.len() as f64;
            template
                .iter()
                .enumerate()
                .map(|(i, &intensity)| {
                    let offset_hz = coupling * (i as f64 - (n - 1.0) / 2.0);
                    (offset_hz, intensity / template_sum)
                })
                .collect()
        })
        .collect();

    let mut sub_peaks: Vec<(f64, f64)> = line_sets
        .into_iter()
        .multi_cartesian_product()
        .map(|combination| {
            let offset_hz: f64 = combination.iter().map(|(offset, _)| offset).sum();
            let weight: f64 = combination.iter().map(|(_, weight)| weight).product();
            (peak.ppm + offset_hz / spectrometer_freq_mhz, weight)
        })
        .collect();

    // renormalize, the per-pair products drift away from an exact unit sum
    let total_weight: f64 = sub_peaks.iter().map(|(_, weight)| weight).sum();
    for (_, weight) in sub_peaks.iter_mut() {
        *weight /= total_weight;
    }

    sub_peaks
}
