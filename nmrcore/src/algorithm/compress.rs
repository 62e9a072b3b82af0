use itertools::izip;

use crate::data::spectrum::SpectrumCurve;

/// Collapses interior runs of exact-zero intensity for compact output.
///
/// Maximal runs of consecutive samples with intensity exactly 0.0 keep only
/// their first and last sample; runs of a single sample and the endpoints of
/// the curve are always retained. Ordering is preserved and the output is
/// never longer than the input. Dropped samples are exactly zero with empty
/// attribution sets, so zero-filling between two consecutive retained zero
/// samples restores the dense curve without loss.
///
/// # Arguments
///
/// * `curve` - the dense curve produced by the synthesizer
///
/// # Returns
///
/// * `SpectrumCurve` - the curve with interior zero samples removed
pub fn compress_zero_runs(curve: &SpectrumCurve) -> SpectrumCurve {
    let n = curve.len();
    let mut keep = vec![true; n];

    let mut i = 0;
    while i < n {
        if curve.intensity[i] == 0.0 {
            let start = i;
            while i < n && curve.intensity[i] == 0.0 {
                i += 1;
            }
            let end = i - 1;
            // drop the interior of the run, keep both boundary samples
            for flag in keep.iter_mut().take(end).skip(start + 1) {
                *flag = false;
            }
        } else {
            i += 1;
        }
    }

    let mut ppm = Vec::new();
    let mut intensity = Vec::new();
    let mut atoms = Vec::new();
    for (keep_sample, &x, &y, sample_atoms) in izip!(
        keep.iter(),
        curve.ppm.iter(),
        curve.intensity.iter(),
        curve.atoms.iter()
    ) {
        if *keep_sample {
            ppm.push(x);
            intensity.push(y);
            atoms.push(sample_atoms.clone());
        }
    }

    SpectrumCurve::new(ppm, intensity, atoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn curve(intensity: Vec<f64>) -> SpectrumCurve {
        let n = intensity.len();
        let ppm: Vec<f64> = (0..n).map(|i| 10.0 - i as f64 * 0.1).collect();
        let atoms: Vec<BTreeSet<u32>> = intensity
            .iter()
            .map(|&y| {
                if y > 0.0 {
                    BTreeSet::from([1])
                } else {
                    BTreeSet::new()
                }
            })
            .collect();
        SpectrumCurve::new(ppm, intensity, atoms)
    }

    /// Zero-fills the compressed curve back onto the original axis.
    fn reconstruct(original: &SpectrumCurve, compressed: &SpectrumCurve) -> Vec<f64> {
        let mut dense = vec![0.0; original.len()];
        let mut k = 0;
        for (i, &x) in original.ppm.iter().enumerate() {
            if k < compressed.len() && compressed.ppm[k] == x {
                dense[i] = compressed.intensity[k];
                k += 1;
            }
        }
        assert_eq!(k, compressed.len());
        dense
    }

    #[test]
    fn test_interior_zero_run_keeps_boundaries() {
        let original = curve(vec![1.0, 0.0, 0.0, 0.0, 0.0, 2.0]);
        let compressed = compress_zero_runs(&original);

        assert_eq!(compressed.intensity, vec![1.0, 0.0, 0.0, 2.0]);
        assert_eq!(
            compressed.ppm,
            vec![
                original.ppm[0],
                original.ppm[1],
                original.ppm[4],
                original.ppm[5]
            ]
        );
    }

    #[test]
    fn test_single_sample_zero_run_is_retained() {
        let original = curve(vec![1.0, 0.0, 2.0, 0.0, 3.0]);
        let compressed = compress_zero_runs(&original);

        assert_eq!(compressed.len(), original.len());
        assert_eq!(compressed.intensity, original.intensity);
    }

    #[test]
    fn test_leading_and_trailing_runs_keep_endpoints() {
        let original = curve(vec![0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0]);
        let compressed = compress_zero_runs(&original);

        assert_eq!(compressed.intensity, vec![0.0, 0.0, 5.0, 0.0, 0.0]);
        assert_eq!(compressed.ppm[0], original.ppm[0]);
        assert_eq!(
            compressed.ppm[compressed.len() - 1],
            original.ppm[original.len() - 1]
        );
    }

    #[test]
    fn test_all_zero_curve_collapses_to_two_samples() {
        let original = curve(vec![0.0; 100]);
        let compressed = compress_zero_runs(&original);

        assert_eq!(compressed.len(), 2);
        assert_eq!(compressed.ppm[0], original.ppm[0]);
        assert_eq!(compressed.ppm[1], original.ppm[99]);
    }

    #[test]
    fn test_output_never_longer_than_input() {
        let cases = vec![
            vec![],
            vec![0.0],
            vec![1.0],
            vec![0.0, 0.0],
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 2.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0],
        ];
        for intensity in cases {
            let original = curve(intensity);
            let compressed = compress_zero_runs(&original);
            assert!(compressed.len() <= original.len());
        }
    }

    #[test]
    fn test_zero_fill_reconstruction_is_exact() {
        let cases = vec![
            vec![1.0, 0.0, 0.0, 0.0, 0.0, 2.0],
            vec![0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0],
            vec![0.5, 1.0, 0.5],
            vec![0.0; 42],
            vec![1.0, 0.0, 2.0],
        ];
        for intensity in cases {
            let original = curve(intensity);
            let compressed = compress_zero_runs(&original);
            assert_eq!(reconstruct(&original, &compressed), original.intensity);
        }
    }

    #[test]
    fn test_attribution_sets_survive_compression() {
        let original = curve(vec![1.0, 0.0, 0.0, 0.0, 3.0]);
        let compressed = compress_zero_runs(&original);

        assert_eq!(compressed.atoms[0], BTreeSet::from([1]));
        assert!(compressed.atoms[1].is_empty());
        assert_eq!(compressed.atoms[compressed.len() - 1], BTreeSet::from([1]));
    }
}
