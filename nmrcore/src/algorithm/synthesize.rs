use std::collections::BTreeSet;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use statrs::distribution::{Continuous, Normal};

use crate::algorithm::multiplet::expand_multiplet;
use crate::data::association::MergedPeak;
use crate::data::spectrum::{SpectrumCurve, SynthesisParams};

/// Builds the chemical shift axis: `resolution` evenly spaced samples running
/// from the high bound down to the low bound (spectra display high ppm first).
pub fn build_axis(params: &SynthesisParams) -> Vec<f64> {
    let step = (params.ppm_max - params.ppm_min) / (params.resolution as f64 - 1.0);
    (0..params.resolution)
        .map(|i| params.ppm_max - step * i as f64)
        .collect()
}

/// Accumulates the broadened sub-lines of all merged peaks into a discretized
/// intensity curve with per-sample atom attribution.
///
/// Every sub-line contributes a Gaussian density (σ = FWHM / 2.355) scaled by
/// `nb_atoms × weight × amplitude`, summed into the intensity vector.
/// Superposition is additive, so the result does not depend on the order of
/// the peaks, and the whole computation is deterministic. Samples where a
/// sub-line's scaled contribution exceeds the significance threshold carry
/// the owning peak's atom indices in their attribution set.
///
/// # Arguments
///
/// * `peaks` - merged peaks to render
/// * `params` - axis range, resolution, line width and scaling constants
///
/// # Returns
///
/// * `SpectrumCurve` - the dense curve over the configured axis
pub fn simulate_spectrum(peaks: &[MergedPeak], params: &SynthesisParams) -> SpectrumCurve {
    let axis = build_axis(params);
    let mut intensity = vec![0.0; axis.len()];
    let mut atoms: Vec<BTreeSet<u32>> = vec![BTreeSet::new(); axis.len()];

    let sigma = params.sigma();

    for peak in peaks {
        let scale_base = peak.effective_nb_atoms() as f64 * params.amplitude;

        for (position, weight) in expand_multiplet(peak, params.spectrometer_freq_mhz) {
            let line = Normal::new(position, sigma).unwrap();
            let scale = scale_base * weight;

            for (i, &x) in axis.iter().enumerate() {
                let contribution = scale * line.pdf(x);
                intensity[i] += contribution;
                if contribution > params.significance_threshold {
                    atoms[i].extend(peak.atoms.iter().copied());
                }
            }
        }
    }

    SpectrumCurve::new(axis, intensity, atoms)
}

/// Renders many independent requests on a bounded thread pool.
///
/// Each request stays single-threaded internally; the pool only spreads whole
/// requests across `num_threads` workers.
///
/// # Arguments
///
/// * `requests` - one merged-peak list per request
/// * `params` - synthesis parameters shared by all requests
/// * `num_threads` - number of workers in the pool
///
/// # Returns
///
/// * `Vec<SpectrumCurve>` - one curve per request, in input order
pub fn simulate_spectra(
    requests: &[Vec<MergedPeak>],
    params: &SynthesisParams,
    num_threads: usize,
) -> Vec<SpectrumCurve> {
    let thread_pool = ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .unwrap();

    thread_pool.install(|| {
        requests
            .par_iter()
            .map(|peaks| simulate_spectrum(peaks, params))
            .collect()
    })
}
