use std::collections::BTreeSet;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Conversion factor between the full width at half maximum of a Gaussian
/// line and its standard deviation.
pub const FWHM_TO_SIGMA: f64 = 2.355;

/// Tunable parameters of the spectrum synthesis chain.
///
/// The amplitude constant and the significance threshold are calibrated
/// against the default axis range and resolution; they are carried here as
/// explicit configuration rather than derived constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SynthesisParams {
    /// Merge tolerance for near-coincident predicted peaks in ppm (default: 0.15)
    pub merge_tolerance_ppm: f64,
    /// Spectrometer reference frequency in MHz, converts Hz splittings to ppm (default: 500.0)
    pub spectrometer_freq_mhz: f64,
    /// Full width at half maximum of one spectral line in ppm (default: 0.004)
    pub fwhm_ppm: f64,
    /// Lower bound of the chemical shift axis in ppm (default: 0.0)
    pub ppm_min: f64,
    /// Upper bound of the chemical shift axis in ppm (default: 10.0)
    pub ppm_max: f64,
    /// Number of evenly spaced samples on the axis (default: 64000)
    pub resolution: usize,
    /// Minimum scaled contribution for a sub-peak to claim atom attribution
    /// at a sample (default: 1e-3)
    pub significance_threshold: f64,
    /// Amplitude constant applied to every line (default: 5e4)
    pub amplitude: f64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        SynthesisParams {
            merge_tolerance_ppm: 0.15,
            spectrometer_freq_mhz: 500.0,
            fwhm_ppm: 0.004,
            ppm_min: 0.0,
            ppm_max: 10.0,
            resolution: 64000,
            significance_threshold: 1e-3,
            amplitude: 5e4,
        }
    }
}

impl SynthesisParams {
    /// Checks the parameter set for values the synthesizer cannot work with.
    ///
    /// # Returns
    ///
    /// * `Err` with a description of the first offending field, `Ok(())` otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fwhm_ppm > 0.0) {
            return Err(format!("fwhm_ppm must be positive, got {}", self.fwhm_ppm));
        }
        if !(self.spectrometer_freq_mhz > 0.0) {
            return Err(format!(
                "spectrometer_freq_mhz must be positive, got {}",
                self.spectrometer_freq_mhz
            ));
        }
        if self.resolution < 2 {
            return Err(format!(
                "resolution must be at least 2 samples, got {}",
                self.resolution
            ));
        }
        if !(self.ppm_max > self.ppm_min) {
            return Err(format!(
                "ppm axis range is empty: [{}, {}]",
                self.ppm_min, self.ppm_max
            ));
        }
        Ok(())
    }

    /// Gaussian standard deviation corresponding to the configured FWHM.
    pub fn sigma(&self) -> f64 {
        self.fwhm_ppm / FWHM_TO_SIGMA
    }
}

/// Represents a discretized intensity curve with per-sample atom attribution.
///
/// Parallel vectors over the chemical shift axis; the three vectors always
/// have the same length.
#[derive(Clone, Debug, Serialize, Deserialize, Encode, Decode)]
pub struct SpectrumCurve {
    pub ppm: Vec<f64>,
    pub intensity: Vec<f64>,
    pub atoms: Vec<BTreeSet<u32>>,
}

impl SpectrumCurve {
    /// Constructs a new `SpectrumCurve`.
    ///
    /// # Arguments
    ///
    /// * `ppm` - sample positions on the chemical shift axis
    /// * `intensity` - intensity at each sample
    /// * `atoms` - atom indices attributed to each sample
    ///
    /// # Panics
    ///
    /// Panics if the three vectors do not have the same length.
    pub fn new(ppm: Vec<f64>, intensity: Vec<f64>, atoms: Vec<BTreeSet<u32>>) -> Self {
        assert!(ppm.len() == intensity.len() && intensity.len() == atoms.len());
        SpectrumCurve {
            ppm,
            intensity,
            atoms,
        }
    }

    pub fn len(&self) -> usize {
        self.ppm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ppm.is_empty()
    }
}
