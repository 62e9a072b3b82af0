use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use nmrcore::algorithm::compress::compress_zero_runs;
use nmrcore::algorithm::merge::merge_associations;
use nmrcore::algorithm::synthesize::simulate_spectrum;
use nmrcore::data::association::{AssociationRecord, MergedPeak};
use nmrcore::data::spectrum::{SpectrumCurve, SynthesisParams};

use crate::error::PredictError;
use crate::model::ModelHandle;

/// One sample of the rendered spectrum as shipped to the serving layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpectrumPoint {
    pub ppm: f64,
    pub intensity: f64,
    #[serde(rename = "atomID")]
    pub atom_id: Vec<u32>,
}

/// Peak table entry for one merged peak.
///
/// Field names are the wire contract, including the historical spelling of
/// `assignement`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeakInfo {
    pub assignement: Vec<u32>,
    pub delta: f64,
    #[serde(rename = "nbAtoms")]
    pub nb_atoms: Option<u32>,
    pub multiplicity: Option<String>,
    pub coupling: Vec<f64>,
}

/// Full response of one prediction request: the compressed curve plus the
/// compact peak table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub spectrum: Vec<SpectrumPoint>,
    #[serde(rename = "peaksInfos")]
    pub peaks_infos: Vec<PeakInfo>,
}

/// Runs the full synthesis chain behind a validated parameter set and an
/// immutable model handle.
pub struct Predictor {
    model: ModelHandle,
    params: SynthesisParams,
}

impl Predictor {
    /// Builds a predictor, rejecting parameter sets the synthesizer cannot
    /// work with.
    pub fn new(model: ModelHandle, params: SynthesisParams) -> Result<Self, PredictError> {
        params.validate().map_err(PredictError::InvalidParams)?;
        Ok(Predictor { model, params })
    }

    pub fn params(&self) -> &SynthesisParams {
        &self.params
    }

    /// Predicts the spectrum of a molecule through the model handle.
    pub fn predict(&self, smiles: &str) -> Result<PredictionResponse, PredictError> {
        let records = self.model.predict_associations(smiles)?;
        self.synthesize_records(records)
    }

    /// Renders prepared association records into the response contract.
    ///
    /// A request without predicted groups yields the defined flat two-point
    /// baseline. Coupling lists are reconciled with their multiplicity length
    /// first, then the records run through merge, expansion, synthesis and
    /// compression. Any panic inside the chain is converted into a
    /// `Computation` error; no partial spectrum escapes.
    pub fn synthesize_records(
        &self,
        mut records: Vec<AssociationRecord>,
    ) -> Result<PredictionResponse, PredictError> {
        if records.is_empty() {
            log::info!("no predicted groups, returning the flat baseline spectrum");
            return Ok(baseline_response(&self.params));
        }

        for record in records.iter_mut() {
            record.reconcile_couplings();
        }

        let params = self.params.clone();
        catch_unwind(AssertUnwindSafe(move || {
            let merged = merge_associations(records, params.merge_tolerance_ppm);
            let curve = simulate_spectrum(&merged, &params);
            let compressed = compress_zero_runs(&curve);
            build_response(&merged, &compressed)
        }))
        .map_err(|cause| {
            let message = panic_message(cause.as_ref());
            log::error!("spectrum synthesis panicked: {}", message);
            PredictError::Computation(message)
        })
    }
}

/// The defined output for a request with no eligible predicted groups: two
/// flat samples spanning the axis and an empty peak table.
fn baseline_response(params: &SynthesisParams) -> PredictionResponse {
    PredictionResponse {
        spectrum: vec![
            SpectrumPoint {
                ppm: params.ppm_min,
                intensity: 0.0,
                atom_id: Vec::new(),
            },
            SpectrumPoint {
                ppm: params.ppm_max,
                intensity: 0.0,
                atom_id: Vec::new(),
            },
        ],
        peaks_infos: Vec::new(),
    }
}

fn build_response(merged: &[MergedPeak], compressed: &SpectrumCurve) -> PredictionResponse {
    let spectrum = compressed
        .ppm
        .iter()
        .zip(compressed.intensity.iter())
        .zip(compressed.atoms.iter())
        .map(|((&ppm, &intensity), atoms)| SpectrumPoint {
            ppm,
            intensity,
            atom_id: atoms.iter().copied().collect(),
        })
        .collect();

    let peaks_infos = merged
        .iter()
        .map(|peak| PeakInfo {
            assignement: peak.atoms.iter().copied().collect(),
            delta: peak.ppm,
            nb_atoms: peak.nb_atoms,
            multiplicity: peak.multiplicity.clone(),
            coupling: peak.couplings.clone(),
        })
        .collect();

    PredictionResponse {
        spectrum,
        peaks_infos,
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
