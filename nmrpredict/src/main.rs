use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use nmrcore::data::association::AssociationRecord;
use nmrcore::data::spectrum::SynthesisParams;
use nmrpredict::model::{ModelHandle, TabulatedModel};
use nmrpredict::predict::Predictor;
use nmrpredict::service::{PredictionService, ServiceConfig};

/// Renders a simulated NMR spectrum from a JSON file of predicted
/// association records and prints the response contract to stdout.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file holding the predicted association records
    input: PathBuf,

    /// Merge tolerance for near-coincident peaks in ppm
    #[arg(long, default_value_t = 0.15)]
    merge_tolerance: f64,

    /// Spectrometer reference frequency in MHz
    #[arg(long, default_value_t = 500.0)]
    frequency: f64,

    /// Line width (FWHM) in ppm
    #[arg(long, default_value_t = 0.004)]
    fwhm: f64,

    /// Lower bound of the chemical shift axis in ppm
    #[arg(long, default_value_t = 0.0)]
    ppm_min: f64,

    /// Upper bound of the chemical shift axis in ppm
    #[arg(long, default_value_t = 10.0)]
    ppm_max: f64,

    /// Number of samples on the axis
    #[arg(long, default_value_t = 64000)]
    resolution: usize,

    /// Number of synthesis workers
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Deadline for one synthesis call in seconds
    #[arg(long, default_value_t = 300)]
    timeout: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.input)
        .unwrap_or_else(|e| panic!("could not open {}: {}", args.input.display(), e));
    let records: Vec<AssociationRecord> = serde_json::from_reader(BufReader::new(file))
        .unwrap_or_else(|e| panic!("could not parse {}: {}", args.input.display(), e));

    log::info!(
        "loaded {} association records from {}",
        records.len(),
        args.input.display()
    );

    let params = SynthesisParams {
        merge_tolerance_ppm: args.merge_tolerance,
        spectrometer_freq_mhz: args.frequency,
        fwhm_ppm: args.fwhm,
        ppm_min: args.ppm_min,
        ppm_max: args.ppm_max,
        resolution: args.resolution,
        ..SynthesisParams::default()
    };
    let config = ServiceConfig {
        num_threads: args.threads,
        timeout_seconds: args.timeout,
    };

    let input_key = "cli";
    let model = ModelHandle::new(Arc::new(TabulatedModel::single(input_key, records)));
    let predictor = Predictor::new(model, params).expect("synthesis parameters rejected");
    let service = PredictionService::new(predictor, &config).expect("worker pool rejected");

    match service.predict(input_key) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response).unwrap());
        }
        Err(error) => {
            log::error!("prediction failed: {}", error);
            std::process::exit(1);
        }
    }
}
