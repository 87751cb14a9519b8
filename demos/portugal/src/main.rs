//! portugal — runs the SBP adoption simulation over Portuguese municipalities.
//!
//! ```text
//! portugal [run.json]
//! ```
//!
//! With a run file, the dataset and the fitted linear models are read from
//! disk.  Without one, a small synthetic dataset of eight Alentejo and
//! interior municipalities is written to `output/portugal/synthetic` and
//! simulated with built-in coefficients.
//!
//! Log verbosity follows `RUST_LOG` (default `info`; `debug` logs every
//! municipality decision).

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sbp_agent::MunicipalityStoreBuilder;
use sbp_behavior::{AdoptionModels, LinearClassifier, LinearRegressor};
use sbp_core::features::{MUNICIPAL_CUMULATIVE_ADOPTION, NATIONAL_CUMULATIVE_ADOPTION, PAYMENT};
use sbp_core::{SimConfig, Year};
use sbp_data::loader::{
    ADOPTION_FILE, CENSUS_FILE, CLIMATE_FILE, MUNICIPALITIES_FILE, PASTURES_FILE, PAYMENTS_FILE,
    SOIL_FILE,
};
use sbp_data::{DatasetLayout, load_dataset, load_feature_names};
use sbp_output::{OutputWriter, SimOutputObserver};
use sbp_sim::{SimBuilder, SimObserver, YearSnapshot, YearSummary};

#[cfg(not(feature = "sqlite"))]
use sbp_output::CsvWriter as Writer;
#[cfg(feature = "sqlite")]
use sbp_output::SqliteWriter as Writer;

type Models = AdoptionModels<LinearClassifier, LinearRegressor>;

// ── Run file ──────────────────────────────────────────────────────────────────

/// JSON run description.  Paths are taken as given (relative to the working
/// directory).
#[derive(Deserialize)]
struct RunFile {
    data_dir:            PathBuf,
    classifier_model:    PathBuf,
    classifier_features: PathBuf,
    regressor_model:     PathBuf,
    regressor_features:  PathBuf,
    #[serde(default = "default_output_dir")]
    output_dir:          PathBuf,
    /// Restrict payments to `municipalities_eligible.csv`.
    #[serde(default)]
    eligibility:         bool,
    #[serde(default)]
    sim:                 SimConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/portugal")
}

fn read_run_file(path: &Path) -> Result<(RunFile, Models)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading run file {}", path.display()))?;
    let run: RunFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing run file {}", path.display()))?;

    let models = AdoptionModels::new(
        LinearClassifier::from_path(&run.classifier_model)?,
        load_feature_names(&run.classifier_features)?,
        LinearRegressor::from_path(&run.regressor_model)?,
        load_feature_names(&run.regressor_features)?,
    )?;
    Ok((run, models))
}

// ── Synthetic dataset ─────────────────────────────────────────────────────────

const SYNTHETIC: &[(&str, &str, f64)] = &[
    ("Mértola", "Beja", 62_000.0),
    ("Serpa", "Beja", 48_500.0),
    ("Castro Verde", "Beja", 39_000.0),
    ("Alcoutim", "Faro", 21_000.0),
    ("Évora", "Évora", 55_000.0),
    ("Montemor-o-Novo", "Évora", 71_000.0),
    ("Elvas", "Portalegre", 33_500.0),
    ("Idanha-a-Nova", "Castelo Branco", 80_000.0),
];

/// Write the synthetic tables to `dir` and return a run over them together
/// with built-in models.
fn synthetic_run(dir: &Path) -> Result<(RunFile, Models)> {
    fs::create_dir_all(dir)?;
    let years = 1995..=2012u16;

    let mut municipalities = String::from("Municipality,District\n");
    let mut pastures = String::from("Municipality,Year,pastures_area_munic_ha\n");
    let mut census = String::from("Municipality,Year,lu_cattle,educ_none,farmers_over65\n");
    let mut adoption = String::from("Municipality,1995\n");
    let mut climate = String::from(
        "Municipality,av_d_max_t_average_summer,cons_days_no_prec_average_summer\n",
    );
    let mut soil = String::from("Municipality,clay_mean_munic,pH_mean_munic\n");

    for (i, &(name, district, area)) in SYNTHETIC.iter().enumerate() {
        let k = i as f64;
        writeln!(municipalities, "{name},{district}")?;
        for year in years.clone() {
            let drift = 1.0 + 0.004 * f64::from(year - 1995);
            writeln!(pastures, "{name},{year},{:.1}", area * drift)?;
            writeln!(
                census,
                "{name},{year},{:.3},{:.3},{:.3}",
                0.25 + 0.05 * k,
                0.30 - 0.02 * k,
                0.40 + 0.01 * k
            )?;
        }
        writeln!(adoption, "{name},{:.4}", 0.001 * (k % 3.0))?;
        writeln!(climate, "{name},{:.1},{:.0}", 30.5 + 0.4 * k, 70.0 + 3.0 * k)?;
        writeln!(soil, "{name},{:.3},6.1", 0.18 + 0.02 * k)?;
    }

    let mut payments = String::from("Year,sbp_payment\n");
    for year in 1996..=2012u16 {
        let payment = if year < 2009 { 100.0 } else { 200.0 };
        writeln!(payments, "{year},{payment}")?;
    }

    for (file, text) in [
        (MUNICIPALITIES_FILE, &municipalities),
        (PASTURES_FILE, &pastures),
        (CENSUS_FILE, &census),
        (ADOPTION_FILE, &adoption),
        (CLIMATE_FILE, &climate),
        (SOIL_FILE, &soil),
        (PAYMENTS_FILE, &payments),
    ] {
        fs::write(dir.join(file), text)?;
    }

    let classifier_features = vec![
        NATIONAL_CUMULATIVE_ADOPTION.to_owned(),
        MUNICIPAL_CUMULATIVE_ADOPTION.to_owned(),
        "lu_cattle".to_owned(),
        "av_d_max_t_average_summer".to_owned(),
        "clay_mean_munic".to_owned(),
    ];
    let regressor_features = vec![
        PAYMENT.to_owned(),
        MUNICIPAL_CUMULATIVE_ADOPTION.to_owned(),
        "lu_cattle".to_owned(),
    ];
    let models = AdoptionModels::new(
        LinearClassifier::new(-9.0, vec![40.0, 25.0, 2.0, 0.2, 4.0]),
        classifier_features,
        LinearRegressor::new(0.001, vec![0.00002, 0.05, 0.004]),
        regressor_features,
    )?;

    let run = RunFile {
        data_dir:            dir.to_path_buf(),
        classifier_model:    PathBuf::new(),
        classifier_features: PathBuf::new(),
        regressor_model:     PathBuf::new(),
        regressor_features:  PathBuf::new(),
        output_dir:          default_output_dir(),
        eligibility:         false,
        sim:                 SimConfig { output_interval_years: 4, ..SimConfig::default() },
    };
    Ok((run, models))
}

// ── Observer wrapper to keep the yearly summaries ─────────────────────────────

struct SummaryObserver<W: OutputWriter> {
    inner:          SimOutputObserver<W>,
    years:          Vec<YearSummary>,
    snapshot_rows:  usize,
}

impl<W: OutputWriter> SummaryObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, years: Vec::new(), snapshot_rows: 0 }
    }
}

impl<W: OutputWriter> SimObserver for SummaryObserver<W> {
    fn on_sim_start(&mut self, baseline: &YearSnapshot) {
        self.snapshot_rows += baseline.municipalities.len();
        self.inner.on_sim_start(baseline);
    }

    fn on_year_end(&mut self, summary: &YearSummary) {
        self.years.push(*summary);
        self.inner.on_year_end(summary);
    }

    fn on_snapshot(&mut self, snapshot: &YearSnapshot) {
        self.snapshot_rows += snapshot.municipalities.len();
        self.inner.on_snapshot(snapshot);
    }

    fn on_sim_end(&mut self, final_year: Year) {
        self.inner.on_sim_end(final_year);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1. Run description and models.
    let (run, models) = match std::env::args_os().nth(1) {
        Some(path) => read_run_file(Path::new(&path))?,
        None => {
            info!("no run file given; using the synthetic dataset");
            synthetic_run(Path::new("output/portugal/synthetic"))?
        }
    };
    let config = run.sim;
    config.validate()?;

    // 2. Dataset.
    let layout = if run.eligibility {
        DatasetLayout::default().with_eligibility()
    } else {
        DatasetLayout::default()
    };
    let dataset = load_dataset(&run.data_dir, &layout, config.start_year)
        .with_context(|| format!("loading dataset from {}", run.data_dir.display()))?;

    // 3. Municipality ledgers.
    let (store, rngs) = MunicipalityStoreBuilder::new(config.start_year, config.seed)
        .reference_year(config.reference_year)
        .municipalities(dataset.records)
        .build()?;

    // 4. Sim.
    let mut sim = SimBuilder::new(config.clone(), store, rngs, models)
        .environments(dataset.environments)
        .payments(dataset.payments)
        .build()?;

    // 5. Output.
    fs::create_dir_all(&run.output_dir)?;
    let writer = Writer::new(&run.output_dir)?;
    let mut obs = SummaryObserver::new(SimOutputObserver::new(writer));

    // 6. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        return Err(e).context("writing simulation output");
    }

    // 7. Summary.
    println!();
    println!(
        "Simulated {}‥{} for {} municipalities in {:.3} s",
        config.start_year,
        config.end_year().previous(),
        sim.municipalities.len(),
        elapsed.as_secs_f64()
    );
    println!(
        "Output in {}: {} national rows, {} municipality rows",
        run.output_dir.display(),
        obs.years.len() + 1,
        obs.snapshot_rows
    );
    println!();
    println!(
        "{:<6} {:>8} {:>12} {:>8} {:>14} {:>16} {:>10}",
        "Year", "Adopted", "Not adopted", "Blocked", "Yearly ha", "Cumulative ha", "Fraction"
    );
    println!("{}", "-".repeat(80));
    for s in &obs.years {
        println!(
            "{:<6} {:>8} {:>12} {:>8} {:>14.1} {:>16.1} {:>10.4}",
            s.year,
            s.adopted,
            s.not_adopted,
            s.blocked,
            s.yearly_hectares,
            s.cumulative_hectares,
            s.cumulative_fraction
        );
    }

    // 8. Leading municipalities.
    let mut ranked: Vec<_> = sim.municipalities.iter().collect();
    ranked.sort_by(|a, b| b.cumulative_hectares.total_cmp(&a.cumulative_hectares));
    println!();
    println!("{:<20} {:<16} {:>14} {:>10}", "Municipality", "District", "Cumulative ha", "Fraction");
    println!("{}", "-".repeat(63));
    for m in ranked.iter().take(10) {
        println!(
            "{:<20} {:<16} {:>14.1} {:>10.4}",
            m.name, m.district, m.cumulative_hectares, m.cumulative_fraction
        );
    }

    Ok(())
}
