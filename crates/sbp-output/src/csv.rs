//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `national_series.csv`
//! - `municipality_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{MunicipalityYearRow, NationalYearRow, OutputResult};

pub const NATIONAL_FILE: &str = "national_series.csv";
pub const MUNICIPALITY_FILE: &str = "municipality_snapshots.csv";

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    national:       Writer<File>,
    municipalities: Writer<File>,
    finished:       bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut national = Writer::from_path(dir.join(NATIONAL_FILE))?;
        national.write_record([
            "year",
            "yearly_hectares",
            "cumulative_hectares",
            "cumulative_fraction",
            "adopted",
            "not_adopted",
            "blocked",
        ])?;

        let mut municipalities = Writer::from_path(dir.join(MUNICIPALITY_FILE))?;
        municipalities.write_record([
            "year",
            "municipality_id",
            "municipality",
            "district",
            "pastures_area_ha",
            "yearly_fraction",
            "yearly_hectares",
            "cumulative_fraction",
            "cumulative_hectares",
        ])?;

        Ok(Self {
            national,
            municipalities,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_national(&mut self, row: &NationalYearRow) -> OutputResult<()> {
        self.national.write_record(&[
            row.year.to_string(),
            row.yearly_hectares.to_string(),
            row.cumulative_hectares.to_string(),
            row.cumulative_fraction.to_string(),
            row.adopted.to_string(),
            row.not_adopted.to_string(),
            row.blocked.to_string(),
        ])?;
        Ok(())
    }

    fn write_municipalities(&mut self, rows: &[MunicipalityYearRow]) -> OutputResult<()> {
        for row in rows {
            self.municipalities.write_record(&[
                row.year.to_string(),
                row.municipality_id.to_string(),
                row.name.clone(),
                row.district.clone(),
                row.pastures_area.to_string(),
                row.yearly_fraction.to_string(),
                row.yearly_hectares.to_string(),
                row.cumulative_fraction.to_string(),
                row.cumulative_hectares.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.national.flush()?;
        self.municipalities.flush()?;
        Ok(())
    }
}
