//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `national_series` and `municipality_snapshots`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{MunicipalityYearRow, NationalYearRow, OutputResult};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS national_series (
                 year                INTEGER PRIMARY KEY,
                 yearly_hectares     REAL    NOT NULL,
                 cumulative_hectares REAL    NOT NULL,
                 cumulative_fraction REAL    NOT NULL,
                 adopted             INTEGER NOT NULL,
                 not_adopted         INTEGER NOT NULL,
                 blocked             INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS municipality_snapshots (
                 year                INTEGER NOT NULL,
                 municipality_id     INTEGER NOT NULL,
                 municipality        TEXT    NOT NULL,
                 district            TEXT    NOT NULL,
                 pastures_area_ha    REAL    NOT NULL,
                 yearly_fraction     REAL    NOT NULL,
                 yearly_hectares     REAL    NOT NULL,
                 cumulative_fraction REAL    NOT NULL,
                 cumulative_hectares REAL    NOT NULL,
                 PRIMARY KEY (year, municipality_id)
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_national(&mut self, row: &NationalYearRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO national_series \
             (year, yearly_hectares, cumulative_hectares, cumulative_fraction, \
              adopted, not_adopted, blocked) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                row.year,
                row.yearly_hectares,
                row.cumulative_hectares,
                row.cumulative_fraction,
                row.adopted,
                row.not_adopted,
                row.blocked,
            ],
        )?;
        Ok(())
    }

    fn write_municipalities(&mut self, rows: &[MunicipalityYearRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO municipality_snapshots \
                 (year, municipality_id, municipality, district, pastures_area_ha, \
                  yearly_fraction, yearly_hectares, cumulative_fraction, cumulative_hectares) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.year,
                    row.municipality_id,
                    row.name,
                    row.district,
                    row.pastures_area,
                    row.yearly_fraction,
                    row.yearly_hectares,
                    row.cumulative_fraction,
                    row.cumulative_hectares,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
