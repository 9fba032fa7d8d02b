//! Export of the generation log to CSV and JSON files.

use std::fs::{File, create_dir_all};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::statistics::{Logbook, RecordStats};

/// Objective count of a log, taken from the first record carrying scores
fn objective_count(logbook: &Logbook) -> usize {
    logbook
        .records()
        .iter()
        .find_map(|r| match (&r.best, &r.stats) {
            (Some(best), _) => Some(best.len()),
            (None, Some(RecordStats::Numeric(s))) => Some(s.avg.len()),
            _ => None,
        })
        .unwrap_or(0)
}

fn header(n_obj: usize) -> Vec<String> {
    let mut cols: Vec<String> =
        ["gen", "nevals", "changed", "excluded"].iter().map(|s| s.to_string()).collect();
    for prefix in ["best", "avg", "std", "min", "max"] {
        cols.extend((0..n_obj).map(|k| format!("{}_{}", prefix, k)));
    }
    cols
}

fn push_values(row: &mut Vec<String>, values: Option<&[f64]>, n_obj: usize) {
    for k in 0..n_obj {
        row.push(values.and_then(|v| v.get(k)).map(|x| x.to_string()).unwrap_or_default());
    }
}

/// Write one row per generation.
///
/// Columns: `gen,nevals,changed,excluded` then `best_k`, `avg_k`, `std_k`,
/// `min_k`, `max_k` for each objective `k`. Missing values are left empty.
pub fn save_logbook_csv<P: AsRef<Path>>(logbook: &Logbook, path: P) -> Result<()> {
    let n_obj = objective_count(logbook);
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(header(n_obj))?;

    for record in logbook.records() {
        let mut row = vec![
            record.generation.to_string(),
            record.nevals.to_string(),
            record.changed.to_string(),
            record.excluded.to_string(),
        ];
        push_values(&mut row, record.best.as_deref(), n_obj);
        let numeric = match &record.stats {
            Some(RecordStats::Numeric(s)) => Some(s),
            _ => None,
        };
        push_values(&mut row, numeric.map(|s| s.avg.as_slice()), n_obj);
        push_values(&mut row, numeric.map(|s| s.std.as_slice()), n_obj);
        push_values(&mut row, numeric.map(|s| s.min.as_slice()), n_obj);
        push_values(&mut row, numeric.map(|s| s.max.as_slice()), n_obj);
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Serialize the whole log, including raw individual dumps
pub fn save_logbook_json<P: AsRef<Path>>(logbook: &Logbook, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, logbook)?;
    Ok(())
}

pub fn load_logbook_json<P: AsRef<Path>>(path: P) -> Result<Logbook> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write `<name>.csv` and `<name>.json` into `dir`, or into the records
/// directory under `METRIC_EVOLVE_DIR` when `dir` is `None`.
///
/// Returns the CSV path.
pub fn save_to_records_dir(logbook: &Logbook, name: &str, dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(d) => {
            create_dir_all(d)?;
            d.to_path_buf()
        }
        None => metric_evolve_env::records_dir()?,
    };
    let csv_path = dir.join(format!("{}.csv", name));
    save_logbook_csv(logbook, &csv_path)?;
    save_logbook_json(logbook, dir.join(format!("{}.json", name)))?;
    log::info!("generation log saved to {}", csv_path.display());
    Ok(csv_path)
}
