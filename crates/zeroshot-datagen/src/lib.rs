//! Synthetic CSV datasets for the 65 business data categories.
//!
//! Each category gets `files_per_category` files under
//! `{output_dir}/{key}_{name}/`. A file carries every core column of its
//! category plus a random non-empty subset of the optional ones, in random
//! order, and a random number of rows of header-appropriate fake values.
//! Columns of one record stay consistent with each other, and columns that
//! are optional in practice are sometimes left blank. Files are UTF-8 with
//! a BOM so spreadsheet tools detect the encoding.

pub mod row;
pub mod schema;
pub mod values;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use row::RowTemplate;
pub use schema::{CATEGORIES, CategorySchema, find};

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("min_rows ({min}) is greater than max_rows ({max})")]
    InvalidRows { min: usize, max: usize },

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("creating {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What to generate and where.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output_dir: PathBuf,
    pub files_per_category: usize,
    pub min_rows: usize,
    pub max_rows: usize,
    /// Category keys, names or numbers; empty means all 65.
    pub categories: Vec<String>,
    /// Fixed seed for reproducible output.
    pub seed: Option<u64>,
    /// Reference time for every generated date.
    pub now: NaiveDateTime,
}

impl GenerateOptions {
    /// Defaults: 100 files per category, 50 to 200 rows each, all categories.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            files_per_category: 100,
            min_rows: 50,
            max_rows: 200,
            categories: Vec::new(),
            seed: None,
            now: chrono::Local::now().naive_local(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub categories: usize,
    pub files_written: usize,
    pub files_failed: usize,
    pub rows: usize,
    pub elapsed: Duration,
}

/// Write every requested category. A file that fails to write is logged
/// and counted; only option errors and unusable category directories
/// abort the run.
pub fn generate(opts: &GenerateOptions) -> Result<GenerateStats, GenerateError> {
    if opts.min_rows > opts.max_rows {
        return Err(GenerateError::InvalidRows {
            min: opts.min_rows,
            max: opts.max_rows,
        });
    }
    let selected = select_categories(&opts.categories)?;
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let start = Instant::now();
    let mut stats = GenerateStats::default();
    info!(
        categories = selected.len(),
        files_per_category = opts.files_per_category,
        output = %opts.output_dir.display(),
        "generating datasets"
    );

    for category in selected {
        let dir = opts
            .output_dir
            .join(format!("{}_{}", category.key, category.name));
        fs::create_dir_all(&dir).map_err(|source| GenerateError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        for i in 1..=opts.files_per_category {
            let path = dir.join(format!("{}_{i}.csv", category.name));
            let rows = rng.random_range(opts.min_rows..=opts.max_rows);
            match write_file(&path, category, rows, &mut rng, opts.now) {
                Ok(()) => {
                    stats.files_written += 1;
                    stats.rows += rows;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to write dataset file");
                    stats.files_failed += 1;
                }
            }
        }
        stats.categories += 1;
        debug!(category = category.key, "category done");
    }

    stats.elapsed = start.elapsed();
    info!(
        files = stats.files_written,
        failed = stats.files_failed,
        rows = stats.rows,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "generation finished"
    );
    Ok(stats)
}

/// Categories named by `queries`, in catalogue order, without duplicates.
pub fn select_categories(queries: &[String]) -> Result<Vec<&'static CategorySchema>, GenerateError> {
    if queries.is_empty() {
        return Ok(CATEGORIES.iter().collect());
    }
    for q in queries {
        if find(q).is_none() {
            return Err(GenerateError::UnknownCategory(q.clone()));
        }
    }
    Ok(CATEGORIES
        .iter()
        .filter(|c| queries.iter().any(|q| c.matches(q)))
        .collect())
}

/// Core columns plus a random non-empty subset of the optional ones, shuffled.
pub fn select_headers<R: Rng + ?Sized>(
    category: &CategorySchema,
    rng: &mut R,
) -> Vec<&'static str> {
    let mut headers = category.core.to_vec();
    if !category.optional.is_empty() {
        let n = rng.random_range(1..=category.optional.len());
        headers.extend(category.optional.choose_multiple(rng, n).copied());
    }
    headers.shuffle(rng);
    headers
}

fn write_file<R: Rng + ?Sized>(
    path: &Path,
    category: &CategorySchema,
    rows: usize,
    rng: &mut R,
    now: NaiveDateTime,
) -> Result<(), csv::Error> {
    let template = RowTemplate::new(select_headers(category, rng));

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(BOM)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(template.headers())?;
    for _ in 0..rows {
        writer.write_record(&template.row(&mut *rng, now))?;
    }
    writer.flush()?;
    Ok(())
}
