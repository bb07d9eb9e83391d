//! Build a dictionary over a column file and persist the encoded column.

use std::{path::PathBuf, time::Instant};

use serde_json::json;
use tracing::info;

use super::common::{ReadColumnError, StoreConfig, read_column};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Column(#[from] ReadColumnError),

    #[error(transparent)]
    Codec(#[from] dictcodec::Error),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    /// Column to encode, one value per line
    #[clap(
        long = "column-file",
        env = "DICTCODEC_COLUMN_FILE",
        default_value = "Column.txt"
    )]
    column_file: PathBuf,

    #[clap(flatten)]
    store: StoreConfig,

    /// Number of parallel workers used to build the dictionary and encode
    /// the column. Defaults to the number of CPUs.
    #[clap(
        long = "worker-count",
        env = "DICTCODEC_WORKER_COUNT",
        default_value_t = num_cpus::get()
    )]
    worker_count: usize,

    /// Only encode the first N rows of the column file
    #[clap(long = "max-rows", env = "DICTCODEC_MAX_ROWS")]
    max_rows: Option<usize>,
}

pub(crate) fn command(config: Config) -> Result<()> {
    let Config {
        column_file,
        store,
        worker_count,
        max_rows,
    } = config;

    let start = Instant::now();
    let rows = read_column(&column_file, max_rows)?;
    let read = start.elapsed();
    info!(
        column_file = %column_file.display(),
        rows = rows.len(),
        elapsed = ?read,
        "read column"
    );

    let start = Instant::now();
    let dictionary = dictcodec::build_dictionary(&rows, worker_count)?;
    let build = start.elapsed();

    let start = Instant::now();
    let encoded = dictcodec::encode(&rows, &dictionary, worker_count)?;
    let encode = start.elapsed();

    let start = Instant::now();
    dictcodec::persist(&dictionary, &encoded, &store.dictionary_file, &store.data_file)?;
    let persist = start.elapsed();

    let summary = json!({
        "rows": encoded.len(),
        "distinct": dictionary.len(),
        "worker_count": worker_count,
        "elapsed_ms": {
            "read": read.as_secs_f64() * 1e3,
            "build": build.as_secs_f64() * 1e3,
            "encode": encode.as_secs_f64() * 1e3,
            "persist": persist.as_secs_f64() * 1e3,
        },
    });
    println!("{summary}");

    Ok(())
}
