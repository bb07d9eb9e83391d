//! Answer an exact or prefix query against a persisted encoded column.

use std::{path::PathBuf, time::Instant};

use clap::ValueEnum;
use dictcodec::{DictionaryQuery, RawScan, ScanStrategy, StringQuery};
use serde_json::Value;
use tracing::info;

use super::common::{ReadColumnError, StoreConfig, read_column};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Column(#[from] ReadColumnError),

    #[error(transparent)]
    Codec(#[from] dictcodec::Error),

    #[error("the raw strategy needs a `--column-file` to scan")]
    NoColumnFile,

    #[error("failed to serialize the result: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, clap::Parser)]
#[clap(visible_alias = "q")]
pub(crate) struct Config {
    /// Whether `value` must match whole rows or only their beginning
    #[clap(value_enum)]
    kind: QueryKind,

    /// The value, or prefix, to look for
    value: String,

    #[clap(flatten)]
    store: StoreConfig,

    /// How the column is scanned
    ///
    /// `raw` compares the strings of `--column-file` directly and ignores
    /// the persisted files.
    #[clap(value_enum, long = "strategy", default_value_t = Strategy::Vectorized)]
    strategy: Strategy,

    /// Unencoded column scanned by the raw strategy
    #[clap(
        long = "column-file",
        env = "DICTCODEC_COLUMN_FILE",
        required_if_eq("strategy", "raw")
    )]
    column_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QueryKind {
    Exact,
    Prefix,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    Scalar,
    Vectorized,
    Raw,
}

pub(crate) fn command(config: Config) -> Result<()> {
    let output = match config.strategy {
        Strategy::Raw => {
            let Some(column_file) = &config.column_file else {
                return Err(Error::NoColumnFile);
            };
            let rows = read_column(column_file, None)?;
            run(&RawScan::new(&rows), config.kind, &config.value)?
        }
        Strategy::Scalar | Strategy::Vectorized => {
            let (dictionary, encoded) =
                dictcodec::load(&config.store.dictionary_file, &config.store.data_file)?;
            let scan = match config.strategy {
                Strategy::Scalar => ScanStrategy::Scalar,
                _ => ScanStrategy::Vectorized,
            };
            let query = DictionaryQuery::new(&dictionary, &encoded).with_strategy(scan);
            run(&query, config.kind, &config.value)?
        }
    };

    println!("{output}");
    Ok(())
}

fn run(query: &dyn StringQuery, kind: QueryKind, value: &str) -> Result<Value> {
    let start = Instant::now();
    let output = match kind {
        QueryKind::Exact => serde_json::to_value(query.exact(value)?)?,
        QueryKind::Prefix => serde_json::to_value(query.prefix(value)?)?,
    };
    info!(?kind, value, elapsed = ?start.elapsed(), "query complete");
    Ok(output)
}
