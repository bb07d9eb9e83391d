//! Arguments and helpers shared by the subcommands.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

/// Locations of a persisted dictionary and encoded column.
#[derive(Debug, clap::Parser)]
pub(crate) struct StoreConfig {
    /// Dictionary file, one `code,value` record per line
    #[clap(
        long = "dictionary-file",
        env = "DICTCODEC_DICTIONARY_FILE",
        default_value = "dictionary.txt"
    )]
    pub(crate) dictionary_file: PathBuf,

    /// Encoded data file, one code per line
    #[clap(
        long = "data-file",
        env = "DICTCODEC_DATA_FILE",
        default_value = "encoded_data.txt"
    )]
    pub(crate) data_file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to read column file {}: {source}", path.display())]
pub(crate) struct ReadColumnError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

/// Read a column file holding one value per line, keeping at most `max_rows`
/// values.
///
/// A value is everything on its line except the `\n` or `\r\n` terminator.
pub(crate) fn read_column(
    path: &Path,
    max_rows: Option<usize>,
) -> Result<Vec<String>, ReadColumnError> {
    let to_error = |source| ReadColumnError {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(to_error)?);
    let mut rows = vec![];
    let mut line = String::new();

    while max_rows.is_none_or(|max_rows| rows.len() < max_rows) {
        line.clear();
        if reader.read_line(&mut line).map_err(to_error)? == 0 {
            break;
        }
        let row = match line.strip_suffix('\n') {
            Some(row) => row.strip_suffix('\r').unwrap_or(row),
            None => &line,
        };
        rows.push(row.to_string());
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn column_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Column.txt");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn line_terminators() {
        let (_dir, path) = column_file("a\r\n b \n\nc\rd\nlast");
        assert_eq!(
            read_column(&path, None).unwrap(),
            vec!["a", " b ", "", "c\rd", "last"]
        );
    }

    #[test]
    fn max_rows() {
        let (_dir, path) = column_file("a\nb\nc\n");
        assert_eq!(read_column(&path, Some(2)).unwrap(), vec!["a", "b"]);
        assert_eq!(read_column(&path, Some(10)).unwrap(), vec!["a", "b", "c"]);
        assert!(read_column(&path, Some(0)).unwrap().is_empty());
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_column(&dir.path().join("nope.txt"), None).unwrap_err();
        assert!(err.to_string().contains("nope.txt"), "{err}");
    }
}
