//! Persistence of a [`Dictionary`] and its [`EncodedColumn`] as a pair of
//! line-oriented files.
//!
//! The dictionary file holds one `code,value` record per line in ascending
//! code order. The data file holds one decimal code per line in row order.
//! Records are split on the first `,` only, so values may themselves contain
//! commas. Only the `\n` terminating each line is stripped on load.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
    time::Instant,
};

use tracing::{debug, info};

use crate::{Dictionary, EncodedColumn, Error, Result};

const DELIMITER: char = ',';

/// Why a persisted record could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatErrorKind {
    #[error("missing ',' between code and value")]
    MissingDelimiter,

    #[error("{text:?} is not a valid code")]
    InvalidCode { text: String },

    #[error("expected code {expected}, found {found}")]
    OutOfSequence { expected: usize, found: u32 },

    #[error("value {value:?} does not sort after the value before it")]
    UnsortedValue { value: String },

    #[error("code {code} is outside a dictionary of {len} values")]
    CodeOutOfRange { code: u32, len: usize },
}

pub(crate) fn persist(
    dictionary: &Dictionary,
    encoded: &EncodedColumn,
    dict_path: &Path,
    data_path: &Path,
) -> Result<()> {
    let start = Instant::now();

    // nothing is written unless every value fits on one line
    if let Some((code, _)) = dictionary.iter().find(|(_, value)| value.contains('\n')) {
        return Err(Error::Unpersistable { code });
    }

    write_lines(dict_path, dictionary.iter(), |w, (code, value)| {
        writeln!(w, "{code}{DELIMITER}{value}")
    })?;
    write_lines(data_path, encoded.codes().iter(), |w, code| writeln!(w, "{code}"))?;

    info!(
        dictionary_file = %dict_path.display(),
        data_file = %data_path.display(),
        distinct = dictionary.len(),
        rows = encoded.len(),
        elapsed = ?start.elapsed(),
        "persisted encoded column"
    );
    Ok(())
}

pub(crate) fn load(dict_path: &Path, data_path: &Path) -> Result<(Dictionary, EncodedColumn)> {
    let start = Instant::now();

    let mut values: Vec<String> = vec![];
    for_each_record(dict_path, |line, record| {
        let (code, value) = record
            .split_once(DELIMITER)
            .ok_or_else(|| format_error(dict_path, line, FormatErrorKind::MissingDelimiter))?;
        let code = parse_code(code).map_err(|kind| format_error(dict_path, line, kind))?;

        if code as usize != values.len() {
            return Err(format_error(
                dict_path,
                line,
                FormatErrorKind::OutOfSequence {
                    expected: values.len(),
                    found: code,
                },
            ));
        }
        if values.last().is_some_and(|previous| previous.as_str() >= value) {
            return Err(format_error(
                dict_path,
                line,
                FormatErrorKind::UnsortedValue {
                    value: value.to_string(),
                },
            ));
        }

        values.push(value.to_string());
        Ok(())
    })?;

    let dictionary = Dictionary::from_sorted_values(values)?;
    debug!(
        dictionary_file = %dict_path.display(),
        distinct = dictionary.len(),
        "loaded dictionary"
    );

    let mut codes = vec![];
    for_each_record(data_path, |line, record| {
        let code = parse_code(record).map_err(|kind| format_error(data_path, line, kind))?;
        if code as usize >= dictionary.len() {
            return Err(format_error(
                data_path,
                line,
                FormatErrorKind::CodeOutOfRange {
                    code,
                    len: dictionary.len(),
                },
            ));
        }
        codes.push(code);
        Ok(())
    })?;

    let encoded = EncodedColumn::from(codes);
    info!(
        dictionary_file = %dict_path.display(),
        data_file = %data_path.display(),
        distinct = dictionary.len(),
        rows = encoded.len(),
        elapsed = ?start.elapsed(),
        "loaded encoded column"
    );
    Ok((dictionary, encoded))
}

fn write_lines<I, F>(path: &Path, items: I, mut write_one: F) -> Result<()>
where
    I: IntoIterator,
    F: FnMut(&mut BufWriter<File>, I::Item) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        write_one(&mut writer, item).map_err(|e| Error::io(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))
}

// Calls `f` with the 1-based line number and the contents of every line in
// `path`, minus the trailing `\n`.
fn for_each_record<F>(path: &Path, mut f: F) -> Result<()>
where
    F: FnMut(usize, &str) -> Result<()>,
{
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();
    let mut line = 0;

    loop {
        buf.clear();
        if reader.read_line(&mut buf).map_err(|e| Error::io(path, e))? == 0 {
            return Ok(());
        }
        line += 1;
        f(line, buf.strip_suffix('\n').unwrap_or(&buf))?;
    }
}

// Only plain decimal digits, the form `persist` writes, are accepted.
fn parse_code(text: &str) -> Result<u32, FormatErrorKind> {
    let invalid = || FormatErrorKind::InvalidCode {
        text: text.to_string(),
    };
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    text.parse().map_err(|_| invalid())
}

fn format_error(path: &Path, line: usize, kind: FormatErrorKind) -> Error {
    Error::Format {
        path: path.to_path_buf(),
        line,
        kind,
    }
}
