// src/table.rs

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Header written above the state-code column of new files.
pub const STATE_HEADER: &str = "state";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0} has no header row")]
    NoHeader(PathBuf),
    #[error("column has {found} cells but the table has {expected} rows")]
    Length { expected: usize, found: usize },
    #[error("row {row} is state `{expected}` but the new column has `{found}`")]
    Misaligned {
        row: usize,
        expected: String,
        found: String,
    },
    #[error("column `{0}` already exists")]
    DuplicateColumn(String),
    #[error("row {row} has {found} cells but the header has {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> TableError + '_ {
    move |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// A results file held in memory: one row per state, one column per run.
///
/// Columns are only ever appended. A new column is merged by row position,
/// and the merge checks the state code of every row so a reordered or
/// foreign file is refused instead of silently shifted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultsTable {
    /// A table with the state-code column only.
    pub fn new<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            headers: vec![STATE_HEADER.to_string()],
            rows: codes.into_iter().map(|c| vec![c.to_string()]).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path).map_err(io_err(path))?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(TableError::NoHeader(path.to_path_buf()));
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        debug!(path = %path.display(), rows = rows.len(), columns = headers.len(), "loaded table");
        Ok(Self { headers, rows })
    }

    /// Load `path` if it exists, otherwise start a fresh table over `codes`.
    pub fn load_or_new<'a>(
        path: &Path,
        codes: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, TableError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::new(codes))
        }
    }

    /// State codes in row order, without surrounding whitespace.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(|r| r.first().map(|c| c.trim()).unwrap_or(""))
    }

    /// Labels of the data columns (everything after the state column).
    pub fn columns(&self) -> &[String] {
        &self.headers[1..]
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, state: &str, column: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == column)?;
        self.rows
            .iter()
            .find(|r| r.first().map(|c| c.trim()) == Some(state))
            .and_then(|r| r.get(col))
            .map(String::as_str)
    }

    /// Append one column. `cells` must list the table's states in row order;
    /// `None` is written as an empty cell.
    pub fn append_column(
        &mut self,
        label: &str,
        cells: &[(&str, Option<u64>)],
    ) -> Result<(), TableError> {
        if self.headers.iter().any(|h| h == label) {
            return Err(TableError::DuplicateColumn(label.to_string()));
        }
        if cells.len() != self.rows.len() {
            return Err(TableError::Length {
                expected: self.rows.len(),
                found: cells.len(),
            });
        }
        for (row, (expected, (found, _))) in self.states().zip(cells).enumerate() {
            if !expected.eq_ignore_ascii_case(found) {
                return Err(TableError::Misaligned {
                    row,
                    expected: expected.to_string(),
                    found: found.to_string(),
                });
            }
        }

        let width = self.headers.len();
        if let Some((row, r)) = self.rows.iter().enumerate().find(|(_, r)| r.len() > width) {
            return Err(TableError::RowWidth {
                row,
                expected: width,
                found: r.len(),
            });
        }
        for (row, (_, count)) in self.rows.iter_mut().zip(cells) {
            // short rows from hand-edited files are padded so the new cell
            // lands under its header
            if row.len() < width {
                row.resize(width, String::new());
            }
            row.push(count.map(|n| n.to_string()).unwrap_or_default());
        }
        self.headers.push(label.to_string());
        Ok(())
    }

    /// Write the table to `path`, replacing any existing file in one rename.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err(dir))?;
        {
            let mut wtr = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(tmp.as_file_mut());
            wtr.write_record(&self.headers)?;
            for row in &self.rows {
                wtr.write_record(row)?;
            }
            wtr.flush().map_err(io_err(path))?;
        }
        tmp.as_file_mut().flush().map_err(io_err(path))?;
        tmp.persist(path).map_err(|e| TableError::Io {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        debug!(path = %path.display(), columns = self.headers.len() - 1, "saved table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CODES: [&str; 3] = ["AL", "AK", "AZ"];

    fn column(counts: [Option<u64>; 3]) -> Vec<(&'static str, Option<u64>)> {
        CODES.iter().copied().zip(counts).collect()
    }

    #[test]
    fn append_and_save_roundtrip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("t.csv");

        let mut table = ResultsTable::load_or_new(&path, CODES).unwrap();
        table
            .append_column("1-2-2024-3:4", &column([Some(10), None, Some(1234)]))
            .unwrap();
        table.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "state,1-2-2024-3:4\nAL,10\nAK,\nAZ,1234\n");

        let loaded = ResultsTable::load(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.cell("AZ", "1-2-2024-3:4"), Some("1234"));
    }

    #[test]
    fn existing_columns_are_kept() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("t.csv");
        fs::write(&path, "0,1-1-2024-0:0\nAL,1\nAK,2\nAZ,3\n").unwrap();

        let mut table = ResultsTable::load(&path).unwrap();
        table
            .append_column("1-8-2024-0:0", &column([Some(4), Some(5), Some(6)]))
            .unwrap();
        table.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "0,1-1-2024-0:0,1-8-2024-0:0\nAL,1,4\nAK,2,5\nAZ,3,6\n"
        );
    }

    #[test]
    fn misaligned_column_is_refused() {
        let mut table = ResultsTable::new(CODES);
        let cells = vec![("AL", Some(1)), ("AZ", Some(2)), ("AK", Some(3))];
        let err = table.append_column("x", &cells).unwrap_err();
        assert!(matches!(err, TableError::Misaligned { row: 1, .. }));
        assert!(table.columns().is_empty());
    }

    #[test]
    fn wrong_length_is_refused() {
        let mut table = ResultsTable::new(CODES);
        let err = table.append_column("x", &[("AL", Some(1))]).unwrap_err();
        assert!(matches!(err, TableError::Length { expected: 3, found: 1 }));
    }

    #[test]
    fn duplicate_label_is_refused() {
        let mut table = ResultsTable::new(CODES);
        table.append_column("x", &column([None; 3])).unwrap();
        let err = table.append_column("x", &column([None; 3])).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(l) if l == "x"));
    }

    #[test]
    fn stray_extra_cell_is_refused_and_file_kept() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("t.csv");
        let original = "state,c1\nAL,1\nAK,2,99\nAZ,3\n";
        fs::write(&path, original).unwrap();

        let mut table = ResultsTable::load(&path).unwrap();
        let err = table
            .append_column("c2", &column([Some(4), Some(5), Some(6)]))
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::RowWidth {
                row: 1,
                expected: 2,
                found: 3
            }
        ));
        assert_eq!(table.columns(), ["c1"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn short_rows_are_padded() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("t.csv");
        fs::write(&path, "state,c1,c2\nAL,1,2\nAK,3\nAZ,5,6\n").unwrap();

        let mut table = ResultsTable::load(&path).unwrap();
        table
            .append_column("c3", &column([Some(7), Some(8), Some(9)]))
            .unwrap();
        table.save(&path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "state,c1,c2,c3\nAL,1,2,7\nAK,3,,8\nAZ,5,6,9\n"
        );
    }

    #[test]
    fn existing_cells_keep_their_whitespace() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("t.csv");
        fs::write(&path, "state, c1\nAL , 1\nAK,2 \nAZ,3\n").unwrap();

        let mut table = ResultsTable::load(&path).unwrap();
        table
            .append_column("c2", &column([Some(4), Some(5), Some(6)]))
            .unwrap();
        table.save(&path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "state, c1,c2\nAL , 1,4\nAK,2 ,5\nAZ,3,6\n"
        );
        assert_eq!(table.cell("AL", "c2"), Some("4"));
    }

    #[test]
    fn empty_file_has_no_header() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            ResultsTable::load(&path),
            Err(TableError::NoHeader(_))
        ));
    }
}
