use std::path::{Path, PathBuf};

use duckdb::Connection;

use crate::error::{ForecastError, Result};

/// Untyped rows as they come out of a file or request body. Cells are text;
/// the loader decides how to coerce them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut row: Vec<Option<String>> = cells.into_iter().map(|c| c.map(Into::into)).collect();
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }
}

pub trait PanelSource {
    fn load_table(&self) -> Result<RawTable>;
    fn describe(&self) -> String;
}

impl PanelSource for RawTable {
    fn load_table(&self) -> Result<RawTable> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory table ({} rows)", self.rows.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Parquet,
    Csv,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "parquet" | "pq" => Some(FileFormat::Parquet),
            "csv" | "tsv" | "txt" => Some(FileFormat::Csv),
            _ => None,
        }
    }

    fn table_function(self) -> &'static str {
        match self {
            FileFormat::Parquet => "read_parquet",
            FileFormat::Csv => "read_csv_auto",
        }
    }
}

/// A Parquet or CSV file read through an in-memory DuckDB connection.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PanelSource for FileSource {
    fn load_table(&self) -> Result<RawTable> {
        let format = FileFormat::from_path(&self.path).ok_or_else(|| {
            ForecastError::Source(format!(
                "unsupported file type for {} (expected .parquet or .csv)",
                self.path.display()
            ))
        })?;
        if !self.path.is_file() {
            return Err(ForecastError::Source(format!(
                "{} does not exist",
                self.path.display()
            )));
        }

        let conn = Connection::open_in_memory()?;
        let relation = format!(
            "{}({})",
            format.table_function(),
            sql_string(&self.path.to_string_lossy())
        );

        let mut describe = conn.prepare(&format!("DESCRIBE SELECT * FROM {}", relation))?;
        let columns: Vec<String> = describe
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<_, _>>()?;
        if columns.is_empty() {
            return Ok(RawTable::default());
        }

        let projection = columns
            .iter()
            .map(|c| format!("CAST({} AS VARCHAR)", sql_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        let width = columns.len();
        let mut select = conn.prepare(&format!("SELECT {} FROM {}", projection, relation))?;
        let rows: Vec<Vec<Option<String>>> = select
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(width);
                for i in 0..width {
                    cells.push(row.get::<_, Option<String>>(i)?);
                }
                Ok(cells)
            })?
            .collect::<std::result::Result<_, _>>()?;

        tracing::debug!(
            path = %self.path.display(),
            columns = width,
            rows = rows.len(),
            "Read tabular source"
        );
        Ok(RawTable { columns, rows })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn sql_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn sql_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}
