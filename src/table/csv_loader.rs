// src/table/csv_loader.rs
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use log::{debug, info};

use crate::config::subsystems::LoaderConfig;
use crate::error::{Error, Result};
use super::Table;

/// Loads a CSV file whose first column is a row identifier and whose
/// remaining columns are numeric attributes.
pub struct CsvLoader {
    delimiter: u8,
    trim: bool,
}

impl CsvLoader {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            trim: config.trim,
        }
    }

    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Table> {
        let path = path.as_ref();
        info!("Loading table from {:?}", path);
        let file = File::open(path)?;
        self.load_reader(BufReader::new(file))
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .trim(if self.trim { csv::Trim::All } else { csv::Trim::None })
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.len() < 2 {
            return Err(Error::data(format!(
                "expected an id column and at least one attribute column, found {} column(s)",
                headers.len()
            )));
        }

        let id_column = headers[0].to_string();
        let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        debug!("Id column {:?}, attributes {:?}", id_column, columns);

        let mut ids = Vec::new();
        let mut rows = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            // Header is line 1
            let line = index + 2;
            if record.len() != headers.len() {
                return Err(Error::data(format!(
                    "line {}: expected {} fields, found {}",
                    line,
                    headers.len(),
                    record.len()
                )));
            }

            ids.push(record[0].to_string());
            let mut row = Vec::with_capacity(columns.len());
            for (column, field) in columns.iter().zip(record.iter().skip(1)) {
                row.push(parse_value(field, column, line)?);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(Error::EmptyTable);
        }

        info!("Loaded {} rows with {} attributes", rows.len(), columns.len());
        Table::new(id_column, columns, ids, rows)
    }
}

fn parse_value(field: &str, column: &str, line: usize) -> Result<f64> {
    match field.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(Error::data(format!(
            "line {}: non-finite value {:?} in column {:?}",
            line, field, column
        ))),
        Err(_) => Err(Error::data(format!(
            "line {}: non-numeric value {:?} in column {:?}",
            line, field, column
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::AttributeTable;

    fn loader() -> CsvLoader {
        CsvLoader::new(&LoaderConfig::default())
    }

    #[test]
    fn first_column_is_the_row_id() {
        let csv = "ID,Milk,Eggs\nu1,1,0\nu2, 2.5 ,3\n";
        let table = loader().load_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.id_column(), "ID");
        assert_eq!(table.columns(), &["Milk".to_string(), "Eggs".to_string()]);
        assert_eq!(table.ids(), &["u1".to_string(), "u2".to_string()]);
        assert_eq!(table.value(1, 0), 2.5);
        assert_eq!(table.value(1, 1), 3.0);
    }

    #[test]
    fn non_numeric_cells_are_rejected() {
        let csv = "ID,a\n1,x\n";
        let err = loader().load_reader(csv.as_bytes()).unwrap_err();
        match err {
            Error::Data(msg) => {
                assert!(msg.contains("line 2"));
                assert!(msg.contains("\"a\""));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn blank_and_nan_cells_are_rejected() {
        assert!(matches!(
            loader().load_reader("ID,a\n1,\n".as_bytes()),
            Err(Error::Data(_))
        ));
        assert!(matches!(
            loader().load_reader("ID,a\n1,NaN\n".as_bytes()),
            Err(Error::Data(_))
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = loader().load_reader("ID,a,b\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = loader().load_reader("ID,a\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::EmptyTable));
    }

    #[test]
    fn id_only_file_has_no_attributes() {
        let err = loader().load_reader("ID\n1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[test]
    fn custom_delimiter() {
        let config = LoaderConfig { delimiter: b';', ..LoaderConfig::default() };
        let table = CsvLoader::new(&config)
            .load_reader("ID;a;b\n1;4;5\n".as_bytes())
            .unwrap();
        assert_eq!(table.row(0), &[4.0, 5.0]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader().load_path(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
