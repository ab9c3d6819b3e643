use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{InputRow, QuerySpec};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read input rows from {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub fn read_queries(path: impl AsRef<Path>, max_rows: usize) -> Result<Vec<QuerySpec>, InputError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| InputError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let mut queries = Vec::new();
    for (index, record) in reader.deserialize::<InputRow>().take(max_rows).enumerate() {
        match record {
            Ok(row) => queries.push(QuerySpec::from_row(index, row)),
            Err(err) => {
                tracing::warn!(target: "input", row = index, error = %err, "skipping malformed input row");
            }
        }
    }

    tracing::info!(target: "input", path = %path.display(), rows = queries.len(), "input rows loaded");
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_rows_up_to_the_cap() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cities,neighborhoods,category,count").unwrap();
        writeln!(file, "1-6,0,apartment-sell,70").unwrap();
        writeln!(file, "1,92-93,car,140").unwrap();
        writeln!(file, "2,0,mobile-phones,0").unwrap();

        let queries = read_queries(file.path(), 2).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].city_ids, vec!["1", "6"]);
        assert!(queries[0].neighborhood_ids.is_empty());
        assert_eq!(queries[1].neighborhood_ids, vec!["92", "93"]);
        assert_eq!(queries[1].expected_row_count, 140);
    }

    #[test]
    fn malformed_rows_keep_their_index() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cities,neighborhoods,category,count").unwrap();
        writeln!(file, "1,0,car,many").unwrap();
        writeln!(file, "3,0,car,14").unwrap();

        let queries = read_queries(file.path(), 10).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].index, 1);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_queries(dir.path().join("absent.csv"), 10).unwrap_err();
        assert!(matches!(err, InputError::Unreadable { .. }));
    }
}
