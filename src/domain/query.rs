use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct InputRow {
    pub cities: String,
    pub neighborhoods: String,
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub index: usize,
    pub city_ids: Vec<String>,
    pub neighborhood_ids: Vec<String>,
    pub category: String,
    pub expected_row_count: u64,
}

impl QuerySpec {
    pub fn from_row(index: usize, row: InputRow) -> Self {
        let neighborhood_ids = if row.neighborhoods.trim() == "0" {
            Vec::new()
        } else {
            split_ids(&row.neighborhoods)
        };

        Self {
            index,
            city_ids: split_ids(&row.cities),
            neighborhood_ids,
            category: row.category.trim().to_string(),
            expected_row_count: row.count,
        }
    }
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split('-')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
