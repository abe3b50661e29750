use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{RecommendError, Result};

/// Number of rows reported in [`DatasetInfo::sample_restaurants`].
pub const SAMPLE_SIZE: usize = 5;

/// One restaurant from the dataset.
///
/// Column names follow the Zomato export; the snake_case aliases are accepted
/// as well. Everything but the name is optional, and cost stays textual until
/// [`RestaurantRow::cost`] parses it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantRow {
    pub name: String,
    #[serde(alias = "rate")]
    pub rating: Option<String>,
    #[serde(alias = "approx_cost(for two people)")]
    pub approx_cost_for_two: Option<String>,
    pub cuisines: Option<String>,
    #[serde(alias = "dish_liked")]
    pub dishes_liked: Option<String>,
    #[serde(alias = "rest_type")]
    pub restaurant_type: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "listed_in(city)")]
    pub city: Option<String>,
}

impl RestaurantRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    pub fn with_cost(mut self, cost: impl Into<String>) -> Self {
        self.approx_cost_for_two = Some(cost.into());
        self
    }

    pub fn with_cuisines(mut self, cuisines: impl Into<String>) -> Self {
        self.cuisines = Some(cuisines.into());
        self
    }

    pub fn with_dishes_liked(mut self, dishes: impl Into<String>) -> Self {
        self.dishes_liked = Some(dishes.into());
        self
    }

    pub fn with_restaurant_type(mut self, restaurant_type: impl Into<String>) -> Self {
        self.restaurant_type = Some(restaurant_type.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Parsed cost for two, or `None` when the field is missing or not a number.
    pub fn cost(&self) -> Option<f64> {
        self.approx_cost_for_two.as_deref().and_then(parse_cost)
    }

    /// City values of this row; the field may hold a `;` or `,` separated list.
    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.city
            .as_deref()
            .unwrap_or_default()
            .split([';', ','])
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }
}

/// Parse a textual cost such as `"800"`, `"1,200"` or `"Rs. 450"`.
pub fn parse_cost(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("Rs.")
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|cost| cost.is_finite() && *cost >= 0.0)
}

/// Immutable, in-memory restaurant table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<RestaurantRow>,
}

/// Overview of a loaded dataset, as served by the stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub total_restaurants: usize,
    /// Number of distinct cities.
    pub available_cities: usize,
    pub columns: Vec<String>,
    pub sample_restaurants: Vec<RestaurantRow>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<RestaurantRow>) -> Self {
        Self { columns, rows }
    }

    /// Build a dataset from rows alone; columns are the canonical field names.
    pub fn from_rows(rows: Vec<RestaurantRow>) -> Self {
        let columns = [
            "name",
            "rating",
            "approx_cost_for_two",
            "cuisines",
            "dishes_liked",
            "restaurant_type",
            "location",
            "city",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        Self { columns, rows }
    }

    /// Read CSV with a header row. Rows that fail to deserialize are skipped
    /// with a warning; a missing header row is an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| RecommendError::Dataset(format!("Unable to read dataset headers: {e}")))?
            .iter()
            .map(|header| header.to_string())
            .collect();

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for (index, record) in reader.deserialize::<RestaurantRow>().enumerate() {
            match record {
                Ok(row) => rows.push(row),
                Err(e) => {
                    skipped += 1;
                    warn!(row = index + 1, error = %e, "Skipping unreadable dataset row");
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, "Some dataset rows could not be read");
        }

        Ok(Self { columns, rows })
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            RecommendError::Dataset(format!("Unable to open {}: {e}", path.display()))
        })?;
        let dataset = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            columns = dataset.columns.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn rows(&self) -> &[RestaurantRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct city names, sorted.
    pub fn cities(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(RestaurantRow::cities)
            .map(String::from)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            total_restaurants: self.rows.len(),
            available_cities: self.cities().len(),
            columns: self.columns.clone(),
            sample_restaurants: self.rows.iter().take(SAMPLE_SIZE).cloned().collect(),
        }
    }
}

/// Where the dataset comes from. Loaded once at startup.
pub trait DatasetSource: Send + Sync {
    fn load(&self) -> Result<Dataset>;
}

/// CSV file on disk.
pub struct CsvDatasetSource {
    path: PathBuf,
}

impl CsvDatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for CsvDatasetSource {
    fn load(&self) -> Result<Dataset> {
        Dataset::from_csv_path(&self.path)
    }
}

/// Pre-built dataset, for tests and demos.
pub struct InMemoryDatasetSource {
    dataset: Dataset,
}

impl InMemoryDatasetSource {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }
}

impl DatasetSource for InMemoryDatasetSource {
    fn load(&self) -> Result<Dataset> {
        Ok(self.dataset.clone())
    }
}
