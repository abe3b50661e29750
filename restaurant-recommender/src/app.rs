//! `RecommendationApp` is the caller-facing API used by the HTTP service and
//! the CLI. It owns the shared dataset, a [`Recommender`] and a
//! [`RecommendationDisplay`], and runs the whole pipeline for one request:
//!
//! validate → filter → prompt → gateway → parse → (format)
//!
//! Validation happens first; rejected input never reaches the filter or the
//! gateway.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    config::RecommenderConfig,
    dataset::{CsvDatasetSource, Dataset, DatasetInfo, DatasetSource},
    display::RecommendationDisplay,
    error::Result,
    filter::filter,
    gateway::{GroqGateway, LlmGateway},
    input::UserInput,
    recommender::{RecommendationResult, Recommender},
};

/// Everything a caller needs to render one answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationOutcome {
    pub user_input: UserInput,
    pub total_matches: usize,
    pub result: RecommendationResult,
}

#[derive(Clone)]
pub struct RecommendationApp {
    dataset: Arc<Dataset>,
    recommender: Recommender,
    display: RecommendationDisplay,
}

impl RecommendationApp {
    pub fn new(dataset: Arc<Dataset>, recommender: Recommender) -> Self {
        Self {
            dataset,
            recommender,
            display: RecommendationDisplay::default(),
        }
    }

    /// Load the dataset from `source` and pair it with `gateway`.
    pub fn from_source(source: &dyn DatasetSource, gateway: Arc<dyn LlmGateway>) -> Result<Self> {
        let dataset = source.load()?;
        if dataset.is_empty() {
            warn!("Dataset has no rows; every request will match nothing");
        }
        Ok(Self::new(Arc::new(dataset), Recommender::new(gateway)))
    }

    /// CSV dataset and Groq gateway as described by `config`.
    pub fn from_config(config: &RecommenderConfig) -> Result<Self> {
        let gateway = Arc::new(GroqGateway::new(config.gateway.clone())?);
        let app = Self::from_source(&CsvDatasetSource::new(&config.dataset_path), gateway)?;
        info!(
            dataset = %config.dataset_path.display(),
            model = %config.gateway.model,
            restaurants = app.dataset.len(),
            "Recommendation app ready"
        );
        Ok(app.with_recommender(|recommender| recommender.with_api_key(config.api_key.clone())))
    }

    pub fn with_recommender(mut self, configure: impl FnOnce(Recommender) -> Recommender) -> Self {
        self.recommender = configure(self.recommender);
        self
    }

    pub fn with_display(mut self, display: RecommendationDisplay) -> Self {
        self.display = display;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn display(&self) -> &RecommendationDisplay {
        &self.display
    }

    /// Structured result for one request.
    pub async fn recommend(&self, city: &str, price: i64, diet: &str) -> Result<RecommendationOutcome> {
        let user_input = UserInput::new(city, price, diet)?;
        info!(
            city = %user_input.city(),
            price = user_input.price(),
            diet = %user_input.diet(),
            "Processing recommendation request"
        );

        let context = filter(&self.dataset, &user_input);
        let result = self.recommender.get_recommendations(&context).await?;

        Ok(RecommendationOutcome {
            total_matches: context.total_matches(),
            user_input,
            result,
        })
    }

    /// Formatted report, or a formatted error block; never fails.
    pub async fn get_recommendations(&self, city: &str, price: i64, diet: &str) -> String {
        match self.recommend(city, price, diet).await {
            Ok(outcome) => {
                let report = self
                    .display
                    .format_recommendations(&outcome.result, &outcome.user_input);
                let stats = self.display.format_statistics(
                    self.dataset.len(),
                    outcome.total_matches,
                    outcome.result.recommendations.len(),
                );
                format!("{report}\n{stats}")
            }
            Err(e) => {
                warn!(error = %e, "Recommendation request failed");
                self.display.format_error(&e)
            }
        }
    }

    pub fn get_dataset_info(&self) -> DatasetInfo {
        self.dataset.info()
    }

    pub fn get_available_cities(&self) -> Vec<String> {
        self.dataset.cities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{InMemoryDatasetSource, RestaurantRow};
    use crate::error::{RecommendError, ValidationError};
    use crate::gateway::MockGateway;

    fn sample_dataset() -> Dataset {
        Dataset::from_rows(vec![
            RestaurantRow::new("Restaurant A")
                .with_rating("4.5/5")
                .with_cost("500")
                .with_cuisines("North Indian")
                .with_dishes_liked("Paneer Tikka")
                .with_city("Bangalore"),
            RestaurantRow::new("Restaurant B")
                .with_rating("4.1/5")
                .with_cost("650")
                .with_cuisines("South Indian")
                .with_dishes_liked("Masala Dosa")
                .with_city("Bangalore"),
            RestaurantRow::new("Restaurant C")
                .with_cost("600")
                .with_cuisines("North Indian, Mughlai")
                .with_dishes_liked("Butter Chicken")
                .with_city("Bangalore"),
            RestaurantRow::new("Restaurant D")
                .with_cost("1,200")
                .with_cuisines("Italian")
                .with_city("Bangalore"),
            RestaurantRow::new("Restaurant E")
                .with_cost("400")
                .with_cuisines("Chinese")
                .with_city("Mumbai"),
        ])
    }

    fn app_with(gateway: Arc<MockGateway>) -> RecommendationApp {
        RecommendationApp::from_source(&InMemoryDatasetSource::new(sample_dataset()), gateway).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_with_mock_gateway() {
        let gateway = Arc::new(MockGateway::with_response(
            "1. Restaurant A - Great paneer tikka\n2. Restaurant B - Crisp dosas",
        ));
        let app = app_with(gateway.clone());

        let outcome = app.recommend("Bangalore", 700, "veg").await.unwrap();
        assert_eq!(outcome.total_matches, 2);
        assert!(!outcome.result.recommendations.is_empty());

        let prompt = gateway.last_prompt().unwrap();
        assert!(prompt.contains("Restaurant A"));
        assert!(prompt.contains("Restaurant B"));
        assert!(!prompt.contains("Restaurant C"));

        let report = app.get_recommendations("Bangalore", 700, "veg").await;
        assert!(report.contains("Bangalore"));
        assert!(report.contains("Rs.700"));
        assert!(report.contains("veg"));
        assert!(report.contains("RECOMMENDATION"));
        assert!(report.contains("Match rate: 40.0%"));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_gateway() {
        let gateway = Arc::new(MockGateway::with_response("1. Restaurant A - fine"));
        let app = app_with(gateway.clone());

        let err = app.recommend("", -100, "invalid").await.unwrap_err();
        assert!(matches!(
            err,
            RecommendError::Validation(ValidationError::EmptyCity)
        ));

        for (city, price, diet) in [("", 500, "veg"), ("Bangalore", -100, "veg"), ("Bangalore", 700, "invalid")] {
            let report = app.get_recommendations(city, price, diet).await;
            assert!(report.contains("ERROR OCCURRED"));
        }
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_rendered() {
        let app = app_with(Arc::new(MockGateway::failing("API Error")));

        let report = app.get_recommendations("Bangalore", 800, "non-veg").await;
        assert!(report.contains("ERROR OCCURRED"));
        assert!(report.contains("API Error"));

        let err = app.recommend("Bangalore", 800, "non-veg").await.unwrap_err();
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_no_matches_still_asks_the_llm() {
        let gateway = Arc::new(MockGateway::with_response(""));
        let app = app_with(gateway.clone());

        let outcome = app.recommend("Chennai", 500, "veg").await.unwrap();
        assert_eq!(outcome.total_matches, 0);
        assert_eq!(gateway.calls(), 1);

        let report = app.get_recommendations("Chennai", 500, "veg").await;
        assert!(report.contains("NO RECOMMENDATIONS FOUND"));
    }

    #[test]
    fn test_dataset_info_and_cities() {
        let app = app_with(Arc::new(MockGateway::with_response("")));

        let info = app.get_dataset_info();
        assert_eq!(info.total_restaurants, 5);
        assert_eq!(info.available_cities, 2);
        assert_eq!(info.sample_restaurants.len(), 5);

        assert_eq!(app.get_available_cities(), vec!["Bangalore", "Mumbai"]);
    }

    #[test]
    fn test_missing_dataset_file_is_dataset_error() {
        let config = RecommenderConfig {
            dataset_path: "/nonexistent/restaurants.csv".into(),
            ..RecommenderConfig::default()
        };
        let err = RecommendationApp::from_config(&config).err().unwrap();
        assert!(matches!(err, RecommendError::Dataset(_)));
    }
}
