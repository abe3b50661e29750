pub mod app;
pub mod config;
pub mod context;
pub mod dataset;
pub mod display;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod input;
pub mod parser;
pub mod prompt;
pub mod recommender;

// Re-export commonly used types
pub use app::{RecommendationApp, RecommendationOutcome};
pub use config::RecommenderConfig;
pub use context::IntegrationContext;
pub use dataset::{
    CsvDatasetSource, Dataset, DatasetInfo, DatasetSource, InMemoryDatasetSource, RestaurantRow,
};
pub use display::RecommendationDisplay;
pub use error::{GatewayError, RecommendError, Result, ValidationError};
pub use filter::filter;
pub use gateway::{
    CredentialSource, EnvCredentials, GatewayConfig, GroqGateway, LlmGateway, MockGateway,
    StaticCredentials,
};
pub use input::{Diet, UserInput};
pub use parser::{RecommendationRecord, ResponseParser, parse_recommendations};
pub use prompt::{MAX_ROWS, build_prompt};
pub use recommender::{RecommendationResult, Recommender};
