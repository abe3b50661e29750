use restaurant_recommender::{RecommendationOutcome, RecommendationRecord, UserInput};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub price: Option<PriceInput>,
    #[serde(default)]
    pub diet: String,
}

/// Budgets arrive as JSON numbers or as strings from HTML forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Amount(i64),
    Decimal(f64),
    Text(String),
}

impl PriceInput {
    /// Whole rupees, or `None` when the value is not an integral number.
    /// Fractional budgets are rejected rather than rounded.
    pub fn amount(&self) -> Option<i64> {
        match self {
            PriceInput::Amount(amount) => Some(*amount),
            PriceInput::Decimal(value) => whole_rupees(*value),
            PriceInput::Text(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(whole_rupees))
            }
        }
    }
}

// `i64::MAX as f64` rounds up to 2^63, hence the exclusive upper bound.
fn whole_rupees(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub user_input: UserInputView,
    pub recommendations: Vec<RecommendationRecord>,
    pub total_matches: usize,
    pub raw_response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserInputView {
    pub city: String,
    pub price: u64,
    pub diet: String,
}

impl From<&UserInput> for UserInputView {
    fn from(input: &UserInput) -> Self {
        Self {
            city: input.city().to_string(),
            price: input.price(),
            diet: input.diet().to_string(),
        }
    }
}

impl From<RecommendationOutcome> for RecommendationResponse {
    fn from(outcome: RecommendationOutcome) -> Self {
        Self {
            success: true,
            user_input: UserInputView::from(&outcome.user_input),
            recommendations: outcome.result.recommendations,
            total_matches: outcome.total_matches,
            raw_response: outcome.result.raw_response,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CitiesResponse {
    pub cities: Vec<String>,
}
