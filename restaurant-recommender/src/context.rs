use serde::Serialize;

use crate::dataset::RestaurantRow;
use crate::input::UserInput;

/// Candidate set for one request, handed from the filter to the prompt builder.
///
/// `total_matches` always equals `filtered_rows.len()`; the constructor is the
/// only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationContext {
    filtered_rows: Vec<RestaurantRow>,
    user_input: UserInput,
    total_matches: usize,
}

impl IntegrationContext {
    pub fn new(filtered_rows: Vec<RestaurantRow>, user_input: UserInput) -> Self {
        let total_matches = filtered_rows.len();
        Self {
            filtered_rows,
            user_input,
            total_matches,
        }
    }

    pub fn filtered_rows(&self) -> &[RestaurantRow] {
        &self.filtered_rows
    }

    pub fn user_input(&self) -> &UserInput {
        &self.user_input
    }

    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn is_empty(&self) -> bool {
        self.total_matches == 0
    }
}
