use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Dietary preference of the diner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diet {
    #[serde(rename = "veg")]
    Veg,
    #[serde(rename = "non-veg")]
    NonVeg,
}

impl Diet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Diet::Veg => "veg",
            Diet::NonVeg => "non-veg",
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Diet {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "veg" => Ok(Diet::Veg),
            "non-veg" => Ok(Diet::NonVeg),
            _ => Err(ValidationError::InvalidDiet(s.to_string())),
        }
    }
}

/// Validated search criteria for one request.
///
/// Fields are private so a `UserInput` can only exist in a valid state:
/// non-empty trimmed city, positive budget, known diet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInput {
    city: String,
    price: u64,
    diet: Diet,
}

impl UserInput {
    /// Validate raw caller values. Checks run in city, price, diet order and
    /// the first failure is returned.
    pub fn new(city: &str, price: i64, diet: &str) -> Result<Self, ValidationError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ValidationError::EmptyCity);
        }
        if price <= 0 {
            return Err(ValidationError::NonPositivePrice(price));
        }
        let price = price.unsigned_abs();
        let diet = diet.parse::<Diet>()?;

        Ok(Self {
            city: city.to_string(),
            price,
            diet,
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Budget for two people, in rupees.
    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn diet(&self) -> Diet {
        self.diet
    }
}
