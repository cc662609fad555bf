use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single capital contribution toward a project's goal.
///
/// `name` is whatever the investor typed; it is not an identity and two
/// investors may share one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    pub name: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
}
