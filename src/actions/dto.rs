use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One logged action inside a day's payload.
///
/// Only `name`, `label` and `values` are interpreted; any other field a client
/// sends is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub values: Vec<ValuePair>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Kept as JSON numbers so a stored payload is written back the way the
/// client sent it (`5` stays `5`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePair {
    pub numbers: Number,
    pub weight: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ActionsQuery {
    pub datetime: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppendActionsRequest {
    pub mydata: Option<Vec<ActionEntry>>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub mydata: Vec<ActionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub date_month: Option<String>,
    /// A year number, or `any` to match the month in every year.
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityPoint {
    pub month_day: String,
    pub capacity: f64,
}
