use serde::{Deserialize, Serialize};

use super::core::Criteria;
use super::filter::Filters;
use super::order::Order;
use crate::errors::CriteriaError;

// Serde-facing request body for building a Criteria from loosely-typed input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaRequest {
    #[serde(default)]
    pub filters: Vec<serde_json::Value>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub page: Option<u64>,
}

impl TryFrom<CriteriaRequest> for Criteria {
    type Error = CriteriaError;
    fn try_from(req: CriteriaRequest) -> Result<Self, Self::Error> {
        let filters = Filters::from_json(&req.filters)?;
        let order = Order::from_values(req.order_by.as_deref(), req.order_type.as_deref())?;
        Ok(Self::new(filters, order, req.limit, req.page))
    }
}

/// # Errors
/// Returns an error if the JSON is malformed or any filter/order part is invalid.
pub fn parse_criteria_json(json: &str) -> Result<Criteria, CriteriaError> {
    let req: CriteriaRequest = serde_json::from_str(json)?;
    Criteria::try_from(req)
}
