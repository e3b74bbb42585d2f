use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CriteriaError;

/// Closed set of filter operators, keyed by their textual tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Operator {
    Equal,
    NotEqual,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    NotContains,
    Between,
    Or,
    In,
    NotIn,
}

impl Operator {
    pub const ALL: [Self; 12] = [
        Self::Equal,
        Self::NotEqual,
        Self::Gt,
        Self::Lt,
        Self::Gte,
        Self::Lte,
        Self::Contains,
        Self::NotContains,
        Self::Between,
        Self::Or,
        Self::In,
        Self::NotIn,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::Between => "BETWEEN",
            Self::Or => "OR",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
        }
    }

    /// Operators whose value carries structure (range, condition list, value list).
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Between | Self::Or | Self::In | Self::NotIn)
    }
}

impl FromStr for Operator {
    type Err = CriteriaError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.token() == s)
            .ok_or_else(|| CriteriaError::invalid(format!("The filter operator {s} is invalid")))
    }
}

impl TryFrom<String> for Operator {
    type Error = CriteriaError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Operator> for &'static str {
    fn from(op: Operator) -> Self {
        op.token()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
