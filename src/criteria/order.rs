use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CriteriaError;
use crate::value_objects::OrderKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    #[default]
    Asc,
    Desc,
}

impl OrderType {
    /// Backend sort direction: `1` ascending, `-1` descending.
    #[must_use]
    pub const fn direction(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

impl FromStr for OrderType {
    type Err = CriteriaError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(CriteriaError::invalid(format!("The order type {s} is invalid"))),
        }
    }
}

/// Sort specification, or the `None` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    None,
    By { key: OrderKey, direction: OrderType },
}

impl Order {
    /// An absent or empty field yields `Order::None`; direction defaults to ASC.
    pub fn from_values(field: Option<&str>, direction: Option<&str>) -> Result<Self, CriteriaError> {
        let Some(field) = field.filter(|f| !f.is_empty()) else {
            return Ok(Self::None);
        };
        let direction = direction.map(str::parse::<OrderType>).transpose()?.unwrap_or_default();
        Ok(Self::By { key: OrderKey::new(field)?, direction })
    }

    pub fn asc(field: impl Into<String>) -> Result<Self, CriteriaError> {
        Ok(Self::By { key: OrderKey::new(field)?, direction: OrderType::Asc })
    }

    pub fn desc(field: impl Into<String>) -> Result<Self, CriteriaError> {
        Ok(Self::By { key: OrderKey::new(field)?, direction: OrderType::Desc })
    }

    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    #[must_use]
    pub const fn has_order(&self) -> bool {
        matches!(self, Self::By { .. })
    }

    #[must_use]
    pub const fn is_asc(&self) -> bool {
        matches!(self, Self::By { direction: OrderType::Asc, .. })
    }

    #[must_use]
    pub const fn is_desc(&self) -> bool {
        matches!(self, Self::By { direction: OrderType::Desc, .. })
    }

    #[must_use]
    pub const fn order_by(&self) -> Option<&OrderKey> {
        match self {
            Self::By { key, .. } => Some(key),
            Self::None => None,
        }
    }
}
