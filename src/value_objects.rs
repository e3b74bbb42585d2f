//! Non-empty string wrappers for field names and sort keys.

use bson::Bson;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

use crate::errors::CriteriaError;
use crate::utils::json::natural_string;

fn non_empty(value: String, what: &str) -> Result<String, CriteriaError> {
    if value.is_empty() {
        return Err(CriteriaError::invalid(format!("{what} must not be empty")));
    }
    Ok(value)
}

macro_rules! string_value_object {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, CriteriaError> {
                non_empty(value.into(), $what).map(Self)
            }

            /// Coerces any BSON value to its natural string form first.
            pub fn from_bson(value: &Bson) -> Result<Self, CriteriaError> {
                Self::new(natural_string(value))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = CriteriaError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_value_object!(
    /// Name of the document field a filter applies to.
    FieldName,
    "field name"
);

string_value_object!(
    /// Field a result set is ordered by.
    OrderKey,
    "order key"
);
