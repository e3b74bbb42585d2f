// Submodules for separation of concerns
mod core;
mod filter;
mod operator;
mod order;
mod request;
mod value;

// Public API re-exports
pub use self::core::Criteria;
pub use filter::{Filter, Filters};
pub use operator::Operator;
pub use order::{Order, OrderType};
pub use request::{CriteriaRequest, parse_criteria_json};
pub use value::{FilterValue, OrCondition, Range, Shape};
