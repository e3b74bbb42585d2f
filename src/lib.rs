//! Type-safe query criteria compiled to BSON document-store queries.
//!
//! ```
//! use bson::doc;
//! use criteria_bson::criteria::{Criteria, Filters, Order};
//!
//! let filters = Filters::from_values(&[
//!     doc! {"field": "status", "operator": "=", "value": "active"},
//!     doc! {"field": "age", "operator": ">", "value": "18"},
//! ])?;
//! let criteria = Criteria::new(filters, Order::desc("id")?, Some(10), Some(2));
//! let query = criteria_bson::convert(&criteria)?;
//! assert_eq!(query.predicate, doc! {"status": {"$eq": "active"}, "age": {"$gt": "18"}});
//! assert_eq!(query.sort, doc! {"_id": -1});
//! assert_eq!((query.skip, query.limit), (10, 10));
//! # Ok::<(), criteria_bson::CriteriaError>(())
//! ```

pub mod cli;
pub mod config;
pub mod converter;
pub mod criteria;
pub mod errors;
pub mod repository;
pub mod utils;
pub mod value_objects;

pub use config::{ConverterConfig, MergePolicy, ScalarEncoding};
pub use converter::{CompiledQuery, Converter, convert};
pub use criteria::{Criteria, Filter, FilterValue, Filters, Operator, Order, OrderType};
pub use errors::{CriteriaError, ErrorKind};
pub use value_objects::{FieldName, OrderKey};
