//! Utility modules: JSON/BSON helpers, logging, converter trace.
pub mod json;
pub mod logger;
pub mod trace;
