use bson::Document as BsonDocument;

use super::predicate::keyed;
use crate::config::ConverterConfig;
use crate::criteria::Order;

/// Sort document for an order. The logical identifier field is renamed to
/// the store's native one; no order means the configured default on the
/// native identifier.
pub(super) fn sort_spec(order: &Order, config: &ConverterConfig) -> BsonDocument {
    match order {
        Order::By { key, direction } => {
            let field = if key.as_str() == config.identifier_field {
                config.native_identifier_field.as_str()
            } else {
                key.as_str()
            };
            keyed(field, direction.direction())
        }
        Order::None => keyed(&config.native_identifier_field, config.default_sort.direction()),
    }
}
