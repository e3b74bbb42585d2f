use super::filter::Filters;
use super::order::Order;

/// Filters + order + pagination for one query request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    filters: Filters,
    order: Order,
    limit: Option<u64>,
    offset: Option<u64>,
    current_page: Option<u64>,
}

impl Criteria {
    /// `offset` is derived only when both `limit` and `page` are given;
    /// `current_page` keeps `page` regardless. Page 0 saturates to offset 0.
    #[must_use]
    pub fn new(filters: Filters, order: Order, limit: Option<u64>, page: Option<u64>) -> Self {
        let offset = match (page, limit) {
            (Some(p), Some(l)) => Some(p.saturating_sub(1).saturating_mul(l)),
            _ => None,
        };
        Self { filters, order, limit, offset, current_page: page }
    }

    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    #[must_use]
    pub const fn order(&self) -> &Order {
        &self.order
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    #[must_use]
    pub const fn current_page(&self) -> Option<u64> {
        self.current_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Filter, Operator};

    #[test]
    fn offset_from_page_and_limit() {
        let c = Criteria::new(Filters::none(), Order::none(), Some(20), Some(1));
        assert_eq!(c.offset(), Some(0));
        let c = Criteria::new(Filters::none(), Order::none(), Some(10), Some(2));
        assert_eq!(c.offset(), Some(10));
        assert_eq!(c.limit(), Some(10));
    }

    #[test]
    fn missing_pagination() {
        let c = Criteria::new(Filters::none(), Order::none(), None, None);
        assert_eq!(c.limit(), None);
        assert_eq!(c.offset(), None);
        assert_eq!(c.current_page(), None);
    }

    #[test]
    fn page_without_limit_keeps_page_only() {
        let c = Criteria::new(Filters::none(), Order::none(), None, Some(3));
        assert_eq!(c.offset(), None);
        assert_eq!(c.current_page(), Some(3));
        let c = Criteria::new(Filters::none(), Order::none(), Some(5), None);
        assert_eq!(c.offset(), None);
    }

    #[test]
    fn page_zero_does_not_underflow() {
        let c = Criteria::new(Filters::none(), Order::none(), Some(10), Some(0));
        assert_eq!(c.offset(), Some(0));
        assert_eq!(c.current_page(), Some(0));
    }

    #[test]
    fn has_filters_tracks_emptiness() {
        assert!(!Criteria::new(Filters::none(), Order::none(), None, None).has_filters());
        let fs = Filters::new(vec![Filter::of("status", Operator::Equal, "active").unwrap()]);
        assert!(Criteria::new(fs, Order::none(), None, None).has_filters());
    }
}
