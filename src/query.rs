//! Query state driving the paginated list fetch

use serde::{Deserialize, Serialize};

/// Page sizes offered by the page-size selector, in cycling order.
pub const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Whether a page response replaces the loaded records or extends them
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchMode {
    Reset,
    Append,
}

/// Filter and pagination parameters for the collection endpoint.
///
/// Every filter setter returns `true` only when the value actually changed,
/// and in that case rewinds `page` to 1. Only [`QueryState::advance`] moves
/// the page forward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub page: u32,
    pub limit: u32,
    pub name: String,
    pub type_id: Option<u32>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::with_limit(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            name: String::new(),
            type_id: None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.name == name {
            return false;
        }
        self.name = name;
        self.page = 1;
        true
    }

    pub fn set_type(&mut self, type_id: Option<u32>) -> bool {
        if self.type_id == type_id {
            return false;
        }
        self.type_id = type_id;
        self.page = 1;
        true
    }

    pub fn set_limit(&mut self, limit: u32) -> bool {
        let limit = limit.max(1);
        if self.limit == limit {
            return false;
        }
        self.limit = limit;
        self.page = 1;
        true
    }

    pub fn advance(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Undo an [`advance`](Self::advance) whose page never arrived.
    pub fn rewind(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// The page size `step` positions away in [`PAGE_SIZES`], wrapping.
    /// A limit outside the table cycles as if it were the default.
    pub fn cycled_limit(&self, step: i32) -> u32 {
        let len = PAGE_SIZES.len() as i32;
        let current = PAGE_SIZES
            .iter()
            .position(|size| *size == self.limit)
            .or_else(|| PAGE_SIZES.iter().position(|size| *size == DEFAULT_PAGE_SIZE))
            .unwrap_or(0) as i32;
        PAGE_SIZES[(current + step).rem_euclid(len) as usize]
    }

    /// Query parameters in the order the endpoint documents them.
    /// Empty filters are omitted.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if !self.name.is_empty() {
            params.push(("name", self.name.clone()));
        }
        if let Some(type_id) = self.type_id {
            params.push(("typeId", type_id.to_string()));
        }
        params
    }
}

pub fn is_valid_page_size(limit: u32) -> bool {
    PAGE_SIZES.contains(&limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_is_first_unfiltered_page() {
        let query = QueryState::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 50);
        assert_eq!(
            query.params(),
            vec![("page", "1".to_string()), ("limit", "50".to_string())]
        );
    }

    #[test]
    fn name_change_rewinds_page() {
        let mut query = QueryState::default();
        query.advance();
        query.advance();
        assert_eq!(query.page, 3);

        assert!(query.set_name("pika"));
        assert_eq!(query.page, 1);
        assert_eq!(query.name, "pika");
    }

    #[test]
    fn same_value_is_not_a_change() {
        let mut query = QueryState::default();
        query.advance();
        assert!(!query.set_name(""));
        assert!(!query.set_type(None));
        assert!(!query.set_limit(50));
        assert_eq!(query.page, 2);
    }

    #[test]
    fn limit_change_behaves_like_filter_change() {
        let mut query = QueryState::default();
        query.advance();
        assert!(query.set_limit(20));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
    }

    #[test]
    fn params_include_filters_when_set() {
        let mut query = QueryState::with_limit(10);
        query.set_name("mew");
        query.set_type(Some(4));
        query.advance();
        assert_eq!(
            query.params(),
            vec![
                ("page", "2".to_string()),
                ("limit", "10".to_string()),
                ("name", "mew".to_string()),
                ("typeId", "4".to_string()),
            ]
        );
    }

    #[test]
    fn cycled_limit_wraps_both_ways() {
        let query = QueryState::with_limit(100);
        assert_eq!(query.cycled_limit(1), 10);
        let query = QueryState::with_limit(10);
        assert_eq!(query.cycled_limit(-1), 100);
        let query = QueryState::with_limit(7);
        assert_eq!(query.cycled_limit(1), 100);
    }

    #[test]
    fn rewind_never_goes_below_first_page() {
        let mut query = QueryState::default();
        query.rewind();
        assert_eq!(query.page, 1);
        query.advance();
        query.rewind();
        assert_eq!(query.page, 1);
    }
}
