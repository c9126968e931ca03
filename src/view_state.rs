// src/view_state.rs
use crate::config::TableOptions;
use crate::data_source::Row;
use crate::format::cell_text;

pub const PAGE_SIZE: usize = 25;

/// Pagination window and search text. Derived projections are recomputed on
/// every data, search or page change; changing pages never refetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub page_number: usize,
    pub item_start: usize,
    pub item_end: usize,
    pub search_text: String,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            page_number: 1,
            item_start: 0,
            item_end: PAGE_SIZE,
            search_text: String::new(),
        }
    }
}

impl ViewState {
    pub fn reset(&mut self) {
        *self = ViewState::default();
    }

    /// Move to a 1-based page and recompute the row window.
    pub fn set_page(&mut self, page: usize) {
        let page = page.max(1);
        self.page_number = page;
        self.item_start = (page - 1) * PAGE_SIZE;
        self.item_end = self.item_start + PAGE_SIZE;
    }

    /// Change the search text. Resets to the first page, window included.
    pub fn set_search(&mut self, text: String) {
        self.search_text = text;
        self.set_page(1);
    }

    /// The window clamped to the filtered length, half-open.
    pub fn window(&self, len: usize) -> (usize, usize) {
        (self.item_start.min(len), self.item_end.min(len))
    }
}

pub fn total_pages(filtered_len: usize) -> usize {
    filtered_len.div_ceil(PAGE_SIZE)
}

pub fn pagination_visible(total_pages: usize) -> bool {
    total_pages > 1
}

/// Case-insensitive substring filter over the visible configured columns.
/// Empty search text is the identity. With no configured columns nothing can
/// match a non-empty search.
pub fn filter_rows<'a>(
    rows: &'a [Row],
    options: Option<&TableOptions>,
    search: &str,
) -> Vec<&'a Row> {
    if search.is_empty() {
        return rows.iter().collect();
    }
    let needle = search.to_lowercase();
    let visible: Vec<&str> = options
        .map(|o| {
            o.columns
                .iter()
                .filter(|c| !c.is_hidden)
                .map(|c| c.name.as_str())
                .collect()
        })
        .unwrap_or_default();

    rows.iter()
        .filter(|row| {
            visible.iter().any(|name| match row.get(*name) {
                Some(value) if !value.is_null() => {
                    cell_text(value).to_lowercase().contains(&needle)
                }
                _ => false,
            })
        })
        .collect()
}

/// The current page of the filtered rows.
pub fn page_slice<'a>(filtered: &[&'a Row], view: &ViewState) -> Vec<&'a Row> {
    let (start, end) = view.window(filtered.len());
    filtered[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnSpec;
    use serde_json::json;

    fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn options(names: &[(&str, bool)]) -> TableOptions {
        TableOptions {
            columns: names
                .iter()
                .map(|(name, hidden)| ColumnSpec {
                    is_hidden: *hidden,
                    ..ColumnSpec::named(*name)
                })
                .collect(),
        }
    }

    #[test]
    fn empty_search_is_identity() {
        let rows = vec![row(&[("a", json!(1))]), row(&[("a", json!(2))])];
        let opts = options(&[("a", false)]);
        let filtered = filter_rows(&rows, Some(&opts), "");
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn search_matches_substring_case_insensitive() {
        let rows = vec![
            row(&[("name", json!("Alice")), ("score", json!(10))]),
            row(&[("name", json!("Bob")), ("score", json!(20))]),
        ];
        let opts = options(&[("name", false), ("score", false)]);
        assert_eq!(filter_rows(&rows, Some(&opts), "LIC").len(), 1);
        assert_eq!(filter_rows(&rows, Some(&opts), "2").len(), 1);
        assert_eq!(filter_rows(&rows, Some(&opts), "zzz").len(), 0);
    }

    #[test]
    fn hidden_columns_do_not_match() {
        let rows = vec![row(&[("secret", json!("alice")), ("name", json!("bob"))])];
        let opts = options(&[("secret", true), ("name", false)]);
        assert_eq!(filter_rows(&rows, Some(&opts), "alice").len(), 0);
        assert_eq!(filter_rows(&rows, Some(&opts), "bob").len(), 1);
    }

    #[test]
    fn no_options_matches_nothing() {
        let rows = vec![row(&[("a", json!("x"))])];
        assert_eq!(filter_rows(&rows, None, "x").len(), 0);
        // identity still holds for empty search
        assert_eq!(filter_rows(&rows, None, "").len(), 1);
    }

    #[test]
    fn null_cells_never_match() {
        let rows = vec![row(&[("a", json!(null))])];
        let opts = options(&[("a", false)]);
        assert_eq!(filter_rows(&rows, Some(&opts), "null").len(), 0);
    }

    #[test]
    fn total_pages_is_ceil_over_page_size() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(25), 1);
        assert_eq!(total_pages(26), 2);
        assert_eq!(total_pages(60), 3);
        assert!(!pagination_visible(total_pages(25)));
        assert!(pagination_visible(total_pages(26)));
    }

    #[test]
    fn page_slice_clamps_to_length() {
        let rows: Vec<Row> = (0..60).map(|i| row(&[("i", json!(i))])).collect();
        let filtered: Vec<&Row> = rows.iter().collect();

        let mut view = ViewState::default();
        view.set_page(3);
        let slice = page_slice(&filtered, &view);
        assert_eq!(slice.len(), 10);
        assert_eq!(slice[0].get("i"), Some(&json!(50)));
    }

    #[test]
    fn search_then_page_two_returns_filtered_tail() {
        // 60 rows, 30 of them match, page 2 of the filtered set has 5 rows.
        let rows: Vec<Row> = (0..60)
            .map(|i| {
                let tag = if i % 2 == 0 { "even" } else { "odd" };
                row(&[("i", json!(i)), ("tag", json!(tag))])
            })
            .collect();
        let opts = options(&[("i", false), ("tag", false)]);

        let filtered = filter_rows(&rows, Some(&opts), "even");
        assert_eq!(filtered.len(), 30);
        assert_eq!(total_pages(filtered.len()), 2);

        let mut view = ViewState::default();
        view.set_search("even".to_string());
        view.set_page(2);
        let slice = page_slice(&filtered, &view);
        assert_eq!(slice.len(), 5);
        assert_eq!(slice[0].get("i"), Some(&json!(50)));
    }

    #[test]
    fn search_change_resets_page_and_window() {
        let mut view = ViewState::default();
        view.set_page(3);
        assert_eq!(view.item_start, 50);
        view.set_search("x".to_string());
        assert_eq!(view.page_number, 1);
        assert_eq!(view.item_start, 0);
        assert_eq!(view.item_end, PAGE_SIZE);
    }
}
