//! Client-side sort, filter and pagination over rows already fetched.

use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Current sort key, if any. Toggling the active key cycles
/// asc -> desc -> unsorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    active: Option<(K, SortDirection)>,
}

impl<K> Default for SortState<K> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<K: Copy + PartialEq> SortState<K> {
    pub fn new(key: K, direction: SortDirection) -> Self {
        Self {
            active: Some((key, direction)),
        }
    }

    pub fn toggle(&mut self, key: K) {
        self.active = match self.active {
            Some((current, SortDirection::Asc)) if current == key => Some((key, SortDirection::Desc)),
            Some((current, SortDirection::Desc)) if current == key => None,
            _ => Some((key, SortDirection::Asc)),
        };
    }

    pub fn set(&mut self, key: K, direction: SortDirection) {
        self.active = Some((key, direction));
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<(K, SortDirection)> {
        self.active
    }

    pub fn is_sorted(&self) -> bool {
        self.active.is_some()
    }
}

/// A sortable cell. Blank cells sort first, then numbers, then text.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum SortValue {
    Empty,
    Number(f64),
    Text(String),
}

impl SortValue {
    pub fn of(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Empty,
            Some(s) => s
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Self::Number)
                .unwrap_or_else(|| Self::Text(s.to_string())),
        }
    }
}

/// Stable sort of `rows` by the active key. Rows are left untouched when
/// nothing is active.
pub fn sort_rows<T, K, V, F>(rows: &mut [T], state: &SortState<K>, value: F)
where
    K: Copy + PartialEq,
    V: PartialOrd,
    F: Fn(&T, K) -> V,
{
    let Some((key, direction)) = state.active() else {
        return;
    };
    rows.sort_by(|a, b| {
        let ord = value(a, key)
            .partial_cmp(&value(b, key))
            .unwrap_or(Ordering::Equal);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Active filters by key. A row passes when it matches every filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet<K: Ord> {
    filters: BTreeMap<K, String>,
}

impl<K: Ord> Default for FilterSet<K> {
    fn default() -> Self {
        Self {
            filters: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> FilterSet<K> {
    pub fn set(&mut self, key: K, value: impl Into<String>) {
        self.filters.insert(key, value.into());
    }

    pub fn remove(&mut self, key: K) {
        self.filters.remove(&key);
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn get(&self, key: K) -> Option<&str> {
        self.filters.get(&key).map(String::as_str)
    }

    pub fn apply<'a, T, F>(&self, rows: &'a [T], matches: F) -> Vec<&'a T>
    where
        F: Fn(&T, K, &str) -> bool,
    {
        rows.iter()
            .filter(|row| {
                self.filters
                    .iter()
                    .all(|(key, value)| matches(row, *key, value))
            })
            .collect()
    }
}

/// One page of rows. `page` is 1-based and always within range.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice out `page`, clamping it into `1..=total_pages`. A zero page size
/// falls back to [`DEFAULT_PAGE_SIZE`].
pub fn paginate<T>(rows: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
    let total = rows.len();
    let total_pages = total.div_ceil(page_size);
    let page = page.clamp(1, total_pages.max(1));

    let start = ((page - 1) * page_size).min(total);
    let end = (start + page_size).min(total);
    Page {
        items: &rows[start..end],
        page,
        page_size,
        total,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Col {
        Name,
        Score,
    }

    fn rows() -> Vec<(&'static str, Option<&'static str>)> {
        vec![("carol", Some("85")), ("alice", None), ("bob", Some("100")), ("dave", Some("9"))]
    }

    fn cell(row: &(&'static str, Option<&'static str>), col: Col) -> SortValue {
        match col {
            Col::Name => SortValue::of(Some(row.0)),
            Col::Score => SortValue::of(row.1),
        }
    }

    #[test]
    fn test_toggle_cycle() {
        let mut sort = SortState::default();
        sort.toggle(Col::Name);
        assert_eq!(sort.active(), Some((Col::Name, SortDirection::Asc)));
        sort.toggle(Col::Name);
        assert_eq!(sort.active(), Some((Col::Name, SortDirection::Desc)));
        sort.toggle(Col::Name);
        assert_eq!(sort.active(), None);

        sort.toggle(Col::Name);
        sort.toggle(Col::Score);
        assert_eq!(sort.active(), Some((Col::Score, SortDirection::Asc)));
    }

    #[test]
    fn test_numeric_aware_sort() {
        let mut data = rows();
        sort_rows(&mut data, &SortState::new(Col::Score, SortDirection::Asc), cell);
        let names: Vec<_> = data.iter().map(|r| r.0).collect();
        assert_eq!(names, ["alice", "dave", "carol", "bob"]);

        sort_rows(&mut data, &SortState::new(Col::Score, SortDirection::Desc), cell);
        assert_eq!(data[0].0, "bob");

        let before = data.clone();
        sort_rows(&mut data, &SortState::default(), cell);
        assert_eq!(data, before);
    }

    #[test]
    fn test_filter_requires_every_match() {
        let data = rows();
        let mut filters = FilterSet::default();
        assert_eq!(filters.apply(&data, |_, _, _| false).len(), 4);

        filters.set(Col::Name, "a");
        let matches = |row: &(&str, Option<&str>), col: Col, needle: &str| match col {
            Col::Name => row.0.contains(needle),
            Col::Score => row.1 == Some(needle),
        };
        assert_eq!(filters.apply(&data, matches).len(), 3);
        filters.set(Col::Score, "85");
        let kept = filters.apply(&data, matches);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].0, "carol");

        filters.clear();
        assert!(!filters.is_filtered());
    }

    #[test]
    fn test_pagination_clamps() {
        let data: Vec<u32> = (1..=45).collect();
        let page = paginate(&data, 1, DEFAULT_PAGE_SIZE);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(!page.has_previous());

        let last = paginate(&data, 99, 20);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, &data[40..]);
        assert!(!last.has_next());

        let first = paginate(&data, 0, 50);
        assert_eq!(first.page, 1);
        assert_eq!(first.total_pages, 1);

        let empty: Vec<u32> = Vec::new();
        let page = paginate(&empty, 3, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
    }
}
