//! Client-side list processing: search, equality filters, stable sort and
//! page windowing over an already-fetched collection.
//!
//! The pipeline always runs in the same order and every stage only narrows or
//! reorders what the previous stage produced:
//!
//! 1. free-text search over the configured searchable fields
//! 2. equality filters (the `All` sentinel is a no-op)
//! 3. stable sort on the active sort field
//! 4. page window `[(page - 1) * size, page * size)`

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, cmp::Ordering, collections::BTreeMap, fmt};

/// Borrowed view of one record field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Text value
    Text(&'a str),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Date(DateTime<Utc>),
}

/// Anything the list processor can search, filter and sort
pub trait Record {
    /// Stable unique identifier type
    type Id: PartialEq + Clone + fmt::Debug;

    /// Stable unique identifier
    fn id(&self) -> Self::Id;

    /// Look up a field by its wire name; `None` when absent
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// The opposite direction
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// How values of a sortable field compare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortRule {
    /// Byte-wise string order
    Lexicographic,
    /// Numeric order
    Numeric,
    /// `false` (0) before `true` (1)
    Boolean,
    /// Order by epoch time
    Date,
}

/// Owned value an equality filter compares against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl Scalar {
    fn matches(&self, value: Option<FieldValue<'_>>) -> bool {
        match (self, value) {
            (Self::Text(expected), Some(FieldValue::Text(actual))) => expected == actual,
            (Self::Bool(expected), Some(FieldValue::Bool(actual))) => *expected == actual,
            #[allow(clippy::float_cmp)]
            (Self::Number(expected), Some(FieldValue::Number(actual))) => *expected == actual,
            _ => false,
        }
    }
}

/// Value of one equality filter
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FilterValue {
    /// Sentinel meaning "do not filter on this field"
    #[default]
    All,
    /// Keep only records whose field equals this value
    Equals(Scalar),
}

/// UI-owned parameters controlling search, filters, sort and page.
///
/// Every setter except [`FilterState::set_page`] resets the current page to 1
/// when it actually changes something.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    search_term: String,
    filters: BTreeMap<String, FilterValue>,
    sort_field: String,
    sort_direction: SortDirection,
    current_page: usize,
}

impl FilterState {
    /// Fresh state sorted ascending on `sort_field`, first page
    pub fn new(sort_field: impl Into<String>) -> Self {
        Self {
            search_term: String::new(),
            filters: BTreeMap::new(),
            sort_field: sort_field.into(),
            sort_direction: SortDirection::Asc,
            current_page: 1,
        }
    }

    /// Active search term
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Filter value for a field (`All` when never set)
    #[must_use]
    pub fn filter(&self, field: &str) -> &FilterValue {
        static ALL: FilterValue = FilterValue::All;
        self.filters.get(field).unwrap_or(&ALL)
    }

    /// Active sort field
    #[must_use]
    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    /// Active sort direction
    #[must_use]
    pub const fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// Current page (1-based)
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Change the search term. Returns whether anything changed.
    pub fn set_search(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term == self.search_term {
            return false;
        }
        self.search_term = term;
        self.current_page = 1;
        true
    }

    /// Change one equality filter. Returns whether anything changed.
    pub fn set_filter(&mut self, field: impl Into<String>, value: FilterValue) -> bool {
        let field = field.into();
        if *self.filter(&field) == value {
            return false;
        }
        if value == FilterValue::All {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, value);
        }
        self.current_page = 1;
        true
    }

    /// Change sort field and direction. Returns whether anything changed.
    pub fn set_sort(&mut self, field: impl Into<String>, direction: SortDirection) -> bool {
        let field = field.into();
        if field == self.sort_field && direction == self.sort_direction {
            return false;
        }
        self.sort_field = field;
        self.sort_direction = direction;
        self.current_page = 1;
        true
    }

    /// Column-header click: same field flips direction, a new field starts ascending
    pub fn toggle_sort(&mut self, field: impl Into<String>) {
        let field = field.into();
        let direction = if field == self.sort_field {
            self.sort_direction.toggled()
        } else {
            SortDirection::Asc
        };
        self.set_sort(field, direction);
    }

    /// Jump to a page; values below 1 become 1
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Pull the current page back into `1..=total_pages` after the data set shrank
    pub fn clamp_page(&mut self, total_pages: usize) {
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }
}

/// Declarative description of which fields a listing searches, filters and sorts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    searchable: Vec<String>,
    filterable: Vec<String>,
    sort_rules: BTreeMap<String, SortRule>,
    page_size: usize,
}

impl ListConfig {
    /// Empty configuration with the given page size
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            searchable: Vec::new(),
            filterable: Vec::new(),
            sort_rules: BTreeMap::new(),
            page_size,
        }
    }

    /// Add a free-text searchable field
    #[must_use]
    pub fn searchable(mut self, field: impl Into<String>) -> Self {
        self.searchable.push(field.into());
        self
    }

    /// Add an equality-filterable field
    #[must_use]
    pub fn filterable(mut self, field: impl Into<String>) -> Self {
        self.filterable.push(field.into());
        self
    }

    /// Declare a sortable field with its comparison rule
    #[must_use]
    pub fn sortable(mut self, field: impl Into<String>, rule: SortRule) -> Self {
        self.sort_rules.insert(field.into(), rule);
        self
    }

    /// Rows per page
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Comparison rule for a field, if it is sortable
    #[must_use]
    pub fn sort_rule(&self, field: &str) -> Option<SortRule> {
        self.sort_rules.get(field).copied()
    }

    /// Whether a field takes part in equality filtering
    #[must_use]
    pub fn is_filterable(&self, field: &str) -> bool {
        self.filterable.iter().any(|f| f == field)
    }
}

/// The exact slice to render plus the metadata page controls need
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<'a, R> {
    /// Records visible on the current page, in display order
    pub items: Vec<&'a R>,
    /// Records left after search and filters
    pub total_items: usize,
    /// `ceil(total_items / page_size)`
    pub total_pages: usize,
    /// Page the slice was cut for
    pub current_page: usize,
    /// 1-based index of the first visible record, 0 when the slice is empty
    pub range_start: usize,
    /// 1-based index of the last visible record, 0 when the slice is empty
    pub range_end: usize,
}

/// Run the full pipeline over `records`.
///
/// An out-of-range page yields an empty slice; clamping is the caller's job.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] when the page size is zero or the active
/// sort field has no comparison rule.
pub fn process<'a, R: Record>(
    records: &'a [R],
    state: &FilterState,
    config: &ListConfig,
) -> Result<PageResult<'a, R>> {
    if config.page_size == 0 {
        return Err(Error::InvalidConfig {
            message: "page size must be at least 1".to_string(),
        });
    }
    let rule = config
        .sort_rule(&state.sort_field)
        .ok_or_else(|| Error::InvalidConfig {
            message: format!("'{}' is not a sortable field", state.sort_field),
        })?;

    let needle = state.search_term.to_lowercase();
    let mut matched: Vec<&'a R> = records
        .iter()
        .filter(|record| needle.is_empty() || matches_search(*record, &config.searchable, &needle))
        .filter(|record| matches_filters(*record, config, state))
        .collect();

    // `sort_by` is stable: equal keys keep their pre-sort order in both directions.
    matched.sort_by(|a, b| {
        let ordering = compare(
            sort_key(rule, a.field(&state.sort_field)),
            sort_key(rule, b.field(&state.sort_field)),
        );
        match state.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let total_items = matched.len();
    let total_pages = total_items.div_ceil(config.page_size);
    let current_page = state.current_page.max(1);
    let offset = (current_page - 1).saturating_mul(config.page_size);

    let items: Vec<&'a R> = matched
        .into_iter()
        .skip(offset)
        .take(config.page_size)
        .collect();

    let (range_start, range_end) = if items.is_empty() {
        (0, 0)
    } else {
        (offset + 1, offset + items.len())
    };

    Ok(PageResult {
        items,
        total_items,
        total_pages,
        current_page,
        range_start,
        range_end,
    })
}

fn matches_search<R: Record>(record: &R, fields: &[String], needle: &str) -> bool {
    fields.iter().any(|field| match record.field(field) {
        Some(FieldValue::Text(text)) => text.to_lowercase().contains(needle),
        _ => false,
    })
}

fn matches_filters<R: Record>(record: &R, config: &ListConfig, state: &FilterState) -> bool {
    config.filterable.iter().all(|field| match state.filter(field) {
        FilterValue::All => true,
        FilterValue::Equals(expected) => expected.matches(record.field(field)),
    })
}

#[derive(Debug, PartialEq)]
enum SortKey<'a> {
    Text(Cow<'a, str>),
    Number(f64),
}

fn sort_key(rule: SortRule, value: Option<FieldValue<'_>>) -> Option<SortKey<'_>> {
    let value = value?;
    match rule {
        SortRule::Lexicographic => Some(SortKey::Text(match value {
            FieldValue::Text(text) => Cow::Borrowed(text),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Bool(b) => Cow::Owned(b.to_string()),
            FieldValue::Date(d) => Cow::Owned(d.to_rfc3339()),
        })),
        SortRule::Numeric => match value {
            FieldValue::Number(n) => Some(SortKey::Number(n)),
            FieldValue::Text(text) => text.trim().parse().ok().map(SortKey::Number),
            FieldValue::Bool(b) => Some(SortKey::Number(f64::from(u8::from(b)))),
            FieldValue::Date(d) => Some(epoch_key(d)),
        },
        SortRule::Boolean => match value {
            FieldValue::Bool(b) => Some(SortKey::Number(f64::from(u8::from(b)))),
            _ => None,
        },
        SortRule::Date => match value {
            FieldValue::Date(d) => Some(epoch_key(d)),
            FieldValue::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|d| epoch_key(d.with_timezone(&Utc))),
            _ => None,
        },
    }
}

#[allow(clippy::cast_precision_loss)]
fn epoch_key(date: DateTime<Utc>) -> SortKey<'static> {
    SortKey::Number(date.timestamp_millis() as f64)
}

/// Missing values sort before present ones.
fn compare(a: Option<SortKey<'_>>, b: Option<SortKey<'_>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(SortKey::Text(a)), Some(SortKey::Text(b))) => a.cmp(&b),
        (Some(SortKey::Number(a)), Some(SortKey::Number(b))) => a.total_cmp(&b),
        (Some(SortKey::Number(_)), Some(SortKey::Text(_))) => Ordering::Less,
        (Some(SortKey::Text(_)), Some(SortKey::Number(_))) => Ordering::Greater,
    }
}
