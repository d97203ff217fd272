//! Query parameters and response bodies for the list screens

use crate::error::{ApiError, ApiResult};
use ecofind_core::{
    list_page::{ListPage, LoadState},
    listing::{FilterValue, SortDirection},
    pager::PageControls,
    presets, Record,
};
use serde::{Deserialize, Serialize};

/// Query accepted by `GET /api/kyc/users`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KycQuery {
    /// Free-text search over name, email and business type
    pub search: Option<String>,
    /// `all`, `ADMIN`, `USER` or `SELLER`
    pub role: Option<String>,
    /// `all`, `verified` or `pending`
    pub verification: Option<String>,
    /// Sort field
    pub sort: Option<String>,
    /// `asc` or `desc`
    pub direction: Option<String>,
    /// 1-based page
    pub page: Option<usize>,
}

impl KycQuery {
    fn filters(&self) -> ApiResult<Vec<(&'static str, FilterValue)>> {
        let mut filters = Vec::new();
        if let Some(role) = &self.role {
            filters.push((presets::kyc::ROLE, presets::role_filter(role)?));
        }
        if let Some(verification) = &self.verification {
            filters.push((
                presets::kyc::VERIFIED,
                presets::verification_filter(verification)?,
            ));
        }
        Ok(filters)
    }

    /// Apply this query to the KYC listing
    ///
    /// # Errors
    ///
    /// Returns a bad-request error for an unknown selector or sort field.
    pub fn apply<R: Record>(&self, list: &mut ListPage<R>) -> ApiResult<()> {
        let filters = self.filters()?;
        apply_query(
            list,
            self.search.as_deref(),
            filters,
            self.sort.as_deref(),
            self.direction.as_deref(),
            self.page,
        )
    }
}

/// Query accepted by `GET /api/products/pending`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Free-text search over name, category and seller
    pub search: Option<String>,
    /// `all` or an exact category
    pub category: Option<String>,
    /// Sort field
    pub sort: Option<String>,
    /// `asc` or `desc`
    pub direction: Option<String>,
    /// 1-based page
    pub page: Option<usize>,
}

impl ProductQuery {
    /// Apply this query to the pending-product listing
    ///
    /// # Errors
    ///
    /// Returns a bad-request error for an unknown sort field or direction.
    pub fn apply<R: Record>(&self, list: &mut ListPage<R>) -> ApiResult<()> {
        let filters = self
            .category
            .as_deref()
            .map(|category| (presets::products::CATEGORY, presets::category_filter(category)))
            .into_iter()
            .collect();
        apply_query(
            list,
            self.search.as_deref(),
            filters,
            self.sort.as_deref(),
            self.direction.as_deref(),
            self.page,
        )
    }
}

/// Feed query parameters through the filter-state setters.
///
/// A sort field without a direction keeps the current direction when the
/// field is unchanged and starts ascending otherwise. `page` only applies when
/// no other setter changed anything, since those reset to page 1.
fn apply_query<R: Record>(
    list: &mut ListPage<R>,
    search: Option<&str>,
    filters: Vec<(&'static str, FilterValue)>,
    sort: Option<&str>,
    direction: Option<&str>,
    page: Option<usize>,
) -> ApiResult<()> {
    let direction = direction.map(presets::sort_direction).transpose()?;
    if let Some(field) = sort {
        if list.config().sort_rule(field).is_none() {
            return Err(ApiError::bad_request(format!(
                "'{field}' is not a sortable field"
            )));
        }
    }

    let state = list.filter_mut();
    let mut changed = false;

    if let Some(term) = search {
        changed |= state.set_search(term);
    }
    for (field, value) in filters {
        changed |= state.set_filter(field, value);
    }
    match (sort, direction) {
        (Some(field), direction) => {
            let direction = direction.unwrap_or_else(|| {
                if field == state.sort_field() {
                    state.sort_direction()
                } else {
                    SortDirection::Asc
                }
            });
            changed |= state.set_sort(field, direction);
        }
        (None, Some(direction)) => {
            let field = state.sort_field().to_string();
            changed |= state.set_sort(field, direction);
        }
        (None, None) => {}
    }

    if !changed {
        if let Some(page) = page {
            state.set_page(page);
        }
    }
    Ok(())
}

/// One rendered page of a list screen
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// Rows matching search and filters
    pub total_items: usize,
    /// Number of pages
    pub total_pages: usize,
    /// Page shown
    pub current_page: usize,
    /// 1-based index of the first row shown
    pub range_start: usize,
    /// 1-based index of the last row shown
    pub range_end: usize,
    /// "Showing X to Y of N ..." caption
    pub range_label: String,
    /// Numbered page buttons
    pub controls: PageControls,
    /// Active search term
    pub search: String,
    /// Active sort field
    pub sort: String,
    /// Active sort direction
    pub direction: SortDirection,
    /// Fetch status of the underlying collection
    pub load: LoadState,
}

impl<T: Record + Clone> ListView<T> {
    /// Render the current page; `noun` names the rows in the caption
    ///
    /// # Errors
    ///
    /// Returns an error if the listing configuration is unusable.
    pub fn render(list: &mut ListPage<T>, noun: &str) -> ApiResult<Self> {
        let search = list.filter().search_term().to_string();
        let sort = list.filter().sort_field().to_string();
        let direction = list.filter().sort_direction();
        let load = list.load_state().clone();

        let page = list.page()?;
        Ok(Self {
            range_label: format!(
                "Showing {} to {} of {} {noun}",
                page.range_start, page.range_end, page.total_items
            ),
            controls: PageControls::new(page.current_page, page.total_pages),
            items: page.items.into_iter().cloned().collect(),
            total_items: page.total_items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            range_start: page.range_start,
            range_end: page.range_end,
            search,
            sort,
            direction,
            load,
        })
    }
}
