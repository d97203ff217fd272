//! Listing configurations for the KYC and pending-product review screens,
//! plus the query vocabulary those screens accept.

use crate::{
    listing::{FilterState, FilterValue, ListConfig, Scalar, SortDirection, SortRule},
    types::Role,
    Error, Result,
};

/// Field names used by the KYC user listing
pub mod kyc {
    /// Role filter field
    pub const ROLE: &str = "role";
    /// Document verification filter field
    pub const VERIFIED: &str = "isDocumentVerified";
    /// Default sort field
    pub const DEFAULT_SORT: &str = "name";
}

/// Field names used by the pending-product listing
pub mod products {
    /// Category filter field
    pub const CATEGORY: &str = "category";
    /// Default sort field
    pub const DEFAULT_SORT: &str = "createdAt";
}

/// Listing of users awaiting identity verification
#[must_use]
pub fn kyc_users(page_size: usize) -> ListConfig {
    ListConfig::new(page_size)
        .searchable("name")
        .searchable("email")
        .searchable("businessType")
        .filterable(kyc::ROLE)
        .filterable(kyc::VERIFIED)
        .sortable("name", SortRule::Lexicographic)
        .sortable("email", SortRule::Lexicographic)
        .sortable("role", SortRule::Lexicographic)
        .sortable("createdAt", SortRule::Date)
        .sortable("isDocumentVerified", SortRule::Boolean)
}

/// Fresh filter state for the KYC screen: name ascending, page 1
#[must_use]
pub fn kyc_state() -> FilterState {
    FilterState::new(kyc::DEFAULT_SORT)
}

/// Listing of products awaiting moderation
#[must_use]
pub fn pending_products(page_size: usize) -> ListConfig {
    ListConfig::new(page_size)
        .searchable("name")
        .searchable("category")
        .searchable("sellerName")
        .filterable(products::CATEGORY)
        .sortable("name", SortRule::Lexicographic)
        .sortable("price", SortRule::Numeric)
        .sortable("quantity", SortRule::Numeric)
        .sortable("createdAt", SortRule::Date)
}

/// Fresh filter state for the pending-product screen: newest first, page 1
#[must_use]
pub fn pending_products_state() -> FilterState {
    let mut state = FilterState::new(products::DEFAULT_SORT);
    state.set_sort(products::DEFAULT_SORT, SortDirection::Desc);
    state
}

/// Parse the role selector (`all`, `ADMIN`, `USER`, `SELLER`)
///
/// # Errors
///
/// Returns [`Error::Validation`] for any other value.
pub fn role_filter(value: &str) -> Result<FilterValue> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(FilterValue::All);
    }
    let role = [Role::Admin, Role::User, Role::Seller]
        .into_iter()
        .find(|role| role.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| Error::Validation {
            field: kyc::ROLE.to_string(),
            message: format!("unknown role '{value}'"),
        })?;
    Ok(FilterValue::Equals(Scalar::Text(role.as_str().to_string())))
}

/// Parse the verification selector (`all`, `verified`, `pending`)
///
/// # Errors
///
/// Returns [`Error::Validation`] for any other value.
pub fn verification_filter(value: &str) -> Result<FilterValue> {
    match value.to_ascii_lowercase().as_str() {
        "all" => Ok(FilterValue::All),
        "verified" => Ok(FilterValue::Equals(Scalar::Bool(true))),
        "pending" => Ok(FilterValue::Equals(Scalar::Bool(false))),
        other => Err(Error::Validation {
            field: "verification".to_string(),
            message: format!("expected all, verified or pending, got '{other}'"),
        }),
    }
}

/// Parse the category selector; anything but `all` is an exact category
#[must_use]
pub fn category_filter(value: &str) -> FilterValue {
    if value.eq_ignore_ascii_case("all") {
        FilterValue::All
    } else {
        FilterValue::Equals(Scalar::Text(value.to_string()))
    }
}

/// Parse a sort direction (`asc`, `desc`)
///
/// # Errors
///
/// Returns [`Error::Validation`] for any other value.
pub fn sort_direction(value: &str) -> Result<SortDirection> {
    match value.to_ascii_lowercase().as_str() {
        "asc" => Ok(SortDirection::Asc),
        "desc" => Ok(SortDirection::Desc),
        other => Err(Error::Validation {
            field: "direction".to_string(),
            message: format!("expected asc or desc, got '{other}'"),
        }),
    }
}
