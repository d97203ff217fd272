//! Dashboard statistics derived from the user and product listings

use crate::types::{Product, Role, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of entries each source contributes to the activity feed
const ACTIVITY_PER_SOURCE: usize = 3;

/// Length of the merged activity feed
const ACTIVITY_LIMIT: usize = 5;

/// Platform counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// All accounts
    pub total_users: usize,
    /// Accounts with the seller role
    pub total_sellers: usize,
    /// All product listings
    pub total_products: usize,
    /// Sellers whose documents are not verified yet
    pub pending_verifications: usize,
    /// Sellers with verified documents
    pub verified_sellers: usize,
    /// Accounts with a confirmed email address
    pub active_users: usize,
}

impl DashboardStats {
    /// Count everything in one pass over each list
    #[must_use]
    pub fn compute(users: &[User], products: &[Product]) -> Self {
        let (total_sellers, verified_sellers) = users
            .iter()
            .filter(|u| u.role == Role::Seller)
            .fold((0, 0), |(sellers, verified), u| {
                (sellers + 1, verified + usize::from(u.is_document_verified))
            });

        Self {
            total_users: users.len(),
            total_sellers,
            total_products: products.len(),
            pending_verifications: total_sellers - verified_sellers,
            verified_sellers,
            active_users: users.iter().filter(|u| u.is_email_verified).count(),
        }
    }
}

/// Source of an activity entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    /// A user account was created
    UserJoined,
    /// A product listing was created
    ProductAdded,
}

/// One line of the activity feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Id of the user or product
    pub id: String,
    /// What happened
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Rendered message
    pub message: String,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

/// Newest-first feed built from the head of each list
#[must_use]
pub fn recent_activity(users: &[User], products: &[Product]) -> Vec<Activity> {
    let joined = users.iter().take(ACTIVITY_PER_SOURCE).map(|u| Activity {
        id: u.id.clone(),
        kind: ActivityKind::UserJoined,
        message: format!("New user {} joined the platform", u.name),
        timestamp: u.created_at,
    });
    let added = products.iter().take(ACTIVITY_PER_SOURCE).map(|p| Activity {
        id: p.id.to_string(),
        kind: ActivityKind::ProductAdded,
        message: format!("New product \"{}\" was added", p.name),
        timestamp: p.created_at,
    });

    let mut feed: Vec<Activity> = joined.chain(added).collect();
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed.truncate(ACTIVITY_LIMIT);
    feed
}

/// Everything the dashboard screen renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Counters
    pub stats: DashboardStats,
    /// Activity feed
    pub recent_activity: Vec<Activity>,
    /// Head of the product list
    pub recent_products: Vec<Product>,
}

impl Dashboard {
    /// Build the dashboard showing up to `recent_products` products
    #[must_use]
    pub fn build(users: &[User], products: &[Product], recent_products: usize) -> Self {
        Self {
            stats: DashboardStats::compute(users, products),
            recent_activity: recent_activity(users, products),
            recent_products: products.iter().take(recent_products).cloned().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn user(id: &str, role: Role, docs: bool, email: bool, day: u32) -> User {
        User {
            id: id.to_string(),
            name: format!("user-{id}"),
            email: format!("{id}@example.com"),
            role,
            address: String::new(),
            country_code: None,
            phone_number: None,
            is_email_verified: email,
            is_document_verified: docs,
            created_at: at(day),
            business_desc: None,
            business_type: None,
            verification_doc_url: None,
        }
    }

    fn product(id: i64, day: u32) -> Product {
        Product {
            id,
            seller_user_id: "s".to_string(),
            seller: None,
            name: format!("PET flakes {id}"),
            price: 1.5,
            currency: "USD".to_string(),
            quantity: 10.0,
            unit: "kg".to_string(),
            category: "PET".to_string(),
            description: String::new(),
            additional_notes: None,
            is_approved: false,
            created_at: at(day),
            updated_at: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_counters() {
        let users = vec![
            user("a", Role::Seller, true, true, 1),
            user("b", Role::Seller, false, false, 2),
            user("c", Role::Seller, false, true, 3),
            user("d", Role::User, false, true, 4),
            user("e", Role::Admin, true, true, 5),
        ];
        let products = vec![product(1, 1), product(2, 2)];

        let stats = DashboardStats::compute(&users, &products);

        assert_eq!(
            stats,
            DashboardStats {
                total_users: 5,
                total_sellers: 3,
                total_products: 2,
                pending_verifications: 2,
                verified_sellers: 1,
                active_users: 4,
            }
        );
    }

    #[test]
    fn test_activity_feed_merges_and_truncates() {
        let users = vec![
            user("a", Role::User, false, false, 10),
            user("b", Role::User, false, false, 2),
            user("c", Role::User, false, false, 8),
            user("d", Role::User, false, false, 28),
        ];
        let products = vec![product(1, 9), product(2, 1), product(3, 11), product(4, 27)];

        let feed = recent_activity(&users, &products);
        let ids: Vec<&str> = feed.iter().map(|a| a.id.as_str()).collect();

        // Only the first three of each list compete.
        assert_eq!(ids, vec!["3", "a", "1", "c", "b"]);
        assert_eq!(feed[1].message, "New user user-a joined the platform");
        assert_eq!(feed[0].message, "New product \"PET flakes 3\" was added");
    }

    #[test]
    fn test_dashboard_recent_products() {
        let products: Vec<Product> = (1..=8).map(|id| product(id, 1)).collect();
        let dashboard = Dashboard::build(&[], &products, 5);

        assert_eq!(dashboard.recent_products.len(), 5);
        assert_eq!(dashboard.recent_products[0].id, 1);
        assert_eq!(dashboard.stats.total_products, 8);

        let json = serde_json::to_value(&dashboard).unwrap();
        assert!(json["recentActivity"][0]["type"] == "PRODUCT_ADDED");
    }
}
