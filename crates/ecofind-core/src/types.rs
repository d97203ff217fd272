//! Marketplace records as decoded from the backend
//!
//! These types are the schema boundary at the network edge: anything the
//! backend returns is decoded into them before the list processor sees it.

use crate::listing::{FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User identifier (UUID string issued by the backend)
pub type UserId = String;

/// Product identifier
pub type ProductId = i64;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular buyer account
    User,
    /// Verified seller account
    Seller,
    /// Console administrator
    Admin,
    /// Any role this console does not know about
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Wire representation of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Seller => "SELLER",
            Self::Admin => "ADMIN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marketplace account as listed on the KYC screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Account role
    pub role: Role,
    /// Postal address
    #[serde(default)]
    pub address: String,
    /// Phone country code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Whether the email address was confirmed
    #[serde(default)]
    pub is_email_verified: bool,
    /// Whether the identity document was approved
    #[serde(default)]
    pub is_document_verified: bool,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Free-text business description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_desc: Option<String>,
    /// Business category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    /// Link to the uploaded verification document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_doc_url: Option<String>,
}

impl User {
    /// Whether this account may use the console
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Apply a successful KYC approval to the local copy
    pub fn mark_verified(&mut self) {
        self.is_document_verified = true;
        self.role = Role::Seller;
    }
}

/// Seller account details embedded in a product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SellerAccount {
    /// Seller name
    pub name: String,
    /// Seller email
    pub email: String,
    /// Seller phone number
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Seller phone country code
    #[serde(default)]
    pub country_code: Option<String>,
    /// Seller address
    #[serde(default)]
    pub address: String,
    /// Whether the seller email was confirmed
    #[serde(default)]
    pub is_email_verified: bool,
    /// Whether the seller identity document was approved
    #[serde(default)]
    pub is_document_verified: bool,
}

/// Wrapper the backend puts around the seller account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seller {
    /// Seller account
    pub user: SellerAccount,
}

/// Product image reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    /// Image identifier
    pub id: i64,
    /// Hosted image URL
    pub url: String,
}

/// A seller product listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Owning seller
    pub seller_user_id: UserId,
    /// Seller details, when the backend embeds them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<Seller>,
    /// Product name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Price currency
    pub currency: String,
    /// Available quantity
    pub quantity: f64,
    /// Quantity unit
    pub unit: String,
    /// Product category
    pub category: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Extra seller notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    /// Moderation state
    #[serde(default)]
    pub is_approved: bool,
    /// Listing creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Attached images
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Name of the seller, if embedded
    #[must_use]
    pub fn seller_name(&self) -> Option<&str> {
        self.seller.as_ref().map(|s| s.user.name.as_str())
    }
}

/// Credentials posted to the backend login endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email
    #[validate(email)]
    pub email: String,
    /// Account password
    #[validate(length(min = 1))]
    pub password: String,
}

/// Successful login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Logged-in account
    pub user: User,
}

/// Envelope of the `/users` listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersEnvelope {
    /// Listed accounts
    pub users: Vec<User>,
}

/// Contact lead collected by the chat dialog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// Company the contact represents
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    /// Contact name
    #[validate(length(min = 1, max = 200))]
    pub user_name: String,
    /// Contact phone number
    #[validate(length(min = 1, max = 40))]
    pub phone_number: String,
}

impl Record for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "name" => Some(FieldValue::Text(&self.name)),
            "email" => Some(FieldValue::Text(&self.email)),
            "role" => Some(FieldValue::Text(self.role.as_str())),
            "address" => Some(FieldValue::Text(&self.address)),
            "businessType" => self.business_type.as_deref().map(FieldValue::Text),
            "businessDesc" => self.business_desc.as_deref().map(FieldValue::Text),
            "isEmailVerified" => Some(FieldValue::Bool(self.is_email_verified)),
            "isDocumentVerified" => Some(FieldValue::Bool(self.is_document_verified)),
            "createdAt" => Some(FieldValue::Date(self.created_at)),
            _ => None,
        }
    }
}

impl Record for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Text(&self.name)),
            "category" => Some(FieldValue::Text(&self.category)),
            "description" => Some(FieldValue::Text(&self.description)),
            "currency" => Some(FieldValue::Text(&self.currency)),
            "sellerName" => self.seller_name().map(FieldValue::Text),
            "price" => Some(FieldValue::Number(self.price)),
            "quantity" => Some(FieldValue::Number(self.quantity)),
            "isApproved" => Some(FieldValue::Bool(self.is_approved)),
            "createdAt" => Some(FieldValue::Date(self.created_at)),
            _ => None,
        }
    }
}
