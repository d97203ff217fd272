//! Backend payloads and configuration for console tests

use ecofind_core::Config;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Token the mock backend hands out
pub const ADMIN_TOKEN: &str = "admin-token";

/// Login response for an administrator
pub fn admin_login() -> Value {
    json!({
        "token": ADMIN_TOKEN,
        "user": user_json("admin-1", "Ada Admin", "ADMIN", true, "2024-01-01T09:00:00Z")
    })
}

/// Login response for an ordinary account
pub fn user_login() -> Value {
    json!({
        "token": "user-token",
        "user": user_json("user-1", "Uma User", "USER", false, "2024-01-02T09:00:00Z")
    })
}

/// One backend user record
pub fn user_json(id: &str, name: &str, role: &str, verified: bool, created_at: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{id}@ecofind.test"),
        "role": role,
        "address": "1 Harbour Road",
        "isEmailVerified": true,
        "isDocumentVerified": verified,
        "createdAt": created_at,
        "businessType": "Recycling"
    })
}

/// `count` users `u01..`, every third one a seller, even ones verified
pub fn users(count: usize) -> Value {
    let users: Vec<Value> = (1..=count)
        .map(|n| {
            let role = if n % 3 == 0 { "SELLER" } else { "USER" };
            user_json(
                &format!("u{n:02}"),
                &format!("User {n:02}"),
                role,
                n % 2 == 0,
                &format!("2024-02-{n:02}T10:00:00Z"),
            )
        })
        .collect();
    json!({ "users": users })
}

/// One backend product record
pub fn product_json(id: i64, name: &str, category: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "sellerUserId": "u03",
        "seller": { "user": { "name": "Sam Seller", "email": "u03@ecofind.test" } },
        "name": name,
        "price": 2.5,
        "currency": "USD",
        "quantity": 100.0,
        "unit": "kg",
        "category": category,
        "description": "Baled post-consumer plastic",
        "isApproved": false,
        "createdAt": created_at,
        "images": []
    })
}

/// Pending products across two categories
pub fn pending_products() -> Value {
    json!([
        product_json(1, "PET bales", "PET", "2024-03-01T08:00:00Z"),
        product_json(2, "HDPE regrind", "HDPE", "2024-03-03T08:00:00Z"),
        product_json(3, "PET flakes", "PET", "2024-03-02T08:00:00Z"),
    ])
}

/// Builder for test configurations
pub struct TestConfigBuilder {
    config: Config,
    temp_dir: TempDir,
}

impl TestConfigBuilder {
    /// Defaults with session storage inside a fresh temp directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.session.storage_path = temp_dir.path().join("session.json");
        config.logging.format = "text".to_string();
        Self { config, temp_dir }
    }

    /// Point the backend client at `url`
    pub fn with_backend(mut self, url: impl Into<String>) -> Self {
        self.config.backend.base_url = url.into();
        self
    }

    /// Post chat leads to `url`
    pub fn with_lead_url(mut self, url: impl Into<String>) -> Self {
        self.config.chat.lead_url = Some(url.into());
        self
    }

    /// Rows per page
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.config.console.page_size = page_size;
        self
    }

    /// Conversation cap and idle expiry in seconds
    pub const fn with_chat_limits(mut self, max_conversations: usize, idle_timeout: u64) -> Self {
        self.config.chat.max_conversations = max_conversations;
        self.config.chat.idle_timeout = idle_timeout;
        self
    }

    /// Leads kept by the chat-lead endpoint
    pub const fn with_lead_buffer(mut self, lead_buffer: usize) -> Self {
        self.config.chat.lead_buffer = lead_buffer;
        self
    }

    /// Finish; keep the temp dir alive as long as the config is used
    pub fn build(self) -> (Config, TempDir) {
        (self.config, self.temp_dir)
    }
}
