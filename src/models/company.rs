use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::AdminError;
use crate::models::leading_chars;

/// Subscription plan of a company
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionTier {
    Basic,
    Professional,
    Enterprise,
    Other(String),
}

impl SubscriptionTier {
    pub const ALL: [SubscriptionTier; 3] = [
        SubscriptionTier::Basic,
        SubscriptionTier::Professional,
        SubscriptionTier::Enterprise,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic => "Basic",
            Self::Professional => "Professional",
            Self::Enterprise => "Enterprise",
            Self::Other(other) => other,
        }
    }
}

impl Default for SubscriptionTier {
    fn default() -> Self {
        Self::Basic
    }
}

impl From<String> for SubscriptionTier {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Basic" => Self::Basic,
            "Professional" => Self::Professional,
            "Enterprise" => Self::Enterprise,
            _ => Self::Other(value),
        }
    }
}

impl From<SubscriptionTier> for String {
    fn from(tier: SubscriptionTier) -> Self {
        tier.as_str().to_string()
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing state of a company
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Trial,
    Inactive,
    Other(String),
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 3] = [
        SubscriptionStatus::Active,
        SubscriptionStatus::Trial,
        SubscriptionStatus::Inactive,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Trial => "trial",
            Self::Inactive => "inactive",
            Self::Other(other) => other,
        }
    }

    /// Badge text; anything not active or trial reads as inactive
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Trial => "Trial",
            _ => "Inactive",
        }
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl From<String> for SubscriptionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "trial" => Self::Trial,
            "inactive" => Self::Inactive,
            _ => Self::Other(value),
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A company as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub guid: Uuid,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub subscription_tier: Option<SubscriptionTier>,
    #[serde(default)]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Company {
    /// Two-letter avatar: short name, else name, else "??"
    pub fn initials(&self) -> String {
        self.short_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.name.as_str()).filter(|s| !s.is_empty()))
            .map(|s| leading_chars(s, 2))
            .unwrap_or_else(|| "??".to_string())
    }

    /// "Professional Plan", or "No Plan" without a tier
    pub fn plan_label(&self) -> String {
        match &self.subscription_tier {
            Some(tier) => format!("{} Plan", tier),
            None => "No Plan".to_string(),
        }
    }

    pub fn status_label(&self) -> &'static str {
        self.subscription_status
            .as_ref()
            .map(SubscriptionStatus::label)
            .unwrap_or("Inactive")
    }
}

/// Body for creating or updating a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPayload {
    pub name: String,
    pub short_name: String,
    pub subscription_tier: SubscriptionTier,
    pub subscription_status: SubscriptionStatus,
}

impl CompanyPayload {
    /// Trim the text fields and require a name
    pub fn from_form(
        name: &str,
        short_name: &str,
        tier: SubscriptionTier,
        status: SubscriptionStatus,
    ) -> Result<Self, AdminError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminError::Validation("Company name is required".to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            short_name: short_name.trim().to_string(),
            subscription_tier: tier,
            subscription_status: status,
        })
    }
}
