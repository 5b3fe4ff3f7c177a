use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AdminError;

/// Roles known to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    SystemAdmin,
    CompanyAdmin,
    ProjectManager,
    Operator,
    Integration,
    /// A role this client does not know yet
    #[serde(other)]
    Unknown,
}

impl UserRole {
    /// Roles an administrator can assign from the user form
    pub const ASSIGNABLE: [UserRole; 3] = [
        UserRole::CompanyAdmin,
        UserRole::ProjectManager,
        UserRole::Operator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "SystemAdmin",
            Self::CompanyAdmin => "CompanyAdmin",
            Self::ProjectManager => "ProjectManager",
            Self::Operator => "Operator",
            Self::Integration => "Integration",
            Self::Unknown => "Unknown",
        }
    }

    /// Only operators sign in with a PIN
    pub fn uses_pin(&self) -> bool {
        matches!(self, Self::Operator)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AdminError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "SystemAdmin" => Ok(Self::SystemAdmin),
            "CompanyAdmin" => Ok(Self::CompanyAdmin),
            "ProjectManager" => Ok(Self::ProjectManager),
            "Operator" => Ok(Self::Operator),
            "Integration" => Ok(Self::Integration),
            other => Err(AdminError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

fn default_active() -> bool {
    true
}

/// A user as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub guid: Uuid,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub company_guid: Option<Uuid>,
}

impl User {
    /// Single-letter avatar
    pub fn initial(&self) -> String {
        self.email
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }
}

/// Body for creating or updating a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserPayload {
    /// Build a payload from raw form input.
    ///
    /// The PIN is only sent for operators and only when one was entered; when
    /// sent it must be exactly six digits.
    pub fn from_form(
        email: &str,
        role: UserRole,
        pin: &str,
        password: &str,
    ) -> Result<Self, AdminError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AdminError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }

        let pin = pin.trim();
        let pin = if role.uses_pin() && !pin.is_empty() {
            if pin.len() != 6 || !pin.chars().all(|c| c.is_ascii_digit()) {
                return Err(AdminError::Validation(
                    "PIN must be exactly 6 digits".to_string(),
                ));
            }
            Some(pin.to_string())
        } else {
            None
        };

        let password = (!password.is_empty()).then(|| password.to_string());

        Ok(Self {
            email: email.to_string(),
            role,
            pin,
            password,
        })
    }
}
