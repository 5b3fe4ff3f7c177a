use serde::{Deserialize, Serialize};

/// One entry of the recent activity feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Activity {
    pub fn user_initial(&self) -> String {
        self.user
            .as_deref()
            .and_then(|u| u.chars().next())
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn action_label(&self) -> &str {
        self.action.as_deref().unwrap_or("Action")
    }
}
