use crate::auth::AuthService;
use crate::view::{Button, Link, Node};

pub const LOGOUT_BUTTON: &str = "logout";

/// Top navigation shown on every authenticated page
pub async fn navbar(auth: &AuthService) -> Node {
    let role = auth
        .current_session()
        .await
        .map(|session| session.role)
        .filter(|role| !role.is_empty())
        .unwrap_or_else(|| "Guest".to_string());

    Node::Nav {
        brand: "Ra Factory Admin".to_string(),
        links: vec![
            Link::new("Dashboard", "/"),
            Link::new("Users", "/users"),
            Link::new("Companies", "/companies"),
            Link::new("Projects", "/projects"),
            Link::new("Workstations", "/workstations"),
        ],
        role,
        logout: Button::new(LOGOUT_BUTTON, "Logout"),
    }
}
