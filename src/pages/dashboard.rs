use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{Count, DashboardApi, DashboardCounts, UserApi, RECENT_ACTIVITY_LIMIT};
use crate::auth::AuthService;
use crate::error::AdminResult;
use crate::models::{display_date, parse_timestamp, Activity, Company, User};
use crate::pages::navbar::navbar;
use crate::pages::Page;
use crate::view::{Container, Link, Node, Tone, View};

const USERS_PREVIEW_SIZE: u32 = 5;

/// Landing page: company card, counts, activity feed and a users preview
pub struct DashboardPage {
    auth: Arc<AuthService>,
    dashboard: DashboardApi,
    users: UserApi,
}

impl DashboardPage {
    pub fn new(auth: Arc<AuthService>, dashboard: DashboardApi, users: UserApi) -> Self {
        Self {
            auth,
            dashboard,
            users,
        }
    }

    fn stat(label: &str, value: Option<Count>, link: Link) -> Node {
        Node::Stat {
            label: label.to_string(),
            value: value.map(|v| v.to_string()),
            link,
        }
    }

    fn stats(counts: Option<DashboardCounts>) -> Vec<Node> {
        vec![
            Self::stat(
                "Users",
                counts.map(|c| c.users),
                Link::new("Manage Users", "/users"),
            ),
            Self::stat(
                "Companies",
                counts.map(|c| c.companies),
                Link::new("Manage Companies", "/companies"),
            ),
            Self::stat(
                "Projects",
                counts.map(|c| c.projects),
                Link::new("View Projects", "/projects"),
            ),
            Self::stat(
                "Workstations",
                counts.map(|c| c.workstations),
                Link::new("Manage Workstations", "/workstations"),
            ),
        ]
    }

    async fn skeleton(&self) -> View {
        View::new("Dashboard")
            .push(navbar(&self.auth).await)
            .push(Node::heading("Dashboard"))
            .push(Node::section(
                "company",
                vec![Node::text("Loading company information..."), Node::Spinner],
            ))
            .push(Node::section("stats", Self::stats(None)))
            .push(Node::heading("Recent Activity"))
            .push(Node::section("activity", vec![Node::Spinner]))
            .push(Node::heading("Recent Users"))
            .push(Node::section("recent-users", vec![Node::Spinner]))
    }

    fn company_card(company: Option<&Company>) -> Vec<Node> {
        let Some(company) = company else {
            return vec![Node::text("Company information not available")];
        };

        let mut subtitle = company.plan_label();
        let since = display_date(company.created_at.as_deref());
        if !since.is_empty() {
            subtitle.push_str(&format!(" · Since {}", since));
        }

        let tone = match company.status_label() {
            "Active" => Tone::Success,
            "Trial" => Tone::Warning,
            _ => Tone::Danger,
        };

        vec![
            Node::Badge {
                tone: Tone::Neutral,
                text: company.initials(),
            },
            Node::heading(company.name.clone()),
            Node::text(subtitle),
            Node::Badge {
                tone,
                text: company.status_label().to_string(),
            },
        ]
    }

    fn activity_feed(activity: &[Activity]) -> Vec<Node> {
        if activity.is_empty() {
            return vec![Node::text("No recent activity to display.")];
        }
        let items = activity
            .iter()
            .map(|item| {
                let when = item
                    .timestamp
                    .as_deref()
                    .and_then(parse_timestamp)
                    .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string());
                let mut line = format!("[{}] {}", item.user_initial(), item.action_label());
                for part in [item.details.clone(), when].into_iter().flatten() {
                    if !part.is_empty() {
                        line.push_str(" - ");
                        line.push_str(&part);
                    }
                }
                line
            })
            .collect();
        vec![Node::List { items }]
    }

    fn users_preview(users: AdminResult<Vec<User>>) -> Vec<Node> {
        match users {
            Ok(users) if users.is_empty() => vec![Node::text("No users found.")],
            Ok(users) => vec![Node::Table {
                headers: vec!["User".into(), "Role".into(), "Status".into()],
                rows: users
                    .iter()
                    .map(|user| {
                        vec![
                            format!("{} {}", user.initial(), user.email),
                            user.role.to_string(),
                            user.status_label().to_string(),
                        ]
                    })
                    .collect(),
            }],
            Err(e) => {
                warn!(error = %e, "Users preview unavailable");
                vec![Node::banner(
                    Tone::Danger,
                    "Error loading users. Please try again.",
                )]
            }
        }
    }
}

#[async_trait]
impl Page for DashboardPage {
    async fn render(&self, container: &Container) -> AdminResult<()> {
        container.set(self.skeleton().await).await;

        let company = self.dashboard.get_company_info().await;
        container
            .update(|view| {
                view.replace_section("company", Self::company_card(company.as_ref()));
            })
            .await;

        let counts = self.dashboard.get_dashboard_counts().await;
        container
            .update(|view| {
                view.replace_section("stats", Self::stats(Some(counts)));
            })
            .await;

        let activity = match self
            .dashboard
            .get_recent_activity(RECENT_ACTIVITY_LIMIT)
            .await
        {
            Ok(activity) => activity,
            Err(e) => {
                debug!(error = %e, "Activity feed unavailable");
                Vec::new()
            }
        };
        container
            .update(|view| {
                view.replace_section("activity", Self::activity_feed(&activity));
            })
            .await;

        let users = self.users.get_users(1, USERS_PREVIEW_SIZE).await;
        container
            .update(|view| {
                view.replace_section("recent-users", Self::users_preview(users));
            })
            .await;

        Ok(())
    }
}
