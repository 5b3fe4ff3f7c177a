use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AdminResult;
use crate::view::Container;

pub mod companies;
pub mod dashboard;
pub mod login;
pub mod navbar;
pub mod users;

pub use companies::{CompaniesPage, CompanyForm};
pub use dashboard::DashboardPage;
pub use login::LoginPage;
pub use users::{UserForm, UsersPage};

/// A screen the router can render.
///
/// Implementations show a skeleton first, then the populated view. Data
/// failures end up inline in the view; an `Err` makes the router show its
/// generic error page.
#[async_trait]
pub trait Page: Send + Sync {
    async fn render(&self, container: &Container) -> AdminResult<()>;
}

/// Result of a user action on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The action failed; the message was shown to the user
    Failed(String),
    /// Another submission was still in flight
    Ignored,
}

/// Marks a submission as in flight until dropped
pub(crate) struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    pub(crate) fn try_begin(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Remote list data as a page sees it
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Loading,
    Loaded(Vec<T>),
    Failed(String),
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

/// The container a page last rendered into
#[derive(Default)]
pub(crate) struct Mount {
    container: RwLock<Option<Container>>,
}

impl Mount {
    pub(crate) async fn attach(&self, container: &Container) {
        *self.container.write().await = Some(container.clone());
    }

    pub(crate) async fn get(&self) -> Option<Container> {
        self.container.read().await.clone()
    }
}
