use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, instrument};

use crate::events::{
    EventStream, NavigationEvent, NavigationKind, Subscriber, EVENT_BUFFER_SIZE,
    EVENT_STREAM_CAPACITY,
};
use crate::pages::Page;
use crate::view::{Container, View};

pub mod history;
pub use history::{History, Navigator};

pub const DEFAULT_ROUTE: &str = "/";

/// Whether a link target stays inside the app.
///
/// Only absolute paths qualify; protocol-relative (`//host`) and anything
/// with a scheme are left alone.
pub fn is_in_app_href(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

/// Path portion used for route lookup, without query or fragment
fn route_key(path: &str) -> &str {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    &path[..end]
}

/// Maps paths to pages and renders the current one into the container
pub struct Router {
    routes: HashMap<String, Arc<dyn Page>>,
    history: Arc<History>,
    container: Container,
    events: EventStream<NavigationEvent>,
}

impl Router {
    pub fn new(history: Arc<History>, container: Container) -> Self {
        Self {
            routes: HashMap::new(),
            history,
            container,
            events: EventStream::new(EVENT_STREAM_CAPACITY, EVENT_BUFFER_SIZE),
        }
    }

    /// Register a page for a path
    pub fn route(mut self, path: impl Into<String>, page: Arc<dyn Page>) -> Self {
        self.routes.insert(path.into(), page);
        self
    }

    pub fn subscribe(&self) -> Subscriber<NavigationEvent> {
        self.events.subscribe()
    }

    pub fn current_path(&self) -> String {
        self.history.current_path()
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Render whatever the history currently points at
    pub async fn start(&self) {
        self.resolve(NavigationKind::Initial).await;
    }

    /// Push a path and render it without rebooting
    pub async fn navigate(&self, path: &str) {
        self.history.push(path);
        self.resolve(NavigationKind::Push).await;
    }

    /// Handle activation of a link; returns false when the href is not ours
    pub async fn click_link(&self, href: &str) -> bool {
        if !is_in_app_href(href) {
            debug!(href, "Link left to the default handler");
            return false;
        }
        self.navigate(href).await;
        true
    }

    pub async fn back(&self) -> bool {
        if self.history.back().is_none() {
            return false;
        }
        self.resolve(NavigationKind::Pop).await;
        true
    }

    pub async fn forward(&self) -> bool {
        if self.history.forward().is_none() {
            return false;
        }
        self.resolve(NavigationKind::Pop).await;
        true
    }

    #[instrument(skip(self))]
    async fn resolve(&self, kind: NavigationKind) {
        let path = self.history.current_path();
        let page = self
            .routes
            .get(route_key(&path))
            .or_else(|| self.routes.get(DEFAULT_ROUTE))
            .cloned();

        let Some(page) = page else {
            self.fail(&path, "no page registered".to_string()).await;
            return;
        };

        let outcome = AssertUnwindSafe(page.render(&self.container))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {
                info!(path = %path, ?kind, "Page rendered");
                self.events
                    .publish(NavigationEvent::Navigated { path, kind })
                    .await;
            }
            Ok(Err(e)) => self.fail(&path, e.to_string()).await,
            Err(_) => self.fail(&path, "page render panicked".to_string()).await,
        }
    }

    async fn fail(&self, path: &str, reason: String) {
        error!(path, reason = %reason, "Page render failed");
        self.container.set(View::error_page()).await;
        self.events
            .publish(NavigationEvent::RenderFailed {
                path: path.to_string(),
                reason,
            })
            .await;
    }
}
