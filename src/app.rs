use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::api::{ApiClient, CompanyApi, DashboardApi, HttpClient, ReqwestHttpClient, UserApi};
use crate::auth::{AuthService, FileStorage, SessionStorage, TokenStore, LOGIN_PATH};
use crate::config::{Config, SESSION_STORAGE_KEY};
use crate::events::{AuthEvent, NavigationEvent, Subscriber};
use crate::pages::{CompaniesPage, DashboardPage, LoginPage, UsersPage};
use crate::router::{History, Navigator, Router};
use crate::view::{Container, View};

/// Upper bound on consecutive reboots triggered by a single action
const MAX_REBOOTS: usize = 3;

/// The whole console: services, pages and the router, wired together
pub struct AdminApp {
    auth: Arc<AuthService>,
    history: Arc<History>,
    router: Router,
    login: Arc<LoginPage>,
    users: Arc<UsersPage>,
    companies: Arc<CompaniesPage>,
}

impl AdminApp {
    /// Build the app on top of a transport and a storage backend
    pub fn new(
        config: &Config,
        http: Arc<dyn HttpClient>,
        storage: Arc<dyn SessionStorage>,
        initial_path: &str,
    ) -> Self {
        let base_url = config.api.resolved_base_url();
        debug!(base_url = %base_url, initial_path, "Building admin app");

        let history = Arc::new(History::new(initial_path));
        let store = TokenStore::new(storage, SESSION_STORAGE_KEY);
        let auth = Arc::new(AuthService::new(
            http.clone(),
            base_url,
            store,
            history.clone(),
        ));
        let client = Arc::new(ApiClient::new(http, auth.clone()));

        let user_api = UserApi::new(client.clone());
        let company_api = CompanyApi::new(client.clone());
        let dashboard_api = DashboardApi::new(client);

        let login = Arc::new(LoginPage::new(auth.clone(), history.clone()));
        let users = Arc::new(UsersPage::new(auth.clone(), user_api.clone()));
        let companies = Arc::new(CompaniesPage::new(auth.clone(), company_api));
        let dashboard = Arc::new(DashboardPage::new(auth.clone(), dashboard_api, user_api));

        let router = Router::new(history.clone(), Container::new())
            .route("/", dashboard)
            .route(LOGIN_PATH, login.clone())
            .route("/users", users.clone())
            .route("/companies", companies.clone());

        Self {
            auth,
            history,
            router,
            login,
            users,
            companies,
        }
    }

    /// Production wiring: reqwest transport and file-backed session storage
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let http = match config.api.timeout_seconds {
            0 => ReqwestHttpClient::new(),
            secs => ReqwestHttpClient::with_timeout(Duration::from_secs(secs))
                .context("Failed to build HTTP client")?,
        };
        let storage = FileStorage::new(&config.storage.path);
        Ok(Self::new(config, Arc::new(http), Arc::new(storage), "/"))
    }

    /// Start the shell: send unauthenticated visitors to the login page, then
    /// render the current location.
    #[instrument(skip(self))]
    pub async fn boot(&self) {
        let path = self.history.current_path();
        if path != LOGIN_PATH && !self.auth.is_authenticated().await {
            info!(path = %path, "Not authenticated, redirecting to login");
            self.history.hard_navigate(LOGIN_PATH);
            // Already rebooting
            self.history.take_reload();
        }

        self.router.start().await;
    }

    /// Reboot if something asked for a hard navigation; returns whether it did
    pub async fn settle(&self) -> bool {
        let mut reboots = 0;
        while reboots < MAX_REBOOTS && self.history.take_reload() {
            self.boot().await;
            reboots += 1;
        }
        reboots > 0
    }

    /// Follow a link; in-app paths route without a reboot
    pub async fn click(&self, href: &str) -> bool {
        self.router.click_link(href).await
    }

    pub async fn back(&self) -> bool {
        self.router.back().await
    }

    pub async fn forward(&self) -> bool {
        self.router.forward().await
    }

    /// Full reload at the current location
    pub async fn reload(&self) {
        self.history.request_reload();
        self.settle().await;
    }

    pub async fn logout(&self) {
        self.auth.logout().await;
        self.settle().await;
    }

    pub async fn view(&self) -> View {
        self.router.container().snapshot().await
    }

    pub fn current_path(&self) -> String {
        self.history.current_path()
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }

    pub fn login_page(&self) -> &Arc<LoginPage> {
        &self.login
    }

    pub fn users_page(&self) -> &Arc<UsersPage> {
        &self.users
    }

    pub fn companies_page(&self) -> &Arc<CompaniesPage> {
        &self.companies
    }

    pub fn auth_events(&self) -> Subscriber<AuthEvent> {
        self.auth.subscribe()
    }

    pub fn navigation_events(&self) -> Subscriber<NavigationEvent> {
        self.router.subscribe()
    }
}
