use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::AuthService;
use crate::error::{AdminError, AdminResult};
use crate::pages::{ActionOutcome, InFlight, Mount, Page};
use crate::router::Navigator;
use crate::view::{Button, Container, Field, FieldKind, Node, Tone, View};

const LOGIN_FALLBACK_MESSAGE: &str = "Login failed. Please try again.";
pub const LOGIN_BUTTON: &str = "login";

#[derive(Debug, Default)]
struct LoginState {
    email: String,
    error: Option<String>,
    submitting: bool,
}

/// Credential form; a successful login reboots the shell at `/`
pub struct LoginPage {
    auth: Arc<AuthService>,
    navigator: Arc<dyn Navigator>,
    mount: Mount,
    state: RwLock<LoginState>,
    submitting: AtomicBool,
}

impl LoginPage {
    pub fn new(auth: Arc<AuthService>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            mount: Mount::default(),
            state: RwLock::new(LoginState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    fn view(state: &LoginState) -> View {
        let mut view = View::new("Login")
            .push(Node::heading("Ra Factory"))
            .push(Node::text("Admin Login"));

        if let Some(error) = &state.error {
            view = view.push(Node::banner(Tone::Danger, error.clone()));
        }

        let label = if state.submitting {
            "Signing in..."
        } else {
            "Sign in"
        };
        view.push(Node::Form {
            id: "login-form".to_string(),
            fields: vec![
                Field::new("email", "Email", FieldKind::Email).value(state.email.clone()),
                Field::new("password", "Password", FieldKind::Password),
            ],
            actions: vec![Button::new(LOGIN_BUTTON, label).disabled(state.submitting)],
        })
    }

    async fn refresh_view(&self) {
        if let Some(container) = self.mount.get().await {
            let view = Self::view(&*self.state.read().await);
            container.set(view).await;
        }
    }

    /// Submit the credentials
    pub async fn submit(&self, email: &str, password: &str) -> ActionOutcome {
        let Some(_in_flight) = InFlight::try_begin(&self.submitting) else {
            debug!("Login already in progress");
            return ActionOutcome::Ignored;
        };

        {
            let mut state = self.state.write().await;
            state.email = email.trim().to_string();
            state.error = None;
            state.submitting = true;
        }
        self.refresh_view().await;

        let result = if email.trim().is_empty() || password.is_empty() {
            Err(AdminError::Validation(
                "Please enter your email and password".to_string(),
            ))
        } else {
            self.auth.login(email.trim(), password).await.map(|_| ())
        };

        match result {
            Ok(()) => {
                info!("Login succeeded, opening dashboard");
                self.state.write().await.submitting = false;
                self.navigator.hard_navigate("/");
                ActionOutcome::Completed
            }
            Err(e) => {
                let message = Some(e.user_message())
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| LOGIN_FALLBACK_MESSAGE.to_string());
                {
                    let mut state = self.state.write().await;
                    state.error = Some(message.clone());
                    state.submitting = false;
                }
                self.refresh_view().await;
                ActionOutcome::Failed(message)
            }
        }
    }
}

#[async_trait]
impl Page for LoginPage {
    async fn render(&self, container: &Container) -> AdminResult<()> {
        self.mount.attach(container).await;
        *self.state.write().await = LoginState::default();
        self.refresh_view().await;
        Ok(())
    }
}
