use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{UserApi, DEFAULT_PAGE_SIZE};
use crate::auth::AuthService;
use crate::error::AdminResult;
use crate::models::{display_date, User, UserPayload, UserRole};
use crate::pages::navbar::navbar;
use crate::pages::{ActionOutcome, InFlight, ListState, Mount, Page};
use crate::view::{Button, Container, Field, FieldKind, Node, Tone, View};

pub const USER_MODAL: &str = "user-modal";
pub const DELETE_MODAL: &str = "delete-modal";
pub const SAVE_BUTTON: &str = "save-user";

/// Contents of the create/edit modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    /// Set when editing an existing user
    pub user_id: Option<Uuid>,
    pub email: String,
    pub role: UserRole,
    pub pin: String,
    pub password: String,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            user_id: None,
            email: String::new(),
            role: UserRole::ASSIGNABLE[0],
            pin: String::new(),
            password: String::new(),
        }
    }
}

impl UserForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: Some(user.guid),
            email: user.email.clone(),
            role: user.role,
            pin: user.pin.clone().unwrap_or_default(),
            password: String::new(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.user_id.is_some()
    }

    /// The PIN input only exists while Operator is selected
    pub fn pin_visible(&self) -> bool {
        self.role.uses_pin()
    }

    fn save_label(&self, submitting: bool) -> &'static str {
        match (self.is_edit(), submitting) {
            (true, true) => "Updating...",
            (false, true) => "Creating...",
            (true, false) => "Update",
            (false, false) => "Save",
        }
    }

    fn node(&self, submitting: bool) -> Node {
        let mut fields = vec![
            Field::new("email", "Email", FieldKind::Email).value(self.email.clone()),
            Field::new(
                "role",
                "Role",
                FieldKind::Select {
                    options: UserRole::ASSIGNABLE
                        .iter()
                        .map(|r| r.to_string())
                        .collect(),
                },
            )
            .value(self.role.to_string()),
        ];
        if self.pin_visible() {
            fields.push(
                Field::new("pin", "PIN (only for Operators)", FieldKind::Text)
                    .value(self.pin.clone())
                    .hint("6-digit PIN code for operator logins"),
            );
        }
        fields.push(
            Field::new("password", "Password", FieldKind::Password)
                .value(self.password.clone())
                .hint("Optional"),
        );

        Node::Modal {
            id: USER_MODAL.to_string(),
            title: if self.is_edit() {
                "Edit User".to_string()
            } else {
                "Add New User".to_string()
            },
            children: vec![Node::Form {
                id: "user-form".to_string(),
                fields,
                actions: vec![
                    Button::new("cancel-user", "Cancel"),
                    Button::new(SAVE_BUTTON, self.save_label(submitting)).disabled(submitting),
                ],
            }],
        }
    }
}

#[derive(Debug, Default)]
struct UsersState {
    list: ListState<User>,
    form: Option<UserForm>,
    submitting: bool,
    delete_target: Option<Uuid>,
    deleting: bool,
    alert: Option<String>,
}

/// User list with create, edit and delete
pub struct UsersPage {
    auth: Arc<AuthService>,
    users: UserApi,
    mount: Mount,
    state: RwLock<UsersState>,
    submitting: AtomicBool,
}

impl UsersPage {
    pub fn new(auth: Arc<AuthService>, users: UserApi) -> Self {
        Self {
            auth,
            users,
            mount: Mount::default(),
            state: RwLock::new(UsersState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    fn list_nodes(list: &ListState<User>) -> Vec<Node> {
        match list {
            ListState::Loading => vec![Node::Spinner],
            ListState::Failed(message) => vec![Node::banner(
                Tone::Danger,
                format!("Error loading users: {}", message),
            )],
            ListState::Loaded(users) if users.is_empty() => vec![Node::text(
                "No users found. Click \"New User\" to add one.",
            )],
            ListState::Loaded(users) => vec![Node::Table {
                headers: vec![
                    "Email".into(),
                    "Role".into(),
                    "Created".into(),
                    "ID".into(),
                ],
                rows: users
                    .iter()
                    .map(|user| {
                        vec![
                            user.email.clone(),
                            user.role.to_string(),
                            display_date(user.created_at.as_deref()),
                            user.guid.to_string(),
                        ]
                    })
                    .collect(),
            }],
        }
    }

    async fn view(&self) -> View {
        let nav = navbar(&self.auth).await;
        let state = self.state.read().await;

        let mut view = View::new("Users")
            .push(nav)
            .push(Node::heading("Users"))
            .push(Node::Button(Button::new("new-user", "New User")))
            .push(Node::section("users-list", Self::list_nodes(&state.list)));

        if let Some(form) = &state.form {
            view = view.push(form.node(state.submitting));
        }

        if state.delete_target.is_some() {
            view = view.push(Node::Modal {
                id: DELETE_MODAL.to_string(),
                title: "Delete User".to_string(),
                children: vec![
                    Node::text(
                        "Are you sure you want to delete this user? This action cannot be undone.",
                    ),
                    Node::Button(Button::new("cancel-delete", "Cancel")),
                    Node::Button(
                        Button::new(
                            "confirm-delete",
                            if state.deleting { "Deleting..." } else { "Delete" },
                        )
                        .disabled(state.deleting),
                    ),
                ],
            });
        }

        view.alert = state.alert.clone();
        view
    }

    async fn refresh_view(&self) {
        if let Some(container) = self.mount.get().await {
            container.set(self.view().await).await;
        }
    }

    async fn load_list(&self) {
        let list = match self.users.get_users(1, DEFAULT_PAGE_SIZE).await {
            Ok(users) => ListState::Loaded(users),
            Err(e) => {
                warn!(error = %e, "Failed to load users");
                ListState::Failed(e.user_message())
            }
        };
        self.state.write().await.list = list;
    }

    async fn show_alert(&self, message: String) -> ActionOutcome {
        self.state.write().await.alert = Some(message.clone());
        self.refresh_view().await;
        ActionOutcome::Failed(message)
    }

    /// Users currently shown in the list
    pub async fn users(&self) -> Vec<User> {
        match &self.state.read().await.list {
            ListState::Loaded(users) => users.clone(),
            _ => Vec::new(),
        }
    }

    pub async fn form(&self) -> Option<UserForm> {
        self.state.read().await.form.clone()
    }

    pub async fn alert(&self) -> Option<String> {
        self.state.read().await.alert.clone()
    }

    pub async fn dismiss_alert(&self) {
        self.state.write().await.alert = None;
        self.refresh_view().await;
    }

    /// Open an empty form
    pub async fn open_create(&self) {
        self.state.write().await.form = Some(UserForm::default());
        self.refresh_view().await;
    }

    /// Load a user and open the form with its data
    pub async fn open_edit(&self, id: Uuid) -> ActionOutcome {
        match self.users.get_user(id).await {
            Ok(user) => {
                self.state.write().await.form = Some(UserForm::from_user(&user));
                self.refresh_view().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                self.show_alert(format!("Error loading user: {}", e.user_message()))
                    .await
            }
        }
    }

    /// Change the open form, e.g. pick another role
    pub async fn edit_form(&self, change: impl FnOnce(&mut UserForm)) {
        {
            let mut state = self.state.write().await;
            match state.form.as_mut() {
                Some(form) => change(form),
                None => return,
            }
        }
        self.refresh_view().await;
    }

    pub async fn close_form(&self) {
        self.state.write().await.form = None;
        self.refresh_view().await;
    }

    /// Create or update from the open form.
    ///
    /// On failure the form stays open with everything the user typed.
    pub async fn submit(&self) -> ActionOutcome {
        let Some(_in_flight) = InFlight::try_begin(&self.submitting) else {
            debug!("User submission already in flight");
            return ActionOutcome::Ignored;
        };

        let Some(form) = self.form().await else {
            return ActionOutcome::Ignored;
        };

        let payload =
            match UserPayload::from_form(&form.email, form.role, &form.pin, &form.password) {
                Ok(payload) => payload,
                Err(e) => return self.show_alert(format!("Error: {}", e)).await,
            };

        self.state.write().await.submitting = true;
        self.refresh_view().await;

        let result = match form.user_id {
            Some(id) => self.users.update_user(id, &payload).await,
            None => self.users.create_user(&payload).await,
        };

        self.state.write().await.submitting = false;
        match result {
            Ok(_) => {
                info!(role = %payload.role, edit = form.is_edit(), "User saved");
                self.state.write().await.form = None;
                self.load_list().await;
                self.refresh_view().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                warn!(error = %e, "Failed to save user");
                self.show_alert(format!("Error: {}", e.user_message()))
                    .await
            }
        }
    }

    /// Ask for confirmation before deleting
    pub async fn request_delete(&self, id: Uuid) {
        self.state.write().await.delete_target = Some(id);
        self.refresh_view().await;
    }

    pub async fn cancel_delete(&self) {
        self.state.write().await.delete_target = None;
        self.refresh_view().await;
    }

    /// Delete the confirmed user; the dialog stays open on failure
    pub async fn confirm_delete(&self) -> ActionOutcome {
        let Some(_in_flight) = InFlight::try_begin(&self.submitting) else {
            return ActionOutcome::Ignored;
        };
        let Some(id) = self.state.read().await.delete_target else {
            return ActionOutcome::Ignored;
        };

        self.state.write().await.deleting = true;
        self.refresh_view().await;

        let result = self.users.delete_user(id).await;
        self.state.write().await.deleting = false;

        match result {
            Ok(()) => {
                info!(user = %id, "User deleted");
                self.state.write().await.delete_target = None;
                self.load_list().await;
                self.refresh_view().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                warn!(user = %id, error = %e, "Failed to delete user");
                self.show_alert(format!("Error deleting user: {}", e.user_message()))
                    .await
            }
        }
    }
}

#[async_trait]
impl Page for UsersPage {
    async fn render(&self, container: &Container) -> AdminResult<()> {
        self.mount.attach(container).await;
        *self.state.write().await = UsersState::default();
        self.refresh_view().await;

        self.load_list().await;
        self.refresh_view().await;
        Ok(())
    }
}
