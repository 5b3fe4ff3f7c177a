use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{CompanyApi, DEFAULT_PAGE_SIZE};
use crate::auth::AuthService;
use crate::error::AdminResult;
use crate::models::{Company, CompanyPayload, SubscriptionStatus, SubscriptionTier};
use crate::pages::navbar::navbar;
use crate::pages::{ActionOutcome, InFlight, ListState, Mount, Page};
use crate::view::{Button, Container, Field, FieldKind, Node, Tone, View};

pub const COMPANY_MODAL: &str = "company-modal";
pub const DELETE_MODAL: &str = "delete-company-modal";
pub const SAVE_BUTTON: &str = "save-company";

/// Contents of the create/edit modal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyForm {
    pub company_id: Option<Uuid>,
    pub name: String,
    pub short_name: String,
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
}

impl CompanyForm {
    pub fn from_company(company: &Company) -> Self {
        Self {
            company_id: Some(company.guid),
            name: company.name.clone(),
            short_name: company.short_name.clone().unwrap_or_default(),
            tier: company.subscription_tier.clone().unwrap_or_default(),
            status: company.subscription_status.clone().unwrap_or_default(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.company_id.is_some()
    }

    fn node(&self, submitting: bool) -> Node {
        let tiers = SubscriptionTier::ALL.iter().map(|t| t.to_string()).collect();
        let statuses = SubscriptionStatus::ALL
            .iter()
            .map(|s| s.to_string())
            .collect();

        Node::Modal {
            id: COMPANY_MODAL.to_string(),
            title: if self.is_edit() {
                "Edit Company".to_string()
            } else {
                "Add Company".to_string()
            },
            children: vec![Node::Form {
                id: "company-form".to_string(),
                fields: vec![
                    Field::new("name", "Company Name", FieldKind::Text).value(self.name.clone()),
                    Field::new("short_name", "Short Name", FieldKind::Text)
                        .value(self.short_name.clone()),
                    Field::new(
                        "subscription_tier",
                        "Subscription Tier",
                        FieldKind::Select { options: tiers },
                    )
                    .value(self.tier.to_string()),
                    Field::new(
                        "subscription_status",
                        "Status",
                        FieldKind::Select { options: statuses },
                    )
                    .value(self.status.to_string()),
                ],
                actions: vec![
                    Button::new("cancel-company", "Cancel"),
                    Button::new(SAVE_BUTTON, if submitting { "Saving..." } else { "Save" })
                        .disabled(submitting),
                ],
            }],
        }
    }
}

#[derive(Debug, Default)]
struct CompaniesState {
    list: ListState<Company>,
    form: Option<CompanyForm>,
    submitting: bool,
    delete_target: Option<Uuid>,
    deleting: bool,
    alert: Option<String>,
}

/// Company list with create, edit and delete
pub struct CompaniesPage {
    auth: Arc<AuthService>,
    companies: CompanyApi,
    mount: Mount,
    state: RwLock<CompaniesState>,
    submitting: AtomicBool,
}

impl CompaniesPage {
    pub fn new(auth: Arc<AuthService>, companies: CompanyApi) -> Self {
        Self {
            auth,
            companies,
            mount: Mount::default(),
            state: RwLock::new(CompaniesState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    fn list_nodes(list: &ListState<Company>) -> Vec<Node> {
        match list {
            ListState::Loading => vec![Node::Spinner],
            ListState::Failed(message) => vec![Node::banner(
                Tone::Danger,
                format!("Error loading companies: {}", message),
            )],
            ListState::Loaded(companies) if companies.is_empty() => vec![
                Node::text("No companies found"),
                Node::Button(Button::new("add-first-company", "Add Your First Company")),
            ],
            ListState::Loaded(companies) => vec![Node::Table {
                headers: vec![
                    "".into(),
                    "Name".into(),
                    "Plan".into(),
                    "Status".into(),
                    "ID".into(),
                ],
                rows: companies
                    .iter()
                    .map(|company| {
                        vec![
                            company.initials(),
                            company.name.clone(),
                            company.plan_label(),
                            company.status_label().to_string(),
                            company.guid.to_string(),
                        ]
                    })
                    .collect(),
            }],
        }
    }

    async fn view(&self) -> View {
        let nav = navbar(&self.auth).await;
        let state = self.state.read().await;

        let mut view = View::new("Companies")
            .push(nav)
            .push(Node::heading("Companies"))
            .push(Node::Button(Button::new("add-company", "Add Company")))
            .push(Node::section("companies-list", Self::list_nodes(&state.list)));

        if let Some(form) = &state.form {
            view = view.push(form.node(state.submitting));
        }

        if state.delete_target.is_some() {
            view = view.push(Node::Modal {
                id: DELETE_MODAL.to_string(),
                title: "Delete Company".to_string(),
                children: vec![
                    Node::text(
                        "Are you sure you want to delete this company? This action cannot be undone.",
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
        let list = match self.companies.get_companies(1, DEFAULT_PAGE_SIZE).await {
            Ok(companies) => ListState::Loaded(companies),
            Err(e) => {
                warn!(error = %e, "Failed to load companies");
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

    pub async fn companies(&self) -> Vec<Company> {
        match &self.state.read().await.list {
            ListState::Loaded(companies) => companies.clone(),
            _ => Vec::new(),
        }
    }

    pub async fn form(&self) -> Option<CompanyForm> {
        self.state.read().await.form.clone()
    }

    pub async fn alert(&self) -> Option<String> {
        self.state.read().await.alert.clone()
    }

    pub async fn is_delete_dialog_open(&self) -> bool {
        self.state.read().await.delete_target.is_some()
    }

    pub async fn dismiss_alert(&self) {
        self.state.write().await.alert = None;
        self.refresh_view().await;
    }

    pub async fn open_create(&self) {
        self.state.write().await.form = Some(CompanyForm::default());
        self.refresh_view().await;
    }

    /// Open the form for a listed company, fetching it if it is not on screen
    pub async fn open_edit(&self, id: Uuid) -> ActionOutcome {
        let listed = self.companies().await.into_iter().find(|c| c.guid == id);
        let company = match listed {
            Some(company) => company,
            None => match self.companies.get_company(id).await {
                Ok(company) => company,
                Err(e) => {
                    return self
                        .show_alert(format!("Error loading company: {}", e.user_message()))
                        .await
                }
            },
        };

        self.state.write().await.form = Some(CompanyForm::from_company(&company));
        self.refresh_view().await;
        ActionOutcome::Completed
    }

    pub async fn edit_form(&self, change: impl FnOnce(&mut CompanyForm)) {
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

    /// Create or update from the open form; the form survives a failure
    pub async fn submit(&self) -> ActionOutcome {
        let Some(_in_flight) = InFlight::try_begin(&self.submitting) else {
            debug!("Company submission already in flight");
            return ActionOutcome::Ignored;
        };
        let Some(form) = self.form().await else {
            return ActionOutcome::Ignored;
        };

        let payload = match CompanyPayload::from_form(
            &form.name,
            &form.short_name,
            form.tier.clone(),
            form.status.clone(),
        ) {
            Ok(payload) => payload,
            Err(e) => return self.show_alert(e.to_string()).await,
        };

        self.state.write().await.submitting = true;
        self.refresh_view().await;

        let result = match form.company_id {
            Some(id) => self.companies.update_company(id, &payload).await,
            None => self.companies.create_company(&payload).await,
        };

        self.state.write().await.submitting = false;
        match result {
            Ok(_) => {
                info!(name = %payload.name, edit = form.is_edit(), "Company saved");
                self.state.write().await.form = None;
                self.load_list().await;
                self.refresh_view().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                warn!(error = %e, "Failed to save company");
                self.show_alert(format!("Failed to save company: {}", e.user_message()))
                    .await
            }
        }
    }

    pub async fn request_delete(&self, id: Uuid) {
        self.state.write().await.delete_target = Some(id);
        self.refresh_view().await;
    }

    pub async fn cancel_delete(&self) {
        self.state.write().await.delete_target = None;
        self.refresh_view().await;
    }

    /// Delete the confirmed company. The dialog closes either way; the list
    /// is only re-fetched after a successful delete.
    pub async fn confirm_delete(&self) -> ActionOutcome {
        let Some(_in_flight) = InFlight::try_begin(&self.submitting) else {
            return ActionOutcome::Ignored;
        };
        let Some(id) = self.state.read().await.delete_target else {
            return ActionOutcome::Ignored;
        };

        self.state.write().await.deleting = true;
        self.refresh_view().await;

        let result = self.companies.delete_company(id).await;
        {
            let mut state = self.state.write().await;
            state.deleting = false;
            state.delete_target = None;
        }

        match result {
            Ok(()) => {
                info!(company = %id, "Company deleted");
                self.load_list().await;
                self.refresh_view().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                warn!(company = %id, error = %e, "Failed to delete company");
                self.show_alert(format!("Failed to delete company: {}", e.user_message()))
                    .await
            }
        }
    }
}

#[async_trait]
impl Page for CompaniesPage {
    async fn render(&self, container: &Container) -> AdminResult<()> {
        self.mount.attach(container).await;
        *self.state.write().await = CompaniesState::default();
        self.refresh_view().await;

        self.load_list().await;
        self.refresh_view().await;
        Ok(())
    }
}
