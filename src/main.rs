use anyhow::{anyhow, Context, Result};
use rafactory_admin::models::{SubscriptionStatus, SubscriptionTier, UserRole};
use rafactory_admin::pages::ActionOutcome;
use rafactory_admin::{load_config, AdminApp, AuthEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const HELP: &str = "\
Commands:
  open <path>                                   follow a link
  back | forward | reload                       history navigation
  login <email> <password>                      sign in from the login page
  logout                                        end the session
  user new <email> <role> [pin]                 create a user
  user edit <id> <email> <role> [pin]           update a user
  user delete <id>                              delete a user
  company new <name> <short> <tier> <status>    create a company
  company edit <id> <name> <short> <tier> <status>
  company delete <id>                           delete a company
  help | quit";

fn parse_id(raw: Option<&&str>) -> Result<Uuid> {
    let raw = raw.ok_or_else(|| anyhow!("missing id"))?;
    Uuid::parse_str(raw).with_context(|| format!("'{}' is not a valid id", raw))
}

fn parse_role(raw: Option<&&str>) -> Result<UserRole> {
    let raw = raw.ok_or_else(|| anyhow!("missing role"))?;
    Ok(raw.parse::<UserRole>()?)
}

fn require_page(app: &AdminApp, path: &str) -> Result<()> {
    let current = app.current_path();
    if current.split(|c: char| c == '?' || c == '#').next() == Some(path) {
        Ok(())
    } else {
        Err(anyhow!("open {} first (currently at {})", path, current))
    }
}

fn report(outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::Completed => debug!("Action completed"),
        ActionOutcome::Failed(message) => warn!(%message, "Action failed"),
        ActionOutcome::Ignored => info!("Action ignored, another one is in flight"),
    }
}

/// Run one shell command; Ok(false) means quit
async fn execute(app: &AdminApp, line: &str) -> Result<bool> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => {}
        ["quit"] | ["exit"] => return Ok(false),
        ["help"] => println!("{}", HELP),
        ["open", href] => {
            if !app.click(href).await {
                println!("{} is not an in-app link", href);
            }
        }
        ["back"] => {
            app.back().await;
        }
        ["forward"] => {
            app.forward().await;
        }
        ["reload"] => app.reload().await,
        ["logout"] => app.logout().await,
        ["login", email, password] => {
            require_page(app, "/login")?;
            report(app.login_page().submit(email, password).await);
        }
        ["user", "new", email, rest @ ..] => {
            require_page(app, "/users")?;
            let role = parse_role(rest.first())?;
            let pin = rest.get(1).map(|p| p.to_string()).unwrap_or_default();
            let page = app.users_page();
            page.open_create().await;
            page.edit_form(|form| {
                form.email = email.to_string();
                form.role = role;
                form.pin = pin;
            })
            .await;
            report(page.submit().await);
        }
        ["user", "edit", rest @ ..] => {
            require_page(app, "/users")?;
            let id = parse_id(rest.first())?;
            let email = rest.get(1).ok_or_else(|| anyhow!("missing email"))?;
            let role = parse_role(rest.get(2))?;
            let pin = rest.get(3).map(|p| p.to_string());
            let page = app.users_page();
            if page.open_edit(id).await != ActionOutcome::Completed {
                return Ok(true);
            }
            page.edit_form(|form| {
                form.email = email.to_string();
                form.role = role;
                if let Some(pin) = pin {
                    form.pin = pin;
                }
            })
            .await;
            report(page.submit().await);
        }
        ["user", "delete", id] => {
            require_page(app, "/users")?;
            let id = parse_id(Some(id))?;
            let page = app.users_page();
            page.request_delete(id).await;
            report(page.confirm_delete().await);
        }
        ["company", "new", name, short, tier, status] => {
            require_page(app, "/companies")?;
            let page = app.companies_page();
            page.open_create().await;
            page.edit_form(|form| {
                form.name = name.to_string();
                form.short_name = short.to_string();
                form.tier = SubscriptionTier::from(tier.to_string());
                form.status = SubscriptionStatus::from(status.to_string());
            })
            .await;
            report(page.submit().await);
        }
        ["company", "edit", id, name, short, tier, status] => {
            require_page(app, "/companies")?;
            let id = parse_id(Some(id))?;
            let page = app.companies_page();
            if page.open_edit(id).await != ActionOutcome::Completed {
                return Ok(true);
            }
            page.edit_form(|form| {
                form.name = name.to_string();
                form.short_name = short.to_string();
                form.tier = SubscriptionTier::from(tier.to_string());
                form.status = SubscriptionStatus::from(status.to_string());
            })
            .await;
            report(page.submit().await);
        }
        ["company", "delete", id] => {
            require_page(app, "/companies")?;
            let id = parse_id(Some(id))?;
            let page = app.companies_page();
            page.request_delete(id).await;
            report(page.confirm_delete().await);
        }
        _ => println!("Unknown command. Type 'help' for a list of commands."),
    }
    Ok(true)
}

async fn print_view(app: &AdminApp) {
    let view = app.view().await;
    println!("\n[{}] {}", app.current_path(), view.title);
    print!("{}", view);

    // Alerts are shown once
    if view.alert.is_some() {
        match app.current_path().as_str() {
            "/users" => app.users_page().dismiss_alert().await,
            "/companies" => app.companies_page().dismiss_alert().await,
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file_path = dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "rafactory_admin=debug,warn".into()
            } else {
                "rafactory_admin=info,warn".into()
            }
        }))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    info!(version = rafactory_admin::VERSION, "Ra Factory admin console starting");
    if let Some(path) = env_file_path {
        debug!(path = %path.display(), "Loaded environment file");
    }

    let config = load_config().await.context("Failed to load configuration")?;
    info!(base_url = %config.api.resolved_base_url(), "Using API");

    let app = AdminApp::from_config(&config)?;

    let mut auth_events = app.auth_events();
    tokio::spawn(async move {
        while let Ok(event) = auth_events.recv().await {
            match event {
                AuthEvent::LoggedIn { role } => info!(%role, "Session started"),
                AuthEvent::TokenRefreshed { expires_at } => {
                    debug!(%expires_at, "Session extended")
                }
                AuthEvent::RefreshFailed { reason } => warn!(%reason, "Session refresh failed"),
                AuthEvent::LoggedOut => info!("Session ended"),
            }
        }
    });

    app.boot().await;
    print_view(&app).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match execute(&app, line.trim()).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("Error: {:#}", e),
        }
        app.settle().await;
        print_view(&app).await;
    }

    info!("Ra Factory admin console exiting");
    Ok(())
}
