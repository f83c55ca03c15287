use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_admin::config::Config;
use roster_admin::error::Error;
use roster_admin::models::student::StudentInput;
use roster_admin::models::user::{Role, UserInput};
use roster_admin::services::auth::SessionManager;
use roster_admin::services::students::StudentController;
use roster_admin::services::users::UserController;
use roster_admin::store::CredentialStore;

#[derive(Parser)]
#[command(name = "rosterctl", about = "Administer the student roster service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate and store the session locally
    Login { username: String, password: String },
    /// Clear the stored session
    Logout,
    /// Show the current session
    Whoami,
    /// Manage student records
    Students {
        #[command(subcommand)]
        action: StudentAction,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum StudentAction {
    /// List students, optionally filtered and paged
    List {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// Create a student record
    Add {
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        email: String,
    },
    /// Replace a student record by id
    Update {
        id: i64,
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        email: String,
    },
    /// Delete a student record by id
    Rm {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List user accounts, optionally filtered and paged
    List {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// Create a user account
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "USER")]
        role: Role,
    },
    /// Replace a user account by id
    Update {
        id: i64,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "USER")]
        role: Role,
    },
    /// Delete a user account by id
    Rm {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("building HTTP client")?;

    let store = CredentialStore::new(config.session_file.clone());
    let session = Arc::new(SessionManager::new(
        http.clone(),
        &config.api_base_url,
        store,
    ));

    match cli.command {
        Command::Login { username, password } => {
            session.login(&username, &password).await?;
            println!(
                "Logged in as {} ({})",
                session.current_username(),
                display_role(&session.current_role())
            );
        }
        Command::Logout => {
            session.logout()?;
            println!("Session cleared");
        }
        Command::Whoami => {
            if session.is_authenticated() {
                println!(
                    "{} ({})",
                    session.current_username(),
                    display_role(&session.current_role())
                );
            } else {
                println!("Not logged in");
            }
        }
        Command::Students { action } => {
            let mut controller =
                StudentController::new(http, &config.api_base_url, session, config.page_size);
            run_student_action(&mut controller, action).await?;
        }
        Command::Users { action } => {
            let mut controller =
                UserController::new(http, &config.api_base_url, session, config.page_size);
            run_user_action(&mut controller, action).await?;
        }
    }

    Ok(())
}

async fn run_student_action(
    controller: &mut StudentController,
    action: StudentAction,
) -> anyhow::Result<()> {
    match action {
        StudentAction::List { filter, page } => {
            controller.fetch_all().await.map_err(login_hint)?;
            if let Some(query) = filter {
                controller.apply_filter(&query);
            }
            controller.set_page(page);
            println!("{:<6} {:<20} {:<20} {}", "ID", "FIRSTNAME", "LASTNAME", "EMAIL");
            for student in controller.page_window() {
                println!(
                    "{:<6} {:<20} {:<20} {}",
                    display_id(student.id),
                    student.firstname,
                    student.lastname,
                    student.email
                );
            }
        }
        StudentAction::Add {
            firstname,
            lastname,
            email,
        } => {
            controller.fetch_all().await.map_err(login_hint)?;
            controller
                .create(StudentInput {
                    firstname,
                    lastname,
                    email,
                })
                .await?;
            println!("Student created");
        }
        StudentAction::Update {
            id,
            firstname,
            lastname,
            email,
        } => {
            controller.fetch_all().await.map_err(login_hint)?;
            controller
                .update(
                    id,
                    StudentInput {
                        firstname,
                        lastname,
                        email,
                    },
                )
                .await?;
            println!("Student updated");
        }
        StudentAction::Rm { id, yes } => {
            if !yes && !confirm(&format!("Delete student {id}?"))? {
                println!("Aborted");
                return Ok(());
            }
            controller.delete(id).await.map_err(login_hint)?;
            println!("Student deleted");
        }
    }
    Ok(())
}

async fn run_user_action(controller: &mut UserController, action: UserAction) -> anyhow::Result<()> {
    match action {
        UserAction::List { filter, page } => {
            controller.fetch_all().await.map_err(login_hint)?;
            if let Some(query) = filter {
                controller.apply_filter(&query);
            }
            controller.set_page(page);
            println!("{:<6} {:<20} {}", "ID", "USERNAME", "ROLE");
            for user in controller.page_window() {
                println!(
                    "{:<6} {:<20} {}",
                    display_id(user.id),
                    user.username,
                    user.role
                );
            }
        }
        UserAction::Add {
            username,
            password,
            role,
        } => {
            // The duplicate pre-check runs against the fetched list.
            controller.fetch_all().await.map_err(login_hint)?;
            controller
                .create(UserInput {
                    username,
                    password,
                    role,
                })
                .await?;
            println!("User created");
        }
        UserAction::Update {
            id,
            username,
            password,
            role,
        } => {
            controller.fetch_all().await.map_err(login_hint)?;
            controller
                .update(
                    id,
                    UserInput {
                        username,
                        password,
                        role,
                    },
                )
                .await?;
            println!("User updated");
        }
        UserAction::Rm { id, yes } => {
            if !yes && !confirm(&format!("Delete user {id}?"))? {
                println!("Aborted");
                return Ok(());
            }
            controller.delete(id).await.map_err(login_hint)?;
            println!("User deleted");
        }
    }
    Ok(())
}

/// A rejected session means the stored token is stale; point the user
/// back at login instead of surfacing a bare 401.
fn login_hint(e: Error) -> anyhow::Error {
    match e {
        Error::Unauthorized => {
            anyhow::anyhow!("session rejected by the server — log in again with `rosterctl login`")
        }
        other => other.into(),
    }
}

fn display_role(role: &str) -> &str {
    if role.is_empty() {
        "no role"
    } else {
        role
    }
}

fn display_id(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".into())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
