//! Opens (and migrates) the database, optionally bootstraps an admin account.
//!
//! ```text
//! todo-manager [config.json] [--create-admin <email> <password>]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::info;
use todo_manager::{config::ManagerConfig, db::models::NewUser, init_logging, AppState};

struct Args {
    config_path: PathBuf,
    admin: Option<(String, String)>,
}

fn parse_args() -> Result<Args> {
    let mut config_path = PathBuf::from("todo-manager.json");
    let mut admin = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--create-admin" => {
                let (Some(email), Some(password)) = (args.next(), args.next()) else {
                    bail!("--create-admin needs <email> <password>");
                };
                admin = Some((email, password));
            }
            other if other.starts_with("--") => bail!("unknown option {other}"),
            other => config_path = PathBuf::from(other),
        }
    }

    Ok(Args { config_path, admin })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = ManagerConfig::load(&args.config_path)?;
    init_logging(config.log_filter());

    info!("todo-manager starting up...");
    let state = AppState::open(&config)?;

    if let Some((email, password)) = args.admin {
        let admin = state
            .users
            .create_admin(Some(NewUser {
                email,
                password,
                first_name: "Admin".into(),
                last_name: "Admin".into(),
            }))
            .await
            .context("failed to create admin account")?;
        info!("Created admin account {} ({})", admin.id, admin.email);
    }

    let roles = state.roles.get_all().await?;
    let states = state.states.get_all().await?;
    let users = state.users.get_all().await?;
    info!(
        "Database {} ready: {} roles, {} task states, {} users",
        state.db.path().display(),
        roles.len(),
        states.len(),
        users.len()
    );

    Ok(())
}
