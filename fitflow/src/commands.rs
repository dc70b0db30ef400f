use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, bail};
use config::Config;
use guard::{AlwaysActive, GuardTracker, LoginPayload, Route, RouteGuard};
use session::SessionStore;

use crate::args::Command;

pub(crate) async fn run(command: Command, config: Config) -> anyhow::Result<ExitCode> {
    let store = Arc::new(SessionStore::from_config(&config.session));
    let guard = RouteGuard::new(store.clone(), &config.guard);

    match command {
        Command::Login { payload } => {
            let content = std::fs::read_to_string(&payload)
                .with_context(|| format!("Failed to read login payload from {}", payload.display()))?;

            let payload: LoginPayload = serde_json::from_str(&content).context("Invalid login payload")?;
            let logged_in = guard.login(payload)?;

            println!("{}", logged_in.home);
        }
        Command::Logout => {
            guard.logout()?;
            println!("Logged out");
        }
        Command::Whoami => {
            let Some(principal) = store.try_load()? else {
                bail!("No active session");
            };

            println!("identity: {}", principal.identity);

            let roles: Vec<&str> = principal.roles.iter().map(|role| role.tag()).collect();
            println!("roles: {}", roles.join(", "));

            let validator = guard.validator();

            match validator.decode(principal.credential.expose()) {
                Ok(decoded) => {
                    let remaining = decoded.remaining_seconds(validator.now_seconds());
                    println!("expires in: {remaining}s");
                }
                Err(e) => println!("credential: {e}"),
            }
        }
        Command::Check { path } => {
            let route = match config.routes.resolve(&path) {
                Some((key, route)) => {
                    log::debug!("Path {path} is governed by route {key}");
                    Route::from(route)
                }
                None => {
                    log::debug!("No route configured for {path}, requiring any session");
                    Route::any_authenticated()
                }
            };

            let tracker = GuardTracker::new(guard, AlwaysActive, config.guard.account_check_timeout);

            let Some(decision) = tracker.evaluate(&route).await else {
                bail!("Guard evaluation was superseded");
            };

            println!("{decision}");

            if !decision.is_allowed() {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Header => {
            let Some(header) = store.authorization_header() else {
                bail!("No active session");
            };

            println!("{}", header.to_str()?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
