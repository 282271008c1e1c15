use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::link::LinkSource;
use crate::errors::AppResult;
use crate::identity::Identity;
use crate::open_tracker;
use crate::remote::Credential;
use crate::ui::messages::{info, success, warning};

/// Handle `login` and `logout`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let mut tracker = open_tracker(cfg)?;

    match cmd {
        Commands::Login {
            identity,
            token,
            refresh_token,
        } => {
            let identity = Identity::new(identity.clone())?;
            let credential = Credential {
                token: token.clone(),
                refresh_token: refresh_token.clone(),
            };

            let source = tracker.login(identity.clone(), credential)?;
            let handle = tracker
                .link()
                .map(|l| l.handle.to_string())
                .unwrap_or_default();

            match source {
                LinkSource::Reused => success(format!("Logged in as {identity}, remote store {handle}.")),
                LinkSource::Provisioned => success(format!(
                    "Logged in as {identity}, new remote store {handle} created."
                )),
            }
            warning("Choose how to align local and remote data: run `rpomolog check`, then `rpomolog migrate`.");
        }
        Commands::Logout => match tracker.logout()? {
            Some(identity) => success(format!("Logged out {identity}; local cache removed.")),
            None => info("Nobody is logged in."),
        },
        _ => {}
    }

    Ok(())
}
