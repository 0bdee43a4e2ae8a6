use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, bail, Result};
use secrecy::SecretString;
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = GlobalArgs::new(
        matches
            .get_one::<String>("api-url")
            .map(String::to_string)
            .ok_or_else(|| anyhow!("missing required argument: --api-url"))?,
        matches
            .get_one::<String>("state-dir")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("missing required argument: --state-dir"))?,
    );

    let action = match matches.subcommand() {
        Some(("login", sub)) => Action::Login {
            email: sub
                .get_one::<String>("email")
                .map(String::to_string)
                .ok_or_else(|| anyhow!("missing required argument: --email"))?,
            password: sub
                .get_one::<String>("password")
                .map(|password| SecretString::from(password.to_string()))
                .ok_or_else(|| anyhow!("missing required argument: --password"))?,
            pro: sub.get_flag("pro"),
        },
        Some(("logout", _)) => Action::Logout,
        Some(("status", _)) => Action::Status,
        _ => bail!("missing subcommand"),
    };

    Ok((action, globals))
}
