use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::api::types::LoginRequest;
use crate::api::{users, ApiClient};
use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::session::SessionStore;
use crate::storage::Storage;

/// Handle the parsed action against a session store rooted in the
/// configured state directory.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let storage = Arc::new(Storage::persistent(&globals.state_dir));
    let api = ApiClient::new(&globals.api_url, Arc::clone(&storage))?;
    let session = SessionStore::new(api.clone(), storage);

    match action {
        Action::Login {
            email,
            password,
            pro,
        } => {
            let credentials = LoginRequest { email, password };

            let response = if pro {
                session.login_pro(&credentials).await?
            } else {
                session.login(&credentials).await?
            };

            println!("Signed in as {} ({})", response.first_name, response.role);
        }

        Action::Logout => {
            session.logout();
            println!("Signed out");
        }

        Action::Status => {
            if session.is_authenticated() {
                let name = session.name().unwrap_or_default();
                let role = session.user_type().unwrap_or_default();
                println!("Signed in as {name} ({role})");

                // best effort profile fetch; status still prints offline
                if let Some(id) = session
                    .user_id()
                    .and_then(|id| id.parse::<u64>().ok())
                {
                    match users::fetch_user(&api, id).await {
                        Ok(profile) => println!(
                            "Email: {} (verified: {})",
                            profile.email, profile.is_email_verified
                        ),
                        Err(err) => warn!("could not fetch profile: {err}"),
                    }
                }
            } else {
                println!("Not signed in");
            }

            println!(
                "{} {} ({})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                crate::GIT_COMMIT_HASH
            );
        }
    }

    Ok(())
}
