//! Session commands: login, register, logout, whoami.

use secrecy::SecretString;

use ticketlive_core::Email;
use ticketlive_storefront::api::{Credentials, NewAccount};

use super::{CliError, context};

/// Sign in and persist the session.
pub async fn login(email: &str, password: String) -> Result<(), CliError> {
    let ctx = context()?;

    let session = ctx
        .session
        .login(Credentials {
            email: Email::parse(email)?,
            password: SecretString::from(password),
        })
        .await?;

    tracing::info!("Signed in as {} <{}>", session.name, session.email);
    Ok(())
}

/// Create a new account. A separate `login` is required afterwards.
pub async fn register(
    name: &str,
    email: &str,
    password: String,
    phone: Option<String>,
    address: Option<String>,
) -> Result<(), CliError> {
    let ctx = context()?;

    let password = SecretString::from(password);
    ctx.session
        .register(NewAccount {
            name: name.to_owned(),
            email: Email::parse(email)?,
            confirm_password: password.clone(),
            password,
            phone,
            address,
        })
        .await?;

    tracing::info!("Account created for {email}; sign in with `ticketlive login`");
    Ok(())
}

/// Sign out, clearing the persisted session and cart.
pub fn logout() -> Result<(), CliError> {
    let ctx = context()?;
    ctx.session.logout();
    tracing::info!("Signed out");
    Ok(())
}

/// Show the current session, optionally refreshing it first.
pub async fn whoami(refresh: bool) -> Result<(), CliError> {
    let ctx = context()?;

    let session = if refresh {
        ctx.session.refresh().await
    } else {
        ctx.session.current_user()
    };

    match session {
        Some(session) => {
            tracing::info!(
                "{} <{}>{}",
                session.name,
                session.email,
                if session.is_admin { " (admin)" } else { "" }
            );
        }
        None => tracing::info!("Not signed in"),
    }
    Ok(())
}
