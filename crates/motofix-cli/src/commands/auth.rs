//! Sign-in, session and sign-out commands

use crate::console::CliConsole;
use motofix_sdk::{MotofixClient, User, VerifyOutcome};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long `logout` waits for the server-side invalidation
const INVALIDATE_WAIT: Duration = Duration::from_secs(5);

pub async fn otp(client: &MotofixClient, console: &CliConsole, phone: &str) -> anyhow::Result<()> {
    let normalized = client.request_code(phone).await?;
    console.success(&format!("Code sent to {}", normalized));
    console.hint(&format!("Sign in with: motofix login {} <code>", normalized));
    Ok(())
}

pub async fn login(
    client: &MotofixClient,
    console: &CliConsole,
    phone: &str,
    code: &str,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let user = client.sign_in(phone, code, name).await?;
    console.success(&format!("Signed in. Welcome, {}!", user.greeting_name()));
    print_user(console, &user);
    Ok(())
}

pub async fn whoami(client: &MotofixClient, console: &CliConsole, offline: bool) -> anyhow::Result<()> {
    let restored = client.restore()?;
    let Some(user) = restored.user() else {
        console.warn("Not signed in.");
        return Ok(());
    };
    print_user(console, user);

    if offline {
        console.hint("Cached session, not confirmed with the server");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    let outcome = client.verify_with_cancel(&cancel).await;
    ctrl_c.abort();

    match outcome {
        VerifyOutcome::Verified(user) => {
            console.success(&format!("Session confirmed for {}", user.greeting_name()));
        }
        VerifyOutcome::Expired => console.warn("The server no longer accepts this session."),
        VerifyOutcome::Unverified { error } => {
            console.warn(&format!("Could not confirm the session: {}", error));
        }
        VerifyOutcome::NoSession => console.warn("Not signed in."),
        VerifyOutcome::Cancelled => console.warn("Verification cancelled."),
        VerifyOutcome::AlreadyInFlight => console.info("Verification already running"),
    }
    Ok(())
}

pub async fn logout(client: &MotofixClient, console: &CliConsole) -> anyhow::Result<()> {
    let was_signed_in = client.restore()?.is_authenticated();
    let invalidation = client.sign_out()?;
    if !was_signed_in {
        console.info("No cached session");
    }

    if let Some(handle) = invalidation {
        if tokio::time::timeout(INVALIDATE_WAIT, handle).await.is_err() {
            tracing::debug!("token invalidation still pending at exit");
        }
    }
    console.success("Signed out.");
    Ok(())
}

/// Signed-in user, or an error telling the user to sign in first
pub fn require_user(client: &MotofixClient) -> anyhow::Result<User> {
    client.restore()?.user().cloned().ok_or_else(|| {
        anyhow::anyhow!("Not signed in. Run `motofix otp <phone>` then `motofix login`.")
    })
}

fn print_user(console: &CliConsole, user: &User) {
    console.field("Name", user.greeting_name());
    console.field("Phone", &user.phone);
    console.field("Role", &format!("{:?}", user.role).to_lowercase());
    console.field("User ID", &user.id);
}
