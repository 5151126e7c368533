//! Auth command - session management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use serde_json::json;

use campus_client::{ACCESS_TOKEN_KEY, CredentialStore, USER_ID_KEY, USER_PROFILE_KEY};

use super::Context;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(long, env = "CAMPUS_EMAIL")]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show the stored session
    Status,

    /// Clear stored credentials
    Logout,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login { email, password } => cmd_login(&email, password, ctx).await,
        AuthCommand::Status => cmd_status(ctx),
        AuthCommand::Logout => cmd_logout(ctx),
    }
}

async fn cmd_login(email: &str, password: Option<String>, ctx: &Context) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        println!("No password provided, aborting.");
        return Ok(());
    }

    let client = ctx.client()?;
    let result = client.identity().sign_in(email, &password).await?;

    if ctx.json_output {
        let output = json!({
            "email": email,
            "userId": result.user_id,
            "user": result.user,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let green = Style::new().green();
        let dim = Style::new().dim();
        println!("{} Signed in as {}", green.apply_to("✓"), email);
        if ctx.verbose {
            let store = ctx.credential_store()?;
            println!(
                "{}",
                dim.apply_to(format!("Credentials saved to {}", store.path().display()))
            );
        }
    }

    Ok(())
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let store = ctx.credential_store()?;
    let signed_in = store.get(ACCESS_TOKEN_KEY).is_some();
    let user_id = store.get(USER_ID_KEY);
    let profile = store
        .get(USER_PROFILE_KEY)
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok());

    if ctx.json_output {
        let output = json!({
            "signedIn": signed_in,
            "environment": ctx.settings.environment.as_str(),
            "userId": user_id,
            "user": profile,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Authentication Status");
    println!("---------------------");
    println!("Environment: {}", ctx.settings.environment);

    if signed_in {
        println!("Session: signed in");
        if let Some(id) = user_id {
            println!("  User id: {}", id);
        }
        if let Some(name) = profile
            .as_ref()
            .and_then(|p| p.get("name").or_else(|| p.get("email")))
            .and_then(|v| v.as_str())
        {
            println!("  User: {}", name);
        }
    } else {
        println!("Session: not signed in");
        println!("  Run 'campus auth login --email <email>' to sign in");
    }

    if ctx.verbose {
        let dim = Style::new().dim();
        println!("{}", dim.apply_to(format!("Store: {}", store.path().display())));
    }

    Ok(())
}

fn cmd_logout(ctx: &Context) -> Result<()> {
    let store = ctx.credential_store()?;

    let was_signed_in = store.get(ACCESS_TOKEN_KEY).is_some();
    store.clear_session();

    if was_signed_in {
        tracing::info!("Signed out");
        println!("Signed out. Stored credentials removed.");
    } else {
        println!("Not signed in.");
    }

    Ok(())
}
