//! Login and profile commands.

use console::style;
use dialoguer::{Input, Password};

use relief_core::config::ConfigHandle;
use relief_core::error::{ReliefError, ReliefResult};
use relief_models::UserProfile;

use super::print_json;
use crate::OutputFormat;

pub async fn login(
    config: ConfigHandle,
    email: Option<String>,
    password: Option<String>,
    format: OutputFormat,
) -> ReliefResult<()> {
    // Determine credentials: args > interactive prompt
    let email = match email {
        Some(e) => e,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(|e| ReliefError::Internal(e.to_string()))?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| ReliefError::Internal(e.to_string()))?,
    };

    let api = super::create_api_client(&config).await?;
    let session = api.login(&email, &password).await?;

    match format {
        OutputFormat::Json => print_json(&session),
        OutputFormat::Text => {
            println!(
                "{} logged in as {} ({})",
                style("OK").green().bold(),
                session.user.name,
                session.user.role
            );
            println!("  Token: {}", session.token);
        }
    }
    Ok(())
}

pub async fn profile(config: ConfigHandle, format: OutputFormat) -> ReliefResult<()> {
    let api = super::create_api_client(&config).await?;
    let user = api.profile().await?;

    match format {
        OutputFormat::Json => print_json(&user),
        OutputFormat::Text => print_profile(&user),
    }
    Ok(())
}

fn print_profile(user: &UserProfile) {
    println!("{}", style("Profile").bold().underlined());
    println!("  ID:      {}", user.id);
    println!("  Name:    {}", user.name);
    println!("  Email:   {}", user.email);
    println!("  Role:    {}", user.role);
    println!(
        "  Wallet:  {}",
        user.wallet_address.as_deref().unwrap_or("(none)")
    );
    println!("  Joined:  {}", user.created_at.format("%Y-%m-%d"));
}
