use anyhow::{Context, Result};

use speakercheck_cli::render::user_line;

use super::{OrFallback, Session};

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ").context("Failed to read password"),
    }
}

pub async fn login(session: &Session, username: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let auth = session
        .client
        .login(username, &password)
        .await
        .or_fallback("Login failed")?;
    session.tokens.save(&auth.token)?;
    println!("Logged in as {}", user_line(&auth.user));
    Ok(())
}

pub async fn register(session: &Session, username: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let auth = session
        .client
        .register(username, &password)
        .await
        .or_fallback("Registration failed")?;
    session.tokens.save(&auth.token)?;
    println!("Registered and logged in as {}", user_line(&auth.user));
    Ok(())
}

pub async fn logout(session: &Session) -> Result<()> {
    if session.client.token().is_some() {
        // The local token is dropped even if the server no longer knows it.
        if let Err(err) = session.client.logout().await {
            tracing::warn!(error = %err, "server-side logout failed");
        }
    }
    if session.tokens.clear()? {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub async fn whoami(session: &Session) -> Result<()> {
    let user = session
        .client
        .me()
        .await
        .or_fallback("Failed to load profile")?;
    println!("{}", user_line(&user));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_flag_is_used_verbatim() {
        let password = password_or_prompt(Some(" secret ".to_string())).unwrap();
        assert_eq!(password, " secret ");
    }
}
