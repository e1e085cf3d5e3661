//! Credential collection: password strategy and connection descriptor assembly

use crate::error::{DemoError, Result};
use crate::options::OptionSet;
use irods_core_interface::IrodsAccount;
use secrecy::SecretString;
use std::io::IsTerminal;

/// Where the password comes from
pub trait PasswordSource {
    fn read_password(&self) -> Result<SecretString>;
}

/// Prompts on the controlling terminal with echo suppressed.
///
/// Without an interactive terminal (stdin or stdout redirected) the password
/// is the empty string and no error is raised. The prompt itself is drawn on
/// stderr.
#[derive(Debug, Clone)]
pub struct TerminalPassword {
    prompt: String,
}

impl Default for TerminalPassword {
    fn default() -> Self {
        Self {
            prompt: "Password".to_string(),
        }
    }
}

impl TerminalPassword {
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }

    fn is_interactive() -> bool {
        std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }

    fn read(&self, interactive: bool) -> Result<SecretString> {
        if !interactive {
            tracing::debug!("No interactive terminal attached; skipping password prompt");
            return Ok(empty_secret());
        }

        let password = dialoguer::Password::new()
            .with_prompt(&self.prompt)
            .allow_empty_password(true)
            .interact_on(&console::Term::stderr())
            .map_err(|e| DemoError::Password(e.to_string()))?;

        Ok(SecretString::new(password.into_boxed_str()))
    }
}

impl PasswordSource for TerminalPassword {
    fn read_password(&self) -> Result<SecretString> {
        self.read(Self::is_interactive())
    }
}

/// A preset password, for tests and non-interactive callers
#[derive(Clone)]
pub struct FixedPassword(SecretString);

impl FixedPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(SecretString::new(password.into().into_boxed_str()))
    }
}

impl PasswordSource for FixedPassword {
    fn read_password(&self) -> Result<SecretString> {
        Ok(self.0.clone())
    }
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new().into_boxed_str())
}

/// Parse a port option value
///
/// Anything that is not a plain number in `0..=65535`, surrounding
/// whitespace included, is rejected.
pub fn parse_port(value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .map_err(|_| DemoError::InvalidPort(value.to_string()))
}

/// Assemble the connection descriptor from parsed options
///
/// The port is validated before the password source is consulted, so a bad
/// port never triggers a prompt.
pub fn build_account(options: &OptionSet, passwords: &dyn PasswordSource) -> Result<IrodsAccount> {
    let port = parse_port(options.port())?;
    let password = passwords.read_password()?;

    let account = IrodsAccount::new(
        options.host(),
        port,
        options.user(),
        password,
        options.zone(),
    );

    if account.has_empty_password() {
        tracing::warn!("Authenticating with an empty password");
    }
    tracing::debug!(account = %account, home = account.home_directory(), "Built connection descriptor");
    Ok(account)
}
