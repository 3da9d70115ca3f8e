use std::io::IsTerminal;

use dialoguer::Password;

/// Resolve the credential file passphrase: flag/env, then config, then a
/// prompt when attached to a terminal.
pub fn resolve_passphrase(
    provided: Option<&str>,
    configured: Option<&str>,
    confirm: bool,
) -> anyhow::Result<String> {
    if let Some(value) = provided
        .into_iter()
        .chain(configured)
        .find(|value| !value.trim().is_empty())
    {
        return Ok(value.to_string());
    }
    if !std::io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set CASINO_PASSPHRASE."
        ));
    }

    let mut prompt = Password::new().with_prompt("Credential file passphrase");
    if confirm {
        prompt = prompt.with_confirmation("Confirm passphrase", "Passphrases do not match");
    }
    prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}
