//! Doctor command - verify credentials and configuration.

use crate::cli::Output;
use crate::config::{Settings, API_KEY_ENV};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    hint: Option<String>,
}

#[derive(Debug, PartialEq)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);
        if let Some(hint) = &self.hint {
            println!("      {}", style(hint).dim());
        }
    }
}

/// Run the doctor command.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Skape Doctor");
    println!();

    let checks = vec![
        check_credential(settings),
        check_endpoint(settings),
        check_config_file(),
    ];

    for check in &checks {
        check.print();
    }
    println!();

    if checks.iter().any(|c| c.status == CheckStatus::Error) {
        Output::error("Some checks failed. Fix the errors above and re-run.");
        anyhow::bail!("doctor found configuration errors");
    }

    Output::success("All checks passed.");
    Ok(())
}

fn check_credential(settings: &Settings) -> CheckResult {
    match settings.api.resolve_api_key() {
        Ok(_) => CheckResult::ok("API credential", "present"),
        Err(_) => CheckResult::error(
            "API credential",
            "not found",
            &format!("Set the {} environment variable or api.api_key in the config file.", API_KEY_ENV),
        ),
    }
}

fn check_endpoint(settings: &Settings) -> CheckResult {
    match url::Url::parse(&settings.api.endpoint) {
        Ok(parsed) if parsed.scheme() == "https" => {
            CheckResult::ok("API endpoint", &settings.api.endpoint)
        }
        Ok(_) => CheckResult::warning(
            "API endpoint",
            &settings.api.endpoint,
            "Endpoint is not https; the bearer credential will travel unencrypted.",
        ),
        Err(e) => CheckResult::error(
            "API endpoint",
            &format!("invalid URL: {}", e),
            "Fix api.endpoint in the config file.",
        ),
    }
}

fn check_config_file() -> CheckResult {
    let path = Settings::default_config_path();
    if path.exists() {
        CheckResult::ok("Config file", &path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "not found (using defaults)",
            "Run 'skape config init' to create one.",
        )
    }
}
