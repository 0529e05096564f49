// UI layer: the interactive flows, built on `dialoguer`. Each handler
// collects and validates input locally, then runs the remote call through
// the shared retry convention. Aborting an action always returns to the
// menu with the session intact.

use crate::api::{AccountQuery, ApiClient, NewAdmin, Session, Toggle, DEFAULT_BASE_URL};
use crate::logs::{self, Command};
use crate::retry::{run_retryable, Decision, PromptPolicy, RetryPolicy};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process;
use std::time::Duration;

/// Where the analytics snapshot is saved on request.
const ANALYTICS_FILE: &str = "opshub-analytics.json";
/// Where the file manager context snapshot is saved on request.
const CONTEXT_FILE: &str = "opshub-filemanager-context.json";

/// Prompt for the backend location, then probe the superuser API. An
/// unreachable or unhealthy backend is a hard startup failure: the process
/// exits immediately, no retry.
pub fn connect() -> Result<ApiClient> {
    let base_url: String = Input::new()
        .with_prompt(format!(
            "Enter backend location (blank for {})",
            DEFAULT_BASE_URL
        ))
        .allow_empty(true)
        .interact_text()?;
    let base_url = if base_url.trim().is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        base_url.trim().to_string()
    };
    let api = ApiClient::new(&base_url)?;

    println!();
    println!("Checking connection to server...");
    if let Err(failure) = with_spinner("Contacting backend...", || api.probe()) {
        println!(
            "ERROR: Could not reach a healthy superuser API at {}. Error: {}",
            api.base_url(),
            failure
        );
        println!("Server response: {}", failure.raw_body_display());
        process::exit(1);
    }
    println!("Connection successful!");
    Ok(api)
}

/// The key prompt loop. A rejected key is discarded and, if the operator
/// chooses to retry, a fresh key is prompted for; declining ends the whole
/// session with a non-zero exit. A successful attempt fixes the key into
/// the returned `Session` for the rest of the run.
pub fn authenticate(api: &ApiClient) -> Result<Session> {
    let mut policy = PromptPolicy;
    println!();
    loop {
        let key: String = Password::new()
            .with_prompt("Enter superuser access key")
            .interact()?;
        match with_spinner("Authorising...", || api.authenticate(&key)) {
            Ok(session) => {
                println!("Authorised successfully!");
                return Ok(session);
            }
            Err(failure) => match policy.on_failure("authenticating with server", &failure) {
                Decision::Retry => continue,
                Decision::Abort => process::exit(1),
            },
        }
    }
}

/// Main interactive menu. Runs until the operator chooses "Exit". One
/// entry per action; the log console entry is purely local.
pub fn main_menu(api: &ApiClient, session: &Session) -> Result<()> {
    let mut policy = PromptPolicy;
    loop {
        println!();
        let items = vec![
            "Retrieve account information",
            "Create admin account",
            "Delete admin account",
            "Retrieve analytics",
            "Retrieve system logs",
            "Retrieve file manager context",
            "Toggle analytics",
            "Toggle assistant chatbot",
            "Toggle usage lock",
            "Open log console",
            "Exit",
        ];
        let selection = Select::new()
            .with_prompt("What would you like to do?")
            .items(&items)
            .default(0)
            .interact()?;
        match selection {
            0 => handle_account_info(api, session, &mut policy)?,
            1 => handle_create_admin(api, session, &mut policy)?,
            2 => handle_delete_admin(api, session, &mut policy)?,
            3 => handle_analytics(api, session, &mut policy)?,
            4 => handle_system_logs(api, session, &mut policy)?,
            5 => handle_file_manager_context(api, session, &mut policy)?,
            6 => handle_toggle(api, session, &mut policy, Toggle::Analytics)?,
            7 => handle_toggle(api, session, &mut policy, Toggle::Chatbot)?,
            8 => handle_toggle(api, session, &mut policy, Toggle::UsageLock)?,
            9 => log_console()?,
            10 => {
                println!("Bye!");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Ask which identifier to use and collect a non-empty value for it.
fn prompt_account_query() -> Result<AccountQuery> {
    let kinds = vec!["ID", "Username", "Email"];
    let kind = Select::new()
        .with_prompt("Identifier type")
        .items(&kinds)
        .default(0)
        .interact()?;
    let value: String = Input::new()
        .with_prompt(format!("Enter {}", kinds[kind].to_lowercase()))
        .validate_with(non_empty)
        .interact_text()?;
    let query = match kind {
        0 => AccountQuery::id(&value),
        1 => AccountQuery::username(&value),
        _ => AccountQuery::email(&value),
    }?;
    Ok(query)
}

fn handle_account_info(api: &ApiClient, session: &Session, policy: &mut PromptPolicy) -> Result<()> {
    let query = prompt_account_query()?;
    let outcome = run_retryable("retrieving account information", policy, || {
        with_spinner("Retrieving account information...", || {
            api.account_info(session, &query)
        })
    });
    match outcome {
        Some(Value::Object(record)) => {
            println!("Retrieved information:");
            for (key, value) in record {
                println!("\t{}: {}", key, value);
            }
        }
        Some(other) => println!("{}", serde_json::to_string_pretty(&other)?),
        None => println!("Retrieve account information aborted."),
    }
    Ok(())
}

fn handle_create_admin(api: &ApiClient, session: &Session, policy: &mut PromptPolicy) -> Result<()> {
    let username: String = Input::new()
        .with_prompt("Enter username for the new admin")
        .validate_with(non_empty)
        .interact_text()?;
    let fname: String = Input::new()
        .with_prompt("Enter first name")
        .validate_with(alphabetic_name)
        .interact_text()?;
    let lname: String = Input::new()
        .with_prompt("Enter last name")
        .validate_with(alphabetic_name)
        .interact_text()?;
    let email: String = Input::new()
        .with_prompt("Enter email")
        .validate_with(plausible_email)
        .interact_text()?;
    let password: String = Password::new()
        .with_prompt("Enter password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;
    let role: String = Input::new()
        .with_prompt("Enter the admin's role")
        .validate_with(non_empty)
        .interact_text()?;

    let admin = NewAdmin {
        username,
        fname,
        lname,
        email,
        password,
        role,
    };
    let outcome = run_retryable("creating admin account", policy, || {
        with_spinner("Creating admin account...", || {
            api.create_admin(session, &admin)
        })
    });
    match outcome {
        Some(body) => println!("Admin account created successfully! Server: {}", body),
        None => println!("Create admin account aborted."),
    }
    Ok(())
}

fn handle_delete_admin(api: &ApiClient, session: &Session, policy: &mut PromptPolicy) -> Result<()> {
    let query = prompt_account_query()?;
    let outcome = run_retryable("deleting admin account", policy, || {
        with_spinner("Deleting admin account...", || {
            api.delete_admin(session, &query)
        })
    });
    match outcome {
        Some(_) => println!("Admin account deleted successfully!"),
        None => println!("Delete admin account aborted."),
    }
    Ok(())
}

fn handle_analytics(api: &ApiClient, session: &Session, policy: &mut PromptPolicy) -> Result<()> {
    let outcome = run_retryable("retrieving analytics", policy, || {
        with_spinner("Retrieving analytics...", || api.analytics(session))
    });
    match outcome {
        Some(value) => {
            println!("Analytics retrieved successfully!");
            println!();
            println!("{}", serde_json::to_string_pretty(&value)?);
            println!();
            offer_save(
                "Save analytics data to file?",
                ANALYTICS_FILE,
                &serde_json::to_string(&value)?,
            )?;
        }
        None => println!("Retrieve analytics aborted."),
    }
    Ok(())
}

fn handle_system_logs(api: &ApiClient, session: &Session, policy: &mut PromptPolicy) -> Result<()> {
    let outcome = run_retryable("accessing system logs", policy, || {
        with_spinner("Accessing system logs...", || api.system_logs(session))
    });
    match outcome {
        Some(lines) => {
            println!("Logs retrieved successfully!");
            println!();
            println!("Displaying {} log entries:", lines.len());
            println!();
            for line in &lines {
                println!("\t{}", line);
            }
            println!();
            // The log console reads this same file later.
            offer_save("Save logs to file?", logs::LOG_EXPORT_FILE, &lines.join("\n"))?;
        }
        None => println!("Access logs aborted."),
    }
    Ok(())
}

fn handle_file_manager_context(
    api: &ApiClient,
    session: &Session,
    policy: &mut PromptPolicy,
) -> Result<()> {
    let outcome = run_retryable("retrieving file manager context", policy, || {
        with_spinner("Retrieving file manager context...", || {
            api.file_manager_context(session)
        })
    });
    match outcome {
        Some(value) => {
            println!("File manager context retrieved successfully!");
            println!();
            println!("{}", serde_json::to_string_pretty(&value)?);
            println!();
            offer_save(
                "Save file manager context to file?",
                CONTEXT_FILE,
                &serde_json::to_string(&value)?,
            )?;
        }
        None => println!("Retrieve file manager context aborted."),
    }
    Ok(())
}

fn handle_toggle(
    api: &ApiClient,
    session: &Session,
    policy: &mut PromptPolicy,
    toggle: Toggle,
) -> Result<()> {
    let prompt = match toggle {
        Toggle::UsageLock => "Lock system usage?".to_string(),
        other => format!("Enable {}?", other.label()),
    };
    let new_status = Confirm::new().with_prompt(prompt).interact()?;

    let action = format!("toggling {}", toggle.label());
    let outcome = run_retryable(&action, policy, || {
        with_spinner(&format!("Toggling {}...", toggle.label()), || {
            api.toggle(session, toggle, new_status)
        })
    });
    match outcome {
        Some(body) => println!("Toggled {} successfully! Server: {}", toggle.label(), body),
        None => println!("Toggle {} aborted.", toggle.label()),
    }
    Ok(())
}

/// The local log console loop: read commands until `exit`. Bad commands and
/// unreadable files abandon only the current command.
pub fn log_console() -> Result<()> {
    println!("LOGGER: Welcome to the log console.");
    loop {
        println!();
        println!("Commands:");
        println!("    read                       Display every log entry");
        println!("    read <N>                   Display the last N entries");
        println!("    read .filter <keywords>    Display entries whose tags contain every keyword");
        println!("    exit                       Leave the log console");
        println!();

        let input: String = Input::new()
            .with_prompt("Enter command")
            .interact_text()?;
        let command = match logs::parse_command(&input) {
            Ok(command) => command,
            Err(err) => {
                println!("LOGGER: {}", err);
                continue;
            }
        };
        if command == Command::Exit {
            println!("LOGGER: Exiting log console...");
            break;
        }

        let all = match logs::read_all(Path::new(logs::LOG_EXPORT_FILE)) {
            Ok(lines) => lines,
            Err(err) => {
                println!("LOGGER: {}", err);
                continue;
            }
        };
        let target: Vec<String> = match command {
            Command::ReadAll => all,
            Command::Tail(count) => logs::tail(&all, count).to_vec(),
            Command::Filter(keywords) => {
                println!("Filtered logs with keywords: {}", keywords.join(" "));
                logs::filter_by_tags(&all, &keywords)
            }
            Command::Exit => unreachable!(),
        };

        println!();
        println!("Displaying {} log entries:", target.len());
        println!();
        for line in &target {
            println!("\t{}", line);
        }
    }
    Ok(())
}

/// Run `f` behind a spinner so the operator sees the console is waiting on
/// the backend rather than hung on input.
fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(message.to_string());
    let result = f();
    spinner.finish_and_clear();
    result
}

/// Offer to persist `contents` to `path`; only writes on explicit consent.
fn offer_save(prompt: &str, path: &str, contents: &str) -> Result<()> {
    let save = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    if save {
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path))?;
        println!("Saved to {}.", path);
    }
    Ok(())
}

// Input validators for `dialoguer`; these re-prompt until satisfied, so the
// payload types always receive already-validated values.

fn non_empty(input: &String) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("Value cannot be empty")
    } else {
        Ok(())
    }
}

fn alphabetic_name(input: &String) -> Result<(), &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(char::is_alphabetic) {
        Err("Name must be non-empty and alphabetic")
    } else {
        Ok(())
    }
}

fn plausible_email(input: &String) -> Result<(), &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        Err("Enter a valid email address")
    } else {
        Ok(())
    }
}
