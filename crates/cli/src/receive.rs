//! `stockroom receive` — config-driven delivery reconciliation sessions.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Deserialize;
use stockroom_receiving::{Bucket, GroupKey, ReconcileSession};

use crate::exit_codes::{
    EXIT_ERROR, EXIT_RECEIVE_BLOCKED, EXIT_RECEIVE_INVALID_CONFIG, EXIT_RECEIVE_RUNTIME, EXIT_USAGE,
};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReceiveCommands {
    /// Run a reconciliation session from a TOML config file
    #[command(after_help = "\
Examples:
  stockroom receive run delivery.toml
  stockroom receive run delivery.toml --json
  stockroom receive run delivery.toml --output change-set.json")]
    Run {
        /// Path to the session config file
        config: PathBuf,

        /// Print the change-set JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the change-set JSON to a file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a session config without running it
    #[command(after_help = "\
Examples:
  stockroom receive validate delivery.toml")]
    Validate {
        /// Path to the session config file
        config: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Session config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    pub order: String,
    /// Line-items CSV, relative to the config file.
    pub items: String,
    /// Prior-issues CSV. Missing or unreadable degrades to empty history.
    #[serde(default)]
    pub issues: Option<String>,
    #[serde(default)]
    pub general_notes: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ActionConfig {
    /// Group key as rendered in summaries: `<item_type>-<merchant|no-merchant>`.
    pub group: String,
    pub op: ActionOp,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub qty: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOp {
    Select,
    Deselect,
    AllGood,
    AllDamaged,
    AllMissing,
    AllWrong,
    Set,
    Notes,
}

impl SessionConfig {
    pub fn from_toml(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn cmd_receive(cmd: ReceiveCommands) -> Result<(), CliError> {
    match cmd {
        ReceiveCommands::Run { config, json, output } => cmd_receive_run(config, json, output),
        ReceiveCommands::Validate { config } => cmd_receive_validate(config),
    }
}

fn receive_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn load_config(config_path: &Path) -> Result<SessionConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| receive_err(EXIT_USAGE, format!("cannot read config: {e}")))?;
    SessionConfig::from_toml(&config_str)
        .map_err(|e| receive_err(EXIT_RECEIVE_INVALID_CONFIG, e))
}

/// Open a ready session from the config's CSV inputs. A missing or bad
/// issues file is a soft failure: warn and proceed with empty history.
fn open_session(config: &SessionConfig, base_dir: &Path) -> Result<ReconcileSession, CliError> {
    let items_path = base_dir.join(&config.items);
    let items_csv = std::fs::read_to_string(&items_path).map_err(|e| {
        receive_err(EXIT_RECEIVE_RUNTIME, format!("cannot read {}: {e}", items_path.display()))
    })?;
    let items = crate::load::load_line_items(&items_csv)
        .map_err(|e| receive_err(EXIT_RECEIVE_RUNTIME, format!("{}: {e}", items_path.display())))?;

    let history: Result<_, String> = match &config.issues {
        Some(file) => {
            let path = base_dir.join(file);
            std::fs::read_to_string(&path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))
                .and_then(|csv| crate::load::load_issues(&csv))
        }
        None => Ok(Vec::new()),
    };
    if let Err(ref e) = history {
        eprintln!("warning: issue history unavailable ({e}); proceeding without it");
    }

    let mut session = ReconcileSession::open(&config.order, items);
    session
        .resolve_history(history)
        .map_err(|e| receive_err(EXIT_RECEIVE_RUNTIME, e.to_string()))?;
    Ok(session)
}

fn find_key(session: &ReconcileSession, group: &str) -> Result<GroupKey, CliError> {
    session
        .groups()
        .iter()
        .map(|g| &g.key)
        .find(|k| k.to_string() == group)
        .cloned()
        .ok_or_else(|| receive_err(EXIT_RECEIVE_INVALID_CONFIG, format!("unknown group: {group}")))
}

fn apply_action(session: &mut ReconcileSession, action: &ActionConfig) -> Result<(), CliError> {
    let key = find_key(session, &action.group)?;
    let engine_err =
        |e: stockroom_receiving::ReceivingError| receive_err(EXIT_RECEIVE_RUNTIME, e.to_string());

    match action.op {
        ActionOp::Select => {
            if !session.status(&key).is_some_and(|s| s.selected) {
                session.toggle_select(&key).map_err(engine_err)?;
            }
        }
        ActionOp::Deselect => {
            if session.status(&key).is_some_and(|s| s.selected) {
                session.toggle_select(&key).map_err(engine_err)?;
            }
        }
        ActionOp::AllGood => session.quick_fill(&key, Bucket::ReceivedGood).map_err(engine_err)?,
        ActionOp::AllDamaged => session.quick_fill(&key, Bucket::Damaged).map_err(engine_err)?,
        ActionOp::AllMissing => session.quick_fill(&key, Bucket::NeverArrived).map_err(engine_err)?,
        ActionOp::AllWrong => session.quick_fill(&key, Bucket::WrongItem).map_err(engine_err)?,
        ActionOp::Set => {
            let bucket_name = action.bucket.as_deref().ok_or_else(|| {
                receive_err(EXIT_RECEIVE_INVALID_CONFIG, format!("'{}': set needs a bucket", action.group))
            })?;
            let bucket: Bucket = bucket_name.parse().map_err(|()| {
                receive_err(EXIT_RECEIVE_INVALID_CONFIG, format!("unknown bucket: {bucket_name}"))
            })?;
            let qty = action.qty.ok_or_else(|| {
                receive_err(EXIT_RECEIVE_INVALID_CONFIG, format!("'{}': set needs a qty", action.group))
            })?;
            session.set_quantity(&key, bucket, qty).map_err(engine_err)?;
        }
        ActionOp::Notes => {
            let notes = action.notes.as_deref().ok_or_else(|| {
                receive_err(EXIT_RECEIVE_INVALID_CONFIG, format!("'{}': notes op needs notes", action.group))
            })?;
            session.set_issue_notes(&key, notes).map_err(engine_err)?;
        }
    }
    Ok(())
}

fn cmd_receive_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let mut session = open_session(&config, base_dir)?;
    session.set_general_notes(config.general_notes.clone());

    for action in &config.actions {
        apply_action(&mut session, action)?;
    }

    // Human summary to stderr
    let progress = session.progress();
    eprintln!(
        "receive '{}': {} groups — {} selected, {} valid, {} with issues, {} fully accounted ({}%)",
        session.order_id(),
        progress.groups,
        progress.selected,
        progress.valid,
        progress.with_issues,
        progress.fully_accounted,
        progress.percent_accounted,
    );

    let report = session.validation();
    if !report.can_submit {
        for key in &report.invalid {
            eprintln!("  invalid: {key}");
        }
        for key in &report.missing_notes {
            eprintln!("  missing notes: {key}");
        }
        let reason = if report.selected == 0 {
            "no groups selected".to_string()
        } else {
            format!(
                "{} invalid, {} missing notes",
                report.invalid.len(),
                report.missing_notes.len()
            )
        };
        return Err(receive_err(EXIT_RECEIVE_BLOCKED, format!("submission blocked: {reason}")));
    }

    let change_set = session
        .build_change_set(chrono::Utc::now())
        .map_err(|e| receive_err(EXIT_RECEIVE_RUNTIME, e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&change_set)
        .map_err(|e| receive_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| receive_err(EXIT_RECEIVE_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    eprintln!(
        "change-set: {} line item(s), {} issue entr(ies)",
        change_set.items.len(),
        change_set.items.iter().map(|i| i.issues.len()).sum::<usize>(),
    );

    Ok(())
}

fn cmd_receive_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: session for order '{}' with {} action(s){}",
        config.order,
        config.actions.len(),
        if config.issues.is_some() { "" } else { ", no issue history" },
    );
    Ok(())
}
