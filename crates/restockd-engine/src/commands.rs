use thiserror::Error;
use tokio::sync::RwLock;

use restockd_core::{AddOutcome, Catalog, Priority, ProductSpec, RemoveOutcome, StatusStore};

use crate::format;
use crate::message::Message;
use crate::reconcile::StockFetcher;

const ADD_USAGE: &str = "Usage: add <sku> <zipcode> [name]";
const REMOVE_USAGE: &str = "Usage: remove <sku> <zipcode>";
const DEBUG_USAGE: &str = "Usage: debug <sku> <zipcode>";

/// A parsed operator command.
///
/// Priority arguments stay raw strings here; they are validated against
/// the four tiers at dispatch time so an invalid value produces a
/// user-visible reply instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status {
        priority: Option<String>,
    },
    Add {
        sku: String,
        zip_code: String,
        name: Option<String>,
    },
    Remove {
        sku: String,
        zip_code: String,
    },
    Debug {
        sku: String,
        zip_code: String,
    },
    List {
        priority: Option<String>,
    },
    ListDetailed {
        priority: Option<String>,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("{0}")]
    Usage(&'static str),
}

impl Command {
    /// Parses one input line. A leading `!` is tolerated, the keyword is
    /// case-insensitive, and everything after `add <sku> <zipcode>` joins
    /// into a multi-word product name.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for blank input, `Unknown` for an unrecognized
    /// keyword, and `Usage` when required arguments are missing.
    pub fn parse(input: &str) -> Result<Command, CommandParseError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('!').unwrap_or(trimmed);
        let mut words = trimmed.split_whitespace();
        let Some(keyword) = words.next() else {
            return Err(CommandParseError::Empty);
        };
        let rest: Vec<&str> = words.collect();

        match keyword.to_ascii_lowercase().as_str() {
            "status" => Ok(Command::Status {
                priority: rest.first().map(ToString::to_string),
            }),
            "add" => match rest.as_slice() {
                [] | [_] => Err(CommandParseError::Usage(ADD_USAGE)),
                [sku, zip_code] => Ok(Command::Add {
                    sku: (*sku).to_string(),
                    zip_code: (*zip_code).to_string(),
                    name: None,
                }),
                [sku, zip_code, name @ ..] => Ok(Command::Add {
                    sku: (*sku).to_string(),
                    zip_code: (*zip_code).to_string(),
                    name: Some(name.join(" ")),
                }),
            },
            "remove" => match rest.as_slice() {
                [sku, zip_code] => Ok(Command::Remove {
                    sku: (*sku).to_string(),
                    zip_code: (*zip_code).to_string(),
                }),
                _ => Err(CommandParseError::Usage(REMOVE_USAGE)),
            },
            "debug" => match rest.as_slice() {
                [sku, zip_code] => Ok(Command::Debug {
                    sku: (*sku).to_string(),
                    zip_code: (*zip_code).to_string(),
                }),
                _ => Err(CommandParseError::Usage(DEBUG_USAGE)),
            },
            "list" => Ok(Command::List {
                priority: rest.first().map(ToString::to_string),
            }),
            "listd" | "listdetailed" => Ok(Command::ListDetailed {
                priority: rest.first().map(ToString::to_string),
            }),
            "commands" => Ok(Command::Help),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

/// Executes a command against the catalog and status store, returning the
/// replies to send. Mutating commands log what changed; read commands
/// touch nothing.
pub async fn dispatch<F: StockFetcher>(
    command: Command,
    catalog: &RwLock<Catalog>,
    store: &RwLock<StatusStore>,
    fetcher: &F,
) -> Vec<Message> {
    match command {
        Command::Status { priority } => match parse_filter(priority.as_deref()) {
            Ok(filter) => {
                let catalog = catalog.read().await;
                let store = store.read().await;
                format::status_overview(catalog.products(), &store, filter)
            }
            Err(reply) => vec![reply],
        },
        Command::Add {
            sku,
            zip_code,
            name,
        } => {
            let display = name.unwrap_or_else(|| sku.clone());
            let spec = ProductSpec {
                sku: sku.clone(),
                zip_code: zip_code.clone(),
                name: display.clone(),
                priority: Priority::default(),
                category: "Unknown".to_string(),
                set_name: "Unknown".to_string(),
            };
            let outcome = catalog.write().await.add(spec);
            match outcome {
                AddOutcome::Added => {
                    tracing::info!(sku = %sku, zip_code = %zip_code, "product added to monitoring");
                    vec![Message::text(format!(
                        "Added {display} (SKU: {sku}) at {zip_code} to monitoring list."
                    ))]
                }
                AddOutcome::AlreadyExists => vec![Message::text(format!(
                    "Product {sku} at {zip_code} is already being monitored."
                ))],
            }
        }
        Command::Remove { sku, zip_code } => {
            let outcome = catalog.write().await.remove(&sku, &zip_code);
            match outcome {
                RemoveOutcome::Removed(spec) => {
                    store.write().await.evict(&sku, &zip_code);
                    tracing::info!(sku = %sku, zip_code = %zip_code, "product removed from monitoring");
                    vec![Message::text(format!("Removed {} from monitoring list.", spec.name))]
                }
                RemoveOutcome::NotFound => vec![Message::text(format!(
                    "Product {sku} at {zip_code} not found in monitoring list."
                ))],
            }
        }
        Command::Debug { sku, zip_code } => match fetcher.check(&sku, &zip_code).await {
            Ok(record) => vec![format::debug_report(&sku, &zip_code, &record)],
            Err(error) => vec![format::debug_failure(&sku, &zip_code, &error)],
        },
        Command::List { priority } => match parse_filter(priority.as_deref()) {
            Ok(filter) => format::product_list(catalog.read().await.products(), filter),
            Err(reply) => vec![reply],
        },
        Command::ListDetailed { priority } => match parse_filter(priority.as_deref()) {
            Ok(filter) => format::product_list_detailed(catalog.read().await.products(), filter),
            Err(reply) => vec![reply],
        },
        Command::Help => vec![format::help_message()],
    }
}

fn parse_filter(raw: Option<&str>) -> Result<Option<Priority>, Message> {
    match raw {
        None => Ok(None),
        Some(value) => value.parse::<Priority>().map(Some).map_err(|_| {
            Message::text("Invalid priority filter. Use one of: top, high, medium, low")
        }),
    }
}
