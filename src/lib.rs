pub mod cli;
pub mod config;
pub mod display;
pub mod editor;
pub mod filter;
pub mod history;
pub mod query;
pub mod result_form;
pub mod time_range;
pub mod validation;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Commands, OutputFormat, cli_parse};
pub use config::{FormConfig, load_config};
pub use editor::{EditorState, SectionKey, SectionRegistry, SectionValue, TimeRangeSection};
pub use filter::{FilterTreeNode, from_filter_tree, to_filter_tree};
pub use history::HistoryManager;
pub use query::{QueryRequest, SubmitError, from_query_request, submit};
pub use result_form::{AttributeSet, ResultForm, ResultFormEditor, validate_result_form};
pub use time_range::{TimeRangeInput, TimeRangeSpec, normalize};
pub use validation::{EditorErrors, ErrorSet, SectionErrors, validate};

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_editor_state(path: &Path) -> Result<EditorState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read editor state '{}'", path.display()))?;
    EditorState::parse(&raw)
        .with_context(|| format!("Invalid editor state '{}'", path.display()))
}

fn read_filter_tree(path: &Path) -> Result<FilterTreeNode> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read filter tree '{}'", path.display()))?;
    json5::from_str(&raw).with_context(|| format!("Invalid filter tree '{}'", path.display()))
}

fn print_blocked(errors: &EditorErrors, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            eprintln!("{}", "Search form has errors:".red().bold());
            eprint!("{}", display::format_errors_text(errors));
        }
        OutputFormat::Json => println!("{}", display::format_errors_json(errors)),
    }
}

pub fn run() -> Result<ExitCode> {
    let cli = cli_parse();
    init_tracing(cli.verbose);

    let form_config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    let format = cli.format;

    match &cli.command {
        Commands::Validate { state } => {
            let state = read_editor_state(state)?;
            let errors = validate(&state);
            validation::warn_unknown_time_properties(&state, &form_config.sections);

            match format {
                OutputFormat::Text if errors.is_empty() => {
                    println!("{}", "All sections valid.".green().bold());
                }
                OutputFormat::Text => {
                    print!("{}", display::format_errors_text(&errors));
                }
                OutputFormat::Json => println!("{}", display::format_errors_json(&errors)),
            }

            Ok(if errors.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Tree { state } => {
            let state = read_editor_state(state)?;
            match submit(&state, &form_config) {
                Ok(request) => {
                    match format {
                        OutputFormat::Text => println!("{}", request.filter_tree),
                        OutputFormat::Json => println!(
                            "{}",
                            serde_json::to_string_pretty(&request.filter_tree)?
                        ),
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    print_blocked(err.errors(), format);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Build {
            state,
            id,
            batch_id,
        } => {
            let state = read_editor_state(state)?;
            match submit(&state, &form_config) {
                Ok(mut request) => {
                    if let Some(id) = id {
                        request = request.with_id(id);
                    }
                    if let Some(batch_id) = batch_id {
                        request = request.with_batch_id(batch_id);
                    }
                    println!("{}", serde_json::to_string_pretty(&request)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    print_blocked(err.errors(), format);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Parse { tree } => {
            let tree = read_filter_tree(tree)?;
            let state = from_filter_tree(&tree);
            match format {
                OutputFormat::Text => print!("{}", display::format_state_text(&state)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
