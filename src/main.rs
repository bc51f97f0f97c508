//! Payrule TUI Application
//!
//! Terminal form for authoring payment method rules.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use payrule::rules::{
    ConditionId, ConditionKind, ConditionParam, Flag, JsonSink, MatchLogic, RenameMode, RuleForm,
    list_available,
};
use payrule::{Config, ParseError};

#[derive(Parser, Debug)]
#[command(name = "payrule")]
#[command(author, version, about = "Terminal editor for payment method rules")]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the TUI (default)
    Ui,

    /// List the condition catalog
    Conditions {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search payment method candidates
    Methods {
        /// Case-insensitive pattern; lists every candidate when omitted
        query: Option<String>,
    },

    /// Validate config file
    Check {
        /// Path to config file to validate
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Build a rule from flags and print its submission payload
    Preview(PreviewArgs),
}

#[derive(clap::Args, Debug)]
struct PreviewArgs {
    /// Rule name
    #[arg(long, default_value = "")]
    name: String,

    /// Whether all or any conditions must hold
    #[arg(long, value_name = "all|any", default_value = "all")]
    match_logic: MatchLogic,

    /// Do not hide the payment methods
    #[arg(long)]
    no_hide: bool,

    /// Sort the payment methods
    #[arg(long)]
    sort: bool,

    /// Rename the payment methods
    #[arg(long)]
    rename: bool,

    /// Add a condition; ids are assigned from 1 in order
    #[arg(long = "condition", value_name = "KIND")]
    conditions: Vec<ConditionKind>,

    /// Set a condition parameter
    #[arg(long = "param", value_name = "ID:FIELD=VALUE")]
    params: Vec<String>,

    /// Add a payment method
    #[arg(long = "method", value_name = "NAME")]
    methods: Vec<String>,

    /// Set a method's order number
    #[arg(long = "order", value_name = "NAME=VALUE")]
    orders: Vec<String>,

    /// Set a method's rename mode (replace, before, after)
    #[arg(long = "rename-mode", value_name = "NAME=MODE")]
    rename_modes: Vec<String>,

    /// Set a method's new name
    #[arg(long = "rename-value", value_name = "NAME=VALUE")]
    rename_values: Vec<String>,

    /// Print the payload on a single line
    #[arg(long)]
    compact: bool,
}

/// Split `NAME=VALUE`
fn split_assignment<'a>(spec: &'a str, field: &'static str) -> Result<(&'a str, &'a str)> {
    spec.split_once('=')
        .map(|(name, value)| (name.trim(), value))
        .ok_or_else(|| {
            ParseError::InvalidValue {
                field,
                value: spec.to_string(),
            }
            .into()
        })
}

/// Parse `ID:FIELD=VALUE`, where ID may carry a leading `#`
fn parse_param(spec: &str) -> Result<(ConditionId, ConditionParam)> {
    let invalid = || ParseError::InvalidValue {
        field: "param",
        value: spec.to_string(),
    };

    let (id, assignment) = spec.split_once(':').ok_or_else(invalid)?;
    let id: u64 = id
        .trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| invalid())?;
    let (field, value) = assignment.split_once('=').ok_or_else(invalid)?;

    Ok((ConditionId(id), ConditionParam::parse(field, value)?))
}

/// Apply the preview flags to a fresh form
fn build_preview(args: &PreviewArgs) -> Result<RuleForm> {
    let mut form = RuleForm::new();
    form.set_name(args.name.as_str());
    form.set_match_logic(args.match_logic);
    form.set_flag(Flag::Hide, !args.no_hide);
    form.set_flag(Flag::Sort, args.sort);
    form.set_flag(Flag::Rename, args.rename);

    for &kind in &args.conditions {
        form.add_condition(kind);
    }

    for spec in &args.params {
        let (id, param) = parse_param(spec)?;
        if form.draft().condition(id).is_none() {
            bail!("No condition {} for --param '{}'", id, spec);
        }
        if !form.set_condition_parameter(id, param) {
            bail!("Parameter '{}' does not apply to condition {}", spec, id);
        }
    }

    for method in &args.methods {
        form.add_method(method);
    }

    let known = |form: &RuleForm, name: &str, flag: &str| -> Result<()> {
        if form.payments().contains(name) {
            Ok(())
        } else {
            bail!("Unknown payment method '{}' in {}", name, flag)
        }
    };

    for spec in &args.orders {
        let (name, value) = split_assignment(spec, "order")?;
        known(&form, name, "--order")?;
        form.set_order_value(name, value);
    }
    for spec in &args.rename_modes {
        let (name, mode) = split_assignment(spec, "rename-mode")?;
        let mode: RenameMode = mode.parse()?;
        known(&form, name, "--rename-mode")?;
        form.set_rename_mode(name, mode);
    }
    for spec in &args.rename_values {
        let (name, value) = split_assignment(spec, "rename-value")?;
        known(&form, name, "--rename-value")?;
        form.set_rename_value(name, value);
    }

    Ok(form)
}

fn check_config(path: Option<PathBuf>) {
    match Config::load(path.as_deref()) {
        Ok(config) => {
            println!("✓ Config is valid");
            println!("  {} payment methods", config.payment_methods.len());
            println!("  theme: {}", payrule::Theme::load(&config));
            if let Some(log) = config.log_path() {
                println!("  log file: {}", log.display());
            }
        }
        Err(e) => {
            eprintln!("✗ Config error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Initialize logging: `PAYRULE_LOG`, else `--verbose`, else the configured level.
/// The TUI logs to a file so the terminal stays intact.
fn init_logging(config: &Config, verbose: bool, to_file: bool) -> Result<()> {
    let level = if verbose {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    let filter = EnvFilter::try_from_env("PAYRULE_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if !to_file {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
        return Ok(());
    }

    let Some(path) = config.log_path() else {
        registry.init();
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    registry
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Check { config }) = &cli.command {
        check_config(config.clone().or(cli.config.clone()));
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let tui = matches!(cli.command, None | Some(Commands::Ui));
    init_logging(&config, cli.verbose, tui)?;

    match cli.command {
        None | Some(Commands::Ui) => {
            payrule::app::run(config).await?;
        }
        Some(Commands::Conditions { json }) => {
            let entries = list_available();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("Conditions:");
                for entry in entries {
                    println!(
                        "  {} {:<20} {}",
                        entry.kind.icon(),
                        entry.name,
                        entry.description
                    );
                }
            }
        }
        Some(Commands::Methods { query }) => {
            let catalog = config.method_catalog();
            let matches = catalog.search(query.as_deref().unwrap_or(""));
            if matches.is_empty() {
                println!("No payment methods match");
            }
            for name in matches {
                println!("  {}", name);
            }
        }
        Some(Commands::Preview(args)) => {
            let form = build_preview(&args)?;
            let mut sink = JsonSink::new(std::io::stdout().lock(), !args.compact);
            form.submit(&mut sink)?;
        }
        // Handled before the config is loaded
        Some(Commands::Check { .. }) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use payrule::rules::{Comparator, ConditionParams};

    fn args(argv: &[&str]) -> PreviewArgs {
        let mut full = vec!["payrule", "preview"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Some(Commands::Preview(args)) => args,
            other => panic!("expected preview, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_param() {
        let (id, param) = parse_param("#2:amount=15").unwrap();
        assert_eq!(id, ConditionId(2));
        assert_eq!(param, ConditionParam::Amount("15".to_string()));

        assert!(parse_param("2-amount=15").is_err());
        assert!(parse_param("x:amount=15").is_err());
        assert!(parse_param("1:weight=3").is_err());
    }

    #[test]
    fn test_preview_builds_form() {
        let form = build_preview(&args(&[
            "--name",
            "COD rule",
            "--sort",
            "--condition",
            "products",
            "--param",
            "1:comparator=less_than",
            "--param",
            "1:amount=5",
            "--method",
            "PayPal",
            "--order",
            "PayPal=2",
        ]))
        .unwrap();

        let payload = form.payload();
        assert_eq!(payload.rule_name, "COD rule");
        assert!(payload.flags.sort);
        assert_eq!(
            payload.conditions[0].params,
            ConditionParams::Products {
                comparator: Comparator::LessThan,
                amount: "5".to_string(),
            }
        );
        assert_eq!(payload.payment_methods[0].order_value.as_deref(), Some("2"));
    }

    #[test]
    fn test_preview_rejects_unknown_targets() {
        assert!(build_preview(&args(&["--param", "1:amount=5"])).is_err());
        assert!(build_preview(&args(&["--order", "PayPal=1"])).is_err());
        assert!(
            build_preview(&args(&[
                "--condition",
                "collections",
                "--param",
                "1:amount=5"
            ]))
            .is_err()
        );
    }

    #[test]
    fn test_preview_default_value_param_is_accepted() {
        // comparator already defaults to more_than
        let form = build_preview(&args(&[
            "--condition",
            "products",
            "--param",
            "1:comparator=more_than",
        ]))
        .unwrap();
        assert_eq!(form.draft().conditions().len(), 1);
    }
}
