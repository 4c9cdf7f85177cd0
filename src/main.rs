//! CLI entry point for the health advisor.
//!
//! Provides commands for configuring, building and searching the knowledge
//! base, and for generating diet plans.

use anyhow::Context;
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use health_advisor::display::{
    THEME, create_health_summary_table, create_index_summary_table, create_search_table,
    with_spinner,
};
use health_advisor::io::{ExitCode, JsonResponse, OutputFormat, ResponseMeta, export_with_config};
use health_advisor::knowledge::KnowledgeSource;
use health_advisor::{
    Advice, Advisor, AdvisorError, HealthProfile, Settings, logging, open_knowledge_store,
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Personalized diet plans from health metrics
#[derive(Parser)]
#[command(
    name = "health-advisor",
    version = env!("CARGO_PKG_VERSION"),
    about = "Personalized diet plans from health metrics",
    long_about = "Classify health metrics against clinical thresholds, retrieve matching \
                  guidance and render a personalized diet plan.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .health-advisor directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings")]
    Config,

    /// Build the knowledge base
    #[command(about = "Embed the guidance corpus and persist it")]
    Index {
        /// Rebuild even if a knowledge base already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Rank guidance documents against a query
    #[command(
        about = "Search the knowledge base",
        after_help = "Examples:\n  health-advisor search \"Obese Hypertension\"\n  health-advisor search cholesterol --limit 1 --json"
    )]
    Search {
        /// Free-text query
        query: String,

        /// Maximum number of documents
        #[arg(short, long, default_value_t = 4)]
        limit: usize,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Generate a diet plan
    #[command(
        about = "Generate a personalized diet plan",
        after_help = "Examples:\n  health-advisor plan --age 45 --weight 95 --height 170 --bp 150/95 --sugar 130 --cholesterol 210\n  health-advisor plan --json\n  health-advisor plan --export --output-dir plans"
    )]
    Plan {
        /// Age in years (18-100)
        #[arg(long, default_value_t = 30)]
        age: u32,

        /// Weight in kg
        #[arg(long, default_value_t = 70.0)]
        weight: f64,

        /// Height in cm
        #[arg(long, default_value_t = 170.0)]
        height: f64,

        /// Blood pressure as systolic/diastolic
        #[arg(long, default_value = "120/80")]
        bp: String,

        /// Fasting blood sugar in mg/dL
        #[arg(long, default_value_t = 100.0)]
        sugar: f64,

        /// Total cholesterol in mg/dL
        #[arg(long, default_value_t = 180.0)]
        cholesterol: f64,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Write the plan to a timestamped text file
        #[arg(long)]
        export: bool,

        /// Directory for --export (overrides export.directory)
        #[arg(long, requires = "export")]
        output_dir: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", THEME.error_with_icon(&format!("{e:#}")));
            std::process::exit(ExitCode::ConfigError.into());
        }
    };

    logging::init(logging::level_for(settings.debug, cli.verbose));

    let code = match run(cli.command, &settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", THEME.error_with_icon(&format!("{e:#}")));
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.into());
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => Settings::load_file(path).map_err(|e| {
            anyhow::anyhow!("Configuration error loading from {}: {e}", path.display())
        }),
        None => Settings::load().map_err(|e| anyhow::anyhow!("Configuration error: {e}")),
    }
}

fn run(command: Commands, settings: &Settings) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!(
                "{}",
                THEME.success_with_icon(&format!("Created configuration file at: {}", path.display()))
            );
            println!("Edit this file to customize your settings.");
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", settings.to_toml().context("Error displaying config")?);
            Ok(ExitCode::Success)
        }

        Commands::Index { force } => {
            let message = if force {
                "Rebuilding knowledge base..."
            } else {
                "Loading knowledge base..."
            };
            let store = match with_spinner(message, || open_knowledge_store(settings, force)) {
                Ok(store) => store,
                Err(e) => return Ok(report_error(&e, OutputFormat::Text)),
            };

            println!(
                "{}",
                create_index_summary_table(store.metadata(), &settings.knowledge.index_path)
            );
            println!("{}", THEME.success_with_icon("Knowledge base ready"));
            Ok(ExitCode::Success)
        }

        Commands::Search { query, limit, json } => {
            let format = OutputFormat::from_json_flag(json);
            let store = match with_spinner("Loading knowledge base...", || {
                open_knowledge_store(settings, false)
            }) {
                Ok(store) => store,
                Err(e) => return Ok(report_error(&e, format)),
            };

            let context = match store.retrieve(&query, limit) {
                Ok(context) => context,
                Err(e) => return Ok(report_error(&AdvisorError::Retrieval(e), format)),
            };

            if format.is_json() {
                let response = JsonResponse::success(&context).with_meta(ResponseMeta::current());
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else if context.is_empty() {
                println!("{}", THEME.warning_with_icon("No documents in the knowledge base"));
            } else {
                println!("{}", create_search_table(&context));
            }

            Ok(if context.is_empty() {
                ExitCode::NotFound
            } else {
                ExitCode::Success
            })
        }

        Commands::Plan {
            age,
            weight,
            height,
            bp,
            sugar,
            cholesterol,
            json,
            export,
            output_dir,
        } => {
            let format = OutputFormat::from_json_flag(json);
            let profile = HealthProfile {
                age,
                weight_kg: weight,
                height_cm: height,
                blood_pressure: bp,
                fasting_glucose: sugar,
                total_cholesterol: cholesterol,
            };

            let advisor = with_spinner("Loading health knowledge base...", || {
                Advisor::from_settings(settings)
            });
            let advice = match advisor.advise(&profile) {
                Ok(advice) => advice,
                Err(e) => return Ok(report_error(&e, format)),
            };

            let export_path = if export {
                match export_with_config(&advice.plan, &settings.export, output_dir.as_deref()) {
                    Ok(path) => Some(path),
                    Err(e) => return Ok(report_error(&e, format)),
                }
            } else {
                None
            };

            print_advice(&advice, format, export_path)?;
            Ok(ExitCode::Success)
        }
    }
}

fn print_advice(
    advice: &Advice,
    format: OutputFormat,
    export_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    if format.is_json() {
        let mut meta = ResponseMeta::current();
        meta.export_path = export_path.map(|p| p.display().to_string());
        let response = JsonResponse::success(&advice.plan)
            .with_warnings(&advice.warnings)
            .with_meta(meta);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    for warning in &advice.warnings {
        eprintln!("{}", THEME.warning_with_icon(&warning.to_string()));
    }
    if advice.has_warnings() {
        eprintln!();
    }
    println!("{}", create_health_summary_table(&advice.plan));
    if advice.plan.recommendations.is_default() {
        println!(
            "{}",
            THEME.apply(
                &THEME.dim,
                "No matching guidance found; showing general recommendations"
            )
        );
    }
    println!("{}", THEME.success_with_icon("Your personalized plan is ready!"));
    println!();
    println!("{}", advice.plan.text);
    if let Some(path) = export_path {
        println!(
            "{}",
            THEME.success_with_icon(&format!("Plan saved to {}", path.display()))
        );
    }
    Ok(())
}

fn report_error(error: &AdvisorError, format: OutputFormat) -> ExitCode {
    let code = ExitCode::from_error(error);
    if format.is_json() {
        let response = JsonResponse::from_error(error);
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error writing output: {e}"),
        }
    } else {
        eprintln!("{}", THEME.error_with_icon(&error.to_string()));
        for suggestion in error.recovery_suggestions() {
            eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
        }
        if error.is_global() {
            eprintln!(
                "{}",
                THEME.warning_with_icon("Diet plans stay unavailable until the knowledge base loads")
            );
        }
    }
    code
}
