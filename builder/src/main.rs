//! Surveyimport CLI - build LimeSurvey import files from survey projects
//!
//! # Main Command
//!
//! ```bash
//! surveyimport build projects/uk_2017             # Write uk_2017_to_import.txt
//! surveyimport build projects/uk_2017 --seed 7    # Reproducible shuffles
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! surveyimport parse projects/uk_2017         # Decoded survey rows as JSON
//! surveyimport group projects/uk_2017         # Grouping result as JSON
//! surveyimport check-config projects/uk_2017  # Validate config.json
//! surveyimport example-config                 # Show an example config.json
//! ```

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use surveyimport::logs::log_error;
use surveyimport::{
    build_survey, example_project_config, group_rows, validate_project_config, BuildOptions,
    ProjectDir, RowSource,
};

#[derive(Parser)]
#[command(name = "surveyimport")]
#[command(about = "Build LimeSurvey import files from survey definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: survey project → LimeSurvey TSV
    Build {
        /// Project folder (contains <name>.csv and config.json)
        project: PathBuf,

        /// Output file (default: <project>/<name>_to_import.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for randomized question groups
        #[arg(long, env = "SURVEYIMPORT_SEED")]
        seed: Option<u64>,

        /// Main configuration JSON (default: built-in)
        #[arg(long)]
        main_config: Option<PathBuf>,
    },

    /// Parse the survey CSV and output its rows as JSON
    Parse {
        /// Project folder
        project: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Group survey rows into questions and output the groups as JSON
    Group {
        /// Project folder
        project: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the project configuration against its schema
    CheckConfig {
        /// Project folder
        project: PathBuf,
    },

    /// Show an example project configuration
    ExampleConfig,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            project,
            output,
            seed,
            main_config,
        } => cmd_build(
            &project,
            BuildOptions {
                output,
                main_config,
                seed,
            },
        ),

        Commands::Parse { project, output } => cmd_parse(&project, output.as_deref()),

        Commands::Group { project, output } => cmd_group(&project, output.as_deref()),

        Commands::CheckConfig { project } => cmd_check_config(&project),

        Commands::ExampleConfig => cmd_example_config(),
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_build(project: &Path, options: BuildOptions) -> Result<(), Box<dyn std::error::Error>> {
    let report = build_survey(project, options)?;

    eprintln!("\n📊 Summary:");
    eprintln!("   Languages: {}", report.languages.join(", "));
    eprintln!("   Seed: {}", report.seed);
    for pass in &report.passes {
        eprintln!(
            "   [{}] {} groups, {} sections, {} records",
            pass.language, pass.groups, pass.sections, pass.records
        );
    }
    eprintln!("   Total: {} records", report.records);

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse(project: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let project = ProjectDir::new(project);
    eprintln!("📄 Parsing: {}", project.survey_path().display());

    let rows = project.rows()?;
    eprintln!("✅ Parsed {} rows", rows.len());

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)
}

fn cmd_group(project: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let project = ProjectDir::new(project);
    eprintln!("📦 Grouping: {}", project.survey_path().display());

    let rows = project.rows()?;
    eprintln!("   {} rows", rows.len());

    let groups: Vec<Value> = group_rows(rows)
        .map(|group| {
            let shape = match group.shape() {
                Ok(shape) => json!(shape),
                Err(e) => json!({ "error": e.to_string() }),
            };
            json!({
                "section": group.first().section,
                "shape": shape,
                "codes": group.codes(),
            })
        })
        .collect();
    eprintln!("   {} groups", groups.len());

    let json = serde_json::to_string_pretty(&groups)?;
    write_output(&json, output)
}

fn cmd_check_config(project: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let project = ProjectDir::new(project);
    let path = project.config_path();
    eprintln!("✔️  Validating: {}", path.display());

    let content = fs::read_to_string(&path)?;
    let value: Value = serde_json::from_str(&content)?;

    match validate_project_config(&value) {
        Ok(()) => {
            eprintln!("✅ Configuration valid");
            Ok(())
        }
        Err(errors) => {
            for err in &errors {
                eprintln!("   - {}", err);
            }
            Err(format!("{} schema error(s)", errors.len()).into())
        }
    }
}

fn cmd_example_config() -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(&example_project_config())?;
    println!("{}", json);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
