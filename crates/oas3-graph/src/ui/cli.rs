use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "oas3-graph")]
#[command(author, version, about = "OpenAPI 3.1 to language-neutral model graph compiler")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from OpenAPI specification
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Compile an OpenAPI specification into a JSON model graph
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
  /// Path to the OpenAPI specification file (JSON or YAML)
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Path where the model graph JSON will be written
  #[arg(short, long, value_name = "FILE")]
  pub output: PathBuf,

  /// Walk paths before named component schemas
  #[arg(long, default_value_t = false, conflicts_with = "reachable_only")]
  pub paths_first: bool,

  /// Only compile schemas reachable from operations, not every declared component
  #[arg(long, default_value_t = false)]
  pub reachable_only: bool,

  /// Media type preference, most preferred first (repeatable). A literal media type,
  /// or a "PATTERN FLAGS" pair matched as a case-insensitive regular expression
  #[arg(long = "media-type", value_name = "PREF")]
  pub media_types: Vec<String>,

  /// Map a schema format to an external type name (repeatable, e.g. date-time=DateTime)
  #[arg(long, value_name = "FORMAT=TYPE")]
  pub customize: Vec<String>,

  /// Api that receives operations without tags
  #[arg(long, value_name = "NAME", default_value = "default")]
  pub default_api: String,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List all operations defined in the OpenAPI specification
  Operations {
    /// Path to the OpenAPI specification file (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}
