//! revsync CLI - command-line interface for the review synchronizer.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::Term;
use revsync::OutputFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "revsync")]
#[command(version)]
#[command(about = "Incremental course review synchronizer")]
#[command(
    long_about = "revsync downloads the reviews of a Coursera course and keeps a local copy \
up to date. Incremental runs only fetch reviews newer than the newest one already stored."
)]
#[command(after_long_help = r#"EXAMPLES
    Download every review of a course:
        $ revsync reviews https://www.coursera.org/learn/hanzi

    Refresh an existing file with only the new reviews:
        $ revsync reviews https://www.coursera.org/learn/hanzi -o hanzi.json --incremental

    Write CSV without pausing between batches:
        $ revsync reviews https://www.coursera.org/learn/hanzi -f csv --pace-ms 0

    Show course details:
        $ revsync course https://www.coursera.org/learn/hanzi

    List the modules and items of a course:
        $ revsync syllabus https://www.coursera.org/learn/hanzi

    Download every lecture video in 540p with English subtitles:
        $ revsync lecture https://www.coursera.org/learn/hanzi --resolution 540 --lang en -d videos

CONFIGURATION
    revsync reads configuration from:
      1. ~/.config/revsync/config.toml (or $XDG_CONFIG_HOME/revsync/config.toml)
      2. ./revsync.toml
      3. Environment variables (REVSYNC_* prefix, e.g., REVSYNC_SYNC__PACE_MS)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    REVSYNC_API__ENDPOINT          Coursera host (default: https://www.coursera.org)
    REVSYNC_API__APPLICATION_KEY   Search index application id (course statistics)
    REVSYNC_API__API_KEY           Search index API key (course statistics)
    REVSYNC_API__PROXY             Proxy for all requests
    REVSYNC_SYNC__WINDOW_SIZE      Reviews per request (default: 1000)
    REVSYNC_SYNC__PACE_MS          Pause between requests in ms (default: 1000)
    REVSYNC_OUTPUT__DIRECTORY      Directory for review files
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the reviews of a course
    Reviews(ReviewsArgs),
    /// Show course information
    Course {
        /// Course page URL (e.g., https://www.coursera.org/learn/hanzi)
        url: String,
    },
    /// Show the modules, learning objectives and items of a course
    Syllabus {
        /// Course page URL (e.g., https://www.coursera.org/learn/hanzi)
        url: String,

        /// Print the syllabus as JSON
        #[arg(long)]
        json: bool,
    },
    /// List or download lecture videos and subtitles
    Lecture(LectureArgs),
}

/// Options of the `lecture` command.
#[derive(Debug, Clone, clap::Args)]
struct LectureArgs {
    /// Course page URL (e.g., https://www.coursera.org/learn/hanzi)
    url: String,

    /// Lecture item ids (default: every lecture in the syllabus)
    lecture_ids: Vec<String>,

    /// Preferred video resolution; falls back to 360, 540, 720, then 240
    #[arg(long, value_enum, default_value = "360")]
    resolution: ResolutionArg,

    /// Subtitle language, repeatable (default: zh-CN and en, plus the course languages)
    #[arg(long = "lang", value_name = "CODE")]
    languages: Vec<String>,

    /// Skip subtitle tracks
    #[arg(long)]
    no_subtitles: bool,

    /// Download assets into this directory instead of listing them
    #[arg(short, long, value_name = "DIR")]
    download: Option<PathBuf>,

    /// Pause between lecture downloads in milliseconds
    #[arg(long)]
    pace_ms: Option<u64>,
}

/// Options of the `reviews` command.
#[derive(Debug, Clone, clap::Args)]
struct ReviewsArgs {
    /// Course page URL (e.g., https://www.coursera.org/learn/hanzi)
    url: String,

    /// Output file (default: coursera-<slug>.<format> in the output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from the output file extension, then config)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Only keep reviews posted after this epoch-millisecond timestamp
    #[arg(long, conflicts_with = "incremental")]
    after: Option<i64>,

    /// Continue from the newest review in the existing output file
    #[arg(long)]
    incremental: bool,

    /// Reviews requested per batch
    #[arg(long)]
    window_size: Option<u32>,

    /// Pause between batches in milliseconds (0 disables pacing)
    #[arg(long)]
    pace_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ResolutionArg {
    #[value(name = "240")]
    P240,
    #[value(name = "360")]
    P360,
    #[value(name = "540")]
    P540,
    #[value(name = "720")]
    P720,
}

impl ResolutionArg {
    fn height(self) -> u32 {
        match self {
            ResolutionArg::P240 => 240,
            ResolutionArg::P360 => 360,
            ResolutionArg::P540 => 540,
            ResolutionArg::P720 => 720,
        }
    }
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing for non-TTY mode (structured logging)
    // Only initialize if not connected to a TTY
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("revsync=info,revsync_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    match cli.command {
        Commands::Reviews(args) => {
            commands::reviews::handle_reviews(args, &config).await?;
        }
        Commands::Course { url } => {
            commands::course::handle_course(&url, &config).await?;
        }
        Commands::Syllabus { url, json } => {
            commands::syllabus::handle_syllabus(&url, json, &config).await?;
        }
        Commands::Lecture(args) => {
            commands::lecture::handle_lecture(args, &config).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_reviews_flags() {
        let cli = Cli::try_parse_from([
            "revsync",
            "reviews",
            "https://www.coursera.org/learn/hanzi",
            "-o",
            "out.csv",
            "--incremental",
            "--window-size",
            "50",
            "--pace-ms",
            "0",
        ])
        .expect("valid args");

        let Commands::Reviews(args) = cli.command else {
            panic!("expected reviews command");
        };
        assert_eq!(args.output, Some(PathBuf::from("out.csv")));
        assert!(args.incremental);
        assert_eq!(args.window_size, Some(50));
        assert_eq!(args.pace_ms, Some(0));
        assert_eq!(args.format, None);
    }

    #[test]
    fn after_conflicts_with_incremental() {
        let result = Cli::try_parse_from([
            "revsync",
            "reviews",
            "https://www.coursera.org/learn/hanzi",
            "--after",
            "1700000000000",
            "--incremental",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_lecture_flags() {
        let cli = Cli::try_parse_from([
            "revsync",
            "lecture",
            "https://www.coursera.org/learn/hanzi",
            "lec1",
            "lec2",
            "--resolution",
            "540",
            "--lang",
            "en",
            "--lang",
            "fr",
            "-d",
            "videos",
        ])
        .expect("valid args");

        let Commands::Lecture(args) = cli.command else {
            panic!("expected lecture command");
        };
        assert_eq!(args.lecture_ids, vec!["lec1", "lec2"]);
        assert_eq!(args.resolution, ResolutionArg::P540);
        assert_eq!(args.languages, vec!["en", "fr"]);
        assert_eq!(args.download, Some(PathBuf::from("videos")));
        assert!(!args.no_subtitles);
    }

    #[test]
    fn lecture_resolution_defaults_and_is_restricted() {
        let cli = Cli::try_parse_from(["revsync", "lecture", "https://www.coursera.org/learn/hanzi"])
            .expect("valid args");
        let Commands::Lecture(args) = cli.command else {
            panic!("expected lecture command");
        };
        assert_eq!(args.resolution.height(), 360);
        assert!(args.lecture_ids.is_empty());

        let result = Cli::try_parse_from([
            "revsync",
            "lecture",
            "https://www.coursera.org/learn/hanzi",
            "--resolution",
            "1080",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn format_arg_maps_to_output_format() {
        assert_eq!(OutputFormat::from(FormatArg::Csv), OutputFormat::Csv);
        assert_eq!(OutputFormat::from(FormatArg::Json), OutputFormat::Json);
    }
}
