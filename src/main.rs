use clap::{Args, Parser, Subcommand};
use draftsheet::cli::{self, JobOptions};
use draftsheet::error::DraftResult;
use draftsheet::parser::JobOverrides;
use draftsheet::session::PREVIEW_LIMIT;
use draftsheet::writer::ExportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "draftsheet")]
#[command(about = "Turn spreadsheet rows into email drafts with {{ placeholder }} templates.")]
#[command(long_about = "Draftsheet - spreadsheet rows to email drafts

Load the first sheet of a workbook, map columns to the to/subject/body roles,
fill {{ placeholder }} templates per row, preview, and export.

COMMANDS:
  inspect   - Show the columns and row count of a spreadsheet
  preview   - Generate drafts and print the first rows
  export    - Generate drafts and write email-drafts.json / email-drafts.csv
  watch     - Re-export whenever the spreadsheet or job file changes

EXAMPLES:
  draftsheet inspect contacts.xlsx
  draftsheet preview contacts.xlsx --to Email --subject Name --body Notes
  draftsheet export contacts.xlsx --job job.yaml --format json,csv
  draftsheet export contacts.xlsx --job job.yaml -f csv -o drafts.csv")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Mapping and template options shared by preview/export/watch
#[derive(Args, Debug, Clone)]
struct JobArgs {
    /// YAML job file with `mapping` and `templates` sections
    #[arg(short, long)]
    job: Option<PathBuf>,

    /// Column holding the recipient address
    #[arg(long)]
    to: Option<String>,

    /// Column used for the subject when no subject template is given
    #[arg(long)]
    subject: Option<String>,

    /// Column used for the body when no body template is given
    #[arg(long)]
    body: Option<String>,

    /// Subject template, e.g. "Hello {{ Name }}"
    #[arg(long)]
    subject_template: Option<String>,

    /// Body template text
    #[arg(long, conflicts_with = "body_template_file")]
    body_template: Option<String>,

    /// Read the body template from a file
    #[arg(long)]
    body_template_file: Option<PathBuf>,
}

impl From<JobArgs> for JobOptions {
    fn from(args: JobArgs) -> Self {
        JobOptions {
            job: args.job,
            overrides: JobOverrides {
                to: args.to,
                subject: args.subject,
                body: args.body,
                subject_template: args.subject_template,
                body_template: args.body_template,
            },
            body_template_file: args.body_template_file,
        }
    }
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse::<ExportFormat>().map_err(|e| e.to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Show the columns and row count of a spreadsheet
    Inspect {
        /// Path to the spreadsheet (.xlsx, .xls, .xlsb, .ods)
        file: PathBuf,

        /// Also print the first rows
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate drafts and print a preview
    Preview {
        /// Path to the spreadsheet
        file: PathBuf,

        #[command(flatten)]
        job: JobArgs,

        /// Number of drafts to show
        #[arg(short, long, default_value_t = PREVIEW_LIMIT)]
        limit: usize,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Generate drafts and write them to disk.

OUTPUT:
  email-drafts.json  - pretty JSON array of {to, subject, body}
  email-drafts.csv   - header to,subject,body with standard CSV quoting

Files are written to --out-dir (default: current directory) unless
--output is given together with a single --format.

JOB FILE:
  mapping:
    to: Email
    subject: Name
    body: Notes
  templates:
    subject: \"Hello {{ Name }}\"
    body: |
      Dear {{Name}},
      ...")]
    /// Generate drafts and write JSON and/or CSV files
    Export {
        /// Path to the spreadsheet
        file: PathBuf,

        #[command(flatten)]
        job: JobArgs,

        /// Output formats (json, csv)
        #[arg(short, long, value_delimiter = ',', default_value = "json", value_parser = parse_format)]
        format: Vec<ExportFormat>,

        /// Directory for default-named output files
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,

        /// Explicit output file (single format only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Re-export drafts whenever the spreadsheet or job file changes
    Watch {
        /// Path to the spreadsheet
        file: PathBuf,

        #[command(flatten)]
        job: JobArgs,

        /// Output formats (json, csv)
        #[arg(short, long, value_delimiter = ',', default_value = "json", value_parser = parse_format)]
        format: Vec<ExportFormat>,

        /// Directory for output files
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Log to stderr; `RUST_LOG` overrides the default level
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "draftsheet=debug"
    } else {
        "draftsheet=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> DraftResult<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Inspect { verbose, .. }
        | Commands::Preview { verbose, .. }
        | Commands::Export { verbose, .. }
        | Commands::Watch { verbose, .. } => *verbose,
    };
    init_tracing(verbose);

    match cli.command {
        Commands::Inspect { file, verbose } => cli::inspect(file, verbose),

        Commands::Preview {
            file,
            job,
            limit,
            verbose,
        } => cli::preview(file, job.into(), limit, verbose),

        Commands::Export {
            file,
            job,
            format,
            out_dir,
            output,
            verbose,
        } => cli::export(file, job.into(), format, out_dir, output, verbose),

        Commands::Watch {
            file,
            job,
            format,
            out_dir,
            verbose,
        } => cli::watch(file, job.into(), format, out_dir, verbose),
    }
}
