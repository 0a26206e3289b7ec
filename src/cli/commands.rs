use crate::core::template_warnings;
use crate::error::{DraftError, DraftResult};
use crate::excel::FileMeta;
use crate::parser::{self, JobConfig, JobOverrides};
use crate::session::Session;
use crate::types::Draft;
use crate::writer::ExportFormat;
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::warn;

/// Column width used when printing draft previews
const PREVIEW_WIDTH: usize = 40;

/// Where the mapping and templates come from
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// YAML job file (mapping + templates)
    pub job: Option<PathBuf>,
    /// Values that override the job file
    pub overrides: JobOverrides,
    /// Read the body template from a file
    pub body_template_file: Option<PathBuf>,
}

impl JobOptions {
    /// Merge the job file, template file and individual flags
    pub fn resolve(&self) -> DraftResult<JobConfig> {
        let base = match &self.job {
            Some(path) => parser::parse_job(path)?,
            None => JobConfig::default(),
        };

        let mut overrides = self.overrides.clone();
        if overrides.body_template.is_none() {
            if let Some(path) = &self.body_template_file {
                overrides.body_template = Some(fs::read_to_string(path)?);
            }
        }

        Ok(base.with_overrides(overrides))
    }
}

/// Execute the inspect command
pub fn inspect(file: PathBuf, verbose: bool) -> DraftResult<()> {
    println!("{}", "📄 Draftsheet - Inspect".bold().green());

    let mut session = Session::new();
    load(&mut session, &file)?;

    println!("\n{}", "📋 Columns:".bold().cyan());
    for (index, header) in session.headers().iter().enumerate() {
        println!("   {:>3}. {}", index + 1, header.bright_blue());
    }
    print_duplicate_warnings(&session);

    if verbose {
        if let Some(table) = session.table() {
            println!("\n{}", "🔎 First rows:".bold().cyan());
            for index in 0..table.row_count().min(5) {
                println!("   {}", table.row_values(index).join(" | "));
            }
        }
    }
    println!();

    Ok(())
}

/// Execute the preview command
pub fn preview(file: PathBuf, job: JobOptions, limit: usize, verbose: bool) -> DraftResult<()> {
    println!("{}", "👀 Draftsheet - Preview".bold().green());

    let config = job.resolve()?;
    let mut session = Session::new();
    load(&mut session, &file)?;
    generate(&mut session, &config, verbose)?;

    let shown = session.preview(limit);
    println!();
    print_drafts(shown);
    if shown.len() < session.drafts().len() {
        println!(
            "   {}",
            format!(
                "… {} more drafts not shown (use --limit to see more)",
                session.drafts().len() - shown.len()
            )
            .dimmed()
        );
    }
    println!();

    Ok(())
}

/// Execute the export command
pub fn export(
    file: PathBuf,
    job: JobOptions,
    formats: Vec<ExportFormat>,
    out_dir: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
) -> DraftResult<()> {
    println!("{}", "📤 Draftsheet - Export".bold().green());

    let targets = export_targets(&formats, &out_dir, output.as_deref())?;
    let config = job.resolve()?;

    let mut session = Session::new();
    load(&mut session, &file)?;
    generate(&mut session, &config, verbose)?;
    write_targets(&session, &targets)?;
    println!();

    Ok(())
}

/// Resolve output paths: `--output` for a single format, otherwise the
/// default file names inside `out_dir`
fn export_targets(
    formats: &[ExportFormat],
    out_dir: &Path,
    output: Option<&Path>,
) -> DraftResult<Vec<(ExportFormat, PathBuf)>> {
    let mut unique: Vec<ExportFormat> = Vec::new();
    for format in formats {
        if !unique.contains(format) {
            unique.push(*format);
        }
    }
    if unique.is_empty() {
        unique.push(ExportFormat::Json);
    }

    match output {
        Some(path) if unique.len() == 1 => Ok(vec![(unique[0], path.to_path_buf())]),
        Some(_) => Err(DraftError::Validation(
            "--output can only be used with a single --format".to_string(),
        )),
        None => Ok(unique
            .into_iter()
            .map(|format| (format, out_dir.join(format.default_file_name())))
            .collect()),
    }
}

fn write_targets(session: &Session, targets: &[(ExportFormat, PathBuf)]) -> DraftResult<()> {
    for (format, path) in targets {
        session.export_to(*format, path)?;
        println!(
            "   {} {} → {}",
            "✅".green(),
            format.to_string().to_uppercase().bold(),
            path.display()
        );
    }
    Ok(())
}

/// Load a workbook into the session and print the file line and status
fn load(session: &mut Session, file: &Path) -> DraftResult<()> {
    let meta = FileMeta::from_path(file)?;
    println!("   File: {}", meta);

    match session.load_file(file) {
        Ok(_) => {
            println!("   {}", session.status().green());
            Ok(())
        }
        Err(e) => {
            if !session.status().is_empty() {
                println!("   {}", session.status().yellow());
            }
            Err(e)
        }
    }
}

/// Generate drafts, printing placeholder warnings and the status line
fn generate(session: &mut Session, config: &JobConfig, verbose: bool) -> DraftResult<()> {
    if verbose {
        println!(
            "   Mapping: to={} subject={} body={}",
            config.mapping.to.cyan(),
            config.mapping.subject.cyan(),
            config.mapping.body.cyan()
        );
    }

    for warning in template_warnings(&config.templates, session.headers())? {
        warn!("{}", warning);
        println!("   {} {}", "⚠️".yellow(), warning.yellow());
    }

    match session.generate(&config.mapping, &config.templates) {
        Ok(_) => {
            println!("   {}", session.status().green());
            Ok(())
        }
        Err(e) => {
            println!("   {}", session.status().red());
            Err(e)
        }
    }
}

fn print_duplicate_warnings(session: &Session) {
    if let Some(table) = session.table() {
        for duplicate in table.duplicate_headers() {
            println!(
                "   {} {}",
                "⚠️".yellow(),
                format!(
                    "Column name '{}' appears more than once; the last one wins",
                    duplicate
                )
                .yellow()
            );
        }
    }
}

fn print_drafts(drafts: &[Draft]) {
    println!(
        "   {:>4}  {:<w$}  {:<w$}  {}",
        "#".bold(),
        "to".bold(),
        "subject".bold(),
        "body".bold(),
        w = PREVIEW_WIDTH
    );
    for (index, draft) in drafts.iter().enumerate() {
        println!(
            "   {:>4}  {:<w$}  {:<w$}  {}",
            index + 1,
            truncate(&single_line(&draft.to), PREVIEW_WIDTH),
            truncate(&single_line(&draft.subject), PREVIEW_WIDTH),
            truncate(&single_line(&draft.body), PREVIEW_WIDTH * 2),
            w = PREVIEW_WIDTH
        );
    }
}

/// Collapse line breaks so a value fits on one terminal line
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ⏎ ")
}

/// Cut `text` to at most `width` characters, marking the cut with `…`
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Execute the watch command
pub fn watch(
    file: PathBuf,
    job: JobOptions,
    formats: Vec<ExportFormat>,
    out_dir: PathBuf,
    verbose: bool,
) -> DraftResult<()> {
    println!("{}", "👁️  Draftsheet - Watch Mode".bold().green());
    println!("   Watching: {}", file.display());
    if let Some(ref job_file) = job.job {
        println!("   Job file: {}", job_file.display());
    }
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    if !file.exists() {
        return Err(DraftError::Validation(format!(
            "File not found: {}",
            file.display()
        )));
    }

    let targets = export_targets(&formats, &out_dir, None)?;

    let mut watched = vec![file.canonicalize()?];
    if let Some(ref job_file) = job.job {
        watched.push(job_file.canonicalize()?);
    }
    if let Some(ref template_file) = job.body_template_file {
        watched.push(template_file.canonicalize()?);
    }

    let (tx, rx) = channel();

    // Debounce to avoid rapid-fire events while the spreadsheet is being saved
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)
        .map_err(|e| DraftError::Validation(format!("Failed to create file watcher: {}", e)))?;

    let mut dirs: Vec<&Path> = Vec::new();
    for path in &watched {
        let parent = path.parent().ok_or_else(|| {
            DraftError::Validation("Cannot determine parent directory".to_string())
        })?;
        if !dirs.contains(&parent) {
            dirs.push(parent);
        }
    }
    for dir in &dirs {
        debouncer
            .watcher()
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| DraftError::Validation(format!("Failed to watch directory: {}", e)))?;
        if verbose {
            println!("   {} {}", "Watching directory:".cyan(), dir.display());
        }
    }

    println!("{}", "🔄 Initial run...".cyan());
    run_watch_action(&file, &job, &targets, verbose);
    println!();

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any && is_watched(&event.path, &watched)
                });

                if relevant {
                    println!(
                        "\n{} {}",
                        "🔄 Change detected at".cyan(),
                        timestamp().cyan()
                    );
                    run_watch_action(&file, &job, &targets, verbose);
                    println!();
                }
            }
            Ok(Err(error)) => {
                eprintln!("{} Watch error: {}", "❌".red(), error);
            }
            Err(e) => {
                eprintln!("{} Channel error: {}", "❌".red(), e);
                break;
            }
        }
    }

    Ok(())
}

fn is_watched(path: &Path, watched: &[PathBuf]) -> bool {
    if let Ok(canonical) = path.canonicalize() {
        if watched.contains(&canonical) {
            return true;
        }
    }
    // Editors often replace files, so fall back to comparing names
    path.file_name()
        .map(|name| watched.iter().any(|w| w.file_name() == Some(name)))
        .unwrap_or(false)
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Reload, regenerate and rewrite all targets, reporting instead of failing
fn run_watch_action(
    file: &Path,
    job: &JobOptions,
    targets: &[(ExportFormat, PathBuf)],
    verbose: bool,
) {
    let result = job.resolve().and_then(|config| {
        let mut session = Session::new();
        load(&mut session, file)?;
        generate(&mut session, &config, verbose)?;
        write_targets(&session, targets)
    });

    match result {
        Ok(()) => println!("{}", "✅ Drafts updated".bold().green()),
        Err(e) => println!("{} {}", "❌ Update failed:".bold().red(), e),
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
