//! Command-line interface for the storyline editor.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{EditorConfig, TEXT_WRAP_WIDTH};
use crate::error::Result;
use crate::model::{
    ArticleRecord, AttributeCensus, NameCensus, Readiness, SeasonWindow, StorylineRecord,
    MAIN_ACTOR_ATTRIBUTE,
};
use crate::schema::{ElementKind, SchemaRegistry};
use crate::session::EditingSession;
use crate::tags::dangling_links;

/// OOTP Storyline Editor - inspect and edit storyline database XML files.
#[derive(Parser)]
#[command(name = "ootp-storyline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Schema definition to use instead of the bundled one
    /// (default: $STORYLINE_SCHEMA_PATH)
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List storylines with their readiness.
    List {
        /// Storyline database file
        file: PathBuf,
    },

    /// Show one storyline in full.
    Show {
        file: PathBuf,
        /// Storyline id
        id: String,
    },

    /// Search storylines by id, article subject or category.
    Search {
        file: PathBuf,
        /// Text to look for (empty matches everything)
        #[arg(default_value = "")]
        query: String,

        /// Only storylines in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Validate a file and report link tags pointing at missing data objects.
    Check { file: PathBuf },

    /// Report which attribute names a file uses, known and unknown.
    Analyze { file: PathBuf },

    /// Rewrite a file in canonical layout.
    Format {
        file: PathBuf,

        /// Write here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add a storyline with default values (creates the file if needed).
    New { file: PathBuf, id: String },

    /// Delete a storyline.
    Delete { file: PathBuf, id: String },

    /// Point every link tag in an article at one data object.
    Retag {
        file: PathBuf,
        storyline: String,
        article: String,
        /// 1-based data object index
        index: usize,
    },

    /// Apply a named attribute preset to an article.
    Preset {
        file: PathBuf,
        storyline: String,
        article: String,
        /// Preset name (omit to list presets)
        name: Option<String>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = EditorConfig::from_env();
    if let Some(path) = cli.schema {
        config = config.with_schema_path(path);
    }

    let owned;
    let registry = match &config.schema_path {
        Some(path) => {
            owned = SchemaRegistry::from_path(path)?;
            &owned
        }
        None => SchemaRegistry::bundled(),
    };

    match cli.command {
        Commands::List { file } => list_command(&file, registry),
        Commands::Show { file, id } => show_command(&file, &id, registry),
        Commands::Search {
            file,
            query,
            category,
        } => search_command(&file, &query, category.as_deref(), registry),
        Commands::Check { file } => check_command(&file, registry),
        Commands::Analyze { file } => analyze_command(&file, registry),
        Commands::Format { file, output } => format_command(&file, output.as_deref(), registry),
        Commands::New { file, id } => new_command(&file, &id, registry),
        Commands::Delete { file, id } => delete_command(&file, &id, registry),
        Commands::Retag {
            file,
            storyline,
            article,
            index,
        } => retag_command(&file, &storyline, &article, index, registry),
        Commands::Preset {
            file,
            storyline,
            article,
            name,
        } => preset_command(&file, &storyline, &article, name.as_deref(), registry),
    }
}

/// Open a file behind a spinner.
fn open_session<'r>(path: &Path, registry: &'r SchemaRegistry) -> Result<EditingSession<'r>> {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(format!("Loading {}...", path.display()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let session = EditingSession::open_path(registry, path);
    pb.finish_and_clear();
    session
}

fn readiness_label(readiness: Readiness) -> String {
    match readiness {
        Readiness::Complete => style("complete").green().to_string(),
        Readiness::Draft => style("draft").yellow().to_string(),
        Readiness::Empty => style("empty").red().to_string(),
    }
}

fn season_label(window: SeasonWindow) -> &'static str {
    match window {
        SeasonWindow::InSeason => "season",
        SeasonWindow::Offseason => "offseason",
        SeasonWindow::SpringTraining => "spring",
        SeasonWindow::AnyTime => "any time",
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

fn list_command(file: &Path, registry: &SchemaRegistry) -> Result<()> {
    let session = open_session(file, registry)?;

    for record in session.list() {
        let readiness = session.readiness(&record.id)?;
        println!(
            "{:<32} {:<54} {:>5}  {:<10} {}",
            style(&record.id).cyan(),
            truncate(record.title(), 50),
            record
                .attributes
                .get_raw("random_frequency")
                .unwrap_or_default(),
            season_label(record.season_window()),
            readiness_label(readiness)
        );
    }
    println!();
    println!("{} storylines", style(session.list().len()).bold());
    Ok(())
}

fn show_command(file: &Path, id: &str, registry: &SchemaRegistry) -> Result<()> {
    let session = open_session(file, registry)?;
    let record = session.get(id)?;

    println!(
        "{} {} ({})",
        style("Storyline").bold(),
        style(&record.id).cyan(),
        readiness_label(session.readiness(id)?)
    );
    for attribute in &record.attributes {
        let name = if registry.classify(ElementKind::Storyline, &attribute.name).is_known() {
            style(&attribute.name).to_string()
        } else {
            style(&attribute.name).dim().to_string()
        };
        println!("  {name} = {}", attribute.written());
    }

    if !record.required_data.is_empty() {
        println!();
        println!("{}", style("Required data").bold());
        for (i, object) in record.required_data.iter().enumerate() {
            let actor = if object.is_main_actor() { " (main actor)" } else { "" };
            let attributes: Vec<String> = object
                .attributes
                .iter()
                .filter(|a| a.name != MAIN_ACTOR_ATTRIBUTE)
                .map(|a| format!("{}={}", a.name, a.written()))
                .collect();
            println!(
                "  #{} {}{actor} {}",
                i + 1,
                style(&object.object_type).green(),
                attributes.join(" ")
            );
        }
    }

    for article in &record.articles {
        print_article(article);
    }

    print_dangling(record);
    Ok(())
}

fn print_article(article: &ArticleRecord) {
    println!();
    println!(
        "{} {}: {}",
        style("Article").bold(),
        article.id,
        style(article.subject.as_deref().unwrap_or("(no subject)")).green()
    );
    for attribute in &article.attributes {
        println!("  {} = {}", attribute.name, attribute.written());
    }
    if let Some(text) = &article.text {
        let options = textwrap::Options::new(TEXT_WRAP_WIDTH)
            .initial_indent("    ")
            .subsequent_indent("    ");
        println!("{}", textwrap::fill(text, options));
    }
    if let Some(injury) = &article.injury_description {
        println!("  injury: {injury}");
    }
}

fn print_dangling(record: &StorylineRecord) -> usize {
    let dangling = dangling_links(record);
    for link in &dangling {
        println!(
            "  {} storyline {} article {}: {} refers to data object #{} but only {} exist",
            style("warning:").yellow().bold(),
            record.id,
            link.article,
            link.tag.markup,
            link.tag.index,
            link.available
        );
    }
    dangling.len()
}

fn search_command(
    file: &Path,
    query: &str,
    category: Option<&str>,
    registry: &SchemaRegistry,
) -> Result<()> {
    let session = open_session(file, registry)?;
    let hits = session.search(query, category);
    for id in &hits {
        let title = session.get(id).map(StorylineRecord::title).unwrap_or_default();
        println!("{:<32} {}", style(id).cyan(), title);
    }
    println!();
    println!("{} matches", style(hits.len()).bold());
    Ok(())
}

fn check_command(file: &Path, registry: &SchemaRegistry) -> Result<()> {
    let session = open_session(file, registry)?;

    let mut complete = 0;
    let mut warnings = 0;
    for record in session.list() {
        if session.is_complete(&record.id)? {
            complete += 1;
        }
        warnings += print_dangling(record);
    }

    println!(
        "{} {} storylines, {} complete, {} link warnings",
        style("OK:").green().bold(),
        session.list().len(),
        complete,
        warnings
    );
    Ok(())
}

fn print_census(label: &str, census: &NameCensus) {
    println!("{}", style(label).bold());
    for (name, count) in &census.known {
        println!("  {name:<32} {count:>6}");
    }
    for (name, count) in &census.unknown {
        println!(
            "  {:<32} {count:>6}  {}",
            style(name).yellow(),
            style("(not in schema, passed through)").dim()
        );
    }
}

fn analyze_command(file: &Path, registry: &SchemaRegistry) -> Result<()> {
    let session = open_session(file, registry)?;
    let census = AttributeCensus::collect(session.model(), registry);

    print_census("STORYLINE", &census.storyline);
    print_census("DATA_OBJECT", &census.data_object);
    print_census("ARTICLE", &census.article);
    println!();
    println!(
        "{} unknown attribute names (schema version {})",
        style(census.unknown_count()).bold(),
        registry.version()
    );
    Ok(())
}

fn format_command(file: &Path, output: Option<&Path>, registry: &SchemaRegistry) -> Result<()> {
    let mut session = open_session(file, registry)?;
    let target = output.unwrap_or(file);
    session.save_as(target)?;
    println!("{} {}", style("Saved to:").green().bold(), target.display());
    Ok(())
}

fn new_command(file: &Path, id: &str, registry: &SchemaRegistry) -> Result<()> {
    let mut session = if file.exists() {
        open_session(file, registry)?
    } else {
        EditingSession::new(registry)
    };
    session.new_record(id)?;
    session.save_as(file)?;
    println!(
        "{} {} in {}",
        style("Created").green().bold(),
        style(id).cyan(),
        file.display()
    );
    Ok(())
}

fn delete_command(file: &Path, id: &str, registry: &SchemaRegistry) -> Result<()> {
    let mut session = open_session(file, registry)?;
    session.delete(id)?;
    session.save()?;
    println!("{} {}", style("Deleted").green().bold(), style(id).cyan());
    Ok(())
}

fn retag_command(
    file: &Path,
    storyline: &str,
    article: &str,
    index: usize,
    registry: &SchemaRegistry,
) -> Result<()> {
    let mut session = open_session(file, registry)?;
    session.renumber_links(storyline, article, index)?;
    session.save()?;
    println!(
        "{} link tags in {storyline}/{article} now point at data object #{index}",
        style("Updated").green().bold()
    );
    Ok(())
}

fn preset_command(
    file: &Path,
    storyline: &str,
    article: &str,
    name: Option<&str>,
    registry: &SchemaRegistry,
) -> Result<()> {
    let Some(name) = name else {
        for preset in registry.presets() {
            println!(
                "{:<24} {}",
                style(&preset.name).cyan(),
                preset.description.as_deref().unwrap_or_default()
            );
        }
        return Ok(());
    };

    let mut session = open_session(file, registry)?;
    session.apply_preset(storyline, article, name)?;
    session.save()?;
    println!(
        "{} {} to {storyline}/{article}",
        style("Applied").green().bold(),
        style(name).cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_search() {
        let cli = Cli::parse_from([
            "ootp-storyline",
            "search",
            "db.xml",
            "homer",
            "--category",
            "heroics",
        ]);

        let Commands::Search {
            file,
            query,
            category,
        } = cli.command
        else {
            panic!("expected search command");
        };
        assert_eq!(file, PathBuf::from("db.xml"));
        assert_eq!(query, "homer");
        assert_eq!(category.as_deref(), Some("heroics"));
    }

    #[test]
    fn test_cli_parse_global_schema() {
        let cli = Cli::parse_from(["ootp-storyline", "check", "db.xml", "--schema", "s.yaml"]);
        assert_eq!(cli.schema, Some(PathBuf::from("s.yaml")));
        assert!(matches!(cli.command, Commands::Check { .. }));
    }

    #[test]
    fn test_cli_parse_retag() {
        let cli = Cli::parse_from(["ootp-storyline", "retag", "db.xml", "slump", "2", "3"]);
        let Commands::Retag { index, article, .. } = cli.command else {
            panic!("expected retag command");
        };
        assert_eq!(article, "2");
        assert_eq!(index, 3);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
