//! Command-line interface for migrascope.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::extract;
use crate::model::FileModel;
use crate::parent::{self, SpliceMode};
use crate::parser::{self, ParseContext};
use crate::report::{self, Format};
use crate::resolve;
use crate::score::{self, Verdict};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Written by `migrascope init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("templates/default.yaml");

/// C++ to Java migration analysis.
///
/// Extracts a normalized model from C++ and Java sources, resolves the
/// declared type of method call receivers, and scores how well a Java class
/// mirrors the fields of a C++ struct or class.
#[derive(Parser)]
#[command(name = "migrascope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the source model of a C++ file as JSON
    Extract(ExtractArgs),
    /// Extract the fields of a Java file as JSON
    Fields(FieldsArgs),
    /// Resolve the receiver types of method calls
    Resolve(ResolveArgs),
    /// Score a Java class as the counterpart of a C++ struct or class
    Score(ScoreArgs),
    /// Rank Java candidates for a C++ struct or class
    Rank(RankArgs),
    /// Create a migrascope config file
    Init(InitArgs),
}

/// Parent fallback overrides shared by several commands.
#[derive(Parser)]
pub struct FallbackArgs {
    /// Root searched for parent class headers
    #[arg(long)]
    pub search_root: Option<PathBuf>,

    /// Parent collections to splice: variables or complete
    #[arg(long)]
    pub splice: Option<SpliceMode>,
}

/// Arguments for the extract command.
#[derive(Parser)]
pub struct ExtractArgs {
    /// C++ source or header file
    pub path: PathBuf,

    #[command(flatten)]
    pub fallback: FallbackArgs,

    /// Skip the parent class fallback
    #[arg(long)]
    pub no_parent: bool,

    /// Output format: json or pretty
    #[arg(short, long, default_value = "json")]
    pub format: Format,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the fields command.
#[derive(Parser)]
pub struct FieldsArgs {
    /// Java source file
    pub path: PathBuf,

    /// Keep field modifiers in the output
    #[arg(long)]
    pub include_modifiers: bool,

    /// Keep the configured ignored field names
    #[arg(long)]
    pub keep_ignored: bool,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the resolve command.
#[derive(Parser)]
pub struct ResolveArgs {
    /// Extracted model (.json) or C++ source file
    pub input: PathBuf,

    #[command(flatten)]
    pub fallback: FallbackArgs,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: Format,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exit non-zero if any call receiver is unresolved
    #[arg(long)]
    pub fail_on_unresolved: bool,
}

/// Arguments for the score command.
#[derive(Parser)]
pub struct ScoreArgs {
    /// C++ header or source file
    pub cpp_file: PathBuf,

    /// Java source file
    pub java_file: PathBuf,

    /// Minimum similarity (0-100) for a field pair to match
    #[arg(short, long)]
    pub threshold: Option<f64>,

    #[command(flatten)]
    pub fallback: FallbackArgs,

    /// Include every C++ and Java field in the JSON output
    #[arg(long)]
    pub all_fields: bool,

    /// Output format: json or pretty
    #[arg(short, long, default_value = "json")]
    pub format: Format,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the rank command.
#[derive(Parser)]
pub struct RankArgs {
    /// C++ header or source file
    pub cpp_file: PathBuf,

    /// Java files or directories to search for candidates
    #[arg(required = true)]
    pub candidates: Vec<PathBuf>,

    /// Minimum similarity (0-100) for a field pair to match
    #[arg(short, long)]
    pub threshold: Option<f64>,

    #[command(flatten)]
    pub fallback: FallbackArgs,

    /// Only report the best N candidates
    #[arg(long)]
    pub top: Option<usize>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: Format,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "migrascope.yaml")]
    pub output: PathBuf,
}

/// Load the config and apply command-line overrides.
fn load_config(
    explicit: Option<&Path>,
    fallback: Option<&FallbackArgs>,
    threshold: Option<f64>,
) -> anyhow::Result<Config> {
    let mut config = Config::load(explicit)?;

    if let Some(args) = fallback {
        if let Some(root) = &args.search_root {
            config.search_root = root.clone();
        }
        if let Some(splice) = args.splice {
            config.parent_splice = splice;
        }
    }
    if let Some(threshold) = threshold {
        config.threshold = threshold;
    }

    config.validate()?;
    Ok(config)
}

/// Expand directories into the Java files below them.
fn collect_java_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for root in paths {
        if !root.is_dir() {
            files.push(root.clone());
            continue;
        }
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Skip hidden directories
                !(e.file_type().is_dir()
                    && e.depth() > 0
                    && e.file_name().to_string_lossy().starts_with('.'))
            })
        {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file() && is_language(path, "java") {
                files.push(path.to_path_buf());
            }
        }
    }

    Ok(files)
}

fn is_language(path: &Path, language_id: &str) -> bool {
    parser::for_path(path).is_some_and(|g| g.language_id() == language_id)
}

/// Reject sources another grammar claims. Unknown extensions are read as C++.
fn check_cpp_input(path: &Path) -> crate::Result<()> {
    match parser::for_path(path) {
        Some(grammar) if grammar.language_id() != "cpp" => {
            Err(crate::Error::UnsupportedFile(path.to_path_buf()))
        }
        _ => Ok(()),
    }
}

/// Run the extract command.
pub fn run_extract(args: &ExtractArgs, config_path: Option<&Path>) -> anyhow::Result<i32> {
    let config = load_config(config_path, Some(&args.fallback), None)?;
    check_cpp_input(&args.path)?;
    let mut ctx = ParseContext::new();

    let file_model = if args.no_parent {
        FileModel {
            current_file: args.path.to_string_lossy().into_owned(),
            model: extract::extract_cpp_file(&mut ctx, &args.path)?,
        }
    } else {
        parent::resolve_with_parent_fallback(&mut ctx, &args.path, &config.fallback_options())?
    };

    match args.format {
        Format::Json => report::write_json(&file_model, args.output.as_deref())?,
        Format::Pretty => report::write_model_pretty(&file_model),
    }
    Ok(EXIT_SUCCESS)
}

/// Run the fields command.
pub fn run_fields(args: &FieldsArgs, config_path: Option<&Path>) -> anyhow::Result<i32> {
    let config = load_config(config_path, None, None)?;
    let mut ctx = ParseContext::new();

    let mut fields = extract::extract_java_fields_file(&mut ctx, &args.path)?;
    if !args.keep_ignored {
        fields = extract::without_ignored(fields, &config.ignored_java_fields);
    }
    if !args.include_modifiers {
        extract::strip_modifiers(&mut fields);
    }

    report::write_json(&fields, args.output.as_deref())?;
    Ok(EXIT_SUCCESS)
}

/// Load a model from an `extract` JSON document or straight from source.
fn load_file_model(input: &Path, config: &Config) -> anyhow::Result<FileModel> {
    if input.extension().and_then(|e| e.to_str()) == Some("json") {
        let content = extract::read_source(input)?;
        let file_model: FileModel = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("{}: {}", input.display(), crate::Error::from(e))
        })?;
        return Ok(file_model);
    }

    check_cpp_input(input)?;
    let mut ctx = ParseContext::new();
    Ok(parent::resolve_with_parent_fallback(
        &mut ctx,
        input,
        &config.fallback_options(),
    )?)
}

/// Run the resolve command.
pub fn run_resolve(args: &ResolveArgs, config_path: Option<&Path>) -> anyhow::Result<i32> {
    let config = load_config(config_path, Some(&args.fallback), None)?;
    let file_model = load_file_model(&args.input, &config)?;

    let file_name = if file_model.current_file.is_empty() {
        args.input.to_string_lossy().into_owned()
    } else {
        file_model.current_file.clone()
    };
    let resolution = resolve::resolve_all(&file_model.model, &file_name);

    match args.format {
        Format::Json => report::write_json(&resolution, args.output.as_deref())?,
        Format::Pretty => {
            report::write_resolution_pretty(&resolution);
            if let Some(output) = &args.output {
                report::write_json(&resolution, Some(output))?;
            }
        }
    }

    if args.fail_on_unresolved && resolution.summary().unresolved > 0 {
        return Ok(EXIT_FAILED);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the score command.
pub fn run_score(args: &ScoreArgs, config_path: Option<&Path>) -> anyhow::Result<i32> {
    let config = load_config(config_path, Some(&args.fallback), args.threshold)?;
    let mut ctx = ParseContext::new();

    let result = score::score_files(
        &mut ctx,
        &args.cpp_file,
        &args.java_file,
        &config,
        args.all_fields,
    )?;

    if result.score.cpp_fields_count == 0 {
        eprintln!("Warning: no C++ fields found in {}", args.cpp_file.display());
    }
    if result.score.java_fields_count == 0 {
        eprintln!("Warning: no Java fields found in {}", args.java_file.display());
    }

    match args.format {
        Format::Json => report::write_json(&result, args.output.as_deref())?,
        Format::Pretty => {
            report::write_equivalence_pretty(&result);
            if let Some(output) = &args.output {
                report::write_json(&result, Some(output))?;
            }
        }
    }

    if result.score.final_result == Verdict::NoMatch {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the rank command.
pub fn run_rank(args: &RankArgs, config_path: Option<&Path>) -> anyhow::Result<i32> {
    let config = load_config(config_path, Some(&args.fallback), args.threshold)?;
    let candidates = collect_java_files(&args.candidates)?;

    if candidates.is_empty() {
        eprintln!("Warning: no Java candidates to score");
        return Ok(EXIT_FAILED);
    }

    let mut reports = score::rank_candidates(&args.cpp_file, &candidates, &config)?;
    if let Some(top) = args.top {
        reports.truncate(top);
    }

    match args.format {
        Format::Json => report::write_json(&reports, args.output.as_deref())?,
        Format::Pretty => {
            report::write_rank_pretty(&args.cpp_file.to_string_lossy(), &reports);
            if let Some(output) = &args.output {
                report::write_json(&reports, Some(output))?;
            }
        }
    }

    if reports
        .iter()
        .any(|r| r.score.final_result != Verdict::NoMatch)
    {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set search_root to the root of your C++ headers");
    if config::DEFAULT_CONFIG_NAMES.iter().any(|n| args.output == Path::new(n)) {
        println!("  2. Run: migrascope score <file.h> <File.java>");
    } else {
        println!(
            "  2. Run: migrascope score <file.h> <File.java> --config {}",
            args.output.display()
        );
    }

    Ok(EXIT_SUCCESS)
}
