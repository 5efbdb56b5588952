mod config;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use log::warn;

use renderer::{ProcessError, Processor, RendererRegistry, Settings, clean};

use crate::config::Config;
use crate::logging::LogLevel;

const SUBCOMMANDS: &[&str] = &["render", "clean", "help"];

/// Global options that consume the following argument.
const VALUE_OPTIONS: &[&str] = &["--config", "--log-level"];
const GLOBAL_FLAGS: &[&str] = &["--no-color"];
/// Handled by clap itself before any subcommand.
const PASSTHROUGH: &[&str] = &["-h", "--help", "-V", "--version"];

#[derive(Parser)]
#[command(
    name = "mdrender",
    version,
    about = "Render diagram code blocks in Markdown files to images"
)]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (default: ./mdrender.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Diagnostic log level on stderr
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render code blocks in Markdown files
    Render(RenderArgs),

    /// Remove orphaned images not linked to in any Markdown file
    Clean(CleanArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Markdown files to process, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Languages to render (comma-separated, built in: dot, plantuml)
    #[arg(short, long, value_delimiter = ',')]
    languages: Vec<String>,

    /// Directory to render code blocks to. Defaults to the directory of each input file.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Prefix to use when linking to rendered files
    #[arg(long)]
    link_prefix: Option<String>,

    /// Seconds before a renderer is killed (0 waits forever)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(clap::Args)]
struct CleanArgs {
    /// Markdown files whose image links are kept
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory containing rendered images
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// List orphaned images without removing them
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    // If the first argument after the global options is not a known
    // subcommand, inject "render" so `mdrender file.md` works like `mdrender render file.md`.
    let args = with_default_subcommand(std::env::args().collect());
    let cli = Cli::parse_from(&args);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let level = cli.log_level.or(config.log.level).unwrap_or(LogLevel::Warn);
    logging::init(level.to_level_filter());

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let exit_code = match cli.command {
        Command::Render(render_args) => do_render(render_args, &config, color_choice),
        Command::Clean(clean_args) => do_clean(clean_args, &config),
    };
    process::exit(exit_code);
}

fn with_default_subcommand(mut args: Vec<String>) -> Vec<String> {
    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        if VALUE_OPTIONS.contains(&arg) {
            i += 2;
        } else if GLOBAL_FLAGS.contains(&arg)
            || VALUE_OPTIONS.iter().any(|o| arg.starts_with(&format!("{}=", o)))
        {
            i += 1;
        } else {
            if !SUBCOMMANDS.contains(&arg) && !PASSTHROUGH.contains(&arg) {
                args.insert(i, "render".to_string());
            }
            break;
        }
    }
    args
}

fn do_render(args: RenderArgs, config: &Config, color_choice: ColorChoice) -> i32 {
    let languages = if args.languages.is_empty() {
        config.render.languages.clone()
    } else {
        args.languages
    };
    if languages.is_empty() {
        eprintln!("error: no languages enabled (use --languages or [render] languages)");
        return 1;
    }

    let timeout = config.timeout(args.timeout);
    let mut registry = RendererRegistry::with_builtins(timeout);
    for (language, custom) in &config.renderers {
        registry.register(language.clone(), custom.to_renderer(timeout));
    }
    for language in &languages {
        if !registry.contains(language) {
            warn!("no renderer registered for enabled language `{}`", language);
        }
    }

    let settings = Settings {
        languages,
        output_dir: args.output_dir.or_else(|| config.render.output_dir.clone()),
        link_prefix: args
            .link_prefix
            .or_else(|| config.render.link_prefix.clone())
            .unwrap_or_default(),
    };
    let processor = Processor::new(registry, settings);

    let mut stdout = std::io::stdout();
    match processor.process_files(&args.files, &mut stdout) {
        Ok(_) => 0,
        Err(error) => {
            emit_process_error(&error, color_choice);
            1
        }
    }
}

fn do_clean(args: CleanArgs, config: &Config) -> i32 {
    let Some(image_dir) = args.image_dir.or_else(|| config.clean.image_dir.clone()) else {
        eprintln!("error: --image-dir is required (or set [clean] image_dir)");
        return 1;
    };

    let orphans = match clean::find_orphans(&args.files, &image_dir) {
        Ok(orphans) => orphans,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    if args.dry_run {
        for path in &orphans {
            println!("Would remove orphaned file {}", path.display());
        }
        return 0;
    }

    for path in &orphans {
        if let Err(e) = clean::remove_files(std::slice::from_ref(path)) {
            eprintln!("error: {}", e);
            return 1;
        }
        println!("Removed orphaned file {}", path.display());
    }
    0
}

fn emit_process_error(error: &ProcessError, color_choice: ColorChoice) {
    let ProcessError::Parse { path, text, error } = error else {
        eprintln!("error: {}", error);
        return;
    };

    let mut files = SimpleFiles::new();
    files.add(path.display().to_string(), text.clone());

    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let diagnostic = error.to_diagnostic();
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
}
