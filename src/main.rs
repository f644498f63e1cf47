use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};

use docstypo3::renderer::{to_json, to_yaml};
use docstypo3::{
    parse_string, replacements_from_text, HtmlRenderer, ProjectConfig, Substitutions,
    SubstitutionTransform, Token,
};

#[derive(Parser)]
#[command(name = "docstypo3")]
#[command(about = "Turn configuration strings with embedded URLs into linked text")]
#[command(version)]
struct Cli {
    /// Increase logging output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split TEXT into plain text and link tokens
    Link {
        text: String,

        #[arg(short, long, value_enum, default_value_t = LinkFormat::Text)]
        format: LinkFormat,

        /// Exit with status 1 if not every link could be placed
        #[arg(long)]
        strict: bool,
    },
    /// Replace `|cfg_*|` substitutions in a reStructuredText file
    Substitute {
        file: PathBuf,

        /// Project configuration file (TOML, YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = DocumentFormat::Html)]
        format: DocumentFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LinkFormat {
    Text,
    Json,
    Yaml,
    Html,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentFormat {
    Html,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Link {
            text,
            format,
            strict,
        } => {
            let replacement = replacements_from_text(&text);
            let output = match format {
                LinkFormat::Text => replacement.tokens.iter().map(describe_token).collect(),
                LinkFormat::Json => to_json(&replacement)?,
                LinkFormat::Yaml => to_yaml(&replacement)?,
                LinkFormat::Html => HtmlRenderer::new().render_tokens(&replacement.tokens),
            };
            println!("{}", output.trim_end());

            if strict && !replacement.healthy {
                eprintln!("Not every link could be placed in the text");
                process::exit(1);
            }
        }
        Command::Substitute {
            file,
            config,
            format,
        } => {
            let project = ProjectConfig::load(config.as_deref())
                .context("Failed to load project configuration")?;
            let source = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let mut document = parse_string(&source);
            let transform = SubstitutionTransform::new(Substitutions::from_config(&project));
            let replaced = transform.apply(&mut document);
            info!("Replaced {} substitutions in {}", replaced, file.display());

            let output = match format {
                DocumentFormat::Html => HtmlRenderer::new().render_document(&document),
                DocumentFormat::Json => to_json(&document)?,
            };
            println!("{}", output.trim_end());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // RUST_LOG, when set, takes precedence
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn describe_token(token: &Token) -> String {
    match token {
        Token::Text { text } => format!("text  {:?}\n", text),
        Token::Link { text, uri } => format!("link  {:?} -> {}\n", text, uri),
    }
}
