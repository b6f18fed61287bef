//! Folio CLI - Command-line interface for the Folio documentation generator

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use folio_core::{LanguageDescriptor, OutputNaming};
use std::path::PathBuf;

mod discover;
mod logging;
mod output;
mod site;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version = folio_core::VERSION)]
#[command(about = "Cross-linked documentation sites from commented source code", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    build: BuildArgs,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print nothing but errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the documentation site (the default command)
    Build(BuildArgs),

    /// List the languages Folio recognizes
    Languages {
        /// Configuration file with extra languages (defaults to ./folio.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct BuildArgs {
    /// Files or directories to document (defaults to the current directory)
    paths: Vec<PathBuf>,

    /// Output directory for the generated site
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (defaults to ./folio.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Leading directory to remove from output paths (repeatable)
    #[arg(long)]
    strip: Vec<String>,

    /// Glob pattern of paths to leave out (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Source file rendered as the front page (default README.md)
    #[arg(long)]
    index: Option<String>,

    /// Site title (defaults to the input directory name)
    #[arg(long)]
    name: Option<String>,

    /// Page naming: `append` keeps the source extension, `replace` drops it
    #[arg(long)]
    naming: Option<OutputNaming>,

    /// Worker threads (defaults to available parallelism)
    #[arg(
        short,
        long,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    jobs: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet)?;

    match cli.command {
        Some(Commands::Build(args)) => {
            site::run(args, cli.quiet)?;
        }

        Some(Commands::Languages { config }) => {
            let config = site::load_config(config.as_deref())?;
            for language in config.registry().languages() {
                println!("{}", format_language(language));
            }
        }

        None => {
            // Default behavior: build
            site::run(cli.build, cli.quiet)?;
        }
    }

    Ok(())
}

/// One row of `folio languages`: name, claimed names, comment markers.
fn format_language(language: &LanguageDescriptor) -> String {
    let mut claims: Vec<String> = language.extensions.iter().map(|e| format!(".{e}")).collect();
    claims.extend(language.file_names.iter().cloned());

    let markers = if language.prose_only {
        "(prose)".to_string()
    } else {
        let mut markers = language.line_comments.clone();
        markers.extend(
            language
                .block_comments
                .iter()
                .map(|b| format!("{} {}", b.open, b.close)),
        );
        if markers.is_empty() {
            "-".to_string()
        } else {
            markers.join("  ")
        }
    };

    format!("{:<14} {:<36} {}", language.name, claims.join(" "), markers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::language::BlockComment;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_invocation_builds() {
        let cli = Cli::try_parse_from(["folio", "src", "-o", "site", "--strip", "src"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.build.paths, vec![PathBuf::from("src")]);
        assert_eq!(cli.build.output, Some(PathBuf::from("site")));
        assert_eq!(cli.build.strip, vec!["src".to_string()]);
    }

    #[test]
    fn test_build_subcommand_flags() {
        let cli = Cli::try_parse_from([
            "folio",
            "build",
            "a",
            "b",
            "--exclude",
            "*.min.js",
            "--exclude",
            "vendor/**",
            "--naming",
            "replace",
            "--index",
            "docs/intro.md",
            "--name",
            "Widgets",
            "-j",
            "4",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Build(args)) => {
                assert_eq!(args.paths.len(), 2);
                assert_eq!(args.exclude, vec!["*.min.js", "vendor/**"]);
                assert_eq!(args.naming, Some(OutputNaming::Replace));
                assert_eq!(args.index.as_deref(), Some("docs/intro.md"));
                assert_eq!(args.name.as_deref(), Some("Widgets"));
                assert_eq!(args.jobs, Some(4));
                assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["folio", "build", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);

        let cli = Cli::try_parse_from(["folio", "-q"]).unwrap();
        assert!(cli.quiet);

        assert!(Cli::try_parse_from(["folio", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["folio", "--naming", "both"]).is_err());
        assert!(Cli::try_parse_from(["folio", "-j", "0"]).is_err());
        assert!(Cli::try_parse_from(["folio", "-j", "many"]).is_err());
    }

    #[test]
    fn test_languages_subcommand() {
        let cli = Cli::try_parse_from(["folio", "languages", "--config", "x.toml"]).unwrap();
        match cli.command {
            Some(Commands::Languages { config }) => {
                assert_eq!(config, Some(PathBuf::from("x.toml")));
            }
            _ => panic!("Expected Languages command"),
        }
    }

    #[test]
    fn test_format_language() {
        let c = LanguageDescriptor::new("C")
            .with_extensions(["c", "h"])
            .with_line_comment("//")
            .with_block_comment(BlockComment::new("/*", "*/"));
        let row = format_language(&c);
        assert!(row.starts_with("C "));
        assert!(row.contains(".c .h"));
        assert!(row.ends_with("//  /* */"));

        let text = LanguageDescriptor::new("Text")
            .with_extensions(["txt"])
            .prose_only(true);
        assert!(format_language(&text).ends_with("(prose)"));

        let json = LanguageDescriptor::new("JSON").with_extensions(["json"]);
        assert!(format_language(&json).ends_with(" -"));
    }
}
