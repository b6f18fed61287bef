//! The `build` command: configuration, discovery, pipeline and output

use anyhow::{Context, Result};
use folio_core::config::CONFIG_FILE;
use folio_core::{
    Config, Diagnostics, HtmlRenderer, LanguageRegistry, OutputMapper, Pipeline, SkipReason,
    SourceInput,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::discover::{Discovery, SourceFile};
use crate::output::write_site;
use crate::BuildArgs;

/// Output directory used when neither flags nor config name one.
const DEFAULT_OUTPUT: &str = "doc";

/// Load `path`, or `./folio.toml` when present, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None if Path::new(CONFIG_FILE).is_file() => Config::from_path(CONFIG_FILE)
            .with_context(|| format!("Failed to load config '{}'", CONFIG_FILE)),
        None => Ok(Config::default()),
    }
}

/// Everything one build needs, with command-line flags layered over the
/// configuration file.
#[derive(Debug)]
pub struct Settings {
    pub paths: Vec<PathBuf>,
    pub output: PathBuf,
    pub name: String,
    pub excludes: Vec<String>,
    pub jobs: Option<usize>,
    pub mapper: OutputMapper,
    pub registry: LanguageRegistry,
}

impl Settings {
    pub fn resolve(args: BuildArgs, mut config: Config) -> Self {
        let paths = if args.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            args.paths
        };

        // Flags replace the file's values, they never merge with them.
        let project = &mut config.project;
        if args.index.is_some() {
            project.index = args.index;
        }
        if !args.strip.is_empty() {
            project.strip = args.strip;
        }
        if args.naming.is_some() {
            project.naming = args.naming;
        }
        if !args.exclude.is_empty() {
            project.exclude = args.exclude;
        }

        let name = args
            .name
            .or_else(|| project.name.clone())
            .unwrap_or_else(|| default_name(&paths[0]));
        let output = args
            .output
            .or_else(|| project.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        let jobs = args.jobs.or(project.jobs);
        let excludes = project.exclude.clone();

        Self {
            paths,
            output,
            name,
            excludes,
            jobs,
            mapper: config.output_mapper(),
            registry: config.registry(),
        }
    }
}

/// Name of the first input's directory, e.g. `widgets` for `.` inside it.
fn default_name(path: &Path) -> String {
    path.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "Documentation".to_string())
}

/// Run a build and report its diagnostics on stderr.
pub fn run(args: BuildArgs, quiet: bool) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let settings = Settings::resolve(args, config);

    if let Some(jobs) = settings.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure the worker pool")?;
    }

    let files = Discovery::new()
        .with_excludes(&settings.excludes)?
        .skipping(&settings.output)
        .collect(&settings.paths)?;
    tracing::info!(files = files.len(), "found source files");

    let (inputs, mut diagnostics) = read_sources(&files, &settings.registry);

    let build = Pipeline::new(&settings.registry, settings.mapper.clone(), &settings.name)
        .run(inputs)
        .context("Build failed")?;
    diagnostics.extend(build.diagnostics);

    let pages = write_site(&build.project, &HtmlRenderer::new(), &settings.output)?;

    if !quiet {
        if !diagnostics.is_empty() {
            eprint!("{}", diagnostics);
        }
        println!(
            "Documented {} file(s) in {} page(s) at {}",
            build.project.len(),
            pages,
            settings.output.display()
        );
    }

    Ok(())
}

/// Read every file a language claims, in parallel.
///
/// Files without a language are not read at all; they and unreadable
/// files come back as diagnostics.
fn read_sources(
    files: &[SourceFile],
    registry: &LanguageRegistry,
) -> (Vec<SourceInput>, Diagnostics) {
    let results: Vec<Result<SourceInput, (String, SkipReason)>> = files
        .par_iter()
        .map(|file| {
            if registry.resolve_path(&file.relative).is_none() {
                return Err((file.relative.clone(), SkipReason::UnrecognizedLanguage));
            }
            std::fs::read_to_string(&file.path)
                .map(|text| SourceInput::new(file.relative.clone(), text))
                .map_err(|e| (file.relative.clone(), SkipReason::Unreadable(e.to_string())))
        })
        .collect();

    let mut inputs = Vec::with_capacity(results.len());
    let mut diagnostics = Diagnostics::new();
    for result in results {
        match result {
            Ok(input) => inputs.push(input),
            Err((path, reason)) => diagnostics.skip(path, reason),
        }
    }
    (inputs, diagnostics)
}
