//! Integration tests for the build pipeline, from source text to rendered pages

use std::collections::HashSet;

use folio_core::diagnostics::SkipReason;
use folio_core::{
    BlockKind, BuildError, HtmlRenderer, LanguageDescriptor, LanguageRegistry, OutputMapper,
    OutputNaming, Pipeline, Renderer, SourceInput,
};

fn ext_registry() -> LanguageRegistry {
    let mut registry = LanguageRegistry::new();
    registry
        .register(
            LanguageDescriptor::new("Ext")
                .with_extensions(["ext"])
                .with_line_comment("//"),
        )
        .unwrap();
    registry
}

fn sample_inputs() -> Vec<SourceInput> {
    vec![
        SourceInput::new(
            "README.md",
            "# Widgets\n\nSee [the parser](src/parser.rs) and [setup](scripts/setup.sh#usage).\n",
        ),
        SourceInput::new(
            "src/parser.rs",
            "//! # Parser\n//! Turns tokens into trees.\n\nuse std::fmt;\n\n/// Parse a thing.\n/// Back to the [overview](../README.md).\npub fn parse() {}\n",
        ),
        SourceInput::new(
            "src/lexer.rs",
            "/* Lexer\n * ======\n * Splits text. */\npub fn lex() {}\n",
        ),
        SourceInput::new(
            "scripts/setup.sh",
            "#!/bin/sh\n# ## Usage\n# Run once.\nset -e\necho ok\n",
        ),
        SourceInput::new("Makefile", "# Build everything\nall:\n\tcargo build\n"),
        SourceInput::new("assets/logo.png", "not really a png"),
    ]
}

#[test]
fn test_empty_file_title_is_base_name() {
    let registry = ext_registry();
    let build = Pipeline::new(&registry, OutputMapper::new(), "empty")
        .run(vec![SourceInput::new("dir/empty.ext", "")])
        .unwrap();

    let unit = build.project.unit("dir/empty.ext").unwrap();
    assert!(unit.blocks.is_empty());
    assert_eq!(unit.title, "empty.ext");
    assert!(build.diagnostics.is_empty());
}

#[test]
fn test_unregistered_extensions_are_skipped() {
    let registry = LanguageRegistry::new();
    let build = Pipeline::new(&registry, OutputMapper::new(), "skip")
        .run(vec![
            SourceInput::new("a/x.ext", "// a"),
            SourceInput::new("b/x.ext", "// b"),
        ])
        .unwrap();

    assert!(build.project.is_empty());
    assert!(build.project.unit("a/x.ext").is_none());
    let skipped: Vec<_> = build
        .diagnostics
        .skipped
        .iter()
        .map(|s| (s.path.as_str(), s.reason.clone()))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("a/x.ext", SkipReason::UnrecognizedLanguage),
            ("b/x.ext", SkipReason::UnrecognizedLanguage),
        ]
    );
}

#[test]
fn test_missing_link_target_is_a_diagnostic() {
    let registry = ext_registry();
    let build = Pipeline::new(&registry, OutputMapper::new(), "links")
        .run(vec![SourceInput::new("a.ext", "// See [z](z.ext).\ncode();")])
        .unwrap();

    assert_eq!(build.diagnostics.broken_links.len(), 1);
    let broken = &build.diagnostics.broken_links[0];
    assert_eq!(broken.location.to_string(), "a.ext:1");
    assert_eq!(broken.target, "z.ext");
}

#[test]
fn test_email_autolink_is_not_a_broken_link() {
    let registry = LanguageRegistry::builtin();
    let build = Pipeline::new(&registry, OutputMapper::new(), "mail")
        .run(vec![SourceInput::new("a.rs", "// Contact <dev@example.com>.\nfn a() {}")])
        .unwrap();

    assert!(build.diagnostics.broken_links.is_empty());
    let unit = build.project.unit("a.rs").unwrap();
    let page = HtmlRenderer::new().render_file(&build.project, unit).unwrap();
    assert!(page.contains("<a href=\"mailto:dev@example.com\">dev@example.com</a>"));
    assert!(!page.contains("broken-link\""));
}

#[test]
fn test_empty_input_is_fatal() {
    let registry = LanguageRegistry::builtin();
    let result = Pipeline::new(&registry, OutputMapper::new(), "none").run(Vec::new());
    assert_eq!(result.unwrap_err(), BuildError::EmptyInput);
}

#[test]
fn test_duplicate_output_paths_are_fatal() {
    let registry = LanguageRegistry::builtin();
    let mapper = OutputMapper::new().with_naming(OutputNaming::Replace);
    let result = Pipeline::new(&registry, mapper, "dup").run(vec![
        SourceInput::new("src/util.rs", "fn a() {}"),
        SourceInput::new("src/util.py", "def a(): pass"),
    ]);
    assert!(matches!(
        result,
        Err(BuildError::DuplicateOutputPath { ref output, .. }) if output == "src/util.html"
    ));
}

#[test]
fn test_builtin_site_build() {
    let registry = LanguageRegistry::builtin();
    let build = Pipeline::new(&registry, OutputMapper::new(), "Widgets")
        .run(sample_inputs())
        .unwrap();
    let project = &build.project;

    // Directories first, then files, case-insensitively
    let order: Vec<_> = project.units().iter().map(|u| u.source_path.as_str()).collect();
    assert_eq!(
        order,
        vec!["scripts/setup.sh", "src/lexer.rs", "src/parser.rs", "Makefile", "README.md"]
    );

    assert_eq!(build.diagnostics.skipped.len(), 1);
    assert_eq!(build.diagnostics.skipped[0].path, "assets/logo.png");
    assert!(build.diagnostics.broken_links.is_empty());

    let parser = project.unit("src/parser.rs").unwrap();
    assert_eq!(parser.title, "Parser");
    assert_eq!(parser.blocks[0].kind, BlockKind::Prose);
    assert_eq!(parser.blocks[0].text(), "# Parser\nTurns tokens into trees.");

    let lexer = project.unit("src/lexer.rs").unwrap();
    assert_eq!(lexer.title, "Lexer");
    assert_eq!(lexer.blocks[0].text(), "Lexer\n======\nSplits text.");

    let setup = project.unit("scripts/setup.sh").unwrap();
    assert_eq!(setup.blocks[0].kind, BlockKind::Code);
    assert_eq!(setup.blocks[0].text(), "#!/bin/sh");
    assert_eq!(setup.headings[0].anchor, "usage");

    let readme = project.index_unit().unwrap();
    assert_eq!(readme.source_path, "README.md");
    assert_eq!(readme.blocks.len(), 1);
    assert_eq!(
        project.href("README.md", "scripts/setup.sh#usage").as_deref(),
        Some("scripts/setup.sh.html#usage")
    );
}

#[test]
fn test_blocks_reconstruct_sources() {
    let registry = LanguageRegistry::builtin();
    let inputs = sample_inputs();
    let build = Pipeline::new(&registry, OutputMapper::new(), "Widgets")
        .run(inputs.clone())
        .unwrap();

    for input in &inputs {
        let Some(unit) = build.project.unit(&input.path) else {
            continue;
        };
        let rebuilt: Vec<String> = unit
            .blocks
            .iter()
            .flat_map(|b| b.lines.iter().map(|l| l.original()))
            .collect();
        let original: Vec<&str> = input.text.lines().collect();
        assert_eq!(rebuilt, original, "{}", input.path);

        for pair in unit.blocks.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind, "{}", input.path);
        }
    }
}

#[test]
fn test_runs_are_idempotent() {
    let registry = LanguageRegistry::builtin();
    let pipeline = Pipeline::new(&registry, OutputMapper::new(), "Widgets");
    let first = pipeline.run(sample_inputs()).unwrap();
    let second = pipeline.run(sample_inputs()).unwrap();

    assert_eq!(first.project.toc(), second.project.toc());
    assert_eq!(first.diagnostics, second.diagnostics);
    for (a, b) in first.project.units().iter().zip(second.project.units()) {
        assert_eq!(a.source_path, b.source_path);
        assert_eq!(a.title, b.title);
        assert_eq!(a.blocks, b.blocks);
        assert_eq!(
            first.project.anchor(&a.source_path),
            second.project.anchor(&b.source_path)
        );
    }
}

#[test]
fn test_anchors_are_unique() {
    let registry = ext_registry();
    let paths = ["a-b.ext", "a/b.ext", "a_b.ext", "a b.ext", "a_2d_b.ext", "A/b.ext"];
    let inputs = paths.iter().map(|p| SourceInput::new(*p, "")).collect();
    let build = Pipeline::new(&registry, OutputMapper::new(), "anchors")
        .run(inputs)
        .unwrap();

    let anchors: HashSet<_> = paths
        .iter()
        .map(|p| build.project.anchor(p).unwrap().to_string())
        .collect();
    assert_eq!(anchors.len(), paths.len());
}

#[test]
fn test_every_page_renders() {
    let registry = LanguageRegistry::builtin();
    let build = Pipeline::new(&registry, OutputMapper::new(), "Widgets")
        .run(sample_inputs())
        .unwrap();
    let renderer = HtmlRenderer::new();

    for unit in build.project.units() {
        let page = renderer.render_file(&build.project, unit).unwrap();
        assert!(page.contains(&format!("<h1>{}</h1>", unit.title)), "{}", unit.source_path);
    }

    let index = renderer.render_index(&build.project).unwrap();
    assert!(index.contains("<a href=\"src/parser.rs.html\">the parser</a>"));
    assert!(index.contains("<a href=\"scripts/setup.sh.html#usage\">setup</a>"));

    let parser = build.project.unit("src/parser.rs").unwrap();
    let page = renderer.render_file(&build.project, parser).unwrap();
    assert!(page.contains("<a href=\"../index.html\">overview</a>"));
}
