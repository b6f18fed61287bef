//! Prose/code segmentation
//!
//! Splits a source file into alternating prose and code [`Block`]s using the
//! comment syntax of a [`LanguageDescriptor`]. The scan is line oriented and
//! single pass; string literals are not parsed, so a comment marker inside a
//! string still starts a comment.
//!
//! Every line keeps the text that was stripped from it, so the original file
//! can always be rebuilt from the blocks:
//!
//! ```
//! use folio_core::language::LanguageDescriptor;
//! use folio_core::segment::{segment, BlockKind};
//!
//! let c = LanguageDescriptor::new("C").with_line_comment("//");
//! let blocks = segment("// hello\ncode();", &c);
//! assert_eq!(blocks[0].kind, BlockKind::Prose);
//! assert_eq!(blocks[0].text(), "hello");
//! assert_eq!(blocks[1].text(), "code();");
//! ```

use crate::language::{BlockComment, LanguageDescriptor};

/// Kind of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Prose,
    Code,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Prose => "prose",
            BlockKind::Code => "code",
        }
    }
}

/// One source line inside a block.
///
/// `prefix + content + suffix` is exactly the original line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLine {
    /// Indentation and comment marker removed from the front.
    pub prefix: String,
    /// Text shown in the documentation.
    pub content: String,
    /// Close marker removed from the back.
    pub suffix: String,
}

impl BlockLine {
    fn code(line: &str) -> Self {
        Self {
            prefix: String::new(),
            content: line.to_string(),
            suffix: String::new(),
        }
    }

    fn split(line: &str, start: usize, end: usize) -> Self {
        Self {
            prefix: line[..start].to_string(),
            content: line[start..end].to_string(),
            suffix: line[end..].to_string(),
        }
    }

    /// The source line this was cut from.
    pub fn original(&self) -> String {
        format!("{}{}{}", self.prefix, self.content, self.suffix)
    }
}

/// A run of source lines of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// 1-based line number of the first line.
    pub start_line: usize,
    pub lines: Vec<BlockLine>,
    /// Code block introduced by a fold comment; rendered collapsed.
    pub folded: bool,
}

impl Block {
    /// Block text: stripped comment text for prose, verbatim lines for code.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 1-based line number of the last line.
    pub fn end_line(&self) -> usize {
        self.start_line + self.lines.len().saturating_sub(1)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_prose(&self) -> bool {
        self.kind == BlockKind::Prose
    }

    pub fn is_code(&self) -> bool {
        self.kind == BlockKind::Code
    }
}

/// Classification of a single line before blank lines are settled.
#[derive(Debug)]
struct Classified {
    kind: Option<BlockKind>,
    line: BlockLine,
    fold: bool,
}

enum State<'d> {
    Normal,
    InBlock { marker: &'d BlockComment, depth: usize },
}

/// Split `text` into prose and code blocks.
pub fn segment(text: &str, language: &LanguageDescriptor) -> Vec<Block> {
    if text.is_empty() {
        return Vec::new();
    }
    let classified = classify(text, language);
    coalesce(settle_blank_lines(classified))
}

fn classify(text: &str, language: &LanguageDescriptor) -> Vec<Classified> {
    let mut state = State::Normal;
    let mut out = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let classified = if language.prose_only {
            Classified {
                kind: Some(BlockKind::Prose),
                line: BlockLine::code(line),
                fold: false,
            }
        } else {
            match state {
                State::Normal => {
                    let (classified, next) = classify_normal(line, index, language);
                    state = next;
                    classified
                }
                State::InBlock { marker, depth } => {
                    let (classified, next) = classify_in_block(line, marker, depth, language);
                    state = next;
                    classified
                }
            }
        };
        out.push(classified);
    }

    out
}

fn classify_normal<'d>(
    line: &str,
    index: usize,
    language: &'d LanguageDescriptor,
) -> (Classified, State<'d>) {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();

    if trimmed.is_empty() {
        let blank = Classified {
            kind: None,
            line: BlockLine::code(line),
            fold: false,
        };
        return (blank, State::Normal);
    }

    if index == 0 && trimmed.starts_with("#!") {
        return (code_line(line), State::Normal);
    }

    let line_marker = language.match_line_comment(trimmed);
    let block_marker = language.match_block_open(trimmed);

    match (line_marker, block_marker) {
        (Some(prefix), Some(block)) if prefix.len() > block.open.len() => {
            (line_comment(line, indent, prefix, language), State::Normal)
        }
        (_, Some(block)) => open_block_comment(line, indent, block, language),
        (Some(prefix), None) => (line_comment(line, indent, prefix, language), State::Normal),
        (None, None) => (code_line(line), State::Normal),
    }
}

fn code_line(line: &str) -> Classified {
    Classified {
        kind: Some(BlockKind::Code),
        line: BlockLine::code(line),
        fold: false,
    }
}

fn line_comment(
    line: &str,
    indent: usize,
    prefix: &str,
    language: &LanguageDescriptor,
) -> Classified {
    let mut start = indent + prefix.len();
    let body = &line[start..];

    if let Some(ignore) = language.ignore_prefix.as_deref() {
        if !ignore.is_empty() && body.starts_with(ignore) {
            return code_line(line);
        }
    }

    let mut fold = false;
    if let Some(fold_prefix) = language.fold_prefix.as_deref() {
        if !fold_prefix.is_empty() && body.starts_with(fold_prefix) {
            fold = true;
            start += fold_prefix.len();
        }
    }

    start += leading_space(&line[start..]);
    Classified {
        kind: Some(BlockKind::Prose),
        line: BlockLine::split(line, start, line.len()),
        fold,
    }
}

fn open_block_comment<'d>(
    line: &str,
    indent: usize,
    block: &'d BlockComment,
    language: &LanguageDescriptor,
) -> (Classified, State<'d>) {
    let body_start = indent + block.open.len();
    let body = &line[body_start..];

    match find_close(body, block, language.nested, 1) {
        Ok(close_at) => {
            let close_at = body_start + close_at;
            if !line[close_at + block.close.len()..].trim().is_empty() {
                return (code_line(line), State::Normal);
            }
            let start = skip_middle_run(line, body_start, close_at, block);
            let start = start + leading_space(&line[start..close_at]);
            let end = close_at - trailing_space(&line[start..close_at]);
            (prose(BlockLine::split(line, start, end)), State::Normal)
        }
        Err(depth) => {
            let start = skip_middle_run(line, body_start, line.len(), block);
            let start = start + leading_space(&line[start..]);
            let state = State::InBlock {
                marker: block,
                depth,
            };
            (prose(BlockLine::split(line, start, line.len())), state)
        }
    }
}

fn classify_in_block<'d>(
    line: &str,
    block: &'d BlockComment,
    depth: usize,
    language: &LanguageDescriptor,
) -> (Classified, State<'d>) {
    match find_close(line, block, language.nested, depth) {
        Ok(close_at) => {
            if !line[close_at + block.close.len()..].trim().is_empty() {
                return (code_line(line), State::Normal);
            }
            let start = interior_start(&line[..close_at], block);
            let end = close_at - trailing_space(&line[start..close_at]);
            (prose(BlockLine::split(line, start, end)), State::Normal)
        }
        Err(depth) => {
            let start = interior_start(line, block);
            let state = State::InBlock {
                marker: block,
                depth,
            };
            (prose(BlockLine::split(line, start, line.len())), state)
        }
    }
}

fn prose(line: BlockLine) -> Classified {
    Classified {
        kind: Some(BlockKind::Prose),
        line,
        fold: false,
    }
}

/// Skip a run of middle prefixes right after an open marker, as in `/**`.
fn skip_middle_run(line: &str, mut start: usize, end: usize, block: &BlockComment) -> usize {
    if let Some(middle) = block.middle.as_deref().filter(|m| !m.is_empty()) {
        while line[start..end].starts_with(middle) {
            start += middle.len();
        }
    }
    start
}

/// Byte offset where the text of an interior block comment line starts:
/// indentation, then the middle prefix and one space when present.
fn interior_start(line: &str, block: &BlockComment) -> usize {
    let trimmed = line.trim_start();
    let mut start = line.len() - trimmed.len();
    if let Some(middle) = block.middle.as_deref().filter(|m| !m.is_empty()) {
        if trimmed.starts_with(middle) {
            start += middle.len();
            start += leading_space(&line[start..]);
        }
    }
    start
}

/// Find the close marker that brings `depth` to zero.
///
/// Returns the byte offset of that marker, or the remaining depth when the
/// line ends first.
fn find_close(
    text: &str,
    block: &BlockComment,
    nested: bool,
    mut depth: usize,
) -> Result<usize, usize> {
    let nests = nested && block.open != block.close;
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with(block.close.as_str()) {
            depth -= 1;
            if depth == 0 {
                return Ok(i);
            }
            i += block.close.len();
        } else if nests && rest.starts_with(block.open.as_str()) {
            depth += 1;
            i += block.open.len();
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    Err(depth)
}

/// Length of at most one leading whitespace character.
fn leading_space(text: &str) -> usize {
    match text.chars().next() {
        Some(c) if c.is_whitespace() => c.len_utf8(),
        _ => 0,
    }
}

/// Length of at most one trailing whitespace character.
fn trailing_space(text: &str) -> usize {
    match text.chars().next_back() {
        Some(c) if c.is_whitespace() => c.len_utf8(),
        _ => 0,
    }
}

/// Give every blank line outside a block comment a kind.
///
/// A blank run after prose stays prose when prose follows it; when code follows
/// it starts the code block. A run that reaches the end of the file also stays
/// prose, instead of becoming a trailing code block of nothing but blank
/// lines. Blank runs after code stay code, and leading blank runs take the
/// kind of the first non-blank line.
fn settle_blank_lines(mut lines: Vec<Classified>) -> Vec<Classified> {
    let mut i = 0;
    while i < lines.len() {
        if lines[i].kind.is_some() {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < lines.len() && lines[i].kind.is_none() {
            i += 1;
        }
        let before = run_start.checked_sub(1).and_then(|j| lines[j].kind);
        let after = lines.get(i).and_then(|l| l.kind);
        let kind = match (before, after) {
            (Some(BlockKind::Prose), Some(BlockKind::Prose) | None) => BlockKind::Prose,
            (Some(_), _) => BlockKind::Code,
            (None, Some(kind)) => kind,
            (None, None) => BlockKind::Code,
        };
        for line in &mut lines[run_start..i] {
            line.kind = Some(kind);
        }
    }
    lines
}

fn coalesce(lines: Vec<Classified>) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut fold_pending = false;

    for (index, classified) in lines.into_iter().enumerate() {
        let kind = classified.kind.unwrap_or(BlockKind::Code);
        match blocks.last_mut() {
            Some(block) if block.kind == kind => block.lines.push(classified.line),
            _ => {
                let folded = kind == BlockKind::Code && fold_pending;
                if kind == BlockKind::Code {
                    fold_pending = false;
                }
                blocks.push(Block {
                    kind,
                    start_line: index + 1,
                    lines: vec![classified.line],
                    folded,
                });
            }
        }
        if classified.fold {
            fold_pending = true;
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageRegistry;

    fn slashes() -> LanguageDescriptor {
        LanguageDescriptor::new("Slash").with_line_comment("//")
    }

    fn c_style() -> LanguageDescriptor {
        LanguageDescriptor::new("C")
            .with_line_comment("//")
            .with_block_comment(BlockComment::new("/*", "*/").with_middle("*"))
            .with_ignore_prefix("}")
            .with_fold_prefix("^")
    }

    fn kinds(blocks: &[Block]) -> Vec<(BlockKind, String)> {
        blocks.iter().map(|b| (b.kind, b.text())).collect()
    }

    fn assert_reconstructs(text: &str, blocks: &[Block]) {
        let rebuilt: Vec<String> = blocks
            .iter()
            .flat_map(|b| b.lines.iter().map(BlockLine::original))
            .collect();
        let original: Vec<&str> = text.lines().collect();
        assert_eq!(rebuilt, original);

        let mut expected_line = 1;
        for block in blocks {
            assert_eq!(block.start_line, expected_line);
            expected_line = block.end_line() + 1;
        }
        for pair in blocks.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    #[test]
    fn line_comment_then_code() {
        let text = "// hello\ncode();";
        let blocks = segment(text, &slashes());
        assert_eq!(
            kinds(&blocks),
            vec![
                (BlockKind::Prose, "hello".to_string()),
                (BlockKind::Code, "code();".to_string())
            ]
        );
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn block_comment_spanning_lines() {
        let language =
            LanguageDescriptor::new("Block").with_block_comment(BlockComment::new("/*", "*/"));
        let text = "/* a\nb */\nx=1";
        let blocks = segment(text, &language);
        assert_eq!(
            kinds(&blocks),
            vec![
                (BlockKind::Prose, "a\nb".to_string()),
                (BlockKind::Code, "x=1".to_string())
            ]
        );
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn empty_file_has_no_blocks() {
        assert!(segment("", &c_style()).is_empty());
    }

    #[test]
    fn no_comment_syntax_is_one_code_block() {
        let json = LanguageDescriptor::new("JSON");
        let text = "{\n  // not a comment\n  \"a\": 1\n}\n";
        let blocks = segment(text, &json);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_code());
        assert_eq!(blocks[0].line_count(), 4);
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn prose_only_is_one_prose_block() {
        let markdown = LanguageDescriptor::new("Markdown").prose_only(true);
        let text = "# Title\n\n    indented code sample\n";
        let blocks = segment(text, &markdown);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_prose());
        assert_eq!(blocks[0].text(), "# Title\n\n    indented code sample");
    }

    #[test]
    fn strips_marker_and_one_space_only() {
        let blocks = segment("//   indented **md**\n//no space", &slashes());
        assert_eq!(blocks[0].text(), "  indented **md**\nno space");
        assert_eq!(blocks[0].lines[0].prefix, "// ");
    }

    #[test]
    fn indented_comments_are_prose() {
        let text = "fn main() {\n    // explain\n    run();\n}";
        let blocks = segment(text, &slashes());
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].text(), "explain");
        assert_eq!(blocks[1].lines[0].prefix, "    // ");
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn blank_between_prose_stays_prose() {
        let text = "// a\n\n// b\ncode();";
        let blocks = segment(text, &slashes());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "a\n\nb");
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn blank_between_prose_and_code_is_code() {
        let text = "// a\n\ncode();\n\n// b";
        let blocks = segment(text, &slashes());
        assert_eq!(
            kinds(&blocks),
            vec![
                (BlockKind::Prose, "a".to_string()),
                (BlockKind::Code, "\ncode();\n".to_string()),
                (BlockKind::Prose, "b".to_string()),
            ]
        );
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn trailing_blank_after_prose_stays_prose() {
        let text = "x();\n// done\n\n";
        let blocks = segment(text, &slashes());
        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].is_prose());
        assert_eq!(blocks[1].line_count(), 2);
    }

    #[test]
    fn leading_blank_lines_follow_first_line() {
        let blocks = segment("\n\n// intro\nx();", &slashes());
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_prose());
        assert_eq!(blocks[0].start_line, 1);

        let blocks = segment("\n  \n", &slashes());
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_code());
    }

    #[test]
    fn javadoc_style_comment() {
        let text = "/**\n * Adds numbers.\n *\n * @param a left\n */\nint add(int a);";
        let blocks = segment(text, &c_style());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "\nAdds numbers.\n\n@param a left\n");
        assert_eq!(blocks[1].text(), "int add(int a);");
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn single_line_block_comment() {
        let text = "/* note */\nx = 1;";
        let blocks = segment(text, &c_style());
        assert_eq!(blocks[0].text(), "note");
        assert_eq!(blocks[0].lines[0].suffix, " */");
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn single_line_doc_comment_strips_stars() {
        let text = "/** Doc line */\nvoid f();\n/**/";
        let blocks = segment(text, &c_style());
        assert_eq!(blocks[0].text(), "Doc line");
        assert_eq!(blocks[2].text(), "");
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn block_comment_followed_by_code_is_code() {
        let text = "/* inline */ int x;\n// real";
        let blocks = segment(text, &c_style());
        assert_eq!(
            kinds(&blocks),
            vec![
                (BlockKind::Code, "/* inline */ int x;".to_string()),
                (BlockKind::Prose, "real".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_runs_to_eof() {
        let text = "x();\n/* never\nclosed\n\n// still prose";
        let blocks = segment(text, &c_style());
        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].is_prose());
        assert_eq!(blocks[1].text(), "never\nclosed\n\n// still prose");
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn nested_block_comments() {
        let language = LanguageDescriptor::new("Hs")
            .with_block_comment(BlockComment::new("{-", "-}"))
            .nested(true);
        let text = "{- outer\n{- inner -}\nstill outer -}\nmain = pure ()";
        let blocks = segment(text, &language);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].line_count(), 3);
        assert_eq!(blocks[1].text(), "main = pure ()");
        assert_reconstructs(text, &blocks);

        let flat =
            LanguageDescriptor::new("Flat").with_block_comment(BlockComment::new("{-", "-}"));
        let blocks = segment(text, &flat);
        assert_eq!(blocks[0].line_count(), 2);
        assert!(blocks[1].is_code());
    }

    #[test]
    fn ignore_prefix_keeps_comment_in_code() {
        let text = "if (x) {\n  y();\n//} end if\n}";
        let blocks = segment(text, &c_style());
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_code());
    }

    #[test]
    fn fold_prefix_folds_next_code_block() {
        let text = "//^ setup boilerplate\nlet a = 1;\n// normal\nlet b = 2;";
        let blocks = segment(text, &c_style());
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].text(), "setup boilerplate");
        assert!(blocks[1].folded);
        assert!(!blocks[3].folded);
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn shebang_is_code() {
        let registry = LanguageRegistry::builtin();
        let shell = registry.resolve("sh").unwrap();
        let text = "#!/bin/sh\n# Say hi\necho hi";
        let blocks = segment(text, shell);
        assert_eq!(
            kinds(&blocks),
            vec![
                (BlockKind::Code, "#!/bin/sh".to_string()),
                (BlockKind::Prose, "Say hi".to_string()),
                (BlockKind::Code, "echo hi".to_string()),
            ]
        );
    }

    #[test]
    fn marker_inside_string_still_counts() {
        let text = "let url = \"x\";\n    // looks like code: \"http://x\"";
        let blocks = segment(text, &slashes());
        assert_eq!(blocks.len(), 2);

        let text = "// \"quoted\"";
        assert!(segment(text, &slashes())[0].is_prose());
    }

    #[test]
    fn rust_doc_comments() {
        let registry = LanguageRegistry::builtin();
        let rust = registry.resolve("rs").unwrap();
        let text = "//! Crate docs\n\n/// Item docs\npub fn f() {}\n";
        let blocks = segment(text, rust);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "Crate docs\n\nItem docs");
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn lua_long_comment_beats_line_comment() {
        let registry = LanguageRegistry::builtin();
        let lua = registry.resolve("lua").unwrap();
        let text = "--[[ Long\ncomment ]]\n-- short\nprint(1)";
        let blocks = segment(text, lua);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "Long\ncomment\nshort");
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn coffeescript_hash_runs_are_line_comments() {
        let registry = LanguageRegistry::builtin();
        let coffee = registry.resolve("coffee").unwrap();

        let text = "#### Section\nx = 1\ny = 2\n# note\nz = 3";
        let blocks = segment(text, coffee);
        assert_eq!(
            kinds(&blocks),
            vec![
                (BlockKind::Prose, "### Section".to_string()),
                (BlockKind::Code, "x = 1\ny = 2".to_string()),
                (BlockKind::Prose, "note".to_string()),
                (BlockKind::Code, "z = 3".to_string()),
            ]
        );
        assert_reconstructs(text, &blocks);

        let text = "###\nHere comment\n###\nx = 1";
        let blocks = segment(text, coffee);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "\nHere comment\n");
        assert_eq!(blocks[1].text(), "x = 1");
        assert_reconstructs(text, &blocks);
    }

    #[test]
    fn crlf_lines() {
        let text = "// a\r\nb();\r\n";
        let blocks = segment(text, &slashes());
        assert_eq!(blocks[0].text(), "a");
        assert_eq!(blocks[1].text(), "b();");
    }

    #[test]
    fn reconstruction_across_builtin_languages() {
        let registry = LanguageRegistry::builtin();
        let samples = [
            ("rs", "//! m\n\nfn a() {\n    /* x\n     * y */\n    b(); // tail\n}\n"),
            ("py", "#!/usr/bin/env python\n# doc\n\ndef f():\n    pass\n"),
            ("rb", "=begin\nBlock\n=end\nputs 1\n"),
            ("hs", "{- a {- b -} c -}\nmain = x\n-- end\n"),
            ("html", "<!-- top -->\n<p>hi</p>\n<!--\n multi\n-->\n"),
            ("ml", "(* ocaml\n * stars\n *)\nlet x = 1\n"),
            ("md", "# Readme\n\ntext\n"),
        ];
        for (ext, text) in samples {
            let language = registry.resolve(ext).unwrap();
            let blocks = segment(text, language);
            assert_reconstructs(text, &blocks);
        }
    }

    #[test]
    fn segmentation_is_deterministic() {
        let text = "// a\nx();\n/* b\n c */\n\ny();";
        assert_eq!(segment(text, &c_style()), segment(text, &c_style()));
    }
}
