//! Headings and file references found in prose
//!
//! Prose blocks are Markdown. This module walks them with pulldown-cmark to
//! collect the heading outline (for the table of contents and page anchors)
//! and every relative link, which the project later resolves to another
//! file's documentation.

use std::collections::{HashMap, HashSet};

use percent_encoding::percent_decode_str;
use pulldown_cmark::{Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};

use crate::segment::Block;

/// A Markdown heading inside a file's prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 1 to 6
    pub level: u8,
    pub text: String,
    /// Element id, unique within the file.
    pub anchor: String,
    /// 1-based source line.
    pub line: usize,
}

/// A relative link from prose to another file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Link destination exactly as written.
    pub raw: String,
    /// Decoded path part of the destination.
    pub path: String,
    /// Fragment after `#`, if any.
    pub fragment: Option<String>,
    /// 1-based source line.
    pub line: usize,
}

/// Headings and references of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    pub headings: Vec<Heading>,
    pub references: Vec<Reference>,
}

/// Markdown extensions enabled for prose, shared with the renderer so both
/// see the same heading sequence.
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Collect the outline of a file from its prose blocks.
pub fn extract(blocks: &[Block]) -> Outline {
    let mut outline = Outline::default();
    let mut anchors = AnchorAllocator::default();

    for block in blocks.iter().filter(|b| b.is_prose()) {
        let text = block.text();
        let mut open_heading: Option<(u8, usize, String)> = None;

        for (event, range) in Parser::new_ext(&text, markdown_options()).into_offset_iter() {
            let line = block.start_line + text[..range.start].matches('\n').count();
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    open_heading = Some((heading_level(level), line, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, line, text)) = open_heading.take() {
                        let text = text.trim().to_string();
                        outline.headings.push(Heading {
                            level,
                            anchor: anchors.allocate(&text),
                            text,
                            line,
                        });
                    }
                }
                Event::Text(fragment) | Event::Code(fragment) => {
                    if let Some((_, _, text)) = open_heading.as_mut() {
                        text.push_str(&fragment);
                    }
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    ..
                }) if can_reference_file(link_type) => {
                    if let Some(reference) = parse_reference(&dest_url, line) {
                        outline.references.push(reference);
                    }
                }
                _ => {}
            }
        }
    }

    outline
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Autolinks (`<https://..>`, `<dev@example.com>`) never name a file, even
/// though an email autolink's destination carries no scheme.
pub fn can_reference_file(link_type: LinkType) -> bool {
    !matches!(link_type, LinkType::Autolink | LinkType::Email)
}

/// Parse a link destination into a reference when it points at a relative
/// path inside the project.
pub fn parse_reference(destination: &str, line: usize) -> Option<Reference> {
    if !is_relative_target(destination) {
        return None;
    }
    let (path, fragment) = match destination.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment.to_string())),
        None => (destination, None),
    };
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    let path = percent_decode_str(path).decode_utf8_lossy().into_owned();
    if path.is_empty() {
        return None;
    }
    Some(Reference {
        raw: destination.to_string(),
        path,
        fragment,
        line,
    })
}

/// Whether a link destination is a relative path rather than a URL, an
/// absolute path or a fragment of the current page.
pub fn is_relative_target(destination: &str) -> bool {
    let destination = destination.trim();
    !(destination.is_empty()
        || destination.starts_with('#')
        || destination.starts_with('/')
        || destination.starts_with('\\')
        || has_scheme(destination))
}

fn has_scheme(destination: &str) -> bool {
    let Some(colon) = destination.find(':') else {
        return false;
    };
    let scheme = &destination[..colon];
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Turn heading text into an element id.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

/// Hands out unique heading anchors within one page.
#[derive(Debug, Default)]
struct AnchorAllocator {
    used: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

impl AnchorAllocator {
    fn allocate(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut suffix = self.suffixes.get(&base).copied().unwrap_or(0);
        let mut candidate = base.clone();
        while self.used.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}-{suffix}");
        }
        self.suffixes.insert(base, suffix);
        self.used.insert(candidate.clone());
        candidate
    }
}
