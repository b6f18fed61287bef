//! HTML site renderer

use std::fmt::Write;

use pulldown_cmark::{html, CowStr, Event, Parser, Tag};
use thiserror::Error;

use crate::crosslink::relative_url;
use crate::outline::{can_reference_file, is_relative_target, markdown_options};
use crate::project::{NavContext, Project, TocNode};
use crate::search;
use crate::segment::Block;
use crate::unit::{FileUnit, INDEX_PAGE};

/// Errors raised while rendering pages.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("'{0}' is not part of the project")]
    UnknownUnit(String),

    #[error("failed to serialize search index: {0}")]
    SearchIndex(#[from] serde_json::Error),

    #[error("failed to format page: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Turns a project into pages.
pub trait Renderer: Sync {
    /// Render the page of one file.
    fn render_file(&self, project: &Project, unit: &FileUnit) -> Result<String, RenderError>;

    /// Render the front page.
    fn render_index(&self, project: &Project) -> Result<String, RenderError>;
}

/// Turns code into markup.
pub trait Highlighter: Send + Sync {
    /// `language` is the descriptor's highlighter identifier.
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// Escaped code in a `language-*` classed block, for client-side
/// highlighters to pick up.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, language: &str) -> String {
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape_html(language),
            escape_html(code)
        )
    }
}

/// A file written next to the pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: &'static str,
    pub contents: String,
}

/// Stylesheet, search script and search index.
pub fn assets(project: &Project) -> Result<Vec<Asset>, RenderError> {
    Ok(vec![
        Asset {
            path: "folio.css",
            contents: format!("{STYLESHEET}{}", search::search_css()),
        },
        Asset {
            path: "search.js",
            contents: search::search_js().to_string(),
        },
        Asset {
            path: "search-index.json",
            contents: search::to_json(&search::build_index(project))?,
        },
    ])
}

/// Default renderer: one page per file with a sidebar table of contents.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer<H = PlainHighlighter> {
    highlighter: H,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: Highlighter> HtmlRenderer<H> {
    pub fn with_highlighter(highlighter: H) -> Self {
        Self { highlighter }
    }

    fn write_segments(
        &self,
        output: &mut String,
        project: &Project,
        unit: &FileUnit,
    ) -> Result<(), RenderError> {
        let mut headings = unit.headings.iter().map(|h| h.anchor.as_str());
        for block in &unit.blocks {
            if block.is_prose() {
                writeln!(output, "<section class=\"segment {}\">", block.kind.as_str())?;
                output.push_str(&render_prose(block, project, unit, &mut headings));
                writeln!(output, "</section>")?;
            } else {
                self.write_code(output, block, &unit.language.highlighter)?;
            }
        }
        Ok(())
    }

    fn write_code(
        &self,
        output: &mut String,
        block: &Block,
        language: &str,
    ) -> Result<(), RenderError> {
        writeln!(output, "<section class=\"segment {}\">", block.kind.as_str())?;
        if block.folded {
            writeln!(
                output,
                "<details class=\"folded\"><summary>{} hidden line(s)</summary>",
                block.line_count()
            )?;
        }
        writeln!(output, "<div class=\"listing\">")?;
        write!(output, "<pre class=\"gutter\">")?;
        for line in block.start_line..=block.end_line() {
            writeln!(output, "<a id=\"L{line}\" href=\"#L{line}\">{line}</a>")?;
        }
        writeln!(output, "</pre>")?;
        output.push_str(&self.highlighter.highlight(&block.text(), language));
        writeln!(output)?;
        writeln!(output, "</div>")?;
        if block.folded {
            writeln!(output, "</details>")?;
        }
        writeln!(output, "</section>")?;
        Ok(())
    }
}

impl<H: Highlighter> Renderer for HtmlRenderer<H> {
    fn render_file(&self, project: &Project, unit: &FileUnit) -> Result<String, RenderError> {
        let nav = project
            .nav(&unit.source_path)
            .ok_or_else(|| RenderError::UnknownUnit(unit.source_path.clone()))?;
        let page = unit.output_path.as_str();
        let mut body = String::new();

        write_breadcrumbs(&mut body, project, unit, &nav)?;
        writeln!(body, "<header>")?;
        writeln!(body, "  <h1>{}</h1>", escape_html(&unit.title))?;
        writeln!(
            body,
            "  <p class=\"source-path\"><code>{}</code> · {} · file {} of {}</p>",
            escape_html(&unit.source_path),
            escape_html(&unit.language.name),
            nav.position,
            nav.siblings
        )?;
        writeln!(body, "</header>")?;
        self.write_segments(&mut body, project, unit)?;
        write_pager(&mut body, page, &nav)?;

        write_page(project, page, &unit.title, Some(unit), &body)
    }

    fn render_index(&self, project: &Project) -> Result<String, RenderError> {
        let index = project.index_unit();
        let mut body = String::new();

        match index {
            Some(unit) => {
                writeln!(body, "<header>")?;
                writeln!(body, "  <h1>{}</h1>", escape_html(&unit.title))?;
                writeln!(body, "</header>")?;
                self.write_segments(&mut body, project, unit)?;
            }
            None => {
                writeln!(body, "<header>")?;
                writeln!(body, "  <h1>{}</h1>", escape_html(&project.name))?;
                writeln!(body, "</header>")?;
            }
        }

        writeln!(body, "<section class=\"contents\">")?;
        writeln!(body, "  <h2>Files</h2>")?;
        writeln!(body, "  <ul>")?;
        for unit in project.units() {
            writeln!(
                body,
                "    <li><a href=\"{}\"><code>{}</code></a> {}</li>",
                escape_html(&unit.output_path),
                escape_html(&unit.source_path),
                escape_html(&unit.title)
            )?;
        }
        writeln!(body, "  </ul>")?;
        writeln!(body, "</section>")?;

        let title = index.map_or(project.name.as_str(), |u| u.title.as_str());
        write_page(project, INDEX_PAGE, title, index, &body)
    }
}

fn write_page(
    project: &Project,
    page: &str,
    title: &str,
    current: Option<&FileUnit>,
    body: &str,
) -> Result<String, RenderError> {
    let root = root_prefix(page);
    let mut output = String::new();

    writeln!(output, "<!DOCTYPE html>")?;
    writeln!(output, "<html lang=\"en\">")?;
    writeln!(output, "<head>")?;
    writeln!(output, "  <meta charset=\"UTF-8\">")?;
    writeln!(
        output,
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    )?;
    writeln!(
        output,
        "  <title>{} - {}</title>",
        escape_html(title),
        escape_html(&project.name)
    )?;
    writeln!(output, "  <link rel=\"stylesheet\" href=\"{root}folio.css\">")?;
    writeln!(output, "</head>")?;
    writeln!(output, "<body data-root=\"{root}\">")?;

    writeln!(output, "<nav class=\"sidebar\">")?;
    writeln!(output, "  <div class=\"sidebar-header\">")?;
    writeln!(
        output,
        "    <h2><a href=\"{root}{INDEX_PAGE}\">{}</a></h2>",
        escape_html(&project.name)
    )?;
    writeln!(output, "  </div>")?;
    writeln!(output, "  <div class=\"finder\">")?;
    writeln!(
        output,
        "    <input id=\"search-input\" type=\"search\" placeholder=\"Search (press /)\" autocomplete=\"off\">"
    )?;
    writeln!(output, "    <ol id=\"search-results\" hidden></ol>")?;
    writeln!(output, "  </div>")?;
    write_toc(&mut output, project, project.toc(), page, current, 1)?;
    writeln!(output, "</nav>")?;

    writeln!(output, "<main class=\"content\">")?;
    output.push_str(body);
    writeln!(output, "</main>")?;

    writeln!(output, "<footer>")?;
    writeln!(output, "  <p>Generated by Folio {}</p>", crate::VERSION)?;
    writeln!(output, "</footer>")?;
    writeln!(output, "<script src=\"{root}search.js\"></script>")?;
    writeln!(output, "</body>")?;
    writeln!(output, "</html>")?;

    Ok(output)
}

/// Render one prose block, giving headings their outline anchors and
/// pointing relative links at the pages they refer to.
fn render_prose<'h>(
    block: &Block,
    project: &Project,
    unit: &FileUnit,
    headings: &mut impl Iterator<Item = &'h str>,
) -> String {
    let text = block.text();
    let events = Parser::new_ext(&text, markdown_options()).map(|event| match event {
        Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }) => Event::Start(Tag::Heading {
            level,
            id: headings.next().map(|anchor| CowStr::from(anchor.to_string())).or(id),
            classes,
            attrs,
        }),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if can_reference_file(link_type) && is_relative_target(&dest_url) => {
            match project.href(&unit.source_path, &dest_url) {
                Some(href) => Event::Start(Tag::Link {
                    link_type,
                    dest_url: href.into(),
                    title,
                    id,
                }),
                None => Event::InlineHtml(
                    format!(
                        "<a href=\"{}\" class=\"broken-link\" title=\"broken link\">",
                        escape_html(&dest_url)
                    )
                    .into(),
                ),
            }
        }
        other => other,
    });

    let mut rendered = String::new();
    html::push_html(&mut rendered, events);
    rendered
}

fn write_toc(
    output: &mut String,
    project: &Project,
    node: &TocNode,
    page: &str,
    current: Option<&FileUnit>,
    depth: usize,
) -> Result<(), RenderError> {
    let indent = "  ".repeat(depth);
    writeln!(output, "{indent}<ul class=\"toc\">")?;
    for child in node.children() {
        match child {
            TocNode::Directory { name, .. } => {
                writeln!(
                    output,
                    "{indent}  <li class=\"toc-dir\"><span>{}/</span>",
                    escape_html(name)
                )?;
                write_toc(output, project, child, page, current, depth + 2)?;
                writeln!(output, "{indent}  </li>")?;
            }
            TocNode::File { name, unit } => {
                let target = &project.units()[*unit];
                let class = if current.is_some_and(|c| c.source_path == target.source_path) {
                    " class=\"current\""
                } else {
                    ""
                };
                writeln!(
                    output,
                    "{indent}  <li><a href=\"{}\" title=\"{}\"{class}>{}</a></li>",
                    escape_html(&relative_url(page, &target.output_path)),
                    escape_html(&target.title),
                    escape_html(name)
                )?;
            }
        }
    }
    writeln!(output, "{indent}</ul>")?;
    Ok(())
}

fn write_breadcrumbs(
    output: &mut String,
    project: &Project,
    unit: &FileUnit,
    nav: &NavContext<'_>,
) -> Result<(), RenderError> {
    write!(
        output,
        "<nav class=\"breadcrumbs\"><a href=\"{}\">{}</a>",
        relative_url(&unit.output_path, INDEX_PAGE),
        escape_html(&project.name)
    )?;
    for crumb in &nav.breadcrumbs {
        write!(output, " / <span>{}</span>", escape_html(&crumb.name))?;
    }
    writeln!(output, " / <span>{}</span></nav>", escape_html(unit.file_name()))?;
    Ok(())
}

fn write_pager(output: &mut String, page: &str, nav: &NavContext<'_>) -> Result<(), RenderError> {
    writeln!(output, "<nav class=\"pager\">")?;
    if let Some(previous) = nav.previous {
        writeln!(
            output,
            "  <a class=\"prev\" href=\"{}\">&larr; {}</a>",
            escape_html(&relative_url(page, &previous.output_path)),
            escape_html(&previous.title)
        )?;
    }
    if let Some(next) = nav.next {
        writeln!(
            output,
            "  <a class=\"next\" href=\"{}\">{} &rarr;</a>",
            escape_html(&relative_url(page, &next.output_path)),
            escape_html(&next.title)
        )?;
    }
    writeln!(output, "</nav>")?;
    Ok(())
}

/// `../` repeated once per directory level of a page.
fn root_prefix(page: &str) -> String {
    "../".repeat(page.matches('/').count())
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLESHEET: &str = r"
:root {
  --bg-color: #1a1a2e;
  --text-color: #eaeaea;
  --accent-color: #7b68ee;
  --code-bg: #16213e;
  --sidebar-bg: #0f0f23;
  --border-color: #333;
  --broken-color: #e06c75;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
  background-color: var(--bg-color);
  color: var(--text-color);
  line-height: 1.6;
  display: flex;
}

.sidebar {
  width: 280px;
  background-color: var(--sidebar-bg);
  height: 100vh;
  position: fixed;
  overflow-y: auto;
  border-right: 1px solid var(--border-color);
}

.sidebar-header {
  padding: 1.5rem;
  border-bottom: 1px solid var(--border-color);
}

.sidebar-header h2 a {
  color: var(--accent-color);
  font-size: 1.25rem;
  text-decoration: none;
}

.toc {
  list-style: none;
  padding-left: 1rem;
}

.toc-dir > span {
  display: block;
  padding: 0.25rem 0;
  color: #888;
  font-size: 0.9rem;
}

.toc a {
  display: block;
  padding: 0.2rem 0;
  color: var(--text-color);
  text-decoration: none;
  font-size: 0.9rem;
}

.toc a:hover,
.toc a.current {
  color: var(--accent-color);
}

.content {
  margin-left: 280px;
  padding: 2rem 3rem 4rem;
  max-width: 1000px;
  width: 100%;
}

.breadcrumbs {
  font-size: 0.85rem;
  color: #888;
  margin-bottom: 1rem;
}

.breadcrumbs a {
  color: var(--accent-color);
  text-decoration: none;
}

header h1 {
  font-size: 2.25rem;
  color: var(--accent-color);
  margin-bottom: 0.25rem;
}

.source-path {
  color: #888;
  font-size: 0.85rem;
  margin-bottom: 1.5rem;
}

.segment {
  margin: 1rem 0;
}

.prose h1, .prose h2, .prose h3, .prose h4 {
  color: var(--accent-color);
  margin: 1.25rem 0 0.5rem;
}

.prose p, .prose ul, .prose ol, .prose table {
  margin: 0.5rem 0;
}

.prose ul, .prose ol {
  padding-left: 1.5rem;
}

.prose a {
  color: var(--accent-color);
}

.prose a.broken-link {
  color: var(--broken-color);
  text-decoration: line-through;
}

.listing {
  display: flex;
  background: #0d1117;
  border-radius: 4px;
  border-left: 3px solid var(--accent-color);
  overflow-x: auto;
}

.listing pre {
  padding: 0.75rem 1rem;
  font-family: 'Fira Code', 'Consolas', monospace;
  font-size: 0.85rem;
  line-height: 1.5;
}

.listing pre code {
  background: none;
  padding: 0;
}

.gutter {
  text-align: right;
  user-select: none;
  border-right: 1px solid var(--border-color);
}

.gutter a {
  color: #555;
  text-decoration: none;
}

.gutter a:target {
  color: var(--accent-color);
}

details.folded summary {
  cursor: pointer;
  color: #888;
  font-size: 0.85rem;
  padding: 0.25rem 0;
}

.pager {
  display: flex;
  justify-content: space-between;
  margin-top: 3rem;
  padding-top: 1rem;
  border-top: 1px solid var(--border-color);
}

.pager a {
  color: var(--accent-color);
  text-decoration: none;
}

.pager .next {
  margin-left: auto;
}

.contents ul {
  list-style: none;
}

.contents li {
  margin: 0.25rem 0;
}

.contents a {
  color: var(--accent-color);
  text-decoration: none;
}

code {
  background: var(--code-bg);
  padding: 0.15rem 0.3rem;
  border-radius: 3px;
  font-family: 'Fira Code', 'Consolas', monospace;
  font-size: 0.9em;
}

footer {
  position: fixed;
  bottom: 0;
  right: 0;
  padding: 0.5rem 1rem;
  font-size: 0.75rem;
  color: #666;
}

@media (max-width: 768px) {
  .sidebar {
    display: none;
  }
  .content {
    margin-left: 0;
    padding: 1rem;
  }
}
";
