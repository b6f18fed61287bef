//! Search index generation
//!
//! This module builds a JSON search index and the JavaScript that searches
//! it in the browser. Every file gets one entry, and so does every heading
//! in its prose.

use serde::Serialize;

use crate::project::Project;

/// What a search entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Heading,
}

/// A single entry in the search index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    /// File title or heading text
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "k")]
    pub kind: EntryKind,
    /// Source path of the file
    #[serde(rename = "p")]
    pub path: String,
    /// Language for files, the file title for headings
    #[serde(rename = "d")]
    pub description: String,
    /// Link relative to the site root
    #[serde(rename = "l")]
    pub link: String,
}

/// Collect search entries in TOC order.
pub fn build_index(project: &Project) -> Vec<SearchEntry> {
    let mut entries = Vec::new();
    for unit in project.units() {
        entries.push(SearchEntry {
            name: unit.title.clone(),
            kind: EntryKind::File,
            path: unit.source_path.clone(),
            description: unit.language.name.clone(),
            link: unit.output_path.clone(),
        });
        for heading in &unit.headings {
            entries.push(SearchEntry {
                name: heading.text.clone(),
                kind: EntryKind::Heading,
                path: unit.source_path.clone(),
                description: unit.title.clone(),
                link: format!("{}#{}", unit.output_path, heading.anchor),
            });
        }
    }
    entries
}

/// Serialize the index as compact JSON.
pub fn to_json(entries: &[SearchEntry]) -> serde_json::Result<String> {
    serde_json::to_string(entries)
}

/// Browser side of search: loads the index once, ranks entries on each
/// keystroke and lets arrow keys move through the hits.
pub fn search_js() -> &'static str {
    r#"// Folio documentation search
(function() {
    'use strict';

    const MAX_HITS = 20;
    const root = document.body.dataset.root || '';
    let entries = null;
    let selected = -1;

    function load() {
        if (entries !== null) return Promise.resolve(entries);
        return fetch(root + 'search-index.json')
            .then(response => response.json())
            .then(data => (entries = data))
            .catch(err => {
                console.warn('folio: no search index', err);
                return (entries = []);
            });
    }

    // Lower is better; Infinity when a word is missing.
    function wordScore(word, text) {
        const at = text.indexOf(word);
        if (at < 0) return Infinity;
        if (at === 0) return text.length === word.length ? 0 : 1;
        return /[\s\/._-]/.test(text[at - 1]) ? 2 : 3;
    }

    function rank(words, entry) {
        const name = entry.n.toLowerCase();
        const path = entry.p.toLowerCase();
        let total = entry.k === 'file' ? 0 : 0.5;
        for (const word of words) {
            const best = Math.min(wordScore(word, name), wordScore(word, path) + 4);
            if (best === Infinity) return Infinity;
            total += best;
        }
        return total;
    }

    function escape(text) {
        const span = document.createElement('span');
        span.textContent = text;
        return span.innerHTML;
    }

    function render(list, hits) {
        selected = -1;
        if (hits.length === 0) {
            list.innerHTML = '<li class="miss">Nothing matches</li>';
        } else {
            list.innerHTML = hits.map(hit =>
                '<li><a href="' + root + hit.l + '">' +
                '<span class="hit-name">' + escape(hit.n) + '</span>' +
                '<span class="hit-kind ' + hit.k + '">' + hit.k + '</span>' +
                '<span class="hit-where">' + escape(hit.k === 'file' ? hit.p : hit.d) + '</span>' +
                '</a></li>').join('');
        }
        list.hidden = false;
    }

    function query(input, list) {
        const words = input.value.toLowerCase().split(/\s+/).filter(Boolean);
        if (words.length === 0) {
            list.hidden = true;
            return;
        }
        load().then(all => {
            const hits = all
                .map(entry => ({ entry, score: rank(words, entry) }))
                .filter(hit => hit.score !== Infinity)
                .sort((a, b) => a.score - b.score)
                .slice(0, MAX_HITS)
                .map(hit => hit.entry);
            render(list, hits);
        });
    }

    function move(list, step) {
        const links = list.querySelectorAll('a');
        if (links.length === 0) return;
        selected = (selected + step + links.length) % links.length;
        links.forEach((link, i) => link.classList.toggle('selected', i === selected));
        links[selected].scrollIntoView({ block: 'nearest' });
    }

    function init() {
        const input = document.getElementById('search-input');
        const list = document.getElementById('search-results');
        if (!input || !list) return;

        let pending;
        input.addEventListener('input', () => {
            clearTimeout(pending);
            pending = setTimeout(() => query(input, list), 100);
        });
        input.addEventListener('focus', load, { once: true });
        input.addEventListener('keydown', event => {
            switch (event.key) {
                case 'ArrowDown': move(list, 1); break;
                case 'ArrowUp': move(list, -1); break;
                case 'Enter': {
                    const link = list.querySelectorAll('a')[Math.max(selected, 0)];
                    if (link) window.location.href = link.href;
                    break;
                }
                case 'Escape':
                    input.value = '';
                    list.hidden = true;
                    input.blur();
                    break;
                default: return;
            }
            event.preventDefault();
        });
        document.addEventListener('keydown', event => {
            if (event.key === '/' && document.activeElement !== input) {
                event.preventDefault();
                input.focus();
            }
        });
        document.addEventListener('click', event => {
            if (!event.target.closest('.finder')) list.hidden = true;
        });
    }

    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', init);
    } else {
        init();
    }
})();
"#
}

/// Styles for the sidebar search box and its hit list.
pub fn search_css() -> &'static str {
    r"
.finder {
  position: relative;
  padding: 0.75rem 1rem;
  border-bottom: 1px solid var(--border-color);
}

#search-input {
  width: 100%;
  padding: 0.4rem 0.6rem;
  color: var(--text-color);
  background: var(--code-bg);
  border: 1px solid var(--border-color);
  border-radius: 4px;
  font-size: 0.85rem;
}

#search-input:focus {
  outline: 1px solid var(--accent-color);
}

#search-results {
  position: absolute;
  left: 1rem;
  z-index: 10;
  width: 26rem;
  max-height: 60vh;
  overflow-y: auto;
  list-style: none;
  background: var(--sidebar-bg);
  border: 1px solid var(--border-color);
  border-radius: 4px;
}

#search-results a {
  display: grid;
  grid-template-columns: 1fr auto;
  padding: 0.4rem 0.6rem;
  color: var(--text-color);
  text-decoration: none;
}

#search-results a:hover,
#search-results a.selected {
  background: var(--code-bg);
}

.hit-name {
  color: var(--accent-color);
}

.hit-kind {
  font-size: 0.7rem;
  text-transform: uppercase;
  color: #888;
}

.hit-kind.heading {
  color: #7ec876;
}

.hit-where {
  grid-column: 1 / -1;
  font-size: 0.75rem;
  color: #888;
}

#search-results .miss {
  padding: 0.6rem;
  color: #888;
}
"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageDescriptor;
    use crate::unit::{FileUnit, OutputMapper};
    use std::sync::Arc;

    fn project() -> Project {
        let rust = Arc::new(LanguageDescriptor::new("Rust").with_line_comment("//"));
        let mapper = OutputMapper::new();
        Project::build(
            "test",
            vec![
                FileUnit::build(
                    "src/math.rs",
                    "// # Math\n// ## Adding \"numbers\"\nfn add() {}",
                    Arc::clone(&rust),
                    &mapper,
                ),
                FileUnit::build("build.rs", "fn main() {}", rust, &mapper),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_entries_for_files_and_headings() {
        let entries = build_index(&project());
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[0].name, "Math");
        assert_eq!(entries[0].link, "src/math.rs.html");
        assert_eq!(entries[0].description, "Rust");

        assert_eq!(entries[2].kind, EntryKind::Heading);
        assert_eq!(entries[2].name, "Adding \"numbers\"");
        assert_eq!(entries[2].link, "src/math.rs.html#adding-numbers");
        assert_eq!(entries[2].description, "Math");

        assert_eq!(entries[3].name, "build.rs");
    }

    #[test]
    fn test_json_uses_short_keys_and_escapes() {
        let json = to_json(&build_index(&project())).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains(r#""n":"Math","k":"file","p":"src/math.rs""#));
        assert!(json.contains(r#""n":"Adding \"numbers\"""#));
        assert!(json.contains(r#""k":"heading""#));
    }
}
