//! Built-in language table

use super::{BlockComment, LanguageDescriptor};

type BlockSpec = (&'static str, Option<&'static str>, &'static str);

struct Builtin {
    name: &'static str,
    highlighter: &'static str,
    extensions: &'static [&'static str],
    file_names: &'static [&'static str],
    line: &'static [&'static str],
    block: &'static [BlockSpec],
    nested: bool,
    ignore: Option<&'static str>,
    fold: Option<&'static str>,
    prose_only: bool,
}

const C_BLOCK: &[BlockSpec] = &[("/*", Some("*"), "*/")];
const SLASHES: &[&str] = &["//"];
const DOC_SLASHES: &[&str] = &["///", "//"];
const HASH: &[&str] = &["#"];

/// Brace languages: `//}` keeps a closing-brace comment in the code.
const BRACES: Builtin = Builtin {
    name: "",
    highlighter: "",
    extensions: &[],
    file_names: &[],
    line: SLASHES,
    block: C_BLOCK,
    nested: false,
    ignore: Some("}"),
    fold: Some("^"),
    prose_only: false,
};

const SCRIPT: Builtin = Builtin {
    line: HASH,
    block: &[],
    ignore: None,
    ..BRACES
};

const MARKUP: Builtin = Builtin {
    line: &[],
    block: &[("<!--", None, "-->")],
    ignore: None,
    fold: None,
    ..BRACES
};

const PROSE: Builtin = Builtin {
    line: &[],
    block: &[],
    ignore: None,
    fold: None,
    prose_only: true,
    ..BRACES
};

const TABLE: &[Builtin] = &[
    Builtin {
        name: "C",
        highlighter: "c",
        extensions: &["c", "h"],
        ..BRACES
    },
    Builtin {
        name: "C++",
        highlighter: "cpp",
        extensions: &["cpp", "cc", "cxx", "c++", "hpp", "hh", "hxx"],
        line: DOC_SLASHES,
        ..BRACES
    },
    Builtin {
        name: "C#",
        highlighter: "csharp",
        extensions: &["cs"],
        line: DOC_SLASHES,
        ..BRACES
    },
    Builtin {
        name: "Clojure",
        highlighter: "clojure",
        extensions: &["clj", "cljs", "cljc", "edn"],
        line: &[";;;", ";;", ";"],
        ..SCRIPT
    },
    Builtin {
        name: "CoffeeScript",
        highlighter: "coffeescript",
        extensions: &["coffee"],
        file_names: &["Cakefile"],
        block: &[("###", None, "###")],
        ..SCRIPT
    },
    Builtin {
        name: "CSS",
        highlighter: "css",
        extensions: &["css"],
        line: &[],
        ..BRACES
    },
    Builtin {
        name: "Dart",
        highlighter: "dart",
        extensions: &["dart"],
        line: DOC_SLASHES,
        nested: true,
        ..BRACES
    },
    Builtin {
        name: "Dockerfile",
        highlighter: "dockerfile",
        file_names: &["Dockerfile"],
        ..SCRIPT
    },
    Builtin {
        name: "Elixir",
        highlighter: "elixir",
        extensions: &["ex", "exs"],
        ..SCRIPT
    },
    Builtin {
        name: "Erlang",
        highlighter: "erlang",
        extensions: &["erl", "hrl"],
        line: &["%%%", "%%", "%"],
        ..SCRIPT
    },
    Builtin {
        name: "Go",
        highlighter: "go",
        extensions: &["go"],
        ..BRACES
    },
    Builtin {
        name: "Haskell",
        highlighter: "haskell",
        extensions: &["hs"],
        line: &["--"],
        block: &[("{-", None, "-}")],
        nested: true,
        ignore: None,
        ..BRACES
    },
    Builtin {
        name: "HTML",
        highlighter: "html",
        extensions: &["html", "htm"],
        ..MARKUP
    },
    Builtin {
        name: "Java",
        highlighter: "java",
        extensions: &["java"],
        ..BRACES
    },
    Builtin {
        name: "JavaScript",
        highlighter: "javascript",
        extensions: &["js", "mjs", "cjs", "jsx"],
        ..BRACES
    },
    Builtin {
        name: "JSON",
        highlighter: "json",
        extensions: &["json"],
        line: &[],
        block: &[],
        ignore: None,
        fold: None,
        ..BRACES
    },
    Builtin {
        name: "Kotlin",
        highlighter: "kotlin",
        extensions: &["kt", "kts"],
        nested: true,
        ..BRACES
    },
    Builtin {
        name: "Less",
        highlighter: "less",
        extensions: &["less"],
        ..BRACES
    },
    Builtin {
        name: "Lisp",
        highlighter: "common-lisp",
        extensions: &["lisp", "el", "cl"],
        line: &[";;;;", ";;;", ";;", ";"],
        block: &[("#|", None, "|#")],
        nested: true,
        ..SCRIPT
    },
    Builtin {
        name: "Lua",
        highlighter: "lua",
        extensions: &["lua"],
        line: &["--"],
        block: &[("--[[", None, "]]")],
        ..SCRIPT
    },
    Builtin {
        name: "Makefile",
        highlighter: "make",
        extensions: &["mk", "mak"],
        file_names: &["Makefile", "makefile", "GNUmakefile"],
        ..SCRIPT
    },
    Builtin {
        name: "Markdown",
        highlighter: "markdown",
        extensions: &["md", "markdown", "mdown", "mkd"],
        ..PROSE
    },
    Builtin {
        name: "Nim",
        highlighter: "nim",
        extensions: &["nim", "nims"],
        line: &["##", "#"],
        block: &[("#[", None, "]#")],
        nested: true,
        ..SCRIPT
    },
    Builtin {
        name: "Objective-C",
        highlighter: "objective-c",
        extensions: &["m", "mm"],
        ..BRACES
    },
    Builtin {
        name: "OCaml",
        highlighter: "ocaml",
        extensions: &["ml", "mli"],
        line: &[],
        block: &[("(*", Some("*"), "*)")],
        nested: true,
        ignore: None,
        ..BRACES
    },
    Builtin {
        name: "Perl",
        highlighter: "perl",
        extensions: &["pl", "pm"],
        ..SCRIPT
    },
    Builtin {
        name: "PHP",
        highlighter: "php",
        extensions: &["php"],
        line: &["//", "#"],
        ..BRACES
    },
    Builtin {
        name: "Python",
        highlighter: "python",
        extensions: &["py", "pyw", "pyi"],
        ..SCRIPT
    },
    Builtin {
        name: "R",
        highlighter: "r",
        extensions: &["r", "R"],
        ..SCRIPT
    },
    Builtin {
        name: "Ruby",
        highlighter: "ruby",
        extensions: &["rb", "rake", "gemspec"],
        file_names: &["Rakefile", "Gemfile"],
        block: &[("=begin", None, "=end")],
        ..SCRIPT
    },
    Builtin {
        name: "Rust",
        highlighter: "rust",
        extensions: &["rs"],
        line: &["//!", "///", "//"],
        nested: true,
        ..BRACES
    },
    Builtin {
        name: "Scala",
        highlighter: "scala",
        extensions: &["scala", "sc"],
        nested: true,
        ..BRACES
    },
    Builtin {
        name: "SCSS",
        highlighter: "scss",
        extensions: &["scss"],
        ..BRACES
    },
    Builtin {
        name: "Shell",
        highlighter: "bash",
        extensions: &["sh", "bash", "zsh", "ksh"],
        ..SCRIPT
    },
    Builtin {
        name: "SQL",
        highlighter: "sql",
        extensions: &["sql"],
        line: &["--"],
        ignore: None,
        ..BRACES
    },
    Builtin {
        name: "Swift",
        highlighter: "swift",
        extensions: &["swift"],
        line: DOC_SLASHES,
        nested: true,
        ..BRACES
    },
    Builtin {
        name: "Text",
        highlighter: "text",
        extensions: &["txt"],
        ..PROSE
    },
    Builtin {
        name: "TOML",
        highlighter: "toml",
        extensions: &["toml"],
        ..SCRIPT
    },
    Builtin {
        name: "TypeScript",
        highlighter: "typescript",
        extensions: &["ts", "tsx", "mts", "cts"],
        ..BRACES
    },
    Builtin {
        name: "XML",
        highlighter: "xml",
        extensions: &["xml", "svg", "xsd"],
        ..MARKUP
    },
    Builtin {
        name: "YAML",
        highlighter: "yaml",
        extensions: &["yml", "yaml"],
        ..SCRIPT
    },
    Builtin {
        name: "Zig",
        highlighter: "zig",
        extensions: &["zig"],
        line: &["//!", "///", "//"],
        block: &[],
        ..BRACES
    },
];

/// Descriptors for every built-in language.
pub(super) fn descriptors() -> impl Iterator<Item = LanguageDescriptor> {
    TABLE.iter().map(Builtin::to_descriptor)
}

impl Builtin {
    fn to_descriptor(&self) -> LanguageDescriptor {
        let mut descriptor = LanguageDescriptor::new(self.name)
            .with_highlighter(self.highlighter)
            .with_extensions(self.extensions.iter().copied())
            .with_file_names(self.file_names.iter().copied())
            .nested(self.nested)
            .prose_only(self.prose_only);
        for prefix in self.line {
            descriptor = descriptor.with_line_comment(*prefix);
        }
        for (open, middle, close) in self.block {
            let mut block = BlockComment::new(*open, *close);
            if let Some(middle) = middle {
                block = block.with_middle(*middle);
            }
            descriptor = descriptor.with_block_comment(block);
        }
        if let Some(prefix) = self.ignore {
            descriptor = descriptor.with_ignore_prefix(prefix);
        }
        if let Some(prefix) = self.fold {
            descriptor = descriptor.with_fold_prefix(prefix);
        }
        descriptor
    }
}
