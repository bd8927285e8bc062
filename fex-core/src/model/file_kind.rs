//! ``src/model/file_kind.rs``
//! ============================================================================
//! # `FileKind`: Extension-Driven Load Strategy
//!
//! Maps a file extension to how the session loads it (text buffer, image
//! preview, or nothing) and to the syntax definition an external editor
//! widget should use. Both answers come from one lookup table keyed by the
//! normalized extension; supporting a new type means adding a row.

use std::{ffi::OsStr, fmt, path::Path};

use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// How the session treats a selected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    Text,
    Image,
    Unsupported,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &str = match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Unsupported => "unsupported",
        };

        write!(f, "{s}")
    }
}

/// Syntax definition hint for the editor widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Syntax {
    CPlusPlus,
    C,
    Sql,
    Lua,
    Python,
    JavaScript,
    Html,
    Css,
    Java,
    Rust,
    Go,
}

impl Syntax {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CPlusPlus => "C++",
            Self::C => "C",
            Self::Sql => "SQL",
            Self::Lua => "Lua",
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Java => "Java",
            Self::Rust => "Rust",
            Self::Go => "Go",
        }
    }
}

struct TypeRow {
    ext: &'static str,
    kind: FileKind,
    syntax: Option<Syntax>,
}

const fn text(ext: &'static str, syntax: Option<Syntax>) -> TypeRow {
    TypeRow {
        ext,
        kind: FileKind::Text,
        syntax,
    }
}

const fn image(ext: &'static str) -> TypeRow {
    TypeRow {
        ext,
        kind: FileKind::Image,
        syntax: None,
    }
}

const TYPE_TABLE: &[TypeRow] = &[
    text("txt", None),
    text("cpp", Some(Syntax::CPlusPlus)),
    text("h", Some(Syntax::CPlusPlus)),
    text("hpp", Some(Syntax::CPlusPlus)),
    text("c", Some(Syntax::C)),
    text("py", Some(Syntax::Python)),
    text("js", Some(Syntax::JavaScript)),
    text("html", Some(Syntax::Html)),
    text("css", Some(Syntax::Css)),
    text("json", None),
    text("md", None),
    text("xml", None),
    text("yaml", None),
    text("ini", None),
    text("log", None),
    text("bat", None),
    text("sh", None),
    text("php", None),
    text("rb", None),
    text("go", Some(Syntax::Go)),
    text("swift", None),
    text("ts", Some(Syntax::JavaScript)),
    text("tsx", Some(Syntax::JavaScript)),
    text("vue", None),
    text("sql", Some(Syntax::Sql)),
    text("pl", None),
    text("lua", Some(Syntax::Lua)),
    text("r", None),
    text("dart", None),
    text("scala", None),
    text("rs", Some(Syntax::Rust)),
    text("java", Some(Syntax::Java)),
    text("kt", None),
    image("jpg"),
    image("png"),
    image("bmp"),
];

static TYPES: Lazy<AHashMap<&'static str, &'static TypeRow>> = Lazy::new(|| {
    TYPE_TABLE
        .iter()
        .map(|row: &'static TypeRow| (row.ext, row))
        .collect()
});

fn lookup(extension: &str) -> Option<&'static TypeRow> {
    let normalized: String = extension.trim_start_matches('.').to_ascii_lowercase();

    TYPES.get(normalized.as_str()).copied()
}

/// Classifies an extension, with or without the leading dot, ignoring case.
#[must_use]
pub fn classify(extension: &str) -> FileKind {
    lookup(extension).map_or(FileKind::Unsupported, |row| row.kind)
}

/// Classifies a path by its extension; no extension is `Unsupported`.
#[must_use]
pub fn classify_path(path: &Path) -> FileKind {
    path.extension()
        .and_then(OsStr::to_str)
        .map_or(FileKind::Unsupported, classify)
}

/// Syntax definition for a text extension; text types without a dedicated
/// definition use C++. Non-text extensions have none.
#[must_use]
pub fn syntax_for(extension: &str) -> Option<Syntax> {
    lookup(extension)
        .filter(|row| row.kind == FileKind::Text)
        .map(|row| row.syntax.unwrap_or(Syntax::CPlusPlus))
}

/// Extensions known for a given kind, in table order.
pub fn extensions_of(kind: FileKind) -> impl Iterator<Item = &'static str> {
    TYPE_TABLE
        .iter()
        .filter(move |row| row.kind == kind)
        .map(|row| row.ext)
}
