//! Import statement parsing and specifier resolution.
//!
//! Statements are matched with a single anchored pattern covering every ES
//! import form the fixer understands. An `import` line the pattern does not
//! cover is a parse failure for that file, reported by [`parse_imports`] so
//! the caller can skip the file with a warning instead of corrupting it.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use molt_core::Extension;

static IMPORT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?mx)
        ^[ \t]*import\s+
        (?:
            ['"](?P<side>[^'"]+)['"]
            |
            (?:(?P<default>[A-Za-z_$][\w$]*)\s*,\s*)?
            (?:
                \*\s*as\s+(?P<star>[A-Za-z_$][\w$]*)
                |
                \{(?P<named>[^}]*)\}
                |
                (?P<default_only>[A-Za-z_$][\w$]*)
            )
            \s*from\s*['"](?P<spec>[^'"]+)['"]
        )
        [ \t]*;?
        "#,
    )
    .unwrap()
});

static IMPORT_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*import\b").unwrap());

// ---------------------------------------------------------------------------
// Parsed statements
// ---------------------------------------------------------------------------

/// One named binding: the exported name and the local alias it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBinding {
    pub external: String,
    pub local: String,
}

/// The bindings one import statement introduces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportBindings {
    pub default_binding: Option<String>,
    pub named: Vec<NamedBinding>,
    pub star_binding: Option<String>,
    /// `import './x';` — no bindings, kept for side effects.
    pub side_effect_only: bool,
}

/// A parsed import statement and where it sits in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub specifier: String,
    pub bindings: ImportBindings,
    /// Byte range of the full statement in the source.
    pub span: Range<usize>,
}

/// Why a file's imports could not be analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportParseFailure {
    /// The offending line, for the warning message.
    pub line: String,
}

/// Parse every import statement in `source`.
///
/// Returns `Err` when the file contains an `import` line the statement
/// pattern does not cover; the caller skips the whole file in that case.
pub fn parse_imports(source: &str) -> Result<Vec<ImportStatement>, ImportParseFailure> {
    let mut statements = Vec::new();
    for captures in IMPORT_STATEMENT.captures_iter(source) {
        let whole = captures.get(0).expect("match has group 0");

        if let Some(side) = captures.name("side") {
            statements.push(ImportStatement {
                specifier: side.as_str().to_owned(),
                bindings: ImportBindings {
                    side_effect_only: true,
                    ..ImportBindings::default()
                },
                span: whole.range(),
            });
            continue;
        }

        let spec = captures.name("spec").expect("non-side import has spec");
        let mut bindings = ImportBindings {
            default_binding: captures
                .name("default")
                .or_else(|| captures.name("default_only"))
                .map(|m| m.as_str().to_owned()),
            star_binding: captures.name("star").map(|m| m.as_str().to_owned()),
            ..ImportBindings::default()
        };
        if let Some(named) = captures.name("named") {
            bindings.named = parse_named_list(named.as_str());
        }
        statements.push(ImportStatement {
            specifier: spec.as_str().to_owned(),
            bindings,
            span: whole.range(),
        });
    }

    // Any `import` keyword outside a recognised statement means this file is
    // beyond what the pattern can safely rewrite.
    for keyword in IMPORT_KEYWORD.find_iter(source) {
        let covered = statements
            .iter()
            .any(|s| s.span.start <= keyword.start() && keyword.end() <= s.span.end);
        if !covered {
            let line = source[keyword.start()..]
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .to_owned();
            return Err(ImportParseFailure { line });
        }
    }

    Ok(statements)
}

fn parse_named_list(raw: &str) -> Vec<NamedBinding> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            match entry.split_whitespace().collect::<Vec<_>>().as_slice() {
                [name] => Some(NamedBinding {
                    external: (*name).to_owned(),
                    local: (*name).to_owned(),
                }),
                [external, "as", local] => Some(NamedBinding {
                    external: (*external).to_owned(),
                    local: (*local).to_owned(),
                }),
                _ => None,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Specifier resolution
// ---------------------------------------------------------------------------

/// Whether a specifier is intra-repository (`./x`, `../x`).
///
/// Package-style specifiers are out of scope and never rewritten.
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Resolve a relative specifier against the importing file's directory.
///
/// Tries the specifier verbatim, with the target extension appended, and as
/// a directory index file. Returns the canonical path of the first candidate
/// that exists.
pub fn resolve_relative(
    importer: &Path,
    specifier: &str,
    target_ext: &Extension,
) -> Option<PathBuf> {
    let dir = importer.parent()?;
    let base = dir.join(specifier);
    let candidates = [
        base.clone(),
        PathBuf::from(format!("{}.{}", base.display(), target_ext.0)),
        base.join(format!("index.{}", target_ext.0)),
    ];
    candidates
        .iter()
        .filter(|c| c.is_file())
        .find_map(|c| c.canonicalize().ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
