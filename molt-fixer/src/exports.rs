//! Export-shape inference.
//!
//! The fixer never executes converted code; a module's public surface is
//! read off its source with line-anchored patterns. This is the authoritative
//! description importers are rewritten against.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static DEFAULT_EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*export\s+default\b").unwrap());

static NAMED_DECL_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*export\s+(?:const|let|var|async\s+function\*?|function\*?|class)\s+([A-Za-z_$][\w$]*)",
    )
    .unwrap()
});

static EXPORT_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*export\s*\{([^}]*)\}").unwrap());

static STAR_REEXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*export\s*\*\s*from\b").unwrap());

/// The inferred public surface of a converted module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportShape {
    /// The module declares a default export (including `export { x as default }`).
    pub has_default: bool,
    /// Names exposed as named exports.
    pub named: BTreeSet<String>,
    /// The module re-exports everything from elsewhere and declares nothing
    /// else; its concrete surface is unknowable from this file alone.
    pub star_reexport_only: bool,
}

/// Inspect a module's source and derive its [`ExportShape`].
pub fn infer_export_shape(source: &str) -> ExportShape {
    let mut shape = ExportShape {
        has_default: DEFAULT_EXPORT.is_match(source),
        ..ExportShape::default()
    };

    for captures in NAMED_DECL_EXPORT.captures_iter(source) {
        shape.named.insert(captures[1].to_owned());
    }

    for captures in EXPORT_LIST.captures_iter(source) {
        for entry in captures[1].split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            // `a as b` exports the alias; a bare `a` exports itself.
            let exported = match entry.split_whitespace().collect::<Vec<_>>().as_slice() {
                [_, "as", alias] => *alias,
                [name] => *name,
                _ => continue,
            };
            if exported == "default" {
                shape.has_default = true;
            } else {
                shape.named.insert(exported.to_owned());
            }
        }
    }

    let has_star = STAR_REEXPORT.is_match(source);
    shape.star_reexport_only = has_star && !shape.has_default && shape.named.is_empty();
    shape
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
