//! Import rewriting against a module's inferred export shape.
//!
//! Rules, applied per statement:
//!
//! - a default binding whose module no longer has a default export becomes
//!   the *stable* namespace form under the same local name: a named
//!   destructure import (with `local.member` usages rewritten to bare
//!   `member`) when every usage is a member read of a known named export,
//!   a star import otherwise; named/star bindings that rode along in the
//!   statement are re-emitted separately;
//! - named bindings are left alone;
//! - a star import whose namespace is only ever read as `ns.member`, with
//!   every member a known named export, becomes a named destructure import
//!   and the `ns.member` usages are rewritten to bare `member`;
//! - a star import with no usages at all is retained for side effects;
//! - side-effect-only imports are never touched.
//!
//! Both rewriting rules emit the same stable form for the same usage
//! pattern, so the output is a fixed point: re-running the fixer over an
//! already-fixed file changes nothing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;

use molt_core::Extension;

use crate::exports::ExportShape;
use crate::imports::{
    is_relative, parse_imports, resolve_relative, ImportParseFailure, ImportStatement,
    NamedBinding,
};

// ---------------------------------------------------------------------------
// Usage analysis
// ---------------------------------------------------------------------------

/// How a local binding is used in the file body (imports excluded).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Usage {
    /// Members read off the binding as `name.member`, in appearance order.
    members: Vec<String>,
    /// Occurrences of the bare name that are not member reads.
    bare_count: usize,
}

fn analyze_usage(body: &str, name: &str) -> Usage {
    let escaped = regex::escape(name);
    let member_re = Regex::new(&format!(r"\b{escaped}\s*\.\s*([A-Za-z_$][\w$]*)"))
        .expect("static pattern with escaped name");
    let bare_re = Regex::new(&format!(r"\b{escaped}\b")).expect("static pattern");

    let mut members = Vec::new();
    for captures in member_re.captures_iter(body) {
        let member = captures[1].to_owned();
        if !members.contains(&member) {
            members.push(member);
        }
    }
    let member_occurrences = member_re.find_iter(body).count();
    let total = bare_re.find_iter(body).count();
    Usage {
        members,
        bare_count: total.saturating_sub(member_occurrences),
    }
}

/// The file body with every import statement blanked out, so binding names
/// inside import clauses do not count as usages.
fn body_without_imports(source: &str, statements: &[ImportStatement]) -> String {
    let mut body = source.to_owned();
    for stmt in statements {
        let blank: String = source[stmt.span.clone()]
            .chars()
            .map(|c| if c == '\n' { '\n' } else { ' ' })
            .collect();
        body.replace_range(stmt.span.clone(), &blank);
    }
    body
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// A planned replacement for one import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Plan {
    /// Replacement text for the statement's span.
    text: String,
    /// A namespace binding whose `ns.member` usages must become bare `member`.
    strip_namespace: Option<String>,
}

fn render_named(specifier: &str, bindings: &[NamedBinding]) -> String {
    let list = bindings
        .iter()
        .map(|b| {
            if b.external == b.local {
                b.local.clone()
            } else {
                format!("{} as {}", b.external, b.local)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("import {{ {list} }} from '{specifier}';")
}

/// The stable import form for a namespace-like local binding of a module
/// with no default export. Destructures when every usage is a member read
/// of a known named export; falls back to a star import otherwise. The
/// second element is the namespace to strip when destructuring.
fn namespace_plan(
    specifier: &str,
    local: &str,
    shape: &ExportShape,
    body: &str,
) -> (String, Option<String>) {
    let usage = analyze_usage(body, local);
    let destructurable = !shape.star_reexport_only
        && !shape.named.is_empty()
        && usage.bare_count == 0
        && !usage.members.is_empty()
        && usage.members.iter().all(|m| shape.named.contains(m));
    if destructurable {
        let bindings: Vec<NamedBinding> = usage
            .members
            .iter()
            .map(|m| NamedBinding {
                external: m.clone(),
                local: m.clone(),
            })
            .collect();
        (render_named(specifier, &bindings), Some(local.to_owned()))
    } else {
        (
            format!("import * as {local} from '{specifier}';"),
            None,
        )
    }
}

fn plan_statement(stmt: &ImportStatement, shape: &ExportShape, body: &str) -> Option<Plan> {
    if stmt.bindings.side_effect_only {
        return None;
    }

    if let Some(default) = &stmt.bindings.default_binding {
        if shape.has_default {
            return None;
        }
        // The single default symbol no longer exists; rebind the module's
        // surface under the original local name in its stable form.
        let (text, strip_namespace) = namespace_plan(&stmt.specifier, default, shape, body);
        let mut parts = vec![text];
        if !stmt.bindings.named.is_empty() {
            parts.push(render_named(&stmt.specifier, &stmt.bindings.named));
        }
        if let Some(star) = &stmt.bindings.star_binding {
            parts.push(format!("import * as {star} from '{}';", stmt.specifier));
        }
        return Some(Plan {
            text: parts.join("\n"),
            strip_namespace,
        });
    }

    if let Some(ns) = &stmt.bindings.star_binding {
        let (text, strip_namespace) = namespace_plan(&stmt.specifier, ns, shape, body);
        // An existing star import is already the stable form unless it can
        // be destructured; no usages at all also retains it.
        strip_namespace.as_ref()?;
        return Some(Plan {
            text,
            strip_namespace,
        });
    }

    // Named-only imports stay as they are.
    None
}

// ---------------------------------------------------------------------------
// Whole-file rewriting
// ---------------------------------------------------------------------------

/// Rewrite `source` against the shapes of the converted modules.
///
/// Returns `Ok(Some(new_source))` when anything changed, `Ok(None)` when the
/// file is already correct, and `Err` when its imports cannot be parsed.
pub fn rewrite_source(
    file: &Path,
    source: &str,
    shapes: &HashMap<PathBuf, ExportShape>,
    target_ext: &Extension,
) -> Result<Option<String>, ImportParseFailure> {
    let statements = parse_imports(source)?;
    if statements.is_empty() {
        return Ok(None);
    }
    let body = body_without_imports(source, &statements);

    let mut plans: Vec<(&ImportStatement, Plan)> = Vec::new();
    for stmt in &statements {
        if !is_relative(&stmt.specifier) {
            continue;
        }
        let Some(resolved) = resolve_relative(file, &stmt.specifier, target_ext) else {
            continue;
        };
        let Some(shape) = shapes.get(&resolved) else {
            continue;
        };
        if let Some(plan) = plan_statement(stmt, shape, &body) {
            plans.push((stmt, plan));
        }
    }
    if plans.is_empty() {
        return Ok(None);
    }

    // Replace spans back-to-front so earlier offsets stay valid.
    let mut result = source.to_owned();
    for (stmt, plan) in plans.iter().rev() {
        result.replace_range(stmt.span.clone(), &plan.text);
    }

    for (_, plan) in &plans {
        if let Some(ns) = &plan.strip_namespace {
            let escaped = regex::escape(ns);
            let member_re = Regex::new(&format!(r"\b{escaped}\s*\.\s*([A-Za-z_$][\w$]*)"))
                .expect("static pattern with escaped name");
            result = member_re.replace_all(&result, "$1").into_owned();
        }
    }

    Ok(Some(result))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
