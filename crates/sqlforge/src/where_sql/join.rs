//! Logical joining and negation of compiled fragments.

use crate::condition::SqlExpr;
use crate::error::QueryResult;
use crate::expr::{Composition, CompositionGroup};
use crate::operators::Op;

/// Join fragments with `AND` or `OR`.
///
/// Empty fragments are dropped, a single fragment is returned as is, and a
/// fragment that itself contains a top-level `AND` / `OR` is parenthesized.
pub(super) fn join_with_logical_operator(
    parts: Vec<Composition>,
    operator: Op,
) -> QueryResult<Composition> {
    let mut parts: Vec<Composition> = parts.into_iter().filter(|p| !p.is_empty()).collect();
    if parts.len() <= 1 {
        return Ok(parts.pop().unwrap_or_default());
    }

    let separator = if operator == Op::Or { " OR " } else { " AND " };
    let mut group = CompositionGroup::from_pieces(parts.into_iter().map(|part| {
        if has_logical_operator(&part) {
            parenthesize(part)
        } else {
            part
        }
    }));
    group.space(Composition::text(separator));
    group.to_composition()
}

/// `NOT (...)`. Negating nothing yields `0 = 1`.
///
/// The operand is always wrapped: its text may hold quoted parentheses whose
/// escaping depends on the dialect, so it is never scanned.
pub(super) fn wrap_with_not(sql: Composition) -> Composition {
    if sql.is_empty() {
        return Composition::text("0 = 1");
    }
    let mut out = Composition::text("NOT (");
    out.add(sql).add(")");
    out
}

/// Parenthesize a nested comparison used as an operand:
/// `"flag" = (lower("name") IS NULL)`.
pub(super) fn wrap_ambiguous(operand: &SqlExpr, sql: Composition) -> Composition {
    if matches!(operand, SqlExpr::Where { .. }) && sql.to_string().contains(' ') {
        parenthesize(sql)
    } else {
        sql
    }
}

fn parenthesize(sql: Composition) -> Composition {
    let mut out = Composition::text("(");
    out.add(sql).add(")");
    out
}

/// Slots display as `?`, so only compiled text is inspected.
fn has_logical_operator(sql: &Composition) -> bool {
    let text = sql.to_string().to_ascii_lowercase();
    text.contains(" and ") || text.contains(" or ")
}
