use super::{Template, define_template, push_clause, require};
use crate::error::QueryResult;
use crate::expr::Composition;

define_template! {
    /// `SELECT <attributes> FROM <from> <join> WHERE .. GROUP BY .. HAVING .. ORDER BY .. <page> <lock>;`
    SelectTemplate, "SELECT" {
        /// Selected columns; `*` when empty.
        attributes => "attributes",
        from => "from",
        /// Complete join clauses, including their `JOIN` keywords.
        join => "join",
        where_ => "where",
        group => "group",
        having => "having",
        order => "order",
        /// Pagination as produced by the dialect.
        page => "page",
        /// Row locking as produced by the dialect.
        lock => "lock",
    }
}

impl SelectTemplate {
    fn assemble(&self) -> QueryResult<Composition> {
        require(&self.from, "FROM clause", Self::KIND)?;

        let mut out = Composition::text("SELECT ");
        if self.attributes.is_empty() {
            out.add("*");
        } else {
            out.add(&self.attributes);
        }
        push_clause(&mut out, "FROM", &self.from);
        push_clause(&mut out, "", &self.join);
        push_clause(&mut out, "WHERE", &self.where_);
        push_clause(&mut out, "GROUP BY", &self.group);
        push_clause(&mut out, "HAVING", &self.having);
        push_clause(&mut out, "ORDER BY", &self.order);
        push_clause(&mut out, "", &self.page);
        push_clause(&mut out, "", &self.lock);
        out.add(";");
        Ok(out)
    }
}
