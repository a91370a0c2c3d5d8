use super::{Template, define_template, push_clause, require};
use crate::error::QueryResult;
use crate::expr::Composition;

define_template! {
    /// `<pre_query>INSERT <flags> INTO <table> (<attributes>) <output> <values> <on_conflict> <returning><post_query>;`
    InsertTemplate, "INSERT" {
        /// Emitted verbatim before the statement.
        pre_query => "pre_query",
        flags => "flags",
        table => "table",
        /// Column list, without the surrounding parentheses.
        attributes => "attributes",
        output => "output",
        /// `VALUES (...)` tuples or a complete sub-SELECT.
        values => "values",
        on_conflict => "on_conflict",
        returning => "returning",
        /// Emitted verbatim after the statement.
        post_query => "post_query",
    }
}

impl InsertTemplate {
    fn assemble(&self) -> QueryResult<Composition> {
        require(&self.table, "table", Self::KIND)?;
        require(&self.values, "values", Self::KIND)?;

        let mut out = self.pre_query.clone();
        out.add("INSERT");
        push_clause(&mut out, "", &self.flags);
        push_clause(&mut out, "INTO", &self.table);
        if !self.attributes.is_empty() {
            out.add(" (").add(&self.attributes).add(")");
        }
        push_clause(&mut out, "", &self.output);
        push_clause(&mut out, "", &self.values);
        push_clause(&mut out, "", &self.on_conflict);
        push_clause(&mut out, "", &self.returning);
        out.add(&self.post_query).add(";");
        Ok(out)
    }
}
