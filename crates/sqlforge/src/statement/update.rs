use super::{Template, define_template, push_clause, require};
use crate::error::QueryResult;
use crate::expr::Composition;

define_template! {
    /// `<pre_query>UPDATE <flags> <table> SET <values> <output> WHERE <where> <limit> <returning><post_query>;`
    UpdateTemplate, "UPDATE" {
        pre_query => "pre_query",
        flags => "flags",
        table => "table",
        /// Comma separated `column = value` assignments.
        values => "values",
        output => "output",
        where_ => "where",
        limit => "limit",
        returning => "returning",
        post_query => "post_query",
    }
}

impl UpdateTemplate {
    fn assemble(&self) -> QueryResult<Composition> {
        require(&self.table, "table", Self::KIND)?;
        require(&self.values, "values", Self::KIND)?;

        let mut out = self.pre_query.clone();
        out.add("UPDATE");
        push_clause(&mut out, "", &self.flags);
        push_clause(&mut out, "", &self.table);
        push_clause(&mut out, "SET", &self.values);
        push_clause(&mut out, "", &self.output);
        push_clause(&mut out, "WHERE", &self.where_);
        push_clause(&mut out, "", &self.limit);
        push_clause(&mut out, "", &self.returning);
        out.add(&self.post_query).add(";");
        Ok(out)
    }
}
