//! Rendering compiled conference queries to SQL.
//!
//! Text comparisons and orderings use the `"C"` collation so results come
//! back in byte order regardless of the database locale.

use crate::rows::CONFERENCE_COLUMNS;
use conference_core::filter::{ConferenceQuery, FilterClause, FilterField, FilterValue};
use sqlx::{Postgres, QueryBuilder};

fn column(field: FilterField) -> &'static str {
    match field {
        FilterField::City => "city COLLATE \"C\"",
        FilterField::Topic => "t.topic COLLATE \"C\"",
        FilterField::Month => "month",
        FilterField::MaxAttendees => "max_attendees",
    }
}

fn order_expression(field: FilterField) -> &'static str {
    match field {
        FilterField::City => "city COLLATE \"C\"",
        // Conferences without topics sort before any topic
        FilterField::Topic => {
            "(SELECT min(t.topic COLLATE \"C\") FROM unnest(topics) AS t(topic)) NULLS FIRST"
        },
        FilterField::Month => "month",
        FilterField::MaxAttendees => "max_attendees",
    }
}

fn push_clause(builder: &mut QueryBuilder<'static, Postgres>, clause: &FilterClause) {
    let op = clause.operator.symbol();

    if clause.field == FilterField::Topic {
        builder.push("EXISTS (SELECT 1 FROM unnest(topics) AS t(topic) WHERE ");
    }

    builder.push(column(clause.field));
    builder.push(format!(" {op} "));
    match &clause.value {
        FilterValue::Text(value) => builder.push_bind(value.clone()),
        FilterValue::Integer(value) => builder.push_bind(*value),
    };

    if clause.field == FilterField::Topic {
        builder.push(")");
    }
}

/// Build the `SELECT` for `query`, clauses bound as parameters.
pub fn render(query: &ConferenceQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {CONFERENCE_COLUMNS} FROM conferences"));

    for (index, clause) in query.clauses().iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        push_clause(&mut builder, clause);
    }

    builder.push(" ORDER BY ");
    if let Some(field) = query.inequality_field() {
        builder.push(order_expression(field));
        builder.push(", ");
    }
    builder.push("name COLLATE \"C\", id");

    builder
}
