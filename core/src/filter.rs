//! Conference query filter compiler.
//!
//! Turns caller-supplied `(field, operator, value)` clauses into a validated
//! [`ConferenceQuery`]. Validation happens entirely up front:
//!
//! - field and operator names come from a fixed allow-list
//! - numeric fields coerce their value to an integer
//! - at most one distinct field may use a non-equality operator
//!
//! The compiled query knows its ordering (inequality field first, then name)
//! and can evaluate itself against a [`Conference`], which is what the
//! in-memory store uses. The PostgreSQL store renders the same query to SQL.

use crate::error::{ConferenceError, Result};
use crate::forms::ConferenceQueryForm;
use crate::types::Conference;
use std::cmp::Ordering;

/// A filterable conference field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterField {
    /// `CITY`
    City,
    /// `TOPIC` (matches when any topic satisfies the clause)
    Topic,
    /// `MONTH`
    Month,
    /// `MAX_ATTENDEES`
    MaxAttendees,
}

impl FilterField {
    /// Parse a wire name.
    ///
    /// # Errors
    ///
    /// Returns [`ConferenceError::InvalidFilter`] for names outside the allow-list.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "CITY" => Ok(Self::City),
            "TOPIC" => Ok(Self::Topic),
            "MONTH" => Ok(Self::Month),
            "MAX_ATTENDEES" => Ok(Self::MaxAttendees),
            _ => Err(ConferenceError::invalid_filter(
                "Filter contains invalid field or operator.",
            )),
        }
    }

    /// Entity attribute the field maps to.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Topic => "topics",
            Self::Month => "month",
            Self::MaxAttendees => "maxAttendees",
        }
    }

    /// Whether values for this field are integers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Month | Self::MaxAttendees)
    }
}

/// A comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `EQ` (`=`)
    Eq,
    /// `GT` (`>`)
    Gt,
    /// `GTEQ` (`>=`)
    Gteq,
    /// `LT` (`<`)
    Lt,
    /// `LTEQ` (`<=`)
    Lteq,
    /// `NE` (`!=`)
    Ne,
}

impl FilterOperator {
    /// Parse a wire name.
    ///
    /// # Errors
    ///
    /// Returns [`ConferenceError::InvalidFilter`] for names outside the allow-list.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "EQ" => Ok(Self::Eq),
            "GT" => Ok(Self::Gt),
            "GTEQ" => Ok(Self::Gteq),
            "LT" => Ok(Self::Lt),
            "LTEQ" => Ok(Self::Lteq),
            "NE" => Ok(Self::Ne),
            _ => Err(ConferenceError::invalid_filter(
                "Filter contains invalid field or operator.",
            )),
        }
    }

    /// SQL-style symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gteq => ">=",
            Self::Lt => "<",
            Self::Lteq => "<=",
            Self::Ne => "!=",
        }
    }

    /// Everything except `EQ` counts toward the single-inequality-field rule.
    #[must_use]
    pub const fn is_inequality(self) -> bool {
        !matches!(self, Self::Eq)
    }

    /// Evaluate `left <op> right`.
    #[must_use]
    pub fn test<T: PartialOrd + ?Sized>(self, left: &T, right: &T) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Gt => left > right,
            Self::Gteq => left >= right,
            Self::Lt => left < right,
            Self::Lteq => left <= right,
            Self::Ne => left != right,
        }
    }
}

/// A typed comparison value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterValue {
    /// For `CITY` and `TOPIC`
    Text(String),
    /// For `MONTH` and `MAX_ATTENDEES`
    Integer(i32),
}

/// One validated clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterClause {
    /// Field
    pub field: FilterField,
    /// Operator
    pub operator: FilterOperator,
    /// Value, already coerced to the field's type
    pub value: FilterValue,
}

impl FilterClause {
    /// Whether `conference` satisfies this clause.
    #[must_use]
    pub fn matches(&self, conference: &Conference) -> bool {
        let op = self.operator;
        match (&self.value, self.field) {
            (FilterValue::Text(value), FilterField::City) => op.test(conference.city.as_str(), value.as_str()),
            (FilterValue::Text(value), FilterField::Topic) => conference
                .topics
                .iter()
                .any(|topic| op.test(topic.as_str(), value.as_str())),
            (FilterValue::Integer(value), FilterField::Month) => op.test(&conference.month, value),
            (FilterValue::Integer(value), FilterField::MaxAttendees) => {
                op.test(&conference.max_attendees, value)
            }
            // compile() never pairs a field with the other value type
            _ => false,
        }
    }
}

/// A compiled, validated conference query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConferenceQuery {
    clauses: Vec<FilterClause>,
    inequality_field: Option<FilterField>,
}

impl ConferenceQuery {
    /// Query without filters: every conference, ordered by name.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            clauses: Vec::new(),
            inequality_field: None,
        }
    }

    /// The clauses, in caller order.
    #[must_use]
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// The one field carrying non-equality comparisons, if any.
    #[must_use]
    pub const fn inequality_field(&self) -> Option<FilterField> {
        self.inequality_field
    }

    /// Whether `conference` satisfies every clause.
    #[must_use]
    pub fn matches(&self, conference: &Conference) -> bool {
        self.clauses.iter().all(|clause| clause.matches(conference))
    }

    /// Result ordering: by the inequality field (if any), then by name.
    #[must_use]
    pub fn compare(&self, a: &Conference, b: &Conference) -> Ordering {
        let primary = match self.inequality_field {
            Some(FilterField::City) => a.city.cmp(&b.city),
            Some(FilterField::Topic) => a.topics.iter().min().cmp(&b.topics.iter().min()),
            Some(FilterField::Month) => a.month.cmp(&b.month),
            Some(FilterField::MaxAttendees) => a.max_attendees.cmp(&b.max_attendees),
            None => Ordering::Equal,
        };
        primary.then_with(|| a.name.cmp(&b.name))
    }
}

/// Compile caller-supplied clauses.
///
/// # Errors
///
/// - [`ConferenceError::InvalidFilter`] for an unknown field or operator, or
///   when a second distinct field uses a non-equality operator
/// - [`ConferenceError::BadRequest`] when a numeric field's value is not an
///   integer
pub fn compile(filters: &[ConferenceQueryForm]) -> Result<ConferenceQuery> {
    let mut query = ConferenceQuery::all();

    for filter in filters {
        let field = FilterField::parse(&filter.field)?;
        let operator = FilterOperator::parse(&filter.operator)?;

        let value = if field.is_numeric() {
            let number = filter.value.trim().parse::<i32>().map_err(|_| {
                ConferenceError::bad_request(format!(
                    "Filter value for {} must be an integer, got '{}'",
                    filter.field, filter.value
                ))
            })?;
            FilterValue::Integer(number)
        } else {
            FilterValue::Text(filter.value.clone())
        };

        if operator.is_inequality() {
            match query.inequality_field {
                Some(existing) if existing != field => {
                    return Err(ConferenceError::invalid_filter(
                        "Inequality filter is allowed on only one field.",
                    ));
                }
                _ => query.inequality_field = Some(field),
            }
        }

        query.clauses.push(FilterClause {
            field,
            operator,
            value,
        });
    }

    Ok(query)
}
