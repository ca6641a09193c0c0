//! Typed condition trees
//!
//! A [`Condition`] is the compiled form of a filter: a plain data tree that an
//! in-memory pipeline evaluates directly and a query source can translate into
//! its own native query language.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

use crate::core::entity::Entity;
use crate::core::field::FieldValue;

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

/// String match operators (case-insensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOp {
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
}

/// Boolean condition over one entity instance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Always,
    Never,
    IsNull {
        field: String,
    },
    IsNotNull {
        field: String,
    },
    Compare {
        field: String,
        op: CompareOp,
        value: FieldValue,
    },
    In {
        field: String,
        values: Vec<FieldValue>,
        negated: bool,
    },
    /// At least one (or, negated, no) related id is in `ids`
    AnyOf {
        field: String,
        ids: Vec<i64>,
        negated: bool,
    },
    Text {
        field: String,
        op: TextOp,
        needle: String,
    },
    SameDate {
        field: String,
        date: NaiveDate,
    },
    /// Case-insensitive substring match on one language of a localized field
    LocalizedContains {
        field: String,
        lang: String,
        needle: String,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    /// Conjunction, flattening nested `And`s and dropping `Always`
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Condition {
        let mut parts = Vec::new();
        for condition in conditions {
            match condition {
                Condition::Always => {}
                Condition::Never => return Condition::Never,
                Condition::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Condition::Always,
            1 => parts.remove(0),
            _ => Condition::And(parts),
        }
    }

    /// Disjunction, flattening nested `Or`s and dropping `Never`
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Condition {
        let mut parts = Vec::new();
        for condition in conditions {
            match condition {
                Condition::Never => {}
                Condition::Always => return Condition::Always,
                Condition::Or(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Condition::Never,
            1 => parts.remove(0),
            _ => Condition::Or(parts),
        }
    }

    /// Evaluate against an entity, reading fields through its schema
    pub fn evaluate<T: Entity>(&self, entity: &T) -> bool {
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::IsNull { field } => field_value(entity, field).is_null(),
            Condition::IsNotNull { field } => !field_value(entity, field).is_null(),
            Condition::Compare { field, op, value } => {
                let current = field_value(entity, field);
                match op {
                    CompareOp::Eq => current.matches(value),
                    CompareOp::Ne => !current.matches(value),
                    CompareOp::Gt => current.compare(value) == Some(Ordering::Greater),
                    CompareOp::Lt => current.compare(value) == Some(Ordering::Less),
                    CompareOp::Gte => matches!(
                        current.compare(value),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    CompareOp::Lte => matches!(
                        current.compare(value),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                }
            }
            Condition::In {
                field,
                values,
                negated,
            } => {
                let current = field_value(entity, field);
                values.iter().any(|v| current.matches(v)) != *negated
            }
            Condition::AnyOf {
                field,
                ids,
                negated,
            } => {
                let hit = match field_value(entity, field) {
                    FieldValue::Ids(related) => related.iter().any(|id| ids.contains(id)),
                    _ => false,
                };
                hit != *negated
            }
            Condition::Text { field, op, needle } => match field_value(entity, field) {
                FieldValue::String(s) => {
                    let haystack = s.to_lowercase();
                    let needle = needle.to_lowercase();
                    match op {
                        TextOp::Contains => haystack.contains(&needle),
                        TextOp::NotContains => !haystack.contains(&needle),
                        TextOp::StartsWith => haystack.starts_with(&needle),
                        TextOp::EndsWith => haystack.ends_with(&needle),
                    }
                }
                _ => false,
            },
            Condition::SameDate { field, date } => {
                field_value(entity, field).date_part() == Some(*date)
            }
            Condition::LocalizedContains {
                field,
                lang,
                needle,
            } => match field_value(entity, field) {
                FieldValue::Localized(text) => text.contains(needle, Some(lang)),
                _ => false,
            },
            Condition::And(parts) => parts.iter().all(|c| c.evaluate(entity)),
            Condition::Or(parts) => parts.iter().any(|c| c.evaluate(entity)),
        }
    }
}

fn field_value<T: Entity>(entity: &T, field: &str) -> FieldValue {
    T::schema()
        .get(field)
        .map(|descriptor| descriptor.value(entity))
        .unwrap_or(FieldValue::Null)
}

/// A compiled condition, tagged with the field it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Originating field; `None` for the free-text search predicate
    pub field: Option<String>,
    pub condition: Condition,
}

impl Predicate {
    pub fn on(field: impl Into<String>, condition: Condition) -> Self {
        Self {
            field: Some(field.into()),
            condition,
        }
    }

    pub fn search(condition: Condition) -> Self {
        Self {
            field: None,
            condition,
        }
    }

    pub fn evaluate<T: Entity>(&self, entity: &T) -> bool {
        self.condition.evaluate(entity)
    }
}
