//! Predicate builder: one (field, operator, value) triple → one [`Predicate`]

use tracing::warn;

use crate::core::error::{CrudResult, FilterError};
use crate::core::field::{FieldDescriptor, FieldKind};
use crate::filter::condition::{CompareOp, Condition, Predicate, TextOp};
use crate::filter::literal::{coerce, parse_date_literal, split_list};
use crate::filter::operator::{Operator, OperatorFamily};

/// Compiles single filter clauses against a field descriptor.
///
/// Comparison literals that cannot be converted to the field's type are
/// ignored (the clause compiles to [`Condition::Always`]) unless
/// `strict_literals` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateBuilder {
    pub strict_literals: bool,
}

impl PredicateBuilder {
    pub fn new(strict_literals: bool) -> Self {
        Self { strict_literals }
    }

    pub fn build<T>(
        &self,
        field: &FieldDescriptor<T>,
        operator: Operator,
        raw: Option<&str>,
    ) -> CrudResult<Predicate> {
        if field.kind() == FieldKind::Localized {
            return Err(FilterError::LocalizedField {
                field: field.name.to_string(),
            }
            .into());
        }

        let condition = match operator.family() {
            OperatorFamily::Comparison => self.comparison(field, operator, raw)?,
            OperatorFamily::Membership => membership(field, operator, raw)?,
            OperatorFamily::CollectionMembership => collection_membership(field, operator, raw)?,
            OperatorFamily::Text => text(field, operator, raw)?,
            OperatorFamily::DateRange => date_range(field, operator, raw)?,
        };

        Ok(Predicate::on(field.name, condition))
    }

    fn comparison<T>(
        &self,
        field: &FieldDescriptor<T>,
        operator: Operator,
        raw: Option<&str>,
    ) -> CrudResult<Condition> {
        let kind = field.kind();
        if !kind.is_scalar() || (operator.is_range() && !kind.is_ordered()) {
            return Err(unsupported(field, operator));
        }

        let name = field.name.to_string();
        let Some(raw) = raw else {
            return match operator {
                Operator::Eq if field.field_type.nullable => Ok(Condition::IsNull { field: name }),
                Operator::Ne if field.field_type.nullable => {
                    Ok(Condition::IsNotNull { field: name })
                }
                // a non-nullable field is never null
                Operator::Eq => Ok(Condition::Never),
                Operator::Ne => Ok(Condition::Always),
                _ => Err(FilterError::InvalidLiteral {
                    field: name,
                    value: "null".to_string(),
                    expected: kind.to_string(),
                }
                .into()),
            };
        };

        let Some(value) = coerce(raw, kind) else {
            if self.strict_literals {
                return Err(FilterError::UncoercibleLiteral {
                    field: name,
                    value: raw.to_string(),
                    kind: kind.to_string(),
                }
                .into());
            }
            warn!(
                field = %field.name,
                value = %raw,
                kind = %kind,
                "filter literal does not match field type, clause ignored"
            );
            return Ok(Condition::Always);
        };

        let op = match operator {
            Operator::Eq => CompareOp::Eq,
            Operator::Ne => CompareOp::Ne,
            Operator::Gt => CompareOp::Gt,
            Operator::Lt => CompareOp::Lt,
            Operator::Gte => CompareOp::Gte,
            _ => CompareOp::Lte,
        };

        Ok(Condition::Compare {
            field: name,
            op,
            value,
        })
    }
}

fn unsupported<T>(field: &FieldDescriptor<T>, operator: Operator) -> crate::core::error::CrudError {
    FilterError::UnsupportedOperator {
        field: field.name.to_string(),
        operation: operator.to_string(),
        kind: field.kind().to_string(),
    }
    .into()
}

/// List elements, rejecting a literal `null`
fn list_elements(raw: Option<&str>, operator: Operator) -> CrudResult<Vec<String>> {
    let items = raw.map(split_list).unwrap_or_default();
    if items.iter().any(|item| item.eq_ignore_ascii_case("null")) {
        return Err(FilterError::NullInList {
            operation: operator.to_string(),
        }
        .into());
    }
    Ok(items)
}

fn membership<T>(
    field: &FieldDescriptor<T>,
    operator: Operator,
    raw: Option<&str>,
) -> CrudResult<Condition> {
    let kind = field.kind();
    if !kind.is_scalar() {
        return Err(unsupported(field, operator));
    }

    let values = list_elements(raw, operator)?
        .into_iter()
        .map(|item| {
            coerce(&item, kind).ok_or_else(|| {
                FilterError::InvalidLiteral {
                    field: field.name.to_string(),
                    value: item.clone(),
                    expected: kind.to_string(),
                }
                .into()
            })
        })
        .collect::<CrudResult<Vec<_>>>()?;

    Ok(Condition::In {
        field: field.name.to_string(),
        values,
        negated: operator == Operator::NotIn,
    })
}

fn collection_membership<T>(
    field: &FieldDescriptor<T>,
    operator: Operator,
    raw: Option<&str>,
) -> CrudResult<Condition> {
    if field.kind() != FieldKind::Collection {
        return Err(unsupported(field, operator));
    }

    let ids = list_elements(raw, operator)?
        .into_iter()
        .map(|item| {
            item.parse::<i64>().map_err(|_| {
                FilterError::InvalidLiteral {
                    field: field.name.to_string(),
                    value: item.clone(),
                    expected: "identifier".to_string(),
                }
                .into()
            })
        })
        .collect::<CrudResult<Vec<_>>>()?;

    Ok(Condition::AnyOf {
        field: field.name.to_string(),
        ids,
        negated: operator == Operator::NotAny,
    })
}

fn text<T>(field: &FieldDescriptor<T>, operator: Operator, raw: Option<&str>) -> CrudResult<Condition> {
    if field.kind() != FieldKind::String {
        return Err(unsupported(field, operator));
    }
    let Some(needle) = raw else {
        return Ok(Condition::Never);
    };

    let op = match operator {
        Operator::Contains => TextOp::Contains,
        Operator::NotContains => TextOp::NotContains,
        Operator::StartsWith => TextOp::StartsWith,
        _ => TextOp::EndsWith,
    };

    Ok(Condition::Text {
        field: field.name.to_string(),
        op,
        needle: needle.to_string(),
    })
}

fn date_range<T>(
    field: &FieldDescriptor<T>,
    operator: Operator,
    raw: Option<&str>,
) -> CrudResult<Condition> {
    let kind = field.kind();
    if !kind.is_date_like() {
        return Err(unsupported(field, operator));
    }
    let name = field.name.to_string();

    let invalid = |value: &str| -> crate::core::error::CrudError {
        FilterError::InvalidLiteral {
            field: name.clone(),
            value: value.to_string(),
            expected: kind.to_string(),
        }
        .into()
    };

    if operator == Operator::SameDate {
        let raw = raw.ok_or_else(|| invalid("null"))?;
        let ts = parse_date_literal(raw).ok_or_else(|| invalid(raw))?;
        return Ok(Condition::SameDate {
            field: name.clone(),
            date: ts.date_naive(),
        });
    }

    let bounds = raw.map(split_list).unwrap_or_default();
    if bounds.len() != 2 {
        return Err(FilterError::InvalidRange {
            field: name.clone(),
            message: format!("expected two dates, got {}", bounds.len()),
        }
        .into());
    }
    let lower = coerce(&bounds[0], kind).ok_or_else(|| invalid(&bounds[0]))?;
    let upper = coerce(&bounds[1], kind).ok_or_else(|| invalid(&bounds[1]))?;

    Ok(Condition::And(vec![
        Condition::Compare {
            field: name.clone(),
            op: CompareOp::Gte,
            value: lower,
        },
        Condition::Compare {
            field: name.clone(),
            op: CompareOp::Lte,
            value: upper,
        },
    ]))
}
