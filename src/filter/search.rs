//! Free-text search expansion

use crate::core::entity::Entity;
use crate::core::field::FieldKind;
use crate::filter::condition::{Condition, TextOp};

/// Expand a search term into an OR of case-insensitive substring matches.
///
/// Every searchable plain string field contributes one clause, every
/// searchable localized field one clause per language in `languages`.
/// A type with nothing searchable matches everything.
pub fn search_condition<T: Entity>(term: &str, languages: &[String]) -> Condition {
    let mut clauses = Vec::new();

    for field in T::schema().fields().filter(|f| f.searchable) {
        match field.kind() {
            FieldKind::String => clauses.push(Condition::Text {
                field: field.name.to_string(),
                op: TextOp::Contains,
                needle: term.to_string(),
            }),
            FieldKind::Localized => {
                clauses.extend(languages.iter().map(|lang| Condition::LocalizedContains {
                    field: field.name.to_string(),
                    lang: lang.clone(),
                    needle: term.to_string(),
                }))
            }
            _ => {}
        }
    }

    if clauses.is_empty() {
        return Condition::Always;
    }
    Condition::any(clauses)
}
