//! Sort directives and stable multi-key ordering

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

use crate::core::entity::Entity;
use crate::core::field::{FieldKind, FieldValue};

/// Sort direction, encoded on the wire as `1` (ascending) or `2` (descending).
///
/// `"asc"` / `"desc"` (any case) are accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(SortDirection::Asc),
            2 => Some(SortDirection::Desc),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "1" | "asc" | "ascending" => Some(SortDirection::Asc),
            "2" | "desc" | "descending" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SortDirection::Asc => serializer.serialize_u8(1),
            SortDirection::Desc => serializer.serialize_u8(2),
        }
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DirectionVisitor;

        impl Visitor<'_> for DirectionVisitor {
            type Value = SortDirection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("1, 2, \"asc\" or \"desc\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<SortDirection, E> {
                SortDirection::from_code(v)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<SortDirection, E> {
                u64::try_from(v)
                    .ok()
                    .and_then(SortDirection::from_code)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SortDirection, E> {
                SortDirection::from_name(v)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(DirectionVisitor)
    }
}

/// A resolved sort key: a field known to the schema plus a direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub field: &'static str,
    pub direction: SortDirection,
}

/// Resolve requested sort fields against the schema of `T`.
///
/// Unknown and collection-typed fields are skipped. When nothing resolves,
/// the order falls back to `Id` descending.
pub fn resolve_order<'a, T: Entity>(
    requested: impl IntoIterator<Item = (&'a str, SortDirection)>,
) -> Vec<OrderItem> {
    let schema = T::schema();
    let mut order = Vec::new();

    for (name, direction) in requested {
        match schema.get(name) {
            Some(field) if field.kind() != FieldKind::Collection => order.push(OrderItem {
                field: field.name,
                direction,
            }),
            Some(_) => debug!(field = %name, "collection field is not sortable, skipped"),
            None => debug!(field = %name, entity = T::type_name(), "unknown sort field, skipped"),
        }
    }

    if order.is_empty() {
        order.push(OrderItem {
            field: "Id",
            direction: SortDirection::Desc,
        });
    }
    order
}

/// Value an entity is sorted by for one field.
///
/// Relations sort by the related entity's name and localized text by its
/// value, both in the request language.
pub fn sort_key<T: Entity>(entity: &T, field: &str, lang: Option<&str>) -> FieldValue {
    let value = T::schema()
        .get(field)
        .map(|descriptor| descriptor.value(entity))
        .unwrap_or(FieldValue::Null);

    match value {
        FieldValue::Relation(related) => {
            FieldValue::String(related.name.get_by_locale(lang).to_string())
        }
        FieldValue::Localized(text) => FieldValue::String(text.get_by_locale(lang).to_string()),
        other => other,
    }
}

/// Ascending comparison of two sort keys; nulls first
pub fn compare_keys(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

/// Stable multi-key sort, first item is the primary key
pub fn sort_entities<T: Entity>(items: Vec<T>, order: &[OrderItem], lang: Option<&str>) -> Vec<T> {
    let mut keyed: Vec<(Vec<FieldValue>, T)> = items
        .into_iter()
        .map(|item| {
            let keys = order
                .iter()
                .map(|o| sort_key(&item, o.field, lang))
                .collect();
            (keys, item)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        for (idx, item) in order.iter().enumerate() {
            let ord = compare_keys(&a[idx], &b[idx]);
            let ord = match item.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    keyed.into_iter().map(|(_, item)| item).collect()
}
