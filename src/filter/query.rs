//! Deferred query description handed to a query source

use crate::core::entity::Entity;
use crate::filter::condition::Condition;
use crate::filter::order::{OrderItem, sort_entities};

/// Filter, order and window of a deferred query.
///
/// A source is expected to apply them in that order: filter, then sort, then
/// skip `skip` items and keep at most `take`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub condition: Condition,
    pub order: Vec<OrderItem>,
    /// Language used for relation and localized sort keys
    pub lang: Option<String>,
    pub skip: usize,
    /// `None` keeps everything after `skip`
    pub take: Option<usize>,
}

impl Query {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            order: Vec::new(),
            lang: None,
            skip: 0,
            take: None,
        }
    }

    pub fn order_by(mut self, order: Vec<OrderItem>) -> Self {
        self.order = order;
        self
    }

    pub fn lang(mut self, lang: Option<String>) -> Self {
        self.lang = lang;
        self
    }

    pub fn window(mut self, skip: usize, take: Option<usize>) -> Self {
        self.skip = skip;
        self.take = take;
        self
    }

    /// Run the query over materialized entities
    pub fn execute<T: Entity>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let matched: Vec<T> = items
            .into_iter()
            .filter(|item| self.condition.evaluate(item))
            .collect();
        let sorted = sort_entities(matched, &self.order, self.lang.as_deref());
        let window = sorted.into_iter().skip(self.skip);
        match self.take {
            Some(take) => window.take(take).collect(),
            None => window.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{FieldKind, FieldValue, Schema};
    use crate::filter::condition::CompareOp;
    use crate::filter::order::SortDirection;
    use std::sync::OnceLock;

    #[derive(Clone, Debug)]
    struct Score {
        id: i64,
        points: i64,
    }

    impl Entity for Score {
        fn type_name() -> &'static str {
            "Score"
        }

        fn resource_name() -> &'static str {
            "scores"
        }

        fn id(&self) -> i64 {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = id;
        }

        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Score>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::builder()
                    .field("Points", FieldKind::Integer, |s: &Score| s.points.into())
                    .build()
            })
        }
    }

    fn scores() -> Vec<Score> {
        (1..=6).map(|id| Score { id, points: id * 10 }).collect()
    }

    #[test]
    fn test_execute_filters_sorts_and_windows() {
        let query = Query::new(Condition::Compare {
            field: "Points".to_string(),
            op: CompareOp::Gt,
            value: FieldValue::Integer(20),
        })
        .order_by(vec![OrderItem {
            field: "Points",
            direction: SortDirection::Desc,
        }])
        .window(1, Some(2));

        let ids: Vec<i64> = query.execute(scores()).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[test]
    fn test_execute_without_take() {
        let query = Query::new(Condition::Always).window(4, None);
        assert_eq!(query.execute(scores()).len(), 2);
    }
}
