//! Filter compiler: filter request → predicates, order, page

use std::marker::PhantomData;
use tracing::debug;

use crate::core::entity::Entity;
use crate::core::error::CrudResult;
use crate::core::localized::SUPPORTED_LANGUAGES;
use crate::filter::builder::PredicateBuilder;
use crate::filter::condition::{Condition, Predicate};
use crate::filter::operator::Operator;
use crate::filter::order::{OrderItem, resolve_order, sort_entities};
use crate::filter::page::PaginatedList;
use crate::filter::query::Query;
use crate::filter::request::FilterRequest;
use crate::filter::search::search_condition;
use crate::storage::QuerySource;

/// Per-request compilation settings
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Request language, for relation and localized sort keys
    pub lang: Option<String>,
    /// Reject comparison literals that do not match the field type
    pub strict_literals: bool,
    /// Languages free-text search looks into
    pub languages: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            lang: None,
            strict_literals: false,
            languages: SUPPORTED_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl CompileOptions {
    pub fn with_lang(mut self, lang: Option<String>) -> Self {
        self.lang = lang;
        self
    }

    pub fn strict(mut self, strict_literals: bool) -> Self {
        self.strict_literals = strict_literals;
        self
    }
}

/// Compilation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Unapplied,
    FiltersResolved,
    Sorted,
    Paginated,
    Complete,
}

/// Compiles one [`FilterRequest`] for entity type `T` and applies it to an
/// in-memory list or to a [`QuerySource`].
///
/// ```rust,ignore
/// let page = FilterCompiler::<User>::new(request, CompileOptions::default())
///     .apply_to_list(users)?;
/// ```
pub struct FilterCompiler<T> {
    request: FilterRequest,
    options: CompileOptions,
    predicates: Vec<Predicate>,
    order: Vec<OrderItem>,
    stage: Stage,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> FilterCompiler<T> {
    pub fn new(request: FilterRequest, options: CompileOptions) -> Self {
        Self {
            request,
            options,
            predicates: Vec::new(),
            order: Vec::new(),
            stage: Stage::Unapplied,
            _entity: PhantomData,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn order(&self) -> &[OrderItem] {
        &self.order
    }

    /// Resolve filter clauses and the search term into predicates.
    ///
    /// Clauses naming unknown fields are skipped. Runs once; later calls are
    /// no-ops.
    pub fn set_filters(&mut self) -> CrudResult<&mut Self> {
        if self.stage >= Stage::FiltersResolved {
            return Ok(self);
        }

        let builder = PredicateBuilder::new(self.options.strict_literals);
        let schema = T::schema();

        for clause in std::mem::take(&mut self.request.filters) {
            let operator: Operator = clause.operation.parse()?;
            let Some(field) = schema.get(&clause.field_name) else {
                debug!(
                    field = %clause.field_name,
                    entity = T::type_name(),
                    "unknown filter field, skipped"
                );
                continue;
            };
            self.predicates
                .push(builder.build(field, operator, clause.value.as_deref())?);
        }

        if let Some(term) = self.request.search_term() {
            self.predicates
                .push(Predicate::search(search_condition::<T>(term, &self.options.languages)));
        }

        self.stage = Stage::FiltersResolved;
        Ok(self)
    }

    /// Resolve sort clauses; falls back to `Id` descending
    pub fn set_order(&mut self) -> CrudResult<&mut Self> {
        self.set_filters()?;
        if self.stage >= Stage::Sorted {
            return Ok(self);
        }

        let requested = self
            .request
            .orders
            .iter()
            .map(|o| (o.field_name.as_str(), o.direction));
        self.order = resolve_order::<T>(requested);
        self.stage = Stage::Sorted;
        Ok(self)
    }

    /// Resolve filters and order
    pub fn init(&mut self) -> CrudResult<&mut Self> {
        self.set_order()
    }

    /// Conjunction of all resolved predicates, `Always` when there are none
    pub fn condition(&self) -> Condition {
        Condition::all(self.predicates.iter().map(|p| p.condition.clone()))
    }

    /// Page window: `(skip, take)`, no take when everything is returned
    fn window(&self) -> (usize, Option<usize>) {
        if self.request.return_all {
            (0, None)
        } else {
            (self.request.skip(), Some(self.request.per_page))
        }
    }

    fn finish(&mut self, items: Vec<T>, total_count: usize) -> PaginatedList<T> {
        self.stage = Stage::Paginated;
        let list = if self.request.return_all {
            PaginatedList::new(items, 1, total_count, total_count)
        } else {
            PaginatedList::new(items, self.request.page, self.request.per_page, total_count)
        };
        self.stage = Stage::Complete;
        debug!(
            entity = T::type_name(),
            total = list.total_count,
            returned = list.items.len(),
            page = list.page,
            "filter applied"
        );
        list
    }

    /// Filter, sort, count and slice an in-memory list
    pub fn apply_to_list(mut self, items: Vec<T>) -> CrudResult<PaginatedList<T>> {
        self.init()?;
        let condition = self.condition();

        let matched: Vec<T> = items
            .into_iter()
            .filter(|item| condition.evaluate(item))
            .collect();
        let sorted = sort_entities(matched, &self.order, self.options.lang.as_deref());
        let total_count = sorted.len();

        let (skip, take) = self.window();
        let window = sorted.into_iter().skip(skip);
        let page = match take {
            Some(take) => window.take(take).collect(),
            None => window.collect(),
        };

        Ok(self.finish(page, total_count))
    }

    /// Count, then push filter, order and window down to a query source
    pub async fn apply_to_source<S>(mut self, source: &S) -> CrudResult<PaginatedList<T>>
    where
        S: QuerySource<T> + ?Sized,
    {
        self.init()?;
        let condition = self.condition();

        let total_count = source.count(&condition).await?;

        let (skip, take) = self.window();
        let query = Query::new(condition)
            .order_by(self.order.clone())
            .lang(self.options.lang.clone())
            .window(skip, take);
        let items = source.fetch(&query).await?;

        Ok(self.finish(items, total_count))
    }
}
