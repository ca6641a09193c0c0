//! Dynamic filtering, ordering and pagination
//!
//! A [`FilterRequest`] (clauses, sort directives, search term, page) is
//! compiled by a [`FilterCompiler`] into a [`Condition`] tree plus an order,
//! then applied to an in-memory list or pushed down to a
//! [`QuerySource`](crate::storage::QuerySource).

pub mod builder;
pub mod compiler;
pub mod condition;
pub mod literal;
pub mod operator;
pub mod order;
pub mod page;
pub mod query;
pub mod request;
pub mod search;

pub use builder::PredicateBuilder;
pub use compiler::{CompileOptions, FilterCompiler, Stage};
pub use condition::{CompareOp, Condition, Predicate, TextOp};
pub use operator::{Operator, OperatorFamily};
pub use order::{OrderItem, SortDirection};
pub use page::{PaginatedList, PaginatedResult};
pub use query::Query;
pub use request::{FilterClause, FilterParams, FilterRequest, SortClause};
pub use search::search_condition;
