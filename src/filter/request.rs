//! Filter request model and its query-string encoding

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::config::PaginationConfig;
use crate::core::error::{CrudResult, RequestError};
use crate::filter::order::SortDirection;

/// One `(field, operator, value)` triple.
///
/// `value` accepts any JSON value: strings are taken as-is, `null` means no
/// value, anything else is kept as its JSON text (`[1,2]`, `18`, `true`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterClause {
    #[serde(alias = "FieldName", alias = "name", alias = "Name", alias = "field")]
    pub field_name: String,

    #[serde(alias = "Operation", alias = "op", alias = "operator")]
    pub operation: String,

    #[serde(default, alias = "Value", deserialize_with = "raw_value")]
    pub value: Option<String>,
}

impl FilterClause {
    pub fn new(
        field_name: impl Into<String>,
        operation: impl Into<String>,
        value: Option<&str>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            operation: operation.into(),
            value: value.map(str::to_string),
        }
    }
}

fn raw_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// One sort directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortClause {
    #[serde(alias = "FieldName", alias = "name", alias = "Name", alias = "field")]
    pub field_name: String,

    #[serde(default, alias = "Direction", alias = "sortDirection", alias = "dir")]
    pub direction: SortDirection,
}

impl SortClause {
    pub fn new(field_name: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field_name: field_name.into(),
            direction,
        }
    }
}

/// Everything one list request asks for
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct FilterRequest {
    pub filters: Vec<FilterClause>,
    pub orders: Vec<SortClause>,
    pub search_query: Option<String>,

    #[validate(range(min = 1, max = 1000))]
    pub page: usize,

    #[validate(range(min = 1, max = 1000))]
    pub per_page: usize,

    /// Ignore pagination and return every match
    pub return_all: bool,
}

impl Default for FilterRequest {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            orders: Vec::new(),
            search_query: None,
            page: 1,
            per_page: 20,
            return_all: false,
        }
    }
}

impl FilterRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(
        mut self,
        field_name: impl Into<String>,
        operation: impl Into<String>,
        value: Option<&str>,
    ) -> Self {
        self.filters
            .push(FilterClause::new(field_name, operation, value));
        self
    }

    pub fn order(mut self, field_name: impl Into<String>, direction: SortDirection) -> Self {
        self.orders.push(SortClause::new(field_name, direction));
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn return_all(mut self) -> Self {
        self.return_all = true;
        self
    }

    /// Non-blank search term, trimmed
    pub fn search_term(&self) -> Option<&str> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Offset of the first item of the requested page
    pub fn skip(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Check pagination bounds; skipped entirely when `return_all` is set
    pub fn check(&self, max_per_page: usize) -> CrudResult<()> {
        if self.return_all {
            return Ok(());
        }
        if let Err(errors) = self.validate() {
            let parameter = errors
                .errors()
                .keys()
                .next()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "page".to_string());
            return Err(RequestError::InvalidParameter {
                parameter,
                message: errors.to_string(),
            }
            .into());
        }
        if self.per_page > max_per_page {
            return Err(RequestError::InvalidParameter {
                parameter: "per_page".to_string(),
                message: format!("must not exceed {}", max_per_page),
            }
            .into());
        }
        Ok(())
    }
}

/// Query-string form of a list request.
///
/// ```text
/// GET /users/All?filters=[{"fieldName":"Age","operation":"gte","value":"18"}]
///               &orders=[{"fieldName":"Age","direction":2}]&page=1&perPage=10
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterParams {
    #[serde(alias = "requestFilters")]
    pub filters: Option<String>,

    #[serde(alias = "requestOrders")]
    pub orders: Option<String>,

    pub search_query: Option<String>,

    pub page: Option<usize>,

    pub per_page: Option<usize>,

    #[serde(alias = "getAll")]
    pub return_all: Option<bool>,
}

impl FilterParams {
    /// Decode the JSON-encoded lists and apply pagination defaults
    pub fn into_request(self, pagination: &PaginationConfig) -> CrudResult<FilterRequest> {
        let request = FilterRequest {
            filters: parse_json_list("filters", self.filters.as_deref())?,
            orders: parse_json_list("orders", self.orders.as_deref())?,
            search_query: self.search_query,
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(pagination.default_per_page),
            return_all: self.return_all.unwrap_or(false),
        };
        request.check(pagination.max_per_page)?;
        Ok(request)
    }
}

fn parse_json_list<T: for<'de> Deserialize<'de>>(
    parameter: &str,
    raw: Option<&str>,
) -> CrudResult<Vec<T>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            RequestError::MalformedJson {
                parameter: parameter.to_string(),
                message: e.to_string(),
            }
            .into()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagination() -> PaginationConfig {
        PaginationConfig::default()
    }

    #[test]
    fn test_clause_value_accepts_any_json() {
        let clauses: Vec<FilterClause> = serde_json::from_str(
            r#"[
                {"fieldName": "Age", "operation": "gte", "value": "18"},
                {"FieldName": "Age", "Operation": "lte", "Value": 65},
                {"name": "Id", "op": "in", "value": [1, 2, 3]},
                {"fieldName": "DeletedAt", "operation": "eq", "value": null},
                {"fieldName": "DeletedAt", "operation": "ne"}
            ]"#,
        )
        .unwrap();
        assert_eq!(clauses[0].value.as_deref(), Some("18"));
        assert_eq!(clauses[1].value.as_deref(), Some("65"));
        assert_eq!(clauses[2].value.as_deref(), Some("[1,2,3]"));
        assert_eq!(clauses[3].value, None);
        assert_eq!(clauses[4].value, None);
    }

    #[test]
    fn test_into_request_defaults() {
        let request = FilterParams::default().into_request(&pagination()).unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, 20);
        assert!(!request.return_all);
        assert!(request.filters.is_empty());
    }

    #[test]
    fn test_into_request_parses_lists() {
        let params = FilterParams {
            filters: Some(r#"[{"fieldName":"Age","operation":"gte","value":"18"}]"#.to_string()),
            orders: Some(r#"[{"fieldName":"Age","direction":2}]"#.to_string()),
            page: Some(2),
            per_page: Some(10),
            ..Default::default()
        };
        let request = params.into_request(&pagination()).unwrap();
        assert_eq!(request.filters.len(), 1);
        assert_eq!(request.orders[0].direction, SortDirection::Desc);
        assert_eq!(request.skip(), 10);
    }

    #[test]
    fn test_malformed_filters_json() {
        let params = FilterParams {
            filters: Some("[{\"fieldName\":".to_string()),
            ..Default::default()
        };
        let err = params.into_request(&pagination()).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_JSON");
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_per_page_bounds() {
        for per_page in [0, 1001] {
            let params = FilterParams {
                per_page: Some(per_page),
                ..Default::default()
            };
            let err = params.into_request(&pagination()).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_PARAMETER");
        }
    }

    #[test]
    fn test_page_bounds() {
        for page in [0, 1001, usize::MAX] {
            let params = FilterParams {
                page: Some(page),
                per_page: Some(10),
                ..Default::default()
            };
            let err = params.into_request(&pagination()).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_PARAMETER");
        }

        let last = FilterRequest::new().page(1000).per_page(1000);
        assert!(last.check(1000).is_ok());
        assert_eq!(last.skip(), 999_000);
    }

    #[test]
    fn test_skip_saturates() {
        let request = FilterRequest::new().page(usize::MAX).per_page(10);
        assert_eq!(request.skip(), usize::MAX);
    }

    #[test]
    fn test_return_all_ignores_bounds() {
        let params = FilterParams {
            page: Some(0),
            per_page: Some(5000),
            return_all: Some(true),
            ..Default::default()
        };
        assert!(params.into_request(&pagination()).is_ok());
    }

    #[test]
    fn test_query_string_aliases() {
        let params: FilterParams = serde_json::from_value(serde_json::json!({
            "requestFilters": "[]",
            "requestOrders": "[]",
            "getAll": true,
            "perPage": 5
        }))
        .unwrap();
        assert_eq!(params.return_all, Some(true));
        assert_eq!(params.per_page, Some(5));
        assert_eq!(params.filters.as_deref(), Some("[]"));
    }

    #[test]
    fn test_search_term_is_trimmed() {
        assert_eq!(FilterRequest::new().search("  ali ").search_term(), Some("ali"));
        assert_eq!(FilterRequest::new().search("   ").search_term(), None);
    }
}
