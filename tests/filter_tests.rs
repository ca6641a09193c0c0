//! End-to-end tests of the filter compiler over in-memory lists

mod common;

use common::*;
use crudkit::filter::{CompileOptions, FilterCompiler, FilterRequest, PaginatedList, SortDirection};

fn run(request: FilterRequest) -> PaginatedList<Person> {
    FilterCompiler::<Person>::new(request, CompileOptions::default())
        .apply_to_list(sample_people())
        .unwrap()
}

fn run_err(request: FilterRequest) -> (u16, &'static str) {
    let err = FilterCompiler::<Person>::new(request, CompileOptions::default())
        .apply_to_list(sample_people())
        .unwrap_err();
    (err.status_code().as_u16(), err.error_code())
}

fn matching(field: &str, op: &str, value: Option<&str>) -> Vec<i64> {
    let mut found = ids(&run(FilterRequest::new().filter(field, op, value).return_all()).items);
    found.sort();
    found
}

// ==============================================================
// Reference scenarios
// ==============================================================

#[test]
fn test_adults_sorted_by_age_desc() {
    let people = vec![person(1, "Alice", 30), person(2, "Bob", 17)];
    let request = FilterRequest::new()
        .filter("Age", "gte", Some("18"))
        .order("Age", SortDirection::Desc)
        .page(1)
        .per_page(10);

    let result = FilterCompiler::<Person>::new(request, CompileOptions::default())
        .apply_to_list(people)
        .unwrap()
        .into_result();

    assert_eq!(ids(&result.data), vec![1]);
    assert_eq!(result.current_page, 1);
    assert_eq!(result.items_per_page, 10);
    assert_eq!(result.total_items, 1);
    assert_eq!(result.total_pages, 1);
}

#[test]
fn test_id_in_list_matches_present_ids_only() {
    let people = vec![person(1, "A", 1), person(2, "B", 2), person(4, "D", 4)];
    let request = FilterRequest::new().filter("Id", "in", Some("[1,2,3]"));

    let result = FilterCompiler::<Person>::new(request, CompileOptions::default())
        .apply_to_list(people)
        .unwrap();

    let mut found = ids(&result.items);
    found.sort();
    assert_eq!(found, vec![1, 2]);
}

// ==============================================================
// Operator families
// ==============================================================

#[test]
fn test_equality_accepts_exactly_matching_values() {
    assert_eq!(matching("Age", "eq", Some("30")), vec![1, 4]);
    assert_eq!(matching("Age", "ne", Some("30")), vec![2, 3, 5, 6, 7, 8]);
    assert_eq!(matching("Name", "equals", Some("carol")), vec![3]);
    assert_eq!(matching("Status", "eq", Some("Retired")), vec![3, 8]);
    assert_eq!(matching("Status", "eq", Some("1")), vec![2, 6]);
}

#[test]
fn test_null_comparisons() {
    assert_eq!(matching("Nickname", "eq", None), vec![2, 4, 6, 8]);
    assert_eq!(matching("Nickname", "ne", None), vec![1, 3, 5, 7]);
    // Age is never null
    assert!(matching("Age", "eq", None).is_empty());
    assert_eq!(matching("Age", "ne", None).len(), 8);
}

#[test]
fn test_in_and_notin_are_complements() {
    let all: Vec<i64> = (1..=8).collect();
    for (field, list) in [
        ("Age", "[30, 17, 59]"),
        ("Name", r#"["alice", "Dave", "nobody"]"#),
        ("Nickname", "[Eve, Caz]"),
        ("BirthDate", "[1994-03-14, 2001-12-31]"),
        ("Status", "[Active]"),
    ] {
        let included = matching(field, "in", Some(list));
        let excluded = matching(field, "notin", Some(list));

        let mut union = [included.clone(), excluded.clone()].concat();
        union.sort();
        assert_eq!(union, all, "{} in/notin {}", field, list);
        assert!(included.iter().all(|id| !excluded.contains(id)));
    }
}

#[test]
fn test_null_in_list_is_rejected_for_both_forms() {
    for op in ["in", "notin"] {
        let request = FilterRequest::new().filter("Age", op, Some("[1, null]"));
        assert_eq!(run_err(request), (400, "NULL_IN_LIST"));
    }
}

#[test]
fn test_any_and_nany_on_collections() {
    assert_eq!(matching("Tags", "any", Some("[1, 4]")), vec![1, 5, 7]);
    assert_eq!(matching("Tags", "nany", Some("[1, 4]")), vec![2, 3, 4, 6, 8]);
}

#[test]
fn test_text_operators_are_case_insensitive() {
    assert_eq!(matching("Name", "contains", Some("AR")), vec![3]);
    assert_eq!(matching("Name", "startswith", Some("g")), vec![7]);
    assert_eq!(matching("Name", "endswith", Some("E")), vec![1, 4, 5, 7]);
    assert_eq!(matching("Name", "notcontains", Some("a")), vec![2, 5, 8]);
    // null nickname never matches
    assert_eq!(matching("Nickname", "contains", Some("a")), vec![1, 3]);
}

#[test]
fn test_between_equals_gte_and_lte() {
    for (from, to) in [
        ("1990-01-01", "2000-12-31"),
        ("1994-03-14", "1994-03-14"),
        ("2010-01-01", "1990-01-01"),
        ("1960-01-01T00:00:00Z", "2002-01-01"),
    ] {
        let between = matching("BirthDate", "between", Some(&format!("[{}, {}]", from, to)));

        let mut both = ids(
            &run(FilterRequest::new()
                .filter("BirthDate", "gte", Some(from))
                .filter("BirthDate", "lte", Some(to))
                .return_all())
            .items,
        );
        both.sort();
        assert_eq!(between, both, "between {} and {}", from, to);
    }
}

#[test]
fn test_samedate_ignores_time() {
    assert_eq!(
        matching("BirthDate", "thesamedatewith", Some("1994-03-14T18:30:00")),
        vec![1, 4]
    );
}

#[test]
fn test_relation_sorts_by_localized_name() {
    let request = FilterRequest::new()
        .order("Role", SortDirection::Asc)
        .order("Id", SortDirection::Asc)
        .return_all();

    let english = FilterCompiler::<Person>::new(
        request.clone(),
        CompileOptions::default().with_lang(Some("en".to_string())),
    )
    .apply_to_list(sample_people())
    .unwrap();
    // no role first, then Admin < Editor
    assert_eq!(ids(&english.items), vec![3, 6, 8, 1, 5, 2, 4, 7]);

    let arabic = FilterCompiler::<Person>::new(
        request,
        CompileOptions::default().with_lang(Some("ar".to_string())),
    )
    .apply_to_list(sample_people())
    .unwrap();
    // محرر < مدير
    assert_eq!(ids(&arabic.items), vec![3, 6, 8, 2, 4, 7, 1, 5]);
}

#[test]
fn test_nulls_sort_first_ascending() {
    let result = run(FilterRequest::new()
        .order("Nickname", SortDirection::Asc)
        .order("Id", SortDirection::Asc)
        .return_all());
    assert_eq!(ids(&result.items), vec![2, 4, 6, 8, 1, 3, 5, 7]);
}

#[test]
fn test_search_covers_strings_and_localized_fields() {
    let by_name = run(FilterRequest::new().search("gig").return_all());
    assert_eq!(ids(&by_name.items), vec![7]);

    let by_bio = run(FilterRequest::new().search("PILOT").return_all());
    assert_eq!(ids(&by_bio.items), vec![3]);

    let arabic = run(FilterRequest::new().search("مهندس").return_all());
    assert_eq!(ids(&arabic.items), vec![7]);
}

// ==============================================================
// Errors
// ==============================================================

#[test]
fn test_error_taxonomy() {
    let cases = [
        (FilterRequest::new().filter("Bio", "eq", Some("x")), (400, "LOCALIZED_FIELD_FILTER")),
        (FilterRequest::new().filter("Age", "like", Some("x")), (422, "UNKNOWN_OPERATOR")),
        (FilterRequest::new().filter("Status", "gt", Some("Active")), (422, "UNSUPPORTED_OPERATOR")),
        (FilterRequest::new().filter("Name", "between", Some("[a, b]")), (422, "UNSUPPORTED_OPERATOR")),
        (FilterRequest::new().filter("Age", "contains", Some("3")), (422, "UNSUPPORTED_OPERATOR")),
        (FilterRequest::new().filter("Age", "any", Some("[1]")), (422, "UNSUPPORTED_OPERATOR")),
        (FilterRequest::new().filter("BirthDate", "between", Some("[2000-01-01]")), (400, "INVALID_RANGE")),
        (FilterRequest::new().filter("Age", "in", Some("[1, x]")), (400, "INVALID_LITERAL")),
    ];

    for (request, expected) in cases {
        assert_eq!(run_err(request.clone()), expected, "{:?}", request.filters);
    }
}

#[test]
fn test_unknown_operator_rejected_even_on_unknown_field() {
    let request = FilterRequest::new().filter("Missing", "like", Some("x"));
    assert_eq!(run_err(request), (422, "UNKNOWN_OPERATOR"));
}

#[test]
fn test_unknown_fields_are_skipped() {
    let result = run(FilterRequest::new()
        .filter("Missing", "eq", Some("x"))
        .order("Missing", SortDirection::Asc)
        .order("Tags", SortDirection::Asc));
    assert_eq!(result.total_count, 8);
    // default order: Id descending
    assert_eq!(ids(&result.items)[0], 8);
}

#[test]
fn test_bad_comparison_literal_lenient_and_strict() {
    let lenient = run(FilterRequest::new().filter("Age", "gt", Some("old")));
    assert_eq!(lenient.total_count, 8);

    let err = FilterCompiler::<Person>::new(
        FilterRequest::new().filter("Age", "gt", Some("old")),
        CompileOptions::default().strict(true),
    )
    .apply_to_list(sample_people())
    .unwrap_err();
    assert_eq!(err.error_code(), "UNCOERCIBLE_LITERAL");
    assert_eq!(err.status_code().as_u16(), 422);
}

// ==============================================================
// Pagination
// ==============================================================

#[test]
fn test_pages_never_exceed_per_page_and_total_is_stable() {
    let mut seen = Vec::new();
    for page in 1..=4 {
        let result = run(FilterRequest::new()
            .order("Id", SortDirection::Asc)
            .page(page)
            .per_page(3));
        assert!(result.items.len() <= 3);
        assert_eq!(result.total_count, 8);
        assert_eq!(result.total_pages(), 3);
        seen.extend(ids(&result.items));
    }
    assert_eq!(seen, (1..=8).collect::<Vec<_>>());
}

#[test]
fn test_return_all_returns_everything_in_one_page() {
    let result = run(FilterRequest::new().per_page(2).return_all());
    assert_eq!(result.items.len(), 8);
    assert_eq!(result.page, 1);
    assert_eq!(result.per_page, 8);
    assert_eq!(result.total_pages(), 1);
}

#[test]
fn test_page_past_the_end_is_empty() {
    let result = run(FilterRequest::new().page(5).per_page(5));
    assert!(result.items.is_empty());
    assert_eq!(result.total_count, 8);
}
