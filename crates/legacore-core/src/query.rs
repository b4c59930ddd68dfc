//! Tenant-scoped query builder.
//!
//! Turns raw request parameters into a typed [`ListQuery`]: a filter
//! predicate over a closed, per-entity allow-list of fields, an ordering,
//! and a clamped page window. Unknown parameters are ignored. Building a
//! query is a pure function of its inputs.

use std::collections::BTreeMap;

use uuid::Uuid;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Largest row offset sent to the store. `MAX_OFFSET + MAX_LIMIT` still fits in an `i64`.
pub const MAX_OFFSET: u64 = i64::MAX as u64 - MAX_LIMIT;

/// Raw query-string parameters of a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parameter value, treating an empty string as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Integer parameter with `parseInt`-style leniency: an optional sign
    /// followed by at least one digit, anything after that ignored.
    /// Missing or unparseable values fall back to `default`.
    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(parse_leading_int).unwrap_or(default)
    }
}

impl From<BTreeMap<String, String>> for QueryParams {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (neg, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate on overflow; callers clamp anyway.
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if neg { -value } else { value })
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Effective page window of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build from request values: `page >= 1`, `limit` in `[1, 100]`.
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1) as u64,
            limit: limit.clamp(1, MAX_LIMIT as i64) as u64,
        }
    }

    pub fn from_params(params: &QueryParams) -> Self {
        Self::new(
            params.int("page", DEFAULT_PAGE as i64),
            params.int("limit", DEFAULT_LIMIT as i64),
        )
    }

    /// Rows to skip, capped at [`MAX_OFFSET`] so far-out pages read as empty.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(MAX_OFFSET)
    }
}

// ---------------------------------------------------------------------------
// Filter predicate
// ---------------------------------------------------------------------------

/// Record ownership constraint of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only rows whose `company_id` equals the tenant id.
    Tenant(Uuid),
    /// Global records (companies, users across tenants, opportunities).
    Global,
}

/// Scalar compared against a stored field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
}

/// One predicate over a stored field. Field names are always taken from a
/// static allow-list, never from request input.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq {
        field: &'static str,
        value: FilterValue,
    },
    /// Case-insensitive substring match; `needle` is stored lowercased.
    ContainsIgnoreCase {
        field: &'static str,
        needle: String,
    },
    Gte {
        field: &'static str,
        value: f64,
    },
    AnyOf(Vec<Condition>),
}

/// Conjunction of conditions under a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub scope: Scope,
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            conditions: Vec::new(),
        }
    }

    pub fn tenant_id(&self) -> Option<Uuid> {
        match self.scope {
            Scope::Tenant(id) => Some(id),
            Scope::Global => None,
        }
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub direction: Direction,
}

const NEWEST_FIRST: &[SortKey] = &[SortKey {
    field: "created_at",
    direction: Direction::Desc,
}];

// ---------------------------------------------------------------------------
// Entity allow-lists
// ---------------------------------------------------------------------------

/// A request parameter bound to a stored field.
#[derive(Debug, Clone, Copy)]
pub struct ParamField {
    pub param: &'static str,
    pub field: &'static str,
}

const fn param(param: &'static str, field: &'static str) -> ParamField {
    ParamField { param, field }
}

/// Which request parameters an entity accepts and how they apply.
#[derive(Debug, Clone, Copy)]
pub struct QueryFields {
    pub entity: &'static str,
    /// Matched case-insensitively against `search`, OR-combined.
    pub search_fields: &'static [&'static str],
    /// Exact equality filters.
    pub exact: &'static [ParamField],
    /// Case-insensitive substring filters.
    pub contains: &'static [ParamField],
    /// `>=` numeric thresholds.
    pub at_least: &'static [ParamField],
    pub order: &'static [SortKey],
}

pub const COMPANY_QUERY: QueryFields = QueryFields {
    entity: "company",
    search_fields: &["name", "slug", "industry"],
    exact: &[],
    contains: &[],
    at_least: &[],
    order: NEWEST_FIRST,
};

pub const USER_QUERY: QueryFields = QueryFields {
    entity: "user",
    search_fields: &["email", "name"],
    exact: &[param("companyId", "company_id"), param("role", "role")],
    contains: &[],
    at_least: &[],
    order: NEWEST_FIRST,
};

pub const CASE_QUERY: QueryFields = QueryFields {
    entity: "case",
    search_fields: &["title", "case_number", "description"],
    exact: &[param("status", "status")],
    contains: &[],
    at_least: &[],
    order: NEWEST_FIRST,
};

pub const DOCUMENT_QUERY: QueryFields = QueryFields {
    entity: "document",
    search_fields: &["title", "filename", "description"],
    exact: &[param("type", "doc_type")],
    contains: &[],
    at_least: &[],
    order: NEWEST_FIRST,
};

pub const PROJECT_QUERY: QueryFields = QueryFields {
    entity: "project",
    search_fields: &["name", "description"],
    exact: &[param("status", "status")],
    contains: &[],
    at_least: &[],
    order: NEWEST_FIRST,
};

pub const ANALYTICS_QUERY: QueryFields = QueryFields {
    entity: "analytics",
    search_fields: &["metric_name"],
    exact: &[param("period", "period"), param("metric", "metric_name")],
    contains: &[],
    at_least: &[],
    order: &[SortKey {
        field: "recorded_at",
        direction: Direction::Desc,
    }],
};

pub const OPPORTUNITY_QUERY: QueryFields = QueryFields {
    entity: "contract_opportunity",
    search_fields: &["title", "description", "agency"],
    exact: &[],
    contains: &[param("agency", "agency")],
    at_least: &[param("minScore", "ai_score")],
    order: &[
        SortKey {
            field: "ai_score",
            direction: Direction::Desc,
        },
        SortKey {
            field: "response_deadline",
            direction: Direction::Asc,
        },
    ],
};

/// Compose the filter for `fields` from request parameters.
pub fn build_filter(fields: &QueryFields, params: &QueryParams, scope: Scope) -> Filter {
    let mut filter = Filter::new(scope);

    for pf in fields.exact {
        if let Some(value) = params.non_empty(pf.param) {
            filter = filter.and(Condition::Eq {
                field: pf.field,
                value: FilterValue::Text(value.to_string()),
            });
        }
    }

    for pf in fields.contains {
        if let Some(value) = params.non_empty(pf.param) {
            filter = filter.and(Condition::ContainsIgnoreCase {
                field: pf.field,
                needle: value.to_lowercase(),
            });
        }
    }

    for pf in fields.at_least {
        let threshold = params
            .non_empty(pf.param)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());
        if let Some(value) = threshold {
            filter = filter.and(Condition::Gte {
                field: pf.field,
                value,
            });
        }
    }

    if let Some(search) = params.non_empty("search") {
        if !fields.search_fields.is_empty() {
            let needle = search.to_lowercase();
            filter = filter.and(Condition::AnyOf(
                fields.search_fields
                    .iter()
                    .map(|field| Condition::ContainsIgnoreCase {
                        field: *field,
                        needle: needle.clone(),
                    })
                    .collect(),
            ));
        }
    }

    filter
}

/// Everything a repository needs to run one list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: Filter,
    pub order: &'static [SortKey],
    pub page: PageRequest,
}

impl ListQuery {
    pub fn build(fields: &QueryFields, params: &QueryParams, scope: Scope) -> Self {
        Self {
            filter: build_filter(fields, params, scope),
            order: fields.order,
            page: PageRequest::from_params(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn limit_is_clamped_to_bounds() {
        for (raw, expected) in [
            ("200", 100),
            ("100", 100),
            ("101", 100),
            ("0", 1),
            ("-5", 1),
            ("1", 1),
            ("37", 37),
            ("99999999999999999999", 100),
        ] {
            let page = PageRequest::from_params(&params(&[("limit", raw)]));
            assert_eq!(page.limit, expected, "limit={raw}");
        }
    }

    #[test]
    fn page_below_one_becomes_one() {
        for raw in ["0", "-3", "abc", ""] {
            let page = PageRequest::from_params(&params(&[("page", raw)]));
            assert_eq!(page.page, 1, "page={raw}");
            assert_eq!(page.offset(), 0);
        }
    }

    #[test]
    fn offset_stays_within_signed_range() {
        let huge = PageRequest::from_params(&params(&[("page", "99999999999999999999")]));
        assert_eq!(huge.page, i64::MAX as u64);
        assert_eq!(huge.offset(), MAX_OFFSET);

        let wide = PageRequest::new(100_000_000_000_000_000, 100);
        assert_eq!(wide.offset(), MAX_OFFSET);
        assert!(wide.offset() + wide.limit <= i64::MAX as u64);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let page = PageRequest::from_params(&params(&[("page", "4"), ("limit", "25")]));
        assert_eq!(page.page, 4);
        assert_eq!(page.offset(), 75);

        for p in 1..=10i64 {
            for l in [1i64, 7, 100] {
                let req = PageRequest::new(p, l);
                assert_eq!(req.offset(), (p as u64 - 1) * l as u64);
            }
        }
    }

    #[test]
    fn defaults_apply_when_missing() {
        let page = PageRequest::from_params(&QueryParams::new());
        assert_eq!(page, PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn lenient_integer_parsing() {
        let p = params(&[("page", "3abc"), ("limit", " 20")]);
        assert_eq!(p.int("page", 1), 3);
        assert_eq!(p.int("limit", 10), 20);
        assert_eq!(p.int("missing", 7), 7);
        assert_eq!(params(&[("x", "2.9")]).int("x", 0), 2);
        assert_eq!(params(&[("x", "-")]).int("x", 5), 5);
    }

    #[test]
    fn tenant_scope_is_always_present() {
        let tenant = Uuid::new_v4();
        let filter = build_filter(&CASE_QUERY, &QueryParams::new(), Scope::Tenant(tenant));
        assert_eq!(filter.tenant_id(), Some(tenant));
        assert!(filter.conditions.is_empty());
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let tenant = Uuid::new_v4();
        let filter = build_filter(
            &CASE_QUERY,
            &params(&[("companyId", "other"), ("drop", "table"), ("role", "ADMIN")]),
            Scope::Tenant(tenant),
        );
        assert!(filter.conditions.is_empty());
    }

    #[test]
    fn exact_and_search_conditions_are_combined() {
        let filter = build_filter(
            &USER_QUERY,
            &params(&[("role", "ADMIN"), ("search", "Acme")]),
            Scope::Global,
        );
        assert_eq!(
            filter.conditions,
            vec![
                Condition::Eq {
                    field: "role",
                    value: FilterValue::Text("ADMIN".into()),
                },
                Condition::AnyOf(vec![
                    Condition::ContainsIgnoreCase {
                        field: "email",
                        needle: "acme".into(),
                    },
                    Condition::ContainsIgnoreCase {
                        field: "name",
                        needle: "acme".into(),
                    },
                ]),
            ]
        );
    }

    #[test]
    fn empty_search_adds_nothing() {
        let filter = build_filter(&COMPANY_QUERY, &params(&[("search", "")]), Scope::Global);
        assert!(filter.conditions.is_empty());
    }

    #[test]
    fn score_threshold_parses_float_and_ignores_garbage() {
        let filter = build_filter(
            &OPPORTUNITY_QUERY,
            &params(&[("minScore", "90.5"), ("agency", "Defense")]),
            Scope::Global,
        );
        assert!(filter.conditions.contains(&Condition::Gte {
            field: "ai_score",
            value: 90.5,
        }));
        assert!(filter.conditions.contains(&Condition::ContainsIgnoreCase {
            field: "agency",
            needle: "defense".into(),
        }));

        let filter = build_filter(
            &OPPORTUNITY_QUERY,
            &params(&[("minScore", "high")]),
            Scope::Global,
        );
        assert!(filter.conditions.is_empty());
    }

    #[test]
    fn same_input_yields_same_query() {
        let tenant = Uuid::new_v4();
        let p = params(&[("status", "OPEN"), ("limit", "200"), ("search", "x")]);
        assert_eq!(
            ListQuery::build(&CASE_QUERY, &p, Scope::Tenant(tenant)),
            ListQuery::build(&CASE_QUERY, &p, Scope::Tenant(tenant))
        );
    }

    #[test]
    fn opportunities_sort_by_score_then_deadline() {
        assert_eq!(OPPORTUNITY_QUERY.order[0].field, "ai_score");
        assert_eq!(OPPORTUNITY_QUERY.order[0].direction, Direction::Desc);
        assert_eq!(OPPORTUNITY_QUERY.order[1].field, "response_deadline");
        assert_eq!(OPPORTUNITY_QUERY.order[1].direction, Direction::Asc);
    }
}
