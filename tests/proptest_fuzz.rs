//! Property-based tests (fuzzing) for the query layer.
//!
//! Uses proptest to generate random/malformed inputs and verify the
//! builders, compilers and decoders never panic, only return clean errors.
//!
//! Run with: `cargo test --test proptest_fuzz`

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::collections::HashSet;

use meili_connector::search::{
    quote, MetadataPlanner, Operator, RandomSampler, SearchResponse,
};
use meili_connector::{ApiResponse, ConnectorError, QueryBuilder, WhereClauses};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Generate arbitrary JSON values (including invalid structures)
fn arbitrary_json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(
        4,   // depth
        64,  // max nodes
        10,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..10).prop_map(Value::Array),
                prop::collection::hash_map(".*", inner, 0..10)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

/// Operator spellings, valid and not
fn operator_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("=".to_string()),
        Just("!=".to_string()),
        Just(">=".to_string()),
        Just("<".to_string()),
        Just("in".to_string()),
        Just("NOT   IN".to_string()),
        Just("is not empty".to_string()),
        Just("MATCHES".to_string()),
        ".{0,12}",
    ]
}

/// Undo `quote`: strip the outer quotes and drop escaping backslashes.
fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?),
            '\'' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

// =============================================================================
// Quoting
// =============================================================================

proptest! {
    /// Quoting is reversible and never leaves a bare quote inside
    #[test]
    fn prop_quote_reversible(value in ".*") {
        let quoted = quote(&value);
        prop_assert_eq!(unquote(&quoted), Some(value));
    }

    /// Quoted output only grows by the escapes plus two quotes
    #[test]
    fn prop_quote_length(value in "[a-z'\\\\]{0,64}") {
        let escapes = value.chars().filter(|c| *c == '\'' || *c == '\\').count();
        prop_assert_eq!(quote(&value).len(), value.len() + escapes + 2);
    }
}

// =============================================================================
// Filter Compilation Fuzz Tests
// =============================================================================

proptest! {
    /// Operator parsing never panics on arbitrary text
    #[test]
    fn fuzz_operator_parse(text in ".*") {
        let result = text.parse::<Operator>();
        if let Err(err) = result {
            prop_assert!(matches!(err, ConnectorError::CannotParseWhereClause(_)));
        }
    }

    /// Arbitrary clauses either compile or fail with a construction error
    #[test]
    fn fuzz_filter_compile_never_panics(
        clauses in prop::collection::vec((".{0,16}", operator_strategy(), ".{0,16}"), 0..8),
    ) {
        let mut builder = QueryBuilder::new("products");
        for (column, operator, value) in clauses {
            builder = match builder.clone().filter(column, &operator, value) {
                Ok(next) => next,
                Err(err) => {
                    prop_assert!(matches!(err, ConnectorError::CannotParseWhereClause(_)));
                    builder
                }
            };
        }
        let query = builder.build().unwrap();
        let _ = query.compile_filters();
    }

    /// Every top-level comparison yields exactly one expression
    #[test]
    fn prop_one_expression_per_clause(
        values in prop::collection::vec((0u8..20, any::<i64>()), 0..10),
    ) {
        let mut builder = QueryBuilder::new("products");
        for (column, value) in &values {
            builder = builder.filter(format!("c{}", column), ">=", *value).unwrap();
        }
        let compiled = builder.build().unwrap().compile_filters().unwrap();

        prop_assert_eq!(compiled.len(), values.len());
        for (expression, (column, value)) in compiled.iter().zip(&values) {
            prop_assert_eq!(expression, &format!("'c{}' >= {}", column, value));
        }
    }

    /// Non-finite floats are rejected when the clause is added
    #[test]
    fn prop_non_finite_float_rejected(pick in 0u8..3, finite in prop::collection::vec(-1e9f64..1e9, 0..4)) {
        let value = match pick {
            0 => f64::NAN,
            1 => f64::INFINITY,
            _ => f64::NEG_INFINITY,
        };
        let is_scalar_rejected = matches!(
            QueryBuilder::new("products").filter("price", "=", value),
            Err(ConnectorError::CannotParseWhereClause(_))
        );
        prop_assert!(is_scalar_rejected);

        let mut values = finite;
        values.push(value);
        let is_list_rejected = matches!(
            QueryBuilder::new("products").filter_in("price", values),
            Err(ConnectorError::CannotParseWhereClause(_))
        );
        prop_assert!(is_list_rejected);
    }

    /// Membership lists keep every value, in order
    #[test]
    fn prop_in_list_keeps_values(values in prop::collection::vec("[a-z]{1,8}", 1..10)) {
        let compiled = QueryBuilder::new("products")
            .filter_in("tag", values.clone())
            .unwrap()
            .build()
            .unwrap()
            .compile_filters()
            .unwrap();
        let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
        prop_assert_eq!(compiled, vec![format!("'tag' IN [{}]", quoted.join(","))]);
    }
}

// =============================================================================
// Planner Invariant Tests
// =============================================================================

proptest! {
    /// One companion per distinct filtered column, each without its own clause
    #[test]
    fn prop_companion_per_column(
        plain in prop::collection::vec(0u8..6, 0..6),
        metadata in prop::collection::vec(0u8..6, 1..6),
    ) {
        let mut builder = QueryBuilder::new("products");
        for column in &plain {
            builder = builder.filter(format!("c{}", column), "=", "x").unwrap();
        }
        let metadata_columns = metadata.clone();
        builder = builder
            .keep_facets_in_metadata(move |mut scope| {
                for column in &metadata_columns {
                    scope = scope.filter(format!("m{}", column), "=", "y")?;
                }
                Ok(scope)
            })
            .unwrap();
        let query = builder.build().unwrap();

        let plan = MetadataPlanner::default().plan(&query).unwrap();

        let distinct: HashSet<String> = plain
            .iter()
            .map(|c| format!("c{}", c))
            .chain(metadata.iter().map(|c| format!("m{}", c)))
            .collect();
        prop_assert_eq!(plan.companions.len(), distinct.len());

        for companion in &plan.companions {
            let own = quote(&companion.column);
            prop_assert!(companion.request.filter.iter().all(|f| !f.contains(&own)));
            prop_assert_eq!(&companion.request.facets, &vec![companion.column.clone()]);
            prop_assert_eq!(companion.request.limit, Some(1));
        }
    }
}

// =============================================================================
// Sampling Invariant Tests
// =============================================================================

proptest! {
    /// Drawn offsets are distinct and inside the result set
    #[test]
    fn prop_offsets_distinct_in_range(
        total in 0u64..500,
        requested in 0usize..64,
        seed in any::<u64>(),
    ) {
        let requested = requested.min(total as usize);
        let offsets = RandomSampler::draw_offsets(total, requested, &mut StdRng::seed_from_u64(seed));

        prop_assert_eq!(offsets.len(), requested);
        prop_assert!(offsets.iter().all(|&o| (o as u64) < total));
        prop_assert_eq!(offsets.iter().collect::<HashSet<_>>().len(), requested);
    }

    /// Asking for more than exists always fails
    #[test]
    fn prop_not_enough_documents(total in 0u64..100, extra in 1usize..50) {
        let requested = total as usize + extra;
        let is_not_enough = matches!(
            RandomSampler::ensure_enough(total, requested),
            Err(ConnectorError::NotEnoughDocumentsToOrderRandomly { .. })
        );
        prop_assert!(is_not_enough);
    }
}

// =============================================================================
// Decoding Fuzz Tests
// =============================================================================

proptest! {
    /// Search response decoding never panics on arbitrary JSON
    #[test]
    fn fuzz_search_response_from_arbitrary_json(value in arbitrary_json_strategy()) {
        let _ = serde_json::from_value::<SearchResponse>(value);
    }

    /// Error mapping never panics and always honours auth statuses
    #[test]
    fn fuzz_error_mapping(status in 400u16..600, body in arbitrary_json_strategy()) {
        let err = ConnectorError::from_response(&ApiResponse::new(status, body));
        if status == 401 || status == 403 {
            prop_assert!(matches!(err, ConnectorError::IncorrectApiKey(_)));
        }
    }

    /// Attribute messages map regardless of the attribute name
    #[test]
    fn prop_attribute_message_mapping(attribute in "[a-zA-Z_.]{1,24}") {
        let response = ApiResponse::new(
            400,
            json!({
                "code": "invalid_search_filter",
                "message": format!("Attribute `{}` is not filterable. Available filterable attributes are: ``.", attribute)
            }),
        );
        let is_attribute = matches!(
            ConnectorError::from_response(&response),
            ConnectorError::CannotFilterOnAttribute(a) if a == attribute
        );
        prop_assert!(is_attribute);
    }
}
