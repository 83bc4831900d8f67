// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder - where-tree AST and fluent builders
//!
//! Provides a type-safe way to build search queries that compile to the
//! engine's filter-expression grammar.
//!
//! # Example
//!
//! ```rust
//! use meili_connector::search::{QueryBuilder, WhereClauses};
//!
//! let query = QueryBuilder::new("products")
//!     .filter("category", "=", "phones")?
//!     .filter_group(|g| g.or_filter("color", "=", "black")?.or_filter("color", "=", "white"))?
//!     .order_by_desc("price")?
//!     .build()?;
//!
//! assert_eq!(
//!     query.compile_filters()?,
//!     vec!["'category' = 'phones'", "('color' = 'black' OR 'color' = 'white')"]
//! );
//! # Ok::<(), meili_connector::ConnectorError>(())
//! ```
//!
//! OR is only reachable through [`GroupBuilder`], the builder handed to
//! group closures. The top-level [`QueryBuilder`] has no `or_filter`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::filter_translator::{CompileMode, FilterColumns, FilterTranslator};
use super::order_translator::OrderTranslator;
use crate::error::ConnectorError;

/// Default page size when neither `limit` nor `page` is given.
pub const DEFAULT_LIMIT: usize = 20;

/// A single filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

macro_rules! scalar_from {
    ($variant:ident: $($ty:ty => $conv:expr),+ $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant($conv(value))
                }
            }

            impl From<$ty> for FilterValue {
                fn from(value: $ty) -> Self {
                    FilterValue::Scalar(Scalar::from(value))
                }
            }
        )+
    };
}

scalar_from!(Bool: bool => |v| v);
scalar_from!(Int: i32 => i64::from, i64 => |v| v, u32 => i64::from);
scalar_from!(Float: f32 => f64::from, f64 => |v| v);
scalar_from!(Text: &str => str::to_string, String => |v| v, &String => |v: &String| v.clone());

/// The right-hand side of a where leaf.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    List(Vec<Scalar>),
    Scalar(Scalar),
    /// Operators like `IS EMPTY` take no value
    #[default]
    None,
}

impl From<Scalar> for FilterValue {
    fn from(value: Scalar) -> Self {
        FilterValue::Scalar(value)
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>, const N: usize> From<[T; N]> for FilterValue {
    fn from(values: [T; N]) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Filter operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT IN")]
    NotIn,
    /// Document must match every listed value
    #[serde(rename = "MATCHES")]
    Matches,
    #[serde(rename = "IS EMPTY")]
    IsEmpty,
    #[serde(rename = "IS NOT EMPTY")]
    IsNotEmpty,
    #[serde(rename = "IS NULL")]
    IsNull,
    #[serde(rename = "IS NOT NULL")]
    IsNotNull,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Matches => "MATCHES",
            Self::IsEmpty => "IS EMPTY",
            Self::IsNotEmpty => "IS NOT EMPTY",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Operators that render without a right-hand value.
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Self::IsEmpty | Self::IsNotEmpty | Self::IsNull | Self::IsNotNull
        )
    }

    /// Operators whose value is always a list.
    pub fn takes_list(&self) -> bool {
        matches!(self, Self::In | Self::NotIn | Self::Matches)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::NotEq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            "IN" => Ok(Self::In),
            "NOT IN" => Ok(Self::NotIn),
            "MATCHES" => Ok(Self::Matches),
            "IS EMPTY" => Ok(Self::IsEmpty),
            "IS NOT EMPTY" => Ok(Self::IsNotEmpty),
            "IS NULL" => Ok(Self::IsNull),
            "IS NOT NULL" => Ok(Self::IsNotNull),
            _ => Err(ConnectorError::CannotParseWhereClause(format!(
                "unknown operator '{}'",
                s
            ))),
        }
    }
}

/// Boolean joiner between sibling clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connective {
    #[default]
    And,
    Or,
}

impl Connective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connective {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(ConnectorError::InvalidWhereBoolean(s.to_string())),
        }
    }
}

/// Leaf clause: `'column' OP value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereLeaf {
    pub column: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: FilterValue,
    #[serde(default)]
    pub connective: Connective,
}

impl WhereLeaf {
    /// Create a validated leaf.
    ///
    /// A scalar given to a list operator (`IN`, `NOT IN`, `MATCHES`) is
    /// wrapped into a one-element list.
    pub fn new(
        column: impl Into<String>,
        operator: Operator,
        value: FilterValue,
        connective: Connective,
    ) -> Result<Self, ConnectorError> {
        let value = match value {
            FilterValue::Scalar(scalar) if operator.takes_list() => FilterValue::List(vec![scalar]),
            other => other,
        };
        let leaf = Self {
            column: column.into(),
            operator,
            value,
            connective,
        };
        leaf.validate()?;
        Ok(leaf)
    }

    /// Check the leaf is well formed: a named column, a value present
    /// exactly when the operator needs one, and no NaN or infinite floats.
    pub fn validate(&self) -> Result<(), ConnectorError> {
        let renderable = |scalar: &Scalar| !matches!(scalar, Scalar::Float(f) if !f.is_finite());
        let well_formed = !self.column.is_empty()
            && match (&self.value, self.operator.is_unary()) {
                (FilterValue::None, unary) => unary,
                (_, true) => false,
                (FilterValue::Scalar(scalar), false) => renderable(scalar),
                (FilterValue::List(values), false) => values.iter().all(renderable),
            };
        if well_formed {
            Ok(())
        } else {
            Err(malformed(&WhereNode::Leaf(self.clone())))
        }
    }
}

/// Parenthesized group of clauses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WhereGroup {
    pub children: Vec<WhereNode>,
    #[serde(default)]
    pub connective: Connective,
    /// Omitted when compiling filters for facet metadata
    #[serde(default)]
    pub metadata_exclude: bool,
}

/// Where-tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WhereNode {
    Leaf(WhereLeaf),
    Group(WhereGroup),
}

impl WhereNode {
    pub fn connective(&self) -> Connective {
        match self {
            Self::Leaf(leaf) => leaf.connective,
            Self::Group(group) => group.connective,
        }
    }
}

pub(crate) fn malformed(node: &WhereNode) -> ConnectorError {
    let rendered = serde_json::to_string(node).unwrap_or_else(|_| format!("{:?}", node));
    ConnectorError::CannotParseWhereClause(rendered)
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for Direction {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ConnectorError::InvalidOrdering(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub field: String,
    pub direction: Direction,
}

/// Ordered list of sort entries
pub type OrderSpec = Vec<OrderEntry>;

/// Immutable search query, produced by [`QueryBuilder::build`].
///
/// Variants (metadata companions, random-sample point queries) are derived
/// from a shared reference, never by mutating the original.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub(crate) index: String,
    pub(crate) search: String,
    pub(crate) wheres: Vec<WhereNode>,
    pub(crate) order: OrderSpec,
    pub(crate) facets: Vec<String>,
    pub(crate) limit: usize,
    pub(crate) offset: usize,
    pub(crate) page: Option<usize>,
    pub(crate) hits_per_page: Option<usize>,
    pub(crate) random_order: bool,
    pub(crate) metadata_split: bool,
    pub(crate) attributes_to_search_on: Option<Vec<String>>,
}

impl Query {
    fn empty(index: String) -> Self {
        Self {
            index,
            search: String::new(),
            wheres: Vec::new(),
            order: Vec::new(),
            facets: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
            page: None,
            hits_per_page: None,
            random_order: false,
            metadata_split: false,
            attributes_to_search_on: None,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn wheres(&self) -> &[WhereNode] {
        &self.wheres
    }

    pub fn order(&self) -> &[OrderEntry] {
        &self.order
    }

    pub fn facets(&self) -> &[String] {
        &self.facets
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page(&self) -> Option<usize> {
        self.page
    }

    pub fn hits_per_page(&self) -> Option<usize> {
        self.hits_per_page
    }

    pub fn is_random_order(&self) -> bool {
        self.random_order
    }

    pub fn has_metadata_split(&self) -> bool {
        self.metadata_split
    }

    pub fn attributes_to_search_on(&self) -> Option<&[String]> {
        self.attributes_to_search_on.as_deref()
    }

    /// Filters for the main request, with lists rendered as `IN [...]`.
    ///
    /// A connector configured with [`ListRendering::OrChain`] sends what
    /// [`Query::compile_filters_with`] returns for its translator instead.
    ///
    /// [`ListRendering::OrChain`]: super::ListRendering::OrChain
    pub fn compile_filters(&self) -> Result<Vec<String>, ConnectorError> {
        self.compile_filters_with(&FilterTranslator::default())
    }

    /// Filters for the main request as `translator` renders them.
    pub fn compile_filters_with(&self, translator: &FilterTranslator) -> Result<Vec<String>, ConnectorError> {
        Ok(translator.translate(&self.wheres, CompileMode::Normal)?.expressions)
    }

    /// Filters with every `keep_facets_in_metadata` group dropped.
    /// Lists render as membership.
    pub fn compile_metadata_filters(&self) -> Result<Vec<String>, ConnectorError> {
        Ok(FilterTranslator::default()
            .translate(&self.wheres, CompileMode::Metadata)?
            .expressions)
    }

    /// Filters with every leaf on `column` dropped. Lists render as
    /// membership.
    pub fn compile_filters_excluding(&self, column: &str) -> Result<Vec<String>, ConnectorError> {
        Ok(FilterTranslator::default()
            .translate(&self.wheres, CompileMode::ExcludeColumn(column))?
            .expressions)
    }

    pub fn compile_order(&self) -> Vec<String> {
        OrderTranslator::translate(&self.order)
    }

    /// Distinct columns referenced by the where-tree.
    pub fn filter_columns(&self) -> Result<FilterColumns, ConnectorError> {
        Ok(FilterTranslator::default()
            .translate(&self.wheres, CompileMode::Normal)?
            .columns)
    }
}

/// Clause-accumulating operations shared by every builder scope.
///
/// Implementors only decide which nodes their scope accepts; the sugar
/// methods are provided.
pub trait WhereClauses: Sized {
    /// Append a node to this scope.
    fn where_node(self, node: WhereNode) -> Result<Self, ConnectorError>;

    /// `'column' operator value`, joined with AND.
    fn filter(
        self,
        column: impl Into<String>,
        operator: &str,
        value: impl Into<FilterValue>,
    ) -> Result<Self, ConnectorError> {
        self.filter_with(column, operator, value, "AND")
    }

    /// Like [`filter`](Self::filter) with an explicit boolean (`AND`/`OR`).
    fn filter_with(
        self,
        column: impl Into<String>,
        operator: &str,
        value: impl Into<FilterValue>,
        boolean: &str,
    ) -> Result<Self, ConnectorError> {
        let connective = boolean.parse::<Connective>()?;
        let operator = operator.parse::<Operator>()?;
        let leaf = WhereLeaf::new(column, operator, value.into(), connective)?;
        self.where_node(WhereNode::Leaf(leaf))
    }

    /// Operator-only clause such as `IS EMPTY`.
    fn filter_unary(self, column: impl Into<String>, operator: &str) -> Result<Self, ConnectorError> {
        self.filter(column, operator, FilterValue::None)
    }

    /// Column matches at least one of the values. An empty list adds nothing.
    fn filter_in<V: Into<Scalar>>(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, ConnectorError> {
        list_clause(self, column, Operator::In, values)
    }

    /// Column matches none of the values. An empty list adds nothing.
    fn filter_not_in<V: Into<Scalar>>(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, ConnectorError> {
        list_clause(self, column, Operator::NotIn, values)
    }

    /// Column matches every value. An empty list adds nothing.
    fn filter_matches<V: Into<Scalar>>(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, ConnectorError> {
        list_clause(self, column, Operator::Matches, values)
    }

    fn filter_empty(self, column: impl Into<String>) -> Result<Self, ConnectorError> {
        unary_clause(self, column, Operator::IsEmpty)
    }

    fn filter_not_empty(self, column: impl Into<String>) -> Result<Self, ConnectorError> {
        unary_clause(self, column, Operator::IsNotEmpty)
    }

    fn filter_null(self, column: impl Into<String>) -> Result<Self, ConnectorError> {
        unary_clause(self, column, Operator::IsNull)
    }

    fn filter_not_null(self, column: impl Into<String>) -> Result<Self, ConnectorError> {
        unary_clause(self, column, Operator::IsNotNull)
    }

    /// Nested group joined with AND. The closure receives a
    /// [`GroupBuilder`], the only scope where OR is available.
    fn filter_group<F>(self, build: F) -> Result<Self, ConnectorError>
    where
        F: FnOnce(GroupBuilder) -> Result<GroupBuilder, ConnectorError>,
    {
        let group = build(GroupBuilder::default())?.into_group(Connective::And, false);
        self.where_node(WhereNode::Group(group))
    }
}

fn list_clause<B: WhereClauses, V: Into<Scalar>>(
    builder: B,
    column: impl Into<String>,
    operator: Operator,
    values: impl IntoIterator<Item = V>,
) -> Result<B, ConnectorError> {
    let values: Vec<Scalar> = values.into_iter().map(Into::into).collect();
    if values.is_empty() {
        return Ok(builder);
    }
    let leaf = WhereLeaf::new(column, operator, FilterValue::List(values), Connective::And)?;
    builder.where_node(WhereNode::Leaf(leaf))
}

fn unary_clause<B: WhereClauses>(
    builder: B,
    column: impl Into<String>,
    operator: Operator,
) -> Result<B, ConnectorError> {
    let leaf = WhereLeaf::new(column, operator, FilterValue::None, Connective::And)?;
    builder.where_node(WhereNode::Leaf(leaf))
}

fn push_and_only(nodes: &mut Vec<WhereNode>, node: WhereNode) -> Result<(), ConnectorError> {
    if node.connective() == Connective::Or {
        return Err(ConnectorError::OrWhereTopLevelNotSupported);
    }
    validate_tree(&node)?;
    nodes.push(node);
    Ok(())
}

fn validate_tree(node: &WhereNode) -> Result<(), ConnectorError> {
    match node {
        WhereNode::Leaf(leaf) => leaf.validate(),
        WhereNode::Group(group) => group.children.iter().try_for_each(validate_tree),
    }
}

/// Scope inside a nested group: accepts AND and OR clauses.
#[derive(Debug, Clone, Default)]
pub struct GroupBuilder {
    nodes: Vec<WhereNode>,
}

impl GroupBuilder {
    /// `'column' operator value`, joined with OR.
    pub fn or_filter(
        self,
        column: impl Into<String>,
        operator: &str,
        value: impl Into<FilterValue>,
    ) -> Result<Self, ConnectorError> {
        self.filter_with(column, operator, value, "OR")
    }

    /// Nested group joined with OR.
    pub fn or_filter_group<F>(self, build: F) -> Result<Self, ConnectorError>
    where
        F: FnOnce(GroupBuilder) -> Result<GroupBuilder, ConnectorError>,
    {
        let group = build(GroupBuilder::default())?.into_group(Connective::Or, false);
        self.where_node(WhereNode::Group(group))
    }

    fn into_group(self, connective: Connective, metadata_exclude: bool) -> WhereGroup {
        WhereGroup {
            children: self.nodes,
            connective,
            metadata_exclude,
        }
    }
}

impl WhereClauses for GroupBuilder {
    fn where_node(mut self, node: WhereNode) -> Result<Self, ConnectorError> {
        validate_tree(&node)?;
        self.nodes.push(node);
        Ok(self)
    }
}

/// Scope handed to [`QueryBuilder::keep_facets_in_metadata`]: AND only.
#[derive(Debug, Clone, Default)]
pub struct ClauseBuilder {
    nodes: Vec<WhereNode>,
}

impl WhereClauses for ClauseBuilder {
    fn where_node(mut self, node: WhereNode) -> Result<Self, ConnectorError> {
        push_and_only(&mut self.nodes, node)?;
        Ok(self)
    }
}

/// Fluent accumulator for a [`Query`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Create a new query builder for an index
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            query: Query::empty(index.into()),
        }
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.query.index = index.into();
        self
    }

    /// Full-text search terms
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.query.search = text.into();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = offset;
        self
    }

    /// Switch to page-based pagination. Limit/offset are kept but ignored
    /// at execution while a page is set.
    pub fn page(mut self, page: usize) -> Self {
        self.query.page = Some(page);
        self
    }

    pub fn hits_per_page(mut self, hits_per_page: usize) -> Self {
        self.query.hits_per_page = Some(hits_per_page);
        self
    }

    /// Ascending order on `field`.
    pub fn order_by(self, field: impl Into<String>) -> Result<Self, ConnectorError> {
        self.order_by_with(field, "asc")
    }

    pub fn order_by_desc(self, field: impl Into<String>) -> Result<Self, ConnectorError> {
        self.order_by_with(field, "desc")
    }

    /// Order on `field` with a textual direction (`asc` / `desc`).
    pub fn order_by_with(
        self,
        field: impl Into<String>,
        direction: &str,
    ) -> Result<Self, ConnectorError> {
        self.order_by_fields([field], direction)
    }

    /// Order on several fields, all in the same direction.
    pub fn order_by_fields<F: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = F>,
        direction: &str,
    ) -> Result<Self, ConnectorError> {
        if self.query.random_order {
            return Err(ConnectorError::CannotOrderAfterRandomOrder);
        }
        let direction = direction.parse::<Direction>()?;
        self.query
            .order
            .extend(fields.into_iter().map(|field| OrderEntry {
                field: field.into(),
                direction,
            }));
        Ok(self)
    }

    /// Return `limit` documents sampled uniformly from all matches.
    pub fn in_random_order(mut self) -> Self {
        self.query.random_order = true;
        self
    }

    pub fn set_facets<F: Into<String>>(mut self, facets: impl IntoIterator<Item = F>) -> Self {
        self.query.facets = facets.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_facet(mut self, facet: impl Into<String>) -> Self {
        self.query.facets.push(facet.into());
        self
    }

    /// Restrict full-text search to these attributes.
    pub fn attributes_to_search_on<A: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = A>,
    ) -> Self {
        self.query.attributes_to_search_on = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Filter hits on the closure's clauses while keeping facet counts as if
    /// they were absent.
    ///
    /// The clauses land in the main filter list as one group; metadata
    /// filters skip it, and the search is split into a main query plus
    /// facet companion queries.
    pub fn keep_facets_in_metadata<F>(mut self, build: F) -> Result<Self, ConnectorError>
    where
        F: FnOnce(ClauseBuilder) -> Result<ClauseBuilder, ConnectorError>,
    {
        let clauses = build(ClauseBuilder::default())?;
        self.query.metadata_split = true;
        self.query.wheres.push(WhereNode::Group(WhereGroup {
            children: clauses.nodes,
            connective: Connective::And,
            metadata_exclude: true,
        }));
        Ok(self)
    }

    /// Apply `build` only when `condition` holds.
    pub fn when<F>(self, condition: bool, build: F) -> Result<Self, ConnectorError>
    where
        F: FnOnce(Self) -> Result<Self, ConnectorError>,
    {
        if condition {
            build(self)
        } else {
            Ok(self)
        }
    }

    /// Finish the query.
    pub fn build(self) -> Result<Query, ConnectorError> {
        if self.query.index.is_empty() {
            return Err(ConnectorError::IndexNotSupplied);
        }
        Ok(self.query)
    }
}

impl WhereClauses for QueryBuilder {
    fn where_node(mut self, node: WhereNode) -> Result<Self, ConnectorError> {
        push_and_only(&mut self.query.wheres, node)?;
        Ok(self)
    }
}
