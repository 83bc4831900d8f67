//! Filter Translator
//!
//! Translates the where-tree to the engine's filter-expression grammar.
//!
//! # Filter Syntax
//!
//! ```text
//! 'field' = 'value'               - Comparison (=, !=, >, >=, <, <=)
//! 'field' IN ['a','b']            - Membership
//! 'field' NOT IN ['a','b']        - Negated membership
//! ('field' = 'a' AND 'field' = 'b') - MATCHES: every value
//! 'field' IS EMPTY                - Unary (IS [NOT] EMPTY, IS [NOT] NULL)
//! (expr OR expr AND expr)         - Grouping, joined on each clause's boolean
//! ```
//!
//! Each top-level node yields at most one expression; the engine ANDs the
//! resulting list.

use serde::{Deserialize, Serialize};

use super::query_builder::{
    malformed, Connective, FilterValue, Operator, Scalar, WhereGroup, WhereLeaf, WhereNode,
};
use crate::error::ConnectorError;

/// How list values for `IN`-like operators are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListRendering {
    /// `'c' IN [a,b]` / `'c' NOT IN [a,b]`
    #[default]
    Membership,
    /// `('c' = a OR 'c' = b)` / `('c' != a AND 'c' != b)`
    OrChain,
}

/// Which parts of the tree a compile pass keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode<'a> {
    /// Everything
    Normal,
    /// Drop every leaf on this column
    ExcludeColumn(&'a str),
    /// Drop `metadata_exclude` groups
    Metadata,
}

/// Distinct filtered columns, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterColumns {
    /// Columns outside metadata-excluded groups
    pub query: Vec<String>,
    /// Columns inside metadata-excluded groups
    pub metadata: Vec<String>,
}

impl FilterColumns {
    fn record(&mut self, column: &str, in_metadata_group: bool) {
        let target = if in_metadata_group {
            &mut self.metadata
        } else {
            &mut self.query
        };
        if !target.iter().any(|c| c == column) {
            target.push(column.to_string());
        }
    }

    /// Query columns followed by metadata-only columns, without repeats.
    pub fn all(&self) -> Vec<String> {
        let mut all = self.query.clone();
        for column in &self.metadata {
            if !all.contains(column) {
                all.push(column.clone());
            }
        }
        all
    }

    /// Columns that appear only inside metadata-excluded groups.
    pub fn metadata_only(&self) -> Vec<String> {
        self.metadata
            .iter()
            .filter(|c| !self.query.contains(c))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilters {
    pub expressions: Vec<String>,
    pub columns: FilterColumns,
}

/// Filter expression translator
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterTranslator {
    list_rendering: ListRendering,
}

struct Pass<'a> {
    mode: CompileMode<'a>,
    columns: FilterColumns,
    in_metadata_group: bool,
}

impl FilterTranslator {
    pub fn new(list_rendering: ListRendering) -> Self {
        Self { list_rendering }
    }

    pub fn list_rendering(&self) -> ListRendering {
        self.list_rendering
    }

    /// Translate top-level nodes to filter expressions.
    pub fn translate(
        &self,
        nodes: &[WhereNode],
        mode: CompileMode<'_>,
    ) -> Result<CompiledFilters, ConnectorError> {
        let mut pass = Pass {
            mode,
            columns: FilterColumns::default(),
            in_metadata_group: false,
        };
        let mut expressions = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(expression) = self.translate_node(node, &mut pass)? {
                expressions.push(expression);
            }
        }
        Ok(CompiledFilters {
            expressions,
            columns: pass.columns,
        })
    }

    fn translate_node(
        &self,
        node: &WhereNode,
        pass: &mut Pass<'_>,
    ) -> Result<Option<String>, ConnectorError> {
        match node {
            WhereNode::Leaf(leaf) => self.translate_leaf(leaf, pass),
            WhereNode::Group(group) => self.translate_group(group, pass),
        }
    }

    fn translate_group(
        &self,
        group: &WhereGroup,
        pass: &mut Pass<'_>,
    ) -> Result<Option<String>, ConnectorError> {
        if group.metadata_exclude && pass.mode == CompileMode::Metadata {
            return Ok(None);
        }

        let outer = pass.in_metadata_group;
        pass.in_metadata_group = outer || group.metadata_exclude;

        let mut expression = String::new();
        let mut result = Ok(());
        for child in &group.children {
            match self.translate_node(child, pass) {
                Ok(Some(part)) => {
                    if !expression.is_empty() {
                        expression.push(' ');
                        expression.push_str(child.connective().as_str());
                        expression.push(' ');
                    }
                    expression.push_str(&part);
                }
                Ok(None) => {}
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        pass.in_metadata_group = outer;
        result?;

        if expression.is_empty() {
            Ok(None)
        } else {
            Ok(Some(format!("({})", expression)))
        }
    }

    fn translate_leaf(
        &self,
        leaf: &WhereLeaf,
        pass: &mut Pass<'_>,
    ) -> Result<Option<String>, ConnectorError> {
        leaf.validate()?;
        if let CompileMode::ExcludeColumn(excluded) = pass.mode {
            if leaf.column == excluded {
                return Ok(None);
            }
        }

        let column = quote(&leaf.column);
        let expression = match &leaf.value {
            FilterValue::None => format!("{} {}", column, leaf.operator),
            FilterValue::List(values) if values.is_empty() => return Ok(None),
            FilterValue::List(values) => {
                let rendered = values
                    .iter()
                    .map(|v| render_scalar(v).ok_or_else(|| malformed(&WhereNode::Leaf(leaf.clone()))))
                    .collect::<Result<Vec<_>, _>>()?;
                self.translate_list(&column, leaf.operator, &rendered)
            }
            FilterValue::Scalar(value) => {
                let rendered =
                    render_scalar(value).ok_or_else(|| malformed(&WhereNode::Leaf(leaf.clone())))?;
                if leaf.operator.takes_list() {
                    self.translate_list(&column, leaf.operator, &[rendered])
                } else {
                    format!("{} {} {}", column, leaf.operator, rendered)
                }
            }
        };

        pass.columns.record(&leaf.column, pass.in_metadata_group);
        Ok(Some(expression))
    }

    fn translate_list(&self, column: &str, operator: Operator, values: &[String]) -> String {
        match (operator, self.list_rendering) {
            (Operator::Matches, _) => chain(column, "=", Connective::And, values),
            (Operator::NotIn, ListRendering::Membership) => {
                format!("{} NOT IN [{}]", column, values.join(","))
            }
            (Operator::NotIn, ListRendering::OrChain) => chain(column, "!=", Connective::And, values),
            (_, ListRendering::Membership) => format!("{} IN [{}]", column, values.join(",")),
            (_, ListRendering::OrChain) => chain(column, "=", Connective::Or, values),
        }
    }
}

fn chain(column: &str, comparison: &str, joiner: Connective, values: &[String]) -> String {
    let parts = values
        .iter()
        .map(|v| format!("{} {} {}", column, comparison, v))
        .collect::<Vec<_>>()
        .join(&format!(" {} ", joiner));
    format!("({})", parts)
}

/// Single-quote a string, escaping backslashes and quotes.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Render a scalar literal. `None` for non-finite floats.
fn render_scalar(value: &Scalar) -> Option<String> {
    match value {
        Scalar::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        Scalar::Int(i) => Some(i.to_string()),
        Scalar::Float(f) if f.is_finite() => Some(f.to_string()),
        Scalar::Float(_) => None,
        Scalar::Text(text) => Some(quote(text)),
    }
}
