//! Recursive filter node translation.
//!
//! Every function returns `(sql, values, bound)`: the condition fragment, the
//! values bound by it in placeholder order, and the number of values bound so
//! far. Placeholder numbers are `start + offset` and are computed only when a
//! value is actually bound.
//!
//! Depth counts objects and arrays from the root object at depth 1.

use crate::column::{ColumnKind, ColumnRef, ColumnResolver};
use crate::config::ConverterConfig;
use crate::validate::check_identifier;
use crate::{FilterError, FilterValue, Operator, Value};
use std::collections::BTreeMap;

type Translated = (String, Vec<Value>, usize);

type Node = BTreeMap<String, FilterValue>;

/// Join fragments, parenthesizing only when there is more than one.
fn join(conditions: Vec<String>, separator: &str) -> String {
    match <[String; 1]>::try_from(conditions) {
        Ok([single]) => single,
        Err(many) => format!("({})", many.join(separator)),
    }
}

fn invalid_comparison() -> FilterError {
    FilterError::schema("invalid comparison value (must be a primitive)")
}

/// Walks a filter tree against one converter configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Translator<'a> {
    config: &'a ConverterConfig,
    columns: ColumnResolver<'a>,
    start: usize,
}

impl<'a> Translator<'a> {
    /// A translator numbering placeholders from `$start`.
    pub(crate) const fn new(config: &'a ConverterConfig, start: usize) -> Self {
        Self {
            config,
            columns: ColumnResolver::new(config),
            start,
        }
    }

    /// Translate a root filter object.
    pub(crate) fn translate(&self, node: &Node) -> Result<Translated, FilterError> {
        self.translate_node(node, 0, 1)
    }

    /// Placeholder for the value bound after `offset` others.
    fn param(&self, offset: usize) -> Result<String, FilterError> {
        let idx = self.start.checked_add(offset).ok_or_else(|| {
            FilterError::InvalidConfiguration("parameter index overflow".to_string())
        })?;
        Ok(format!("${idx}"))
    }

    fn check_depth(&self, depth: usize) -> Result<(), FilterError> {
        if depth > self.config.max_depth {
            return Err(FilterError::too_deep(self.config.max_depth));
        }
        Ok(())
    }

    /// Translate a filter node: logical operators and fields, AND-joined.
    fn translate_node(&self, node: &Node, offset: usize, depth: usize) -> Result<Translated, FilterError> {
        self.check_depth(depth)?;
        if node.is_empty() {
            return Err(FilterError::schema("empty objects not allowed"));
        }

        let mut bound = offset;
        let mut all_params = Vec::new();
        let mut conditions = Vec::with_capacity(node.len());

        for (key, value) in node {
            let (condition, params, new_bound) = match Operator::from_mongo(key) {
                Some(op @ (Operator::Or | Operator::And | Operator::Nor)) => {
                    self.translate_group(op, value, bound, depth)?
                },
                Some(Operator::Not) => self.translate_not(value, bound, depth)?,
                // Scalar operators are not valid here and fail as field names.
                _ => self.translate_field(key, value, bound, depth)?,
            };
            conditions.push(condition);
            all_params.extend(params);
            bound = new_bound;
        }

        Ok((join(conditions, " AND "), all_params, bound))
    }

    /// `$or`, `$and`, `$nor` over an array of nodes.
    fn translate_group(
        &self,
        op: Operator,
        value: &FilterValue,
        offset: usize,
        depth: usize,
    ) -> Result<Translated, FilterError> {
        let members = value.as_object_array().ok_or_else(|| {
            FilterError::schema(format!(
                "invalid value for {} operator (must be array of objects)",
                op.as_mongo()
            ))
        })?;
        self.check_depth(depth + 1)?;
        if members.is_empty() {
            return Err(FilterError::schema("empty arrays not allowed"));
        }

        let mut bound = offset;
        let mut all_params = Vec::new();
        let mut conditions = Vec::with_capacity(members.len());

        for member in members {
            let (condition, params, new_bound) = self.translate_node(member, bound, depth + 2)?;
            conditions.push(condition);
            all_params.extend(params);
            bound = new_bound;
        }

        let sql = match op {
            Operator::Nor => format!("NOT ({})", conditions.join(" OR ")),
            Operator::Or => join(conditions, " OR "),
            _ => join(conditions, " AND "),
        };

        Ok((sql, all_params, bound))
    }

    /// `$not`: a NULL inner result counts as false, so the negation is true.
    fn translate_not(&self, value: &FilterValue, offset: usize, depth: usize) -> Result<Translated, FilterError> {
        let FilterValue::Object(inner) = value else {
            return Err(FilterError::schema(
                "invalid value for $not operator (must be object)",
            ));
        };
        let (condition, params, bound) = self.translate_node(inner, offset, depth + 1)?;
        Ok((format!("(NOT COALESCE({condition}, FALSE))"), params, bound))
    }

    /// Validate, access-check and resolve a user supplied field name.
    pub(crate) fn user_column(&self, field: &str) -> Result<ColumnRef, FilterError> {
        check_identifier(field)?;
        if field == self.config.placeholder_name {
            return Err(FilterError::InvalidIdentifier(field.to_string()));
        }
        self.config.access.check(field)?;
        Ok(self.columns.resolve(field))
    }

    fn translate_field(
        &self,
        field: &str,
        value: &FilterValue,
        offset: usize,
        depth: usize,
    ) -> Result<Translated, FilterError> {
        let column = self.user_column(field)?;
        tracing::trace!(field, kind = ?column.kind, "translating field");
        self.translate_field_value(field, &column, value, offset, depth + 1)
    }

    /// The value of a field: operator object, null, or a scalar to match.
    ///
    /// `depth` is the depth `value` sits at when it is an object.
    fn translate_field_value(
        &self,
        field: &str,
        column: &ColumnRef,
        value: &FilterValue,
        offset: usize,
        depth: usize,
    ) -> Result<Translated, FilterError> {
        match value {
            FilterValue::Object(ops) => self.translate_operators(field, column, ops, offset, depth),
            FilterValue::Null => Ok((self.null_condition(field, column), vec![], offset)),
            FilterValue::Array(_) => Err(invalid_comparison()),
            scalar => self.compare_value(column, Operator::Eq, scalar, offset),
        }
    }

    /// The JSONB column `field` lives in, if `column` is a nested reference.
    fn nested_of(&self, field: &str, column: &ColumnRef) -> Option<&'a str> {
        if column.is_nested() {
            self.columns.nested_column(field)
        } else {
            None
        }
    }

    /// A missing JSONB key also reads as NULL, so nested fields must exist.
    fn null_condition(&self, field: &str, column: &ColumnRef) -> String {
        match self.nested_of(field, column) {
            Some(nested) => format!(
                "({} AND {} IS NULL)",
                ColumnResolver::key_exists(nested, field),
                column.sql
            ),
            None => format!("({} IS NULL)", column.sql),
        }
    }

    fn translate_operators(
        &self,
        field: &str,
        column: &ColumnRef,
        ops: &Node,
        offset: usize,
        depth: usize,
    ) -> Result<Translated, FilterError> {
        self.check_depth(depth)?;
        if ops.is_empty() {
            return Err(FilterError::schema("empty objects not allowed"));
        }

        let mut bound = offset;
        let mut all_params = Vec::new();
        let mut conditions = Vec::with_capacity(ops.len());

        for (key, operand) in ops {
            let op = Operator::from_mongo(key)
                .ok_or_else(|| FilterError::UnknownOperator(key.clone()))?;

            let (condition, params, new_bound) = match op {
                op if op.is_logical() => {
                    return Err(FilterError::schema(format!(
                        "{key} as scalar operator not supported"
                    )));
                },
                Operator::In | Operator::NotIn => self.translate_in(op, column, operand, bound)?,
                Operator::Exists => (self.translate_exists(field, column, operand)?, vec![], bound),
                Operator::ElemMatch => {
                    self.translate_elem_match(field, column, operand, bound, depth + 1)?
                },
                Operator::Field => {
                    let FilterValue::String(other) = operand else {
                        return Err(FilterError::schema(
                            "invalid value for $field operator (must be string)",
                        ));
                    };
                    (self.compare_columns(column, Operator::Eq, other)?, vec![], bound)
                },
                _ => self.translate_comparison(op, column, operand, bound)?,
            };
            conditions.push(condition);
            all_params.extend(params);
            bound = new_bound;
        }

        Ok((join(conditions, " AND "), all_params, bound))
    }

    /// `$in` / `$nin`: the whole array binds as one parameter.
    fn translate_in(
        &self,
        op: Operator,
        column: &ColumnRef,
        operand: &FilterValue,
        offset: usize,
    ) -> Result<Translated, FilterError> {
        let elements: Vec<Value> = match operand {
            FilterValue::Array(items) if operand.is_scalar_array() => {
                items.iter().filter_map(Value::from_scalar).collect()
            },
            _ => {
                return Err(FilterError::schema(format!(
                    "invalid value for {} operator (must be array of primitives)",
                    op.as_mongo()
                )));
            },
        };
        let param_value = match self.config.array_encoder() {
            Some(encoder) => encoder.encode(elements),
            None => Value::Array(elements),
        };
        let negate = if op == Operator::NotIn { "NOT " } else { "" };
        let sql = format!("({negate}{} = ANY({}))", column.sql, self.param(offset)?);
        Ok((sql, vec![param_value], offset + 1))
    }

    fn translate_exists(
        &self,
        field: &str,
        column: &ColumnRef,
        operand: &FilterValue,
    ) -> Result<String, FilterError> {
        let Some(nested) = self.nested_of(field, column) else {
            return Err(FilterError::schema(
                "$exists operator not supported on non-nested jsonb columns",
            ));
        };
        let negate = if matches!(operand, FilterValue::Bool(false)) {
            "NOT "
        } else {
            ""
        };
        Ok(format!("({negate}{})", ColumnResolver::key_exists(nested, field)))
    }

    /// `$elemMatch`: EXISTS over the unnested array elements.
    fn translate_elem_match(
        &self,
        field: &str,
        column: &ColumnRef,
        operand: &FilterValue,
        offset: usize,
        depth: usize,
    ) -> Result<Translated, FilterError> {
        if column.kind == ColumnKind::Element {
            return Err(FilterError::schema("nested $elemMatch not supported"));
        }

        let alias = &self.config.placeholder_name;
        let element = self.columns.element();
        let (inner, params, bound) = self.translate_field_value(alias, &element, operand, offset, depth)?;

        let source = match self.nested_of(field, column) {
            Some(nested) => format!(
                "jsonb_array_elements({})",
                ColumnResolver::nested_json(nested, field)
            ),
            None => format!("unnest({})", column.sql),
        };

        Ok((
            format!("EXISTS (SELECT 1 FROM {source} AS {alias} WHERE {inner})"),
            params,
            bound,
        ))
    }

    /// `$gt $gte $lt $lte $eq $ne $regex` against a scalar or `{"$field": ..}`.
    fn translate_comparison(
        &self,
        op: Operator,
        column: &ColumnRef,
        operand: &FilterValue,
        offset: usize,
    ) -> Result<Translated, FilterError> {
        match operand {
            FilterValue::Object(obj) => match (obj.len(), obj.get(Operator::Field.as_mongo())) {
                (1, Some(FilterValue::String(other))) => {
                    Ok((self.compare_columns(column, op, other)?, vec![], offset))
                },
                _ => Err(FilterError::schema(format!(
                    "invalid value for {} operator (must be object with $field key only)",
                    op.as_mongo()
                ))),
            },
            FilterValue::Array(_) => Err(invalid_comparison()),
            scalar => self.compare_value(column, op, scalar, offset),
        }
    }

    /// Column-to-column comparison. Both sides are user supplied fields.
    fn compare_columns(&self, left: &ColumnRef, op: Operator, other: &str) -> Result<String, FilterError> {
        let symbol = Self::symbol(op)?;
        let right = self.user_column(other)?;
        let sql = if op.is_ordering() {
            format!(
                "({} {symbol} {})",
                left.numeric_if_nested(),
                right.numeric_if_nested()
            )
        } else {
            format!("({} {symbol} {})", left.sql, right.sql)
        };
        Ok(sql)
    }

    /// Compare against one bound scalar.
    fn compare_value(
        &self,
        column: &ColumnRef,
        op: Operator,
        operand: &FilterValue,
        offset: usize,
    ) -> Result<Translated, FilterError> {
        let symbol = Self::symbol(op)?;
        let value = Value::from_scalar(operand).ok_or_else(invalid_comparison)?;
        let left = if operand.is_numeric() && op.casts_numeric_operand() {
            column.numeric_if_nested()
        } else {
            column.sql.clone()
        };
        Ok((format!("({left} {symbol} {})", self.param(offset)?), vec![value], offset + 1))
    }

    fn symbol(op: Operator) -> Result<&'static str, FilterError> {
        op.sql_symbol()
            .ok_or_else(|| FilterError::UnknownOperator(op.as_mongo().to_string()))
    }
}
