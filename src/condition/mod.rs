//! The condition engine.
//!
//! Evaluates a list of [`TaskCondition`]s against live objects in the store
//! and answers one question: do they all hold right now? Absence of a
//! referenced object is a normal negative result (or a positive one under
//! `notExists`); malformed input — empty condition list, unresolvable type,
//! unknown operator, non-integer comparand — is always an error, never a
//! silent `false`.

pub mod path;

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::api::meta::ObjectKey;
use crate::api::task_definition::{ResourceCondition, TaskCondition};
use crate::store::{ObjectStore, StoreError};

use path::FieldValue;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConditionError {
    /// The caller must supply at least one condition.
    #[error("no checks to apply")]
    NoConditions,

    /// A condition without apiVersion or kind cannot address anything.
    #[error("condition needs a non-empty apiVersion and kind")]
    UnresolvableType,

    #[error("invalid operator `{0}`")]
    InvalidOperator(String),

    /// `lt`/`gt` need both sides to parse as base-10 integers.
    #[error("operator `{operator}` needs an integer, got `{value}`")]
    NonIntegerComparand { operator: String, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Predicate operators, parsed from their wire strings at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Neq,
    Lt,
    Gt,
    Contains,
    Nil,
    NotNil,
}

impl FromStr for Operator {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Operator::Eq),
            "neq" => Ok(Operator::Neq),
            "lt" => Ok(Operator::Lt),
            "gt" => Ok(Operator::Gt),
            "contains" => Ok(Operator::Contains),
            "nil" => Ok(Operator::Nil),
            "notnil" => Ok(Operator::NotNil),
            other => Err(ConditionError::InvalidOperator(other.to_string())),
        }
    }
}

/// Runs condition checks against the injected store.
pub struct ConditionChecker {
    store: Arc<dyn ObjectStore>,
}

impl ConditionChecker {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Apply all conditions; true iff every one of them holds.
    /// Short-circuits on the first `false` or the first error.
    pub async fn apply_checks(
        &self,
        conditions: &[TaskCondition],
    ) -> Result<bool, ConditionError> {
        if conditions.is_empty() {
            return Err(ConditionError::NoConditions);
        }
        for condition in conditions {
            if !self.check_condition(condition).await? {
                tracing::debug!(
                    kind = %condition.kind,
                    name = %condition.name,
                    "condition not satisfied"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn check_condition(&self, condition: &TaskCondition) -> Result<bool, ConditionError> {
        if condition.api_version.is_empty() || condition.kind.is_empty() {
            return Err(ConditionError::UnresolvableType);
        }
        let gvk = condition.gvk();
        let namespace = (!condition.namespace.is_empty()).then(|| condition.namespace.clone());

        if condition.not_exists {
            let key = ObjectKey::new(gvk, namespace, condition.name.clone());
            return match self.store.get(&key).await {
                Ok(_) => Ok(false),
                Err(StoreError::NotFound) => Ok(true),
                Err(err) => Err(err.into()),
            };
        }

        if !condition.name.is_empty() {
            let key = ObjectKey::new(gvk, namespace, condition.name.clone());
            let object = match self.store.get(&key).await {
                Ok(object) => object,
                Err(StoreError::NotFound) => return Ok(false),
                Err(err) => return Err(err.into()),
            };
            return evaluate_all(&condition.resource_condition, object.value());
        }

        // collection target
        let items = match self.store.list(&gvk, namespace.as_deref()).await {
            Ok(items) => items,
            Err(StoreError::NotFound) => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        if condition.match_all {
            // zero matched objects do not vacuously satisfy matchAll
            if items.is_empty() {
                return Ok(false);
            }
            for item in &items {
                if !evaluate_all(&condition.resource_condition, item.value())? {
                    return Ok(false);
                }
            }
            Ok(true)
        } else {
            for item in &items {
                if evaluate_all(&condition.resource_condition, item.value())? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// AND over the predicates for one object. An empty predicate list means
/// existence alone satisfies the condition.
fn evaluate_all(
    predicates: &[ResourceCondition],
    document: &Value,
) -> Result<bool, ConditionError> {
    for predicate in predicates {
        if !evaluate(predicate, document)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn evaluate(predicate: &ResourceCondition, document: &Value) -> Result<bool, ConditionError> {
    let operator: Operator = predicate.operator.parse()?;
    let field = path::resolve(document, &predicate.field);

    match operator {
        Operator::Nil => Ok(field.is_none()),
        Operator::NotNil => Ok(field.is_some()),
        Operator::Eq => Ok(rendered(&field) == predicate.value),
        Operator::Neq => Ok(rendered(&field) != predicate.value),
        Operator::Contains => Ok(rendered(&field).contains(&predicate.value)),
        Operator::Lt | Operator::Gt => {
            let wanted: i64 =
                predicate
                    .value
                    .parse()
                    .map_err(|_| ConditionError::NonIntegerComparand {
                        operator: predicate.operator.clone(),
                        value: predicate.value.clone(),
                    })?;
            let actual = integer_field(&field, predicate)?;
            Ok(match operator {
                Operator::Lt => actual < wanted,
                _ => actual > wanted,
            })
        }
    }
}

fn rendered(field: &Option<FieldValue>) -> String {
    field.as_ref().map(FieldValue::render).unwrap_or_default()
}

/// Integer view of the extracted field: absent counts as zero, a present
/// but non-numeric value is an error.
fn integer_field(
    field: &Option<FieldValue>,
    predicate: &ResourceCondition,
) -> Result<i64, ConditionError> {
    match field {
        None => Ok(0),
        Some(value) => value
            .as_int()
            .ok_or_else(|| ConditionError::NonIntegerComparand {
                operator: predicate.operator.clone(),
                value: value.render(),
            }),
    }
}
