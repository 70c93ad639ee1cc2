use std::cmp::Ordering;
use std::ops::Deref;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::job::JobRecord;

/// Comparison used by [`MultiCollection::filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
}

impl Operator {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Gt => ordering == Ordering::Greater,
        }
    }
}

impl FromStr for Operator {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Eq),
            "<" => Ok(Operator::Lt),
            ">" => Ok(Operator::Gt),
            other => Err(AppError::Validation(format!(
                "Unsupported filter operator '{other}', expected one of =, <, >"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl FromStr for Order {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            other => Err(AppError::Validation(format!(
                "Unsupported order '{other}', expected asc or desc"
            ))),
        }
    }
}

/// Jobs and errors gathered from one or more fetch attempts, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultCollection {
    items: Vec<JobRecord>,
    errors: Vec<String>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding a single error and no items.
    pub fn from_error(message: impl Into<String>) -> Self {
        let mut collection = Self::new();
        collection.add_error(message);
        collection
    }

    pub fn add(&mut self, job: JobRecord) -> &mut Self {
        self.items.push(job);
        self
    }

    pub fn add_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors.push(message.into());
        self
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn all(&self) -> &[JobRecord] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobRecord> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Result<&JobRecord, AppError> {
        self.items.get(index).ok_or(AppError::IndexOutOfBounds {
            index,
            len: self.items.len(),
        })
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_parts(self) -> (Vec<JobRecord>, Vec<String>) {
        (self.items, self.errors)
    }
}

impl From<Vec<JobRecord>> for ResultCollection {
    fn from(items: Vec<JobRecord>) -> Self {
        Self {
            items,
            errors: Vec::new(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a JobRecord;
    type IntoIter = std::slice::Iter<'a, JobRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The merged result set across providers.
///
/// Mutating operations either apply completely or, on error, leave the
/// collection exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MultiCollection {
    inner: ResultCollection,
}

impl MultiCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another collection's items and errors after the current ones.
    pub fn append(&mut self, other: ResultCollection) -> &mut Self {
        let (items, errors) = other.into_parts();
        self.inner.items.extend(items);
        self.inner.errors.extend(errors);
        self
    }

    /// Keep the items whose `field` compares to `value` under `operator`.
    ///
    /// Every item must define `field`; a single missing field aborts the
    /// whole filter.
    pub fn filter(
        &mut self,
        field: &str,
        value: &Value,
        operator: Operator,
    ) -> Result<&mut Self, AppError> {
        let keys = self.field_values(field)?;
        let mut keep = keys
            .iter()
            .map(|key| operator.holds(compare_values(key, value)));
        self.inner
            .items
            .retain(|_| keep.next().unwrap_or(false));
        Ok(self)
    }

    /// Stable reorder by `field`; ties keep their relative order.
    pub fn order_by(&mut self, field: &str, order: Order) -> Result<&mut Self, AppError> {
        let keys = self.field_values(field)?;
        let items = std::mem::take(&mut self.inner.items);
        let mut keyed: Vec<(Value, JobRecord)> = keys.into_iter().zip(items).collect();
        keyed.sort_by(|(a, _), (b, _)| match order {
            Order::Asc => compare_values(a, b),
            Order::Desc => compare_values(b, a),
        });
        self.inner.items = keyed.into_iter().map(|(_, job)| job).collect();
        Ok(self)
    }

    /// Keep at most `max` items. `None` or zero keeps everything.
    pub fn truncate(&mut self, max: Option<usize>) -> &mut Self {
        if let Some(max) = max
            && max > 0
        {
            self.inner.items.truncate(max);
        }
        self
    }

    pub fn into_inner(self) -> ResultCollection {
        self.inner
    }

    fn field_values(&self, field: &str) -> Result<Vec<Value>, AppError> {
        self.inner.items.iter().map(|job| job.field(field)).collect()
    }
}

impl Deref for MultiCollection {
    type Target = ResultCollection;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ResultCollection> for MultiCollection {
    fn from(inner: ResultCollection) -> Self {
        Self { inner }
    }
}

/// Total order over field values.
///
/// `null` sorts first. Numbers compare numerically, also against strings
/// that parse as numbers; anything else of mixed type compares by its JSON
/// text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => compare_f64(x.as_f64(), y.as_f64()),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(y) if y.is_finite() => compare_f64(x.as_f64(), Some(y)),
            _ => x.to_string().cmp(s),
        },
        (Value::String(_), Value::Number(_)) => compare_values(b, a).reverse(),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn compare_f64(x: Option<f64>, y: Option<f64>) -> Ordering {
    match (x, y) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => Ordering::Equal,
    }
}
