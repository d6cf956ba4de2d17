use std::fmt;
use std::str::FromStr;

use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde_json::{Map, Number, Value};

use crate::error::{AppError, AppResult};

/// Field holding the database-assigned identifier.
pub const ID_FIELD: &str = "_id";

/// A schema-less product document. Only `_id` has meaning to the service.
pub type Product = Map<String, Value>;

/// Database-assigned product identifier. Parsed from and rendered as the
/// 24-character hex form of a MongoDB `ObjectId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(ObjectId);

impl ProductId {
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for ProductId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for ProductId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|e| AppError::InvalidId(e.to_string()))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// Parse a request body into a product document.
///
/// The body must be a JSON object. Any client-supplied `_id` is dropped: the
/// identifier is always assigned by the database and never rewritten.
pub fn parse_product(body: &[u8]) -> AppResult<Product> {
    let mut product: Product = serde_json::from_slice(body)?;
    product.remove(ID_FIELD);
    Ok(product)
}

// ── JSON → BSON ───────────────────────────────────────────────────────────────

pub fn to_document(product: Product) -> AppResult<Document> {
    product
        .into_iter()
        .map(|(key, value)| Ok((key, to_bson(value)?)))
        .collect()
}

/// Integers that fit in 32 bits are stored as `Int32`, wider ones as `Int64`,
/// and anything past `i64::MAX` as a `Double`.
fn to_bson(value: Value) -> AppResult<Bson> {
    Ok(match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => number_to_bson(&n)?,
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(
            items
                .into_iter()
                .map(to_bson)
                .collect::<AppResult<Vec<_>>>()?,
        ),
        Value::Object(map) => Bson::Document(to_document(map)?),
    })
}

fn number_to_bson(n: &Number) -> AppResult<Bson> {
    if let Some(i) = n.as_i64() {
        return Ok(match i32::try_from(i) {
            Ok(small) => Bson::Int32(small),
            Err(_) => Bson::Int64(i),
        });
    }
    n.as_f64()
        .map(Bson::Double)
        .ok_or_else(|| AppError::Encoding(format!("unsupported number {}", n)))
}

// ── BSON → JSON ───────────────────────────────────────────────────────────────

pub fn from_document(doc: Document) -> Product {
    doc.into_iter()
        .map(|(key, value)| (key, from_bson(value)))
        .collect()
}

/// ObjectIds render as hex strings and datetimes as RFC 3339, at any depth.
/// Everything else uses relaxed extended JSON, so numbers stay numbers.
fn from_bson(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        Bson::Document(doc) => Value::Object(from_document(doc)),
        Bson::Array(items) => Value::Array(items.into_iter().map(from_bson).collect()),
        other => other.into_relaxed_extjson(),
    }
}
