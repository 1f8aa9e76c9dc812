//! PostgreSQL column to JSON mappings.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies the column's declared type
//! 2. A per-category decoder extracts the value
//!
//! Rows arrive in text format from simple-protocol queries and in binary
//! format from prepared statements. The typed decoders handle both; anything
//! they do not recognise falls back to the raw wire value.
//!
//! Domain columns are classified by their base type and decoded without
//! sqlx's type check, since the wire encoding is the base type's.

use crate::models::JsonRow;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgRow, PgTypeInfo, PgTypeKind, PgValueFormat, PgValueRef};
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};
use tracing::debug;

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for PostgreSQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    SmallInt,
    Integer,
    /// int8: emitted as a decimal string so no precision is lost in JSON
    BigInt,
    Oid,
    Real,
    Double,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Uuid,
    TimestampTz,
    Timestamp,
    Date,
    Time,
    TextArray,
    SmallIntArray,
    IntArray,
    BigIntArray,
    BoolArray,
    RealArray,
    FloatArray,
    Unknown,
}

/// Classify a PostgreSQL type name into a logical category.
///
/// Matching is exact on the canonical name, so `interval` or `point` never
/// land in a numeric category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    match lower.as_str() {
        "int2" | "smallint" => TypeCategory::SmallInt,
        "int4" | "integer" | "int" => TypeCategory::Integer,
        "int8" | "bigint" => TypeCategory::BigInt,
        "oid" => TypeCategory::Oid,
        "float4" | "real" => TypeCategory::Real,
        "float8" | "double precision" => TypeCategory::Double,
        "numeric" | "decimal" => TypeCategory::Decimal,
        "bool" | "boolean" => TypeCategory::Boolean,
        "text" | "varchar" | "character varying" | "bpchar" | "name" | "citext" | "unknown" => {
            TypeCategory::Text
        }
        "bytea" => TypeCategory::Binary,
        "json" | "jsonb" => TypeCategory::Json,
        "uuid" => TypeCategory::Uuid,
        "timestamptz" => TypeCategory::TimestampTz,
        "timestamp" => TypeCategory::Timestamp,
        "date" => TypeCategory::Date,
        "time" => TypeCategory::Time,
        "text[]" | "varchar[]" | "bpchar[]" | "name[]" => TypeCategory::TextArray,
        "int2[]" => TypeCategory::SmallIntArray,
        "int4[]" => TypeCategory::IntArray,
        "int8[]" => TypeCategory::BigIntArray,
        "bool[]" => TypeCategory::BoolArray,
        "float4[]" => TypeCategory::RealArray,
        "float8[]" => TypeCategory::FloatArray,
        _ => TypeCategory::Unknown,
    }
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("numeric")
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name == "numeric" || name == "decimal"
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let text = match value.format() {
            PgValueFormat::Text => value.as_str()?.to_string(),
            PgValueFormat::Binary => {
                numeric_binary_to_string(value.as_bytes()?).ok_or("malformed binary NUMERIC")?
            }
        };
        Ok(RawDecimal(text))
    }
}

/// Render PostgreSQL's binary NUMERIC layout as its canonical text form.
///
/// Layout: ndigits, weight, sign, dscale (all 16-bit big endian) followed by
/// `ndigits` base-10000 digits. Digit `k` carries weight `10000^(weight - k)`.
pub fn numeric_binary_to_string(buf: &[u8]) -> Option<String> {
    const NUMERIC_NEG: u16 = 0x4000;
    const NUMERIC_NAN: u16 = 0xC000;
    const NUMERIC_PINF: u16 = 0xD000;
    const NUMERIC_NINF: u16 = 0xF000;

    if buf.len() < 8 {
        return None;
    }
    let ndigits = usize::try_from(i16::from_be_bytes([buf[0], buf[1]])).ok()?;
    let weight = i32::from(i16::from_be_bytes([buf[2], buf[3]]));
    let sign = u16::from_be_bytes([buf[4], buf[5]]);
    let dscale = usize::from(u16::from_be_bytes([buf[6], buf[7]]));

    match sign {
        NUMERIC_NAN => return Some("NaN".to_string()),
        NUMERIC_PINF => return Some("Infinity".to_string()),
        NUMERIC_NINF => return Some("-Infinity".to_string()),
        _ => {}
    }

    let body = buf.get(8..8 + ndigits * 2)?;
    let digits: Vec<i16> = body
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    let digit_at = |k: i32| -> i16 {
        usize::try_from(k)
            .ok()
            .and_then(|k| digits.get(k).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }

    if weight < 0 {
        out.push('0');
    } else {
        out.push_str(&digit_at(0).to_string());
        for k in 1..=weight {
            out.push_str(&format!("{:04}", digit_at(k)));
        }
    }

    if dscale > 0 {
        let mut frac = String::with_capacity(dscale + 4);
        let mut k = weight + 1;
        while frac.len() < dscale {
            frac.push_str(&format!("{:04}", digit_at(k)));
            k += 1;
        }
        frac.truncate(dscale);
        out.push('.');
        out.push_str(&frac);
    }

    Some(out)
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Encode raw bytes as a JSON value.
///
/// If `prefer_utf8` is true, valid UTF-8 is emitted as text.
/// Falls back to base64 encoding otherwise.
pub fn decode_binary_value(bytes: &[u8], prefer_utf8: bool) -> JsonValue {
    if prefer_utf8 {
        if let Ok(s) = std::str::from_utf8(bytes) {
            return JsonValue::String(s.to_string());
        }
    }
    JsonValue::String(STANDARD.encode(bytes))
}

/// JSON has no NaN or Infinity; those become null.
fn float_to_json(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> JsonRow;
    fn column_names(&self) -> Vec<String>;
}

impl RowToJson for PgRow {
    fn to_json_map(&self) -> JsonRow {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let declared = col.type_info();
                let base = domain_base(declared);
                let column = ColumnDecoder {
                    row: self,
                    idx,
                    checked: base.is_none(),
                };
                let value = column.decode(base.unwrap_or(declared));
                (col.name().to_string(), value)
            })
            .collect()
    }

    fn column_names(&self) -> Vec<String> {
        self.columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    }
}

/// Kind of a type the driver has resolved. Non-builtin types seen over the
/// simple protocol are only known by OID (named `?`) and have no kind.
fn resolved_kind(ty: &PgTypeInfo) -> Option<&PgTypeKind> {
    (ty.name() != "?").then(|| ty.kind())
}

/// Innermost base type of a domain, or `None` if `ty` is not a domain.
fn domain_base(ty: &PgTypeInfo) -> Option<&PgTypeInfo> {
    match resolved_kind(ty)? {
        PgTypeKind::Domain(base) => Some(domain_base(base).unwrap_or(base)),
        _ => None,
    }
}

/// Whether a binary wire value of this type is plain UTF-8 text.
fn is_text_like(ty: &PgTypeInfo) -> bool {
    categorize_type(ty.name()) == TypeCategory::Text
        || matches!(resolved_kind(ty), Some(PgTypeKind::Enum(_)))
}

struct ColumnDecoder<'r> {
    row: &'r PgRow,
    idx: usize,
    /// Off for domains, whose declared type sqlx will not match.
    checked: bool,
}

impl<'r> ColumnDecoder<'r> {
    fn decode(&self, ty: &PgTypeInfo) -> JsonValue {
        let type_name = ty.name();
        let category = categorize_type(type_name);

        let decoded = match category {
            TypeCategory::SmallInt => self.typed::<i16, _>(|v| v.into()),
            TypeCategory::Integer => self.typed::<i32, _>(|v| v.into()),
            TypeCategory::BigInt => self.typed::<i64, _>(|v| JsonValue::String(v.to_string())),
            TypeCategory::Oid => self.typed::<Oid, _>(|v| v.0.into()),
            TypeCategory::Real => self.typed::<f32, _>(|v| float_to_json(f64::from(v))),
            TypeCategory::Double => self.typed::<f64, _>(float_to_json),
            TypeCategory::Decimal => self.typed::<RawDecimal, _>(|v| JsonValue::String(v.0)),
            TypeCategory::Boolean => self.typed::<bool, _>(JsonValue::Bool),
            TypeCategory::Text => self.typed::<String, _>(JsonValue::String),
            TypeCategory::Binary => self.typed::<Vec<u8>, _>(|v| decode_binary_value(&v, false)),
            TypeCategory::Json => self.typed::<JsonValue, _>(|v| v),
            TypeCategory::Uuid => self.typed::<uuid::Uuid, _>(|v| JsonValue::String(v.to_string())),
            TypeCategory::TimestampTz => self.typed::<DateTime<Utc>, _>(|v| {
                JsonValue::String(v.to_rfc3339_opts(SecondsFormat::Millis, true))
            }),
            TypeCategory::Timestamp => self.typed::<NaiveDateTime, _>(|v| {
                JsonValue::String(v.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
            }),
            TypeCategory::Date => self.typed::<NaiveDate, _>(|v| JsonValue::String(v.to_string())),
            TypeCategory::Time => self.typed::<NaiveTime, _>(|v| JsonValue::String(v.to_string())),
            TypeCategory::TextArray => {
                self.typed::<Vec<Option<String>>, _>(|v| array_to_json(v, JsonValue::String))
            }
            TypeCategory::SmallIntArray => {
                self.typed::<Vec<Option<i16>>, _>(|v| array_to_json(v, JsonValue::from))
            }
            TypeCategory::IntArray => {
                self.typed::<Vec<Option<i32>>, _>(|v| array_to_json(v, JsonValue::from))
            }
            TypeCategory::BigIntArray => self.typed::<Vec<Option<i64>>, _>(|v| {
                array_to_json(v, |n| JsonValue::String(n.to_string()))
            }),
            TypeCategory::BoolArray => {
                self.typed::<Vec<Option<bool>>, _>(|v| array_to_json(v, JsonValue::Bool))
            }
            TypeCategory::RealArray => self.typed::<Vec<Option<f32>>, _>(|v| {
                array_to_json(v, |f| float_to_json(f64::from(f)))
            }),
            TypeCategory::FloatArray => {
                self.typed::<Vec<Option<f64>>, _>(|v| array_to_json(v, float_to_json))
            }
            TypeCategory::Unknown => None,
        };

        match decoded {
            Some(value) => value,
            None => {
                if category != TypeCategory::Unknown {
                    debug!(column = self.idx, type_name, "Typed decode failed, using raw value");
                }
                self.raw(is_text_like(ty))
            }
        }
    }

    /// Decode through sqlx's typed path. `None` means the value could not be
    /// decoded as `T`; a SQL NULL is `Some(Null)`.
    fn typed<T, F>(&self, to_json: F) -> Option<JsonValue>
    where
        T: Decode<'r, sqlx::Postgres> + Type<sqlx::Postgres>,
        F: FnOnce(T) -> JsonValue,
    {
        let result = if self.checked {
            self.row.try_get::<Option<T>, _>(self.idx)
        } else {
            self.row.try_get_unchecked::<Option<T>, _>(self.idx)
        };
        match result {
            Ok(Some(v)) => Some(to_json(v)),
            Ok(None) => Some(JsonValue::Null),
            Err(_) => None,
        }
    }

    /// Last resort: the wire value itself.
    fn raw(&self, text_like: bool) -> JsonValue {
        let Ok(value) = self.row.try_get_raw(self.idx) else {
            return JsonValue::Null;
        };
        if value.is_null() {
            return JsonValue::Null;
        }
        value
            .as_bytes()
            .map(|bytes| raw_value_to_json(value.format(), bytes, text_like))
            .unwrap_or(JsonValue::Null)
    }
}

fn array_to_json<T>(items: Vec<Option<T>>, to_json: impl Fn(T) -> JsonValue) -> JsonValue {
    items
        .into_iter()
        .map(|e| e.map(&to_json).unwrap_or(JsonValue::Null))
        .collect()
}

/// Text-format values are the server's own rendering and pass through.
/// Binary values are only read as UTF-8 for text-like types; anything else
/// (arrays, ranges, composites) is base64.
fn raw_value_to_json(format: PgValueFormat, bytes: &[u8], text_like: bool) -> JsonValue {
    match format {
        PgValueFormat::Text => decode_binary_value(bytes, true),
        PgValueFormat::Binary => decode_binary_value(bytes, text_like),
    }
}
