//! Column type inference for data table attributes.
//!
//! Every attribute observed in a data table gets a [`ColumnTypeInferencer`].
//! It is fed each row's raw value (or [`NULL_SENTINEL`] when the row lacks the
//! attribute) and narrows its guess along `Integer → Float → String`. Once all
//! rows are seen, [`ColumnTypeInferencer::finish`] runs a single decision pass
//! over the accumulated [`ColumnEvidence`]:
//!
//! - fewer than two distinct non-null values marks the column *meaningless*;
//! - integers whose observed range fits no SQL integer width become strings;
//! - exactly two distinct boolean literals (`yes`/`no`, `true`/`false`, `1`/`0`)
//!   promote any non-float column to boolean.
//!
//! The identifier column is always an integer key once it is meaningful; its
//! values are read with [`parse_identifier`].
//!
//! The decided column renders its own SQL definition and converts raw values
//! into [`ParsedValue`]s for the INSERT statements.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;

use crate::{
    destination::SqlDialect,
    error::{MigrationError, Result},
    row::parse_identifier,
};

/// Lower-cased literals that denote a missing value.
pub const NULL_LITERALS: &[&str] = &["null", "n/a", "none"];

/// Value fed to a column for rows that do not carry its attribute.
pub const NULL_SENTINEL: &str = "null";

const BOOLEAN_LITERALS: &[(&str, bool)] = &[
    ("yes", true),
    ("no", false),
    ("true", true),
    ("false", false),
    ("1", true),
    ("0", false),
];

const CANDIDATE_LIMIT: usize = 3;
const INITIAL_COLUMN_LENGTH: usize = 5;
const COLUMN_LENGTH_STEP: usize = 2;
const DECIMAL_PRECISION: u32 = 13;
const DECIMAL_SCALE: u32 = 4;

static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("valid integer pattern"));
static FLOAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?([0-9]+\.[0-9]+|\.[0-9]+|[0-9]+)$").expect("valid float pattern")
});

pub fn is_null_literal(lowered: &str) -> bool {
    NULL_LITERALS.contains(&lowered)
}

pub fn boolean_literal(lowered: &str) -> Option<bool> {
    BOOLEAN_LITERALS
        .iter()
        .find(|(literal, _)| *literal == lowered)
        .map(|(_, value)| *value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    String,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// SQL integer widths, narrowest first within each signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerSubtype {
    UnsignedByte,
    SignedByte,
    UnsignedShort,
    SignedShort,
    UnsignedInt,
    SignedInt,
    UnsignedLong,
    SignedLong,
}

impl IntegerSubtype {
    /// Narrowest width covering `[min, max]`, signed iff `min` is negative.
    pub fn for_range(min: i128, max: i128) -> Option<Self> {
        if min < 0 {
            if min >= i8::MIN as i128 && max <= i8::MAX as i128 {
                Some(IntegerSubtype::SignedByte)
            } else if min >= i16::MIN as i128 && max <= i16::MAX as i128 {
                Some(IntegerSubtype::SignedShort)
            } else if min >= i32::MIN as i128 && max <= i32::MAX as i128 {
                Some(IntegerSubtype::SignedInt)
            } else if min >= i64::MIN as i128 && max <= i64::MAX as i128 {
                Some(IntegerSubtype::SignedLong)
            } else {
                None
            }
        } else if max <= u8::MAX as i128 {
            Some(IntegerSubtype::UnsignedByte)
        } else if max <= u16::MAX as i128 {
            Some(IntegerSubtype::UnsignedShort)
        } else if max <= u32::MAX as i128 {
            Some(IntegerSubtype::UnsignedInt)
        } else if max <= u64::MAX as i128 {
            Some(IntegerSubtype::UnsignedLong)
        } else {
            None
        }
    }

    pub fn sql_type(&self) -> &'static str {
        match self {
            IntegerSubtype::SignedByte => "TINYINT SIGNED",
            IntegerSubtype::SignedShort => "SMALLINT SIGNED",
            IntegerSubtype::SignedInt => "INTEGER SIGNED",
            IntegerSubtype::SignedLong => "BIGINT SIGNED",
            IntegerSubtype::UnsignedByte => "TINYINT UNSIGNED",
            IntegerSubtype::UnsignedShort => "SMALLINT UNSIGNED",
            IntegerSubtype::UnsignedInt => "INTEGER UNSIGNED",
            IntegerSubtype::UnsignedLong => "BIGINT UNSIGNED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDecision {
    Meaningless,
    Typed(ColumnType),
}

/// Everything a column has learned from the values fed to it.
#[derive(Debug, Clone)]
pub struct ColumnEvidence {
    narrowed: ColumnType,
    nullable: bool,
    max_length: usize,
    candidates: Vec<String>,
    integer_range: Option<(i128, i128)>,
    integer_overflow: bool,
}

impl Default for ColumnEvidence {
    fn default() -> Self {
        Self {
            narrowed: ColumnType::Integer,
            nullable: false,
            max_length: 0,
            candidates: Vec::with_capacity(CANDIDATE_LIMIT),
            integer_range: None,
            integer_overflow: false,
        }
    }
}

impl ColumnEvidence {
    pub fn record(&mut self, raw: &str) {
        let lowered = raw.trim().to_ascii_lowercase();
        self.max_length = self.max_length.max(raw.len());

        if is_null_literal(&lowered) {
            self.nullable = true;
            return;
        }

        if self.candidates.len() < CANDIDATE_LIMIT && !self.candidates.contains(&lowered) {
            self.candidates.push(lowered.clone());
        }

        if self.narrowed == ColumnType::String {
            return;
        }
        if self.narrowed == ColumnType::Integer && !INTEGER_PATTERN.is_match(&lowered) {
            self.narrowed = ColumnType::Float;
        }
        if self.narrowed == ColumnType::Float && !FLOAT_PATTERN.is_match(&lowered) {
            self.narrowed = ColumnType::String;
        }
        if self.narrowed == ColumnType::Integer {
            match lowered.parse::<i128>() {
                Ok(value) => {
                    self.integer_range = Some(match self.integer_range {
                        Some((min, max)) => (min.min(value), max.max(value)),
                        None => (value, value),
                    });
                }
                Err(_) => self.integer_overflow = true,
            }
        }
    }

    /// Final type decision; see the module docs for the rules.
    pub fn decide(&self) -> ColumnDecision {
        if self.candidates.len() <= 1 {
            return ColumnDecision::Meaningless;
        }
        if self.narrowed == ColumnType::Integer && self.integer_subtype().is_none() {
            return ColumnDecision::Typed(ColumnType::String);
        }
        if self.narrowed != ColumnType::Float && self.candidates.len() <= CANDIDATE_LIMIT {
            let mut all_boolean = true;
            let mut boolean_matches = 0usize;
            for candidate in &self.candidates {
                if boolean_literal(candidate).is_some() {
                    boolean_matches += 1;
                } else if !is_null_literal(candidate) {
                    all_boolean = false;
                }
            }
            if all_boolean && boolean_matches == 2 {
                return ColumnDecision::Typed(ColumnType::Boolean);
            }
        }
        ColumnDecision::Typed(self.narrowed)
    }

    pub fn narrowed_type(&self) -> ColumnType {
        self.narrowed
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn integer_range(&self) -> Option<(i128, i128)> {
        self.integer_range
    }

    pub fn integer_subtype(&self) -> Option<IntegerSubtype> {
        if self.narrowed != ColumnType::Integer || self.integer_overflow {
            return None;
        }
        let (min, max) = self.integer_range.unwrap_or((0, 0));
        IntegerSubtype::for_range(min, max)
    }
}

/// A raw value converted for a finished column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedValue {
    Null,
    Text(String),
    Boolean(bool),
    Integer(i128),
    Decimal(Decimal),
    /// Float literal beyond the `Decimal` range, kept as normalized text.
    Numeric(String),
}

#[derive(Debug, Clone)]
pub struct ColumnTypeInferencer {
    name: String,
    identifier: bool,
    evidence: ColumnEvidence,
    decision: Option<ColumnDecision>,
}

impl ColumnTypeInferencer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: false,
            evidence: ColumnEvidence::default(),
            decision: None,
        }
    }

    /// Inferencer for the reserved primary key attribute.
    pub fn identifier(name: impl Into<String>) -> Self {
        Self {
            identifier: true,
            ..Self::new(name)
        }
    }

    pub fn evaluate(&mut self, raw: &str) {
        self.evidence.record(raw);
    }

    pub fn finish(&mut self) -> ColumnDecision {
        let decision = match self.evidence.decide() {
            ColumnDecision::Typed(_) if self.identifier => ColumnDecision::Typed(ColumnType::Integer),
            decision => decision,
        };
        self.decision = Some(decision);
        decision
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_identifier(&self) -> bool {
        self.identifier
    }

    pub fn is_nullable(&self) -> bool {
        self.evidence.is_nullable()
    }

    pub fn is_meaningless(&self) -> bool {
        self.decision == Some(ColumnDecision::Meaningless)
    }

    pub fn decision(&self) -> Option<ColumnDecision> {
        self.decision
    }

    pub fn evidence(&self) -> &ColumnEvidence {
        &self.evidence
    }

    /// Decided type, or the narrowed guess while unfinished or meaningless.
    pub fn data_type(&self) -> ColumnType {
        match self.decision {
            Some(ColumnDecision::Typed(column_type)) => column_type,
            _ => self.evidence.narrowed_type(),
        }
    }

    pub fn integer_subtype(&self) -> Option<IntegerSubtype> {
        match self.data_type() {
            ColumnType::Integer => self.evidence.integer_subtype(),
            _ => None,
        }
    }

    /// Smallest `5 * 2^k` that holds the longest raw value.
    pub fn column_length(&self) -> usize {
        let mut length = INITIAL_COLUMN_LENGTH;
        while length < self.evidence.max_length() {
            length *= COLUMN_LENGTH_STEP;
        }
        length
    }

    pub fn sql_type(&self) -> String {
        match self.data_type() {
            ColumnType::String => format!("VARCHAR({})", self.column_length()),
            ColumnType::Boolean => "BIT".to_string(),
            ColumnType::Float => format!("DECIMAL({DECIMAL_PRECISION},{DECIMAL_SCALE})"),
            ColumnType::Integer => match self.integer_subtype() {
                Some(subtype) => subtype.sql_type().to_string(),
                None => format!("VARCHAR({})", self.column_length()),
            },
        }
    }

    pub fn sql_definition(&self, dialect: SqlDialect) -> String {
        if self.identifier {
            return dialect.identity_column(&self.name);
        }
        let null_suffix = if self.is_nullable() { "NULL" } else { "NOT NULL" };
        format!(
            "{} {} {}",
            dialect.quote_identifier(&self.name),
            self.sql_type(),
            null_suffix
        )
    }

    pub fn parse_value(&self, raw: &str) -> Result<ParsedValue> {
        let Some(ColumnDecision::Typed(column_type)) = self.decision else {
            return Err(MigrationError::internal(
                &self.name,
                "value parsed before the column type was decided",
            ));
        };
        if self.identifier {
            return Ok(ParsedValue::Integer(i128::from(parse_identifier(raw))));
        }
        let lowered = raw.trim().to_ascii_lowercase();
        if self.is_nullable() && is_null_literal(&lowered) {
            return Ok(ParsedValue::Null);
        }

        match column_type {
            ColumnType::String => Ok(ParsedValue::Text(raw.to_string())),
            ColumnType::Boolean => boolean_literal(&lowered)
                .map(ParsedValue::Boolean)
                .ok_or_else(|| {
                    MigrationError::internal(
                        &self.name,
                        format!("'{raw}' is not a boolean literal"),
                    )
                }),
            ColumnType::Float => {
                if !FLOAT_PATTERN.is_match(&lowered) {
                    return Err(MigrationError::internal(
                        &self.name,
                        format!("'{raw}' is not a decimal"),
                    ));
                }
                let normalized = normalize_decimal(&lowered);
                Ok(match Decimal::from_str(&normalized) {
                    Ok(value) => ParsedValue::Decimal(value),
                    Err(_) => ParsedValue::Numeric(normalized),
                })
            }
            ColumnType::Integer => lowered.parse::<i128>().map(ParsedValue::Integer).map_err(|err| {
                MigrationError::internal(&self.name, format!("'{raw}' is not an integer: {err}"))
            }),
        }
    }
}

/// Gives a bare leading `.` its zero, so `.5` reads as `0.5`.
fn normalize_decimal(lowered: &str) -> String {
    if let Some(fraction) = lowered.strip_prefix("-.") {
        format!("-0.{fraction}")
    } else if let Some(fraction) = lowered.strip_prefix('.') {
        format!("0.{fraction}")
    } else {
        lowered.to_string()
    }
}
