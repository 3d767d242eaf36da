// Input fields and their validation rules
use super::format::format_grouped;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The two inputs of the calculator form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Weight,
    TrapSpeed,
}

impl FieldKind {
    pub const ALL: [FieldKind; 2] = [FieldKind::Weight, FieldKind::TrapSpeed];

    /// Name used in URLs, form posts and JSON.
    pub fn id(self) -> &'static str {
        match self {
            FieldKind::Weight => "weight",
            FieldKind::TrapSpeed => "trapSpeed",
        }
    }

    /// Prefix of every validation message for this field.
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Weight => "Weight",
            FieldKind::TrapSpeed => "Trap speed",
        }
    }

    /// Form heading shown above the input.
    pub fn title(self) -> &'static str {
        match self {
            FieldKind::Weight => "Vehicle Weight",
            FieldKind::TrapSpeed => "Trap Speed",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            FieldKind::Weight => "lb",
            FieldKind::TrapSpeed => "mph",
        }
    }

    pub fn min(self) -> f64 {
        1.0
    }

    pub fn max(self) -> f64 {
        match self {
            FieldKind::Weight => 20_000.0,
            FieldKind::TrapSpeed => 400.0,
        }
    }

    /// Browser step hint for the number input.
    pub fn step(self) -> &'static str {
        match self {
            FieldKind::Weight => "1",
            FieldKind::TrapSpeed => "0.1",
        }
    }

    /// Allowed range as shown to the user, e.g. `between 1 and 20,000 lb`.
    pub fn range_text(self) -> String {
        format!(
            "between {} and {} {}",
            format_grouped(self.min()),
            format_grouped(self.max()),
            self.unit()
        )
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FieldKind::Weight => "e.g., 3500",
            FieldKind::TrapSpeed => "e.g., 115",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for FieldKind {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Why a raw field value was rejected. The `Display` text is what the form
/// shows beneath the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    Required(FieldKind),

    #[error("{} must be a valid number", .0.label())]
    NotANumber(FieldKind),

    #[error("{} must be greater than 0", .0.label())]
    NotPositive(FieldKind),

    #[error("{} must be {}", .0.label(), .0.range_text())]
    OutOfRange(FieldKind),
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Check raw text against the field's rules. The first failing rule wins:
/// emptiness, then parseability, then positivity, then the closed range.
pub fn validate(field: FieldKind, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }

    let value = match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return Err(ValidationError::NotANumber(field)),
    };

    if value <= 0.0 {
        return Err(ValidationError::NotPositive(field));
    }

    if value < field.min() || value > field.max() {
        return Err(ValidationError::OutOfRange(field));
    }

    Ok(value)
}
