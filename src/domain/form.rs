// Calculator form state: raw inputs, inline errors, phase and result
use super::field::{validate, FieldKind, ValidationError};
use super::horsepower::{estimate, CalculationResult};
use serde::Serialize;

/// One text input and the error from its last validation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub value: String,
    pub error: Option<ValidationError>,
}

impl FieldState {
    fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    fn validate(&mut self, kind: FieldKind) -> Result<f64, ValidationError> {
        self.error = None;
        validate(kind, &self.value).inspect_err(|err| self.error = Some(*err))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Calculating,
}

/// Both inputs, parsed and validated, captured when a calculation starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationInputs {
    pub weight: f64,
    pub trap_speed: f64,
    generation: u64,
}

/// Per-field errors surfaced by a rejected calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trap_speed: Option<ValidationError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalculationRejected {
    /// A calculation is already running for this form.
    InProgress,
    /// At least one input failed validation; the errors are now on the form.
    Invalid(FieldErrors),
}

#[derive(Debug, Clone, Default)]
pub struct FormController {
    weight: FieldState,
    trap_speed: FieldState,
    phase: Phase,
    result: Option<CalculationResult>,
    /// Bumped on every reset; a calculation started before the reset is stale.
    generation: u64,
}

// Generation is bookkeeping, not part of what the form shows.
impl PartialEq for FormController {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight
            && self.trap_speed == other.trap_speed
            && self.phase == other.phase
            && self.result == other.result
    }
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, kind: FieldKind) -> &FieldState {
        match kind {
            FieldKind::Weight => &self.weight,
            FieldKind::TrapSpeed => &self.trap_speed,
        }
    }

    fn field_mut(&mut self, kind: FieldKind) -> &mut FieldState {
        match kind {
            FieldKind::Weight => &mut self.weight,
            FieldKind::TrapSpeed => &mut self.trap_speed,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result(&self) -> Option<&CalculationResult> {
        self.result.as_ref()
    }

    /// Store new text for a field. Non-empty text is validated immediately;
    /// emptying a field clears its error and leaves "required" for submission.
    pub fn edit(&mut self, kind: FieldKind, text: impl Into<String>) {
        let field = self.field_mut(kind);
        field.value = text.into();
        if field.is_blank() {
            field.error = None;
        } else {
            let _ = field.validate(kind);
        }
    }

    /// Focus left the field: re-validate unless it is empty.
    pub fn blur(&mut self, kind: FieldKind) {
        let field = self.field_mut(kind);
        if !field.is_blank() {
            let _ = field.validate(kind);
        }
    }

    /// Whether the Calculate control should be enabled.
    pub fn can_calculate(&self) -> bool {
        self.phase == Phase::Idle
            && FieldKind::ALL.iter().all(|&kind| {
                let field = self.field(kind);
                !field.is_blank() && field.error.is_none()
            })
    }

    /// Validate both fields and, if they pass, lock the form into
    /// `Calculating`. A rejected request leaves phase and result untouched.
    pub fn begin_calculation(&mut self) -> Result<CalculationInputs, CalculationRejected> {
        if self.phase == Phase::Calculating {
            return Err(CalculationRejected::InProgress);
        }

        let weight = self.weight.validate(FieldKind::Weight);
        let trap_speed = self.trap_speed.validate(FieldKind::TrapSpeed);

        match (weight, trap_speed) {
            (Ok(weight), Ok(trap_speed)) => {
                self.phase = Phase::Calculating;
                Ok(CalculationInputs {
                    weight,
                    trap_speed,
                    generation: self.generation,
                })
            }
            (weight, trap_speed) => Err(CalculationRejected::Invalid(FieldErrors {
                weight: weight.err(),
                trap_speed: trap_speed.err(),
            })),
        }
    }

    /// Finish a calculation started by `begin_calculation`. The result is a
    /// snapshot of `inputs`; later edits do not change it.
    ///
    /// Returns `None` and leaves the form alone if it was reset after the
    /// calculation started.
    pub fn complete_calculation(&mut self, inputs: CalculationInputs) -> Option<CalculationResult> {
        if inputs.generation != self.generation {
            return None;
        }

        let result = estimate(inputs.weight, inputs.trap_speed);
        self.result = Some(result);
        self.phase = Phase::Idle;
        Some(result)
    }

    /// Clear both fields, both errors and the result. A pending calculation
    /// is abandoned.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation.wrapping_add(1),
            ..Self::default()
        };
    }
}
