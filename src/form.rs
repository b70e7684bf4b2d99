//! "List your equipment" form
//!
//! Owns the text being typed and the focused field. Validation happens here,
//! so whatever [`EquipmentForm::submit`] hands out is well-formed.

use crate::model::EquipmentFormData;

pub const CONDITIONS: [&str; 4] = ["Excellent", "Good", "Fair", "Poor"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Condition,
    ExpectedValue,
    Location,
    Owner,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Name,
        FormField::Description,
        FormField::Condition,
        FormField::ExpectedValue,
        FormField::Location,
        FormField::Owner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Equipment Name",
            FormField::Description => "Description",
            FormField::Condition => "Condition",
            FormField::ExpectedValue => "Expected Value",
            FormField::Location => "Location",
            FormField::Owner => "Your Name",
        }
    }

    fn index(self) -> usize {
        FormField::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Expected value must be a number, got \"{0}\"")]
    InvalidValue(String),

    #[error("Expected value cannot be negative")]
    NegativeValue,
}

#[derive(Debug, Clone)]
pub struct EquipmentForm {
    name: String,
    description: String,
    condition: usize,
    expected_value: String,
    location: String,
    owner: String,
    focus: FormField,
    error: Option<FormError>,
}

impl Default for EquipmentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            condition: 1, // Good
            expected_value: String::new(),
            location: String::new(),
            owner: String::new(),
            focus: FormField::Name,
            error: None,
        }
    }
}

impl EquipmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    /// Display text of a field
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
            FormField::Condition => CONDITIONS[self.condition],
            FormField::ExpectedValue => &self.expected_value,
            FormField::Location => &self.location,
            FormField::Owner => &self.owner,
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::Condition => None,
            FormField::ExpectedValue => Some(&mut self.expected_value),
            FormField::Location => Some(&mut self.location),
            FormField::Owner => Some(&mut self.owner),
        }
    }

    pub fn focus_next(&mut self) {
        let i = self.focus.index();
        self.focus = FormField::ALL[(i + 1) % FormField::ALL.len()];
    }

    pub fn focus_prev(&mut self) {
        let i = self.focus.index();
        self.focus = FormField::ALL[i.checked_sub(1).unwrap_or(FormField::ALL.len() - 1)];
    }

    pub fn cycle_condition(&mut self, forward: bool) {
        self.condition = if forward {
            (self.condition + 1) % CONDITIONS.len()
        } else {
            self.condition.checked_sub(1).unwrap_or(CONDITIONS.len() - 1)
        };
    }

    pub fn input(&mut self, c: char) {
        match self.focus {
            FormField::Condition => {
                if c == ' ' {
                    self.cycle_condition(true);
                }
            }
            FormField::ExpectedValue => {
                // Digits and one decimal point only
                if c.is_ascii_digit() || (c == '.' && !self.expected_value.contains('.')) {
                    self.expected_value.push(c);
                }
            }
            field => {
                if !c.is_control() {
                    if let Some(text) = self.text_mut(field) {
                        text.push(c);
                    }
                }
            }
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut(self.focus) {
            text.pop();
        }
        self.error = None;
    }

    /// Validate and produce the data to send. Leaves the input untouched; the
    /// caller clears it once the listing service has accepted the item.
    pub fn submit(&mut self) -> Result<EquipmentFormData, FormError> {
        let result = self.validate();
        self.error = result.as_ref().err().cloned();
        result
    }

    fn validate(&self) -> Result<EquipmentFormData, FormError> {
        let required = |field: FormField, text: &str| {
            let text = text.trim();
            if text.is_empty() {
                Err(FormError::Missing(field.label()))
            } else {
                Ok(text.to_string())
            }
        };

        let name = required(FormField::Name, &self.name)?;
        let raw_value = required(FormField::ExpectedValue, &self.expected_value)?;
        let expected_value: f64 = raw_value
            .parse()
            .map_err(|_| FormError::InvalidValue(raw_value.clone()))?;
        if !expected_value.is_finite() {
            return Err(FormError::InvalidValue(raw_value));
        }
        if expected_value < 0.0 {
            return Err(FormError::NegativeValue);
        }
        let location = required(FormField::Location, &self.location)?;
        let owner = required(FormField::Owner, &self.owner)?;

        Ok(EquipmentFormData {
            name,
            description: self.description.trim().to_string(),
            condition: CONDITIONS[self.condition].to_string(),
            expected_value,
            location,
            owner,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut EquipmentForm, field: FormField, text: &str) {
        while form.focus() != field {
            form.focus_next();
        }
        for c in text.chars() {
            form.input(c);
        }
    }

    fn filled() -> EquipmentForm {
        let mut form = EquipmentForm::new();
        type_into(&mut form, FormField::Name, "Power tiller");
        type_into(&mut form, FormField::Description, "  12 HP diesel ");
        type_into(&mut form, FormField::ExpectedValue, "45000.50");
        type_into(&mut form, FormField::Location, "Hassan");
        type_into(&mut form, FormField::Owner, "Lakshmi");
        form
    }

    #[test]
    fn test_submit_produces_trimmed_form_data() {
        let mut form = filled();
        let data = form.submit().unwrap();

        assert_eq!(data.name, "Power tiller");
        assert_eq!(data.description, "12 HP diesel");
        assert_eq!(data.condition, "Good");
        assert_eq!(data.expected_value, 45000.5);
        assert_eq!(data.owner, "Lakshmi");
        assert!(form.error().is_none());
        // Input is kept until the caller clears it
        assert_eq!(form.value(FormField::Name), "Power tiller");
    }

    #[test]
    fn test_missing_required_field() {
        let mut form = filled();
        while form.focus() != FormField::Owner {
            form.focus_next();
        }
        for _ in 0.."Lakshmi".len() {
            form.backspace();
        }

        assert_eq!(form.submit(), Err(FormError::Missing("Your Name")));
        assert_eq!(form.error(), Some(&FormError::Missing("Your Name")));
    }

    #[test]
    fn test_value_field_accepts_only_numbers() {
        let mut form = EquipmentForm::new();
        type_into(&mut form, FormField::ExpectedValue, "1a2.3.4-");
        assert_eq!(form.value(FormField::ExpectedValue), "12.34");
    }

    #[test]
    fn test_lone_decimal_point_is_invalid() {
        let mut form = filled();
        while form.focus() != FormField::ExpectedValue {
            form.focus_next();
        }
        for _ in 0.."45000.50".len() {
            form.backspace();
        }
        form.input('.');

        assert_eq!(form.submit(), Err(FormError::InvalidValue(".".to_string())));
    }

    #[test]
    fn test_condition_cycles_both_ways() {
        let mut form = EquipmentForm::new();
        assert_eq!(form.value(FormField::Condition), "Good");
        form.cycle_condition(true);
        assert_eq!(form.value(FormField::Condition), "Fair");
        form.cycle_condition(false);
        form.cycle_condition(false);
        assert_eq!(form.value(FormField::Condition), "Excellent");
        form.cycle_condition(false);
        assert_eq!(form.value(FormField::Condition), "Poor");
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = EquipmentForm::new();
        form.focus_prev();
        assert_eq!(form.focus(), FormField::Owner);
        form.focus_next();
        assert_eq!(form.focus(), FormField::Name);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut form = filled();
        form.cycle_condition(true);
        form.clear();

        assert_eq!(form.value(FormField::Name), "");
        assert_eq!(form.value(FormField::Condition), "Good");
        assert_eq!(form.focus(), FormField::Name);
    }
}
