//! Error types for widget construction and interaction.

use horizon_controls_core::PropertyError;
use thiserror::Error;

/// Errors raised by widgets and their models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    /// An option value is outside its legal range.
    #[error("invalid value for option `{option}`: {reason}")]
    InvalidOption {
        /// Name of the offending option.
        option: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A widget was given neither content nor an explicit size.
    #[error("{widget} needs either content or an explicit size")]
    MissingContent { widget: &'static str },

    /// The two values of a toggle are equal.
    #[error("toggle values must be distinct")]
    IndistinctToggleValues,

    /// A toggle's cell holds a value that is neither of its two values.
    #[error("cell value {value} is not one of the toggle values")]
    UnknownToggleValue { value: String },

    /// A list widget was created without items.
    #[error("{widget} requires at least one item")]
    NoItems { widget: &'static str },

    /// No item corresponds to the bound value.
    #[error("no item matches the value {value}")]
    NoMatchingItem { value: String },

    /// The widget or model has already been disposed.
    #[error("{widget} has been disposed")]
    Disposed { widget: &'static str },

    /// A property refused a value.
    #[error(transparent)]
    Property(#[from] PropertyError),
}

impl ControlError {
    pub(crate) fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            reason: reason.into(),
        }
    }
}

/// Result type for widget operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Check that `value` lies in the open interval (0, 1).
pub(crate) fn ensure_unit_open(option: &'static str, value: f32) -> ControlResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ControlError::invalid_option(
            option,
            format!("{value} is not in (0, 1)"),
        ))
    }
}

/// Check that `value` is finite and not negative.
pub(crate) fn ensure_non_negative(option: &'static str, value: f32) -> ControlResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ControlError::invalid_option(
            option,
            format!("{value} must be a finite, non-negative number"),
        ))
    }
}

/// Check that `value` is finite and strictly positive.
pub(crate) fn ensure_positive(option: &'static str, value: f32) -> ControlResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ControlError::invalid_option(
            option,
            format!("{value} must be a finite, positive number"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_open_bounds() {
        assert!(ensure_unit_open("opacity", 0.5).is_ok());
        assert!(ensure_unit_open("opacity", 0.0).is_err());
        assert!(ensure_unit_open("opacity", 1.0).is_err());
        assert!(ensure_unit_open("opacity", f32::NAN).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ControlError::invalid_option("line_width", "-1 must be non-negative");
        assert_eq!(
            err.to_string(),
            "invalid value for option `line_width`: -1 must be non-negative"
        );
        assert_eq!(
            ControlError::Disposed { widget: "ComboBox" }.to_string(),
            "ComboBox has been disposed"
        );
    }

    #[test]
    fn test_property_error_converts() {
        let err: ControlError = PropertyError::Rejected {
            name: "value".to_string(),
        }
        .into();
        assert!(matches!(err, ControlError::Property(_)));
    }
}
