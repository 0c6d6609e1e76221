//! Labeled document spans for diagnostic messages.

use crate::span::Span;

/// Whether a label marks the element at fault or a related one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    Primary,
    Secondary,
}

/// A message attached to a byte range of the document.
///
/// Secondary labels point at related elements, such as the first cell using
/// a duplicated id.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    span: Span,
    message: String,
    role: LabelRole,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::with_role(span, message, LabelRole::Primary)
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self::with_role(span, message, LabelRole::Secondary)
    }

    fn with_role(span: Span, message: impl Into<String>, role: LabelRole) -> Self {
        Self {
            span,
            message: message.into(),
            role,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn role(&self) -> LabelRole {
        self.role
    }

    pub fn is_primary(&self) -> bool {
        self.role == LabelRole::Primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label() {
        let label = Label::primary(Span::new(10..20), "edge defined here");

        assert_eq!(label.span(), Span::new(10..20));
        assert_eq!(label.message(), "edge defined here");
        assert!(label.is_primary());
    }

    #[test]
    fn test_secondary_label() {
        let label = Label::secondary(Span::new(5..15), "first defined here");

        assert_eq!(label.role(), LabelRole::Secondary);
        assert!(!label.is_primary());
    }
}
