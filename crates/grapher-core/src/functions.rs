//! The list of formulas a session plots.

use crate::color::Color;
use crate::error::{GraphError, ParseError};
use crate::expression::{self, Expression};
use log::warn;

/// One formula slot.
///
/// Keeps the last expression that parsed successfully, so a typo while
/// editing leaves the previous curve on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntry {
    text: String,
    expr: Option<Expression>,
    error: Option<ParseError>,
    color: Color,
    visible: bool,
}

impl FunctionEntry {
    /// Create a slot and parse `text` into it.
    #[must_use]
    pub fn new(text: &str, color: Color) -> Self {
        let mut entry = Self {
            text: String::new(),
            expr: None,
            error: None,
            color,
            visible: true,
        };
        // A bad initial formula is recorded on the entry.
        let _ = entry.set_text(text);
        entry
    }

    /// Replace the formula text.
    ///
    /// Blank text clears the slot. On a parse error the previous expression
    /// is kept and the error is recorded.
    ///
    /// # Errors
    ///
    /// Returns the parse error, which is also stored on the entry.
    pub fn set_text(&mut self, text: &str) -> Result<(), ParseError> {
        self.text = text.to_string();
        if text.trim().is_empty() {
            self.expr = None;
            self.error = None;
            return Ok(());
        }
        match expression::parse(text) {
            Ok(expr) => {
                self.expr = Some(expr);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Keeping previous formula, '{text}' does not parse: {e}");
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// The formula text as last edited.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The last successfully parsed expression.
    #[must_use]
    pub const fn expression(&self) -> Option<&Expression> {
        self.expr.as_ref()
    }

    /// The parse error of the current text, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Curve color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Whether the curve is drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the curve.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// The expression to draw, if the slot is visible and has one.
    #[must_use]
    pub fn plottable(&self) -> Option<&Expression> {
        self.expr.as_ref().filter(|_| self.visible)
    }
}

/// Ordered formula slots; never empty, never above its limit.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSet {
    entries: Vec<FunctionEntry>,
    max: usize,
}

impl FunctionSet {
    /// Build from formula texts, keeping at most `max` of them.
    #[must_use]
    pub fn from_texts<S: AsRef<str>>(texts: &[S], max: usize) -> Self {
        let max = max.max(1);
        let mut entries: Vec<FunctionEntry> = texts
            .iter()
            .take(max)
            .enumerate()
            .map(|(i, text)| FunctionEntry::new(text.as_ref(), Color::palette(i)))
            .collect();
        if entries.is_empty() {
            entries.push(FunctionEntry::new("", Color::palette(0)));
        }
        Self { entries, max }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upper bound on slots.
    #[must_use]
    pub const fn max(&self) -> usize {
        self.max
    }

    /// All slots in order.
    #[must_use]
    pub fn entries(&self) -> &[FunctionEntry] {
        &self.entries
    }

    /// One slot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FunctionEntry> {
        self.entries.get(index)
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut FunctionEntry, GraphError> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(GraphError::FunctionIndex { index, len })
    }

    /// Edit the formula in slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::FunctionIndex`] for a bad index, or
    /// [`GraphError::Parse`] if the text does not parse (the slot then keeps
    /// its previous expression).
    pub fn set_text(&mut self, index: usize, text: &str) -> Result<(), GraphError> {
        self.entry_mut(index)?.set_text(text)?;
        Ok(())
    }

    /// Show or hide slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::FunctionIndex`] for a bad index.
    pub fn set_visible(&mut self, index: usize, visible: bool) -> Result<(), GraphError> {
        self.entry_mut(index)?.set_visible(visible);
        Ok(())
    }

    /// Append a slot holding `text`; returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::FunctionLimit`] when all slots are in use.
    pub fn push(&mut self, text: &str) -> Result<usize, GraphError> {
        if self.entries.len() >= self.max {
            return Err(GraphError::FunctionLimit(self.max));
        }
        let index = self.entries.len();
        self.entries
            .push(FunctionEntry::new(text, Color::palette(index)));
        Ok(index)
    }

    /// Drop the last slot unless it is the only one.
    ///
    /// Returns whether a slot was removed.
    pub fn remove_last(&mut self) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        self.entries.pop();
        true
    }

    /// The formula texts in order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(FunctionEntry::text).collect()
    }

    /// The first slot with a parse error, formatted for display.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.entries.iter().enumerate().find_map(|(i, entry)| {
            entry
                .error()
                .map(|e| format!("f{}: {e}", i + 1))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_keeps_last_good_expression() {
        let mut entry = FunctionEntry::new("x^2", Color::WHITE);
        assert!(entry.error().is_none());
        let err = entry.set_text("x+*2").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(entry.text(), "x+*2");
        assert_eq!(entry.expression().unwrap().source(), "x^2");
        assert_eq!(entry.error(), Some(&err));

        entry.set_text("x^3").unwrap();
        assert!(entry.error().is_none());
        assert_eq!(entry.expression().unwrap().source(), "x^3");
    }

    #[test]
    fn test_blank_text_clears() {
        let mut entry = FunctionEntry::new("x", Color::WHITE);
        entry.set_text("  ").unwrap();
        assert!(entry.expression().is_none());
        assert!(entry.error().is_none());
    }

    #[test]
    fn test_hidden_entry_not_plottable() {
        let mut entry = FunctionEntry::new("x", Color::WHITE);
        assert!(entry.plottable().is_some());
        entry.set_visible(false);
        assert!(entry.plottable().is_none());
    }

    #[test]
    fn test_set_from_texts() {
        let set = FunctionSet::from_texts(&["x", "2x", "3x"], 2);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().color(), Color::palette(1));

        let empty: FunctionSet = FunctionSet::from_texts::<&str>(&[], 18);
        assert_eq!(empty.len(), 1);
        assert!(!empty.is_empty());
    }

    #[test]
    fn test_push_and_remove() {
        let mut set = FunctionSet::from_texts(&["x"], 2);
        assert_eq!(set.push("sin(x)").unwrap(), 1);
        assert!(matches!(set.push("cos(x)"), Err(GraphError::FunctionLimit(2))));
        assert!(set.remove_last());
        assert!(!set.remove_last());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_text_errors() {
        let mut set = FunctionSet::from_texts(&["x"], 4);
        assert!(matches!(
            set.set_text(3, "x"),
            Err(GraphError::FunctionIndex { index: 3, len: 1 })
        ));
        assert!(matches!(set.set_text(0, "(x"), Err(GraphError::Parse(_))));
        assert_eq!(set.error_message().unwrap(), "f1: unclosed '(' at position 0");
        assert_eq!(set.texts(), vec!["(x"]);
    }
}
