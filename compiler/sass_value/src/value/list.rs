//! Sass lists.

use std::sync::Arc;

use sass_ir::ListSeparator;

use crate::Value;

/// A Sass list: shared elements, a separator, optional square brackets.
#[derive(Clone, Debug)]
pub struct SassList {
    elements: Arc<Vec<Value>>,
    separator: ListSeparator,
    bracketed: bool,
}

impl SassList {
    pub fn new(elements: Vec<Value>, separator: ListSeparator, bracketed: bool) -> Self {
        SassList {
            elements: Arc::new(elements),
            separator,
            bracketed,
        }
    }

    /// The empty, unbracketed list.
    pub fn empty() -> Self {
        SassList::new(Vec::new(), ListSeparator::Undecided, false)
    }

    #[inline]
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn separator(&self) -> ListSeparator {
        self.separator
    }

    #[inline]
    pub fn is_bracketed(&self) -> bool {
        self.bracketed
    }

    /// Structural equality. The separator only distinguishes lists long
    /// enough for it to be observable.
    pub fn equals(&self, other: &SassList) -> bool {
        if self.len() != other.len() || self.bracketed != other.bracketed {
            return false;
        }
        if !separators_match(self.separator, other.separator, self.len()) {
            return false;
        }
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| a == b)
    }
}

/// Whether two separators are indistinguishable at a given length.
pub fn separators_match(a: ListSeparator, b: ListSeparator, len: usize) -> bool {
    len <= 1 || a == b
}
