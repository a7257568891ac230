use serde::{Deserialize, Serialize};

/// Highlight class of a span.
///
/// Declaration order is resolution order: when spans overlap, the earlier
/// category keeps the position, except [`SpanCategory::FlaggedChar`] which
/// is painted over anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpanCategory {
    Comment,
    String,
    Number,
    Keyword,
    FunctionName,
    Operator,
    FlaggedChar,
}

/// Classified byte range `[start, end)` of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub category: SpanCategory,
}

impl Span {
    pub fn new(start: usize, end: usize, category: SpanCategory) -> Self {
        Self {
            start,
            end: end.max(start),
            category,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Adjacent spans do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Result of one tokenizer run, ordered by `(start, category)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSet {
    spans: Vec<Span>,
}

impl SpanSet {
    pub(crate) fn from_unsorted(mut spans: Vec<Span>) -> Self {
        spans.sort_by_key(|s| (s.start, s.category, s.end));
        spans.dedup();
        Self { spans }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Span> {
        self.spans.iter()
    }

    pub fn as_slice(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn of(&self, category: SpanCategory) -> impl Iterator<Item = &Span> + '_ {
        self.spans.iter().filter(move |s| s.category == category)
    }

    /// Category painted at `offset` after overlap resolution.
    pub fn category_at(&self, offset: usize) -> Option<SpanCategory> {
        let categories: Vec<SpanCategory> = self
            .spans
            .iter()
            .take_while(|s| s.start <= offset)
            .filter(|s| s.contains(offset))
            .map(|s| s.category)
            .collect();

        if categories.contains(&SpanCategory::FlaggedChar) {
            return Some(SpanCategory::FlaggedChar);
        }
        categories.into_iter().min()
    }
}

impl<'a> IntoIterator for &'a SpanSet {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlap() {
        let a = Span::new(0, 4, SpanCategory::Comment);
        let b = Span::new(3, 5, SpanCategory::FlaggedChar);
        let c = Span::new(4, 6, SpanCategory::Number);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_span_set_sorted_and_deduped() {
        let set = SpanSet::from_unsorted(vec![
            Span::new(5, 6, SpanCategory::Operator),
            Span::new(0, 3, SpanCategory::Keyword),
            Span::new(5, 6, SpanCategory::Operator),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].start, 0);
    }

    #[test]
    fn test_category_at_resolution() {
        let set = SpanSet::from_unsorted(vec![
            Span::new(0, 10, SpanCategory::Comment),
            Span::new(2, 3, SpanCategory::FlaggedChar),
            Span::new(4, 7, SpanCategory::String),
        ]);
        assert_eq!(set.category_at(0), Some(SpanCategory::Comment));
        assert_eq!(set.category_at(2), Some(SpanCategory::FlaggedChar));
        assert_eq!(set.category_at(5), Some(SpanCategory::Comment));
        assert_eq!(set.category_at(10), None);
    }
}
