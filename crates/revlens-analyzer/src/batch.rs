//! Bounding the number of reviews forwarded to the model.

/// Returns the first `min(items.len(), max_batch_size)` items, in order.
///
/// Re-applying with the same cap is a no-op.
#[must_use]
pub fn sample<T>(items: &[T], max_batch_size: usize) -> &[T] {
    &items[..items.len().min(max_batch_size)]
}

/// Ordered review texts bound for one model request.
///
/// Never empty and never longer than the cap it was built with. An empty
/// extraction has no batch at all; see [`ReviewBatch::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewBatch {
    reviews: Vec<String>,
}

impl ReviewBatch {
    /// Keeps the [`sample`] of `reviews` under `max_batch_size` and wraps it.
    ///
    /// Returns `None` when nothing would remain (no reviews, or a zero cap).
    #[must_use]
    pub fn new(mut reviews: Vec<String>, max_batch_size: usize) -> Option<Self> {
        let kept = sample(&reviews, max_batch_size).len();
        reviews.truncate(kept);
        if reviews.is_empty() {
            return None;
        }
        Some(Self { reviews })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.reviews
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.reviews.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.reviews
    }
}

impl<'a> IntoIterator for &'a ReviewBatch {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.reviews.iter()
    }
}
