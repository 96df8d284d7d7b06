use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Returns a name derived from `base` that has never been returned before.
///
/// The result has the form `<base>_<n>`. Any trailing `_<digits>` suffix of
/// `base` is dropped first so repeated renaming does not grow names without
/// bound.
///
/// ## Example
/// ```
/// use tabula::util::names::fresh_name;
///
/// let a = fresh_name("x");
/// let b = fresh_name(&a);
///
/// assert!(a.starts_with("x_"));
/// assert!(b.starts_with("x_"));
/// assert_ne!(a, b);
/// ```
#[must_use]
pub fn fresh_name(base: &str) -> String {
    let stem = match base.rsplit_once('_') {
        Some((stem, digits))
            if !stem.is_empty() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            stem
        },
        _ => base,
    };
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{stem}_{id}")
}
