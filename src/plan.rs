//! Offset/limit windowing over the discovered link list.

use crate::error::RangeError;
use crate::types::DownloadWindow;
use std::num::NonZeroUsize;

/// Computes which link ordinals a run should download.
///
/// `start` is 1-based. The window covers `[start, min(total, start + limit - 1)]`.
///
/// # Errors
///
/// Returns [`RangeError`] when `start` lies past the last discovered link,
/// including when no links were discovered at all.
///
/// # Example
///
/// ```
/// use epw_harvest::plan_window;
/// use std::num::NonZeroUsize;
///
/// let nz = |n| NonZeroUsize::new(n).unwrap();
/// let window = plan_window(12, nz(8), nz(10)).unwrap();
/// assert_eq!(window.end_ordinal(), 12);
/// assert!(plan_window(3, nz(4), nz(10)).is_err());
/// ```
pub fn plan_window(
    total: usize,
    start: NonZeroUsize,
    limit: NonZeroUsize,
) -> Result<DownloadWindow, RangeError> {
    let start = start.get();
    if start > total {
        return Err(RangeError { start, total });
    }

    let end = total.min(start.saturating_add(limit.get() - 1));
    Ok(DownloadWindow {
        start_ordinal: start,
        count: end - start + 1,
        total_available: total,
    })
}
