/// Checks that a numerical value lies in the closed interval `[a,b]`, returning
/// an [`Error::OutOfInterval`](crate::Error::OutOfInterval) from the enclosing function if not
///
/// ### Example
/// ```ignore
/// let alpha = 2.0;
/// ensure_interval!(alpha, 0.0, 1.0);
/// ```
/// This returns the error "invalid value for \`alpha\`: 2 is not in the interval \[0, 1\]".
#[macro_export]
macro_rules! ensure_interval {
    ($var:expr, $a:expr, $b:expr) => {
        if !($var >= $a && $var <= $b) {
            return Err($crate::Error::OutOfInterval {
                name: stringify!($var),
                value: $var,
                interval: format!("[{}, {}]", $a, $b),
            });
        }
    };
}

/// Like [`ensure_interval!`], but for the half-open interval `[a,b)`
#[macro_export]
macro_rules! ensure_half_open {
    ($var:expr, $a:expr, $b:expr) => {
        if !($var >= $a && $var < $b) {
            return Err($crate::Error::OutOfInterval {
                name: stringify!($var),
                value: $var,
                interval: format!("[{}, {})", $a, $b),
            });
        }
    };
}
