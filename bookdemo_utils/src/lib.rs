mod macros;

/// Returns the version of the backend, as reported by the CLI and in the
/// user agent of outgoing HTTP requests.
pub fn bookdemo_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub trait Apply {
    /// Applies the function `f` only if `value` is `Some(...)` and provides the
    /// contained value to `f`.
    ///
    /// #### Example
    /// ```rust
    /// # use bookdemo_utils::Apply;
    /// fn add_option(a: i32, b: Option<i32>) -> i32 {
    ///     a.apply_map(b, |slf, arg| slf + arg)
    /// }
    /// assert_eq!(add_option(1, None), 1);
    /// assert_eq!(add_option(1, Some(2)), 3);
    /// ```
    fn apply_map<U>(self, value: Option<U>, f: impl FnOnce(Self, U) -> Self) -> Self
    where
        Self: Sized,
    {
        if let Some(value) = value {
            f(self, value)
        } else {
            self
        }
    }
}

impl<T> Apply for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_matches_guard() {
        let value: Result<u8, ()> = Ok(7);
        assert_matches!(value, Ok(x) if *x == 7);
    }

    #[test]
    #[should_panic(expected = "does not match `Ok(_)`")]
    fn assert_matches_mismatch() {
        let value: Result<u8, ()> = Err(());
        assert_matches!(value, Ok(_));
    }
}
