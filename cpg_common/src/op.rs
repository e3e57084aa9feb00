/// Implements a binary operator trait for a single-field newtype, delegating to the inner value.
///
/// ```rust,ignore
/// op!(binary Cents, Add, add);
/// ```
#[macro_export]
macro_rules! op {
    (binary $type:ty, $trait:ident, $fn:ident) => {
        impl std::ops::$trait for $type {
            type Output = Self;

            fn $fn(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$fn(self.0, rhs.0))
            }
        }
    };
}
