//! Macros for constructing option structs from `Default` plus field assignments.
//!
//! New option fields can be added without breaking call sites that use these macros.

/// Construct [`crate::Options`] from `Default` and a list of field assignments.
///
/// ```rust
/// use yaml12::options::DuplicateKeyPolicy;
///
/// let options = yaml12::options! {
///     duplicate_keys: DuplicateKeyPolicy::FirstWins,
///     with_snippet: false,
/// };
/// assert!(!options.with_snippet);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::Options::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}

/// Construct [`crate::Budget`] from `Default` and a list of field assignments.
///
/// ```rust
/// let budget = yaml12::budget! { max_aliases: 4 };
/// assert_eq!(budget.max_aliases, 4);
/// ```
#[macro_export]
macro_rules! budget {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut budget = $crate::Budget::default();
        $(
            budget.$field = $value;
        )*
        budget
    }};
}

/// Construct [`crate::SerializerOptions`] from `Default` and a list of field assignments.
///
/// ```rust
/// let opts = yaml12::serializer_options! {
///     indent_step: 4,
///     quote_all: true,
/// };
/// assert_eq!(opts.indent_step, 4);
/// ```
#[macro_export]
macro_rules! serializer_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::SerializerOptions::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}
