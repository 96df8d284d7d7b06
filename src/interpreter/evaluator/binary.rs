/// Dispatch of binary combinators to the modules below.
pub mod core;

/// `and` and `or`.
pub mod logic;

/// Structural `==` and `<`.
pub mod comparison;

/// `union`, `intersect` and `except` over tables.
pub mod set;
