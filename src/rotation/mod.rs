//! Rotation discovery: the digraphs the search is built on ([`graph`]),
//! the outer search loop ([`finder`]), and turning an exposed
//! strongly-connected component into a concrete rotation ([`apply`]).

pub mod apply;
pub mod finder;
pub mod graph;

pub use apply::Rotation;
