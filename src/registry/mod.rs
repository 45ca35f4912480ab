/// Registry module - owns every registered renderable and groups them
/// into recording buckets

pub mod renderables;

pub use renderables::*;
