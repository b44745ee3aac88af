mod core;
mod ops;

pub use self::core::Collection;
