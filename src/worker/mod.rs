pub mod protocol;
pub mod context;
pub mod runtime;
