// Core modules implementing extraction, column storage, reduction, and error modeling.
pub mod batch;
pub mod column;
pub mod error;
pub mod extract;
pub mod path;
pub mod reduce;
