mod binding;
mod driver;

pub use binding::{IntoType, IntoTypePtr, UseType, UseTypePtr};
pub use driver::DatabaseDriver;
