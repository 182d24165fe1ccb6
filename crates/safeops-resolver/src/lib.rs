mod error;
mod resolver;

pub use error::ResolveError;
pub use resolver::{InputResolver, RunInputs, wants_path};
