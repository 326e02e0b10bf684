mod reference;

pub use reference::{RepositoryReference, RepositoryUrlError};
