pub mod post;

pub use post::{MediaType, PostRecord};
