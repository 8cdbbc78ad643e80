pub mod core;

pub use self::core::{Message, Role, completion_stream};
