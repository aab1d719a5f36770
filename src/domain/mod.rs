pub mod lenient;
pub mod month;
pub mod order;
pub mod store_note;

pub use month::*;
pub use order::*;
pub use store_note::*;
