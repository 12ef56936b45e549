pub mod error;
pub mod history;
pub mod traits;
pub mod types;

pub use error::*;
pub use history::*;
pub use traits::*;
pub use types::*;
