pub mod combined;
pub mod ecg;
pub mod manual;
pub mod rapid_drop;
pub mod registry;
pub mod threshold;
pub mod trend;

pub use combined::*;
pub use ecg::*;
pub use manual::*;
pub use rapid_drop::*;
pub use registry::*;
pub use threshold::*;
pub use trend::*;
