pub mod errors;
pub mod mode;
pub mod ownership;
pub mod records;
pub mod report;

pub use errors::*;
pub use mode::*;
pub use ownership::*;
pub use records::*;
pub use report::*;
