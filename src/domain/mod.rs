pub mod kpi;
pub mod records;

pub use kpi::*;
pub use records::*;
