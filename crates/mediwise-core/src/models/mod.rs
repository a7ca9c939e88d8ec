//! Domain models for the MediWise analysis core.

mod biomarker;
mod classification;
mod inventory;
mod medicine;
mod upload;

pub use biomarker::*;
pub use classification::*;
pub use inventory::*;
pub use medicine::*;
pub use upload::*;
