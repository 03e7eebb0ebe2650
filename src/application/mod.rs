pub mod distribution;
pub mod initialize;
pub mod sync;

pub use distribution::apply_distribution;
pub use initialize::{InitReport, InitializeUseCase};
pub use sync::{SyncReport, SyncUseCase};
