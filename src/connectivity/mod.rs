//! Ragged and blocked element→node connectivity tables.

pub mod block;
pub mod irregular;
pub mod multiblock;

/// Index type stored in connectivity tables. Signed so the missing value
/// sentinel can be negative.
pub type Idx = i32;

pub use block::{BlockConnectivity, BlockView};
pub use irregular::{ConnectivityObserver, IrregularConnectivity};
pub use multiblock::MultiBlockConnectivity;
