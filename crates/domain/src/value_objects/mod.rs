pub mod amount;
pub mod window;

pub use amount::{Amount, AmountError};
pub use window::{Window, WindowBound, WindowError};
