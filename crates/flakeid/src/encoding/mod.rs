mod alphabet;
mod crockford;
mod error;
mod hex;
mod interface;

pub use alphabet::*;
pub use crockford::*;
pub use error::*;
pub use hex::*;
pub use interface::*;
