#[macro_use]
extern crate serde;

mod ballot;
mod election;
mod error;
mod key;
mod tally;

pub use ballot::*;
pub use election::*;
pub use error::*;
pub use key::*;
pub use tally::*;
