mod fen;

pub mod helpers;
pub mod op;
mod secret;

pub use fen::{Fen, FenConversionError};
pub use secret::Secret;
