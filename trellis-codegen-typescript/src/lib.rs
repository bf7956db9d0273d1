mod emit;
mod generate;
mod header;
mod router;
mod types;

pub use generate::*;
pub use header::FILE_HEADER;
pub use router::*;
