pub mod codegen;
pub mod error;
pub mod ir;
pub mod load;
pub mod parse;

#[cfg(test)]
mod tests;
