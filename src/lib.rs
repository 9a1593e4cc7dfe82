pub mod character;
pub mod error;
pub mod rotation;
pub mod sim;
pub mod spell;

#[cfg(test)]
mod test;
