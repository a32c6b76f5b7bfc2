pub mod registry;

#[cfg(test)]
pub mod testing;
