// Crate-level tests spanning several modules
#[cfg(test)]
mod integration;
