#[cfg(test)]
mod parameters_tests;
