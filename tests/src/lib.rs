//! Cross-crate tests for netradar, plus the simulated link they run on.

pub mod sim;

#[cfg(test)]
mod discovery;
#[cfg(test)]
mod net;
