#![forbid(unsafe_code)]


#[cfg(test)]
mod generation;
