//! View rendering

mod split;

pub use split::render_split;

#[cfg(test)]
mod tests;
