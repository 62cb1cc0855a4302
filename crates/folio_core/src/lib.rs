//! Folio Core
//!
//! Shared building blocks for the portfolio site:
//! - Seeded math for scene placement
//! - Frame clock and frame statistics
//! - Background scene model (shapes, particle field, motion)
//! - Hero typewriter and tech stack orbit animations
//! - Project catalog and filtering

pub mod math;
pub mod orbit;
pub mod projects;
pub mod scene;
pub mod time;
pub mod typing;

pub use glam;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
