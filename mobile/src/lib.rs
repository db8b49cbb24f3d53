// kontakt-bridge-mobile — the surface presented to hybrid-app hosts
// Re-exports the core monitoring API for embedding into iOS/Android shells

pub use kontakt_bridge_core::*;
