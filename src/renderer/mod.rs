//! Render-side consumers of the simulation
//!
//! Projection and draw ordering only; rasterization belongs to the host.

pub mod frame;
pub mod projection;

pub use frame::{Frame, SpriteInstance, build_frame};
pub use projection::{Layout, ScreenPoint};
