//! # Glyphwall Engine
//!
//! Procedural text CAPTCHA images.
//!
//! ## Modules
//! - `generator` - Paints noise and sheared glyphs, returns the answer
//! - `random` - Injected randomness and color / identifier samplers
//! - `surface` - Drawing-surface capability and a recording test double
//! - `raster` - Pixel-buffer surface with PNG output
//! - `session` - Answer, input cells, and validation for one challenge cycle
//!
//! ## Example
//! ```no_run
//! use glyphwall_engine::{CaptchaGenerator, RasterSurface, RngSource};
//!
//! let mut surface = RasterSurface::open_font("assets/fonts/DejaVuSans.ttf")?;
//! let _answer = CaptchaGenerator::default().generate(&mut surface, &mut RngSource::thread())?;
//! surface.save_png("challenge.png")?;
//! # Ok::<(), glyphwall_common::GlyphwallError>(())
//! ```

pub mod generator;
pub mod random;
pub mod raster;
pub mod session;
pub mod surface;

pub use generator::CaptchaGenerator;
pub use random::{RandomSource, RngSource, ScriptedSource};
pub use raster::RasterSurface;
pub use session::{ChallengeSession, InputOutcome};
pub use surface::{RecordingSurface, Surface};
