//! Plain data produced by the decoders.
//!
//! The loading core treats these opaquely; the only thing it needs from them is
//! the `Cacheable` bound, which closes the set of types a `Cache` can hold.

mod animation;
mod model;
mod sound_track;
mod texture;

pub use animation::*;
pub use model::*;
pub use sound_track::*;
pub use texture::*;

/// Types that can be loaded through a manager and stored in a `Cache`.
///
/// Values are cloned on every cache read and write, so `Clone` must produce a
/// fully independent copy.
pub trait Cacheable: Clone + Send + Sync + 'static {}

impl Cacheable for Image {}
impl Cacheable for Model {}
impl Cacheable for MaterialLibrary {}
impl Cacheable for Animation {}
impl Cacheable for SoundTrack {}
