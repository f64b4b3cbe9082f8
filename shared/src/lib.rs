pub mod bitmap;
pub mod colors;
pub mod debounce;
pub mod geo;
pub mod probe;
pub mod sampler;

pub use bitmap::RgbaBitmap;
pub use colors::ColorValue;
pub use debounce::{Debouncer, ManualScheduler, ScheduledTask, Scheduler};
pub use geo::{LatLng, LatLngBounds, TileCoord};
pub use probe::{ColorProbe, SampleSink};
pub use sampler::{ImageSlot, PixelCoord, PixelSource, SampleError, rescale, sample};
