use std::cell::RefCell;
use std::rc::Rc;

use crate::colors::ColorValue;
use crate::debounce::{Debouncer, Scheduler};
use crate::sampler::{ImageSlot, PixelCoord, PixelSource, SampleError, sample};

/// Where probe results go. Only successful samples change what is displayed.
pub trait SampleSink {
    fn publish(&self, color: ColorValue);

    /// A sample failed; the previously displayed color must stay as it is.
    fn decline(&self, _coord: PixelCoord, _err: &SampleError) {}
}

/// Pointer-driven color picking over one overlay image.
///
/// Moves are debounced; clicks sample immediately and leave any pending move
/// sample alone.
pub struct ColorProbe<P: PixelSource + 'static, S: Scheduler> {
    slot: Rc<RefCell<ImageSlot<P>>>,
    sink: Rc<dyn SampleSink>,
    hover: Debouncer<S, PixelCoord>,
}

impl<P: PixelSource + 'static, S: Scheduler> ColorProbe<P, S> {
    pub fn new(scheduler: S, hover_delay_ms: u32, sink: impl SampleSink + 'static) -> Self {
        let slot = Rc::new(RefCell::new(ImageSlot::Loading));
        let sink: Rc<dyn SampleSink> = Rc::new(sink);

        let hover = {
            let slot = Rc::clone(&slot);
            let sink = Rc::clone(&sink);
            Debouncer::new(scheduler, hover_delay_ms, move |coord| {
                let result = sample(&*slot.borrow(), coord);
                deliver(sink.as_ref(), coord, result);
            })
        };

        Self { slot, sink, hover }
    }

    /// The overlay image is ready for pixel reads.
    pub fn attach(&self, source: P) {
        *self.slot.borrow_mut() = ImageSlot::Ready(source);
    }

    /// The overlay image is gone or unreadable.
    pub fn detach(&self, reason: impl Into<String>) {
        self.hover.cancel();
        *self.slot.borrow_mut() = ImageSlot::Unavailable(reason.into());
    }

    pub fn on_move(&self, coord: PixelCoord) {
        self.hover.trigger(coord);
    }

    pub fn on_click(&self, coord: PixelCoord) -> Result<ColorValue, SampleError> {
        let result = sample(&*self.slot.borrow(), coord);
        deliver(self.sink.as_ref(), coord, result.clone());
        result
    }

    pub fn cancel_pending(&self) {
        self.hover.cancel();
    }

    pub fn is_hover_pending(&self) -> bool {
        self.hover.is_pending()
    }
}

fn deliver(sink: &dyn SampleSink, coord: PixelCoord, result: Result<ColorValue, SampleError>) {
    match result {
        Ok(color) => sink.publish(color),
        Err(err) => sink.decline(coord, &err),
    }
}
