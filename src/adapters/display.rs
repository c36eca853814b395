//! Display adapter.
//!
//! Implements [`DisplayPort`] for boards without a panel driver: widget
//! updates are kept in a shadow state and written to the log when they
//! change.  A panel-backed adapter would replace this one behind the same
//! trait.

use log::{debug, info};

use crate::app::ports::DisplayPort;

/// Last values pushed to each widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    pub aqi_arrow_y: Option<i16>,
    pub eco2_arrow_y: Option<i16>,
    pub aqi_label: heapless::String<8>,
    pub eco2_label: heapless::String<8>,
}

#[derive(Default)]
pub struct LogDisplay {
    initialised: bool,
    state: WidgetState,
    dirty: bool,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

fn set_label(label: &mut heapless::String<8>, text: &str) -> bool {
    if label.as_str() == text {
        return false;
    }
    label.clear();
    let _ = label.push_str(text);
    true
}

impl DisplayPort for LogDisplay {
    fn init(&mut self) {
        self.initialised = true;
        info!("Display: log-backed UI ready");
    }

    fn handler(&mut self) {
        if !self.dirty || !self.initialised {
            return;
        }
        self.dirty = false;
        debug!(
            "Display: AQI {} (y={:?}) | eCO2 {} (y={:?})",
            self.state.aqi_label,
            self.state.aqi_arrow_y,
            self.state.eco2_label,
            self.state.eco2_arrow_y
        );
    }

    fn set_aqi_arrow_y(&mut self, y: i16) {
        self.dirty |= self.state.aqi_arrow_y.replace(y) != Some(y);
    }

    fn set_eco2_arrow_y(&mut self, y: i16) {
        self.dirty |= self.state.eco2_arrow_y.replace(y) != Some(y);
    }

    fn set_aqi_label(&mut self, text: &str) {
        self.dirty |= set_label(&mut self.state.aqi_label, text);
    }

    fn set_eco2_label(&mut self, text: &str) {
        self.dirty |= set_label(&mut self.state.eco2_label, text);
    }
}
