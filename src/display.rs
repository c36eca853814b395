//! Gauge mapping for the front display.
//!
//! The UI shows two vertical scales with an arrow each.  Arrow positions are
//! Y offsets in display pixels relative to the scale's centre, positive
//! downwards, so better air sits lower on the scale.
//!
//! ```text
//!   y    AQI   eCO2 (ppm)
//!  -35    5    >= 1500
//!  -15    4    1000..1500
//!    5    3     800..1000
//!   25    2     600..800
//!   45    1     400..600
//! ```

use heapless::String;

use crate::app::ports::DisplayPort;
use crate::sensors::Sample;

/// eCO2 thresholds (ppm, inclusive lower bound) and arrow positions.
const ECO2_BUCKETS: [(u16, i16); 5] = [(1500, -35), (1000, -15), (800, 5), (600, 25), (400, 45)];

/// Arrow Y for an AQI index: 1 → 45 then 20 px up per step.
pub fn aqi_arrow_y(aqi: u16) -> i16 {
    let steps = i32::from(aqi) - 1;
    (45 - steps * 20).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Arrow Y for an eCO2 reading.  `None` below 400 ppm: the arrow keeps its
/// previous position.
pub fn eco2_arrow_y(eco2: u16) -> Option<i16> {
    ECO2_BUCKETS
        .iter()
        .find(|(floor, _)| eco2 >= *floor)
        .map(|&(_, y)| y)
}

/// Widget values derived from one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeReading {
    pub aqi_arrow_y: i16,
    pub eco2_arrow_y: Option<i16>,
    pub aqi_label: String<6>,
    pub eco2_label: String<6>,
}

impl GaugeReading {
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            aqi_arrow_y: aqi_arrow_y(sample.aqi),
            eco2_arrow_y: eco2_arrow_y(sample.eco2),
            aqi_label: label(sample.aqi),
            eco2_label: label(sample.eco2),
        }
    }

    /// Push the values to the widgets.
    pub fn apply(&self, display: &mut impl DisplayPort) {
        display.set_aqi_arrow_y(self.aqi_arrow_y);
        display.set_eco2_label(&self.eco2_label);
        display.set_aqi_label(&self.aqi_label);
        if let Some(y) = self.eco2_arrow_y {
            display.set_eco2_arrow_y(y);
        }
    }
}

fn label(value: u16) -> String<6> {
    use core::fmt::Write;
    let mut s = String::new();
    // u16 is at most 5 digits.
    let _ = write!(s, "{value}");
    s
}
