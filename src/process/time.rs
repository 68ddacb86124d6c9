/// Value stored for a missing or unknown hour or minute.
pub const UNKNOWN: i8 = -1;

/// Hour value the source uses for "time not known".
const UNKNOWN_HOUR_MARKER: i16 = 25;
/// Minute value the source uses for "minute not known".
const UNKNOWN_MINUTE_MARKER: i16 = 60;

/// Hour and minute decoded from the combined `hhmm` time column.
///
/// The column keeps the source integer untouched; the unknown-hour (`25`)
/// and unknown-minute (`60`) markers are turned into [`UNKNOWN`] here, when
/// the value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: i8,
    pub minute: i8,
}

impl TimeOfDay {
    pub fn decode(hhmm: i16) -> Self {
        if hhmm < 0 {
            return Self {
                hour: UNKNOWN,
                minute: UNKNOWN,
            };
        }
        // anything outside a clock value decodes as unknown, like the markers
        let hour = match hhmm / 100 {
            UNKNOWN_HOUR_MARKER => UNKNOWN,
            h @ 0..=23 => h as i8,
            _ => UNKNOWN,
        };
        let minute = match hhmm % 100 {
            UNKNOWN_MINUTE_MARKER => UNKNOWN,
            m @ 0..=59 => m as i8,
            _ => UNKNOWN,
        };
        Self { hour, minute }
    }

    pub fn hour(&self) -> Option<u8> {
        (self.hour >= 0).then_some(self.hour as u8)
    }

    pub fn minute(&self) -> Option<u8> {
        (self.minute >= 0).then_some(self.minute as u8)
    }
}
