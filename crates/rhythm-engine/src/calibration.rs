use crate::error::EngineError;

/// Collects tap offsets against a metronome to estimate input latency.
#[derive(Debug, Clone)]
pub struct Calibrator {
    first_beat: f64,
    interval: f64,
    offsets: Vec<f64>,
}

impl Calibrator {
    pub fn new(first_beat: f64, interval: f64) -> Result<Self, EngineError> {
        if !first_beat.is_finite() {
            return Err(EngineError::InvalidOption {
                name: "firstBeat",
                value: first_beat,
            });
        }
        if !interval.is_finite() || interval <= 0.0 {
            return Err(EngineError::InvalidOption {
                name: "interval",
                value: interval,
            });
        }
        Ok(Self {
            first_beat,
            interval,
            offsets: Vec::new(),
        })
    }

    /// Record a tap and return its signed offset to the nearest beat.
    pub fn record(&mut self, timestamp: f64) -> Option<f64> {
        if !timestamp.is_finite() {
            return None;
        }
        let beat = ((timestamp - self.first_beat) / self.interval).round();
        if beat < 0.0 {
            log::warn!(
                "Calibration input at {}ms precedes first beat {}ms, dropped",
                timestamp,
                self.first_beat
            );
            return None;
        }
        let offset = timestamp - (self.first_beat + beat * self.interval);
        self.offsets.push(offset);
        log::debug!("Calibration beat {} offset {:.1}ms", beat, offset);
        Some(offset)
    }

    pub fn mean_offset(&self) -> Option<f64> {
        if self.offsets.is_empty() {
            return None;
        }
        Some(self.offsets.iter().sum::<f64>() / self.offsets.len() as f64)
    }

    pub fn sample_count(&self) -> usize {
        self.offsets.len()
    }
}
