/// Two normalized input axes, sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSample {
    pub x_axis: f64,
    pub y_axis: f64,
}

impl InputSample {
    pub fn new(x_axis: f64, y_axis: f64) -> Self {
        Self {
            x_axis: normalize(x_axis),
            y_axis: normalize(y_axis),
        }
    }

    /// Re-applies the `[-1, 1]` clamp to a sample built field by field.
    pub fn normalized(self) -> Self {
        Self::new(self.x_axis, self.y_axis)
    }
}

/// Edge-triggered buttons, sampled once per render frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameEvents {
    pub pause_toggle: bool,
    pub reset_request: bool,
}

pub trait InputSource {
    fn sample(&mut self) -> InputSample;

    fn frame_events(&mut self) -> FrameEvents;
}

/// Display element mirroring a value in `[0, 1]`, such as a UI slider.
pub trait Mirror {
    fn set_value(&mut self, value: f64);
}

fn normalize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_are_clamped() {
        assert_eq!(InputSample::new(2.0, -3.0), InputSample::new(1.0, -1.0));
        assert_eq!(InputSample::new(f64::NAN, 0.25).x_axis, 0.0);
    }

    #[test]
    fn literal_samples_can_be_normalized() {
        let sample = InputSample {
            x_axis: -4.0,
            y_axis: 0.5,
        };
        assert_eq!(sample.normalized(), InputSample::new(-1.0, 0.5));
    }
}
