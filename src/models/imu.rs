use serde::{Deserialize, Serialize};

/// One IMU reading: timestamp plus accelerometer, gyroscope and
/// magnetometer axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    /// Capture time in seconds, client clock.
    pub t: f64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl ImuSample {
    /// Flatten to the 9-axis feature row the model consumes. The timestamp
    /// is dropped; the model works on sensor values only.
    pub fn as_row(&self) -> [f32; 9] {
        [
            self.ax as f32,
            self.ay as f32,
            self.az as f32,
            self.gx as f32,
            self.gy as f32,
            self.gz as f32,
            self.mx as f32,
            self.my as f32,
            self.mz as f32,
        ]
    }
}

/// A batch of samples streamed for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImuWindow {
    pub session_id: String,
    pub samples: Vec<ImuSample>,
    /// Client-side window bounds in seconds.
    pub window_start: f64,
    pub window_end: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64) -> ImuSample {
        ImuSample {
            t,
            ax: 0.1,
            ay: -0.2,
            az: 9.8,
            gx: 0.01,
            gy: 0.02,
            gz: 0.03,
            mx: 25.0,
            my: -10.0,
            mz: 40.0,
        }
    }

    #[test]
    fn test_as_row_drops_timestamp() {
        let row = sample(123.456).as_row();
        assert_eq!(row.len(), 9);
        assert_eq!(row[0], 0.1f32);
        assert_eq!(row[2], 9.8f32);
        assert_eq!(row[8], 40.0f32);
    }

    #[test]
    fn test_window_wire_format() {
        let json = r#"{
            "sessionId": "abc-123",
            "samples": [
                {"t": 0.01, "ax": 0.1, "ay": -0.2, "az": 9.8,
                 "gx": 0.01, "gy": 0.02, "gz": 0.03,
                 "mx": 25.0, "my": -10.0, "mz": 40.0}
            ],
            "windowStart": 0.0,
            "windowEnd": 1.0
        }"#;

        let window: ImuWindow = serde_json::from_str(json).unwrap();
        assert_eq!(window.session_id, "abc-123");
        assert_eq!(window.samples.len(), 1);
        assert_eq!(window.samples[0].t, 0.01);
        assert_eq!(window.window_end, 1.0);

        let back = serde_json::to_value(&window).unwrap();
        assert!(back.get("sessionId").is_some());
        assert!(back.get("windowStart").is_some());
        assert!(back.get("session_id").is_none());
    }
}
