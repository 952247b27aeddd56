use std::fmt;

use serde::{Deserialize, Serialize};

/// One measured quantity a node can report. Widths, column names and value
/// conversions all hang off this enum so that adding a sensor is a single
/// table edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensor {
    Temperature,
    Humidity,
    Light,
    Motion,
    LowBattery,
    SupplyVoltage,
}

impl Sensor {
    pub const ALL: [Sensor; 6] = [
        Sensor::Temperature,
        Sensor::Humidity,
        Sensor::Light,
        Sensor::Motion,
        Sensor::LowBattery,
        Sensor::SupplyVoltage,
    ];

    /// Number of bits the sensor occupies in a packed payload.
    pub fn bit_width(self) -> u32 {
        match self {
            Sensor::Temperature => 10,   // -512..+512, tenths of a degree
            Sensor::Humidity => 7,       // 0..100
            Sensor::Light => 8,          // 0..255
            Sensor::Motion => 1,         // 0..1
            Sensor::LowBattery => 1,     // 0..1
            Sensor::SupplyVoltage => 12, // 0..4095 mV
        }
    }

    /// SQL column holding the sensor's current value.
    pub fn column(self) -> &'static str {
        match self {
            Sensor::Temperature => "temperature",
            Sensor::Humidity => "humidity",
            Sensor::Light => "light",
            Sensor::Motion => "motion",
            Sensor::LowBattery => "lowbat",
            Sensor::SupplyVoltage => "vcc",
        }
    }

    /// Convert the raw unsigned field into a typed reading.
    ///
    /// Out-of-range raw values (a humidity above 100, say) are passed through
    /// unclamped; sensors are noisy and the store keeps what the radio said.
    pub fn convert(self, raw: u64) -> Value {
        match self {
            Sensor::Temperature => {
                let mut tenths = raw as i64;
                // 10-bit two's complement: anything past +512 wraps negative
                if tenths > 512 {
                    tenths -= 1024;
                }
                Value::Celsius(tenths as f64 / 10.0)
            }
            Sensor::Humidity => Value::Percent(raw as u8),
            Sensor::Light => Value::Percent((raw * 100 / 255) as u8),
            Sensor::Motion | Sensor::LowBattery => Value::Flag(raw != 0),
            Sensor::SupplyVoltage => Value::Millivolts(raw as u16),
        }
    }
}

/// A converted sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Celsius(f64),
    Percent(u8),
    Flag(bool),
    Millivolts(u16),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Celsius(v) => write!(f, "{v:.1}"),
            Value::Percent(v) => write!(f, "{v}"),
            Value::Flag(v) => write!(f, "{v}"),
            Value::Millivolts(v) => write!(f, "{v}"),
        }
    }
}

/// The sensor-node hardware model. The wire code identifies the kind; the
/// kind fixes which sensors the node reports and their packing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// JeeNode with temperature, humidity, light and motion sensors.
    JeenodeThlm,
    /// JeeNode with temperature, humidity and light sensors.
    JeenodeThl,
    /// TinyTX reporting temperature only.
    TinytxT,
    /// TinyTX reporting temperature and humidity.
    TinytxTh,
    /// TinyTX reporting temperature and light.
    TinytxTl,
}

impl NodeKind {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(NodeKind::JeenodeThlm),
            2 => Some(NodeKind::JeenodeThl),
            3 => Some(NodeKind::TinytxT),
            4 => Some(NodeKind::TinytxTh),
            5 => Some(NodeKind::TinytxTl),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            NodeKind::JeenodeThlm => 1,
            NodeKind::JeenodeThl => 2,
            NodeKind::TinytxT => 3,
            NodeKind::TinytxTh => 4,
            NodeKind::TinytxTl => 5,
        }
    }

    /// Sensors in wire transmission order, which is also bit-packing order.
    pub fn sensors(self) -> &'static [Sensor] {
        match self {
            NodeKind::JeenodeThlm => &[
                Sensor::Temperature,
                Sensor::Humidity,
                Sensor::Light,
                Sensor::Motion,
                Sensor::LowBattery,
            ],
            NodeKind::JeenodeThl => &[
                Sensor::Temperature,
                Sensor::Humidity,
                Sensor::Light,
                Sensor::LowBattery,
            ],
            NodeKind::TinytxT => &[Sensor::Temperature, Sensor::SupplyVoltage],
            NodeKind::TinytxTh => &[
                Sensor::Temperature,
                Sensor::Humidity,
                Sensor::SupplyVoltage,
            ],
            NodeKind::TinytxTl => &[
                Sensor::Temperature,
                Sensor::Light,
                Sensor::SupplyVoltage,
            ],
        }
    }

    /// Exact payload length in bytes for this kind's sensor set.
    pub fn payload_len(self) -> usize {
        let bits: u32 = self.sensors().iter().map(|s| s.bit_width()).sum();
        bits.div_ceil(8) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_fit_the_decoder_accumulator() {
        for sensor in Sensor::ALL {
            assert!(sensor.bit_width() <= 64);
        }
    }

    #[test]
    fn payload_len_matches_bit_sums() {
        assert_eq!(NodeKind::JeenodeThlm.payload_len(), 4); // 27 bits
        assert_eq!(NodeKind::JeenodeThl.payload_len(), 4); // 26 bits
        assert_eq!(NodeKind::TinytxT.payload_len(), 3); // 22 bits
        assert_eq!(NodeKind::TinytxTh.payload_len(), 4); // 29 bits
        assert_eq!(NodeKind::TinytxTl.payload_len(), 4); // 30 bits
    }

    #[test]
    fn kind_codes_round_trip() {
        for code in 1..=5u8 {
            let kind = NodeKind::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert_eq!(NodeKind::from_code(0), None);
        assert_eq!(NodeKind::from_code(6), None);
    }

    #[test]
    fn temperature_sign_handling() {
        assert_eq!(Sensor::Temperature.convert(0), Value::Celsius(0.0));
        assert_eq!(Sensor::Temperature.convert(213), Value::Celsius(21.3));
        assert_eq!(Sensor::Temperature.convert(512), Value::Celsius(51.2));
        assert_eq!(Sensor::Temperature.convert(1024), Value::Celsius(0.0));
        assert_eq!(Sensor::Temperature.convert(614), Value::Celsius(-41.0));
        assert_eq!(Sensor::Temperature.convert(1012), Value::Celsius(-1.2));
    }

    #[test]
    fn light_scaling() {
        assert_eq!(Sensor::Light.convert(0), Value::Percent(0));
        assert_eq!(Sensor::Light.convert(255), Value::Percent(100));
        assert_eq!(Sensor::Light.convert(128), Value::Percent(50));
        assert_eq!(Sensor::Light.convert(156), Value::Percent(61));
    }

    #[test]
    fn flags_and_passthrough() {
        assert_eq!(Sensor::Motion.convert(0), Value::Flag(false));
        assert_eq!(Sensor::Motion.convert(1), Value::Flag(true));
        assert_eq!(Sensor::LowBattery.convert(1), Value::Flag(true));
        // humidity is not clamped to 100
        assert_eq!(Sensor::Humidity.convert(113), Value::Percent(113));
        assert_eq!(Sensor::SupplyVoltage.convert(3142), Value::Millivolts(3142));
    }
}
