// src/imu/config.rs

//! # Inertial Sensor Configuration Module
//!
//! Full-scale range and filter-bandwidth settings for the inertial sensor,
//! expressed as exhaustive enums so an unsupported value cannot be smuggled
//! into the device initializer. Bus implementations use the register and
//! sensitivity accessors when programming the part; the estimation code
//! never sees raw register values.

/// Error returned when a requested sensor setting is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested gyro full-scale range (deg/s) is not a supported value.
    UnsupportedGyroRange(u16),
    /// The requested accelerometer full-scale range (g) is not supported.
    UnsupportedAccelRange(u16),
    /// The requested low-pass bandwidth (Hz) is not a supported value.
    UnsupportedBandwidth(u16),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::UnsupportedGyroRange(v) => {
                write!(f, "unsupported gyro range: +/-{} deg/s", v)
            }
            ConfigError::UnsupportedAccelRange(v) => {
                write!(f, "unsupported accelerometer range: +/-{} g", v)
            }
            ConfigError::UnsupportedBandwidth(v) => {
                write!(f, "unsupported filter bandwidth: {} Hz", v)
            }
        }
    }
}

/// Gyroscope full-scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroRange {
    /// +/-250 deg/s.
    Dps250,
    /// +/-500 deg/s.
    Dps500,
    /// +/-1000 deg/s.
    Dps1000,
    /// +/-2000 deg/s.
    Dps2000,
}

impl GyroRange {
    /// Sensitivity in counts per deg/s for this range.
    pub fn sensitivity(self) -> f32 {
        match self {
            GyroRange::Dps250 => 131.07,
            GyroRange::Dps500 => 65.54,
            GyroRange::Dps1000 => 32.77,
            GyroRange::Dps2000 => 16.38,
        }
    }

    /// Value for the gyro configuration register.
    pub fn register_value(self) -> u8 {
        match self {
            GyroRange::Dps250 => 0x00,
            GyroRange::Dps500 => 0x08,
            GyroRange::Dps1000 => 0x10,
            GyroRange::Dps2000 => 0x18,
        }
    }
}

impl TryFrom<u16> for GyroRange {
    type Error = ConfigError;

    fn try_from(dps: u16) -> Result<Self, Self::Error> {
        match dps {
            250 => Ok(GyroRange::Dps250),
            500 => Ok(GyroRange::Dps500),
            1000 => Ok(GyroRange::Dps1000),
            2000 => Ok(GyroRange::Dps2000),
            other => Err(ConfigError::UnsupportedGyroRange(other)),
        }
    }
}

/// Accelerometer full-scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelRange {
    /// +/-2 g.
    G2,
    /// +/-4 g.
    G4,
    /// +/-8 g.
    G8,
    /// +/-16 g.
    G16,
}

impl AccelRange {
    /// Sensitivity in counts per g for this range.
    pub fn sensitivity(self) -> f32 {
        match self {
            AccelRange::G2 => 16384.0,
            AccelRange::G4 => 8192.0,
            AccelRange::G8 => 4096.0,
            AccelRange::G16 => 2048.0,
        }
    }

    /// Value for the accelerometer configuration register.
    pub fn register_value(self) -> u8 {
        match self {
            AccelRange::G2 => 0x00,
            AccelRange::G4 => 0x08,
            AccelRange::G8 => 0x10,
            AccelRange::G16 => 0x18,
        }
    }
}

impl TryFrom<u16> for AccelRange {
    type Error = ConfigError;

    fn try_from(g: u16) -> Result<Self, Self::Error> {
        match g {
            2 => Ok(AccelRange::G2),
            4 => Ok(AccelRange::G4),
            8 => Ok(AccelRange::G8),
            16 => Ok(AccelRange::G16),
            other => Err(ConfigError::UnsupportedAccelRange(other)),
        }
    }
}

/// Digital low-pass filter bandwidth of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlpfBandwidth {
    /// 260 Hz.
    Hz260,
    /// 184 Hz.
    Hz184,
    /// 94 Hz.
    Hz94,
    /// 44 Hz.
    Hz44,
    /// 21 Hz.
    Hz21,
    /// 10 Hz.
    Hz10,
    /// 5 Hz.
    Hz5,
}

impl DlpfBandwidth {
    /// Value for the filter configuration register.
    pub fn register_value(self) -> u8 {
        match self {
            DlpfBandwidth::Hz260 => 0x00,
            DlpfBandwidth::Hz184 => 0x01,
            DlpfBandwidth::Hz94 => 0x02,
            DlpfBandwidth::Hz44 => 0x03,
            DlpfBandwidth::Hz21 => 0x04,
            DlpfBandwidth::Hz10 => 0x05,
            DlpfBandwidth::Hz5 => 0x06,
        }
    }
}

impl TryFrom<u16> for DlpfBandwidth {
    type Error = ConfigError;

    fn try_from(hz: u16) -> Result<Self, Self::Error> {
        match hz {
            260 => Ok(DlpfBandwidth::Hz260),
            184 => Ok(DlpfBandwidth::Hz184),
            94 => Ok(DlpfBandwidth::Hz94),
            44 => Ok(DlpfBandwidth::Hz44),
            21 => Ok(DlpfBandwidth::Hz21),
            10 => Ok(DlpfBandwidth::Hz10),
            5 => Ok(DlpfBandwidth::Hz5),
            other => Err(ConfigError::UnsupportedBandwidth(other)),
        }
    }
}
