// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// An ESP32 GPIO number.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct GpioPin(u8);

impl GpioPin {
    pub const MAX: u8 = 39;

    /// Board defaults only.
    const fn known(number: u8) -> Self {
        assert!(number <= Self::MAX);
        Self(number)
    }

    pub fn new(number: u8) -> Result<Self, ConfigError> {
        if number > Self::MAX {
            return Err(ConfigError::InvalidPin(number));
        }
        Ok(Self(number))
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    /// GPIO34 to GPIO39 have no output driver.
    pub const fn is_input_only(self) -> bool {
        self.0 >= 34
    }
}

impl TryFrom<u8> for GpioPin {
    type Error = ConfigError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number)
    }
}

impl From<GpioPin> for u8 {
    fn from(pin: GpioPin) -> Self {
        pin.0
    }
}

impl core::fmt::Display for GpioPin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// I2C bus used by `Wire.begin()` on the CYD extension header.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct I2cPins {
    pub sda: GpioPin,
    pub scl: GpioPin,
}

impl Default for I2cPins {
    fn default() -> Self {
        Self {
            sda: GpioPin::known(22),
            scl: GpioPin::known(27),
        }
    }
}

/// XPT2046 resistive touch controller.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TouchPins {
    pub irq: GpioPin,
    pub mosi: GpioPin,
    pub miso: GpioPin,
    pub clk: GpioPin,
    pub cs: GpioPin,
}

impl Default for TouchPins {
    fn default() -> Self {
        Self {
            irq: GpioPin::known(36),
            mosi: GpioPin::known(32),
            miso: GpioPin::known(39),
            clk: GpioPin::known(25),
            cs: GpioPin::known(33),
        }
    }
}

/// ILI9341 TFT panel.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TftPins {
    pub backlight: GpioPin,
    pub cs: GpioPin,
    pub dc: GpioPin,
    pub miso: GpioPin,
    pub mosi: GpioPin,
    pub sclk: GpioPin,
    /// `None` when the panel reset is tied to the board's EN line.
    pub rst: Option<GpioPin>,
}

impl Default for TftPins {
    fn default() -> Self {
        Self {
            backlight: GpioPin::known(21),
            cs: GpioPin::known(15),
            dc: GpioPin::known(2),
            miso: GpioPin::known(12),
            mosi: GpioPin::known(13),
            sclk: GpioPin::known(14),
            rst: None,
        }
    }
}

/// Every pin the firmware drives or reads, grouped by peripheral.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PinMap {
    pub i2c: I2cPins,
    pub touch: TouchPins,
    pub tft: TftPins,
}

/// A pin assignment and whether the role needs an output driver.
struct Role {
    name: &'static str,
    pin: GpioPin,
    output: bool,
}

impl PinMap {
    fn roles(&self) -> Vec<Role> {
        let role = |name, pin, output| Role { name, pin, output };
        let mut roles = vec![
            role("I2C SDA", self.i2c.sda, true),
            role("I2C SCL", self.i2c.scl, true),
            role("touch IRQ", self.touch.irq, false),
            role("touch MOSI", self.touch.mosi, true),
            role("touch MISO", self.touch.miso, false),
            role("touch CLK", self.touch.clk, true),
            role("touch CS", self.touch.cs, true),
            role("TFT backlight", self.tft.backlight, true),
            role("TFT CS", self.tft.cs, true),
            role("TFT DC", self.tft.dc, true),
            role("TFT MISO", self.tft.miso, false),
            role("TFT MOSI", self.tft.mosi, true),
            role("TFT SCLK", self.tft.sclk, true),
        ];
        if let Some(rst) = self.tft.rst {
            roles.push(role("TFT RST", rst, true));
        }
        roles
    }

    /// Rejects pins shared between two roles and outputs placed on input-only pins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let roles = self.roles();

        for (i, role) in roles.iter().enumerate() {
            if role.output && role.pin.is_input_only() {
                return Err(ConfigError::InputOnlyPin {
                    pin: role.pin.number(),
                    role: role.name,
                });
            }

            if let Some(other) = roles[..i].iter().find(|other| other.pin == role.pin) {
                return Err(ConfigError::PinConflict {
                    pin: role.pin.number(),
                    first: other.name,
                    second: role.name,
                });
            }
        }

        Ok(())
    }
}

#[test]
fn test_default_pin_map_is_valid() {
    let pins = PinMap::default();
    pins.validate().unwrap();

    assert_eq!(pins.touch.irq.number(), 36);
    assert!(pins.touch.miso.is_input_only());
    assert_eq!(pins.tft.rst, None);
}

#[test]
fn test_pin_out_of_range() {
    assert!(matches!(GpioPin::new(40), Err(ConfigError::InvalidPin(40))));
    assert!(serde_json::from_str::<GpioPin>("48").is_err());
}

#[test]
fn test_pin_conflict() {
    let mut pins = PinMap::default();
    pins.tft.cs = pins.touch.cs;

    match pins.validate() {
        Err(ConfigError::PinConflict { pin, first, second }) => {
            assert_eq!(pin, 33);
            assert_eq!(first, "touch CS");
            assert_eq!(second, "TFT CS");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_output_on_input_only_pin() {
    let mut pins = PinMap::default();
    pins.tft.backlight = GpioPin::new(35).unwrap();

    assert!(matches!(
        pins.validate(),
        Err(ConfigError::InputOnlyPin { pin: 35, role: "TFT backlight" })
    ));
}

#[test]
fn test_partial_pin_group_keeps_defaults() {
    let pins: PinMap = serde_json::from_str(r#"{ "tft": { "backlight": 27 }, "i2c": { "scl": 21 } }"#).unwrap();

    assert_eq!(pins.tft.backlight.number(), 27);
    assert_eq!(pins.tft.cs, TftPins::default().cs);
    assert_eq!(pins.tft.rst, None);
    assert_eq!(pins.i2c.sda, I2cPins::default().sda);
    assert_eq!(pins.i2c.scl.number(), 21);
    assert_eq!(pins.touch, TouchPins::default());
}

#[test]
fn test_unknown_pin_name_rejected() {
    assert!(serde_json::from_str::<PinMap>(r#"{ "tft": { "back_light": 27 } }"#).is_err());
}
