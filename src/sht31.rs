use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::bus::SensorBus;
use crate::{SHT31Error, SHT31Measurement};

/// Slave address selected by the sensor's ADDR pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    /// ADDR pin pulled low, address 0x44. This is how most breakout
    /// boards ship.
    #[default]
    A,
    /// ADDR pin pulled high, address 0x45.
    B,
}

impl Address {
    pub const fn as_byte(self) -> u8 {
        match self {
            Address::A => 0x44,
            Address::B => 0x45,
        }
    }
}

/// Measurement quality setting. Higher repeatability integrates longer
/// for lower noise and draws more current while converting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Repeatability {
    Low,
    Medium,
    #[default]
    High,
}

impl Repeatability {
    const fn command(self) -> Command {
        match self {
            Repeatability::Low => Command::MeasureLow,
            Repeatability::Medium => Command::MeasureMedium,
            Repeatability::High => Command::MeasureHigh,
        }
    }

    const fn stretch_command(self) -> Command {
        match self {
            Repeatability::Low => Command::MeasureLowStretch,
            Repeatability::Medium => Command::MeasureMediumStretch,
            Repeatability::High => Command::MeasureHighStretch,
        }
    }

    /// Worst-case measurement duration in milliseconds: the part's
    /// 4.5 / 6.5 / 15.5 ms maxima rounded up to whole milliseconds.
    const fn duration_ms(self) -> u32 {
        match self {
            Repeatability::Low => 5,
            Repeatability::Medium => 7,
            Repeatability::High => 16,
        }
    }
}

/// Contents of the 16-bit status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SHT31Status(u16);

impl SHT31Status {
    /// Raw register contents.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// At least one alert condition is pending.
    pub const fn alert_pending(self) -> bool {
        self.0 & (1 << 15) != 0
    }

    /// The built-in heater is currently on.
    pub const fn heater_on(self) -> bool {
        self.0 & (1 << 13) != 0
    }

    /// Relative humidity is outside the programmed tracking limits.
    pub const fn humidity_alert(self) -> bool {
        self.0 & (1 << 11) != 0
    }

    /// Temperature is outside the programmed tracking limits.
    pub const fn temperature_alert(self) -> bool {
        self.0 & (1 << 10) != 0
    }

    /// The sensor went through a reset since the status was last cleared.
    pub const fn reset_detected(self) -> bool {
        self.0 & (1 << 4) != 0
    }

    /// The last command was not processed.
    pub const fn command_failed(self) -> bool {
        self.0 & (1 << 1) != 0
    }

    /// The checksum of the last write transfer did not match.
    pub const fn checksum_failed(self) -> bool {
        self.0 & 1 != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    MeasureHigh,
    MeasureMedium,
    MeasureLow,
    MeasureHighStretch,
    MeasureMediumStretch,
    MeasureLowStretch,
    ReadStatus,
    ClearStatus,
    HeaterEnable,
    HeaterDisable,
    ReadSerialNumber,
    SoftReset,
}

impl Command {
    const fn code(self) -> u16 {
        match self {
            Command::MeasureHigh => 0x2400,
            Command::MeasureMedium => 0x240B,
            Command::MeasureLow => 0x2416,
            Command::MeasureHighStretch => 0x2C06,
            Command::MeasureMediumStretch => 0x2C0D,
            Command::MeasureLowStretch => 0x2C10,
            Command::ReadStatus => 0xF32D,
            Command::ClearStatus => 0x3041,
            Command::HeaterEnable => 0x306D,
            Command::HeaterDisable => 0x3066,
            Command::ReadSerialNumber => 0x3780,
            Command::SoftReset => 0x30A2,
        }
    }
}

impl SHT31Measurement {
    fn from_raw(temperature: u16, humidity: u16) -> Self {
        let full_scale = 65535.0f32;
        Self {
            temperature: -45.0 + 175.0 * (temperature as f32) / full_scale,
            humidity: 100.0 * (humidity as f32) / full_scale,
        }
    }
}

pub struct SHT31Sensor<'a, I2C: I2c, D: DelayNs> {
    bus: SensorBus<'a, I2C>,
    delay: D,
    repeatability: Repeatability,
    clock_stretching: bool,
}

impl<'a, I2C: I2c, D: DelayNs> SHT31Sensor<'a, I2C, D> {
    /// Create a driver on the given bus, talking to [`Address::A`] at
    /// high repeatability with clock stretching off.
    pub fn new(i2c: &'a mut I2C, delay: D) -> Self {
        Self {
            bus: SensorBus::new(i2c, Address::A.as_byte()),
            delay,
            repeatability: Repeatability::High,
            clock_stretching: false,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.bus.address = address.as_byte();
        self
    }

    pub fn with_repeatability(mut self, repeatability: Repeatability) -> Self {
        self.repeatability = repeatability;
        self
    }

    /// Let the sensor hold SCL low until a measurement finishes instead
    /// of waiting it out on the host side. Only use this on controllers
    /// that tolerate clock stretching.
    pub fn with_clock_stretching(mut self, enabled: bool) -> Self {
        self.clock_stretching = enabled;
        self
    }

    /// Perform one single-shot measurement and return temperature and
    /// relative humidity.
    pub async fn read(&mut self) -> Result<SHT31Measurement, SHT31Error<I2C::Error>> {
        let mut words = [0u16; 2];
        if self.clock_stretching {
            self.bus
                .command_then_read_words(self.repeatability.stretch_command().code(), &mut words)
                .await?;
        } else {
            self.bus
                .write_command(self.repeatability.command().code())
                .await?;
            self.delay.delay_ms(self.repeatability.duration_ms()).await;
            self.bus.read_words(&mut words).await?;
        }
        let values = SHT31Measurement::from_raw(words[0], words[1]);
        debug!("sht31 measurement: {} C, {} %RH", values.temperature, values.humidity);
        Ok(values)
    }

    /// Read the status register.
    pub async fn read_status(&mut self) -> Result<SHT31Status, SHT31Error<I2C::Error>> {
        let mut words = [0u16; 1];
        self.bus
            .command_then_read_words(Command::ReadStatus.code(), &mut words)
            .await?;
        Ok(SHT31Status(words[0]))
    }

    /// Clear the alert and reset flags in the status register.
    pub async fn clear_status(&mut self) -> Result<(), SHT31Error<I2C::Error>> {
        self.bus.write_command(Command::ClearStatus.code()).await
    }

    /// Switch the built-in heater on or off. The heater is for
    /// plausibility checks; it is not meant to run continuously.
    pub async fn set_heater(&mut self, enabled: bool) -> Result<(), SHT31Error<I2C::Error>> {
        let command = if enabled {
            Command::HeaterEnable
        } else {
            Command::HeaterDisable
        };
        self.bus.write_command(command.code()).await
    }

    /// Read the unique serial number of the sensor.
    pub async fn serial_number(&mut self) -> Result<u32, SHT31Error<I2C::Error>> {
        let mut words = [0u16; 2];
        self.bus
            .write_command(Command::ReadSerialNumber.code())
            .await?;
        // The part needs a moment to stage the answer.
        self.delay.delay_ms(1).await;
        self.bus.read_words(&mut words).await?;
        Ok((words[0] as u32) << 16 | words[1] as u32)
    }

    /// Reset the sensor. Returns once the part is ready for commands
    /// again (soft reset time, 1.5 ms max).
    pub async fn soft_reset(&mut self) -> Result<(), SHT31Error<I2C::Error>> {
        self.bus.write_command(Command::SoftReset.code()).await?;
        self.delay.delay_us(1500).await;
        Ok(())
    }
}
