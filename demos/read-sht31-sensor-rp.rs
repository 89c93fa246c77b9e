#![no_std]
#![no_main]

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::peripherals::I2C0;
use embassy_rp::{bind_interrupts, i2c};
use embassy_sht31_sensor::{Repeatability, SHT31Error, SHT31Sensor};
use embassy_time::{Delay, Duration, Timer};
use panic_probe as _;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let p = embassy_rp::init(Default::default());

    let sda = p.PIN_0;
    let scl = p.PIN_1;

    // Configure I2C
    let mut i2c = i2c::I2c::new_async(p.I2C0, scl, sda, Irqs, Default::default());

    // Create sensor instance
    let mut sensor = SHT31Sensor::new(&mut i2c, Delay).with_repeatability(Repeatability::High);

    match sensor.serial_number().await {
        Ok(serial) => info!("SHT31 serial number: {=u32:#x}", serial),
        Err(_) => error!("SHT31 did not answer the serial number query"),
    }

    match sensor.read_status().await {
        Ok(status) => info!(
            "Status register: {=u16:#x} (heater on: {})",
            status.bits(),
            status.heater_on()
        ),
        Err(_) => error!("Could not read the status register"),
    }

    // Read sensor data
    loop {
        match sensor.read().await {
            Ok(values) => {
                info!(
                    "Temperature: {}°C, Humidity: {}%",
                    values.temperature, values.humidity
                );
            }
            Err(e) => match e {
                SHT31Error::I2c(_) => error!("I2C communication error"),
                SHT31Error::Crc { .. } => error!("Checksum mismatch in the sensor answer"),
            },
        }

        Timer::after(Duration::from_secs(1)).await;
    }
}
