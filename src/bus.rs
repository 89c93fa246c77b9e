//! Framing for the Sensirion transaction layout: 16-bit commands going
//! out MSB first, 16-bit data words coming back with a trailing CRC-8
//! each. The transport never interprets what a word means.

use embedded_hal_async::i2c::I2c;

use crate::SHT31Error;

/// Longest answer the driver ever asks for: two data words.
const MAX_WORDS: usize = 2;
/// A data word on the wire is two payload bytes plus its checksum.
const WORD_BYTES: usize = 3;

pub(crate) struct SensorBus<'a, I2C: I2c> {
    i2c: &'a mut I2C,
    pub(crate) address: u8,
}

impl<'a, I2C: I2c> SensorBus<'a, I2C> {
    pub(crate) fn new(i2c: &'a mut I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Send one bare 16-bit command.
    pub(crate) async fn write_command(&mut self, command: u16) -> Result<(), SHT31Error<I2C::Error>> {
        trace!("sht31 command {=u16:#x}", command);
        self.i2c
            .write(self.address, &command.to_be_bytes())
            .await
            .map_err(SHT31Error::I2c)
    }

    /// Read `words.len()` checksummed data words from the sensor. The
    /// receive buffer caps a request at `MAX_WORDS` words.
    pub(crate) async fn read_words(&mut self, words: &mut [u16]) -> Result<(), SHT31Error<I2C::Error>> {
        debug_assert!(words.len() <= MAX_WORDS);
        let mut frame = [0u8; MAX_WORDS * WORD_BYTES];
        let frame = &mut frame[..words.len() * WORD_BYTES];
        self.i2c
            .read(self.address, frame)
            .await
            .map_err(SHT31Error::I2c)?;
        unpack_words(frame, words)
    }

    /// Send a command and read its answer in a single transaction, for
    /// commands where the sensor stretches the clock until data is ready.
    /// The receive buffer caps a request at `MAX_WORDS` words.
    pub(crate) async fn command_then_read_words(
        &mut self,
        command: u16,
        words: &mut [u16],
    ) -> Result<(), SHT31Error<I2C::Error>> {
        debug_assert!(words.len() <= MAX_WORDS);
        trace!("sht31 command {=u16:#x} (stretched read)", command);
        let mut frame = [0u8; MAX_WORDS * WORD_BYTES];
        let frame = &mut frame[..words.len() * WORD_BYTES];
        self.i2c
            .write_read(self.address, &command.to_be_bytes(), frame)
            .await
            .map_err(SHT31Error::I2c)?;
        unpack_words(frame, words)
    }
}

/// Verify the trailing CRC of every three-byte group and collect the
/// big-endian data words. One bad checksum fails the whole frame.
fn unpack_words<E>(frame: &[u8], words: &mut [u16]) -> Result<(), SHT31Error<E>> {
    for (word, group) in words.iter_mut().zip(frame.chunks_exact(WORD_BYTES)) {
        let expected = group[2];
        let computed = crc8(&group[..2]);
        if expected != computed {
            warn!(
                "sht31 answer failed its checksum: carried {=u8:#x}, computed {=u8:#x}",
                expected, computed
            );
            return Err(SHT31Error::Crc { expected, computed });
        }
        *word = u16::from_be_bytes([group[0], group[1]]);
    }
    Ok(())
}

#[inline]
pub(crate) fn crc8(data: &[u8]) -> u8 {
    const CRC8_POLYNOMIAL: u8 = 0x31;
    const CRC8_INIT: u8 = 0xFF;

    let mut crc: u8 = CRC8_INIT;

    for &b in data {
        crc ^= b;
        for _ in 0..8 {
            crc = if (crc & 0x80) != 0 {
                (crc << 1) ^ CRC8_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_matches_reference_vectors() {
        // 0xBEEF -> 0x92 is the worked example in the Sensirion interface
        // descriptions; an all-zero word checks the init value path.
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
        assert_eq!(crc8(&[0x00, 0x00]), 0x81);
    }

    #[test]
    fn unpack_accepts_a_well_formed_frame() {
        let frame = [0xBE, 0xEF, 0x92, 0x00, 0x00, 0x81];
        let mut words = [0u16; 2];
        unpack_words::<()>(&frame, &mut words).unwrap();
        assert_eq!(words, [0xBEEF, 0x0000]);
    }

    #[test]
    fn unpack_rejects_a_corrupted_word() {
        let frame = [0xBE, 0xEF, 0x92 ^ 0x01];
        let mut words = [0u16; 1];
        let err = unpack_words::<()>(&frame, &mut words).unwrap_err();
        assert_eq!(
            err,
            SHT31Error::Crc {
                expected: 0x93,
                computed: 0x92,
            }
        );
        assert_eq!(words[0], 0, "no word may be published from a bad frame");
    }
}
