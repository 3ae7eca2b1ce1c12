//! Command encoding shared by both device families
//!
//! Outbound frames are framed as `#<len><payload>` where `<len>` is the
//! total frame length in bytes, including the `#` and the length byte
//! itself. The two single-purpose frames `Reboot` and `PowerOff` use a
//! 3-byte form.

use crate::error::ParseError;

/// Trait for commands that can be encoded to their wire format
pub trait EncodeCommand {
    /// Encode this command to the bytes sent over the serial line
    fn encode(&self) -> Vec<u8>;
}

/// Commands understood by every RF Explorer device family
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    /// Ask the device to report its setup and current configuration.
    /// Also serves as the connection handshake.
    RequestConfig,
    /// Ask the device to report its serial number
    RequestSerialNumber,
    /// Turn the LCD screen on
    EnableLcd,
    /// Turn the LCD screen off
    DisableLcd,
    /// Start streaming screen data frames
    EnableDumpScreen,
    /// Stop streaming screen data frames
    DisableDumpScreen,
    /// Pause the data dump
    Hold,
    /// Switch the serial link to a new baud rate
    SetBaudRate(BaudRate),
    /// Reboot the device
    Reboot,
    /// Power the device off
    PowerOff,
}

impl EncodeCommand for Command {
    fn encode(&self) -> Vec<u8> {
        match self {
            Command::RequestConfig => vec![b'#', 4, b'C', b'0'],
            Command::RequestSerialNumber => vec![b'#', 4, b'C', b'n'],
            Command::EnableLcd => vec![b'#', 4, b'L', b'1'],
            Command::DisableLcd => vec![b'#', 4, b'L', b'0'],
            Command::EnableDumpScreen => vec![b'#', 4, b'D', b'1'],
            Command::DisableDumpScreen => vec![b'#', 4, b'D', b'0'],
            Command::Hold => vec![b'#', 4, b'C', b'H'],
            Command::SetBaudRate(baud_rate) => vec![b'#', 4, b'c', baud_rate.code()],
            Command::Reboot => vec![b'#', 3, b'r'],
            Command::PowerOff => vec![b'#', 3, b'S'],
        }
    }
}

/// A serial baud rate the device can be switched to
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct BaudRate {
    bps: u32,
    code: u8,
}

impl BaudRate {
    pub fn bps(&self) -> u32 {
        self.bps
    }

    pub(crate) fn code(&self) -> u8 {
        self.code
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = ParseError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        let code = match bps {
            1_200 => b'1',
            2_400 => b'2',
            4_800 => b'3',
            9_600 => b'4',
            19_200 => b'5',
            38_400 => b'6',
            57_600 => b'7',
            115_200 => b'8',
            500_000 => b'0',
            _ => return Err(ParseError::InvalidNumber(format!("{bps} bps"))),
        };
        Ok(BaudRate { bps, code })
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate {
            bps: 500_000,
            code: b'0',
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// The length byte of a `#`-framed command must equal the total
    /// frame length
    macro_rules! assert_framed_len {
        ($command:expr) => {
            let bytes = $command.encode();
            assert_eq!(
                usize::from(bytes[1]),
                bytes.len(),
                "command: {:?}",
                String::from_utf8_lossy(&bytes)
            );
        };
    }

    pub(crate) use assert_framed_len;

    #[test]
    fn test_framing_byte_matches_length() {
        assert_framed_len!(Command::RequestConfig);
        assert_framed_len!(Command::RequestSerialNumber);
        assert_framed_len!(Command::EnableLcd);
        assert_framed_len!(Command::DisableLcd);
        assert_framed_len!(Command::EnableDumpScreen);
        assert_framed_len!(Command::DisableDumpScreen);
        assert_framed_len!(Command::Hold);
        assert_framed_len!(Command::SetBaudRate(BaudRate::default()));
    }

    #[test]
    fn test_request_config_bytes() {
        assert_eq!(Command::RequestConfig.encode(), [b'#', 4, b'C', b'0']);
    }

    #[test]
    fn test_baud_rate_codes() {
        assert_eq!(BaudRate::try_from(500_000).unwrap().code(), b'0');
        assert_eq!(BaudRate::try_from(2_400).unwrap().code(), b'2');
        assert_eq!(BaudRate::try_from(115_200).unwrap().code(), b'8');
        assert!(BaudRate::try_from(31_337).is_err());
    }
}
