use std::io::Write;
use std::thread;

use hidrelay_transport::UnixDomainSocket;
use tracing::debug;

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{io_error, transport_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let frames = args
        .hex
        .iter()
        .map(|text| parse_frame(text, args.frame_size))
        .collect::<CliResult<Vec<_>>>()?;
    let delay = args.delay.as_deref().map(parse_duration).transpose()?;

    let mut stream =
        UnixDomainSocket::connect(&args.path).map_err(|err| transport_error("connect failed", err))?;

    for (index, frame) in frames.iter().enumerate() {
        if index > 0 {
            if let Some(delay) = delay {
                thread::sleep(delay);
            }
        }
        stream
            .write_all(frame)
            .map_err(|err| io_error("send failed", err))?;
        debug!(index, bytes = frame.len(), "sent frame");
    }

    Ok(SUCCESS)
}

/// Parse `"01 00 0a"`, `"01000a"` or `"01:00:0a"` into bytes of exactly `frame_size`.
fn parse_frame(text: &str, frame_size: usize) -> CliResult<Vec<u8>> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if !digits.is_ascii() {
        return Err(CliError::new(USAGE, format!("--hex {text:?}: not hex")));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            format!("--hex {text:?}: odd number of hex digits"),
        ));
    }

    let bytes = (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| CliError::new(USAGE, format!("--hex {text:?}: not hex")))?;

    if bytes.len() != frame_size {
        return Err(CliError::new(
            USAGE,
            format!(
                "--hex {text:?}: {} bytes, frame size is {frame_size}",
                bytes.len()
            ),
        ));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spaced_compact_and_colon_forms() {
        let expected = vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0a];
        assert_eq!(parse_frame("01 00 00 00 00 00 0a", 7).unwrap(), expected);
        assert_eq!(parse_frame("0100000000000A", 7).unwrap(), expected);
        assert_eq!(parse_frame("01:00:00:00:00:00:0a", 7).unwrap(), expected);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = parse_frame("01 00 00", 7).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("3 bytes"));
    }

    #[test]
    fn rejects_non_hex_and_odd_digits() {
        assert!(parse_frame("zz 00 00 00 00 00 00", 7).is_err());
        assert!(parse_frame("010", 7).is_err());
        assert!(parse_frame("é1", 1).is_err());
        assert!(parse_frame("aé1", 2).is_err());
    }
}
