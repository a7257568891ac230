use clap::Parser;
use connection_actors::constants;

/// scriptlink: send Lua scripts to a microcontroller over a serial port
#[derive(Parser, Debug)]
#[command(name = "scriptlink")]
#[command(about = "Compose Lua scripts, send them framed over serial and watch the replies", long_about = None)]
pub struct Cli {
    /// Serial port to connect to on startup (e.g. /dev/ttyUSB0 or COM3)
    #[arg(long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(long, default_value_t = constants::port::DEFAULT_BAUD)]
    pub baud: u32,

    /// Print the available serial ports and exit
    #[arg(long, default_value_t = false)]
    pub list_ports: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Quiet period before re-highlighting a script (milliseconds)
    #[arg(long, default_value_t = 150)]
    pub idle_ms: u64,
}

impl Cli {
    /// Parse CLI arguments from the environment
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["scriptlink"]).unwrap();
        assert_eq!(cli.port, None);
        assert_eq!(cli.baud, 115200);
        assert!(!cli.list_ports);
        assert_eq!(cli.log_level, "warn");
        assert_eq!(cli.idle_ms, 150);
    }

    #[test]
    fn test_override_port_and_baud() {
        let cli =
            Cli::try_parse_from(["scriptlink", "--port", "/dev/ttyUSB0", "--baud", "9600"]).unwrap();
        assert_eq!(cli.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(cli.baud, 9600);
    }

    #[test]
    fn test_invalid_baud_rejected() {
        assert!(Cli::try_parse_from(["scriptlink", "--baud", "fast"]).is_err());
    }
}
