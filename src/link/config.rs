use std::fmt;
use std::time::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 9600;
pub const DEFAULT_TIMEOUT_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataBits{
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity{
    #[default]
    None,
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBits{
    #[default]
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl{
    #[default]
    None,
    Software,
    Hardware,
}

impl From<DataBits> for serialport::DataBits{
    fn from(bits: DataBits) -> Self{
        match bits{
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

impl From<Parity> for serialport::Parity{
    fn from(parity: Parity) -> Self{
        match parity{
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

impl From<StopBits> for serialport::StopBits{
    fn from(bits: StopBits) -> Self{
        match bits{
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

impl From<FlowControl> for serialport::FlowControl{
    fn from(flow: FlowControl) -> Self{
        match flow{
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Software => serialport::FlowControl::Software,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
        }
    }
}

impl fmt::Display for DataBits{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        let s = match self{
            DataBits::Five => "5",
            DataBits::Six => "6",
            DataBits::Seven => "7",
            DataBits::Eight => "8",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Parity{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        let s = match self{
            Parity::None => "None",
            Parity::Odd => "Odd",
            Parity::Even => "Even",
        };
        f.write_str(s)
    }
}

impl fmt::Display for StopBits{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        let s = match self{
            StopBits::One => "1",
            StopBits::Two => "2",
        };
        f.write_str(s)
    }
}

impl fmt::Display for FlowControl{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        let s = match self{
            FlowControl::None => "None",
            FlowControl::Software => "XON/XOFF",
            FlowControl::Hardware => "RTS/CTS",
        };
        f.write_str(s)
    }
}

/// Serial parameters captured for one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig{
    #[serde(default = "default_port_name")]
    pub port_name: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default)]
    pub data_bits: DataBits,
    #[serde(default)]
    pub parity: Parity,
    #[serde(default)]
    pub stop_bits: StopBits,
    #[serde(default)]
    pub flow_control: FlowControl,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_port_name() -> String{
    DEFAULT_PORT.to_string()
}

fn default_baud_rate() -> u32{
    DEFAULT_BAUD
}

fn default_timeout_ms() -> u64{
    DEFAULT_TIMEOUT_MS
}

impl Default for ConnectionConfig{
    fn default() -> Self{
        ConnectionConfig{
            port_name: default_port_name(),
            baud_rate: default_baud_rate(),
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            flow_control: FlowControl::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ConnectionConfig{
    pub fn new(port_name: &str, baud_rate: u32) -> Self{
        ConnectionConfig{
            port_name: port_name.to_string(),
            baud_rate,
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration{
        Duration::from_millis(self.timeout_ms)
    }

    /// Human-readable parameters, e.g. `"9600, 8, None, 1, None"`.
    pub fn summary(&self) -> String{
        format!(
            "{}, {}, {}, {}, {}",
            self.baud_rate, self.data_bits, self.parity, self.stop_bits, self.flow_control
        )
    }
}
