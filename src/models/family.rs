//! Address family of a managed prefix list.

use serde::{Deserialize, Serialize};

/// One of the two families a prefix list can hold. Each family lives in its
/// own remote list, named `<base>-ipv4` / `<base>-ipv6`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl AddressFamily {
    /// Processing order of the two families.
    pub const ALL: [AddressFamily; 2] = [AddressFamily::V4, AddressFamily::V6];

    /// Suffix appended to the operator supplied base name.
    pub fn suffix(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "-ipv4",
            AddressFamily::V6 => "-ipv6",
        }
    }

    /// Value the EC2 API expects in `--address-family`.
    pub fn as_aws_str(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "IPv4",
            AddressFamily::V6 => "IPv6",
        }
    }

    /// Full remote list name for a base name, e.g. `office` -> `office-ipv4`.
    pub fn list_name(&self, base_name: &str) -> String {
        format!("{base_name}{}", self.suffix())
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_aws_str())
    }
}
