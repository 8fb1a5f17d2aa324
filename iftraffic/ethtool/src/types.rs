use std::fmt;
use std::str::FromStr;

/// ARPHRD_* hardware families we give a name to.
const ARPHRD_ETHER: u16 = 1;
const ARPHRD_PPP: u16 = 512;
const ARPHRD_LOOPBACK: u16 = 772;
const ARPHRD_SIT: u16 = 776;
const ARPHRD_VOID: u16 = 0xfffe;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LinkType {
    Ethernet,
    Ppp,
    Loopback,
    Sit,
    Unspecified,
    Unknown,
}

impl LinkType {
    pub const ALL: [LinkType; 6] = [
        LinkType::Ethernet,
        LinkType::Ppp,
        LinkType::Loopback,
        LinkType::Sit,
        LinkType::Unspecified,
        LinkType::Unknown,
    ];

    pub fn from_hw_family(family: u16) -> LinkType {
        match family {
            ARPHRD_ETHER => LinkType::Ethernet,
            ARPHRD_PPP => LinkType::Ppp,
            ARPHRD_LOOPBACK => LinkType::Loopback,
            ARPHRD_SIT => LinkType::Sit,
            ARPHRD_VOID => LinkType::Unspecified,
            _ => LinkType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Ethernet => "ethernet",
            LinkType::Ppp => "ppp",
            LinkType::Loopback => "loopback",
            LinkType::Sit => "sit",
            LinkType::Unspecified => "unspecified",
            LinkType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = LinkType::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown link type {:?}, expected one of {}", s, names.join(", "))
            })
    }
}
