use nix::errno::Errno;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EthtoolError {
    #[error("Failed to open a socket, error={0:}")]
    SocketError(Errno),

    #[error("Invalid interface name {0:?}")]
    InvalidIfName(String),

    #[error("Failed to read hardware address using SIOCGIFHWADDR, error={0:}")]
    HwAddrReadError(Errno),

    #[error("Failed to read driver info using ETHTOOL_GDRVINFO, error={0:}")]
    DriverInfoReadError(Errno),

    #[error("Failed to read link settings using ETHTOOL_GSET, error={0:}")]
    LinkSettingsReadError(Errno),

    #[error("Link speed is unknown (raw value {0:})")]
    UnknownSpeed(u32),

    #[error("Failed to parse ioctl result, error={0:}")]
    ParseError(String),
}

impl EthtoolError {
    /// Whether the device simply has no link speed to report. Virtual
    /// devices (bridges, tap, kvm) answer ETHTOOL_GSET with EOPNOTSUPP.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            EthtoolError::LinkSettingsReadError(Errno::EOPNOTSUPP) | EthtoolError::UnknownSpeed(_)
        )
    }
}
