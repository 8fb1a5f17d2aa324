use std::os::fd::{AsRawFd, OwnedFd};
use std::str;

use nix::errno::Errno;
use nix::libc::ioctl;
use nix::sys::socket::{socket, AddressFamily, SockFlag, SockType};

use crate::errors::EthtoolError;
use crate::types::LinkType;

const SIOCGIFHWADDR: u64 = 0x8927;
const SIOCETHTOOL: u64 = 0x8946;

const ETHTOOL_GSET: u32 = 0x1;
const ETHTOOL_GDRVINFO: u32 = 0x3;

/// Maximum size of an interface name, including the trailing NUL
const IFNAME_MAX_SIZE: usize = 16;

/// Size of the union following the name in `struct ifreq`
const IFREQ_UNION_SIZE: usize = 24;

/// SPEED_UNKNOWN as reported by the 16 bit legacy field
const SPEED_UNKNOWN_LEGACY: u32 = 0xffff;

#[derive(Debug)]
#[repr(C)]
struct IfReq {
    if_name: [u8; IFNAME_MAX_SIZE],
    if_data: [u8; IFREQ_UNION_SIZE],
}

/// `struct ethtool_cmd` from linux/ethtool.h
#[allow(dead_code)]
#[derive(Debug, Default)]
#[repr(C)]
struct EthtoolCmd {
    cmd: u32,
    supported: u32,
    advertising: u32,
    speed: u16,
    duplex: u8,
    port: u8,
    phy_address: u8,
    transceiver: u8,
    autoneg: u8,
    mdio_support: u8,
    maxtxpkt: u32,
    maxrxpkt: u32,
    speed_hi: u16,
    eth_tp_mdix: u8,
    eth_tp_mdix_ctrl: u8,
    lp_advertising: u32,
    reserved: [u32; 2],
}

/// `struct ethtool_drvinfo` from linux/ethtool.h
#[allow(dead_code)]
#[derive(Debug, Default)]
#[repr(C)]
struct DrvInfo {
    cmd: u32,
    driver: [u8; 32],
    version: [u8; 32],
    fw_version: [u8; 32],
    bus_info: [u8; 32],
    erom_version: [u8; 32],
    reserved2: [u8; 12],
    n_priv_flags: u32,
    n_stats: u32,
    testinfo_len: u32,
    eedump_len: u32,
    regdump_len: u32,
}

pub(crate) fn if_name_bytes(if_name: &str) -> Result<[u8; IFNAME_MAX_SIZE], EthtoolError> {
    if if_name.is_empty() || if_name.len() >= IFNAME_MAX_SIZE || if_name.contains('\0') {
        return Err(EthtoolError::InvalidIfName(if_name.to_string()));
    }
    let mut bytes = [0u8; IFNAME_MAX_SIZE];
    bytes[..if_name.len()].copy_from_slice(if_name.as_bytes());
    Ok(bytes)
}

fn _ioctl(fd: &OwnedFd, request: u64, ifreq: &mut IfReq) -> Result<(), Errno> {
    let exit_code = unsafe { ioctl(fd.as_raw_fd(), request as _, ifreq as *mut IfReq) };

    if exit_code < 0 {
        return Err(Errno::last());
    }
    Ok(())
}

/// Parses a NUL padded C string as found in ethtool structs.
pub(crate) fn parse_c_string(data: &[u8]) -> Result<String, EthtoolError> {
    let null_pos = data.iter().position(|b| *b == 0).unwrap_or(data.len());
    str::from_utf8(&data[..null_pos])
        .map(|s| s.to_string())
        .map_err(|err| EthtoolError::ParseError(err.to_string()))
}

/// Combines the two halves of the ethtool speed into Mbit/s.
pub(crate) fn decode_speed(speed: u16, speed_hi: u16) -> Result<u32, EthtoolError> {
    let speed = ((speed_hi as u32) << 16) | speed as u32;
    match speed {
        0 | SPEED_UNKNOWN_LEGACY | u32::MAX => Err(EthtoolError::UnknownSpeed(speed)),
        speed => Ok(speed),
    }
}

/// Link properties of a network interface.
///
/// This trait allows mocking the ioctl calls for unit testing.
pub trait LinkQueryable {
    /// Layer 2 technology of the interface.
    fn link_type(&self, if_name: &str) -> Result<LinkType, EthtoolError>;
    /// Name of the kernel driver bound to the interface.
    fn driver(&self, if_name: &str) -> Result<String, EthtoolError>;
    /// Negotiated link speed in Mbit/s.
    fn link_speed(&self, if_name: &str) -> Result<u32, EthtoolError>;
}

pub struct Ethtool {
    sock_fd: OwnedFd,
}

impl Ethtool {
    pub fn new() -> Result<Self, EthtoolError> {
        match socket(
            AddressFamily::Inet,
            SockType::Datagram,
            SockFlag::empty(),
            None,
        ) {
            Ok(fd) => Ok(Ethtool { sock_fd: fd }),
            Err(errno) => Err(EthtoolError::SocketError(errno)),
        }
    }

    /// Issue SIOCETHTOOL with `data` pointing at an ethtool command struct
    fn ethtool_ioctl<T>(&self, if_name: [u8; IFNAME_MAX_SIZE], data: &mut T) -> Result<(), Errno> {
        let mut ifreq = IfReq {
            if_name,
            if_data: [0u8; IFREQ_UNION_SIZE],
        };
        let ptr = (data as *mut T as usize).to_ne_bytes();
        ifreq.if_data[..ptr.len()].copy_from_slice(&ptr);
        _ioctl(&self.sock_fd, SIOCETHTOOL, &mut ifreq)
    }
}

impl LinkQueryable for Ethtool {
    fn link_type(&self, if_name: &str) -> Result<LinkType, EthtoolError> {
        let mut ifreq = IfReq {
            if_name: if_name_bytes(if_name)?,
            if_data: [0u8; IFREQ_UNION_SIZE],
        };
        _ioctl(&self.sock_fd, SIOCGIFHWADDR, &mut ifreq).map_err(EthtoolError::HwAddrReadError)?;
        // ifr_hwaddr.sa_family leads the union
        let family = u16::from_ne_bytes([ifreq.if_data[0], ifreq.if_data[1]]);
        Ok(LinkType::from_hw_family(family))
    }

    /// Equivalent to `ethtool -i <ifname>`, driver line only
    fn driver(&self, if_name: &str) -> Result<String, EthtoolError> {
        let if_name = if_name_bytes(if_name)?;
        let mut drvinfo = DrvInfo {
            cmd: ETHTOOL_GDRVINFO,
            ..Default::default()
        };
        self.ethtool_ioctl(if_name, &mut drvinfo)
            .map_err(EthtoolError::DriverInfoReadError)?;
        parse_c_string(&drvinfo.driver)
    }

    fn link_speed(&self, if_name: &str) -> Result<u32, EthtoolError> {
        let if_name = if_name_bytes(if_name)?;
        let mut cmd = EthtoolCmd {
            cmd: ETHTOOL_GSET,
            ..Default::default()
        };
        self.ethtool_ioctl(if_name, &mut cmd)
            .map_err(EthtoolError::LinkSettingsReadError)?;
        decode_speed(cmd.speed, cmd.speed_hi)
    }
}
