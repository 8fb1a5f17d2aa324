// Copyright (c) Facebook, Inc. and its affiliates.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;

use ethtool::Errno;
use ethtool::EthtoolError;
use ethtool::LinkQueryable;
use ethtool::LinkType;
use maplit::btreemap;
use procfs::CounterSet;
use procfs::NetDevMap;

use super::*;

struct FakeLink {
    link_type: LinkType,
    driver: Option<&'static str>,
    // Mbit/s, or the errno ETHTOOL_GSET fails with
    speed: Result<u32, Errno>,
}

fn ethernet(driver: &'static str, speed: Result<u32, Errno>) -> FakeLink {
    FakeLink {
        link_type: LinkType::Ethernet,
        driver: Some(driver),
        speed,
    }
}

fn non_ethernet(link_type: LinkType) -> FakeLink {
    FakeLink {
        link_type,
        driver: None,
        speed: Err(Errno::EOPNOTSUPP),
    }
}

struct FakeLinks {
    links: BTreeMap<String, FakeLink>,
}

impl FakeLinks {
    fn new(links: BTreeMap<&str, FakeLink>) -> FakeLinks {
        FakeLinks {
            links: links
                .into_iter()
                .map(|(name, link)| (name.to_string(), link))
                .collect(),
        }
    }

    fn get(&self, if_name: &str) -> Result<&FakeLink, EthtoolError> {
        self.links
            .get(if_name)
            .ok_or(EthtoolError::HwAddrReadError(Errno::ENODEV))
    }
}

impl LinkQueryable for FakeLinks {
    fn link_type(&self, if_name: &str) -> Result<LinkType, EthtoolError> {
        Ok(self.get(if_name)?.link_type)
    }

    fn driver(&self, if_name: &str) -> Result<String, EthtoolError> {
        self.get(if_name)?
            .driver
            .map(str::to_string)
            .ok_or(EthtoolError::DriverInfoReadError(Errno::EOPNOTSUPP))
    }

    fn link_speed(&self, if_name: &str) -> Result<u32, EthtoolError> {
        match self.get(if_name)?.speed {
            Ok(0) => Err(EthtoolError::UnknownSpeed(0)),
            Ok(speed) => Ok(speed),
            Err(errno) => Err(EthtoolError::LinkSettingsReadError(errno)),
        }
    }
}

fn counters(rx_bytes: u64, tx_bytes: u64) -> CounterSet {
    CounterSet {
        rx_bytes,
        tx_bytes,
        ..Default::default()
    }
}

fn net_dev(names: &[&str]) -> NetDevMap {
    names
        .iter()
        .map(|name| (name.to_string(), CounterSet::default()))
        .collect()
}

fn names(interfaces: &NetDevMap) -> Vec<&str> {
    interfaces.keys().map(String::as_str).collect()
}

const THRESHOLDS: Thresholds = Thresholds {
    warning_pct: 85,
    critical_pct: 98,
};

#[test]
fn test_calc_diff() {
    assert_eq!(calc_diff(1000, 100.0, 2000, 160.0, CounterWidth::Bits64), 1000);
    assert_eq!(calc_diff(7, 100.0, 7, 160.0, CounterWidth::Bits32), 0);
    // Same uptime is not a reboot
    assert_eq!(calc_diff(10, 100.0, 25, 100.0, CounterWidth::Bits64), 15);
}

#[test]
fn test_calc_diff_wrap() {
    assert_eq!(
        calc_diff(4294967290, 100.0, 10, 160.0, CounterWidth::Bits32),
        15
    );
    assert_eq!(
        calc_diff(u64::MAX - 5, 100.0, 4, 160.0, CounterWidth::Bits64),
        9
    );
    // Largest possible wrap stays in range
    assert_eq!(
        calc_diff(1, 100.0, 0, 160.0, CounterWidth::Bits64),
        u64::MAX - 1
    );
}

#[test]
fn test_calc_diff_reboot() {
    assert_eq!(calc_diff(5000, 3600.0, 300, 12.5, CounterWidth::Bits64), 300);
    // A counter that grew across the reboot is still reset
    assert_eq!(calc_diff(10, 3600.0, 300, 12.5, CounterWidth::Bits32), 300);
}

#[test]
fn test_counter_width() {
    assert_eq!(CounterWidth::Bits32.max(), 4294967295);
    assert_eq!(CounterWidth::Bits64.max(), u64::MAX);
    let expected = if cfg!(target_pointer_width = "64") {
        CounterWidth::Bits64
    } else {
        CounterWidth::Bits32
    };
    assert_eq!(CounterWidth::native(), expected);
}

#[test]
fn test_interval_rejects_bad_elapsed() {
    for elapsed in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        assert!(
            Interval::new(100.0, 160.0, elapsed, CounterWidth::Bits64).is_err(),
            "elapsed {} accepted",
            elapsed
        );
    }
    let interval = Interval::new(100.0, 160.0, 0.5, CounterWidth::Bits64)
        .expect("Positive elapsed rejected");
    assert_eq!(interval.elapsed_secs, 0.5);
}

#[test]
fn test_rate_set() {
    let last = CounterSet {
        rx_bytes: 1000,
        tx_bytes: 500,
        rx_packets: 10,
        tx_packets: 20,
        rx_errors: 0,
        tx_errors: 1,
        rx_drops: 2,
        tx_drops: 0,
    };
    let sample = CounterSet {
        rx_bytes: 2000,
        tx_bytes: 1100,
        rx_packets: 70,
        tx_packets: 140,
        rx_errors: 6,
        tx_errors: 1,
        rx_drops: 14,
        tx_drops: 30,
    };
    let interval = Interval::new(100.0, 160.0, 60.0, CounterWidth::Bits64)
        .expect("Failed to build interval");
    let rates = RateSet::new(&last, &sample, &interval);
    assert!((rates.rx_bytes_per_sec - 16.666666).abs() < 0.001);
    assert_eq!(rates.tx_bytes_per_sec, 10.0);
    assert_eq!(rates.rx_packets_per_sec, 1.0);
    assert_eq!(rates.tx_packets_per_sec, 2.0);
    assert_eq!(rates.rx_errors_per_sec, 0.1);
    assert_eq!(rates.tx_errors_per_sec, 0.0);
    assert_eq!(rates.rx_drops_per_sec, 0.2);
    assert_eq!(rates.tx_drops_per_sec, 0.5);
}

#[test]
fn test_status_worst() {
    use Status::*;
    let all = [Ok, Warning, Critical, Unknown];
    for a in all {
        assert_eq!(a.worst(a), a);
        for b in all {
            assert_eq!(a.worst(b), b.worst(a));
            for c in all {
                assert_eq!(a.worst(b).worst(c), a.worst(b.worst(c)));
            }
        }
    }
    assert_eq!(Ok.worst(Unknown), Unknown);
    assert_eq!(Unknown.worst(Warning), Warning);
    assert_eq!(Warning.worst(Critical), Critical);
    assert_eq!(Unknown.worst(Critical), Critical);
}

#[test]
fn test_status_exit_code() {
    assert_eq!(Status::Ok.exit_code(), 0);
    assert_eq!(Status::Warning.exit_code(), 1);
    assert_eq!(Status::Critical.exit_code(), 2);
    assert_eq!(Status::Unknown.exit_code(), 3);
    assert_eq!(Status::Critical.to_string(), "CRITICAL");
    assert_eq!(format!("{}", Status::Ok), "OK");
}

#[test]
fn test_classify() {
    assert_eq!(classify(16.67, 1000, 98, 85), Status::Ok);
    assert_eq!(classify(850.0, 1000, 98, 85), Status::Ok);
    assert_eq!(classify(850.5, 1000, 98, 85), Status::Warning);
    assert_eq!(classify(980.0, 1000, 98, 85), Status::Warning);
    assert_eq!(classify(980.5, 1000, 98, 85), Status::Critical);
    assert_eq!(classify(16.67, 10, 98, 85), Status::Critical);
    assert_eq!(THRESHOLDS.classify(900.0, 1000), Status::Warning);
}

#[test]
fn test_classify_monotonic() {
    let rank = |s: Status| match s {
        Status::Ok => 0,
        Status::Warning => 1,
        Status::Critical => 2,
        Status::Unknown => unreachable!("classify never returns UNKNOWN"),
    };
    let capacity = 131072000;
    let mut previous = 0;
    for step in 0..=300 {
        let rate = capacity as f64 * step as f64 / 200.0;
        let current = rank(classify(rate, capacity, 98, 85));
        assert!(current >= previous, "status dropped at rate {}", rate);
        previous = current;
    }
    assert_eq!(previous, 2);
}

#[test]
fn test_resolve_bandwidth_override() {
    let logger = common::logutil::get_discard_logger();
    let links = FakeLinks::new(BTreeMap::new());
    // No query happens at all, the device is unknown to the fake
    assert_eq!(
        resolve_bandwidth(&logger, &links, "eth0", Some(1000), 131072000).expect("Override failed"),
        1000
    );
}

#[test]
fn test_resolve_bandwidth() {
    let logger = common::logutil::get_discard_logger();
    let links = FakeLinks::new(btreemap! {
        "eth0" => ethernet("e1000e", Ok(1000)),
        "tap0" => ethernet("tun", Ok(10)),
        "br0" => ethernet("bridge", Err(Errno::EOPNOTSUPP)),
        "veth0" => ethernet("veth", Ok(0)),
        "lo" => non_ethernet(LinkType::Loopback),
        "ppp0" => non_ethernet(LinkType::Ppp),
    });
    let resolve = |name: &str| {
        resolve_bandwidth(&logger, &links, name, None, 42)
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", name, e))
    };
    assert_eq!(resolve("eth0"), 131072000);
    assert_eq!(resolve("tap0"), 42);
    assert_eq!(resolve("br0"), 42);
    assert_eq!(resolve("veth0"), 42);
    assert_eq!(resolve("lo"), 42);
    assert_eq!(resolve("ppp0"), 42);
}

#[test]
fn test_resolve_bandwidth_errors() {
    let logger = common::logutil::get_discard_logger();
    let mut links = FakeLinks::new(btreemap! {
        "eth0" => ethernet("e1000e", Err(Errno::EPERM)),
    });
    match resolve_bandwidth(&logger, &links, "eth0", None, 42) {
        Err(EthtoolError::LinkSettingsReadError(Errno::EPERM)) => {}
        other => panic!("Unexpected result {:?}", other),
    }
    assert!(resolve_bandwidth(&logger, &links, "eth9", None, 42).is_err());

    // An unreadable driver is not fatal, the speed is still queried
    links.links.insert(
        "eth1".to_string(),
        FakeLink {
            link_type: LinkType::Ethernet,
            driver: None,
            speed: Ok(100),
        },
    );
    assert_eq!(
        resolve_bandwidth(&logger, &links, "eth1", None, 42).expect("Failed to resolve eth1"),
        13107200
    );
}

#[test]
fn test_vlan_range_from_str() {
    assert_eq!("7".parse(), Ok(VlanRange { start: 7, end: 7 }));
    assert_eq!("10-20".parse(), Ok(VlanRange { start: 10, end: 20 }));
    assert!("a-3".parse::<VlanRange>().is_err());
    assert!("-3".parse::<VlanRange>().is_err());
    assert!("".parse::<VlanRange>().is_err());

    let range = VlanRange { start: 10, end: 20 };
    assert!(range.contains(10));
    assert!(range.contains(20));
    assert!(!range.contains(21));
}

#[test]
fn test_exclude_devices() {
    let mut interfaces = net_dev(&["eth0", "eth1", "lo"]);
    exclude_devices(&["lo".to_string(), "wlan0".to_string()], &mut interfaces);
    assert_eq!(names(&interfaces), vec!["eth0", "eth1"]);
}

#[test]
fn test_exclude_devices_regex() {
    let mut interfaces = net_dev(&["eth0", "eth1", "veth0", "lo"]);
    let exclude = vec![
        anchored_regex("eth").expect("Bad regex"),
        anchored_regex("l|x").expect("Bad regex"),
    ];
    exclude_devices_regex(&exclude, &mut interfaces);
    assert_eq!(names(&interfaces), vec!["veth0"]);
    assert!(anchored_regex("(").is_err());
}

#[test]
fn test_exclude_vlans() {
    let mut interfaces = net_dev(&["eth0", "eth0.5", "eth0.12", "eth0.30", "bond0.x", "br.7.1"]);
    let ranges = vec![VlanRange { start: 5, end: 5 }, VlanRange { start: 10, end: 20 }];
    exclude_vlans(&ranges, &mut interfaces);
    assert_eq!(names(&interfaces), vec!["bond0.x", "br.7.1", "eth0", "eth0.30"]);
}

#[test]
fn test_filter_link_types() {
    let links = FakeLinks::new(btreemap! {
        "eth0" => ethernet("e1000e", Ok(1000)),
        "lo" => non_ethernet(LinkType::Loopback),
        "ppp0" => non_ethernet(LinkType::Ppp),
    });
    let mut interfaces = net_dev(&["eth0", "lo", "ppp0"]);
    filter_link_types(&[LinkType::Ethernet, LinkType::Ppp], &links, &mut interfaces)
        .expect("Failed to filter link types");
    assert_eq!(names(&interfaces), vec!["eth0", "ppp0"]);

    let mut interfaces = net_dev(&["eth0", "gone0"]);
    match filter_link_types(&[LinkType::Ethernet], &links, &mut interfaces) {
        Err(FilterError::LinkQuery { interface, .. }) => assert_eq!(interface, "gone0"),
        other => panic!("Unexpected result {:?}", other),
    }
}

#[test]
fn test_include_devices() {
    let mut interfaces = net_dev(&["eth0", "eth1", "lo"]);
    include_devices(&["eth1".to_string(), "lo".to_string()], &mut interfaces)
        .expect("Failed to include devices");
    assert_eq!(names(&interfaces), vec!["eth1", "lo"]);

    let mut interfaces = net_dev(&["eth0", "lo"]);
    let err = include_devices(&["eth0".to_string(), "wlan9".to_string()], &mut interfaces)
        .expect_err("wlan9 does not exist");
    assert_eq!(err.to_string(), "Device wlan9 not found.");
    assert!(interfaces.is_empty());
}

#[test]
fn test_device_filter() {
    let links = FakeLinks::new(btreemap! {
        "eth0" => ethernet("e1000e", Ok(1000)),
        "eth0.100" => ethernet("8021q", Ok(1000)),
        "eth1" => ethernet("e1000e", Ok(1000)),
        "lo" => non_ethernet(LinkType::Loopback),
    });
    let filter = DeviceFilter {
        exclude: vec!["eth1".to_string()],
        // "docker0" is gone before link types are queried
        exclude_regex: vec![anchored_regex("dock").expect("Bad regex")],
        vlan_exclude: vec![VlanRange { start: 100, end: 200 }],
        link_types: vec![LinkType::Ethernet],
        include: vec![],
    };
    let mut interfaces = net_dev(&["docker0", "eth0", "eth0.100", "eth1", "lo"]);
    filter
        .apply(&links, &mut interfaces)
        .expect("Failed to filter");
    assert_eq!(names(&interfaces), vec!["eth0"]);

    let mut interfaces = net_dev(&["eth0", "lo"]);
    DeviceFilter::default()
        .apply(&links, &mut interfaces)
        .expect("Empty filter failed");
    assert_eq!(names(&interfaces), vec!["eth0", "lo"]);
}

fn eth0_traffic(bandwidth: u64) -> InterfaceTraffic {
    let interval = Interval::new(100.0, 160.0, 60.0, CounterWidth::native())
        .expect("Failed to build interval");
    let rates = RateSet::new(&counters(1000, 500), &counters(2000, 1100), &interval);
    InterfaceTraffic::new("eth0", rates, bandwidth, THRESHOLDS)
}

#[test]
fn test_interface_traffic_ok() {
    let traffic = eth0_traffic(1000);
    assert_eq!(traffic.tx_status, Status::Ok);
    assert_eq!(traffic.rx_status, Status::Ok);
    assert!(traffic.problems().is_empty());
    assert_eq!(
        traffic.perfdata(),
        vec![
            "out-eth0=10.00;850;980;0;1000",
            "in-eth0=16.67;850;980;0;1000",
            "pktout-eth0=0.0",
            "pktin-eth0=0.0",
            "errout-eth0=0.0",
            "errin-eth0=0.0",
            "dropout-eth0=0.0",
            "dropin-eth0=0.0",
        ]
    );
}

#[test]
fn test_interface_traffic_critical() {
    let traffic = eth0_traffic(10);
    assert_eq!(traffic.tx_status, Status::Critical);
    assert_eq!(traffic.rx_status, Status::Critical);
    assert_eq!(traffic.status(), Status::Critical);
    assert_eq!(
        traffic.problems(),
        vec!["eth0: 0.00Mbit/0.00Mbit", "eth0: 0.00Mbit/0.00Mbit"]
    );
    assert_eq!(traffic.perfdata()[0], "out-eth0=10.00;8;9;0;10");
}

#[test]
fn test_interface_traffic_problem_units() {
    let rates = RateSet {
        tx_bytes_per_sec: 1024.0 * 1024.0,
        rx_bytes_per_sec: 12_582_912.0,
        ..Default::default()
    };
    // 100 Mbit link
    let traffic = InterfaceTraffic::new("eth1", rates, 13107200, THRESHOLDS);
    assert_eq!(traffic.tx_status, Status::Ok);
    assert_eq!(traffic.rx_status, Status::Warning);
    assert_eq!(traffic.problems(), vec!["eth1: 96.00Mbit/100.00Mbit"]);
}

#[test]
fn test_report() {
    let mut report = Report::new();
    assert_eq!(report.status(), Status::Ok);
    assert_eq!(report.to_string(), "TRAFFIC OK:  | ");

    report.add_interface(&eth0_traffic(1000));
    assert_eq!(report.status(), Status::Ok);
    assert_eq!(report.perfdata().len(), 8);

    report.add_problem(Status::Unknown, "Sampled too recently, skipping this run.");
    report.add_problem(Status::Critical, "Cannot write in /var/tmp/traffic_stats.dat.");
    report.raise(Status::Warning);
    assert_eq!(report.status(), Status::Critical);
    assert_eq!(report.exit_code(), 2);
    assert_eq!(
        report.to_string(),
        "TRAFFIC CRITICAL: Cannot write in /var/tmp/traffic_stats.dat. \
         Sampled too recently, skipping this run. | \
         dropin-eth0=0.0 dropout-eth0=0.0 errin-eth0=0.0 errout-eth0=0.0 \
         in-eth0=16.67;850;980;0;1000 out-eth0=10.00;850;980;0;1000 \
         pktin-eth0=0.0 pktout-eth0=0.0"
    );
}
