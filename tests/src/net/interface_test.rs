use netradar_common::network::interface;
use netradar_common::network::range::TargetRange;
use pnet::datalink::{MacAddr, NetworkInterface};

use super::util::mock;

/*************************************************************
                Tests for range ownership
**************************************************************/

fn select(range: &str, interfaces: &[NetworkInterface]) -> Option<NetworkInterface> {
    let range: TargetRange = range.parse().unwrap();
    interface::select_for_range(&range, interfaces)
}

#[test]
fn range_selects_enp9s0() {
    assert_eq!(enp9s0(), select("192.168.0.0/24", &iface_all()).unwrap());
}

#[test]
fn range_selects_wlan0() {
    assert_eq!(wlan0(), select("192.168.1.0/24", &iface_all()).unwrap());
}

#[test]
fn range_selects_eth1() {
    let interfaces: Vec<NetworkInterface> = vec![lo(), ipv6leakintrf0(), veth1234(), eth1()];
    assert_eq!(eth1(), select("10.0.0.0/24", &interfaces).unwrap());
}

#[test]
fn range_selects_bridge_that_owns_it() {
    assert_eq!(br0(), select("192.168.100.0/24", &iface_all()).unwrap());
}

#[test]
fn range_selects_nothing_when_no_lan() {
    let interfaces: Vec<NetworkInterface> = vec![lo(), veth1234(), tun0(), ipv6leakintrf0()];
    let selected = select("10.96.0.0/16", &interfaces);
    assert!(selected.is_none(), "Expected no interface, received: {selected:?}");
}

#[test]
fn pinned_name_is_found() {
    let interfaces = iface_all();
    assert_eq!(docker0(), interface::find_by_name("docker0", &interfaces).unwrap());
    assert!(interface::find_by_name("eth9", &interfaces).is_none());
}

/*************************************************************
                  Mock interfaces for testing
**************************************************************/

fn iface_all() -> Vec<NetworkInterface> {
    vec![lo(),
         enp9s0(),
         tun0(),
         ipv6leakintrf0(),
         wlan0(),
         eth1(),
         docker0(),
         veth1234(),
         br0()
    ]
}

fn lo() -> NetworkInterface {
    mock(
        "lo",
        1,
        Some(MacAddr::new(0, 0, 0, 0, 0, 0)),
        &["127.0.0.1/8", "::1/128"],
        65609,
    )
}

fn enp9s0() -> NetworkInterface {
    mock(
        "enp9s0",
        2,
        Some(MacAddr::new(0xa8, 0xa1, 0x59, 0x13, 0x41, 0x46)),
        &[
            "192.168.0.32/24",
            "2a02:908:8c1:b880::b054/128",
            "2a02:908:8c1:b880:97f7:c408:8dff:b5bf/64",
            "fe80::b3dd:5c39:7c29:48b6/64",
        ],
        69699,
    )
}

fn tun0() -> NetworkInterface {
    mock(
        "tun0",
        5,
        None,
        &["10.96.0.57/16", "fe80::c137:8964:5a63:efde/64"],
        69841,
    )
}

fn ipv6leakintrf0() -> NetworkInterface {
    mock(
        "ipv6leakintrf0",
        6,
        Some(MacAddr::new(0xd2, 0x25, 0xd4, 0x9f, 0x18, 0xfd)),
        &["fdeb:446c:912d:8da::/64", "fe80::7f87:ff4a:9ad8:d2f0/64"],
        65731,
    )
}

fn wlan0() -> NetworkInterface {
    mock(
        "wlan0",
        3,
        Some(MacAddr::new(0x34, 0xcf, 0xf6, 0x9a, 0x11, 0x22)),
        &[
            "192.168.1.42/24",
            "fe80::36cf:f6ff:fe9a:1122/64",
        ],
        69699,
    )
}

fn eth1() -> NetworkInterface {
    mock(
        "eth1",
        4,
        Some(MacAddr::new(0x52, 0x54, 0x00, 0x12, 0x34, 0x56)),
        &["10.0.0.15/24"],
        69699,
    )
}

fn docker0() -> NetworkInterface {
    mock(
        "docker0",
        7,
        Some(MacAddr::new(0x02, 0x42, 0xac, 0x11, 0x00, 0x01)),
        &["172.17.0.1/16"],
        69699,
    )
}

fn veth1234() -> NetworkInterface {
    mock(
        "veth1234",
        8,
        Some(MacAddr::new(0x1a, 0x2b, 0x3c, 0x4d, 0x5e, 0x6f)),
        &["fe80::1a2b:3cff:fe4d:5e6f/64"],
        69699,
    )
}

fn br0() -> NetworkInterface {
    mock(
        "br0",
        9,
        Some(MacAddr::new(0xde, 0xad, 0xbe, 0xef, 0x00, 0x01)),
        &[
            "192.168.100.1/24",
            "fd00:dead:beef::1/64",
        ],
        69699,
    )
}