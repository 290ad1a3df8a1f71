//! Picks the interface an ARP sweep goes out on.
//!
//! An interface that already owns an address inside the target range is
//! preferred; otherwise the best physical LAN interface is used, wired before
//! wireless.

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::IpNetwork;

#[cfg(target_os = "linux")]
use linux_impl::{is_physical, is_wireless};
#[cfg(target_os = "macos")]
use macos_impl::{is_physical, is_wireless};
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use other_impl::{is_physical, is_wireless};

use crate::network::range::TargetRange;
use crate::utils::interface::NetworkInterfaceExtension;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// The interface was filtered out as "not physical" by the provided logic.
    NotPhysical,
    /// The interface does not have a MAC address.
    NoMacAddress,
    /// The interface does not support broadcast (required for ARP).
    NotBroadcast,
    /// The interface is a point-to-point link (e.g., a VPN).
    IsPointToPoint,
    /// The interface has no private IPv4 address to source ARP requests from.
    NoValidLanIp,
}

/// Selects the interface to sweep `range` from, out of `interfaces`.
pub fn select_for_range(
    range: &TargetRange,
    interfaces: &[NetworkInterface],
) -> Option<NetworkInterface> {
    select(range, interfaces, is_physical, is_wired)
}

/// Looks an interface up by name; used when the operator pins one explicitly.
pub fn find_by_name(name: &str, interfaces: &[NetworkInterface]) -> Option<NetworkInterface> {
    interfaces.iter().find(|intf| intf.name == name).cloned()
}

fn select(
    range: &TargetRange,
    interfaces: &[NetworkInterface],
    is_physical: impl Fn(&NetworkInterface) -> bool,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    let owner = interfaces.iter().find(|intf| {
        intf.is_up()
            && !intf.is_loopback()
            && intf.mac.is_some()
            && intf.get_ipv4_in(range).is_some()
    });
    if let Some(owner) = owner {
        return Some(owner.clone());
    }

    let candidates: Vec<NetworkInterface> = interfaces
        .iter()
        .filter(|intf| is_viable_lan_interface(intf, &is_physical).is_ok())
        .cloned()
        .collect();

    select_best_lan_interface(candidates, is_wired)
}

fn is_viable_lan_interface(
    interface: &NetworkInterface,
    is_physical: impl Fn(&NetworkInterface) -> bool,
) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if !is_physical(interface) {
        return Err(ViabilityError::NotPhysical);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::NotPhysical);
    }
    if interface.mac.is_none() {
        return Err(ViabilityError::NoMacAddress);
    }
    if !interface.is_broadcast() {
        return Err(ViabilityError::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    let has_valid_ip = interface.ips.iter().any(|net| match net {
        IpNetwork::V4(ipv4) => ipv4.ip().is_private(),
        IpNetwork::V6(_) => false,
    });
    if !has_valid_ip {
        return Err(ViabilityError::NoValidLanIp);
    }

    Ok(())
}

fn select_best_lan_interface(
    interfaces: Vec<NetworkInterface>,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    match interfaces.len() {
        0 => None,
        1 => interfaces.into_iter().next(),
        _ => interfaces
            .iter()
            .find(|&interface| is_wired(interface))
            .or(interfaces.first())
            .cloned(),
    }
}

fn is_wired(interface: &NetworkInterface) -> bool {
    is_physical(interface) && !is_wireless(interface)
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

#[cfg(target_os = "macos")]
mod macos_impl {
    use super::*;
    use std::collections::HashSet;
    use std::process::Command;
    use std::sync::OnceLock;

    struct HardwareInfo {
        physical_devices: HashSet<String>,
        wireless_devices: HashSet<String>,
    }

    /// Runs `networksetup` once and caches the answer for the process lifetime.
    fn get_hardware_info() -> &'static HardwareInfo {
        static HARDWARE_INFO: OnceLock<HardwareInfo> = OnceLock::new();

        HARDWARE_INFO.get_or_init(|| {
            let mut physical = HashSet::new();
            let mut wireless = HashSet::new();

            if let Ok(output) = Command::new("networksetup").arg("-listallhardwareports").output() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                for line in stdout.lines() {
                    if let Some(device) = line.strip_prefix("Device: ") {
                        physical.insert(device.trim().to_string());
                    }
                }
            }

            for device in &physical {
                let is_wifi = Command::new("networksetup")
                    .arg("-getairportnetwork")
                    .arg(device)
                    .output()
                    .map(|out| out.status.success())
                    .unwrap_or(false);

                if is_wifi {
                    wireless.insert(device.clone());
                }
            }

            HardwareInfo {
                physical_devices: physical,
                wireless_devices: wireless,
            }
        })
    }

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        get_hardware_info().physical_devices.contains(&interface.name)
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        get_hardware_info().wireless_devices.contains(&interface.name)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod other_impl {
    use super::*;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        !interface.is_loopback()
    }

    pub fn is_wireless(_interface: &NetworkInterface) -> bool {
        false
    }
}
