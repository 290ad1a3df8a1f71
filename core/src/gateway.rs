//! # Gateway Resolver
//!
//! Derives the subnet to sweep from the host's IPv4 default gateway.
//!
//! The route lookup itself is platform specific and sits behind [`RouteSource`];
//! [`GatewayResolver::discover`] turns its answer into the `/24` around the
//! gateway and substitutes [`TargetRange::FALLBACK`] whenever anything goes wrong.

use std::net::Ipv4Addr;

use netradar_common::network::range::{TargetRange, TargetSpec};
use tracing::{info, warn};

use crate::error::GatewayError;

const RTF_UP: u16 = 0x0001;
const RTF_GATEWAY: u16 = 0x0002;

/// Anything that can answer "what is the IPv4 default gateway?".
pub trait RouteSource {
    fn default_gateway(&self) -> Result<Ipv4Addr, GatewayError>;
}

/// Queries the operating system's routing table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRoutes;

impl RouteSource for SystemRoutes {
    fn default_gateway(&self) -> Result<Ipv4Addr, GatewayError> {
        platform_default_gateway()
    }
}

#[cfg(target_os = "linux")]
fn platform_default_gateway() -> Result<Ipv4Addr, GatewayError> {
    let table = std::fs::read_to_string("/proc/net/route")?;
    parse_proc_net_route(&table)
}

#[cfg(target_os = "macos")]
fn platform_default_gateway() -> Result<Ipv4Addr, GatewayError> {
    let output = run_route_command("route", &["-n", "get", "default"])?;
    parse_route_get(&output)
}

#[cfg(target_os = "windows")]
fn platform_default_gateway() -> Result<Ipv4Addr, GatewayError> {
    let output = run_route_command("route", &["print", "-4", "0.0.0.0"])?;
    parse_route_print(&output)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn platform_default_gateway() -> Result<Ipv4Addr, GatewayError> {
    Err(GatewayError::Unsupported)
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn run_route_command(program: &str, args: &[&str]) -> Result<String, GatewayError> {
    let command = format!("{program} {}", args.join(" "));
    let output = std::process::Command::new(program)
        .args(args)
        .output()
        .map_err(|e| GatewayError::Command {
            command: command.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(GatewayError::Command {
            command,
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub struct GatewayResolver<R = SystemRoutes> {
    routes: R,
}

impl GatewayResolver<SystemRoutes> {
    pub fn new() -> Self {
        Self {
            routes: SystemRoutes,
        }
    }
}

impl Default for GatewayResolver<SystemRoutes> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RouteSource> GatewayResolver<R> {
    pub fn with_source(routes: R) -> Self {
        Self { routes }
    }

    /// Returns the `/24` containing the default gateway, or the fallback range.
    ///
    /// Never fails: every error is logged and replaced by [`TargetRange::FALLBACK`].
    pub fn discover(&self) -> TargetRange {
        match self.routes.default_gateway() {
            Ok(gateway) => {
                let range = TargetRange::from_gateway(gateway);
                info!(gateway = %gateway, range = %range, "Network range detected from default gateway");
                range
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = %TargetRange::FALLBACK,
                    "Could not detect the default gateway, using fallback range"
                );
                TargetRange::FALLBACK
            }
        }
    }

    /// Fixes the range for a scheduler: explicit ranges pass through untouched,
    /// [`TargetSpec::Auto`] triggers [`discover`](Self::discover).
    pub fn resolve(&self, target: TargetSpec) -> TargetRange {
        match target {
            TargetSpec::Range(range) => range,
            TargetSpec::Auto => self.discover(),
        }
    }
}

/// Picks the lowest-metric default route out of `/proc/net/route`.
///
/// Addresses in that file are little-endian hex, so `0101A8C0` is `192.168.1.1`.
pub fn parse_proc_net_route(table: &str) -> Result<Ipv4Addr, GatewayError> {
    let mut best: Option<(u32, Ipv4Addr)> = None;

    for line in table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            continue;
        }
        let (destination, gateway, flags, metric, mask) =
            (fields[1], fields[2], fields[3], fields[6], fields[7]);

        if destination != "00000000" || mask != "00000000" {
            continue;
        }

        let flags = u16::from_str_radix(flags, 16)
            .map_err(|_| GatewayError::Malformed(format!("flags '{flags}'")))?;
        if flags & (RTF_UP | RTF_GATEWAY) != RTF_UP | RTF_GATEWAY {
            continue;
        }

        let gateway = parse_hex_le_addr(gateway)?;
        if gateway.is_unspecified() {
            continue;
        }
        let metric: u32 = metric.parse().unwrap_or(u32::MAX);

        if best.is_none_or(|(best_metric, _)| metric < best_metric) {
            best = Some((metric, gateway));
        }
    }

    best.map(|(_, gateway)| gateway)
        .ok_or(GatewayError::NoDefaultRoute)
}

fn parse_hex_le_addr(hex: &str) -> Result<Ipv4Addr, GatewayError> {
    let raw = u32::from_str_radix(hex, 16)
        .map_err(|_| GatewayError::Malformed(format!("gateway '{hex}'")))?;
    Ok(Ipv4Addr::from(raw.to_le_bytes()))
}

/// Parses `route -n get default` output (macOS / BSD).
pub fn parse_route_get(output: &str) -> Result<Ipv4Addr, GatewayError> {
    let value = output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("gateway:"))
        .map(str::trim)
        .next()
        .ok_or(GatewayError::NoDefaultRoute)?;

    value
        .parse()
        .map_err(|_| GatewayError::Malformed(format!("gateway '{value}'")))
}

/// Parses `route print -4 0.0.0.0` output (Windows); picks the lowest metric.
pub fn parse_route_print(output: &str) -> Result<Ipv4Addr, GatewayError> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                ["0.0.0.0", "0.0.0.0", gateway, _interface, metric, ..] => {
                    let gateway: Ipv4Addr = gateway.parse().ok()?;
                    let metric: u32 = metric.parse().unwrap_or(u32::MAX);
                    Some((metric, gateway))
                }
                _ => None,
            }
        })
        .min_by_key(|(metric, _)| *metric)
        .map(|(_, gateway)| gateway)
        .ok_or(GatewayError::NoDefaultRoute)
}
