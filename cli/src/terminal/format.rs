use colored::*;
use netradar_common::network::host::Host;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

/// The status colour a host asks for, as a terminal colour.
pub fn status_color(host: &Host) -> Color {
    Color::from(host.display_color())
}

pub fn status(host: &Host) -> ColoredString {
    host.display_label().color(status_color(host)).bold()
}

pub fn host_details(host: &Host) -> Vec<Detail> {
    vec![
        (
            "IPv4".to_string(),
            host.ip.to_string().color(colors::IPV4_ADDR),
        ),
        (
            "MAC".to_string(),
            host.mac.to_string().color(colors::MAC_ADDR),
        ),
        ("Status".to_string(), status(host)),
    ]
}
