use std::io;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use pnet::util::MacAddr;
use tracing::{debug, trace, warn};

use netradar_common::network::interface;
use netradar_common::network::range::TargetRange;
use netradar_common::utils::interface::NetworkInterfaceExtension;
use netradar_protocols::arp::{self, ArpReply};

use crate::discovery::ArpTransport;
use crate::error::TransportError;

const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Addresses the ARP requests go out with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderContext {
    pub src_mac: MacAddr,
    pub src_addr: Ipv4Addr,
}

impl SenderContext {
    pub fn for_range(intf: &NetworkInterface, range: &TargetRange) -> Result<Self, TransportError> {
        let src_mac = intf.mac.ok_or_else(|| TransportError::NoMacAddress {
            interface: intf.name.clone(),
        })?;
        let src_addr = intf
            .get_source_ipv4(range)
            .ok_or_else(|| TransportError::NoSourceAddress {
                interface: intf.name.clone(),
            })?;
        Ok(Self { src_mac, src_addr })
    }
}

/// Sweeps over a raw pnet datalink channel.
///
/// The interface is looked up again on every sweep, so a cable pulled between
/// cycles shows up as a failed cycle rather than a stale handle.
#[derive(Debug, Clone, Default)]
pub struct DatalinkTransport {
    interface: Option<String>,
}

impl DatalinkTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the sweep to `name` instead of picking an interface per range.
    pub fn on_interface(name: impl Into<String>) -> Self {
        Self {
            interface: Some(name.into()),
        }
    }

    fn pick_interface(&self, range: &TargetRange) -> Result<NetworkInterface, TransportError> {
        let interfaces = datalink::interfaces();
        match &self.interface {
            Some(name) => interface::find_by_name(name, &interfaces)
                .ok_or_else(|| TransportError::InterfaceNotFound(name.clone())),
            None => interface::select_for_range(range, &interfaces)
                .ok_or(TransportError::NoInterface { range: *range }),
        }
    }
}

impl ArpTransport for DatalinkTransport {
    fn sweep(
        &mut self,
        range: &TargetRange,
        window: Duration,
    ) -> Result<Vec<ArpReply>, TransportError> {
        let intf = self.pick_interface(range)?;
        let ctx = SenderContext::for_range(&intf, range)?;
        debug!(
            interface = %intf.name,
            src_addr = %ctx.src_addr,
            src_mac = %ctx.src_mac,
            range = %range,
            "Starting ARP sweep"
        );

        let (mut tx, mut rx) = open_eth_channel(&intf, &get_config(), datalink::channel)?;
        sweep_channel(tx.as_mut(), rx.as_mut(), &ctx, range, window)
    }
}

pub(crate) fn open_eth_channel<F>(
    intf: &NetworkInterface,
    cfg: &Config,
    channel_opener: F,
) -> Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>), TransportError>
where
    F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
{
    let ch = channel_opener(intf, *cfg).map_err(|source| TransportError::ChannelOpen {
        interface: intf.name.clone(),
        source,
    })?;
    match ch {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => Err(TransportError::NotEthernet {
            interface: intf.name.clone(),
        }),
    }
}

/// Broadcasts one request per host in `range`, then collects replies for `window`.
pub(crate) fn sweep_channel(
    tx: &mut dyn DataLinkSender,
    rx: &mut dyn DataLinkReceiver,
    ctx: &SenderContext,
    range: &TargetRange,
    window: Duration,
) -> Result<Vec<ArpReply>, TransportError> {
    let mut sent = 0usize;
    for target in range.hosts().filter(|ip| *ip != ctx.src_addr) {
        let frame = arp::create_request(ctx.src_mac, ctx.src_addr, target)?;
        if let Some(Err(source)) = tx.send_to(&frame, None) {
            return Err(TransportError::Send { target, source });
        }
        sent += 1;
    }
    debug!(requests = sent, window_ms = window.as_millis() as u64, "ARP requests sent");

    Ok(listen_for_replies(rx, ctx.src_addr, window))
}

/// Collects replies answering our own requests; the channel is promiscuous.
fn listen_for_replies(
    rx: &mut dyn DataLinkReceiver,
    requester: Ipv4Addr,
    window: Duration,
) -> Vec<ArpReply> {
    let mut replies = Vec::new();
    let deadline = Instant::now() + window;

    while deadline > Instant::now() {
        match rx.next() {
            Ok(frame) => match arp::parse_reply(frame, requester) {
                Ok(Some(reply)) => {
                    trace!(ip = %reply.sender_ip, mac = %reply.sender_mac, "ARP reply");
                    replies.push(reply);
                }
                Ok(None) => {}
                Err(e) => trace!(error = %e, "Skipping malformed frame"),
            },
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                warn!(error = %e, collected = replies.len(), "Receive failed, ending reply collection early");
                break;
            }
        }
    }

    replies
}

fn get_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
    }
}
