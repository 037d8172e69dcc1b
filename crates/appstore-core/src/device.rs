//! Device identity derived from local network hardware.
//!
//! The purchase API fingerprints the client by a GUID: the hardware address
//! of a network interface, lower-cased, with separators stripped.

use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;

/// Identifier used when no qualifying interface exists.
pub const FALLBACK_DEVICE_ID: &str = "3c06300f0f0f";

/// A network interface as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    pub is_up: bool,
    pub hardware_addr: Vec<u8>,
}

impl NetworkInterface {
    /// Locally administered addresses have bit 1 of the first octet set.
    pub fn is_locally_administered(&self) -> bool {
        self.hardware_addr
            .first()
            .is_some_and(|octet| octet & 0x02 != 0)
    }

    /// Loopback reports an all-zero address, which is no address at all.
    pub fn has_hardware_addr(&self) -> bool {
        self.hardware_addr.iter().any(|b| *b != 0)
    }

    fn qualifies(&self) -> bool {
        self.is_up && self.has_hardware_addr() && !self.is_locally_administered()
    }
}

/// Source of network interfaces.
pub trait InterfaceSource {
    fn interfaces(&self) -> Result<Vec<NetworkInterface>, StoreError>;
}

/// Interfaces of the running host.
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> Result<Vec<NetworkInterface>, StoreError> {
        Ok(netdev::get_interfaces()
            .into_iter()
            .filter(|iface| !iface.is_loopback())
            .map(|iface| NetworkInterface {
                is_up: iface.is_up(),
                hardware_addr: iface
                    .mac_addr
                    .map(|mac| mac.octets().to_vec())
                    .unwrap_or_default(),
                name: iface.name,
            })
            .collect())
    }
}

/// Pick the device identifier from an interface list.
///
/// Never fails: with no qualifying interface the fallback identifier is used.
pub fn select_device_id(interfaces: &[NetworkInterface]) -> String {
    match interfaces.iter().find(|iface| iface.qualifies()) {
        Some(iface) => {
            debug!(interface = %iface.name, "Selected interface for device id");
            hex::encode(&iface.hardware_addr)
        }
        None => {
            warn!("No usable network interface, using fallback device id");
            FALLBACK_DEVICE_ID.to_string()
        }
    }
}

/// Resolve the device identifier from `source`.
#[instrument(level = "debug", skip(source))]
pub fn resolve<S: InterfaceSource>(source: &S) -> Result<String, StoreError> {
    let interfaces = source.interfaces()?;
    let id = select_device_id(&interfaces);
    info!(device_id = %id, "Resolved device id");
    Ok(id)
}

/// Resolve the device identifier of the running host.
pub fn resolve_system() -> Result<String, StoreError> {
    resolve(&SystemInterfaces)
}

/// Normalize a caller-supplied hardware address: separators removed,
/// letters lower-cased.
pub fn normalize_device_id(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}
