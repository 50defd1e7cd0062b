//! Per-operation state shared by every generator.

use std::collections::BTreeMap;
use std::net::IpAddr;

use semver::Version;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Result, ScriptError};
use crate::rename::RenameEvent;

/// Metadata entry stamped on shared virtual addresses this tool creates.
pub const OWNER_METADATA_KEY: &str = "managed-by";
pub const OWNER_METADATA_VALUE: &str = "tmsh-reconcile";
/// Where remote artifacts are staged before import.
pub const DEFAULT_DOWNLOAD_DIR: &str = "/var/config/rest/downloads";

/// Task metadata for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    /// Unique per-operation suffix used for temporary object names.
    pub id: String,
    /// Tenant currently being reconciled, when the caller works per tenant.
    pub tenant: Option<String>,
}

impl TaskInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tenant: None,
        }
    }

    /// Task with a freshly generated unique id.
    pub fn generated() -> Self {
        Self::new(Uuid::new_v4().simple().to_string())
    }
}

/// Software version of the target device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub version: Version,
}

impl TargetInfo {
    /// Parse a dotted device version leniently: `14.1.2.3` becomes `14.1.2`
    /// and missing components default to zero.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts = raw
            .trim()
            .split('.')
            .take(3)
            .map(str::parse::<u64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| ScriptError::Version(raw.to_string()))?;
        let part = |idx: usize| parts.get(idx).copied().unwrap_or(0);
        Ok(Self {
            version: Version::new(part(0), part(1), part(2)),
        })
    }

    pub fn at_least(&self, major: u64, minor: u64) -> bool {
        self.version >= Version::new(major, minor, 0)
    }
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self {
            version: Version::new(17, 1, 0),
        }
    }
}

/// A virtual address already present on the device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualAddressRecord {
    pub full_path: String,
    pub address: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl VirtualAddressRecord {
    /// True when the address carries this tool's ownership marker.
    pub fn is_owned(&self) -> bool {
        self.metadata
            .get(OWNER_METADATA_KEY)
            .is_some_and(|value| value == OWNER_METADATA_VALUE)
    }
}

/// State threaded through one operation.
///
/// Must not be shared by two dispatches in flight.
#[derive(Debug, Clone)]
pub struct Context {
    pub task: TaskInfo,
    pub target: TargetInfo,
    /// Cached device virtual addresses, consulted by virtual deletion.
    pub virtual_addresses: Vec<VirtualAddressRecord>,
    pub download_dir: String,
    rename_events: Vec<RenameEvent>,
}

impl Default for TaskInfo {
    fn default() -> Self {
        Self::generated()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(TaskInfo::generated(), TargetInfo::default())
    }
}

impl Context {
    pub fn new(task: TaskInfo, target: TargetInfo) -> Self {
        Self {
            task,
            target,
            virtual_addresses: Vec::new(),
            download_dir: DEFAULT_DOWNLOAD_DIR.to_string(),
            rename_events: Vec::new(),
        }
    }

    pub fn with_virtual_addresses(mut self, records: Vec<VirtualAddressRecord>) -> Self {
        self.virtual_addresses = records;
        self
    }

    pub fn record_rename(&mut self, event: RenameEvent) {
        self.rename_events.push(event);
    }

    pub fn rename_events(&self) -> &[RenameEvent] {
        &self.rename_events
    }

    /// Drain accumulated rename events; the queue is empty afterwards.
    pub fn take_rename_events(&mut self) -> Vec<RenameEvent> {
        std::mem::take(&mut self.rename_events)
    }

    /// Find an owned shared virtual address matching `address`.
    ///
    /// Addresses compare in minimized form, so `2001:db8:0::1` matches
    /// `2001:db8::1`. A route-domain suffix (`%2`) must match exactly.
    pub fn owned_virtual_address(&self, address: &str) -> Option<&VirtualAddressRecord> {
        let wanted = minimize_ip(address)?;
        self.virtual_addresses
            .iter()
            .filter(|record| record.is_owned())
            .find(|record| minimize_ip(&record.address).as_deref() == Some(wanted.as_str()))
    }
}

/// Canonical text of an IP address with optional `%<route-domain>` suffix.
pub fn minimize_ip(raw: &str) -> Option<String> {
    let (ip, route_domain) = match raw.split_once('%') {
        Some((ip, rd)) => (ip, Some(rd)),
        None => (raw, None),
    };
    let parsed: IpAddr = ip.parse().ok()?;
    Some(match route_domain {
        Some(rd) => format!("{parsed}%{rd}"),
        None => parsed.to_string(),
    })
}
