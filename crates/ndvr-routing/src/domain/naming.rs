//! Control-message names.
//!
//! Format: `<protocol prefix>/<type>/<network>/%C1.Router/<router>[/<version>]`
//!
//! Example: `/ndvr/hello/ufba/%C1.Router/Router1`. The router prefix
//! (`/ufba/%C1.Router/Router1`) is the router's identity throughout the
//! protocol: neighbor map keys, next hop ids and digest members.

use std::fmt;
use std::str::FromStr;

use crate::error::NameError;

/// Component marking the router identity in a control name.
pub const ROUTER_TAG: &str = "%C1.Router";

/// Control message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Periodic discovery broadcast
    Hello,
    /// Routing table request and reply
    DvInfo,
    /// Signing key retrieval
    Key,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Hello => "hello",
            MessageType::DvInfo => "dvinfo",
            MessageType::Key => "key",
        }
    }
}

impl FromStr for MessageType {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hello" => Ok(MessageType::Hello),
            "dvinfo" => Ok(MessageType::DvInfo),
            "key" => Ok(MessageType::Key),
            other => Err(NameError::UnknownMessageType(other.to_string())),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the router prefix `/<network>/%C1.Router/<router>`.
pub fn router_prefix(network: &str, router: &str) -> String {
    format!("/{}/{}/{}", trim(network), ROUTER_TAG, trim(router))
}

fn trim(component: &str) -> &str {
    component.trim_matches('/')
}

/// A parsed control-message name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlName {
    pub protocol_prefix: String,
    pub message_type: MessageType,
    pub network: String,
    pub router: String,
    /// Advertisement version (dvinfo requests only)
    pub version: Option<u64>,
}

impl ControlName {
    pub fn new(
        protocol_prefix: &str,
        message_type: MessageType,
        network: &str,
        router: &str,
    ) -> Self {
        Self {
            protocol_prefix: format!("/{}", trim(protocol_prefix)),
            message_type,
            network: trim(network).to_string(),
            router: trim(router).to_string(),
            version: None,
        }
    }

    /// Name addressed to the router identified by `router_prefix`.
    pub fn for_router(
        protocol_prefix: &str,
        message_type: MessageType,
        router_prefix: &str,
    ) -> Result<Self, NameError> {
        let name = format!(
            "/{}/{}/{}",
            trim(protocol_prefix),
            message_type,
            trim(router_prefix)
        );
        Self::parse(&name, protocol_prefix)
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// The sender's router prefix (its identity).
    pub fn router_prefix(&self) -> String {
        router_prefix(&self.network, &self.router)
    }

    /// Parse `name` as a control name under `protocol_prefix`.
    pub fn parse(name: &str, protocol_prefix: &str) -> Result<Self, NameError> {
        let prefix_components: Vec<&str> = components(protocol_prefix).collect();
        let name_components: Vec<&str> = components(name).collect();

        if !name_components.starts_with(&prefix_components) {
            return Err(NameError::WrongProtocolPrefix(name.to_string()));
        }
        let rest = &name_components[prefix_components.len()..];

        let [kind, network, tag, router, tail @ ..] = rest else {
            return Err(NameError::TooShort(name.to_string()));
        };
        let message_type: MessageType = kind.parse()?;
        if *tag != ROUTER_TAG {
            return Err(NameError::NotARouter(name.to_string()));
        }
        let version = match tail {
            [] => None,
            [v] => Some(
                v.parse::<u64>()
                    .map_err(|_| NameError::InvalidVersion((*v).to_string()))?,
            ),
            _ => return Err(NameError::InvalidVersion(tail.join("/"))),
        };

        Ok(Self {
            protocol_prefix: format!("/{}", prefix_components.join("/")),
            message_type,
            network: (*network).to_string(),
            router: (*router).to_string(),
            version,
        })
    }
}

fn components(name: &str) -> impl Iterator<Item = &str> {
    name.split('/').filter(|c| !c.is_empty())
}

impl fmt::Display for ControlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}{}",
            self.protocol_prefix,
            self.message_type,
            self.router_prefix()
        )?;
        if let Some(version) = self.version {
            write!(f, "/{}", version)?;
        }
        Ok(())
    }
}
