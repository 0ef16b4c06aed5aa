use crate::consts::{IN6ADDR_ANY, IN6ADDR_LOOPBACK};
use crate::error::AddrError;

/// IPv6 socket address (address + port + flow info + scope).
///
/// The address is always exactly 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inet6SockAddr {
	port: u16,
	addr: [u8; 16],
	flow_info: u32,
	/// Identifies the interface for link-local addresses (fe80::/10).
	/// Zero everywhere else.
	scope_id: u32,
}

impl Inet6SockAddr {
	/// Creates a new IPv6 address with zero flow info and scope.
	pub fn new(addr: [u8; 16], port: u16) -> Self {
		Self {
			port,
			addr,
			flow_info: 0,
			scope_id: 0,
		}
	}

	/// Creates with explicit flow info and scope ID.
	pub fn with_scope(addr: [u8; 16], port: u16, flow_info: u32, scope_id: u32) -> Self {
		Self {
			port,
			addr,
			flow_info,
			scope_id,
		}
	}

	/// Creates from a byte slice of exactly 16 bytes.
	pub fn from_bytes(bytes: &[u8], port: u16) -> Result<Self, AddrError> {
		if bytes.len() != 16 {
			return Err(AddrError::WrongLength {
				expected: 16,
				got: bytes.len(),
			});
		}
		let mut addr = [0u8; 16];
		addr.copy_from_slice(bytes);
		Ok(Self::new(addr, port))
	}

	/// The wildcard bind address (::).
	pub fn any(port: u16) -> Self {
		Self::new(IN6ADDR_ANY, port)
	}

	/// The loopback address (::1).
	pub fn loopback(port: u16) -> Self {
		Self::new(IN6ADDR_LOOPBACK, port)
	}

	/// Returns the address bytes.
	pub fn addr(&self) -> [u8; 16] {
		self.addr
	}

	/// Returns the port.
	pub fn port(&self) -> u16 {
		self.port
	}

	/// Returns the flow info field.
	pub fn flow_info(&self) -> u32 {
		self.flow_info
	}

	/// Returns the scope ID.
	pub fn scope_id(&self) -> u32 {
		self.scope_id
	}
}

impl std::fmt::Display for Inet6SockAddr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}]:{}", std::net::Ipv6Addr::from(self.addr), self.port)
	}
}
