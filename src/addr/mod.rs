//! Socket address types.
//!
//! Each family has its own value type (`Inet4SockAddr`, `Inet6SockAddr`,
//! `UnixSockAddr`). [`SockAddr`] is the universal address the operation
//! surface traffics in: an opaque value carrying a family discriminant,
//! readable only through the checked `as_*` casts.

mod inet4;
mod inet6;
mod unix;

pub use self::inet4::Inet4SockAddr;
pub use self::inet6::Inet6SockAddr;
pub use self::unix::{SUN_PATH_LEN, UnixSockAddr};

use crate::consts::AddressFamily;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Repr {
	Inet4(Inet4SockAddr),
	Inet6(Inet6SockAddr),
	Unix(UnixSockAddr),
}

/// A socket address of any supported family.
///
/// Returned by operations like `getsockname` and `recvfrom`; constructed
/// from a family-specific address via `From`. Immutable once built. A cast
/// to the wrong family fails by returning `None` — callers check
/// [`family`](Self::family) or handle the `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SockAddr {
	repr: Repr,
}

impl SockAddr {
	pub(crate) fn from_repr(repr: Repr) -> Self {
		Self { repr }
	}

	pub(crate) fn repr(&self) -> &Repr {
		&self.repr
	}

	/// Returns the family discriminant.
	pub fn family(&self) -> AddressFamily {
		match &self.repr {
			Repr::Inet4(_) => AddressFamily::Inet,
			Repr::Inet6(_) => AddressFamily::Inet6,
			Repr::Unix(_) => AddressFamily::Unix,
		}
	}

	/// Checked cast to an IPv4 address.
	pub fn as_inet4(&self) -> Option<Inet4SockAddr> {
		match &self.repr {
			Repr::Inet4(addr) => Some(*addr),
			_ => None,
		}
	}

	/// Checked cast to an IPv6 address.
	pub fn as_inet6(&self) -> Option<Inet6SockAddr> {
		match &self.repr {
			Repr::Inet6(addr) => Some(*addr),
			_ => None,
		}
	}

	/// Checked cast to a Unix address.
	pub fn as_unix(&self) -> Option<&UnixSockAddr> {
		match &self.repr {
			Repr::Unix(addr) => Some(addr),
			_ => None,
		}
	}

	/// Port for inet families, `None` for Unix addresses.
	pub fn port(&self) -> Option<u16> {
		match &self.repr {
			Repr::Inet4(addr) => Some(addr.port()),
			Repr::Inet6(addr) => Some(addr.port()),
			Repr::Unix(_) => None,
		}
	}

	/// Converts to a std socket address for the inet families.
	pub(crate) fn to_std(&self) -> Option<std::net::SocketAddr> {
		match &self.repr {
			Repr::Inet4(addr) => Some(std::net::SocketAddr::V4(std::net::SocketAddrV4::new(
				std::net::Ipv4Addr::from(addr.octets()),
				addr.port(),
			))),
			Repr::Inet6(addr) => Some(std::net::SocketAddr::V6(std::net::SocketAddrV6::new(
				std::net::Ipv6Addr::from(addr.addr()),
				addr.port(),
				addr.flow_info(),
				addr.scope_id(),
			))),
			Repr::Unix(_) => None,
		}
	}

	pub(crate) fn from_std(addr: std::net::SocketAddr) -> Self {
		match addr {
			std::net::SocketAddr::V4(v4) => {
				Inet4SockAddr::from_octets(v4.ip().octets(), v4.port()).into()
			}
			std::net::SocketAddr::V6(v6) => Inet6SockAddr::with_scope(
				v6.ip().octets(),
				v6.port(),
				v6.flowinfo(),
				v6.scope_id(),
			)
			.into(),
		}
	}
}

impl From<Inet4SockAddr> for SockAddr {
	fn from(addr: Inet4SockAddr) -> Self {
		Self { repr: Repr::Inet4(addr) }
	}
}

impl From<Inet6SockAddr> for SockAddr {
	fn from(addr: Inet6SockAddr) -> Self {
		Self { repr: Repr::Inet6(addr) }
	}
}

impl From<UnixSockAddr> for SockAddr {
	fn from(addr: UnixSockAddr) -> Self {
		Self { repr: Repr::Unix(addr) }
	}
}

impl std::fmt::Display for SockAddr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.repr {
			Repr::Inet4(addr) => addr.fmt(f),
			Repr::Inet6(addr) => addr.fmt(f),
			Repr::Unix(addr) => addr.fmt(f),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn casts_check_the_discriminant() {
		let v4: SockAddr = Inet4SockAddr::loopback(80).into();
		assert_eq!(v4.family(), AddressFamily::Inet);
		assert!(v4.as_inet4().is_some());
		assert!(v4.as_inet6().is_none());
		assert!(v4.as_unix().is_none());

		let v6: SockAddr = Inet6SockAddr::loopback(80).into();
		assert_eq!(v6.family(), AddressFamily::Inet6);
		assert!(v6.as_inet6().is_some());
		assert!(v6.as_inet4().is_none());
	}

	#[test]
	fn std_round_trip() {
		let addr: SockAddr = Inet4SockAddr::from_octets([192, 168, 1, 1], 8080).into();
		let std_addr = addr.to_std().unwrap();
		assert_eq!(SockAddr::from_std(std_addr), addr);

		let addr: SockAddr = Inet6SockAddr::with_scope(
			[0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
			9,
			0,
			3,
		)
		.into();
		let std_addr = addr.to_std().unwrap();
		assert_eq!(SockAddr::from_std(std_addr), addr);

		let unix: SockAddr = UnixSockAddr::new("/tmp/x.sock").unwrap().into();
		assert!(unix.to_std().is_none());
	}
}
