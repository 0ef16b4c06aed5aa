//! Families, socket types, flag sets, and well-known constants.
//!
//! Raw values come from libc on unix. Elsewhere the emulated backend is the
//! only implementation and reports Linux-equivalent numbers, so callers see
//! one stable encoding per platform.

use crate::error::Errno;

/// Address family of a socket or socket address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
	Unspec,
	Inet,
	Inet6,
	Unix,
}

#[cfg(unix)]
mod af_raw {
	pub const AF_UNSPEC: i32 = libc::AF_UNSPEC;
	pub const AF_INET: i32 = libc::AF_INET;
	pub const AF_INET6: i32 = libc::AF_INET6;
	pub const AF_UNIX: i32 = libc::AF_UNIX;
}

#[cfg(not(unix))]
mod af_raw {
	pub const AF_UNSPEC: i32 = 0;
	pub const AF_INET: i32 = 2;
	pub const AF_INET6: i32 = 23;
	pub const AF_UNIX: i32 = 1;
}

impl AddressFamily {
	/// Returns the platform constant for this family.
	#[inline]
	pub fn to_raw(self) -> i32 {
		match self {
			AddressFamily::Unspec => af_raw::AF_UNSPEC,
			AddressFamily::Inet => af_raw::AF_INET,
			AddressFamily::Inet6 => af_raw::AF_INET6,
			AddressFamily::Unix => af_raw::AF_UNIX,
		}
	}

	/// Maps a platform constant back; unknown values are `EAFNOSUPPORT`.
	pub fn from_raw(raw: i32) -> Result<Self, Errno> {
		match raw {
			af_raw::AF_UNSPEC => Ok(AddressFamily::Unspec),
			af_raw::AF_INET => Ok(AddressFamily::Inet),
			af_raw::AF_INET6 => Ok(AddressFamily::Inet6),
			af_raw::AF_UNIX => Ok(AddressFamily::Unix),
			_ => Err(Errno::EAFNOSUPPORT),
		}
	}
}

/// Socket type.
///
/// - `Stream` — reliable, ordered byte stream
/// - `Dgram` — unreliable, unordered packets with boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
	Stream,
	Dgram,
}

#[cfg(unix)]
mod sock_raw {
	pub const SOCK_STREAM: i32 = libc::SOCK_STREAM;
	pub const SOCK_DGRAM: i32 = libc::SOCK_DGRAM;
}

#[cfg(not(unix))]
mod sock_raw {
	pub const SOCK_STREAM: i32 = 1;
	pub const SOCK_DGRAM: i32 = 2;
}

impl SocketType {
	#[inline]
	pub fn to_raw(self) -> i32 {
		match self {
			SocketType::Stream => sock_raw::SOCK_STREAM,
			SocketType::Dgram => sock_raw::SOCK_DGRAM,
		}
	}

	/// Maps a platform constant back; unknown values are `EINVAL`.
	pub fn from_raw(raw: i32) -> Result<Self, Errno> {
		match raw {
			sock_raw::SOCK_STREAM => Ok(SocketType::Stream),
			sock_raw::SOCK_DGRAM => Ok(SocketType::Dgram),
			_ => Err(Errno::EINVAL),
		}
	}
}

/// Which half of a connection `shutdown` disables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownHow {
	Read,
	Write,
	Both,
}

impl ShutdownHow {
	#[inline]
	pub fn to_raw(self) -> i32 {
		#[cfg(unix)]
		{
			match self {
				ShutdownHow::Read => libc::SHUT_RD,
				ShutdownHow::Write => libc::SHUT_WR,
				ShutdownHow::Both => libc::SHUT_RDWR,
			}
		}
		#[cfg(not(unix))]
		{
			match self {
				ShutdownHow::Read => 0,
				ShutdownHow::Write => 1,
				ShutdownHow::Both => 2,
			}
		}
	}
}

#[cfg(unix)]
bitflags::bitflags! {
	/// getaddrinfo hint flags.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct AiFlags: i32 {
		const PASSIVE = libc::AI_PASSIVE;
		const CANONNAME = libc::AI_CANONNAME;
		const NUMERICHOST = libc::AI_NUMERICHOST;
		const NUMERICSERV = libc::AI_NUMERICSERV;
	}

	/// getnameinfo flags.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct NiFlags: i32 {
		const NUMERICHOST = libc::NI_NUMERICHOST;
		const NUMERICSERV = libc::NI_NUMERICSERV;
		const NOFQDN = libc::NI_NOFQDN;
		const NAMEREQD = libc::NI_NAMEREQD;
		const DGRAM = libc::NI_DGRAM;
	}

	/// send/recv flags.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct MsgFlags: i32 {
		const PEEK = libc::MSG_PEEK;
		const OOB = libc::MSG_OOB;
		const WAITALL = libc::MSG_WAITALL;
		const DONTWAIT = libc::MSG_DONTWAIT;
	}
}

#[cfg(not(unix))]
bitflags::bitflags! {
	/// getaddrinfo hint flags.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct AiFlags: i32 {
		const PASSIVE = 0x0001;
		const CANONNAME = 0x0002;
		const NUMERICHOST = 0x0004;
		const NUMERICSERV = 0x0400;
	}

	/// getnameinfo flags.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct NiFlags: i32 {
		const NUMERICHOST = 0x01;
		const NUMERICSERV = 0x02;
		const NOFQDN = 0x04;
		const NAMEREQD = 0x08;
		const DGRAM = 0x10;
	}

	/// send/recv flags.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct MsgFlags: i32 {
		const PEEK = 0x02;
		const OOB = 0x01;
		const WAITALL = 0x100;
		const DONTWAIT = 0x40;
	}
}

/// IPv4 wildcard address, host order.
pub const INADDR_ANY: u32 = 0;
/// IPv4 loopback (127.0.0.1), host order.
pub const INADDR_LOOPBACK: u32 = 0x7f00_0001;
/// inet_addr failure sentinel (also 255.255.255.255).
pub const INADDR_NONE: u32 = 0xffff_ffff;

/// IPv6 wildcard address.
pub const IN6ADDR_ANY: [u8; 16] = [0; 16];
/// IPv6 loopback (::1).
pub const IN6ADDR_LOOPBACK: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];

/// Socket-level option namespace for getsockopt/setsockopt.
#[cfg(unix)]
pub const SOL_SOCKET: i32 = libc::SOL_SOCKET;
#[cfg(not(unix))]
pub const SOL_SOCKET: i32 = 1;

#[cfg(unix)]
pub const SO_TYPE: i32 = libc::SO_TYPE;
#[cfg(not(unix))]
pub const SO_TYPE: i32 = 3;

#[cfg(unix)]
pub const SO_ERROR: i32 = libc::SO_ERROR;
#[cfg(not(unix))]
pub const SO_ERROR: i32 = 4;

#[cfg(unix)]
pub const SO_REUSEADDR: i32 = libc::SO_REUSEADDR;
#[cfg(not(unix))]
pub const SO_REUSEADDR: i32 = 2;

#[cfg(unix)]
pub const SO_BROADCAST: i32 = libc::SO_BROADCAST;
#[cfg(not(unix))]
pub const SO_BROADCAST: i32 = 6;

#[cfg(unix)]
pub const IPPROTO_TCP: i32 = libc::IPPROTO_TCP;
#[cfg(not(unix))]
pub const IPPROTO_TCP: i32 = 6;

#[cfg(unix)]
pub const IPPROTO_UDP: i32 = libc::IPPROTO_UDP;
#[cfg(not(unix))]
pub const IPPROTO_UDP: i32 = 17;

#[cfg(unix)]
pub const TCP_NODELAY: i32 = libc::TCP_NODELAY;
#[cfg(not(unix))]
pub const TCP_NODELAY: i32 = 1;

#[cfg(unix)]
pub const SOMAXCONN: i32 = libc::SOMAXCONN;
#[cfg(not(unix))]
pub const SOMAXCONN: i32 = 128;

// Platform-conditional options, resolved once at compile time. Callers
// branch on `Some` before use instead of scattering cfg checks.

/// SO_DOMAIN if the platform defines it.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const SO_DOMAIN: Option<i32> = Some(libc::SO_DOMAIN);
/// SO_DOMAIN if the platform defines it.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub const SO_DOMAIN: Option<i32> = None;

/// SO_PROTOCOL if the platform defines it.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const SO_PROTOCOL: Option<i32> = Some(libc::SO_PROTOCOL);
/// SO_PROTOCOL if the platform defines it.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub const SO_PROTOCOL: Option<i32> = None;

/// SO_ACCEPTCONN if the platform defines it.
#[cfg(unix)]
pub const SO_ACCEPTCONN: Option<i32> = Some(libc::SO_ACCEPTCONN);
/// SO_ACCEPTCONN if the platform defines it.
#[cfg(not(unix))]
pub const SO_ACCEPTCONN: Option<i32> = Some(30);

/// SO_REUSEPORT if the platform defines it.
#[cfg(unix)]
pub const SO_REUSEPORT: Option<i32> = Some(libc::SO_REUSEPORT);
/// SO_REUSEPORT if the platform defines it.
#[cfg(not(unix))]
pub const SO_REUSEPORT: Option<i32> = None;
