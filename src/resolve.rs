//! Name resolution types: getaddrinfo hints, resolved candidates, and the
//! cursor resource that owns them.

use crate::addr::SockAddr;
use crate::consts::{AddressFamily, AiFlags, SocketType};
use crate::error::GaiError;

/// Hints narrowing a getaddrinfo query.
///
/// `family` and `socktype` are raw platform constants (0 = any), so callers
/// coming from a foreign ABI can pass their values straight through; invalid
/// values surface as `EAI_FAMILY` / `EAI_SOCKTYPE` rather than panicking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddrInfoHints {
	pub family: i32,
	pub socktype: i32,
	pub protocol: i32,
	pub flags: AiFlags,
}

impl AddrInfoHints {
	/// Hints restricted to one address family.
	pub fn for_family(family: AddressFamily) -> Self {
		Self {
			family: family.to_raw(),
			..Self::default()
		}
	}

	/// Hints restricted to one family and socket type.
	pub fn for_socket(family: AddressFamily, socktype: SocketType) -> Self {
		Self {
			family: family.to_raw(),
			socktype: socktype.to_raw(),
			..Self::default()
		}
	}
}

/// One resolved candidate.
#[derive(Debug, Clone)]
pub struct AddrInfoEntry {
	pub family: AddressFamily,
	pub socktype: SocketType,
	pub protocol: i32,
	pub canonname: Option<String>,
	pub addr: SockAddr,
}

/// Validates arguments common to both backends.
///
/// Returns the decoded family and socket-type restriction.
pub(crate) fn precheck(
	node: Option<&str>,
	service: Option<&str>,
	hints: &AddrInfoHints,
) -> Result<(AddressFamily, Option<SocketType>), GaiError> {
	if node.is_none() && service.is_none() {
		return Err(GaiError::NoName);
	}
	if hints.flags.contains(AiFlags::CANONNAME) && node.is_none() {
		return Err(GaiError::BadFlags);
	}
	let family = match AddressFamily::from_raw(hints.family) {
		Ok(AddressFamily::Unix) | Err(_) => return Err(GaiError::Family),
		Ok(family) => family,
	};
	let socktype = if hints.socktype == 0 {
		None
	} else {
		Some(SocketType::from_raw(hints.socktype).map_err(|_| GaiError::SockType)?)
	};
	Ok((family, socktype))
}

/// A lazily-walked list of resolved candidates.
///
/// Forward-only and non-restartable: each `next` consumes a position.
/// The backing state (a native addrinfo list or an emulated vector) is
/// freed by [`release`](Self::release) or on drop, whichever comes first.
pub struct AddrInfoCursor {
	inner: Inner,
}

enum Inner {
	#[cfg(unix)]
	Native {
		head: *mut libc::addrinfo,
		next: *mut libc::addrinfo,
	},
	Emulated(std::vec::IntoIter<AddrInfoEntry>),
}

impl AddrInfoCursor {
	pub(crate) fn from_entries(entries: Vec<AddrInfoEntry>) -> Self {
		Self {
			inner: Inner::Emulated(entries.into_iter()),
		}
	}

	/// Takes ownership of a getaddrinfo result list; the cursor becomes
	/// responsible for the matching freeaddrinfo.
	#[cfg(unix)]
	pub(crate) fn from_native(head: *mut libc::addrinfo) -> Self {
		Self {
			inner: Inner::Native { head, next: head },
		}
	}

	/// Frees the backing resolver state.
	///
	/// Dropping the cursor does the same; this spelling exists so release
	/// points read explicitly at call sites.
	pub fn release(self) {}
}

impl Iterator for AddrInfoCursor {
	type Item = AddrInfoEntry;

	fn next(&mut self) -> Option<AddrInfoEntry> {
		match &mut self.inner {
			#[cfg(unix)]
			Inner::Native { next, .. } => {
				while !next.is_null() {
					let ai = unsafe { &**next };
					*next = ai.ai_next;
					if let Some(entry) = native_entry(ai) {
						return Some(entry);
					}
					// Candidates the model cannot express (e.g. SOCK_RAW
					// triples from a socktype-0 query) are skipped.
				}
				None
			}
			Inner::Emulated(iter) => iter.next(),
		}
	}
}

impl Drop for AddrInfoCursor {
	fn drop(&mut self) {
		#[cfg(unix)]
		if let Inner::Native { head, .. } = self.inner {
			if !head.is_null() {
				unsafe { libc::freeaddrinfo(head) };
			}
		}
	}
}

#[cfg(unix)]
fn native_entry(ai: &libc::addrinfo) -> Option<AddrInfoEntry> {
	let family = AddressFamily::from_raw(ai.ai_family).ok()?;
	let socktype = SocketType::from_raw(ai.ai_socktype).ok()?;
	let addr =
		crate::backend::native::sockaddr_to_addr(ai.ai_addr, ai.ai_addrlen)?;
	let canonname = if ai.ai_canonname.is_null() {
		None
	} else {
		Some(
			unsafe { std::ffi::CStr::from_ptr(ai.ai_canonname) }
				.to_string_lossy()
				.into_owned(),
		)
	};
	Some(AddrInfoEntry {
		family,
		socktype,
		protocol: ai.ai_protocol,
		canonname,
		addr,
	})
}

struct ServiceEntry {
	name: &'static str,
	port: u16,
	tcp: bool,
	udp: bool,
}

/// Well-known services backing the emulated resolver.
///
/// Deliberately a fixed subset of /etc/services, so emulated lookups are
/// deterministic on hosts without a services database.
const SERVICES: &[ServiceEntry] = &[
	ServiceEntry { name: "echo", port: 7, tcp: true, udp: true },
	ServiceEntry { name: "discard", port: 9, tcp: true, udp: true },
	ServiceEntry { name: "daytime", port: 13, tcp: true, udp: true },
	ServiceEntry { name: "chargen", port: 19, tcp: true, udp: true },
	ServiceEntry { name: "ftp-data", port: 20, tcp: true, udp: false },
	ServiceEntry { name: "ftp", port: 21, tcp: true, udp: false },
	ServiceEntry { name: "ssh", port: 22, tcp: true, udp: false },
	ServiceEntry { name: "telnet", port: 23, tcp: true, udp: false },
	ServiceEntry { name: "smtp", port: 25, tcp: true, udp: false },
	ServiceEntry { name: "domain", port: 53, tcp: true, udp: true },
	ServiceEntry { name: "tftp", port: 69, tcp: false, udp: true },
	ServiceEntry { name: "http", port: 80, tcp: true, udp: true },
	ServiceEntry { name: "pop3", port: 110, tcp: true, udp: false },
	ServiceEntry { name: "ntp", port: 123, tcp: false, udp: true },
	ServiceEntry { name: "imap", port: 143, tcp: true, udp: false },
	ServiceEntry { name: "snmp", port: 161, tcp: false, udp: true },
	ServiceEntry { name: "ldap", port: 389, tcp: true, udp: true },
	ServiceEntry { name: "https", port: 443, tcp: true, udp: true },
	ServiceEntry { name: "submission", port: 587, tcp: true, udp: false },
	ServiceEntry { name: "rsync", port: 873, tcp: true, udp: false },
];

/// Looks up a service name in the built-in table.
pub(crate) fn service_port(name: &str, socktype: Option<SocketType>) -> Option<u16> {
	SERVICES
		.iter()
		.find(|entry| {
			entry.name.eq_ignore_ascii_case(name)
				&& match socktype {
					Some(SocketType::Stream) => entry.tcp,
					Some(SocketType::Dgram) => entry.udp,
					None => true,
				}
		})
		.map(|entry| entry.port)
}

/// Reverse service lookup for getnameinfo.
pub(crate) fn service_name(port: u16, dgram: bool) -> Option<&'static str> {
	SERVICES
		.iter()
		.find(|entry| entry.port == port && if dgram { entry.udp } else { entry.tcp })
		.map(|entry| entry.name)
}
