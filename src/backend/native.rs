//! Native backend: the operation surface satisfied by real syscalls.
//!
//! State-machine errors (EISCONN, ENOTCONN, EOPNOTSUPP, ...) come from the
//! kernel itself; this module only marshals addresses and return values.

use std::ffi::CString;
use std::mem::offset_of;
use std::time::Duration;

use crate::addr::{Inet4SockAddr, Inet6SockAddr, Repr, SockAddr, UnixSockAddr};
use crate::backend::{BackendKind, Capabilities, SelectResult, SockFd, SocketBackend};
use crate::consts::{AddressFamily, MsgFlags, NiFlags, ShutdownHow, SocketType};
use crate::error::{Errno, GaiError};
use crate::resolve::{self, AddrInfoCursor, AddrInfoHints};

/// Suppress SIGPIPE per send where the platform spells it as a flag.
#[cfg(any(target_os = "linux", target_os = "android"))]
const SEND_FLAGS: i32 = libc::MSG_NOSIGNAL;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SEND_FLAGS: i32 = 0;

const SUN_PATH_OFFSET: usize = offset_of!(libc::sockaddr_un, sun_path);

pub struct NativeBackend;

impl NativeBackend {
	pub fn new() -> Self {
		NativeBackend
	}
}

impl Default for NativeBackend {
	fn default() -> Self {
		Self::new()
	}
}

/// Builds the raw sockaddr for `addr` and hands it to `f` while the
/// storage is still alive on this stack frame.
fn with_sockaddr<R>(
	addr: &SockAddr,
	f: impl FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
) -> R {
	let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
	let len: libc::socklen_t;
	match addr.repr() {
		Repr::Inet4(v4) => {
			let raw = unsafe { &mut *(&mut storage as *mut _ as *mut libc::sockaddr_in) };
			raw.sin_family = libc::AF_INET as libc::sa_family_t;
			raw.sin_port = v4.port().to_be();
			raw.sin_addr = libc::in_addr {
				s_addr: u32::from_be_bytes(v4.octets()).to_be(),
			};
			len = std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;
		}
		Repr::Inet6(v6) => {
			let raw = unsafe { &mut *(&mut storage as *mut _ as *mut libc::sockaddr_in6) };
			raw.sin6_family = libc::AF_INET6 as libc::sa_family_t;
			raw.sin6_port = v6.port().to_be();
			raw.sin6_flowinfo = v6.flow_info();
			raw.sin6_addr = libc::in6_addr { s6_addr: v6.addr() };
			raw.sin6_scope_id = v6.scope_id();
			len = std::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t;
		}
		Repr::Unix(un) => {
			let raw = unsafe { &mut *(&mut storage as *mut _ as *mut libc::sockaddr_un) };
			raw.sun_family = libc::AF_UNIX as libc::sa_family_t;
			let path = un.path();
			for (i, &byte) in path.iter().enumerate() {
				raw.sun_path[i] = byte as libc::c_char;
			}
			// Pathname sockets count their NUL terminator; abstract and
			// unnamed addresses use the exact byte length.
			let terminator = usize::from(!un.is_unnamed() && !un.is_abstract());
			len = (SUN_PATH_OFFSET + path.len() + terminator) as libc::socklen_t;
		}
	}
	f(&storage as *const _ as *const libc::sockaddr, len)
}

/// Reads a kernel- or resolver-produced sockaddr back into the model.
///
/// Returns None for families the model does not cover.
pub(crate) fn sockaddr_to_addr(
	ptr: *const libc::sockaddr,
	len: libc::socklen_t,
) -> Option<SockAddr> {
	if ptr.is_null() || (len as usize) < std::mem::size_of::<libc::sa_family_t>() {
		return None;
	}
	let family = unsafe { (*ptr).sa_family } as i32;
	match family {
		libc::AF_INET => {
			if (len as usize) < std::mem::size_of::<libc::sockaddr_in>() {
				return None;
			}
			let raw = unsafe { &*(ptr as *const libc::sockaddr_in) };
			Some(
				Inet4SockAddr::from_octets(
					raw.sin_addr.s_addr.to_ne_bytes(),
					u16::from_be(raw.sin_port),
				)
				.into(),
			)
		}
		libc::AF_INET6 => {
			if (len as usize) < std::mem::size_of::<libc::sockaddr_in6>() {
				return None;
			}
			let raw = unsafe { &*(ptr as *const libc::sockaddr_in6) };
			Some(
				Inet6SockAddr::with_scope(
					raw.sin6_addr.s6_addr,
					u16::from_be(raw.sin6_port),
					raw.sin6_flowinfo,
					raw.sin6_scope_id,
				)
				.into(),
			)
		}
		libc::AF_UNIX => {
			let raw = unsafe { &*(ptr as *const libc::sockaddr_un) };
			let path_len = (len as usize).saturating_sub(SUN_PATH_OFFSET);
			let bytes: Vec<u8> = raw.sun_path[..path_len.min(raw.sun_path.len())]
				.iter()
				.map(|&c| c as u8)
				.collect();
			let bytes = if bytes.first().copied() == Some(0) {
				// Abstract name: length-delimited, NULs significant.
				bytes
			} else {
				// Pathname: kernel may report the terminator; trim it.
				let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
				bytes[..end].to_vec()
			};
			Some(UnixSockAddr::from_raw_bytes(bytes).into())
		}
		_ => None,
	}
}

fn storage_to_addr(
	storage: &libc::sockaddr_storage,
	len: libc::socklen_t,
) -> Result<SockAddr, Errno> {
	sockaddr_to_addr(storage as *const _ as *const libc::sockaddr, len)
		.ok_or(Errno::EAFNOSUPPORT)
}

/// Marks the descriptor close-on-exec where socket() could not do it.
#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn set_cloexec(fd: i32) -> Result<(), Errno> {
	let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
	if flags == -1 {
		return Err(Errno::last());
	}
	if unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) } == -1 {
		return Err(Errno::last());
	}
	Ok(())
}

impl SocketBackend for NativeBackend {
	fn kind(&self) -> BackendKind {
		BackendKind::Native
	}

	fn capabilities(&self) -> Capabilities {
		Capabilities {
			sendto_on_connected: cfg!(any(target_os = "linux", target_os = "android")),
			stream_local_bind_before_connect: true,
			abstract_unix_namespace: cfg!(any(target_os = "linux", target_os = "android")),
			unix_sockets: true,
			reverse_lookup: true,
		}
	}

	fn socket(
		&self,
		family: AddressFamily,
		socktype: SocketType,
		protocol: i32,
	) -> Result<SockFd, Errno> {
		#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
		let raw_type = socktype.to_raw() | libc::SOCK_CLOEXEC;
		#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
		let raw_type = socktype.to_raw();

		let fd = unsafe { libc::socket(family.to_raw(), raw_type, protocol) };
		if fd == -1 {
			return Err(Errno::last());
		}

		#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
		{
			set_cloexec(fd)?;
		}
		// Platforms without MSG_NOSIGNAL suppress SIGPIPE per socket.
		#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
		{
			let one: libc::c_int = 1;
			unsafe {
				libc::setsockopt(
					fd,
					libc::SOL_SOCKET,
					libc::SO_NOSIGPIPE,
					&one as *const _ as *const libc::c_void,
					std::mem::size_of::<libc::c_int>() as libc::socklen_t,
				)
			};
		}

		log::debug!("socket({family:?}, {socktype:?}, {protocol}) -> {fd}");
		Ok(SockFd { raw: fd, family })
	}

	fn bind(&self, fd: SockFd, addr: &SockAddr) -> Result<(), Errno> {
		let result = with_sockaddr(addr, |ptr, len| unsafe {
			libc::bind(fd.raw, ptr, len)
		});
		if result == -1 { Err(Errno::last()) } else { Ok(()) }
	}

	fn listen(&self, fd: SockFd, backlog: i32) -> Result<(), Errno> {
		let result = unsafe { libc::listen(fd.raw, backlog) };
		if result == -1 { Err(Errno::last()) } else { Ok(()) }
	}

	fn connect(&self, fd: SockFd, addr: &SockAddr) -> Result<(), Errno> {
		let result = with_sockaddr(addr, |ptr, len| unsafe {
			libc::connect(fd.raw, ptr, len)
		});
		if result == -1 { Err(Errno::last()) } else { Ok(()) }
	}

	fn accept(&self, fd: SockFd) -> Result<(SockFd, SockAddr), Errno> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

		#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
		let child = unsafe {
			libc::accept4(
				fd.raw,
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
				libc::SOCK_CLOEXEC,
			)
		};
		#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
		let child = unsafe {
			libc::accept(
				fd.raw,
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
			)
		};

		if child == -1 {
			return Err(Errno::last());
		}
		#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
		{
			set_cloexec(child)?;
		}

		let peer = storage_to_addr(&storage, len)?;
		log::debug!("accept({}) -> {child} from {peer}", fd.raw);
		Ok((SockFd { raw: child, family: fd.family }, peer))
	}

	fn shutdown(&self, fd: SockFd, how: ShutdownHow) -> Result<(), Errno> {
		let result = unsafe { libc::shutdown(fd.raw, how.to_raw()) };
		if result == -1 { Err(Errno::last()) } else { Ok(()) }
	}

	fn close(&self, fd: SockFd) -> Result<(), Errno> {
		log::debug!("close({})", fd.raw);
		let result = unsafe { libc::close(fd.raw) };
		if result == -1 { Err(Errno::last()) } else { Ok(()) }
	}

	fn send(&self, fd: SockFd, buf: &[u8], flags: MsgFlags) -> Result<usize, Errno> {
		let n = unsafe {
			libc::send(
				fd.raw,
				buf.as_ptr() as *const libc::c_void,
				buf.len(),
				flags.bits() | SEND_FLAGS,
			)
		};
		if n == -1 { Err(Errno::last()) } else { Ok(n as usize) }
	}

	fn recv(&self, fd: SockFd, buf: &mut [u8], flags: MsgFlags) -> Result<usize, Errno> {
		let n = unsafe {
			libc::recv(
				fd.raw,
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
				flags.bits(),
			)
		};
		if n == -1 { Err(Errno::last()) } else { Ok(n as usize) }
	}

	fn send_to(
		&self,
		fd: SockFd,
		buf: &[u8],
		flags: MsgFlags,
		addr: &SockAddr,
	) -> Result<usize, Errno> {
		let n = with_sockaddr(addr, |ptr, len| unsafe {
			libc::sendto(
				fd.raw,
				buf.as_ptr() as *const libc::c_void,
				buf.len(),
				flags.bits() | SEND_FLAGS,
				ptr,
				len,
			)
		});
		if n == -1 { Err(Errno::last()) } else { Ok(n as usize) }
	}

	fn recv_from(
		&self,
		fd: SockFd,
		buf: &mut [u8],
		flags: MsgFlags,
	) -> Result<(usize, SockAddr), Errno> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

		let n = unsafe {
			libc::recvfrom(
				fd.raw,
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
				flags.bits(),
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
			)
		};
		if n == -1 {
			return Err(Errno::last());
		}
		// Stream sockets leave the source unspecified; report the peer.
		let addr = match storage_to_addr(&storage, len) {
			Ok(addr) => addr,
			Err(_) => self.getpeername(fd)?,
		};
		Ok((n as usize, addr))
	}

	fn write(&self, fd: SockFd, buf: &[u8]) -> Result<usize, Errno> {
		let n = unsafe {
			libc::write(fd.raw, buf.as_ptr() as *const libc::c_void, buf.len())
		};
		if n == -1 { Err(Errno::last()) } else { Ok(n as usize) }
	}

	fn read(&self, fd: SockFd, buf: &mut [u8]) -> Result<usize, Errno> {
		let n = unsafe {
			libc::read(fd.raw, buf.as_mut_ptr() as *mut libc::c_void, buf.len())
		};
		if n == -1 { Err(Errno::last()) } else { Ok(n as usize) }
	}

	fn getsockname(&self, fd: SockFd) -> Result<SockAddr, Errno> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
		let result = unsafe {
			libc::getsockname(
				fd.raw,
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
			)
		};
		if result == -1 {
			return Err(Errno::last());
		}
		storage_to_addr(&storage, len)
	}

	fn getpeername(&self, fd: SockFd) -> Result<SockAddr, Errno> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
		let result = unsafe {
			libc::getpeername(
				fd.raw,
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
			)
		};
		if result == -1 {
			return Err(Errno::last());
		}
		storage_to_addr(&storage, len)
	}

	fn getsockopt(
		&self,
		fd: SockFd,
		level: i32,
		optname: i32,
		buf: &mut [u8],
	) -> Result<usize, Errno> {
		let mut len = buf.len() as libc::socklen_t;
		let result = unsafe {
			libc::getsockopt(
				fd.raw,
				level,
				optname,
				buf.as_mut_ptr() as *mut libc::c_void,
				&mut len,
			)
		};
		if result == -1 { Err(Errno::last()) } else { Ok(len as usize) }
	}

	fn setsockopt(&self, fd: SockFd, level: i32, optname: i32, buf: &[u8]) -> Result<(), Errno> {
		let result = unsafe {
			libc::setsockopt(
				fd.raw,
				level,
				optname,
				buf.as_ptr() as *const libc::c_void,
				buf.len() as libc::socklen_t,
			)
		};
		if result == -1 { Err(Errno::last()) } else { Ok(()) }
	}

	fn set_blocking(&self, fd: SockFd, blocking: bool) -> Result<(), Errno> {
		let flags = unsafe { libc::fcntl(fd.raw, libc::F_GETFL) };
		if flags == -1 {
			return Err(Errno::last());
		}
		let new_flags = if blocking {
			flags & !libc::O_NONBLOCK
		} else {
			flags | libc::O_NONBLOCK
		};
		let result = unsafe { libc::fcntl(fd.raw, libc::F_SETFL, new_flags) };
		if result == -1 { Err(Errno::last()) } else { Ok(()) }
	}

	fn blocking(&self, fd: SockFd) -> Result<bool, Errno> {
		let flags = unsafe { libc::fcntl(fd.raw, libc::F_GETFL) };
		if flags == -1 {
			return Err(Errno::last());
		}
		Ok(flags & libc::O_NONBLOCK == 0)
	}

	fn select(
		&self,
		read: &[SockFd],
		write: &[SockFd],
		error: &[SockFd],
		timeout: Option<Duration>,
	) -> Result<SelectResult, Errno> {
		let mut readset: libc::fd_set = unsafe { std::mem::zeroed() };
		let mut writeset: libc::fd_set = unsafe { std::mem::zeroed() };
		let mut errorset: libc::fd_set = unsafe { std::mem::zeroed() };
		unsafe {
			libc::FD_ZERO(&mut readset);
			libc::FD_ZERO(&mut writeset);
			libc::FD_ZERO(&mut errorset);
		}

		let mut nfds = 0;
		for (fds, set) in [
			(read, &mut readset),
			(write, &mut writeset),
			(error, &mut errorset),
		] {
			for fd in fds {
				if fd.raw < 0 || fd.raw >= libc::FD_SETSIZE as i32 {
					return Err(Errno::EINVAL);
				}
				unsafe { libc::FD_SET(fd.raw, set) };
				nfds = nfds.max(fd.raw + 1);
			}
		}

		let mut tv = timeout.map(|t| libc::timeval {
			tv_sec: t.as_secs() as libc::time_t,
			tv_usec: t.subsec_micros() as libc::suseconds_t,
		});
		let tv_ptr = tv
			.as_mut()
			.map_or(std::ptr::null_mut(), |tv| tv as *mut libc::timeval);

		let result = unsafe {
			libc::select(
				nfds,
				&mut readset,
				&mut writeset,
				&mut errorset,
				tv_ptr,
			)
		};
		if result == -1 {
			return Err(Errno::last());
		}

		let collect = |fds: &[SockFd], set: &mut libc::fd_set| {
			fds.iter()
				.map(|fd| unsafe { libc::FD_ISSET(fd.raw, set) })
				.collect()
		};
		Ok(SelectResult {
			read: collect(read, &mut readset),
			write: collect(write, &mut writeset),
			error: collect(error, &mut errorset),
		})
	}

	fn getaddrinfo(
		&self,
		node: Option<&str>,
		service: Option<&str>,
		hints: &AddrInfoHints,
	) -> Result<AddrInfoCursor, GaiError> {
		resolve::precheck(node, service, hints)?;

		let c_node = match node {
			Some(text) => Some(CString::new(text).map_err(|_| GaiError::NoName)?),
			None => None,
		};
		let c_service = match service {
			Some(text) => Some(CString::new(text).map_err(|_| GaiError::Service)?),
			None => None,
		};

		let mut c_hints: libc::addrinfo = unsafe { std::mem::zeroed() };
		c_hints.ai_family = hints.family;
		c_hints.ai_socktype = hints.socktype;
		c_hints.ai_protocol = hints.protocol;
		c_hints.ai_flags = hints.flags.bits();

		let mut res: *mut libc::addrinfo = std::ptr::null_mut();
		let rc = unsafe {
			libc::getaddrinfo(
				c_node.as_ref().map_or(std::ptr::null(), |s| s.as_ptr()),
				c_service.as_ref().map_or(std::ptr::null(), |s| s.as_ptr()),
				&c_hints,
				&mut res,
			)
		};
		if rc != 0 {
			return Err(GaiError::from_raw(rc));
		}
		log::debug!("getaddrinfo({node:?}, {service:?}) resolved");
		Ok(AddrInfoCursor::from_native(res))
	}

	fn getnameinfo(&self, addr: &SockAddr, flags: NiFlags) -> Result<(String, String), GaiError> {
		let mut host = [0u8; 1025];
		let mut serv = [0u8; 32];

		let rc = with_sockaddr(addr, |ptr, len| unsafe {
			libc::getnameinfo(
				ptr,
				len,
				host.as_mut_ptr() as *mut libc::c_char,
				host.len() as libc::socklen_t,
				serv.as_mut_ptr() as *mut libc::c_char,
				serv.len() as libc::socklen_t,
				flags.bits(),
			)
		});
		if rc != 0 {
			return Err(GaiError::from_raw(rc));
		}

		let host_end = host.iter().position(|&b| b == 0).unwrap_or(host.len());
		let serv_end = serv.iter().position(|&b| b == 0).unwrap_or(serv.len());
		Ok((
			String::from_utf8_lossy(&host[..host_end]).into_owned(),
			String::from_utf8_lossy(&serv[..serv_end]).into_owned(),
		))
	}

	fn gethostname(&self) -> Result<String, Errno> {
		let mut buf = [0u8; 256];
		let result = unsafe {
			libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len())
		};
		if result == -1 {
			return Err(Errno::last());
		}
		let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
		Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
	}
}
