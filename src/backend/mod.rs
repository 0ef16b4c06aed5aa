//! Backend dispatch: one operation surface, two implementations.
//!
//! [`SocketBackend`] is the whole fd-based verb set. It has exactly two
//! implementers — [`NativeBackend`] issuing real syscalls and
//! [`EmulatedBackend`] running on `std::net` — picked once at startup and
//! held as a single injected dependency. No per-call dispatch decisions
//! happen anywhere else.

pub mod emulated;
#[cfg(unix)]
pub mod native;

pub use self::emulated::EmulatedBackend;
#[cfg(unix)]
pub use self::native::NativeBackend;

use std::time::Duration;

use crate::addr::SockAddr;
use crate::consts::{AddressFamily, MsgFlags, NiFlags, ShutdownHow, SocketType};
use crate::error::{Errno, GaiError};
use crate::resolve::{AddrInfoCursor, AddrInfoHints};

/// A socket handle: descriptor number plus the family it was created with.
///
/// Handles are only meaningful to the backend that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SockFd {
	pub raw: i32,
	pub family: AddressFamily,
}

/// Per-fd readiness masks returned by `select`, aligned index-for-index
/// with the input slices.
#[derive(Debug, Clone, Default)]
pub struct SelectResult {
	pub read: Vec<bool>,
	pub write: Vec<bool>,
	pub error: Vec<bool>,
}

impl SelectResult {
	/// True if any descriptor is ready.
	pub fn any(&self) -> bool {
		self.read.iter().chain(&self.write).chain(&self.error).any(|&ready| ready)
	}
}

/// Documented behavioral differences between the backends.
///
/// These are policy, not bugs: callers that depend on one of them must
/// branch on the capability instead of assuming a backend.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
	/// `sendto` on a connected socket redirects (true) or fails `EISCONN`
	/// (false).
	pub sendto_on_connected: bool,
	/// A non-zero local port bound before a stream `connect` is honored.
	pub stream_local_bind_before_connect: bool,
	/// The Linux abstract Unix namespace is usable.
	pub abstract_unix_namespace: bool,
	/// AF_UNIX sockets are available at all.
	pub unix_sockets: bool,
	/// getnameinfo can perform real reverse lookups beyond loopback.
	pub reverse_lookup: bool,
}

/// Which implementation backs the operation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
	Native,
	Emulated,
}

impl BackendKind {
	/// Picks a backend once at startup.
	///
	/// `SOCKLANE_BACKEND=native|emulated` overrides; otherwise native where
	/// syscalls exist, emulated elsewhere.
	pub fn detect() -> Self {
		match std::env::var("SOCKLANE_BACKEND").as_deref() {
			Ok("native") => BackendKind::Native,
			Ok("emulated") => BackendKind::Emulated,
			Ok(other) => {
				log::warn!("unknown SOCKLANE_BACKEND value {other:?}, using default");
				Self::platform_default()
			}
			Err(_) => Self::platform_default(),
		}
	}

	fn platform_default() -> Self {
		if cfg!(unix) {
			BackendKind::Native
		} else {
			BackendKind::Emulated
		}
	}
}

/// Instantiates the selected backend.
pub fn backend(kind: BackendKind) -> Box<dyn SocketBackend> {
	log::debug!("selecting {kind:?} socket backend");
	match kind {
		#[cfg(unix)]
		BackendKind::Native => Box::new(NativeBackend::new()),
		#[cfg(not(unix))]
		BackendKind::Native => {
			log::warn!("native backend unavailable on this platform, using emulated");
			Box::new(EmulatedBackend::new())
		}
		BackendKind::Emulated => Box::new(EmulatedBackend::new()),
	}
}

/// The uniform operation surface.
///
/// Every verb takes the descriptor explicitly and borrows caller buffers
/// for the duration of the call. Both implementations raise the same
/// [`Errno`] codes for the same observable conditions; where kernels
/// legitimately disagree the tolerated set is named in the verb's docs.
pub trait SocketBackend: Send + Sync {
	fn kind(&self) -> BackendKind;

	fn capabilities(&self) -> Capabilities;

	/// Creates a socket in the CREATED state.
	fn socket(
		&self,
		family: AddressFamily,
		socktype: SocketType,
		protocol: i32,
	) -> Result<SockFd, Errno>;

	/// Assigns a local address. Legal only once; a second bind is `EINVAL`.
	/// Port 0 auto-assigns an ephemeral port visible via `getsockname`.
	fn bind(&self, fd: SockFd, addr: &SockAddr) -> Result<(), Errno>;

	/// Starts accepting connections. `EOPNOTSUPP` on datagram sockets.
	fn listen(&self, fd: SockFd, backlog: i32) -> Result<(), Errno>;

	/// Connects a stream, or records the default peer of a datagram socket
	/// (repeatable for datagrams). `EISCONN` on a connected stream,
	/// `EINVAL` (or `EOPNOTSUPP` on some kernels) on a listening one.
	fn connect(&self, fd: SockFd, addr: &SockAddr) -> Result<(), Errno>;

	/// Takes one pending connection. `EWOULDBLOCK` in non-blocking mode
	/// with nothing queued.
	fn accept(&self, fd: SockFd) -> Result<(SockFd, SockAddr), Errno>;

	/// Disables one or both halves without releasing the descriptor.
	/// A shut-down read half yields 0-byte reads, not errors.
	fn shutdown(&self, fd: SockFd, how: ShutdownHow) -> Result<(), Errno>;

	/// Releases the descriptor. The caller's obligation on every path.
	fn close(&self, fd: SockFd) -> Result<(), Errno>;

	fn send(&self, fd: SockFd, buf: &[u8], flags: MsgFlags) -> Result<usize, Errno>;

	fn recv(&self, fd: SockFd, buf: &mut [u8], flags: MsgFlags) -> Result<usize, Errno>;

	/// Sends to an explicit address. On unconnected datagram sockets this
	/// works without any prior bind or connect.
	fn send_to(
		&self,
		fd: SockFd,
		buf: &[u8],
		flags: MsgFlags,
		addr: &SockAddr,
	) -> Result<usize, Errno>;

	/// Receives along with the sender's address.
	fn recv_from(
		&self,
		fd: SockFd,
		buf: &mut [u8],
		flags: MsgFlags,
	) -> Result<(usize, SockAddr), Errno>;

	/// Flagless send; identical observable behavior to `write(2)`.
	fn write(&self, fd: SockFd, buf: &[u8]) -> Result<usize, Errno> {
		self.send(fd, buf, MsgFlags::empty())
	}

	/// Flagless recv; identical observable behavior to `read(2)`.
	fn read(&self, fd: SockFd, buf: &mut [u8]) -> Result<usize, Errno> {
		self.recv(fd, buf, MsgFlags::empty())
	}

	fn getsockname(&self, fd: SockFd) -> Result<SockAddr, Errno>;

	/// `ENOTCONN` on unconnected sockets, always.
	fn getpeername(&self, fd: SockFd) -> Result<SockAddr, Errno>;

	/// Reads an option into `buf`; returns the written length. The buffer
	/// length must match what the option expects (typically 4).
	fn getsockopt(
		&self,
		fd: SockFd,
		level: i32,
		optname: i32,
		buf: &mut [u8],
	) -> Result<usize, Errno>;

	/// Writes an option from `buf`, with the same exact-length contract.
	fn setsockopt(&self, fd: SockFd, level: i32, optname: i32, buf: &[u8]) -> Result<(), Errno>;

	/// Switches between suspending and `EWOULDBLOCK`-failing behavior for
	/// calls that would otherwise wait.
	fn set_blocking(&self, fd: SockFd, blocking: bool) -> Result<(), Errno>;

	fn blocking(&self, fd: SockFd) -> Result<bool, Errno>;

	/// Synchronous readiness multiplexing. For listeners, readable means a
	/// pending connection; for streams, data or EOF. `None` blocks
	/// indefinitely, `Some(0)` polls.
	fn select(
		&self,
		read: &[SockFd],
		write: &[SockFd],
		error: &[SockFd],
		timeout: Option<Duration>,
	) -> Result<SelectResult, Errno>;

	/// Resolves node/service text into candidate addresses. Zero candidates
	/// is `EAI_NONAME`, never an empty cursor.
	fn getaddrinfo(
		&self,
		node: Option<&str>,
		service: Option<&str>,
		hints: &AddrInfoHints,
	) -> Result<AddrInfoCursor, GaiError>;

	/// Formats an address as (host, service) text.
	fn getnameinfo(&self, addr: &SockAddr, flags: NiFlags) -> Result<(String, String), GaiError>;

	fn gethostname(&self) -> Result<String, Errno>;
}

/// Scoped ownership of a descriptor: closes on drop.
///
/// The raw fd surface leaves release to the caller on every path;
/// this guard is the recommended way to make that guarantee hold through
/// early returns.
pub struct OwnedSock<'a> {
	backend: &'a dyn SocketBackend,
	fd: SockFd,
}

impl<'a> OwnedSock<'a> {
	/// Creates a socket owned by the guard.
	pub fn open(
		backend: &'a dyn SocketBackend,
		family: AddressFamily,
		socktype: SocketType,
		protocol: i32,
	) -> Result<Self, Errno> {
		let fd = backend.socket(family, socktype, protocol)?;
		Ok(Self { backend, fd })
	}

	/// Wraps an already-created descriptor (e.g. an accept child).
	pub fn adopt(backend: &'a dyn SocketBackend, fd: SockFd) -> Self {
		Self { backend, fd }
	}

	/// Returns the handle for use with backend verbs.
	pub fn fd(&self) -> SockFd {
		self.fd
	}

	/// Releases ownership without closing.
	pub fn into_raw(self) -> SockFd {
		let fd = self.fd;
		std::mem::forget(self);
		fd
	}
}

impl Drop for OwnedSock<'_> {
	fn drop(&mut self) {
		if let Err(code) = self.backend.close(self.fd) {
			log::debug!("close({}) on drop failed: {code}", self.fd.raw);
		}
	}
}
