//! Emulated backend: the operation surface satisfied entirely by
//! `std::net` primitives, with no direct syscalls.
//!
//! Descriptors index a process-local table; each entry carries the
//! CREATED → BOUND → (LISTENING | CONNECTED) state machine that the kernel
//! enforces for the native backend, so illegal transitions raise the same
//! errno codes here.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{Ipv4Addr, Ipv6Addr, TcpListener, TcpStream, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::net::{UnixDatagram, UnixListener, UnixStream};

use crate::addr::{Inet4SockAddr, Inet6SockAddr, SockAddr, UnixSockAddr};
use crate::backend::{BackendKind, Capabilities, SelectResult, SockFd, SocketBackend};
use crate::consts::{self, AddressFamily, AiFlags, MsgFlags, NiFlags, ShutdownHow, SocketType};
use crate::conv;
use crate::error::{Errno, GaiError};
use crate::resolve::{self, AddrInfoCursor, AddrInfoEntry, AddrInfoHints};

/// Emulated descriptors start well above any plausible kernel fd so the
/// two namespaces cannot be confused in logs or by accident.
const FD_BASE: i32 = 1 << 16;

/// Options that can be set before the std socket object exists.
#[derive(Debug, Clone, Copy, Default)]
struct PendingOpts {
	reuse_addr: bool,
	nodelay: bool,
	broadcast: bool,
}

enum ListenSock {
	Tcp(TcpListener),
	#[cfg(unix)]
	Unix(UnixListener),
}

enum StreamSock {
	Tcp(TcpStream),
	#[cfg(unix)]
	Unix(UnixStream),
}

enum DgramSock {
	Udp(UdpSocket),
	#[cfg(unix)]
	Unix(UnixDatagram),
}

enum EmuState {
	/// Fresh socket; nothing materialized yet.
	Created { opts: PendingOpts },
	/// Stream socket with a local address. The listener is materialized at
	/// bind time so port 0 resolves to a real ephemeral port immediately,
	/// matching what `getsockname` must observe.
	StreamBound {
		listener: ListenSock,
		requested_port: Option<u16>,
		opts: PendingOpts,
	},
	Listening {
		listener: ListenSock,
		pending: VecDeque<(StreamSock, SockAddr)>,
	},
	StreamConnected {
		conn: StreamSock,
		read_shut: bool,
		write_shut: bool,
	},
	/// Datagram socket with an underlying socket (bound explicitly or
	/// implicitly) and an optional default peer.
	DgramOpen {
		sock: DgramSock,
		peer: Option<SockAddr>,
		opts: PendingOpts,
	},
}

struct EmuSock {
	family: AddressFamily,
	socktype: SocketType,
	protocol: i32,
	blocking: AtomicBool,
	state: Mutex<EmuState>,
}

impl EmuSock {
	fn blocking(&self) -> bool {
		self.blocking.load(Ordering::Relaxed)
	}
}

pub struct EmulatedBackend {
	table: Mutex<HashMap<i32, Arc<EmuSock>>>,
	next_fd: AtomicI32,
}

impl EmulatedBackend {
	pub fn new() -> Self {
		Self {
			table: Mutex::new(HashMap::new()),
			next_fd: AtomicI32::new(FD_BASE),
		}
	}

	fn get(&self, fd: SockFd) -> Result<Arc<EmuSock>, Errno> {
		self.table
			.lock()
			.expect("fd table poisoned")
			.get(&fd.raw)
			.cloned()
			.ok_or(Errno::EBADF)
	}

	fn register(&self, sock: EmuSock) -> SockFd {
		let raw = self.next_fd.fetch_add(1, Ordering::Relaxed);
		let family = sock.family;
		self.table
			.lock()
			.expect("fd table poisoned")
			.insert(raw, Arc::new(sock));
		SockFd { raw, family }
	}
}

impl Default for EmulatedBackend {
	fn default() -> Self {
		Self::new()
	}
}

fn map_io(err: std::io::Error) -> Errno {
	Errno::from_io(&err)
}

/// Rejects flag bits this backend cannot honor.
fn check_flags(flags: MsgFlags, receiving: bool) -> Result<(), Errno> {
	let mut allowed = MsgFlags::DONTWAIT;
	if receiving {
		allowed |= MsgFlags::PEEK | MsgFlags::WAITALL;
	}
	if flags.intersects(!allowed) {
		return Err(Errno::EOPNOTSUPP);
	}
	Ok(())
}

/// Replaces a never-touched datagram socket with a materialized one bound
/// to the family wildcard; no-op in any other state.
fn ensure_dgram_open(
	family: AddressFamily,
	state: &mut EmuState,
) -> Result<(), Errno> {
	let created_opts = match &*state {
		EmuState::Created { opts } => Some(*opts),
		_ => None,
	};
	if let Some(opts) = created_opts {
		let dgram = materialize_dgram(family, opts)?;
		*state = EmuState::DgramOpen { sock: dgram, peer: None, opts };
	}
	Ok(())
}

#[cfg(unix)]
fn unix_fs_path(addr: &UnixSockAddr) -> Result<&std::path::Path, Errno> {
	use std::os::unix::ffi::OsStrExt;
	if addr.is_unnamed() || addr.is_abstract() {
		// Autobind and the abstract namespace need kernel support that
		// std::net does not expose.
		return Err(Errno::EOPNOTSUPP);
	}
	Ok(std::path::Path::new(std::ffi::OsStr::from_bytes(addr.path())))
}

#[cfg(unix)]
fn unix_addr_from_std(addr: &std::os::unix::net::SocketAddr) -> SockAddr {
	use std::os::unix::ffi::OsStrExt;
	match addr.as_pathname() {
		Some(path) => {
			UnixSockAddr::from_raw_bytes(path.as_os_str().as_bytes().to_vec()).into()
		}
		None => UnixSockAddr::unnamed().into(),
	}
}

fn wildcard(family: AddressFamily, port: u16) -> SockAddr {
	match family {
		AddressFamily::Inet6 => Inet6SockAddr::any(port).into(),
		_ => Inet4SockAddr::any(port).into(),
	}
}

fn loopback(family: AddressFamily, port: u16) -> SockAddr {
	match family {
		AddressFamily::Inet6 => Inet6SockAddr::loopback(port).into(),
		_ => Inet4SockAddr::loopback(port).into(),
	}
}

impl ListenSock {
	fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
		match self {
			ListenSock::Tcp(listener) => listener.set_nonblocking(nonblocking),
			#[cfg(unix)]
			ListenSock::Unix(listener) => listener.set_nonblocking(nonblocking),
		}
	}

	fn local_addr(&self) -> Result<SockAddr, Errno> {
		match self {
			ListenSock::Tcp(listener) => {
				Ok(SockAddr::from_std(listener.local_addr().map_err(map_io)?))
			}
			#[cfg(unix)]
			ListenSock::Unix(listener) => {
				Ok(unix_addr_from_std(&listener.local_addr().map_err(map_io)?))
			}
		}
	}

	fn accept(&self) -> std::io::Result<(StreamSock, SockAddr)> {
		match self {
			ListenSock::Tcp(listener) => {
				let (conn, peer) = listener.accept()?;
				Ok((StreamSock::Tcp(conn), SockAddr::from_std(peer)))
			}
			#[cfg(unix)]
			ListenSock::Unix(listener) => {
				let (conn, peer) = listener.accept()?;
				Ok((StreamSock::Unix(conn), unix_addr_from_std(&peer)))
			}
		}
	}
}

impl StreamSock {
	fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
		match self {
			StreamSock::Tcp(conn) => conn.set_nonblocking(nonblocking),
			#[cfg(unix)]
			StreamSock::Unix(conn) => conn.set_nonblocking(nonblocking),
		}
	}

	fn read(&self, buf: &mut [u8]) -> std::io::Result<usize> {
		match self {
			StreamSock::Tcp(conn) => (&mut &*conn).read(buf),
			#[cfg(unix)]
			StreamSock::Unix(conn) => (&mut &*conn).read(buf),
		}
	}

	fn write(&self, buf: &[u8]) -> std::io::Result<usize> {
		match self {
			StreamSock::Tcp(conn) => (&mut &*conn).write(buf),
			#[cfg(unix)]
			StreamSock::Unix(conn) => (&mut &*conn).write(buf),
		}
	}

	fn peek(&self, buf: &mut [u8]) -> std::io::Result<usize> {
		match self {
			StreamSock::Tcp(conn) => conn.peek(buf),
			#[cfg(unix)]
			StreamSock::Unix(conn) => conn.peek(buf),
		}
	}

	fn shutdown(&self, how: std::net::Shutdown) -> std::io::Result<()> {
		match self {
			StreamSock::Tcp(conn) => conn.shutdown(how),
			#[cfg(unix)]
			StreamSock::Unix(conn) => conn.shutdown(how),
		}
	}

	fn local_addr(&self) -> Result<SockAddr, Errno> {
		match self {
			StreamSock::Tcp(conn) => Ok(SockAddr::from_std(conn.local_addr().map_err(map_io)?)),
			#[cfg(unix)]
			StreamSock::Unix(conn) => Ok(unix_addr_from_std(&conn.local_addr().map_err(map_io)?)),
		}
	}

	fn peer_addr(&self) -> Result<SockAddr, Errno> {
		match self {
			StreamSock::Tcp(conn) => Ok(SockAddr::from_std(conn.peer_addr().map_err(map_io)?)),
			#[cfg(unix)]
			StreamSock::Unix(conn) => Ok(unix_addr_from_std(&conn.peer_addr().map_err(map_io)?)),
		}
	}

	fn set_nodelay(&self, nodelay: bool) -> std::io::Result<()> {
		match self {
			StreamSock::Tcp(conn) => conn.set_nodelay(nodelay),
			#[cfg(unix)]
			StreamSock::Unix(_) => Ok(()),
		}
	}

	fn nodelay(&self) -> bool {
		match self {
			StreamSock::Tcp(conn) => conn.nodelay().unwrap_or(false),
			#[cfg(unix)]
			StreamSock::Unix(_) => false,
		}
	}
}

impl DgramSock {
	fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
		match self {
			DgramSock::Udp(sock) => sock.set_nonblocking(nonblocking),
			#[cfg(unix)]
			DgramSock::Unix(sock) => sock.set_nonblocking(nonblocking),
		}
	}

	fn local_addr(&self) -> Result<SockAddr, Errno> {
		match self {
			DgramSock::Udp(sock) => Ok(SockAddr::from_std(sock.local_addr().map_err(map_io)?)),
			#[cfg(unix)]
			DgramSock::Unix(sock) => Ok(unix_addr_from_std(&sock.local_addr().map_err(map_io)?)),
		}
	}

	fn recv(&self, buf: &mut [u8], peek: bool) -> std::io::Result<usize> {
		match self {
			DgramSock::Udp(sock) => {
				if peek { sock.peek_from(buf).map(|(n, _)| n) } else { sock.recv_from(buf).map(|(n, _)| n) }
			}
			#[cfg(unix)]
			DgramSock::Unix(sock) => {
				if peek { sock.peek(buf) } else { sock.recv(buf) }
			}
		}
	}

	fn recv_from(&self, buf: &mut [u8], peek: bool) -> std::io::Result<(usize, SockAddr)> {
		match self {
			DgramSock::Udp(sock) => {
				let (n, from) = if peek { sock.peek_from(buf)? } else { sock.recv_from(buf)? };
				Ok((n, SockAddr::from_std(from)))
			}
			#[cfg(unix)]
			DgramSock::Unix(sock) => {
				let (n, from) =
					if peek { sock.peek_from(buf)? } else { sock.recv_from(buf)? };
				Ok((n, unix_addr_from_std(&from)))
			}
		}
	}

	fn send(&self, buf: &[u8]) -> std::io::Result<usize> {
		match self {
			DgramSock::Udp(sock) => sock.send(buf),
			#[cfg(unix)]
			DgramSock::Unix(sock) => sock.send(buf),
		}
	}

	fn send_to(&self, buf: &[u8], addr: &SockAddr) -> Result<usize, Errno> {
		match self {
			DgramSock::Udp(sock) => {
				let target = addr.to_std().ok_or(Errno::EAFNOSUPPORT)?;
				sock.send_to(buf, target).map_err(map_io)
			}
			#[cfg(unix)]
			DgramSock::Unix(sock) => {
				let un = addr.as_unix().ok_or(Errno::EAFNOSUPPORT)?;
				sock.send_to(buf, unix_fs_path(un)?).map_err(map_io)
			}
		}
	}

	fn set_broadcast(&self, broadcast: bool) -> std::io::Result<()> {
		match self {
			DgramSock::Udp(sock) => sock.set_broadcast(broadcast),
			#[cfg(unix)]
			DgramSock::Unix(_) => Ok(()),
		}
	}

	fn broadcast(&self) -> bool {
		match self {
			DgramSock::Udp(sock) => sock.broadcast().unwrap_or(false),
			#[cfg(unix)]
			DgramSock::Unix(_) => false,
		}
	}
}

/// Creates the underlying datagram socket the first time any operation
/// needs one, bound to the family wildcard with an ephemeral port.
fn materialize_dgram(family: AddressFamily, opts: PendingOpts) -> Result<DgramSock, Errno> {
	let sock = match family {
		AddressFamily::Inet => {
			DgramSock::Udp(UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(map_io)?)
		}
		AddressFamily::Inet6 => {
			DgramSock::Udp(UdpSocket::bind((Ipv6Addr::UNSPECIFIED, 0)).map_err(map_io)?)
		}
		#[cfg(unix)]
		AddressFamily::Unix => DgramSock::Unix(UnixDatagram::unbound().map_err(map_io)?),
		_ => return Err(Errno::EAFNOSUPPORT),
	};
	if opts.broadcast {
		sock.set_broadcast(true).map_err(map_io)?;
	}
	Ok(sock)
}

impl SocketBackend for EmulatedBackend {
	fn kind(&self) -> BackendKind {
		BackendKind::Emulated
	}

	fn capabilities(&self) -> Capabilities {
		Capabilities {
			sendto_on_connected: false,
			stream_local_bind_before_connect: false,
			abstract_unix_namespace: false,
			unix_sockets: cfg!(unix),
			reverse_lookup: false,
		}
	}

	fn socket(
		&self,
		family: AddressFamily,
		socktype: SocketType,
		protocol: i32,
	) -> Result<SockFd, Errno> {
		match family {
			AddressFamily::Inet | AddressFamily::Inet6 => {}
			AddressFamily::Unix if cfg!(unix) => {}
			_ => return Err(Errno::EAFNOSUPPORT),
		}
		let proto_ok = protocol == 0
			|| (family != AddressFamily::Unix
				&& match socktype {
					SocketType::Stream => protocol == consts::IPPROTO_TCP,
					SocketType::Dgram => protocol == consts::IPPROTO_UDP,
				});
		if !proto_ok {
			return Err(Errno::EPROTONOSUPPORT);
		}

		let fd = self.register(EmuSock {
			family,
			socktype,
			protocol,
			blocking: AtomicBool::new(true),
			state: Mutex::new(EmuState::Created { opts: PendingOpts::default() }),
		});
		log::debug!("emulated socket({family:?}, {socktype:?}, {protocol}) -> {}", fd.raw);
		Ok(fd)
	}

	fn bind(&self, fd: SockFd, addr: &SockAddr) -> Result<(), Errno> {
		let sock = self.get(fd)?;
		if addr.family() != sock.family {
			return Err(Errno::EAFNOSUPPORT);
		}
		let mut state = sock.state.lock().expect("socket state poisoned");
		let opts = match &*state {
			EmuState::Created { opts } => *opts,
			_ => return Err(Errno::EINVAL),
		};

		match sock.socktype {
			SocketType::Stream => {
				let (listener, requested_port) = match sock.family {
					AddressFamily::Inet | AddressFamily::Inet6 => {
						let std_addr = addr.to_std().ok_or(Errno::EINVAL)?;
						let listener = TcpListener::bind(std_addr).map_err(map_io)?;
						(ListenSock::Tcp(listener), Some(std_addr.port()))
					}
					#[cfg(unix)]
					AddressFamily::Unix => {
						let un = addr.as_unix().ok_or(Errno::EINVAL)?;
						let listener =
							UnixListener::bind(unix_fs_path(un)?).map_err(map_io)?;
						(ListenSock::Unix(listener), None)
					}
					_ => return Err(Errno::EAFNOSUPPORT),
				};
				*state = EmuState::StreamBound { listener, requested_port, opts };
			}
			SocketType::Dgram => {
				let dgram = match sock.family {
					AddressFamily::Inet | AddressFamily::Inet6 => {
						let std_addr = addr.to_std().ok_or(Errno::EINVAL)?;
						DgramSock::Udp(UdpSocket::bind(std_addr).map_err(map_io)?)
					}
					#[cfg(unix)]
					AddressFamily::Unix => {
						let un = addr.as_unix().ok_or(Errno::EINVAL)?;
						DgramSock::Unix(
							UnixDatagram::bind(unix_fs_path(un)?).map_err(map_io)?,
						)
					}
					_ => return Err(Errno::EAFNOSUPPORT),
				};
				if opts.broadcast {
					dgram.set_broadcast(true).map_err(map_io)?;
				}
				*state = EmuState::DgramOpen { sock: dgram, peer: None, opts };
			}
		}
		Ok(())
	}

	fn listen(&self, fd: SockFd, backlog: i32) -> Result<(), Errno> {
		let sock = self.get(fd)?;
		if sock.socktype == SocketType::Dgram {
			return Err(Errno::EOPNOTSUPP);
		}
		let mut state = sock.state.lock().expect("socket state poisoned");
		match &mut *state {
			EmuState::Created { .. } => {
				// listen without bind: the wildcard with an ephemeral port,
				// same as the kernel's autobind.
				let listener = match sock.family {
					AddressFamily::Inet => {
						TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(map_io)?
					}
					AddressFamily::Inet6 => {
						TcpListener::bind((Ipv6Addr::UNSPECIFIED, 0)).map_err(map_io)?
					}
					// Unix stream sockets need a pathname before listen.
					_ => return Err(Errno::EINVAL),
				};
				log::trace!("emulated listen({}) backlog {backlog} (fixed by std)", fd.raw);
				*state = EmuState::Listening {
					listener: ListenSock::Tcp(listener),
					pending: VecDeque::new(),
				};
				Ok(())
			}
			EmuState::StreamBound { .. } => {
				let old = std::mem::replace(&mut *state, EmuState::Created {
					opts: PendingOpts::default(),
				});
				let EmuState::StreamBound { listener, .. } = old else {
					unreachable!("state checked above");
				};
				log::trace!("emulated listen({}) backlog {backlog} (fixed by std)", fd.raw);
				*state = EmuState::Listening { listener, pending: VecDeque::new() };
				Ok(())
			}
			EmuState::Listening { .. } => Ok(()),
			EmuState::StreamConnected { .. } => Err(Errno::EINVAL),
			EmuState::DgramOpen { .. } => Err(Errno::EOPNOTSUPP),
		}
	}

	fn connect(&self, fd: SockFd, addr: &SockAddr) -> Result<(), Errno> {
		let sock = self.get(fd)?;
		if addr.family() != sock.family {
			return Err(Errno::EAFNOSUPPORT);
		}
		let mut state = sock.state.lock().expect("socket state poisoned");

		match sock.socktype {
			SocketType::Stream => {
				let opts = match &*state {
					EmuState::Created { opts } => *opts,
					EmuState::StreamBound { requested_port, opts, .. } => {
						// std::net cannot carry a bound local port into an
						// outgoing connection. Port 0 loses nothing (the OS
						// assigns at connect); anything else cannot be
						// honored — a documented capability gap.
						if *requested_port != Some(0) {
							return Err(Errno::EOPNOTSUPP);
						}
						*opts
					}
					EmuState::Listening { .. } => return Err(Errno::EINVAL),
					EmuState::StreamConnected { .. } => return Err(Errno::EISCONN),
					EmuState::DgramOpen { .. } => return Err(Errno::EINVAL),
				};
				let conn = match sock.family {
					AddressFamily::Inet | AddressFamily::Inet6 => {
						let std_addr = addr.to_std().ok_or(Errno::EINVAL)?;
						StreamSock::Tcp(TcpStream::connect(std_addr).map_err(map_io)?)
					}
					#[cfg(unix)]
					AddressFamily::Unix => {
						let un = addr.as_unix().ok_or(Errno::EINVAL)?;
						StreamSock::Unix(
							UnixStream::connect(unix_fs_path(un)?).map_err(map_io)?,
						)
					}
					_ => return Err(Errno::EAFNOSUPPORT),
				};
				if opts.nodelay {
					conn.set_nodelay(true).map_err(map_io)?;
				}
				*state = EmuState::StreamConnected {
					conn,
					read_shut: false,
					write_shut: false,
				};
				Ok(())
			}
			SocketType::Dgram => {
				// connect on a datagram socket records the default peer and
				// may be repeated to change it.
				ensure_dgram_open(sock.family, &mut *state)?;
				let EmuState::DgramOpen { sock: dgram, peer, .. } = &mut *state else {
					return Err(Errno::EINVAL);
				};
				match dgram {
					DgramSock::Udp(udp) => {
						let std_addr = addr.to_std().ok_or(Errno::EINVAL)?;
						udp.connect(std_addr).map_err(map_io)?;
					}
					#[cfg(unix)]
					DgramSock::Unix(un_sock) => {
						let un = addr.as_unix().ok_or(Errno::EINVAL)?;
						un_sock.connect(unix_fs_path(un)?).map_err(map_io)?;
					}
				}
				*peer = Some(addr.clone());
				Ok(())
			}
		}
	}

	fn accept(&self, fd: SockFd) -> Result<(SockFd, SockAddr), Errno> {
		let sock = self.get(fd)?;
		let blocking = sock.blocking();
		let mut state = sock.state.lock().expect("socket state poisoned");
		let EmuState::Listening { listener, pending } = &mut *state else {
			return Err(Errno::EINVAL);
		};

		let (conn, peer) = match pending.pop_front() {
			Some(queued) => queued,
			None => {
				listener.set_nonblocking(!blocking).map_err(map_io)?;
				listener.accept().map_err(|err| map_io(err))?
			}
		};
		// Accepted children start blocking regardless of the listener,
		// matching Linux non-inheritance.
		conn.set_nonblocking(false).map_err(map_io)?;

		let child = self.register(EmuSock {
			family: sock.family,
			socktype: SocketType::Stream,
			protocol: sock.protocol,
			blocking: AtomicBool::new(true),
			state: Mutex::new(EmuState::StreamConnected {
				conn,
				read_shut: false,
				write_shut: false,
			}),
		});
		log::debug!("emulated accept({}) -> {} from {peer}", fd.raw, child.raw);
		Ok((child, peer))
	}

	fn shutdown(&self, fd: SockFd, how: ShutdownHow) -> Result<(), Errno> {
		let sock = self.get(fd)?;
		let mut state = sock.state.lock().expect("socket state poisoned");
		let EmuState::StreamConnected { conn, read_shut, write_shut } = &mut *state else {
			return Err(Errno::ENOTCONN);
		};
		let std_how = match how {
			ShutdownHow::Read => std::net::Shutdown::Read,
			ShutdownHow::Write => std::net::Shutdown::Write,
			ShutdownHow::Both => std::net::Shutdown::Both,
		};
		conn.shutdown(std_how).map_err(map_io)?;
		match how {
			ShutdownHow::Read => *read_shut = true,
			ShutdownHow::Write => *write_shut = true,
			ShutdownHow::Both => {
				*read_shut = true;
				*write_shut = true;
			}
		}
		Ok(())
	}

	fn close(&self, fd: SockFd) -> Result<(), Errno> {
		log::debug!("emulated close({})", fd.raw);
		self.table
			.lock()
			.expect("fd table poisoned")
			.remove(&fd.raw)
			.map(|_| ())
			.ok_or(Errno::EBADF)
	}

	fn send(&self, fd: SockFd, buf: &[u8], flags: MsgFlags) -> Result<usize, Errno> {
		check_flags(flags, false)?;
		let sock = self.get(fd)?;
		let nonblocking = !sock.blocking() || flags.contains(MsgFlags::DONTWAIT);
		let state = sock.state.lock().expect("socket state poisoned");

		match &*state {
			EmuState::StreamConnected { conn, write_shut, .. } => {
				if *write_shut {
					return Err(Errno::EPIPE);
				}
				conn.set_nonblocking(nonblocking).map_err(map_io)?;
				conn.write(buf).map_err(map_io)
			}
			EmuState::DgramOpen { sock: dgram, peer: Some(_), .. } => {
				dgram.set_nonblocking(nonblocking).map_err(map_io)?;
				dgram.send(buf).map_err(map_io)
			}
			EmuState::DgramOpen { peer: None, .. } => Err(Errno::EDESTADDRREQ),
			EmuState::Created { .. } if sock.socktype == SocketType::Dgram => {
				Err(Errno::EDESTADDRREQ)
			}
			_ => Err(Errno::ENOTCONN),
		}
	}

	fn recv(&self, fd: SockFd, buf: &mut [u8], flags: MsgFlags) -> Result<usize, Errno> {
		check_flags(flags, true)?;
		let sock = self.get(fd)?;
		let nonblocking = !sock.blocking() || flags.contains(MsgFlags::DONTWAIT);
		let peek = flags.contains(MsgFlags::PEEK);
		let mut state = sock.state.lock().expect("socket state poisoned");

		match &mut *state {
			EmuState::StreamConnected { conn, read_shut, .. } => {
				if *read_shut {
					return Ok(0);
				}
				conn.set_nonblocking(nonblocking).map_err(map_io)?;
				if peek {
					conn.peek(buf).map_err(map_io)
				} else {
					conn.read(buf).map_err(map_io)
				}
			}
			EmuState::DgramOpen { sock: dgram, .. } => {
				dgram.set_nonblocking(nonblocking).map_err(map_io)?;
				dgram.recv(buf, peek).map_err(map_io)
			}
			state_ref @ EmuState::Created { .. } if sock.socktype == SocketType::Dgram => {
				let EmuState::Created { opts } = *state_ref else {
					unreachable!("pattern matched Created");
				};
				let dgram = materialize_dgram(sock.family, opts)?;
				dgram.set_nonblocking(nonblocking).map_err(map_io)?;
				let n = dgram.recv(buf, peek).map_err(map_io);
				*state_ref = EmuState::DgramOpen { sock: dgram, peer: None, opts };
				n
			}
			_ => Err(Errno::ENOTCONN),
		}
	}

	fn send_to(
		&self,
		fd: SockFd,
		buf: &[u8],
		flags: MsgFlags,
		addr: &SockAddr,
	) -> Result<usize, Errno> {
		check_flags(flags, false)?;
		let sock = self.get(fd)?;
		if sock.socktype == SocketType::Stream {
			let state = sock.state.lock().expect("socket state poisoned");
			return match &*state {
				EmuState::StreamConnected { .. } => Err(Errno::EISCONN),
				_ => Err(Errno::ENOTCONN),
			};
		}
		if addr.family() != sock.family {
			return Err(Errno::EAFNOSUPPORT);
		}
		let nonblocking = !sock.blocking() || flags.contains(MsgFlags::DONTWAIT);
		let mut state = sock.state.lock().expect("socket state poisoned");

		ensure_dgram_open(sock.family, &mut *state)?;
		match &*state {
			// Strict emulation policy: no ad-hoc redirection once a default
			// peer is recorded. See Capabilities::sendto_on_connected.
			EmuState::DgramOpen { peer: Some(_), .. } => Err(Errno::EISCONN),
			EmuState::DgramOpen { sock: dgram, peer: None, .. } => {
				dgram.set_nonblocking(nonblocking).map_err(map_io)?;
				dgram.send_to(buf, addr)
			}
			_ => Err(Errno::EINVAL),
		}
	}

	fn recv_from(
		&self,
		fd: SockFd,
		buf: &mut [u8],
		flags: MsgFlags,
	) -> Result<(usize, SockAddr), Errno> {
		check_flags(flags, true)?;
		let sock = self.get(fd)?;
		let nonblocking = !sock.blocking() || flags.contains(MsgFlags::DONTWAIT);
		let peek = flags.contains(MsgFlags::PEEK);
		let mut state = sock.state.lock().expect("socket state poisoned");

		match &mut *state {
			EmuState::StreamConnected { conn, read_shut, .. } => {
				let peer = conn.peer_addr()?;
				if *read_shut {
					return Ok((0, peer));
				}
				conn.set_nonblocking(nonblocking).map_err(map_io)?;
				let n = if peek {
					conn.peek(buf).map_err(map_io)?
				} else {
					conn.read(buf).map_err(map_io)?
				};
				Ok((n, peer))
			}
			EmuState::DgramOpen { sock: dgram, .. } => {
				dgram.set_nonblocking(nonblocking).map_err(map_io)?;
				dgram.recv_from(buf, peek).map_err(map_io)
			}
			state_ref @ EmuState::Created { .. } if sock.socktype == SocketType::Dgram => {
				let EmuState::Created { opts } = *state_ref else {
					unreachable!("pattern matched Created");
				};
				let dgram = materialize_dgram(sock.family, opts)?;
				dgram.set_nonblocking(nonblocking).map_err(map_io)?;
				let result = dgram.recv_from(buf, peek).map_err(map_io);
				*state_ref = EmuState::DgramOpen { sock: dgram, peer: None, opts };
				result
			}
			_ => Err(Errno::ENOTCONN),
		}
	}

	fn getsockname(&self, fd: SockFd) -> Result<SockAddr, Errno> {
		let sock = self.get(fd)?;
		let state = sock.state.lock().expect("socket state poisoned");
		match &*state {
			EmuState::Created { .. } => Ok(match sock.family {
				AddressFamily::Inet => Inet4SockAddr::any(0).into(),
				AddressFamily::Inet6 => Inet6SockAddr::any(0).into(),
				_ => UnixSockAddr::unnamed().into(),
			}),
			EmuState::StreamBound { listener, .. } => listener.local_addr(),
			EmuState::Listening { listener, .. } => listener.local_addr(),
			EmuState::StreamConnected { conn, .. } => conn.local_addr(),
			EmuState::DgramOpen { sock: dgram, .. } => dgram.local_addr(),
		}
	}

	fn getpeername(&self, fd: SockFd) -> Result<SockAddr, Errno> {
		let sock = self.get(fd)?;
		let state = sock.state.lock().expect("socket state poisoned");
		match &*state {
			EmuState::StreamConnected { conn, .. } => conn.peer_addr(),
			EmuState::DgramOpen { peer: Some(peer), .. } => Ok(peer.clone()),
			_ => Err(Errno::ENOTCONN),
		}
	}

	fn getsockopt(
		&self,
		fd: SockFd,
		level: i32,
		optname: i32,
		buf: &mut [u8],
	) -> Result<usize, Errno> {
		let sock = self.get(fd)?;
		if buf.len() != 4 {
			return Err(Errno::EINVAL);
		}
		let state = sock.state.lock().expect("socket state poisoned");

		let value: i32 = if level == consts::SOL_SOCKET {
			if optname == consts::SO_TYPE {
				sock.socktype.to_raw()
			} else if optname == consts::SO_ERROR {
				0
			} else if optname == consts::SO_REUSEADDR {
				i32::from(current_opts(&state).reuse_addr)
			} else if optname == consts::SO_BROADCAST {
				match &*state {
					EmuState::DgramOpen { sock: dgram, .. } => i32::from(dgram.broadcast()),
					_ => i32::from(current_opts(&state).broadcast),
				}
			} else if consts::SO_ACCEPTCONN == Some(optname) {
				i32::from(matches!(&*state, EmuState::Listening { .. }))
			} else if consts::SO_DOMAIN == Some(optname) {
				sock.family.to_raw()
			} else if consts::SO_PROTOCOL == Some(optname) {
				sock.protocol
			} else {
				return Err(Errno::ENOPROTOOPT);
			}
		} else if level == consts::IPPROTO_TCP && optname == consts::TCP_NODELAY {
			match &*state {
				EmuState::StreamConnected { conn, .. } => i32::from(conn.nodelay()),
				_ => i32::from(current_opts(&state).nodelay),
			}
		} else {
			return Err(Errno::ENOPROTOOPT);
		};

		buf.copy_from_slice(&value.to_ne_bytes());
		Ok(4)
	}

	fn setsockopt(&self, fd: SockFd, level: i32, optname: i32, buf: &[u8]) -> Result<(), Errno> {
		let sock = self.get(fd)?;
		if buf.len() != 4 {
			return Err(Errno::EINVAL);
		}
		let value = i32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]) != 0;
		let mut state = sock.state.lock().expect("socket state poisoned");

		if level == consts::SOL_SOCKET && optname == consts::SO_REUSEADDR {
			if let Some(opts) = current_opts_mut(&mut state) {
				opts.reuse_addr = value;
			}
			Ok(())
		} else if level == consts::SOL_SOCKET && optname == consts::SO_BROADCAST {
			match &mut *state {
				EmuState::DgramOpen { sock: dgram, opts, .. } => {
					opts.broadcast = value;
					dgram.set_broadcast(value).map_err(map_io)
				}
				_ => {
					if let Some(opts) = current_opts_mut(&mut state) {
						opts.broadcast = value;
					}
					Ok(())
				}
			}
		} else if level == consts::IPPROTO_TCP && optname == consts::TCP_NODELAY {
			match &mut *state {
				EmuState::StreamConnected { conn, .. } => {
					conn.set_nodelay(value).map_err(map_io)
				}
				_ => {
					if let Some(opts) = current_opts_mut(&mut state) {
						opts.nodelay = value;
					}
					Ok(())
				}
			}
		} else {
			Err(Errno::ENOPROTOOPT)
		}
	}

	fn set_blocking(&self, fd: SockFd, blocking: bool) -> Result<(), Errno> {
		let sock = self.get(fd)?;
		sock.blocking.store(blocking, Ordering::Relaxed);
		Ok(())
	}

	fn blocking(&self, fd: SockFd) -> Result<bool, Errno> {
		Ok(self.get(fd)?.blocking())
	}

	fn select(
		&self,
		read: &[SockFd],
		write: &[SockFd],
		error: &[SockFd],
		timeout: Option<Duration>,
	) -> Result<SelectResult, Errno> {
		let deadline = timeout.map(|t| Instant::now() + t);
		loop {
			let mut result = SelectResult::default();
			for fd in read {
				result.read.push(self.poll_readable(*fd)?);
			}
			for fd in write {
				result.write.push(self.poll_writable(*fd)?);
			}
			for fd in error {
				// Exceptional conditions (OOB data) are not modeled.
				self.get(*fd)?;
				result.error.push(false);
			}
			if result.any() {
				return Ok(result);
			}
			if let Some(deadline) = deadline {
				if Instant::now() >= deadline {
					return Ok(result);
				}
			}
			std::thread::sleep(Duration::from_millis(1));
		}
	}

	fn getaddrinfo(
		&self,
		node: Option<&str>,
		service: Option<&str>,
		hints: &AddrInfoHints,
	) -> Result<AddrInfoCursor, GaiError> {
		let (family, socktype) = resolve::precheck(node, service, hints)?;
		let port = emulated_service_port(service, socktype, hints.flags)?;
		let addrs = emulated_lookup(node, port, family, hints.flags)?;

		let socktypes: &[SocketType] = match socktype {
			Some(SocketType::Stream) => &[SocketType::Stream],
			Some(SocketType::Dgram) => &[SocketType::Dgram],
			None => &[SocketType::Stream, SocketType::Dgram],
		};

		let mut entries = Vec::new();
		let mut first = true;
		for addr in addrs {
			for &ty in socktypes {
				let protocol = match ty {
					SocketType::Stream => consts::IPPROTO_TCP,
					SocketType::Dgram => consts::IPPROTO_UDP,
				};
				if hints.protocol != 0 && hints.protocol != protocol {
					continue;
				}
				let canonname = if first && hints.flags.contains(AiFlags::CANONNAME) {
					node.map(str::to_owned)
				} else {
					None
				};
				first = false;
				entries.push(AddrInfoEntry {
					family: addr.family(),
					socktype: ty,
					protocol,
					canonname,
					addr: addr.clone(),
				});
			}
		}
		if entries.is_empty() {
			return Err(GaiError::NoName);
		}
		log::debug!("emulated getaddrinfo({node:?}, {service:?}) -> {} candidates", entries.len());
		Ok(AddrInfoCursor::from_entries(entries))
	}

	fn getnameinfo(&self, addr: &SockAddr, flags: NiFlags) -> Result<(String, String), GaiError> {
		let (host_numeric, port, is_loopback) = match addr.family() {
			AddressFamily::Inet => {
				let v4 = addr.as_inet4().ok_or(GaiError::Family)?;
				(
					std::net::Ipv4Addr::from(v4.octets()).to_string(),
					v4.port(),
					v4.addr() == consts::INADDR_LOOPBACK,
				)
			}
			AddressFamily::Inet6 => {
				let v6 = addr.as_inet6().ok_or(GaiError::Family)?;
				(
					std::net::Ipv6Addr::from(v6.addr()).to_string(),
					v6.port(),
					v6.addr() == consts::IN6ADDR_LOOPBACK,
				)
			}
			_ => return Err(GaiError::Family),
		};

		// The only reverse mapping a pure emulation can vouch for is
		// loopback; everything else is numeric or, under NI_NAMEREQD,
		// a resolution failure.
		let host = if flags.contains(NiFlags::NUMERICHOST) {
			host_numeric
		} else if is_loopback {
			"localhost".to_owned()
		} else if flags.contains(NiFlags::NAMEREQD) {
			return Err(GaiError::NoName);
		} else {
			host_numeric
		};

		let service = if flags.contains(NiFlags::NUMERICSERV) {
			port.to_string()
		} else {
			resolve::service_name(port, flags.contains(NiFlags::DGRAM))
				.map(str::to_owned)
				.unwrap_or_else(|| port.to_string())
		};

		Ok((host, service))
	}

	fn gethostname(&self) -> Result<String, Errno> {
		Ok(std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_owned()))
	}
}

fn current_opts(state: &EmuState) -> PendingOpts {
	match state {
		EmuState::Created { opts } => *opts,
		EmuState::StreamBound { opts, .. } => *opts,
		EmuState::DgramOpen { opts, .. } => *opts,
		_ => PendingOpts::default(),
	}
}

fn current_opts_mut(state: &mut EmuState) -> Option<&mut PendingOpts> {
	match state {
		EmuState::Created { opts } => Some(opts),
		EmuState::StreamBound { opts, .. } => Some(opts),
		EmuState::DgramOpen { opts, .. } => Some(opts),
		_ => None,
	}
}

impl EmulatedBackend {
	fn poll_readable(&self, fd: SockFd) -> Result<bool, Errno> {
		let sock = self.get(fd)?;
		let mut state = sock.state.lock().expect("socket state poisoned");
		let mut probe = [0u8; 1];
		Ok(match &mut *state {
			EmuState::Listening { listener, pending } => {
				if !pending.is_empty() {
					true
				} else if listener.set_nonblocking(true).is_err() {
					true
				} else {
					match listener.accept() {
						Ok(queued) => {
							// Readiness must not consume the connection;
							// park it for the next accept call.
							pending.push_back(queued);
							true
						}
						Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => false,
						Err(_) => true,
					}
				}
			}
			EmuState::StreamConnected { conn, read_shut, .. } => {
				if *read_shut {
					true
				} else if conn.set_nonblocking(true).is_err() {
					true
				} else {
					match conn.peek(&mut probe) {
						// 0 bytes is EOF, which select reports as readable.
						Ok(_) => true,
						Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => false,
						Err(_) => true,
					}
				}
			}
			EmuState::DgramOpen { sock: dgram, .. } => {
				if dgram.set_nonblocking(true).is_err() {
					true
				} else {
					match dgram.recv(&mut probe, true) {
						Ok(_) => true,
						Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => false,
						Err(_) => true,
					}
				}
			}
			EmuState::Created { .. } | EmuState::StreamBound { .. } => false,
		})
	}

	fn poll_writable(&self, fd: SockFd) -> Result<bool, Errno> {
		let sock = self.get(fd)?;
		let state = sock.state.lock().expect("socket state poisoned");
		Ok(match &*state {
			EmuState::StreamConnected { write_shut, .. } => !write_shut,
			EmuState::DgramOpen { .. } => true,
			EmuState::Created { .. } => sock.socktype == SocketType::Dgram,
			_ => false,
		})
	}
}

/// Resolves the service argument to a port number.
fn emulated_service_port(
	service: Option<&str>,
	socktype: Option<SocketType>,
	flags: AiFlags,
) -> Result<u16, GaiError> {
	let Some(text) = service else {
		return Ok(0);
	};
	if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
		return text.parse::<u16>().map_err(|_| GaiError::Service);
	}
	if flags.contains(AiFlags::NUMERICSERV) {
		return Err(GaiError::NoName);
	}
	resolve::service_port(text, socktype).ok_or(GaiError::Service)
}

/// Resolves the node argument to one or more addresses.
fn emulated_lookup(
	node: Option<&str>,
	port: u16,
	family: AddressFamily,
	flags: AiFlags,
) -> Result<Vec<SockAddr>, GaiError> {
	let families: &[AddressFamily] = match family {
		AddressFamily::Unspec => &[AddressFamily::Inet, AddressFamily::Inet6],
		AddressFamily::Inet => &[AddressFamily::Inet],
		_ => &[AddressFamily::Inet6],
	};

	let Some(text) = node else {
		// No node: the wildcard for passive (bind) use, loopback otherwise.
		let make = if flags.contains(AiFlags::PASSIVE) { wildcard } else { loopback };
		return Ok(families.iter().map(|&fam| make(fam, port)).collect());
	};

	if text.eq_ignore_ascii_case("localhost") {
		return Ok(families.iter().map(|&fam| loopback(fam, port)).collect());
	}

	if let Ok(octets) = conv::parse_ipv4_strict(text, conv::Ipv4Strictness::default()) {
		if family == AddressFamily::Inet6 {
			return Err(GaiError::AddrFamily);
		}
		return Ok(vec![Inet4SockAddr::from_octets(octets, port).into()]);
	}
	if let Ok(bytes) = conv::parse_ipv6(text) {
		if family == AddressFamily::Inet {
			return Err(GaiError::AddrFamily);
		}
		return Ok(vec![Inet6SockAddr::new(bytes, port).into()]);
	}
	if flags.contains(AiFlags::NUMERICHOST) {
		return Err(GaiError::NoName);
	}

	// Hostname lookup rides std's resolver; candidate order is whatever
	// the OS reports.
	let resolved: Vec<std::net::SocketAddr> = (text, port)
		.to_socket_addrs()
		.map_err(|_| GaiError::NoName)?
		.collect();
	if resolved.is_empty() {
		return Err(GaiError::NoName);
	}
	let mut addrs = Vec::new();
	for std_addr in resolved {
		let matches_family = match std_addr {
			std::net::SocketAddr::V4(_) => family != AddressFamily::Inet6,
			std::net::SocketAddr::V6(_) => family != AddressFamily::Inet,
		};
		if !matches_family {
			continue;
		}
		let addr = SockAddr::from_std(std_addr);
		if !addrs.contains(&addr) {
			addrs.push(addr);
		}
	}
	if addrs.is_empty() {
		// Names existed, just not in the requested family.
		return Err(GaiError::AddrFamily);
	}
	Ok(addrs)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn stream_socket(backend: &EmulatedBackend) -> SockFd {
		backend
			.socket(AddressFamily::Inet, SocketType::Stream, 0)
			.expect("socket")
	}

	#[test]
	fn state_machine_rejections() {
		let backend = EmulatedBackend::new();

		let dgram = backend
			.socket(AddressFamily::Inet, SocketType::Dgram, 0)
			.unwrap();
		assert_eq!(backend.listen(dgram, 16), Err(Errno::EOPNOTSUPP));

		let stream = stream_socket(&backend);
		assert_eq!(backend.getpeername(stream), Err(Errno::ENOTCONN));
		let mut buf = [0u8; 4];
		assert_eq!(
			backend.recv(stream, &mut buf, MsgFlags::empty()),
			Err(Errno::ENOTCONN)
		);
		assert_eq!(
			backend.send(stream, b"x", MsgFlags::empty()),
			Err(Errno::ENOTCONN)
		);

		backend.close(stream).unwrap();
		backend.close(dgram).unwrap();
	}

	#[test]
	fn double_bind_is_einval() {
		let backend = EmulatedBackend::new();
		let fd = stream_socket(&backend);
		let addr: SockAddr = Inet4SockAddr::loopback(0).into();
		backend.bind(fd, &addr).unwrap();
		assert_eq!(backend.bind(fd, &addr), Err(Errno::EINVAL));
		backend.close(fd).unwrap();
	}

	#[test]
	fn bad_fd_is_ebadf() {
		let backend = EmulatedBackend::new();
		let bogus = SockFd { raw: 42, family: AddressFamily::Inet };
		assert_eq!(backend.getsockname(bogus), Err(Errno::EBADF));
		assert_eq!(backend.close(bogus), Err(Errno::EBADF));
	}

	#[test]
	fn ephemeral_port_visible_after_bind() {
		let backend = EmulatedBackend::new();
		let fd = stream_socket(&backend);
		backend.bind(fd, &Inet4SockAddr::loopback(0).into()).unwrap();
		let local = backend.getsockname(fd).unwrap();
		assert_ne!(local.as_inet4().unwrap().port(), 0);
		backend.close(fd).unwrap();
	}

	#[test]
	fn getsockopt_surface() {
		let backend = EmulatedBackend::new();
		let fd = stream_socket(&backend);
		let mut buf = [0u8; 4];

		backend
			.getsockopt(fd, consts::SOL_SOCKET, consts::SO_TYPE, &mut buf)
			.unwrap();
		assert_eq!(i32::from_ne_bytes(buf), SocketType::Stream.to_raw());

		let mut short = [0u8; 2];
		assert_eq!(
			backend.getsockopt(fd, consts::SOL_SOCKET, consts::SO_TYPE, &mut short),
			Err(Errno::EINVAL)
		);
		assert_eq!(
			backend.getsockopt(fd, consts::SOL_SOCKET, 0x7fff, &mut buf),
			Err(Errno::ENOPROTOOPT)
		);

		if let Some(acceptconn) = consts::SO_ACCEPTCONN {
			backend
				.getsockopt(fd, consts::SOL_SOCKET, acceptconn, &mut buf)
				.unwrap();
			assert_eq!(i32::from_ne_bytes(buf), 0);
			backend.listen(fd, 8).unwrap();
			backend
				.getsockopt(fd, consts::SOL_SOCKET, acceptconn, &mut buf)
				.unwrap();
			assert_eq!(i32::from_ne_bytes(buf), 1);
		}
		backend.close(fd).unwrap();
	}

	#[test]
	fn service_resolution() {
		assert_eq!(
			emulated_service_port(Some("443"), None, AiFlags::empty()),
			Ok(443)
		);
		assert_eq!(
			emulated_service_port(Some("https"), Some(SocketType::Stream), AiFlags::empty()),
			Ok(443)
		);
		assert_eq!(
			emulated_service_port(Some("no-such-svc"), None, AiFlags::empty()),
			Err(GaiError::Service)
		);
		assert_eq!(
			emulated_service_port(Some("https"), None, AiFlags::NUMERICSERV),
			Err(GaiError::NoName)
		);
		assert_eq!(
			emulated_service_port(Some("99999"), None, AiFlags::empty()),
			Err(GaiError::Service)
		);
	}

	#[test]
	fn numeric_lookup_checks_family() {
		assert_eq!(
			emulated_lookup(Some("1.2.3.4"), 0, AddressFamily::Inet6, AiFlags::empty()),
			Err(GaiError::AddrFamily)
		);
		assert_eq!(
			emulated_lookup(Some("::1"), 0, AddressFamily::Inet, AiFlags::empty()),
			Err(GaiError::AddrFamily)
		);
		let addrs =
			emulated_lookup(Some("1.2.3.4"), 80, AddressFamily::Unspec, AiFlags::empty())
				.unwrap();
		assert_eq!(addrs.len(), 1);
		assert_eq!(addrs[0].as_inet4().unwrap().octets(), [1, 2, 3, 4]);
	}

	#[test]
	fn passive_lookup_yields_wildcard() {
		let addrs =
			emulated_lookup(None, 7, AddressFamily::Inet, AiFlags::PASSIVE).unwrap();
		assert_eq!(addrs[0].as_inet4().unwrap().addr(), consts::INADDR_ANY);

		let addrs = emulated_lookup(None, 7, AddressFamily::Inet, AiFlags::empty()).unwrap();
		assert_eq!(addrs[0].as_inet4().unwrap().addr(), consts::INADDR_LOOPBACK);
	}
}
