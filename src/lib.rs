//! One POSIX sockets API, two interchangeable backends: real syscalls
//! (`native`, unix only) or a pure-`std::net` emulation (`emulated`).
//! Pick a backend once with [`BackendKind::detect`] and drive everything
//! through the [`SocketBackend`] trait; both raise the same error codes
//! for the same observable conditions.

#![cfg_attr(unix, feature(unix_socket_peek))]

pub mod addr;
pub mod backend;
pub mod consts;
pub mod conv;
mod error;
pub mod resolve;

pub use self::addr::{Inet4SockAddr, Inet6SockAddr, SUN_PATH_LEN, SockAddr, UnixSockAddr};
#[cfg(unix)]
pub use self::backend::NativeBackend;
pub use self::backend::{
	BackendKind, Capabilities, EmulatedBackend, OwnedSock, SelectResult, SockFd, SocketBackend,
	backend,
};
pub use self::consts::{AddressFamily, AiFlags, MsgFlags, NiFlags, ShutdownHow, SocketType};
pub use self::conv::{
	Ipv4Strictness, inet_addr, inet_aton, inet_ntoa, inet_ntop, inet_pton, inet_pton_with,
};
#[cfg(unix)]
pub use self::error::errno;
pub use self::error::{AddrError, ConvError, Errno, GaiError};
pub use self::resolve::{AddrInfoCursor, AddrInfoEntry, AddrInfoHints};
