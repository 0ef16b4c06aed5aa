use crate::consts::AddressFamily;

/// POSIX-style error codes surfaced by socket operations.
///
/// Both backends raise the same codes for the same observable conditions.
/// Codes outside the closed set are carried through as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Errno {
	#[error("permission denied")]
	EACCES,
	#[error("address already in use")]
	EADDRINUSE,
	#[error("address not available")]
	EADDRNOTAVAIL,
	#[error("address family not supported")]
	EAFNOSUPPORT,
	#[error("bad file descriptor")]
	EBADF,
	#[error("connection aborted")]
	ECONNABORTED,
	#[error("connection refused")]
	ECONNREFUSED,
	#[error("connection reset by peer")]
	ECONNRESET,
	#[error("destination address required")]
	EDESTADDRREQ,
	#[error("host unreachable")]
	EHOSTUNREACH,
	#[error("operation in progress")]
	EINPROGRESS,
	#[error("interrupted by signal")]
	EINTR,
	#[error("invalid argument")]
	EINVAL,
	#[error("socket is already connected")]
	EISCONN,
	#[error("too many open files")]
	EMFILE,
	#[error("network unreachable")]
	ENETUNREACH,
	#[error("no buffer space available")]
	ENOBUFS,
	#[error("protocol option not available")]
	ENOPROTOOPT,
	#[error("not connected")]
	ENOTCONN,
	#[error("not a socket")]
	ENOTSOCK,
	#[error("operation not supported")]
	EOPNOTSUPP,
	#[error("broken pipe")]
	EPIPE,
	#[error("protocol not supported")]
	EPROTONOSUPPORT,
	#[error("connection timed out")]
	ETIMEDOUT,
	#[error("operation would block")]
	EWOULDBLOCK,
	#[error("errno {0}")]
	Other(i32),
}

/// Raw error numbers for the closed set.
///
/// On unix these come straight from libc; elsewhere the emulated backend
/// reports Linux-equivalent numbers.
mod codes {
	#[cfg(unix)]
	pub use libc::{
		EACCES, EADDRINUSE, EADDRNOTAVAIL, EAFNOSUPPORT, EAGAIN, EBADF, ECONNABORTED,
		ECONNREFUSED, ECONNRESET, EDESTADDRREQ, EHOSTUNREACH, EINPROGRESS, EINTR, EINVAL,
		EISCONN, EMFILE, ENETUNREACH, ENOBUFS, ENOPROTOOPT, ENOTCONN, ENOTSOCK, EOPNOTSUPP,
		EPIPE, EPROTONOSUPPORT, ETIMEDOUT, EWOULDBLOCK,
	};

	#[cfg(not(unix))]
	mod fallback {
		pub const EACCES: i32 = 13;
		pub const EADDRINUSE: i32 = 98;
		pub const EADDRNOTAVAIL: i32 = 99;
		pub const EAFNOSUPPORT: i32 = 97;
		pub const EAGAIN: i32 = 11;
		pub const EBADF: i32 = 9;
		pub const ECONNABORTED: i32 = 103;
		pub const ECONNREFUSED: i32 = 111;
		pub const ECONNRESET: i32 = 104;
		pub const EDESTADDRREQ: i32 = 89;
		pub const EHOSTUNREACH: i32 = 113;
		pub const EINPROGRESS: i32 = 115;
		pub const EINTR: i32 = 4;
		pub const EINVAL: i32 = 22;
		pub const EISCONN: i32 = 106;
		pub const EMFILE: i32 = 24;
		pub const ENETUNREACH: i32 = 101;
		pub const ENOBUFS: i32 = 105;
		pub const ENOPROTOOPT: i32 = 92;
		pub const ENOTCONN: i32 = 107;
		pub const ENOTSOCK: i32 = 88;
		pub const EOPNOTSUPP: i32 = 95;
		pub const EPIPE: i32 = 32;
		pub const EPROTONOSUPPORT: i32 = 93;
		pub const ETIMEDOUT: i32 = 110;
		pub const EWOULDBLOCK: i32 = 11;
	}
	#[cfg(not(unix))]
	pub use fallback::*;
}

impl Errno {
	/// Maps a raw error number into the closed set.
	///
	/// EAGAIN and EWOULDBLOCK collapse into `EWOULDBLOCK`.
	pub fn from_raw(raw: i32) -> Self {
		use Errno::*;
		if raw == codes::EWOULDBLOCK || raw == codes::EAGAIN {
			return EWOULDBLOCK;
		}
		match raw {
			codes::EACCES => EACCES,
			codes::EADDRINUSE => EADDRINUSE,
			codes::EADDRNOTAVAIL => EADDRNOTAVAIL,
			codes::EAFNOSUPPORT => EAFNOSUPPORT,
			codes::EBADF => EBADF,
			codes::ECONNABORTED => ECONNABORTED,
			codes::ECONNREFUSED => ECONNREFUSED,
			codes::ECONNRESET => ECONNRESET,
			codes::EDESTADDRREQ => EDESTADDRREQ,
			codes::EHOSTUNREACH => EHOSTUNREACH,
			codes::EINPROGRESS => EINPROGRESS,
			codes::EINTR => EINTR,
			codes::EINVAL => EINVAL,
			codes::EISCONN => EISCONN,
			codes::EMFILE => EMFILE,
			codes::ENETUNREACH => ENETUNREACH,
			codes::ENOBUFS => ENOBUFS,
			codes::ENOPROTOOPT => ENOPROTOOPT,
			codes::ENOTCONN => ENOTCONN,
			codes::ENOTSOCK => ENOTSOCK,
			codes::EOPNOTSUPP => EOPNOTSUPP,
			codes::EPIPE => EPIPE,
			codes::EPROTONOSUPPORT => EPROTONOSUPPORT,
			codes::ETIMEDOUT => ETIMEDOUT,
			_ => Other(raw),
		}
	}

	/// Returns the platform error number for this code.
	pub fn to_raw(self) -> i32 {
		use Errno::*;
		match self {
			EACCES => codes::EACCES,
			EADDRINUSE => codes::EADDRINUSE,
			EADDRNOTAVAIL => codes::EADDRNOTAVAIL,
			EAFNOSUPPORT => codes::EAFNOSUPPORT,
			EBADF => codes::EBADF,
			ECONNABORTED => codes::ECONNABORTED,
			ECONNREFUSED => codes::ECONNREFUSED,
			ECONNRESET => codes::ECONNRESET,
			EDESTADDRREQ => codes::EDESTADDRREQ,
			EHOSTUNREACH => codes::EHOSTUNREACH,
			EINPROGRESS => codes::EINPROGRESS,
			EINTR => codes::EINTR,
			EINVAL => codes::EINVAL,
			EISCONN => codes::EISCONN,
			EMFILE => codes::EMFILE,
			ENETUNREACH => codes::ENETUNREACH,
			ENOBUFS => codes::ENOBUFS,
			ENOPROTOOPT => codes::ENOPROTOOPT,
			ENOTCONN => codes::ENOTCONN,
			ENOTSOCK => codes::ENOTSOCK,
			EOPNOTSUPP => codes::EOPNOTSUPP,
			EPIPE => codes::EPIPE,
			EPROTONOSUPPORT => codes::EPROTONOSUPPORT,
			ETIMEDOUT => codes::ETIMEDOUT,
			EWOULDBLOCK => codes::EWOULDBLOCK,
			Other(raw) => raw,
		}
	}

	/// Reads the current thread's errno.
	#[cfg(unix)]
	pub fn last() -> Self {
		Self::from_raw(errno())
	}

	/// Derives a code from a `std::io::Error`.
	///
	/// Prefers the raw OS error number; falls back to the error kind for
	/// synthetic errors produced by std itself.
	pub fn from_io(err: &std::io::Error) -> Self {
		if let Some(raw) = err.raw_os_error() {
			return Self::from_raw(raw);
		}
		use std::io::ErrorKind;
		match err.kind() {
			ErrorKind::PermissionDenied => Errno::EACCES,
			ErrorKind::AddrInUse => Errno::EADDRINUSE,
			ErrorKind::AddrNotAvailable => Errno::EADDRNOTAVAIL,
			ErrorKind::WouldBlock => Errno::EWOULDBLOCK,
			ErrorKind::ConnectionAborted => Errno::ECONNABORTED,
			ErrorKind::ConnectionRefused => Errno::ECONNREFUSED,
			ErrorKind::ConnectionReset => Errno::ECONNRESET,
			ErrorKind::Interrupted => Errno::EINTR,
			ErrorKind::InvalidInput => Errno::EINVAL,
			ErrorKind::NotConnected => Errno::ENOTCONN,
			ErrorKind::BrokenPipe => Errno::EPIPE,
			ErrorKind::TimedOut => Errno::ETIMEDOUT,
			_ => Errno::Other(0),
		}
	}
}

/// Maps a code to std::io::ErrorKind.
fn errno_to_kind(code: Errno) -> std::io::ErrorKind {
	use std::io::ErrorKind;
	match code {
		Errno::EACCES => ErrorKind::PermissionDenied,
		Errno::EADDRINUSE => ErrorKind::AddrInUse,
		Errno::EADDRNOTAVAIL => ErrorKind::AddrNotAvailable,
		Errno::EWOULDBLOCK => ErrorKind::WouldBlock,
		Errno::ECONNABORTED => ErrorKind::ConnectionAborted,
		Errno::ECONNREFUSED => ErrorKind::ConnectionRefused,
		Errno::ECONNRESET => ErrorKind::ConnectionReset,
		Errno::EINTR => ErrorKind::Interrupted,
		Errno::EINVAL => ErrorKind::InvalidInput,
		Errno::ENOTCONN => ErrorKind::NotConnected,
		Errno::EPIPE => ErrorKind::BrokenPipe,
		Errno::ETIMEDOUT => ErrorKind::TimedOut,
		_ => ErrorKind::Other,
	}
}

impl From<Errno> for std::io::Error {
	fn from(code: Errno) -> Self {
		std::io::Error::new(errno_to_kind(code), code)
	}
}

/// Returns current errno value.
#[cfg(any(target_os = "linux", target_os = "android"))]
#[inline]
pub fn errno() -> i32 {
	unsafe { *libc::__errno_location() }
}

/// Returns current errno value.
#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
#[inline]
pub fn errno() -> i32 {
	unsafe { *libc::__error() }
}

/// Returns current errno value.
#[cfg(all(
	unix,
	not(any(
		target_os = "linux",
		target_os = "android",
		target_os = "macos",
		target_os = "ios",
		target_os = "freebsd"
	))
))]
#[inline]
pub fn errno() -> i32 {
	std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Name/address resolution failures (getaddrinfo/getnameinfo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GaiError {
	#[error("address family for nodename not supported")]
	AddrFamily,
	#[error("temporary failure in name resolution")]
	Again,
	#[error("bad value for ai_flags")]
	BadFlags,
	#[error("non-recoverable failure in name resolution")]
	Fail,
	#[error("ai_family not supported")]
	Family,
	#[error("memory allocation failure")]
	Memory,
	#[error("name or service not known")]
	NoName,
	#[error("argument buffer overflow")]
	Overflow,
	#[error("servname not supported for ai_socktype")]
	Service,
	#[error("ai_socktype not supported")]
	SockType,
	#[error("system error in name resolution: {0}")]
	System(Errno),
}

// glibc hides EAI_ADDRFAMILY/EAI_NODATA behind _GNU_SOURCE; the numeric
// values are stable per platform.
#[cfg(any(target_os = "linux", target_os = "android"))]
const EAI_ADDRFAMILY_RAW: i32 = -9;
#[cfg(any(target_os = "linux", target_os = "android"))]
const EAI_NODATA_RAW: i32 = -5;
#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
const EAI_ADDRFAMILY_RAW: i32 = 1;
#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
const EAI_NODATA_RAW: i32 = 7;

#[cfg(any(
	target_os = "linux",
	target_os = "android",
	target_os = "macos",
	target_os = "ios",
	target_os = "freebsd"
))]
impl GaiError {
	/// Maps a nonzero getaddrinfo/getnameinfo return code.
	///
	/// EAI_NODATA folds into `NoName` the way modern resolvers report it.
	pub(crate) fn from_raw(raw: i32) -> Self {
		match raw {
			EAI_ADDRFAMILY_RAW => GaiError::AddrFamily,
			EAI_NODATA_RAW => GaiError::NoName,
			libc::EAI_AGAIN => GaiError::Again,
			libc::EAI_BADFLAGS => GaiError::BadFlags,
			libc::EAI_FAIL => GaiError::Fail,
			libc::EAI_FAMILY => GaiError::Family,
			libc::EAI_MEMORY => GaiError::Memory,
			libc::EAI_NONAME => GaiError::NoName,
			libc::EAI_SERVICE => GaiError::Service,
			libc::EAI_SOCKTYPE => GaiError::SockType,
			libc::EAI_SYSTEM => GaiError::System(Errno::last()),
			_ => GaiError::Fail,
		}
	}
}

/// Caller-input failures detected before any syscall.
///
/// Kept apart from [`Errno`]: these have no POSIX number because no
/// OS call ever happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddrError {
	#[error("invalid address: {reason}")]
	InvalidAddress { reason: &'static str },

	#[error("invalid unix socket path: {reason}")]
	InvalidUnixPath { reason: &'static str },

	#[error("wrong address length: expected {expected}, got {got}")]
	WrongLength { expected: usize, got: usize },

	#[error("address family mismatch: expected {expected:?}, got {actual:?}")]
	FamilyMismatch {
		expected: AddressFamily,
		actual: AddressFamily,
	},
}

/// Errors from the inet text/binary conversion functions.
///
/// Syntax problems stay in the input-validation category; an unsupported
/// family is the one errno-carrying case (EAFNOSUPPORT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConvError {
	#[error(transparent)]
	Syntax(#[from] AddrError),
	#[error("{0}")]
	Family(Errno),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn raw_round_trip() {
		for code in [
			Errno::EINVAL,
			Errno::ENOTCONN,
			Errno::EISCONN,
			Errno::EOPNOTSUPP,
			Errno::EWOULDBLOCK,
			Errno::EDESTADDRREQ,
		] {
			assert_eq!(Errno::from_raw(code.to_raw()), code);
		}
	}

	#[test]
	fn eagain_collapses() {
		#[cfg(unix)]
		assert_eq!(Errno::from_raw(libc::EAGAIN), Errno::EWOULDBLOCK);
	}

	#[test]
	fn unknown_code_is_carried() {
		assert_eq!(Errno::from_raw(9999), Errno::Other(9999));
		assert_eq!(Errno::Other(9999).to_raw(), 9999);
	}

	#[test]
	fn io_error_mapping() {
		let err = std::io::Error::from(std::io::ErrorKind::WouldBlock);
		assert_eq!(Errno::from_io(&err), Errno::EWOULDBLOCK);
		let err = std::io::Error::from(std::io::ErrorKind::NotConnected);
		assert_eq!(Errno::from_io(&err), Errno::ENOTCONN);
	}
}
