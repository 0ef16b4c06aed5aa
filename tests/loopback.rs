//! End-to-end socket behavior over loopback, run against every backend
//! available on the host. The point of the suite is the dual-backend
//! contract: the same calls produce the same observable results whether a
//! kernel or the std emulation is underneath.

use std::time::{Duration, Instant};

use socklane::{
	AddressFamily, EmulatedBackend, Errno, Inet4SockAddr, MsgFlags, OwnedSock, ShutdownHow,
	SockAddr, SockFd, SocketBackend, SocketType,
};

fn backends() -> Vec<Box<dyn SocketBackend>> {
	let mut all: Vec<Box<dyn SocketBackend>> = vec![Box::new(EmulatedBackend::new())];
	#[cfg(unix)]
	all.push(Box::new(socklane::NativeBackend::new()));
	all
}

/// Retries an operation until it stops reporting EWOULDBLOCK.
fn retry<T>(mut op: impl FnMut() -> Result<T, Errno>) -> Result<T, Errno> {
	let deadline = Instant::now() + Duration::from_secs(5);
	loop {
		match op() {
			Err(Errno::EWOULDBLOCK) if Instant::now() < deadline => {
				std::thread::sleep(Duration::from_millis(5));
			}
			other => return other,
		}
	}
}

fn bind_ephemeral(backend: &dyn SocketBackend, socktype: SocketType) -> (SockFd, SockAddr) {
	let fd = backend
		.socket(AddressFamily::Inet, socktype, 0)
		.expect("socket");
	backend
		.bind(fd, &Inet4SockAddr::loopback(0).into())
		.expect("bind");
	let local = backend.getsockname(fd).expect("getsockname");
	(fd, local)
}

#[test]
fn bind_port_zero_assigns_ephemeral_port() {
	for backend in backends() {
		for socktype in [SocketType::Stream, SocketType::Dgram] {
			let (fd, local) = bind_ephemeral(backend.as_ref(), socktype);
			let port = local.as_inet4().expect("inet4 local address").port();
			assert_ne!(port, 0, "{:?} backend, {socktype:?}", backend.kind());
			backend.close(fd).unwrap();
		}
	}
}

#[test]
fn second_bind_is_rejected() {
	for backend in backends() {
		let (fd, _) = bind_ephemeral(backend.as_ref(), SocketType::Stream);
		let again: SockAddr = Inet4SockAddr::loopback(0).into();
		assert_eq!(
			backend.bind(fd, &again),
			Err(Errno::EINVAL),
			"{:?} backend",
			backend.kind()
		);
		backend.close(fd).unwrap();
	}
}

#[test]
fn listen_on_datagram_is_eopnotsupp() {
	for backend in backends() {
		let fd = backend
			.socket(AddressFamily::Inet, SocketType::Dgram, 0)
			.unwrap();
		assert_eq!(
			backend.listen(fd, 16),
			Err(Errno::EOPNOTSUPP),
			"{:?} backend",
			backend.kind()
		);
		backend.close(fd).unwrap();
	}
}

#[test]
fn stream_io_before_connect_is_not_connected() {
	for backend in backends() {
		let kind = backend.kind();
		let fd = backend
			.socket(AddressFamily::Inet, SocketType::Stream, 0)
			.unwrap();

		assert_eq!(backend.getpeername(fd), Err(Errno::ENOTCONN), "{kind:?} backend");

		let mut buf = [0u8; 8];
		assert_eq!(
			backend.recv(fd, &mut buf, MsgFlags::empty()),
			Err(Errno::ENOTCONN),
			"{kind:?} backend"
		);
		// Kernels disagree on the code for an unconnected send.
		let sent = backend.send(fd, b"x", MsgFlags::empty());
		assert!(
			matches!(sent, Err(Errno::ENOTCONN) | Err(Errno::EPIPE)),
			"{kind:?} backend returned {sent:?}"
		);
		backend.close(fd).unwrap();
	}
}

#[test]
fn connect_on_listening_socket_is_rejected() {
	for backend in backends() {
		let (fd, local) = bind_ephemeral(backend.as_ref(), SocketType::Stream);
		backend.listen(fd, 16).unwrap();
		let result = backend.connect(fd, &local);
		assert!(
			matches!(
				result,
				Err(Errno::EINVAL) | Err(Errno::EOPNOTSUPP) | Err(Errno::EISCONN)
			),
			"{:?} backend returned {result:?}",
			backend.kind()
		);
		backend.close(fd).unwrap();
	}
}

#[test]
fn tcp_accept_exchanges_data_with_symmetric_peers() {
	for backend in backends() {
		let kind = backend.kind();
		let (listener, server_addr) = bind_ephemeral(backend.as_ref(), SocketType::Stream);
		backend.listen(listener, 16).unwrap();

		let backend = backend.as_ref();
		let connect_to = server_addr.clone();
		std::thread::scope(|scope| {
			let client_side = scope.spawn(move || {
				let client = backend
					.socket(AddressFamily::Inet, SocketType::Stream, 0)
					.unwrap();
				backend.connect(client, &connect_to).unwrap();
				let local = backend.getsockname(client).unwrap();

				assert_eq!(backend.getpeername(client).unwrap(), connect_to);
				assert_eq!(
					backend.send(client, b"hello from client", MsgFlags::empty()),
					Ok(17)
				);

				let mut buf = [0u8; 32];
				let n = backend.recv(client, &mut buf, MsgFlags::empty()).unwrap();
				assert_eq!(&buf[..n], b"hello from server");
				backend.close(client).unwrap();
				local
			});

			let (child, peer) = backend.accept(listener).unwrap();
			assert_eq!(backend.getsockname(child).unwrap(), server_addr, "{kind:?} backend");
			assert_eq!(backend.getpeername(child).unwrap(), peer, "{kind:?} backend");

			let mut buf = [0u8; 32];
			let n = backend.recv(child, &mut buf, MsgFlags::empty()).unwrap();
			assert_eq!(&buf[..n], b"hello from client", "{kind:?} backend");
			assert_eq!(
				backend.send(child, b"hello from server", MsgFlags::empty()),
				Ok(17)
			);

			let client_local = client_side.join().expect("client thread");
			assert_eq!(peer, client_local, "{kind:?} backend");

			backend.close(child).unwrap();
		});
		backend.close(listener).unwrap();
	}
}

#[test]
fn shutdown_read_half_still_sends() {
	for backend in backends() {
		let kind = backend.kind();
		let (listener, server_addr) = bind_ephemeral(backend.as_ref(), SocketType::Stream);
		backend.listen(listener, 16).unwrap();

		let backend = backend.as_ref();
		std::thread::scope(|scope| {
			let client_side = scope.spawn(move || {
				let client = backend
					.socket(AddressFamily::Inet, SocketType::Stream, 0)
					.unwrap();
				backend.connect(client, &server_addr).unwrap();
				let mut buf = [0u8; 16];
				let n = backend.recv(client, &mut buf, MsgFlags::empty()).unwrap();
				assert_eq!(&buf[..n], b"still open", "{kind:?} backend");
				backend.close(client).unwrap();
			});

			let (child, _) = backend.accept(listener).unwrap();
			backend.shutdown(child, ShutdownHow::Read).unwrap();

			// The read half reports end-of-stream, not an error.
			let mut buf = [0u8; 16];
			assert_eq!(
				backend.recv(child, &mut buf, MsgFlags::empty()),
				Ok(0),
				"{kind:?} backend"
			);
			// The write half is untouched.
			assert_eq!(
				backend.send(child, b"still open", MsgFlags::empty()),
				Ok(10),
				"{kind:?} backend"
			);

			client_side.join().expect("client thread");
			backend.close(child).unwrap();
		});
		backend.close(listener).unwrap();
	}
}

#[test]
fn nonblocking_accept_fails_then_succeeds() {
	for backend in backends() {
		let kind = backend.kind();
		let (listener, server_addr) = bind_ephemeral(backend.as_ref(), SocketType::Stream);
		backend.listen(listener, 16).unwrap();
		backend.set_blocking(listener, false).unwrap();
		assert!(!backend.blocking(listener).unwrap());

		assert_eq!(
			backend.accept(listener).err(),
			Some(Errno::EWOULDBLOCK),
			"{kind:?} backend"
		);

		// The handshake completes in the kernel backlog, no accept needed.
		let client = backend
			.socket(AddressFamily::Inet, SocketType::Stream, 0)
			.unwrap();
		backend.connect(client, &server_addr).unwrap();

		let (child, _) = retry(|| backend.accept(listener)).expect("accept after connect");

		backend.close(child).unwrap();
		backend.close(client).unwrap();
		backend.close(listener).unwrap();
	}
}

#[test]
fn nonblocking_recv_fails_then_sees_data() {
	for backend in backends() {
		let kind = backend.kind();
		let (listener, server_addr) = bind_ephemeral(backend.as_ref(), SocketType::Stream);
		backend.listen(listener, 16).unwrap();

		let client = backend
			.socket(AddressFamily::Inet, SocketType::Stream, 0)
			.unwrap();
		backend.connect(client, &server_addr).unwrap();
		let (child, _) = backend.accept(listener).unwrap();

		backend.set_blocking(client, false).unwrap();
		let mut buf = [0u8; 8];
		assert_eq!(
			backend.recv(client, &mut buf, MsgFlags::empty()),
			Err(Errno::EWOULDBLOCK),
			"{kind:?} backend"
		);

		backend.send(child, b"late", MsgFlags::empty()).unwrap();
		let n = retry(|| backend.recv(client, &mut buf, MsgFlags::empty())).unwrap();
		assert_eq!(&buf[..n], b"late", "{kind:?} backend");

		backend.close(child).unwrap();
		backend.close(client).unwrap();
		backend.close(listener).unwrap();
	}
}

#[test]
fn udp_exchange_reports_sender_address() {
	for backend in backends() {
		let kind = backend.kind();
		let (receiver, receiver_addr) = bind_ephemeral(backend.as_ref(), SocketType::Dgram);
		let (sender, sender_addr) = bind_ephemeral(backend.as_ref(), SocketType::Dgram);

		assert_eq!(
			backend.send_to(sender, b"ping", MsgFlags::empty(), &receiver_addr),
			Ok(4)
		);

		let mut buf = [0u8; 16];
		let (n, from) = backend.recv_from(receiver, &mut buf, MsgFlags::empty()).unwrap();
		assert_eq!(&buf[..n], b"ping", "{kind:?} backend");
		assert_eq!(from, sender_addr, "{kind:?} backend");

		backend.close(sender).unwrap();
		backend.close(receiver).unwrap();
	}
}

#[test]
fn udp_connect_records_default_peer() {
	for backend in backends() {
		let kind = backend.kind();
		let (receiver, receiver_addr) = bind_ephemeral(backend.as_ref(), SocketType::Dgram);
		let (other, other_addr) = bind_ephemeral(backend.as_ref(), SocketType::Dgram);
		let sender = backend
			.socket(AddressFamily::Inet, SocketType::Dgram, 0)
			.unwrap();

		backend.connect(sender, &receiver_addr).unwrap();
		assert_eq!(backend.getpeername(sender).unwrap(), receiver_addr, "{kind:?} backend");
		assert_eq!(backend.send(sender, b"to-peer", MsgFlags::empty()), Ok(7));

		let mut buf = [0u8; 16];
		let (n, _) = backend.recv_from(receiver, &mut buf, MsgFlags::empty()).unwrap();
		assert_eq!(&buf[..n], b"to-peer", "{kind:?} backend");

		// sendto on a connected socket is backend policy, surfaced as a
		// capability instead of unified behavior.
		let redirected = backend.send_to(sender, b"elsewhere", MsgFlags::empty(), &other_addr);
		if backend.capabilities().sendto_on_connected {
			assert_eq!(redirected, Ok(9), "{kind:?} backend");
		} else {
			assert_eq!(redirected, Err(Errno::EISCONN), "{kind:?} backend");
		}

		// Datagram connect may be repeated to change the default peer.
		backend.connect(sender, &other_addr).unwrap();
		assert_eq!(backend.getpeername(sender).unwrap(), other_addr, "{kind:?} backend");

		backend.close(sender).unwrap();
		backend.close(other).unwrap();
		backend.close(receiver).unwrap();
	}
}

#[test]
fn unconnected_dgram_send_needs_destination() {
	for backend in backends() {
		let kind = backend.kind();
		let fd = backend
			.socket(AddressFamily::Inet, SocketType::Dgram, 0)
			.unwrap();
		let result = backend.send(fd, b"nowhere", MsgFlags::empty());
		assert!(
			matches!(
				result,
				Err(Errno::EDESTADDRREQ) | Err(Errno::ENOTCONN) | Err(Errno::EPIPE)
			),
			"{kind:?} backend returned {result:?}"
		);
		backend.close(fd).unwrap();
	}
}

#[test]
fn select_reports_udp_readiness() {
	for backend in backends() {
		let kind = backend.kind();
		let (receiver, receiver_addr) = bind_ephemeral(backend.as_ref(), SocketType::Dgram);
		let (sender, _) = bind_ephemeral(backend.as_ref(), SocketType::Dgram);

		let quiet = backend
			.select(&[receiver], &[sender], &[], Some(Duration::ZERO))
			.unwrap();
		assert_eq!(quiet.read, vec![false], "{kind:?} backend");
		assert_eq!(quiet.write, vec![true], "{kind:?} backend");

		backend
			.send_to(sender, b"wake", MsgFlags::empty(), &receiver_addr)
			.unwrap();
		let ready = backend
			.select(&[receiver], &[], &[], Some(Duration::from_secs(5)))
			.unwrap();
		assert_eq!(ready.read, vec![true], "{kind:?} backend");

		let mut buf = [0u8; 8];
		let (n, _) = backend.recv_from(receiver, &mut buf, MsgFlags::empty()).unwrap();
		assert_eq!(&buf[..n], b"wake", "{kind:?} backend");

		backend.close(sender).unwrap();
		backend.close(receiver).unwrap();
	}
}

#[test]
fn select_reports_pending_connection() {
	for backend in backends() {
		let kind = backend.kind();
		let (listener, server_addr) = bind_ephemeral(backend.as_ref(), SocketType::Stream);
		backend.listen(listener, 16).unwrap();

		let quiet = backend
			.select(&[listener], &[], &[], Some(Duration::ZERO))
			.unwrap();
		assert_eq!(quiet.read, vec![false], "{kind:?} backend");

		let client = backend
			.socket(AddressFamily::Inet, SocketType::Stream, 0)
			.unwrap();
		backend.connect(client, &server_addr).unwrap();

		let ready = backend
			.select(&[listener], &[], &[], Some(Duration::from_secs(5)))
			.unwrap();
		assert_eq!(ready.read, vec![true], "{kind:?} backend");

		// Readiness did not consume the connection.
		let (child, _) = backend.accept(listener).unwrap();

		backend.close(child).unwrap();
		backend.close(client).unwrap();
		backend.close(listener).unwrap();
	}
}

#[test]
fn select_reports_stream_eof_as_readable() {
	for backend in backends() {
		let kind = backend.kind();
		let (listener, server_addr) = bind_ephemeral(backend.as_ref(), SocketType::Stream);
		backend.listen(listener, 16).unwrap();

		let client = backend
			.socket(AddressFamily::Inet, SocketType::Stream, 0)
			.unwrap();
		backend.connect(client, &server_addr).unwrap();
		let (child, _) = backend.accept(listener).unwrap();

		backend.close(child).unwrap();

		let ready = backend
			.select(&[client], &[], &[], Some(Duration::from_secs(5)))
			.unwrap();
		assert_eq!(ready.read, vec![true], "{kind:?} backend");
		let mut buf = [0u8; 8];
		assert_eq!(
			retry(|| backend.recv(client, &mut buf, MsgFlags::empty())),
			Ok(0),
			"{kind:?} backend"
		);

		backend.close(client).unwrap();
		backend.close(listener).unwrap();
	}
}

#[test]
fn socket_options_round_trip() {
	for backend in backends() {
		let kind = backend.kind();
		let fd = backend
			.socket(AddressFamily::Inet, SocketType::Stream, 0)
			.unwrap();

		let mut buf = [0u8; 4];
		backend
			.getsockopt(fd, socklane::consts::SOL_SOCKET, socklane::consts::SO_TYPE, &mut buf)
			.unwrap();
		assert_eq!(
			i32::from_ne_bytes(buf),
			SocketType::Stream.to_raw(),
			"{kind:?} backend"
		);

		backend
			.setsockopt(
				fd,
				socklane::consts::SOL_SOCKET,
				socklane::consts::SO_REUSEADDR,
				&1i32.to_ne_bytes(),
			)
			.unwrap();
		backend
			.getsockopt(
				fd,
				socklane::consts::SOL_SOCKET,
				socklane::consts::SO_REUSEADDR,
				&mut buf,
			)
			.unwrap();
		assert_ne!(i32::from_ne_bytes(buf), 0, "{kind:?} backend");

		// Platform-conditional options are gated on their Option constant.
		if let Some(acceptconn) = socklane::consts::SO_ACCEPTCONN {
			backend
				.getsockopt(fd, socklane::consts::SOL_SOCKET, acceptconn, &mut buf)
				.unwrap();
			assert_eq!(i32::from_ne_bytes(buf), 0, "{kind:?} backend");
		}

		backend.close(fd).unwrap();
	}
}

#[test]
fn owned_sock_closes_on_drop() {
	// Emulated descriptors are never reused, so a stale handle stays stale.
	let backend = EmulatedBackend::new();
	let fd = {
		let guard = OwnedSock::open(
			&backend,
			AddressFamily::Inet,
			SocketType::Stream,
			0,
		)
		.unwrap();
		guard.fd()
	};
	assert_eq!(backend.getsockname(fd), Err(Errno::EBADF));

	// into_raw opts out of the guard; the caller owns the close again.
	let guard = OwnedSock::open(&backend, AddressFamily::Inet, SocketType::Dgram, 0).unwrap();
	let fd = guard.into_raw();
	assert!(backend.getsockname(fd).is_ok());
	backend.close(fd).unwrap();
}

#[cfg(unix)]
#[test]
fn unix_stream_exchange() {
	for backend in backends() {
		let kind = backend.kind();
		if !backend.capabilities().unix_sockets {
			continue;
		}
		let path = std::env::temp_dir().join(format!(
			"socklane-{}-{:?}.sock",
			std::process::id(),
			kind
		));
		let _ = std::fs::remove_file(&path);

		use std::os::unix::ffi::OsStrExt;
		let addr: SockAddr = socklane::UnixSockAddr::new(path.as_os_str().as_bytes())
			.unwrap()
			.into();

		let listener = backend
			.socket(AddressFamily::Unix, SocketType::Stream, 0)
			.unwrap();
		backend.bind(listener, &addr).unwrap();
		backend.listen(listener, 8).unwrap();
		assert_eq!(backend.getsockname(listener).unwrap(), addr, "{kind:?} backend");

		let backend_ref = backend.as_ref();
		let addr_clone = addr.clone();
		std::thread::scope(|scope| {
			let client_side = scope.spawn(move || {
				let client = backend_ref
					.socket(AddressFamily::Unix, SocketType::Stream, 0)
					.unwrap();
				backend_ref.connect(client, &addr_clone).unwrap();
				backend_ref
					.send(client, b"over unix", MsgFlags::empty())
					.unwrap();
				backend_ref.close(client).unwrap();
			});

			let (child, _) = backend_ref.accept(listener).unwrap();
			let mut buf = [0u8; 16];
			let n = backend_ref.recv(child, &mut buf, MsgFlags::empty()).unwrap();
			assert_eq!(&buf[..n], b"over unix", "{kind:?} backend");

			client_side.join().expect("client thread");
			backend_ref.close(child).unwrap();
		});

		backend.close(listener).unwrap();
		let _ = std::fs::remove_file(&path);
	}
}
