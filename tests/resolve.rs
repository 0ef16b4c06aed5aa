//! Name resolution behavior, pinned on both backends where the outcome
//! must be identical and on the emulated backend where the native result
//! depends on the host's resolver configuration.

use socklane::consts::INADDR_LOOPBACK;
use socklane::{
	AddrInfoHints, AddressFamily, AiFlags, EmulatedBackend, GaiError, Inet4SockAddr, NiFlags,
	SockAddr, SocketBackend, SocketType,
};

fn backends() -> Vec<Box<dyn SocketBackend>> {
	let mut all: Vec<Box<dyn SocketBackend>> = vec![Box::new(EmulatedBackend::new())];
	#[cfg(unix)]
	all.push(Box::new(socklane::NativeBackend::new()));
	all
}

#[test]
fn getaddrinfo_without_node_or_service_is_noname() {
	for backend in backends() {
		let hints = AddrInfoHints::default();
		let result = backend.getaddrinfo(None, None, &hints);
		assert!(
			matches!(result, Err(GaiError::NoName)),
			"{:?} backend accepted an empty query",
			backend.kind()
		);
	}
}

#[test]
fn getaddrinfo_rejects_bad_hints() {
	for backend in backends() {
		let kind = backend.kind();

		let hints = AddrInfoHints { family: 9999, ..Default::default() };
		assert_eq!(
			backend.getaddrinfo(Some("localhost"), None, &hints).err(),
			Some(GaiError::Family),
			"{kind:?} backend"
		);

		let hints = AddrInfoHints { socktype: 9999, ..Default::default() };
		assert_eq!(
			backend.getaddrinfo(Some("localhost"), None, &hints).err(),
			Some(GaiError::SockType),
			"{kind:?} backend"
		);

		// AI_CANONNAME needs a node to name.
		let hints = AddrInfoHints {
			flags: AiFlags::CANONNAME,
			..Default::default()
		};
		assert_eq!(
			backend.getaddrinfo(None, Some("http"), &hints).err(),
			Some(GaiError::BadFlags),
			"{kind:?} backend"
		);
	}
}

#[test]
fn getaddrinfo_numeric_node_checks_family() {
	for backend in backends() {
		let hints = AddrInfoHints::for_family(AddressFamily::Inet);
		let err = backend.getaddrinfo(Some("::1"), None, &hints).err();
		// Resolvers disagree on the exact code for a family-impossible
		// numeric node; both spellings mean the same thing.
		assert!(
			matches!(err, Some(GaiError::AddrFamily) | Some(GaiError::NoName)),
			"{:?} backend returned {err:?}",
			backend.kind()
		);
	}
}

#[test]
fn getaddrinfo_numeric_node_resolves_without_dns() {
	for backend in backends() {
		let hints = AddrInfoHints::for_socket(AddressFamily::Inet, SocketType::Stream);
		let mut cursor = backend
			.getaddrinfo(Some("192.0.2.44"), Some("8080"), &hints)
			.expect("numeric lookup failed");
		let entry = cursor.next().expect("no candidates");
		assert_eq!(entry.family, AddressFamily::Inet);
		assert_eq!(entry.socktype, SocketType::Stream);
		let v4 = entry.addr.as_inet4().expect("not an inet4 address");
		assert_eq!(v4.octets(), [192, 0, 2, 44]);
		assert_eq!(v4.port(), 8080);
		cursor.release();
	}
}

#[test]
fn localhost_https_canonname_vector() {
	// The emulated resolver makes this deterministic: first candidate is
	// AF_INET loopback, port 443, canonical name "localhost".
	let backend = EmulatedBackend::new();
	let hints = AddrInfoHints {
		family: AddressFamily::Inet.to_raw(),
		socktype: SocketType::Stream.to_raw(),
		flags: AiFlags::CANONNAME,
		..Default::default()
	};
	let mut cursor = backend
		.getaddrinfo(Some("localhost"), Some("https"), &hints)
		.expect("localhost lookup failed");
	let entry = cursor.next().expect("no candidates");
	assert_eq!(entry.family, AddressFamily::Inet);
	assert_eq!(entry.canonname.as_deref(), Some("localhost"));
	let v4 = entry.addr.as_inet4().unwrap();
	assert_eq!(v4.addr(), INADDR_LOOPBACK);
	assert_eq!(v4.port(), 443);
	cursor.release();
}

#[test]
fn cursor_is_forward_only_and_finite() {
	let backend = EmulatedBackend::new();
	// socktype 0 expands into a stream and a dgram candidate per address.
	let hints = AddrInfoHints::for_family(AddressFamily::Inet);
	let cursor = backend
		.getaddrinfo(Some("localhost"), Some("domain"), &hints)
		.unwrap();
	let entries: Vec<_> = cursor.collect();
	assert_eq!(entries.len(), 2);
	assert_eq!(entries[0].socktype, SocketType::Stream);
	assert_eq!(entries[1].socktype, SocketType::Dgram);
	assert!(entries.iter().all(|e| e.addr.port() == Some(53)));
}

#[test]
fn unknown_service_is_eai_service() {
	let backend = EmulatedBackend::new();
	let hints = AddrInfoHints::for_family(AddressFamily::Inet);
	assert_eq!(
		backend
			.getaddrinfo(Some("localhost"), Some("no-such-service-exists"), &hints)
			.err(),
		Some(GaiError::Service)
	);
}

#[test]
fn passive_without_node_yields_wildcard() {
	let backend = EmulatedBackend::new();
	let hints = AddrInfoHints {
		family: AddressFamily::Inet.to_raw(),
		socktype: SocketType::Stream.to_raw(),
		flags: AiFlags::PASSIVE,
		..Default::default()
	};
	let mut cursor = backend.getaddrinfo(None, Some("8080"), &hints).unwrap();
	let entry = cursor.next().unwrap();
	assert_eq!(entry.addr.as_inet4().unwrap().addr(), 0);

	// Without AI_PASSIVE the same query means "connect to me": loopback.
	let hints = AddrInfoHints::for_socket(AddressFamily::Inet, SocketType::Stream);
	let mut cursor = backend.getaddrinfo(None, Some("8080"), &hints).unwrap();
	let entry = cursor.next().unwrap();
	assert_eq!(entry.addr.as_inet4().unwrap().addr(), INADDR_LOOPBACK);
}

#[test]
fn getnameinfo_numeric_flags() {
	for backend in backends() {
		let addr: SockAddr = Inet4SockAddr::loopback(443).into();
		let (host, service) = backend
			.getnameinfo(&addr, NiFlags::NUMERICHOST | NiFlags::NUMERICSERV)
			.expect("numeric getnameinfo failed");
		assert_eq!(host, "127.0.0.1", "{:?} backend", backend.kind());
		assert_eq!(service, "443", "{:?} backend", backend.kind());
	}
}

#[test]
fn getnameinfo_resolves_loopback_and_service() {
	let backend = EmulatedBackend::new();
	let addr: SockAddr = Inet4SockAddr::loopback(443).into();
	let (host, service) = backend.getnameinfo(&addr, NiFlags::empty()).unwrap();
	assert_eq!(host, "localhost");
	assert_eq!(service, "https");
}

#[test]
fn getnameinfo_dgram_selects_udp_table() {
	let backend = EmulatedBackend::new();
	// 123 is ntp in the UDP column only.
	let addr: SockAddr = Inet4SockAddr::loopback(123).into();
	let (_, service) = backend.getnameinfo(&addr, NiFlags::DGRAM).unwrap();
	assert_eq!(service, "ntp");
	let (_, service) = backend.getnameinfo(&addr, NiFlags::empty()).unwrap();
	assert_eq!(service, "123");
}

#[test]
fn getnameinfo_namereqd_fails_without_reverse_mapping() {
	let backend = EmulatedBackend::new();
	let addr: SockAddr = Inet4SockAddr::from_octets([192, 0, 2, 1], 80).into();
	assert_eq!(
		backend.getnameinfo(&addr, NiFlags::NAMEREQD).err(),
		Some(GaiError::NoName)
	);
	// Without the flag the numeric form is an acceptable fallback.
	let (host, _) = backend.getnameinfo(&addr, NiFlags::empty()).unwrap();
	assert_eq!(host, "192.0.2.1");
}

#[test]
fn gethostname_reports_something() {
	for backend in backends() {
		let name = backend.gethostname().expect("gethostname failed");
		assert!(!name.is_empty(), "{:?} backend", backend.kind());
	}
}
