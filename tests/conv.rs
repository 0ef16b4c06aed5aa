//! Address conversion vectors exercised through the public surface.

use socklane::consts::INADDR_NONE;
use socklane::{
	AddrError, AddressFamily, ConvError, Errno, Ipv4Strictness, inet_addr, inet_aton, inet_ntoa,
	inet_ntop, inet_pton, inet_pton_with,
};

#[test]
fn pton_accepts_canonical_quad() {
	assert_eq!(
		inet_pton(AddressFamily::Inet, "1.2.3.4").unwrap(),
		vec![1, 2, 3, 4]
	);
	assert_eq!(
		inet_pton(AddressFamily::Inet, "255.255.255.255").unwrap(),
		vec![255, 255, 255, 255]
	);
}

#[test]
fn pton_rejects_legacy_forms() {
	// The strict parser refuses everything inet_aton would still take.
	for bad in [
		"1.2.65535",
		"1::FF",
		"0x7f.0.0.1",
		"1.2.3",
		"1.2.3.4.5",
		"16777343",
		"",
	] {
		assert!(
			inet_pton_with(AddressFamily::Inet, bad, Ipv4Strictness::RejectLeadingZeros).is_err(),
			"strict parser accepted {bad:?}"
		);
	}
}

#[test]
fn pton_leading_zero_policy_is_explicit() {
	assert!(
		inet_pton_with(AddressFamily::Inet, "010.0.0.1", Ipv4Strictness::RejectLeadingZeros)
			.is_err()
	);
	assert_eq!(
		inet_pton_with(AddressFamily::Inet, "010.0.0.1", Ipv4Strictness::LeadingZerosAsDecimal)
			.unwrap(),
		vec![10, 0, 0, 1]
	);
}

#[test]
fn pton_v6_grammar() {
	assert_eq!(
		inet_pton(AddressFamily::Inet6, "::1").unwrap().len(),
		16
	);
	// Embedded dotted quad survives, bare IPv4 does not.
	assert!(inet_pton(AddressFamily::Inet6, "::ffff:192.0.2.1").is_ok());
	assert!(inet_pton(AddressFamily::Inet6, "192.0.2.1").is_err());
	assert!(inet_pton(AddressFamily::Inet6, "1::2::3").is_err());
}

#[test]
fn pton_unspec_fails_with_family_errno() {
	assert_eq!(
		inet_pton(AddressFamily::Unspec, "1.2.3.4"),
		Err(ConvError::Family(Errno::EAFNOSUPPORT))
	);
}

#[test]
fn ntop_requires_exact_width() {
	assert_eq!(
		inet_ntop(AddressFamily::Inet, &[192, 0, 2, 7]).unwrap(),
		"192.0.2.7"
	);
	assert!(matches!(
		inet_ntop(AddressFamily::Inet, &[192, 0, 2, 7, 0]),
		Err(ConvError::Syntax(AddrError::WrongLength { expected: 4, got: 5 }))
	));
	assert!(matches!(
		inet_ntop(AddressFamily::Inet6, &[0u8; 17]),
		Err(ConvError::Syntax(AddrError::WrongLength { expected: 16, got: 17 }))
	));
}

#[test]
fn ntop_v6_compresses_longest_zero_run() {
	let bytes = inet_pton(AddressFamily::Inet6, "2001:0:0:0:1:0:0:1").unwrap();
	// Longest run wins; on a tie the leftmost run is compressed.
	assert_eq!(
		inet_ntop(AddressFamily::Inet6, &bytes).unwrap(),
		"2001::1:0:0:1"
	);

	let mapped = inet_pton(AddressFamily::Inet6, "::ffff:10.1.2.3").unwrap();
	assert_eq!(
		inet_ntop(AddressFamily::Inet6, &mapped).unwrap(),
		"::ffff:10.1.2.3"
	);
}

#[test]
fn aton_legacy_grammar() {
	assert_eq!(inet_aton("1.2.3.4"), Ok(0x0102_0304));
	assert_eq!(inet_aton("0x7f.0.0.1"), Ok(0x7f00_0001));
	assert_eq!(inet_aton("0177.0.0.1"), Ok(0x7f00_0001));
	// Fewer components pack the tail: byte 1, then 234567 over three bytes.
	assert_eq!(inet_aton("1.234567"), Ok((1 << 24) | 234_567));
	assert_eq!(inet_aton("2130706433"), Ok(0x7f00_0001));
	assert!(inet_aton("1.2.3.4.5").is_err());
	assert!(inet_aton("hello").is_err());
}

#[test]
fn aton_ntoa_round_trip_is_canonical() {
	// ntoa(aton(x)) yields the canonical dotted-decimal spelling of the
	// same 32-bit value, not necessarily x itself.
	for (input, canonical) in [
		("1.2.3.4", "1.2.3.4"),
		("0x7f.0.0.1", "127.0.0.1"),
		("0177.0.0.01", "127.0.0.1"),
		("1.234567", "1.3.148.71"),
		("2130706433", "127.0.0.1"),
	] {
		let value = inet_aton(input).unwrap();
		assert_eq!(inet_ntoa(value), canonical, "for input {input:?}");
		assert_eq!(inet_aton(canonical), Ok(value));
	}
}

#[test]
fn addr_signals_failure_through_sentinel() {
	assert_eq!(inet_addr("1.2.3.4"), 0x0102_0304);
	assert_eq!(inet_addr("not-an-address"), INADDR_NONE);
	assert_eq!(inet_addr(""), INADDR_NONE);
}
