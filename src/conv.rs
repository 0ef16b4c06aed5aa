//! Textual/binary address conversion: inet_pton, inet_ntop, inet_aton,
//! inet_addr, inet_ntoa.
//!
//! Two grammars coexist on purpose. `inet_pton` is the strict modern parser;
//! `inet_aton`/`inet_addr` keep the permissive legacy grammar (1–4
//! components, hex/octal, packed tail) that old callers depend on.
//! Syntax failures never carry an errno — see [`AddrError`].

use crate::consts::{AddressFamily, INADDR_NONE};
use crate::error::{AddrError, ConvError, Errno};

/// How `inet_pton` treats an IPv4 octet with a leading zero ("010").
///
/// Linux rejects it; several other Unix kernels read it as decimal 10.
/// The platform default mirrors the host kernel, so behavior matches what
/// the native backend's libc would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv4Strictness {
	RejectLeadingZeros,
	LeadingZerosAsDecimal,
}

impl Default for Ipv4Strictness {
	fn default() -> Self {
		if cfg!(any(
			target_os = "linux",
			target_os = "android",
			target_os = "macos",
			target_os = "ios",
			target_os = "windows"
		)) {
			Ipv4Strictness::RejectLeadingZeros
		} else {
			Ipv4Strictness::LeadingZerosAsDecimal
		}
	}
}

/// Parses a textual address into its binary form (4 or 16 bytes).
///
/// Uses the platform-default [`Ipv4Strictness`].
pub fn inet_pton(family: AddressFamily, text: &str) -> Result<Vec<u8>, ConvError> {
	inet_pton_with(family, text, Ipv4Strictness::default())
}

/// `inet_pton` with an explicit leading-zero policy.
pub fn inet_pton_with(
	family: AddressFamily,
	text: &str,
	strictness: Ipv4Strictness,
) -> Result<Vec<u8>, ConvError> {
	match family {
		AddressFamily::Inet => Ok(parse_ipv4_strict(text, strictness)?.to_vec()),
		AddressFamily::Inet6 => Ok(parse_ipv6(text)?.to_vec()),
		AddressFamily::Unspec | AddressFamily::Unix => {
			Err(ConvError::Family(Errno::EAFNOSUPPORT))
		}
	}
}

/// Formats a binary address (4 or 16 bytes) as text.
///
/// The byte length must exactly match the family width. For IPv6 the
/// `::` compression follows the POSIX-canonical rule: the longest run of
/// zero groups, leftmost on a tie; IPv4-mapped addresses keep the
/// trailing dotted quad.
pub fn inet_ntop(family: AddressFamily, bytes: &[u8]) -> Result<String, ConvError> {
	match family {
		AddressFamily::Inet => {
			if bytes.len() != 4 {
				return Err(AddrError::WrongLength { expected: 4, got: bytes.len() }.into());
			}
			Ok(inet_ntoa(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])))
		}
		AddressFamily::Inet6 => {
			if bytes.len() != 16 {
				return Err(AddrError::WrongLength { expected: 16, got: bytes.len() }.into());
			}
			let mut addr = [0u8; 16];
			addr.copy_from_slice(bytes);
			Ok(std::net::Ipv6Addr::from(addr).to_string())
		}
		AddressFamily::Unspec | AddressFamily::Unix => {
			Err(ConvError::Family(Errno::EAFNOSUPPORT))
		}
	}
}

/// Parses the permissive legacy IPv4 grammar, returning the address as a
/// host-order integer.
///
/// Components may be decimal, `0x` hex, or leading-zero octal; with fewer
/// than four components the final one packs the remaining bytes, so
/// `"1.234567"` is byte 1 followed by 234567 spread over three bytes.
pub fn inet_aton(text: &str) -> Result<u32, AddrError> {
	const INVALID: AddrError = AddrError::InvalidAddress { reason: "invalid IPv4 literal" };

	if text.is_empty() {
		return Err(INVALID);
	}
	let mut parts = Vec::with_capacity(4);
	for chunk in text.split('.') {
		parts.push(parse_legacy_component(chunk).ok_or(INVALID)?);
	}
	if parts.len() > 4 {
		return Err(INVALID);
	}

	let n = parts.len();
	if n == 1 {
		return Ok(parts[0]);
	}
	let mut acc: u32 = 0;
	for &part in &parts[..n - 1] {
		if part > 0xFF {
			return Err(INVALID);
		}
		acc = (acc << 8) | part;
	}
	let tail_bits = 8 * (5 - n as u32);
	let last = parts[n - 1];
	if u64::from(last) >= 1u64 << tail_bits {
		return Err(INVALID);
	}
	Ok((acc << tail_bits) | last)
}

/// Same grammar as [`inet_aton`], but reports failure through the
/// `INADDR_NONE` sentinel instead of an error.
pub fn inet_addr(text: &str) -> u32 {
	inet_aton(text).unwrap_or(INADDR_NONE)
}

/// Formats a host-order IPv4 integer as canonical dotted decimal.
pub fn inet_ntoa(addr: u32) -> String {
	let o = addr.to_be_bytes();
	format!("{}.{}.{}.{}", o[0], o[1], o[2], o[3])
}

/// One component of the legacy grammar: decimal, 0x hex, or 0-prefix octal.
fn parse_legacy_component(s: &str) -> Option<u32> {
	if s.is_empty() || s.starts_with('+') || s.starts_with('-') {
		return None;
	}
	if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
		if hex.is_empty() {
			return None;
		}
		return u32::from_str_radix(hex, 16).ok();
	}
	if s.len() > 1 && s.starts_with('0') {
		return u32::from_str_radix(&s[1..], 8).ok();
	}
	s.parse::<u32>().ok()
}

/// Strict dotted-quad parser: exactly four decimal octets, 0–255.
pub(crate) fn parse_ipv4_strict(
	text: &str,
	strictness: Ipv4Strictness,
) -> Result<[u8; 4], AddrError> {
	const INVALID: AddrError = AddrError::InvalidAddress { reason: "invalid IPv4 literal" };

	let mut octets = [0u8; 4];
	let mut count = 0;
	for chunk in text.split('.') {
		if count == 4 {
			return Err(INVALID);
		}
		if chunk.is_empty() || chunk.len() > 3 || !chunk.bytes().all(|b| b.is_ascii_digit()) {
			return Err(INVALID);
		}
		if chunk.len() > 1
			&& chunk.starts_with('0')
			&& strictness == Ipv4Strictness::RejectLeadingZeros
		{
			return Err(INVALID);
		}
		let value: u16 = chunk.parse().map_err(|_| INVALID)?;
		if value > 255 {
			return Err(INVALID);
		}
		octets[count] = value as u8;
		count += 1;
	}
	if count != 4 {
		return Err(INVALID);
	}
	Ok(octets)
}

/// Strict IPv6 parser: colon-hex groups, at most one `::`, optional
/// trailing embedded dotted quad. A plain IPv4 literal is rejected.
pub(crate) fn parse_ipv6(text: &str) -> Result<[u8; 16], AddrError> {
	text.parse::<std::net::Ipv6Addr>()
		.map(|addr| addr.octets())
		.map_err(|_| AddrError::InvalidAddress { reason: "invalid IPv6 literal" })
}
