//! Nameserver address parsing.
//!
//! Addresses are accepted only as four decimal fields separated by dots,
//! each at most 255. Hostnames, IPv6 and shorthand forms like `1.1` are
//! rejected.

use std::net::Ipv4Addr;

use crate::error::{NsplanError, Result};

/// Parse one dotted-quad IPv4 address.
pub fn parse_address(input: &str) -> Result<Ipv4Addr> {
    let trimmed = input.trim();
    let invalid = |reason: String| NsplanError::InvalidAddress {
        input: trimmed.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("address is empty".to_string()));
    }

    let fields: Vec<&str> = trimmed.split('.').collect();
    if fields.len() != 4 {
        return Err(invalid(format!(
            "expected 4 dot-separated fields, found {}",
            fields.len()
        )));
    }

    let mut octets = [0u8; 4];
    for (i, field) in fields.iter().enumerate() {
        if field.is_empty() || field.len() > 3 || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!("field {} ('{}') is not a number", i + 1, field)));
        }
        let value: u16 = field
            .parse()
            .map_err(|_| invalid(format!("field {} ('{}') is not a number", i + 1, field)))?;
        if value > 255 {
            return Err(invalid(format!("octet {} is out of range (0-255)", value)));
        }
        octets[i] = value as u8;
    }

    Ok(Ipv4Addr::from(octets))
}

/// Parse a list of addresses separated by commas and/or whitespace.
///
/// The result keeps input order and drops repeated addresses.
pub fn parse_address_list(input: &str) -> Result<Vec<Ipv4Addr>> {
    let parsed = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(parse_address)
        .collect::<Result<Vec<_>>>()?;
    Ok(dedup_addresses(parsed))
}

/// Remove repeated addresses, keeping the first occurrence of each.
pub fn dedup_addresses(addresses: impl IntoIterator<Item = Ipv4Addr>) -> Vec<Ipv4Addr> {
    let mut out: Vec<Ipv4Addr> = Vec::new();
    for addr in addresses {
        if !out.contains(&addr) {
            out.push(addr);
        }
    }
    out
}
