//! Semantic text formats.

use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

pub(crate) fn is_email(s: &str) -> bool {
    s.len() <= 254 && EMAIL.is_match(s)
}

/// An absolute URL with a host, such as `https://example.com/path`.
pub(crate) fn is_url(s: &str) -> bool {
    url::Url::parse(s).map(|u| u.has_host()).unwrap_or(false)
}

/// Any absolute URI, such as `mailto:ops@example.com` or `urn:isbn:0451450523`.
pub(crate) fn is_uri(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

/// A hyphenated UUID (`8-4-4-4-12` hex digits).
pub(crate) fn is_uuid(s: &str) -> bool {
    s.len() == 36 && uuid::Uuid::parse_str(s).is_ok()
}

/// An IPv4 or IPv6 network in CIDR notation.
pub(crate) fn is_cidr(s: &str) -> bool {
    let Some((addr, prefix)) = s.split_once('/') else {
        return false;
    };
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => prefix <= 32,
        Ok(IpAddr::V6(_)) => prefix <= 128,
        Err(_) => false,
    }
}

/// A hex-encoded digest decoding to exactly `size` bytes.
pub(crate) fn is_hex_digest(s: &str, size: usize) -> bool {
    s.len() == size * 2 && hex::decode(s).map(|bytes| bytes.len() == size).unwrap_or(false)
}

/// Digest algorithms with their sizes in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Digest {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
}

impl Digest {
    pub(crate) fn size(&self) -> usize {
        match self {
            Digest::Md5 => 16,
            Digest::Sha1 => 20,
            Digest::Sha224 => 28,
            Digest::Sha256 => 32,
            Digest::Sha384 => 48,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Digest::Md5 => "md5",
            Digest::Sha1 => "sha1",
            Digest::Sha224 => "sha224",
            Digest::Sha256 => "sha256",
            Digest::Sha384 => "sha384",
        }
    }
}
