//! Object identifier type and dotted-notation validation.
//!
//! Chat commands hand OIDs over as raw text, so validation happens here,
//! before anything touches the network. Accepted notation is an optional
//! leading dot followed by dot-separated decimal arcs (`.1.3.6.1.2.1.1.1.0`
//! or `1.3.6.1.2.1.1.1.0`); the parsed [`Oid`] stores arcs only and always
//! displays without the leading dot.

use smallvec::SmallVec;

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};

/// Maximum number of arcs in an OID (RFC 2578 limit).
pub const MAX_OID_LEN: usize = 128;

/// An SNMP object identifier.
///
/// Ordering is lexicographic over the arc sequence, which is the traversal
/// order GETNEXT walks follow.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 12]>,
}

impl Oid {
    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// The arcs of this OID.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// True if the OID has no arcs.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// True if `self` is equal to or below `prefix` in the tree.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.len() >= prefix.arcs.len() && self.arcs[..prefix.arcs.len()] == prefix.arcs[..]
    }

    /// Check dotted notation without allocating.
    ///
    /// Returns true only if, after stripping one optional leading dot, the
    /// input is one or more dot-separated runs of ASCII digits with no empty
    /// segments. Pure string check; arc range and wire constraints are
    /// enforced by [`Oid::parse`].
    pub fn is_valid(raw: &str) -> bool {
        let rest = raw.strip_prefix('.').unwrap_or(raw);
        !rest.is_empty()
            && rest
                .split('.')
                .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Parse dotted notation, accepting an optional leading dot.
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s.strip_prefix('.').unwrap_or(s);
        if rest.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for seg in rest.split('.') {
            if seg.is_empty() {
                return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
            }
            if !seg.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s));
            }
            let arc: u32 = seg
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid_with_input(
                OidErrorKind::TooManyArcs {
                    count: arcs.len(),
                    max: MAX_OID_LEN,
                },
                s,
            ));
        }

        Ok(Self { arcs })
    }

    /// Encode to BER content bytes (without tag and length).
    ///
    /// The first two arcs pack into a single subidentifier per X.690; callers
    /// must ensure at least two arcs before encoding for the wire (the client
    /// rejects shorter OIDs with [`OidErrorKind::TooShort`]).
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 32]> {
        let mut out = SmallVec::new();
        if self.arcs.is_empty() {
            return out;
        }

        let first = u64::from(self.arcs[0]) * 40
            + self.arcs.get(1).copied().map(u64::from).unwrap_or(0);
        push_subid(&mut out, first);

        for &arc in self.arcs.iter().skip(2) {
            push_subid(&mut out, u64::from(arc));
        }
        out
    }

    /// Decode from BER content bytes (without tag and length).
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::decode(0, DecodeErrorKind::InvalidOidEncoding));
        }

        let mut arcs: SmallVec<[u32; 12]> = SmallVec::new();
        let mut sub: u64 = 0;
        let mut in_subid = false;
        let mut first = true;

        for (i, &b) in data.iter().enumerate() {
            // Leading 0x80 would be a non-minimal encoding
            if !in_subid && b == 0x80 {
                return Err(Error::decode(i, DecodeErrorKind::InvalidOidEncoding));
            }
            sub = (sub << 7) | u64::from(b & 0x7F);
            if sub > u64::from(u32::MAX) * 40 {
                return Err(Error::decode(i, DecodeErrorKind::InvalidOidEncoding));
            }
            if b & 0x80 != 0 {
                in_subid = true;
                continue;
            }

            if first {
                // First subidentifier packs the first two arcs
                let (a, b) = if sub < 40 {
                    (0, sub)
                } else if sub < 80 {
                    (1, sub - 40)
                } else {
                    (2, sub - 80)
                };
                if b > u64::from(u32::MAX) {
                    return Err(Error::decode(i, DecodeErrorKind::InvalidOidEncoding));
                }
                arcs.push(a);
                arcs.push(b as u32);
                first = false;
            } else {
                if sub > u64::from(u32::MAX) {
                    return Err(Error::decode(i, DecodeErrorKind::InvalidOidEncoding));
                }
                arcs.push(sub as u32);
            }
            sub = 0;
            in_subid = false;
        }

        // Trailing continuation byte means a truncated subidentifier
        if in_subid {
            return Err(Error::decode(
                data.len(),
                DecodeErrorKind::InvalidOidEncoding,
            ));
        }
        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: arcs.len(),
                max: MAX_OID_LEN,
            }));
        }

        Ok(Self { arcs })
    }
}

/// Encode a single subidentifier in base-128, high bit marking continuation.
fn push_subid(out: &mut SmallVec<[u8; 32]>, value: u64) {
    if value == 0 {
        out.push(0);
        return;
    }
    let mut tmp = [0u8; 10];
    let mut n = 0;
    let mut v = value;
    while v > 0 {
        tmp[n] = (v & 0x7F) as u8;
        v >>= 7;
        n += 1;
    }
    for i in (0..n).rev() {
        let mut byte = tmp[i];
        if i != 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut arcs = self.arcs.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
        }
        for arc in arcs {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Construct an [`Oid`] from literal arcs.
///
/// ```
/// use snmp_relay::oid;
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),+ $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),+])
    };
}
