//! Types for use as [crate::Read::Cfg].

/// Default bound on packet nesting.
///
/// Decoding, evaluating, and dropping a tree this deep fits on a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Limits applied while decoding a [crate::Packet] tree.
///
/// Every operator consumes at least 18 bits of header and framing, so an input of `n` bits
/// can nest roughly `n / 18` levels deep. Since decoding recurses once per level, untrusted
/// input must be bounded to avoid exhausting the stack. The folds in [crate::evaluate()] and
/// dropping the tree recurse to the same depth.
///
/// # Examples
///
/// ```
/// use transmission_codec::Config;
///
/// let cfg = Config::default();
/// assert_eq!(cfg.max_depth, 256);
///
/// let shallow = Config::new(2);
/// assert!(shallow.allows(2));
/// assert!(!shallow.allows(3));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Config {
    /// The maximum number of nested packets, counting the root as depth 1.
    pub max_depth: usize,
}

impl Config {
    /// Creates a new `Config` with the given nesting limit.
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Returns true if a packet at `depth` may be decoded.
    pub fn allows(&self, depth: usize) -> bool {
        depth <= self.max_depth
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
