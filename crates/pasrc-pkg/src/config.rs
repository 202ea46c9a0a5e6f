//! Ambient knobs (§9 "never required for correctness"): every default here
//! matches what the loader/writer would do if `Config` didn't exist.

/// Configuration methods are kept in a wrapper around a [`Config`] reference
/// to prevent bloat in the interface of the loader/writer entry points.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    asset_size_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { asset_size_limit: limits::DEFAULT_ASSET_SIZE }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> ConfigGet<'_> {
        ConfigGet(self)
    }

    #[must_use]
    pub fn set(&mut self) -> ConfigSet<'_> {
        ConfigSet(self)
    }
}

/// Read-only view of [`Config`].
#[derive(Debug)]
#[repr(transparent)]
pub struct ConfigGet<'a>(&'a Config);

impl ConfigGet<'_> {
    /// The limit on the size of a single asset blob read from the archive.
    /// Assets over this size are rejected with a `GenericWarning`
    /// diagnostic rather than loaded.
    ///
    /// The returned value is in bytes, and defaults to
    /// [`limits::DEFAULT_ASSET_SIZE`].
    #[must_use]
    pub fn asset_size_limit(&self) -> usize {
        self.0.asset_size_limit
    }

    /// Whether `Entropy.json` fields unrecognized by this tool version are
    /// round-tripped verbatim (§4.4, §9). Always `true` — exposed so a
    /// caller can assert the guarantee rather than take it on faith.
    #[must_use]
    pub fn round_trips_unknown_entropy_fields(&self) -> bool {
        true
    }
}

/// Mutating view of [`Config`].
#[derive(Debug)]
#[repr(transparent)]
pub struct ConfigSet<'a>(&'a mut Config);

impl ConfigSet<'_> {
    /// The parameter is in bytes, and gets clamped between 0 and
    /// [`limits::MAX_ASSET_SIZE`]. The default is
    /// [`limits::DEFAULT_ASSET_SIZE`].
    pub fn asset_size_limit(self, limit: usize) -> Self {
        self.0.asset_size_limit = limit.clamp(0, limits::MAX_ASSET_SIZE);
        self
    }
}

pub mod limits {
    /// 1024 B * 1024 kB * 256 MB = 268435456 bytes.
    pub const DEFAULT_ASSET_SIZE: usize = 1024 * 1024 * 256;
    /// 1024 B * 1024 kB * 1024 MB * 4 GB = 4294967296 bytes.
    pub const MAX_ASSET_SIZE: usize = 1024 * 1024 * 1024 * 4;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_asset_size_limit_smoke() {
        let cfg = Config::new();
        assert_eq!(cfg.get().asset_size_limit(), limits::DEFAULT_ASSET_SIZE);
        assert!(cfg.get().round_trips_unknown_entropy_fields());
    }

    #[test]
    fn asset_size_limit_clamps_to_max() {
        let mut cfg = Config::new();
        cfg.set().asset_size_limit(usize::MAX);
        assert_eq!(cfg.get().asset_size_limit(), limits::MAX_ASSET_SIZE);
    }
}
