//! Target configuration.
//!
//! HVX registers come in two sizes. The table is instantiated once per size;
//! everything else (lane counts, intrinsic names, value types) follows from it.

use std::env;

use super::error::{LoweringError, LoweringResult};
use super::vector::{ElemWidth, VectorType, GRANULE_BITS};

/// Environment variable selecting the register size in bytes (`64` or `128`).
pub const VECTOR_BYTES_ENV: &str = "HVX_VECTOR_BYTES";

/// Environment variable overriding the symbol prefix of emitted entries.
pub const SYMBOL_PREFIX_ENV: &str = "HVX_SYMBOL_PREFIX";

pub const DEFAULT_SYMBOL_PREFIX: &str = "hvx";

/// HVX register size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VectorLength {
    /// 64-byte registers, 128-byte pairs.
    #[default]
    B64,
    /// 128-byte registers, 256-byte pairs.
    B128,
}

impl VectorLength {
    pub const fn bytes(self) -> usize {
        match self {
            VectorLength::B64 => 64,
            VectorLength::B128 => 128,
        }
    }

    /// Granules in one register.
    pub const fn register_granules(self) -> usize {
        self.bytes() * 8 / GRANULE_BITS as usize
    }

    /// Suffix appended to every `llvm.hexagon.V6.*` intrinsic name.
    pub const fn intrinsic_suffix(self) -> &'static str {
        match self {
            VectorLength::B64 => "",
            VectorLength::B128 => ".128B",
        }
    }

    pub fn from_bytes(bytes: usize) -> LoweringResult<Self> {
        match bytes {
            64 => Ok(VectorLength::B64),
            128 => Ok(VectorLength::B128),
            other => Err(LoweringError::InvalidConfig {
                reason: format!("unsupported HVX vector length {other} (expected 64 or 128)"),
            }),
        }
    }
}

/// Configuration for one instantiation of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub vector_length: VectorLength,
    pub symbol_prefix: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            vector_length: VectorLength::default(),
            symbol_prefix: DEFAULT_SYMBOL_PREFIX.to_string(),
        }
    }
}

impl TargetConfig {
    pub fn new(vector_length: VectorLength) -> Self {
        Self {
            vector_length,
            ..Self::default()
        }
    }

    /// Read `HVX_VECTOR_BYTES` and `HVX_SYMBOL_PREFIX`, falling back to defaults.
    pub fn from_env() -> LoweringResult<Self> {
        let mut config = Self::default();

        if let Ok(bytes) = env::var(VECTOR_BYTES_ENV) {
            let bytes = bytes.trim().parse::<usize>().map_err(|e| LoweringError::InvalidConfig {
                reason: format!("{VECTOR_BYTES_ENV}={bytes:?}: {e}"),
            })?;
            config.vector_length = VectorLength::from_bytes(bytes)?;
        }

        if let Ok(prefix) = env::var(SYMBOL_PREFIX_ENV) {
            config = config.with_symbol_prefix(prefix)?;
        }

        log::debug!(
            "target config: {}-byte vectors, prefix {:?}",
            config.vector_length.bytes(),
            config.symbol_prefix
        );
        Ok(config)
    }

    /// Replace the symbol prefix. It must be a non-empty LLVM identifier fragment.
    pub fn with_symbol_prefix(mut self, prefix: impl Into<String>) -> LoweringResult<Self> {
        let prefix = prefix.into();
        let valid = !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            && !prefix.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(LoweringError::InvalidConfig {
                reason: format!("invalid symbol prefix {prefix:?}"),
            });
        }
        self.symbol_prefix = prefix;
        Ok(self)
    }

    pub fn register_granules(&self) -> usize {
        self.vector_length.register_granules()
    }

    /// One native register viewed as words.
    pub fn single(&self) -> VectorType {
        VectorType::from_granules(ElemWidth::Word, self.register_granules())
    }

    /// A register pair viewed as words.
    pub fn pair(&self) -> VectorType {
        VectorType::from_granules(ElemWidth::Word, 2 * self.register_granules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_shapes() {
        let config = TargetConfig::default();
        assert_eq!(config.single().llvm(), "<16 x i32>");
        assert_eq!(config.pair().llvm(), "<32 x i32>");

        let wide = TargetConfig::new(VectorLength::B128);
        assert_eq!(wide.single().llvm(), "<32 x i32>");
        assert_eq!(wide.pair().llvm(), "<64 x i32>");
        assert_eq!(wide.vector_length.intrinsic_suffix(), ".128B");
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(VectorLength::from_bytes(128).unwrap(), VectorLength::B128);
        assert!(VectorLength::from_bytes(32).is_err());
    }

    #[test]
    fn test_symbol_prefix_validation() {
        let config = TargetConfig::default().with_symbol_prefix("halide.hexagon").unwrap();
        assert_eq!(config.symbol_prefix, "halide.hexagon");
        assert!(TargetConfig::default().with_symbol_prefix("").is_err());
        assert!(TargetConfig::default().with_symbol_prefix("9lives").is_err());
        assert!(TargetConfig::default().with_symbol_prefix("a b").is_err());
    }
}
