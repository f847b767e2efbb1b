use std::{env, mem};

/// Ceiling on how far a single arena may grow past its start (1 MiB).
pub const MAX_HEAP_BYTES: usize = 1024 * 1024;

/// Rounding granularity for every block size: one machine word.
pub const ALIGNMENT: usize = mem::size_of::<usize>();

/// Environment variable read by [`HeapConfig::from_env`].
pub const MAX_HEAP_BYTES_ENV: &str = "BRKALLOC_MAX_HEAP_BYTES";

/// Per-arena settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  pub max_heap_bytes: usize,
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self {
      max_heap_bytes: MAX_HEAP_BYTES,
    }
  }
}

impl HeapConfig {
  pub fn with_max_heap_bytes(max_heap_bytes: usize) -> Self {
    Self { max_heap_bytes }
  }

  /// Reads the ceiling from `BRKALLOC_MAX_HEAP_BYTES`, keeping the default
  /// when the variable is missing or not a decimal number.
  pub fn from_env() -> Self {
    match env::var(MAX_HEAP_BYTES_ENV) {
      Ok(raw) => Self::parse(&raw).unwrap_or_default(),
      Err(_) => Self::default(),
    }
  }

  fn parse(raw: &str) -> Option<Self> {
    raw
      .trim()
      .parse::<usize>()
      .ok()
      .map(Self::with_max_heap_bytes)
  }
}

#[cfg(test)]
mod tests {
  use serial_test::serial;

  use super::*;

  #[test]
  fn default_uses_build_time_ceiling() {
    assert_eq!(HeapConfig::default().max_heap_bytes, MAX_HEAP_BYTES);
  }

  #[test]
  fn parse_accepts_decimal_only() {
    assert_eq!(
      HeapConfig::parse(" 4096 "),
      Some(HeapConfig::with_max_heap_bytes(4096))
    );
    assert_eq!(HeapConfig::parse("0x1000"), None);
    assert_eq!(HeapConfig::parse("-1"), None);
    assert_eq!(HeapConfig::parse(""), None);
  }

  #[test]
  #[serial]
  fn from_env_reads_the_ceiling() {
    unsafe { env::set_var(MAX_HEAP_BYTES_ENV, "65536") };
    assert_eq!(HeapConfig::from_env(), HeapConfig::with_max_heap_bytes(65536));

    unsafe { env::set_var(MAX_HEAP_BYTES_ENV, "lots") };
    assert_eq!(HeapConfig::from_env(), HeapConfig::default());

    unsafe { env::remove_var(MAX_HEAP_BYTES_ENV) };
    assert_eq!(HeapConfig::from_env(), HeapConfig::default());
  }
}
