//! depindex error codes
//!
//! Error codes follow the pattern: DEP-{CATEGORY}-{3-digit number}
//!
//! Categories:
//! - IO: Repository discovery errors (root unreadable)
//! - STO: Storage errors (write/read failures, corrupt payloads)
//! - QRY: Query-related errors (index missing)
//! - ANA: Analyzer errors (grammar or analyzer setup)
//! - CFG: Configuration errors (filter patterns)
//! - SYS: Runtime environment errors
//!
//! Each error code is stable and should not be reused.

/// Repository root cannot be read
pub const DEP_IO_001_ROOT_UNREADABLE: &str = "DEP-IO-001";

/// Storage backend I/O failure
pub const DEP_STO_001_IO: &str = "DEP-STO-001";

/// Stored index could not be encoded or decoded
pub const DEP_STO_002_CORRUPT_INDEX: &str = "DEP-STO-002";

/// No index persisted for the repository
pub const DEP_QRY_001_INDEX_NOT_FOUND: &str = "DEP-QRY-001";

/// Registered analyzer failed to initialize
pub const DEP_ANA_001_ANALYZER_INIT: &str = "DEP-ANA-001";

/// Include/exclude glob failed to compile
pub const DEP_CFG_001_INVALID_PATTERN: &str = "DEP-CFG-001";

/// Worker pool could not be started
pub const DEP_SYS_001_WORKER_POOL: &str = "DEP-SYS-001";

/// Error code documentation
///
/// | Code | Description | Remediation |
/// |------|-------------|-------------|
/// | DEP-IO-001 | Repository root unreadable | Check the `--root` path exists and is a readable directory |
/// | DEP-STO-001 | Storage I/O failure | Check store directory permissions and free space; rerun the build |
/// | DEP-STO-002 | Corrupt stored index | Rebuild the index with `depindex build` |
/// | DEP-QRY-001 | Index not found | Run `depindex build` for the repository first |
/// | DEP-ANA-001 | Analyzer init failed | Rebuild the binary; the bundled grammar failed to load |
/// | DEP-CFG-001 | Invalid filter pattern | Fix the `--include` / `--exclude` glob syntax |
/// | DEP-SYS-001 | Worker pool failure | Lower `--workers` or check thread limits |
pub const ERROR_CODE_DOCUMENTATION: &str = "Error code documentation available in source";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique_and_well_formed() {
        let mut seen = std::collections::HashSet::new();
        for code in [
            DEP_IO_001_ROOT_UNREADABLE,
            DEP_STO_001_IO,
            DEP_STO_002_CORRUPT_INDEX,
            DEP_QRY_001_INDEX_NOT_FOUND,
            DEP_ANA_001_ANALYZER_INIT,
            DEP_CFG_001_INVALID_PATTERN,
            DEP_SYS_001_WORKER_POOL,
        ] {
            assert!(seen.insert(code), "Duplicate error code: {}", code);
            let parts: Vec<&str> = code.split('-').collect();
            assert_eq!(parts.len(), 3, "{}", code);
            assert_eq!(parts[0], "DEP");
            assert_eq!(parts[2].len(), 3);
        }
    }
}
