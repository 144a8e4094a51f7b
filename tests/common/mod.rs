/// Common test utilities and mock infrastructure
///
/// This module provides shared functionality for integration tests including:
/// - A throwaway NAS layout under a TempDir
/// - Canned identify reports standing in for hdparm

pub mod mock_identify;
pub mod mock_nas;
