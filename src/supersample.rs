//! Super-sampling policy for the CLI: `-a/--anti-alias` implies factor 4;
//! `-s/--super-sampling N` (1..=32) overrides it. The actual box filter
//! lives on [`Canvas::downsample`](crate::canvas::Canvas).

use crate::error::CliError;

/// Resolve the CLI's anti-alias/super-sampling flags into a single
/// super-sampling factor.
pub fn resolve_factor(anti_alias: bool, super_sampling: Option<u32>) -> Result<u32, CliError> {
    match super_sampling {
        Some(n) => {
            if (1..=32).contains(&n) {
                Ok(n)
            } else {
                Err(CliError::BadArgs(format!(
                    "--super-sampling must be in 1..=32, got {n}"
                )))
            }
        }
        None => Ok(if anti_alias { 4 } else { 1 }),
    }
}
