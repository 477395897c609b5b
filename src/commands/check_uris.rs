//! Check URIs command

use nancy_pack::output::{OutputMode, UriCheckResult};

/// Validate listen URIs, failing if any is invalid
pub fn check_uris(uris: &[String], mode: OutputMode) -> anyhow::Result<()> {
    let result = UriCheckResult::check(uris);
    result.render(mode);

    if !result.valid {
        anyhow::bail!("{} invalid URI(s)", result.invalid_count());
    }

    Ok(())
}
