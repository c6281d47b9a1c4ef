// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use std::{fs, path::Path};

/// Read a yaml file and substitute `$VAR` / `${VAR}` references from the environment.
///
/// A missing file is returned as an `io::Error` with `NotFound` so callers can tell "no config"
/// apart from "bad config".
pub fn load_yaml_with_env(file_path: &Path) -> Result<String> {
    let content = fs::read_to_string(file_path)?;
    Ok(shellexpand::env(&content)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_yaml_env_substitution() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("cloak.config.yaml");
        let mut file = File::create(&file_path)?;

        writeln!(
            file,
            "coprocessor:\n  url: $CLOAK_TEST_RELAYER\n  gateway_chain_id: ${{CLOAK_TEST_GATEWAY}}"
        )?;

        std::env::set_var("CLOAK_TEST_RELAYER", "https://relayer.local");
        std::env::set_var("CLOAK_TEST_GATEWAY", "55815");

        let processed = load_yaml_with_env(&file_path)?;

        assert!(processed.contains("https://relayer.local"));
        assert!(processed.contains("55815"));

        Ok(())
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_yaml_with_env(Path::new("/definitely/not/here.yaml")).unwrap_err();
        let io = err.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }
}
