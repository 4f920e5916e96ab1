use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use directory_resolver::{DEFAULT_CONFIG_PATH, DirectoryBridge, DirectoryConfig, PasswdEntry};
use directory_resolver_sdk::Lookup;

/// Exit status for "not found" and "denied".
pub const EXIT_NEGATIVE: u8 = 2;

#[derive(Args)]
pub struct CommonArgs {
    /// Configuration file; `DIRBRIDGE_*` environment variables override it
    #[arg(short = 'c', long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

impl CommonArgs {
    pub fn load_config(&self) -> anyhow::Result<DirectoryConfig> {
        DirectoryConfig::load_with_env(&self.config)
            .with_context(|| format!("loading {}", self.config.display()))
    }

    pub fn bridge(&self) -> anyhow::Result<(DirectoryConfig, DirectoryBridge)> {
        let config = self.load_config()?;
        let bridge = DirectoryBridge::with_config(config.clone());
        Ok((config, bridge))
    }
}

/// Print a lookup outcome and pick the exit status.
pub fn print_lookup(lookup: Lookup, config: &DirectoryConfig, json: bool) -> ExitCode {
    match lookup {
        Lookup::Found(identity) => {
            let entry = PasswdEntry::from_identity(&identity, &config.passwd);
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "found": true,
                        "uid": entry.uid,
                        "gid": entry.gid,
                        "name": entry.name,
                        "gecos": entry.gecos,
                        "home": entry.dir,
                        "shell": entry.shell,
                    })
                );
            } else {
                println!("{entry}");
            }
            ExitCode::SUCCESS
        }
        Lookup::NotFound => {
            if json {
                println!("{}", serde_json::json!({ "found": false }));
            } else {
                eprintln!("not found");
            }
            ExitCode::from(EXIT_NEGATIVE)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(path: PathBuf) -> CommonArgs {
        CommonArgs {
            config: path,
            json: false,
        }
    }

    #[test]
    fn test_load_yaml_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: https://dir.example.com/nss\nresponse_capacity: 512").unwrap();

        let config = args_for(file.path().to_path_buf()).load_config().unwrap();
        assert_eq!(config.base_url, "https://dir.example.com/nss");
        assert_eq!(config.response_capacity, 512);
        assert!(config.endpoint().unwrap().is_https());
    }

    #[test]
    fn test_missing_config_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.conf");
        let err = args_for(path.clone()).load_config().unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }
}
