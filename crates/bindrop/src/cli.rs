use std::path::PathBuf;

use bindrop::MaterializeOptions;
use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(name = "bindrop", version = env!("CARGO_PKG_VERSION"), about = "Materialize a build drop onto local disk", long_about = None)]
pub struct App {
    /// Drop URI, e.g. `https://<account>/_apis/drop/drops/<name>`.
    #[arg(long = "drop", value_name = "URI")]
    pub drop_location: String,

    /// Manifest path prefix to materialize; only paths under it are written.
    #[arg(long)]
    pub root: Option<String>,

    /// Local destination root.
    #[arg(long = "dest", value_name = "DIR")]
    pub destination: PathBuf,

    /// Personal access token for the drop service.
    #[arg(long, env = "BINDROP_PAT", hide_env_values = true)]
    pub pat: Option<String>,

    /// Content groups materialized concurrently.
    #[arg(long, default_value_t = MaterializeOptions::DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl App {
    pub fn materialize_options(&self) -> MaterializeOptions {
        MaterializeOptions::new().max_concurrent(self.max_concurrent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let app = App::try_parse_from([
            "bindrop",
            "--drop",
            "https://acct.example.com/_apis/drop/drops/b/1",
            "--root",
            "retail",
            "--dest",
            "out",
        ])
        .unwrap();

        assert_eq!(app.root.as_deref(), Some("retail"));
        assert_eq!(app.destination, PathBuf::from("out"));
        assert_eq!(app.max_concurrent, 64);
        assert_eq!(app.log_level, "info");
    }

    #[test]
    fn test_root_is_optional_at_parse_time() {
        let app = App::try_parse_from(["bindrop", "--drop", "x", "--dest", "out"]).unwrap();
        assert!(app.root.is_none());
    }

    #[test]
    fn test_destination_is_required() {
        assert!(App::try_parse_from(["bindrop", "--drop", "x"]).is_err());
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let app = App::try_parse_from([
            "bindrop",
            "--drop",
            "x",
            "--dest",
            "out",
            "--max-concurrent",
            "0",
        ])
        .unwrap();
        assert_eq!(app.materialize_options().get_max_concurrent(), 1);
    }
}
