//! JSON snapshot persistence.
//!
//! Every artifact is written twice: `<name>.json` pretty-printed with a
//! four-space indent for humans, and `<name>.min.json` minified for
//! consumers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

pub struct ArtifactStore {
    out_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;
        Ok(Self { out_dir })
    }

    /// Persists both renderings of one artifact.
    pub async fn write(&self, name: &str, value: &impl Serialize) -> Result<()> {
        let pretty = to_pretty_json(value)?;
        let minified = serde_json::to_string(value)?;

        let pretty_path = self.out_dir.join(format!("{name}.json"));
        let min_path = self.out_dir.join(format!("{name}.min.json"));

        tokio::fs::write(&pretty_path, pretty)
            .await
            .with_context(|| format!("writing {}", pretty_path.display()))?;
        tokio::fs::write(&min_path, minified)
            .await
            .with_context(|| format!("writing {}", min_path.display()))?;

        info!("Wrote {name}.json and {name}.min.json");
        Ok(())
    }
}

fn to_pretty_json(value: &impl Serialize) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}
