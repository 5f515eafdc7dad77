//! Chart definition and loading

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Chart metadata from `Chart.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    /// Chart name (required)
    pub name: String,

    /// Chart version; overwritten with the release version at package time
    pub version: String,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Application version
    #[serde(default)]
    pub app_version: Option<String>,

    /// Keywords for search
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Maintainers
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
}

/// Maintainer information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Declared chart dependencies from `requirements.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub dependencies: Vec<Requirement>,
}

/// One declared dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub repository: Option<String>,
}

/// Chart loaded from a source directory with resolved paths
#[derive(Debug, Clone)]
pub struct LoadedChart {
    /// Chart definition
    pub chart: Chart,

    /// Root directory of the chart
    pub root: PathBuf,

    /// Declared dependencies, if a requirements file exists
    pub requirements: Option<Requirements>,
}

impl LoadedChart {
    /// Load a chart from a directory.
    ///
    /// A missing `requirements.yaml` is not an error and is treated as
    /// "no dependencies".
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();

        if !root.exists() {
            return Err(CoreError::ChartNotFound {
                path: root.display().to_string(),
            });
        }

        let chart_file = root.join("Chart.yaml");
        if !chart_file.exists() {
            return Err(CoreError::InvalidChart {
                message: format!("Chart.yaml not found in {}", root.display()),
            });
        }

        let content = std::fs::read_to_string(&chart_file)?;
        let chart: Chart = serde_yaml::from_str(&content)?;

        if chart.name.is_empty() {
            return Err(CoreError::InvalidChart {
                message: "Chart.yaml name must not be empty".to_string(),
            });
        }

        let requirements_file = root.join("requirements.yaml");
        let requirements = if requirements_file.exists() {
            let content = std::fs::read_to_string(&requirements_file)?;
            Some(serde_yaml::from_str(&content)?)
        } else {
            None
        };

        Ok(Self {
            chart,
            root,
            requirements,
        })
    }

    /// Directory basename of the chart root
    pub fn dir_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Verify every declared dependency is vendored under `charts/`.
    ///
    /// A dependency is satisfied by either an unpacked `charts/<name>/`
    /// directory or a `charts/<name>-*.tgz` archive.
    pub fn check_dependencies(&self) -> Result<()> {
        let Some(requirements) = &self.requirements else {
            return Ok(());
        };

        let charts_dir = self.root.join("charts");

        for dep in &requirements.dependencies {
            if !dependency_vendored(&charts_dir, &dep.name) {
                return Err(CoreError::UnsatisfiedDependency {
                    name: dep.name.clone(),
                    version: dep.version.clone(),
                });
            }
        }

        Ok(())
    }
}

fn dependency_vendored(charts_dir: &Path, name: &str) -> bool {
    if charts_dir.join(name).is_dir() {
        return true;
    }

    let Ok(entries) = std::fs::read_dir(charts_dir) else {
        return false;
    };

    let archive_prefix = format!("{}-", name);
    entries.filter_map(|e| e.ok()).any(|e| {
        let file_name = e.file_name().to_string_lossy().to_string();
        file_name.starts_with(&archive_prefix) && file_name.ends_with(".tgz")
    })
}
