use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct NpmPackage {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub keywords: Vec<String>,
    pub versions: usize,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct PypiPackage {
    pub name: String,
    pub version: Option<String>,
    pub summary: Option<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub releases: usize,
}

/// PyPI exposes no download figures, so `pypi` stays at zero.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Downloads {
    pub npm: u64,
    pub pypi: u64,
    pub total: u64,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct PackageInfo {
    pub npm: Option<NpmPackage>,
    pub pypi: Option<PypiPackage>,
    pub downloads: Downloads,
}

impl PackageInfo {
    pub fn is_empty(&self) -> bool {
        self.npm.is_none() && self.pypi.is_none()
    }
}

/// Raw npm registry document, trimmed to what we read.
#[derive(Debug, Deserialize)]
pub struct NpmDocument {
    pub name: String,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: Option<NpmDistTags>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub license: Option<serde_json::Value>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub versions: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct NpmDistTags {
    pub latest: Option<String>,
}

impl From<NpmDocument> for NpmPackage {
    fn from(doc: NpmDocument) -> Self {
        // Old packages publish `license` as an object with a `type` field.
        let license = doc.license.and_then(|l| match l {
            serde_json::Value::String(s) => Some(s),
            other => other.get("type").and_then(|t| t.as_str()).map(str::to_string),
        });

        NpmPackage {
            name: doc.name,
            version: doc.dist_tags.and_then(|t| t.latest),
            description: doc.description,
            license,
            homepage: doc.homepage,
            keywords: doc.keywords.unwrap_or_default(),
            versions: doc.versions.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NpmDownloadPoint {
    #[serde(default)]
    pub downloads: u64,
}

#[derive(Debug, Deserialize)]
pub struct PypiDocument {
    pub info: PypiInfo,
    #[serde(default)]
    pub releases: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct PypiInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub home_page: Option<String>,
}

impl From<PypiDocument> for PypiPackage {
    fn from(doc: PypiDocument) -> Self {
        PypiPackage {
            name: doc.info.name,
            version: doc.info.version,
            summary: doc.info.summary,
            license: doc.info.license,
            homepage: doc.info.home_page,
            releases: doc.releases.len(),
        }
    }
}
