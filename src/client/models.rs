//! Wire models for the scan platform API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identity of one scan job: repository plus commit, with an optional branch.
///
/// Built once per run from the CI context and passed explicitly to every
/// component that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanKey {
    pub owner: String,
    pub repo: String,
    pub sha: String,
    pub branch: Option<String>,
}

impl ScanKey {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        sha: impl Into<String>,
        branch: Option<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            sha: sha.into(),
            branch,
        }
    }

    /// Request path for the commit status endpoint. The branch segment is
    /// included only when the key carries one.
    pub fn status_path(&self) -> String {
        match &self.branch {
            Some(branch) => format!("/gha/{}/{}/{}/{}", self.owner, self.repo, branch, self.sha),
            None => format!("/gha/{}/{}/{}", self.owner, self.repo, self.sha),
        }
    }

    /// Request path for the SBOM archive endpoint.
    pub fn sbom_path(&self, result_id: &str) -> String {
        format!(
            "/gh/{}/{}/{}/sbom/{}",
            self.owner, self.repo, self.sha, result_id
        )
    }
}

/// Commit record returned by the status endpoint.
///
/// Depending on the deployment, `scanResult` is either a single result object
/// or a list whose first element is the latest result; both shapes normalize
/// to `Option<ScanRecord>`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    #[serde(default, deserialize_with = "one_or_many")]
    pub scan_result: Option<ScanRecord>,
}

/// One scan result. `scan_end_at` present means the scan finished;
/// `id` present means a downloadable archive may exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_end_at: Option<DateTime<Utc>>,

    /// Per-file findings breakdown, present on some deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_result: Option<Vec<FileFindings>>,

    /// Aggregated summary with the embedded bill of materials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_result: Option<ScanSummary>,
}

impl ScanRecord {
    pub fn is_finished(&self) -> bool {
        self.scan_end_at.is_some()
    }
}

/// Aggregated scan summary: BOM document plus vulnerability/malware findings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bom: Option<String>,

    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,

    #[serde(default)]
    pub malware: Vec<MalwareHit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saasbom: Option<Value>,
}

/// Vulnerability findings for one dependency path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub path: String,
    pub tag: String,
    #[serde(default)]
    pub cves: Vec<CveEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CveEntry {
    pub name: String,
    pub score: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MalwareHit {
    pub path: String,
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default)]
    pub is_calculate: bool,
}

/// Per-file static analysis entry. The nested detail shapes vary widely by
/// language ecosystem, so they stay as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFindings {
    pub file_path: String,
    pub lang_type: String,
    #[serde(default)]
    pub details: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve: Option<Value>,
}

/// Downloaded SBOM archive with its server-supplied filename.
#[derive(Debug, Clone)]
pub struct SbomArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Option<ScanRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        One(ScanRecord),
        Many(Vec<ScanRecord>),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        None => None,
        Some(Repr::One(record)) => Some(record),
        Some(Repr::Many(records)) => records.into_iter().next(),
    })
}
