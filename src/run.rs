//! Run orchestration: gates, poll, stage, fetch, upload, publish

use log::info;
use serde_json::json;

use crate::client::{github, ScanApi};
use crate::config::{Settings, STAGING_DIR};
use crate::context::RunContext;
use crate::error::{ApiError, Error, Result};
use crate::output::{publish_links, OutputSink};
use crate::poll::{await_completion, PollReport};
use crate::stage::{ArtifactSpec, ArtifactStager};
use crate::upload::{upload, ArtifactSink};

/// Execute one run against an already-gated CI context.
///
/// Fatal errors bubble to the caller; a scan timeout and a missing archive
/// are warnings, and partial upload failure is reported as data by the
/// upload layer.
pub async fn run(
    ctx: &RunContext,
    api: &dyn ScanApi,
    sink: &dyn ArtifactSink,
    outputs: &OutputSink,
    settings: &Settings,
) -> Result<()> {
    let public = github::is_repo_public(
        &settings.github_api,
        settings.token.as_deref(),
        &ctx.owner,
        &ctx.repo,
    )
    .await?;
    if !public {
        return Err(Error::PrivateRepository);
    }

    if ctx.branch.is_none() {
        return Err(Error::Context("Branch name is not available".to_string()));
    }

    let key = ctx.scan_key();
    let report = await_completion(api, &key, &settings.retry).await?;

    let stager = ArtifactStager::new(settings.staging_dir.clone());
    let mut files = stager.stage(&artifact_specs(&report)?)?;

    if let Some(result_id) = report.record.as_ref().and_then(|r| r.id.as_deref()) {
        match api.download_sbom(&key, result_id).await {
            Ok(archive) => files.push(stager.write_archive(&archive)?),
            Err(Error::Api(ApiError::ArchiveNotFound)) => info!("No SBOM found"),
            Err(err) => return Err(err),
        }
    }

    let container = container_name(settings);
    let outcome = upload(sink, &container, &files, stager.dir()).await?;
    if outcome.success {
        info!("Uploaded {} artifact file(s)", files.len());
    }

    publish_links(outputs, &key, &settings.api_base, &settings.tools_base)?;
    Ok(())
}

/// The JSON artifacts to stage for this report. `scanSummary` is always
/// present (an empty object when the scan never produced one);
/// `staticResult` joins it when the record carries a per-file breakdown.
fn artifact_specs(report: &PollReport) -> Result<Vec<ArtifactSpec>> {
    let summary = match report.record.as_ref().and_then(|r| r.final_result.as_ref()) {
        Some(summary) => serde_json::to_value(summary)?,
        None => json!({}),
    };

    let mut specs = vec![ArtifactSpec::new("scanSummary", summary)];

    if let Some(static_result) = report.record.as_ref().and_then(|r| r.static_result.as_ref()) {
        specs.push(ArtifactSpec::new(
            "staticResult",
            serde_json::to_value(static_result)?,
        ));
    }

    Ok(specs)
}

fn container_name(settings: &Settings) -> String {
    settings
        .staging_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| STAGING_DIR.to_string())
}
