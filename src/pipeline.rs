//! Coordinating module for the documentation pipeline.
//!
//! Loads the tool catalog once, derives a slug per tool, then fans each
//! requested stage out over the units with `join_all`. A unit's failure is
//! recorded in the run report and never aborts its siblings; only unusable
//! inputs (catalog, output directory) are fatal.

use std::collections::BTreeSet;
use std::path::Path;

use futures::future::join_all;
use tokio::fs;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::catalog::{self, CatalogError, ToolRecord};
use crate::compose::{self, ToolFragments, DEFAULT_TOOL_TEMPLATE};
use crate::config::RunConfig;
use crate::contract::{ComposedDocument, Fragment, FragmentKind, TextGenerator};
use crate::family;
use crate::frontmatter::Stamp;
use crate::normalize::NormalizationTables;
use crate::sections;
use crate::slug::build_base_file_name;

/// Pipeline stages in canonical execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Annotations,
    Parameters,
    Examples,
    Compose,
    Families,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Annotations,
        Stage::Parameters,
        Stage::Examples,
        Stage::Compose,
        Stage::Families,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Annotations => "annotations",
            Stage::Parameters => "parameters",
            Stage::Examples => "examples",
            Stage::Compose => "compose",
            Stage::Families => "families",
        }
    }
}

/// A note attached to one unit (tool slug or family slug) in a stage report.
#[derive(Debug)]
pub struct UnitNote {
    pub unit: String,
    pub detail: String,
}

/// Outcome counts for one stage plus per-unit notes.
#[derive(Debug)]
pub struct StageReport {
    pub stage: Stage,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub notes: Vec<UnitNote>,
}

/// Aggregated outcome of one run, printed by the CLI on completion.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub tool_count: usize,
    pub duplicate_slugs: Vec<String>,
    pub stages: Vec<StageReport>,
}

/// Why the run could not start or continue. Per-unit trouble never lands
/// here; it goes into the report instead.
#[derive(Debug)]
pub enum PipelineError {
    Catalog(CatalogError),
    Io(std::io::Error),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Catalog(e) => write!(f, "{e}"),
            PipelineError::Io(e) => write!(f, "output directory unusable: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Catalog(e) => Some(e),
            PipelineError::Io(e) => Some(e),
        }
    }
}

impl From<CatalogError> for PipelineError {
    fn from(e: CatalogError) -> Self {
        PipelineError::Catalog(e)
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Io(e)
    }
}

/// One catalog tool with its derived slug. Slugs are unique within a run;
/// later tools that collide are dropped up front.
struct Unit {
    slug: String,
    tool: ToolRecord,
}

enum Outcome {
    Generated,
    Skipped,
    Failed,
}

struct UnitResult {
    unit: String,
    outcome: Outcome,
    notes: Vec<String>,
}

impl UnitResult {
    fn generated(unit: &str) -> Self {
        UnitResult {
            unit: unit.to_string(),
            outcome: Outcome::Generated,
            notes: Vec::new(),
        }
    }

    fn skipped(unit: &str, detail: impl Into<String>) -> Self {
        UnitResult {
            unit: unit.to_string(),
            outcome: Outcome::Skipped,
            notes: vec![detail.into()],
        }
    }

    fn failed(unit: &str, detail: impl Into<String>) -> Self {
        UnitResult {
            unit: unit.to_string(),
            outcome: Outcome::Failed,
            notes: vec![detail.into()],
        }
    }

    fn note(mut self, detail: impl Into<String>) -> Self {
        self.notes.push(detail.into());
        self
    }
}

/// Entrypoint: run the requested stages and aggregate the run report.
pub async fn run_stages<G>(
    config: &RunConfig,
    generator: Option<&G>,
    stages: &[Stage],
) -> Result<RunReport, PipelineError>
where
    G: TextGenerator + ?Sized,
{
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, stages = ?stages, "Starting documentation run");

    let tools = catalog::load_catalog(&config.catalog_path)?;
    let tool_count = tools.len();
    let (units, duplicate_slugs) = plan_units(&config.tables, tools);

    fs::create_dir_all(&config.output_dir).await.map_err(|e| {
        error!(
            output_dir = %config.output_dir.display(),
            error = %e,
            "Failed to create output directory"
        );
        e
    })?;

    let stamp = Stamp::new(config.version.clone());
    let mut reports = Vec::new();
    for stage in stages {
        info!(stage = stage.name(), units = units.len(), "Starting stage");
        let report = match stage {
            Stage::Annotations => run_annotations(&units, &config.output_dir, &stamp).await,
            Stage::Parameters => run_parameters(&units, &config.output_dir, &stamp).await,
            Stage::Examples => {
                run_examples(generator, &units, &config.output_dir, &stamp).await
            }
            Stage::Compose => run_compose(config, generator, &units, &stamp).await,
            Stage::Families => run_families(config, generator, &units, &stamp).await,
        };
        info!(
            stage = report.stage.name(),
            generated = report.generated,
            skipped = report.skipped,
            failed = report.failed,
            "Stage finished"
        );
        reports.push(report);
    }

    Ok(RunReport {
        run_id,
        tool_count,
        duplicate_slugs,
        stages: reports,
    })
}

/// Derive slugs and drop later tools whose slug collides with an earlier one.
fn plan_units(tables: &NormalizationTables, tools: Vec<ToolRecord>) -> (Vec<Unit>, Vec<String>) {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut units = Vec::new();
    let mut duplicates = Vec::new();
    for tool in tools {
        let slug = build_base_file_name(tables, &tool.command);
        if seen.insert(slug.clone()) {
            units.push(Unit { slug, tool });
        } else {
            warn!(slug = %slug, command = %tool.command, "Duplicate slug, skipping tool");
            duplicates.push(slug);
        }
    }
    (units, duplicates)
}

async fn run_annotations(units: &[Unit], output_dir: &Path, stamp: &Stamp) -> StageReport {
    let tasks = units.iter().map(|unit| async move {
        match sections::annotations_fragment(&unit.tool, &unit.slug, stamp) {
            Some(fragment) => write_fragment(output_dir, &fragment).await,
            None => UnitResult::skipped(&unit.slug, "no annotation metadata"),
        }
    });
    fold_results(Stage::Annotations, join_all(tasks).await)
}

async fn run_parameters(units: &[Unit], output_dir: &Path, stamp: &Stamp) -> StageReport {
    let tasks = units.iter().map(|unit| async move {
        match sections::parameters_fragment(&unit.tool, &unit.slug, stamp) {
            Some(fragment) => write_fragment(output_dir, &fragment).await,
            None => UnitResult::skipped(&unit.slug, "no parameters"),
        }
    });
    fold_results(Stage::Parameters, join_all(tasks).await)
}

async fn run_examples<G>(
    generator: Option<&G>,
    units: &[Unit],
    output_dir: &Path,
    stamp: &Stamp,
) -> StageReport
where
    G: TextGenerator + ?Sized,
{
    let Some(generator) = generator else {
        info!(
            units = units.len(),
            "Text generation disabled, skipping example prompts"
        );
        let results = units
            .iter()
            .map(|unit| UnitResult::skipped(&unit.slug, "text generation disabled"))
            .collect();
        return fold_results(Stage::Examples, results);
    };

    let tasks = units.iter().map(|unit| async move {
        match sections::example_prompts_fragment(generator, &unit.tool, &unit.slug, stamp).await {
            Ok(Some(fragment)) => write_fragment(output_dir, &fragment).await,
            Ok(None) => UnitResult::skipped(&unit.slug, "empty generator reply"),
            Err(e) => {
                warn!(slug = %unit.slug, error = %e, "Example prompt generation failed");
                UnitResult::failed(&unit.slug, format!("generation failed: {e}"))
            }
        }
    });
    fold_results(Stage::Examples, join_all(tasks).await)
}

async fn run_compose<G>(
    config: &RunConfig,
    generator: Option<&G>,
    units: &[Unit],
    stamp: &Stamp,
) -> StageReport
where
    G: TextGenerator + ?Sized,
{
    let template = config.template.as_deref().unwrap_or(DEFAULT_TOOL_TEMPLATE);
    let output_dir = config.output_dir.as_path();
    let improve = config.improve;

    let tasks = units.iter().map(|unit| async move {
        let (fragments, missing) = read_fragments(output_dir, &unit.slug).await;
        let document = compose::compose(template, &unit.slug, &unit.tool, &fragments, stamp);

        let (document, improve_note) = match (improve, generator) {
            (true, Some(generator)) => match compose::improve(generator, &document, stamp).await {
                Ok(improved) => (improved, None),
                Err(e) => {
                    warn!(
                        slug = %unit.slug,
                        error = %e,
                        "Improvement pass failed, keeping composed body"
                    );
                    (document, Some(format!("improvement failed: {e}")))
                }
            },
            (true, None) => (
                document,
                Some("improvement skipped: text generation disabled".to_string()),
            ),
            (false, _) => (document, None),
        };

        let path = output_dir.join(format!("{}.complete.md", unit.slug));
        let mut result = write_page(&path, &unit.slug, &document.body).await;
        for suffix in missing {
            result = result.note(format!("missing {suffix} fragment"));
        }
        if let Some(detail) = improve_note {
            result = result.note(detail);
        }
        result
    });
    fold_results(Stage::Compose, join_all(tasks).await)
}

async fn run_families<G>(
    config: &RunConfig,
    generator: Option<&G>,
    units: &[Unit],
    stamp: &Stamp,
) -> StageReport
where
    G: TextGenerator + ?Sized,
{
    let output_dir = config.output_dir.as_path();

    let reads = units.iter().map(|unit| async move {
        let path = output_dir.join(format!("{}.complete.md", unit.slug));
        fs::read_to_string(&path)
            .await
            .map(|body| ComposedDocument {
                slug: unit.slug.clone(),
                body,
            })
            .map_err(|e| (unit.slug.clone(), e))
    });

    let mut documents = Vec::new();
    let mut pre_notes: Vec<UnitNote> = Vec::new();
    for read in join_all(reads).await {
        match read {
            Ok(document) => documents.push(document),
            Err((slug, e)) => {
                warn!(slug = %slug, error = %e, "Composed page unavailable for family assembly");
                pre_notes.push(UnitNote {
                    unit: slug,
                    detail: format!("composed page unavailable: {e}"),
                });
            }
        }
    }

    let areas: Vec<String> = units
        .iter()
        .map(|unit| unit.tool.area().to_string())
        .collect();
    let (groups, unassigned) = family::group_by_family(&config.tables, documents, &areas);
    for slug in unassigned {
        pre_notes.push(UnitNote {
            unit: slug,
            detail: "matched no family".to_string(),
        });
    }

    let tasks = groups
        .iter()
        .filter(|group| !group.members.is_empty())
        .map(|group| async move {
            let assembled =
                family::assemble_family(generator, &group.family_slug, &group.members, stamp)
                    .await;
            let path = output_dir.join(format!("{}.md", group.family_slug));
            let mut result = write_page(&path, &group.family_slug, &assembled.document.body).await;
            if assembled.metadata_fallback {
                result = result.note("static metadata fallback");
            }
            if assembled.related_fallback {
                result = result.note("static related content fallback");
            }
            result
        });
    let mut results = join_all(tasks).await;
    for group in groups.iter().filter(|group| group.members.is_empty()) {
        results.push(UnitResult::skipped(&group.family_slug, "no composed members"));
    }

    let mut report = fold_results(Stage::Families, results);
    report.notes.extend(pre_notes);
    report
}

/// Read whichever fragment files exist for a slug. Absent files substitute
/// as empty strings at composition; their suffixes come back for the report.
async fn read_fragments(output_dir: &Path, slug: &str) -> (ToolFragments, Vec<&'static str>) {
    let mut fragments = ToolFragments::default();
    let mut missing = Vec::new();
    for kind in FragmentKind::ALL {
        let path = output_dir.join(kind.file_name(slug));
        match fs::read_to_string(&path).await {
            Ok(content) => match kind {
                FragmentKind::Annotations => fragments.annotations = Some(content),
                FragmentKind::Parameters => fragments.parameters = Some(content),
                FragmentKind::ExamplePrompts => fragments.example_prompts = Some(content),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(slug, file = %path.display(), "Fragment file absent");
                missing.push(kind.file_suffix());
            }
            Err(e) => {
                warn!(slug, file = %path.display(), error = %e, "Failed to read fragment file");
                missing.push(kind.file_suffix());
            }
        }
    }
    (fragments, missing)
}

async fn write_fragment(output_dir: &Path, fragment: &Fragment) -> UnitResult {
    let path = output_dir.join(fragment.kind.file_name(&fragment.slug));
    write_page(&path, &fragment.slug, &fragment.content).await
}

async fn write_page(path: &Path, unit: &str, content: &str) -> UnitResult {
    match fs::write(path, content).await {
        Ok(()) => {
            info!(path = %path.display(), "Wrote page");
            UnitResult::generated(unit)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to write page");
            UnitResult::failed(unit, format!("write failed: {e}"))
        }
    }
}

fn fold_results(stage: Stage, results: Vec<UnitResult>) -> StageReport {
    let mut report = StageReport {
        stage,
        generated: 0,
        skipped: 0,
        failed: 0,
        notes: Vec::new(),
    };
    for result in results {
        match result.outcome {
            Outcome::Generated => report.generated += 1,
            Outcome::Skipped => report.skipped += 1,
            Outcome::Failed => report.failed += 1,
        }
        for detail in result.notes {
            report.notes.push(UnitNote {
                unit: result.unit.clone(),
                detail,
            });
        }
    }
    report
}
