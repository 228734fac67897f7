//! Family assembler: groups composed tool documents by resolved brand prefix
//! and stitches each group into one per-namespace page. Metadata and
//! related-content come from the external text generator when available and
//! from static fallbacks when not; only the stitch phase is deterministic.

use tracing::{debug, info, warn};

use crate::compose::title_from_slug;
use crate::contract::{
    ComposedDocument, FamilyDocument, GenerationPurpose, GenerationRequest, TextGenerator,
};
use crate::frontmatter::{self, Stamp};
use crate::normalize::NormalizationTables;
use crate::slug::{ensure_azure_prefix, strip_azure_prefix};

/// One family: the area token it came from, the azure-prefixed slug its
/// output file uses, and the composed members assigned to it.
#[derive(Debug)]
pub struct FamilyGroup {
    pub area: String,
    pub family_slug: String,
    pub members: Vec<ComposedDocument>,
}

/// Assign each composed document to at most one family.
///
/// Primary rule: the slug, stripped of its "azure-" prefix, equals the
/// family's resolved brand prefix (also azure-stripped) or starts with it
/// plus `-`. Families are tried longest prefix first so overlapping prefixes
/// cannot claim the same document twice. Families left empty get a second
/// pass over the unassigned documents with the data-driven candidate
/// prefixes (`ai-{area}` and friends). Returns the groups in area order plus
/// the slugs that matched no family.
pub fn group_by_family(
    tables: &NormalizationTables,
    documents: Vec<ComposedDocument>,
    areas: &[String],
) -> (Vec<FamilyGroup>, Vec<String>) {
    struct Entry {
        area: String,
        family_slug: String,
        stripped_prefix: String,
        members: Vec<ComposedDocument>,
    }

    let mut entries: Vec<Entry> = Vec::new();
    for area in areas {
        let resolved = tables.resolve_brand_prefix(area);
        let family_slug = ensure_azure_prefix(&resolved);
        // Distinct areas can resolve to the same prefix; one family per slug.
        if entries.iter().any(|entry| entry.family_slug == family_slug) {
            continue;
        }
        let stripped_prefix = strip_azure_prefix(&family_slug).to_string();
        entries.push(Entry {
            area: area.clone(),
            family_slug,
            stripped_prefix,
            members: Vec::new(),
        });
    }

    // Longest resolved prefix wins when prefixes overlap.
    let mut match_order: Vec<usize> = (0..entries.len()).collect();
    match_order.sort_by(|a, b| {
        entries[*b]
            .stripped_prefix
            .len()
            .cmp(&entries[*a].stripped_prefix.len())
    });

    let mut unassigned: Vec<ComposedDocument> = Vec::new();
    for document in documents {
        let stripped_slug = strip_azure_prefix(&document.slug).to_string();
        let target = match_order
            .iter()
            .copied()
            .find(|index| prefix_matches(&stripped_slug, &entries[*index].stripped_prefix));
        match target {
            Some(index) => entries[index].members.push(document),
            None => unassigned.push(document),
        }
    }

    // Fallback pass for families the primary rule left empty.
    for entry in entries.iter_mut().filter(|entry| entry.members.is_empty()) {
        let candidates = tables.candidate_family_prefixes(&entry.area);
        let mut still_unassigned = Vec::new();
        for document in unassigned.drain(..) {
            let stripped_slug = strip_azure_prefix(&document.slug);
            if candidates
                .iter()
                .any(|candidate| prefix_matches(stripped_slug, candidate))
            {
                debug!(
                    area = %entry.area,
                    slug = %document.slug,
                    "Assigned document to family via candidate prefix"
                );
                entry.members.push(document);
            } else {
                still_unassigned.push(document);
            }
        }
        unassigned = still_unassigned;
    }

    let leftovers: Vec<String> = unassigned
        .into_iter()
        .map(|document| document.slug)
        .collect();
    for slug in &leftovers {
        warn!(slug = %slug, "Composed document matched no family");
    }

    let groups = entries
        .into_iter()
        .map(|entry| FamilyGroup {
            area: entry.area,
            family_slug: entry.family_slug,
            members: entry.members,
        })
        .collect();
    (groups, leftovers)
}

fn prefix_matches(stripped_slug: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    stripped_slug == prefix
        || stripped_slug
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('-'))
}

/// The assembled family document plus which phases fell back to static text.
#[derive(Debug)]
pub struct AssembledFamily {
    pub document: FamilyDocument,
    pub metadata_fallback: bool,
    pub related_fallback: bool,
}

/// Assemble one family document in three phases: metadata (frontmatter + H1,
/// optionally an LLM overview), the stitched member bodies, and the
/// related-content section. Generation failures downgrade to static
/// fallbacks; assembly itself never fails.
pub async fn assemble_family<G>(
    generator: Option<&G>,
    family_slug: &str,
    members: &[ComposedDocument],
    stamp: &Stamp,
) -> AssembledFamily
where
    G: TextGenerator + ?Sized,
{
    let display = title_from_slug(family_slug);
    let header = format!(
        "{}\n# {display}",
        frontmatter::render(stamp, &[("title", &display)])
    );

    let member_slugs: Vec<&str> = members.iter().map(|member| member.slug.as_str()).collect();
    let overview = generate_or_fallback(
        generator,
        GenerationPurpose::FamilyMetadata,
        format!(
            "Write a one-paragraph overview for the {display} command group \
             documentation page. The group covers these pages: {}.",
            member_slugs.join(", ")
        ),
        family_slug,
    )
    .await;
    let metadata_fallback = overview.is_none();
    let metadata = match overview {
        Some(text) => format!("{header}\n\n{text}"),
        None => header,
    };

    let related_text = generate_or_fallback(
        generator,
        GenerationPurpose::FamilyRelatedContent,
        format!(
            "List related resources and next steps for the {display} command \
             group as a short Markdown bullet list."
        ),
        family_slug,
    )
    .await;
    let related_fallback = related_text.is_none();
    let related = match related_text {
        Some(text) => format!("## Related resources\n\n{text}"),
        None => format!(
            "## Related resources\n\n- [{display} documentation](https://learn.microsoft.com/azure/)"
        ),
    };

    let body = stitch(&metadata, members, &related);
    info!(
        family = family_slug,
        members = members.len(),
        metadata_fallback,
        related_fallback,
        "Assembled family document"
    );
    AssembledFamily {
        document: FamilyDocument {
            family_slug: family_slug.to_string(),
            body,
        },
        metadata_fallback,
        related_fallback,
    }
}

/// Stitch phase: metadata first, member bodies sorted by slug ascending
/// case-insensitively (frontmatter stripped), related content last, one blank
/// line between sections. Pure.
pub fn stitch(metadata: &str, members: &[ComposedDocument], related: &str) -> String {
    let mut sorted: Vec<&ComposedDocument> = members.iter().collect();
    sorted.sort_by_key(|member| member.slug.to_lowercase());

    let mut sections: Vec<String> = Vec::new();
    sections.push(metadata.trim().to_string());
    for member in sorted {
        let body = frontmatter::strip(&member.body);
        let body = body.trim();
        if !body.is_empty() {
            sections.push(body.to_string());
        }
    }
    sections.push(related.trim().to_string());

    let mut body = sections.join("\n\n");
    body.push('\n');
    body
}

async fn generate_or_fallback<G>(
    generator: Option<&G>,
    purpose: GenerationPurpose,
    prompt: String,
    family_slug: &str,
) -> Option<String>
where
    G: TextGenerator + ?Sized,
{
    let Some(generator) = generator else {
        debug!(
            family = family_slug,
            purpose = purpose.name(),
            "Text generation disabled, using static fallback"
        );
        return None;
    };
    match generator
        .generate(GenerationRequest { purpose, prompt })
        .await
    {
        Ok(reply) => {
            let text = frontmatter::strip(reply.text.trim()).trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
            warn!(
                family = family_slug,
                purpose = purpose.name(),
                "Text generator returned empty content, using static fallback"
            );
            None
        }
        Err(e) => {
            warn!(
                family = family_slug,
                purpose = purpose.name(),
                error = %e,
                "Text generation failed, using static fallback"
            );
            None
        }
    }
}
