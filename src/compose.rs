//! Composer: merges the per-tool template with a tool's fragments into one
//! document. Fragments arrive as raw file contents (frontmatter included) or
//! not at all; absent fragments substitute as empty strings and the
//! template's static section headings still render, a known cosmetic edge.

use regex::Regex;
use tracing::{info, warn};

use crate::catalog::ToolRecord;
use crate::contract::{
    ComposedDocument, FragmentKind, GenerationPurpose, GenerationRequest, TextGenError,
    TextGenerator,
};
use crate::frontmatter::{self, Stamp};

/// Template used when the config names no template file. Placeholders map
/// 1:1 to the fragment kinds plus the tool metadata fields.
pub const DEFAULT_TOOL_TEMPLATE: &str = "---
generated: {{generated}}
version: {{version}}
---

# {{title}}

`{{command}}`

{{description}}

## Annotations

{{annotations}}

## Parameters

{{parameters}}

## Example prompts

{{example-prompts}}
";

/// Raw fragment file contents for one tool, by kind. `None` means the
/// fragment file was absent or unreadable, both recoverable.
#[derive(Debug, Clone, Default)]
pub struct ToolFragments {
    pub annotations: Option<String>,
    pub parameters: Option<String>,
    pub example_prompts: Option<String>,
}

impl ToolFragments {
    fn get(&self, kind: FragmentKind) -> Option<&str> {
        match kind {
            FragmentKind::Annotations => self.annotations.as_deref(),
            FragmentKind::Parameters => self.parameters.as_deref(),
            FragmentKind::ExamplePrompts => self.example_prompts.as_deref(),
        }
    }
}

/// Compose one tool document: strip each present fragment's frontmatter,
/// substitute all placeholders, and pair the result with the slug. Leftover
/// placeholder tokens are logged, never fatal.
pub fn compose(
    template: &str,
    slug: &str,
    tool: &ToolRecord,
    fragments: &ToolFragments,
    stamp: &Stamp,
) -> ComposedDocument {
    let mut body = template.to_string();

    body = body.replace("{{command}}", &tool.command);
    body = body.replace("{{description}}", tool.description.as_deref().unwrap_or(""));
    body = body.replace("{{title}}", &title_from_slug(slug));
    body = body.replace("{{generated}}", &stamp.generated_rfc3339());
    body = body.replace("{{version}}", &stamp.version);

    // Fragments last, so placeholder-looking text inside generated content is
    // never substituted again.
    for kind in FragmentKind::ALL {
        let content = match fragments.get(kind) {
            Some(raw) => frontmatter::strip(raw).trim_end().to_string(),
            None => String::new(),
        };
        body = body.replace(kind.placeholder(), &content);
    }

    if let Ok(leftover) = Regex::new(r"\{\{[a-z-]+\}\}") {
        for found in leftover.find_iter(&body) {
            warn!(slug, placeholder = found.as_str(), "Unreplaced placeholder in composed document");
        }
    }

    ComposedDocument {
        slug: slug.to_string(),
        body,
    }
}

/// Title-case the slug for the document heading, e.g.
/// `azure-key-vault-secret-create` becomes `Azure Key Vault Secret Create`.
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Improvement pass: ask the text generator to rewrite the composed body
/// wholesale. The returned document keeps the slug; the body is the improved
/// text under a fresh frontmatter block. Callers fall back to the composed
/// document when this fails.
pub async fn improve<G>(
    generator: &G,
    document: &ComposedDocument,
    stamp: &Stamp,
) -> Result<ComposedDocument, TextGenError>
where
    G: TextGenerator + ?Sized,
{
    let request = GenerationRequest {
        purpose: GenerationPurpose::Improvement,
        prompt: format!(
            "Improve the following Markdown documentation page. Keep every \
             section and table, fix grammar and flow, and return the full \
             page as Markdown without a frontmatter block.\n\n{}",
            document.body
        ),
    };
    let reply = generator.generate(request).await?;
    let text = frontmatter::strip(reply.text.trim());
    if text.trim().is_empty() {
        return Err("text generator returned an empty improvement".into());
    }

    info!(slug = %document.slug, "Replacing composed body with improved text");
    let body = format!("{}\n{}\n", frontmatter::render(stamp, &[]), text.trim_end());
    Ok(ComposedDocument {
        slug: document.slug.clone(),
        body,
    })
}
