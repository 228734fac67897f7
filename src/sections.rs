//! Section generators: one Markdown fragment per tool and kind. Annotations
//! and parameters are pure transforms of the tool record; example prompts go
//! through the external text generator. Each returns `None` when the tool
//! lacks the relevant data, and the composer tolerates the absence.

use tracing::{debug, info};

use crate::catalog::ToolRecord;
use crate::contract::{
    Fragment, FragmentKind, GenerationPurpose, GenerationRequest, TextGenError, TextGenerator,
};
use crate::frontmatter::{self, Stamp};

/// Render the annotations fragment: a table of the tool's present metadata
/// flags. Absent when the tool carries no flags at all.
pub fn annotations_fragment(tool: &ToolRecord, slug: &str, stamp: &Stamp) -> Option<Fragment> {
    let flags = tool.flags();
    if flags.is_empty() {
        debug!(slug, "Tool has no metadata flags, skipping annotations fragment");
        return None;
    }

    let mut table = String::from("| Annotation | Value | Description |\n|---|---|---|\n");
    for (name, flag) in flags {
        let value = match flag.value() {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "-",
        };
        let description = flag.description().unwrap_or("");
        table.push_str(&format!("| {name} | {value} | {description} |\n"));
    }

    let content = format!("{}\n{}", frontmatter::render(stamp, &[]), table);
    Some(Fragment {
        kind: FragmentKind::Annotations,
        slug: slug.to_string(),
        content,
    })
}

/// Render the parameters fragment: a table of the tool's options. Absent when
/// the tool has no options.
pub fn parameters_fragment(tool: &ToolRecord, slug: &str, stamp: &Stamp) -> Option<Fragment> {
    if tool.options.is_empty() {
        debug!(slug, "Tool has no options, skipping parameters fragment");
        return None;
    }

    let mut table = String::from("| Name | Type | Required | Description |\n|---|---|---|---|\n");
    for option in &tool.options {
        let required = if option.required { "Yes" } else { "No" };
        let option_type = option.option_type.as_deref().unwrap_or("-");
        let description = option.description.as_deref().unwrap_or("");
        table.push_str(&format!(
            "| `{}` | {option_type} | {required} | {description} |\n",
            option.name
        ));
    }

    let content = format!("{}\n{}", frontmatter::render(stamp, &[]), table);
    Some(Fragment {
        kind: FragmentKind::Parameters,
        slug: slug.to_string(),
        content,
    })
}

/// Generate the example-prompts fragment via the external service. The text
/// itself is non-deterministic; an empty reply counts as no fragment.
pub async fn example_prompts_fragment<G>(
    generator: &G,
    tool: &ToolRecord,
    slug: &str,
    stamp: &Stamp,
) -> Result<Option<Fragment>, TextGenError>
where
    G: TextGenerator + ?Sized,
{
    let request = GenerationRequest {
        purpose: GenerationPurpose::ExamplePrompts,
        prompt: example_prompts_prompt(tool),
    };
    let reply = generator.generate(request).await?;
    let text = reply.text.trim();
    if text.is_empty() {
        info!(slug, "Text generator returned empty example prompts");
        return Ok(None);
    }

    let content = format!("{}\n{text}\n", frontmatter::render(stamp, &[]));
    Ok(Some(Fragment {
        kind: FragmentKind::ExamplePrompts,
        slug: slug.to_string(),
        content,
    }))
}

fn example_prompts_prompt(tool: &ToolRecord) -> String {
    let mut prompt = format!(
        "Write three to five example prompts a user could give an AI assistant \
         to run the CLI command `{}`.",
        tool.command
    );
    if let Some(description) = tool.description.as_deref() {
        prompt.push_str(&format!(" The command does the following: {description}"));
    }
    if !tool.options.is_empty() {
        let names: Vec<String> = tool
            .options
            .iter()
            .map(|option| {
                if option.required {
                    format!("{} (required)", option.name)
                } else {
                    option.name.clone()
                }
            })
            .collect();
        prompt.push_str(&format!(" Available parameters: {}.", names.join(", ")));
    }
    prompt.push_str(" Return each example prompt in its own fenced code block.");
    prompt
}
