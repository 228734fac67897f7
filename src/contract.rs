//! # contract: interfaces and types shared across pipeline stages
//!
//! This module defines the [`TextGenerator`] trait, the single seam to the
//! external text-generation service, together with the data types that flow
//! between stages (fragments, composed documents, family documents).
//!
//! ## Interface & Extensibility
//! - Implement [`TextGenerator`] to plug in a new generation backend (HTTP
//!   API, local model, test fake).
//! - The method is async and returns a boxed error; callers treat failures as
//!   recoverable and substitute fallbacks rather than aborting the run.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so tests build deterministic mocks
//!   (`MockTextGenerator`) via the `test-export-mocks` feature.

use async_trait::async_trait;

use mockall::{automock, predicate::*};

/// The kinds of per-tool fragment a section generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Annotations,
    Parameters,
    ExamplePrompts,
}

impl FragmentKind {
    pub const ALL: [FragmentKind; 3] = [
        FragmentKind::Annotations,
        FragmentKind::Parameters,
        FragmentKind::ExamplePrompts,
    ];

    /// Suffix of the fragment's file name, e.g. `{slug}-annotations.md`.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            FragmentKind::Annotations => "annotations",
            FragmentKind::Parameters => "parameters",
            FragmentKind::ExamplePrompts => "example-prompts",
        }
    }

    /// Placeholder this fragment replaces in the per-tool template.
    pub fn placeholder(&self) -> &'static str {
        match self {
            FragmentKind::Annotations => "{{annotations}}",
            FragmentKind::Parameters => "{{parameters}}",
            FragmentKind::ExamplePrompts => "{{example-prompts}}",
        }
    }

    /// File name of this fragment for a slug.
    pub fn file_name(&self, slug: &str) -> String {
        format!("{slug}-{}.md", self.file_suffix())
    }
}

/// One generator's Markdown output for one tool, keyed by slug.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub slug: String,
    /// Full file content, frontmatter included.
    pub content: String,
}

/// Per-tool document assembled from the template and the tool's fragments.
/// Created once per tool per run; the optional improvement pass replaces the
/// body wholesale, nothing else mutates it.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub slug: String,
    pub body: String,
}

/// Per-namespace document stitched from a family's composed members.
#[derive(Debug, Clone)]
pub struct FamilyDocument {
    pub family_slug: String,
    pub body: String,
}

/// Error type for text generation (boxed; implementors convert upstream
/// errors into something displayable).
pub type TextGenError = Box<dyn std::error::Error + Send + Sync>;

/// What a generated text is for. Carried in requests so logs stay readable
/// and test fakes can discriminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPurpose {
    ExamplePrompts,
    Improvement,
    FamilyMetadata,
    FamilyRelatedContent,
}

impl GenerationPurpose {
    pub fn name(&self) -> &'static str {
        match self {
            GenerationPurpose::ExamplePrompts => "example-prompts",
            GenerationPurpose::Improvement => "improvement",
            GenerationPurpose::FamilyMetadata => "family-metadata",
            GenerationPurpose::FamilyRelatedContent => "family-related-content",
        }
    }
}

/// A request to the external text-generation service.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub purpose: GenerationPurpose,
    /// The instruction handed to the service, already fully rendered.
    pub prompt: String,
}

/// The service's reply: an opaque text blob.
#[derive(Debug, Clone)]
pub struct GeneratedText {
    pub text: String,
}

/// Trait for the external text-generation collaborator.
///
/// Implemented by the production HTTP client and by test mocks. The pipeline
/// never assumes anything about the returned text beyond it being associated
/// with the request; an error (or an empty reply) downgrades the unit to its
/// fallback, it never aborts sibling units.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a text blob for the request, or fail.
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedText, TextGenError>;
}
