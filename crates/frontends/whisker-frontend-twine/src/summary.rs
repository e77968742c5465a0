//! Human-readable summary of an imported story.

use std::fmt;

use whisker_core::story::{StoryDocument, StoryFormat};

/// What an import produced, for confirmation prompts and CLI output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub title: String,
    pub author: String,
    pub format: StoryFormat,
    pub format_version: String,
    pub passages: usize,
    pub variables: usize,
    /// Things the user should check by hand.
    pub warnings: Vec<String>,
}

impl ImportSummary {
    pub fn from_document(doc: &StoryDocument) -> Self {
        let (format, format_version) = doc
            .metadata
            .foreign_origin
            .as_ref()
            .map_or((StoryFormat::Unknown, String::new()), |o| {
                (o.format, o.format_version.clone())
            });

        let mut warnings = Vec::new();
        match format {
            StoryFormat::SugarCube => warnings
                .push("SugarCube format: Some macros may need manual adjustment".to_string()),
            StoryFormat::Unknown => {
                warnings.push("Unknown format: Content may need manual adjustment".to_string())
            }
            _ => {}
        }
        let dups = doc.duplicate_passage_ids();
        if !dups.is_empty() {
            warnings.push(format!(
                "Passage ids shared by more than one passage: {}",
                dups.join(", ")
            ));
        }
        if doc.start_passage().is_none() {
            warnings.push(format!(
                "Start passage `{}` does not exist",
                doc.settings.start_passage
            ));
        }

        Self {
            title: doc.metadata.title.clone(),
            author: doc.metadata.author.clone(),
            format,
            format_version,
            passages: doc.passages.len(),
            variables: doc.variables.len(),
            warnings,
        }
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title:     {}", self.title)?;
        writeln!(f, "Format:    {} {}", self.format, self.format_version)?;
        writeln!(f, "Author:    {}", self.author)?;
        writeln!(f, "Passages:  {}", self.passages)?;
        write!(f, "Variables: {}", self.variables)?;
        for warning in &self.warnings {
            write!(f, "\nwarning: {warning}")?;
        }
        Ok(())
    }
}
