//! Extraction output

use serde::Serialize;

use super::extractor::ExtractionError;
use crate::robot::token::FilePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VariableSigil {
    /// `$`
    Scalar,
    /// `@`
    List,
    /// `&`
    Dictionary,
    /// `%`
    Environment,
}

impl VariableSigil {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '$' => Some(VariableSigil::Scalar),
            '@' => Some(VariableSigil::List),
            '&' => Some(VariableSigil::Dictionary),
            '%' => Some(VariableSigil::Environment),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            VariableSigil::Scalar => '$',
            VariableSigil::List => '@',
            VariableSigil::Dictionary => '&',
            VariableSigil::Environment => '%',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFragment {
    pub text: String,
    pub position: FilePosition,
}

/// `[...]` item access after a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexExpression {
    /// Text between the brackets.
    pub text: String,
    pub fragments: Vec<Fragment>,
    pub position: FilePosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableUse {
    pub sigil: VariableSigil,
    /// Full source text, marker and index suffixes included.
    pub text: String,
    /// Text between the braces.
    pub name: String,
    pub name_fragments: Vec<Fragment>,
    pub indices: Vec<IndexExpression>,
    pub position: FilePosition,
}

impl VariableUse {
    /// Variable uses nested directly inside the name.
    pub fn nested_uses(&self) -> impl Iterator<Item = &VariableUse> {
        self.name_fragments.iter().filter_map(Fragment::as_variable)
    }

    pub fn has_index(&self) -> bool {
        !self.indices.is_empty()
    }

    /// `${x}` with the name reduced to its own marker form, without index suffixes.
    pub fn base_text(&self) -> String {
        format!("{}{{{}}}", self.sigil.as_char(), self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Fragment {
    Text(TextFragment),
    Variable(VariableUse),
}

impl Fragment {
    pub fn as_variable(&self) -> Option<&VariableUse> {
        match self {
            Fragment::Variable(v) => Some(v),
            Fragment::Text(_) => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Fragment::Text(t) => &t.text,
            Fragment::Variable(v) => &v.text,
        }
    }

    pub fn position(&self) -> FilePosition {
        match self {
            Fragment::Text(t) => t.position,
            Fragment::Variable(v) => v.position,
        }
    }
}

/// Fragments of one text plus the syntax errors found in it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VariableExtraction {
    pub fragments: Vec<Fragment>,
    pub errors: Vec<ExtractionError>,
}

impl VariableExtraction {
    /// Top-level variable uses, in text order.
    pub fn variables(&self) -> impl Iterator<Item = &VariableUse> {
        self.fragments.iter().filter_map(Fragment::as_variable)
    }

    pub fn has_variables(&self) -> bool {
        self.variables().next().is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when the whole text is exactly one variable use.
    pub fn is_single_variable(&self) -> bool {
        matches!(self.fragments.as_slice(), [Fragment::Variable(_)])
    }

    /// Rebuilds the text with each use replaced by `resolve`, keeping unresolved uses as is.
    pub fn replace_with<F>(&self, mut resolve: F) -> String
    where
        F: FnMut(&VariableUse) -> Option<String>,
    {
        self.fragments
            .iter()
            .map(|fragment| match fragment {
                Fragment::Text(t) => t.text.clone(),
                Fragment::Variable(v) => resolve(v).unwrap_or_else(|| v.text.clone()),
            })
            .collect()
    }
}
