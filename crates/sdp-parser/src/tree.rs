//! Group tree builder
//!
//! Reassembles the flat token stream into the manifest's nesting: root-level
//! scalar fields (TOTAL_FILE_COUNT, EXPIRATION_TIME, ...) plus FILE_GROUP
//! objects holding FILE_SPEC objects. Nesting errors are fatal for the whole
//! manifest.

use crate::tokenizer::{Token, TokenKind, Value};
use sdp_common::{Result, SdpError};

/// Groups may hold groups exactly once: FILE_GROUP > FILE_SPEC.
const MAX_GROUP_DEPTH: usize = 2;

/// A named group and its contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    /// Line of the opening OBJECT statement
    pub line: usize,
    pub fields: Vec<(String, Value)>,
    pub children: Vec<Group>,
}

impl Group {
    /// Look a field up through its synonym list; first name present wins.
    pub fn field(&self, names: &[&str]) -> Option<&Value> {
        names
            .iter()
            .find_map(|name| self.fields.iter().find(|(key, _)| key == name))
            .map(|(_, value)| value)
    }
}

/// Parsed manifest structure: root fields plus top-level groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestTree {
    pub fields: Vec<(String, Value)>,
    pub groups: Vec<Group>,
}

impl ManifestTree {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Build the group tree from a token stream
pub fn build_tree<I>(tokens: I) -> Result<ManifestTree>
where
    I: IntoIterator<Item = Result<Token>>,
{
    let mut tree = ManifestTree::default();
    let mut stack: Vec<Group> = Vec::new();

    for token in tokens {
        let token = token?;
        match token.kind {
            TokenKind::GroupOpen(name) => {
                if stack.len() >= MAX_GROUP_DEPTH {
                    return Err(SdpError::MalformedManifest {
                        line: token.line,
                        message: format!(
                            "unexpected OBJECT = {} nested inside {}",
                            name,
                            stack
                                .last()
                                .map(|g| g.name.as_str())
                                .unwrap_or_default()
                        ),
                    });
                }
                stack.push(Group {
                    name,
                    line: token.line,
                    fields: Vec::new(),
                    children: Vec::new(),
                });
            },
            TokenKind::GroupClose(name) => {
                let group = stack.pop().ok_or_else(|| SdpError::MalformedManifest {
                    line: token.line,
                    message: format!("END_OBJECT = {} without a matching OBJECT", name),
                })?;
                if group.name != name {
                    return Err(SdpError::MalformedManifest {
                        line: token.line,
                        message: format!(
                            "END_OBJECT = {} closes OBJECT = {} opened at line {}",
                            name, group.name, group.line
                        ),
                    });
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(group),
                    None => tree.groups.push(group),
                }
            },
            TokenKind::Field { key, value } => match stack.last_mut() {
                Some(group) => group.fields.push((key, value)),
                None => tree.fields.push((key, value)),
            },
        }
    }

    if let Some(open) = stack.first() {
        return Err(SdpError::MalformedManifest {
            line: open.line,
            message: format!("OBJECT = {} is never closed", open.name),
        });
    }

    Ok(tree)
}
