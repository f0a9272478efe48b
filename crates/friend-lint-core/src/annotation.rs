//! Friend annotations attached to type declarations.
//!
//! A host reports each restriction attribute it finds on a type as a
//! [`RawAnnotation`]: the list of arguments exactly as written, after the
//! host has resolved type references to [`TypeId`]s. [`FriendAnnotation`]
//! is the validated view: the friend set and the severity.

use crate::model::TypeId;
use crate::types::Severity;
use std::collections::BTreeSet;

/// The severity argument as the host saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeverityArg {
    /// A recognised severity.
    Tag(Severity),
    /// Anything else (`severity = "loud"`, `severity = 3`, ...).
    Unrecognized(String),
}

/// One argument of a restriction attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationArg {
    /// A reference to a declared type.
    Type(TypeId),
    /// A `severity = ...` argument.
    Severity(SeverityArg),
    /// Any other argument, including type names the host could not resolve.
    Other(String),
}

/// A restriction attribute as attached to a type, arguments in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAnnotation {
    /// Arguments of the attribute.
    pub args: Vec<AnnotationArg>,
}

impl RawAnnotation {
    /// Creates an annotation from its arguments.
    #[must_use]
    pub fn new(args: Vec<AnnotationArg>) -> Self {
        Self { args }
    }
}

/// Validated restriction data of a type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendAnnotation {
    /// Severity of violations against this type.
    pub severity: Severity,
    /// Types exempt from the restriction.
    pub friends: BTreeSet<TypeId>,
}

impl FriendAnnotation {
    /// Extracts the friend set and severity from raw arguments.
    ///
    /// Every type argument joins the friend set. The first recognised
    /// severity tag is used; without one the severity is [`Severity::Error`].
    /// Other arguments and unrecognised severities are ignored.
    #[must_use]
    pub fn from_raw(raw: &RawAnnotation) -> Self {
        let mut friends = BTreeSet::new();
        let mut severity = None;

        for arg in &raw.args {
            match arg {
                AnnotationArg::Type(id) => {
                    friends.insert(*id);
                }
                AnnotationArg::Severity(SeverityArg::Tag(tag)) => {
                    severity.get_or_insert(*tag);
                }
                AnnotationArg::Severity(SeverityArg::Unrecognized(text)) => {
                    tracing::debug!("Ignoring unrecognized severity `{text}`");
                }
                AnnotationArg::Other(text) => {
                    tracing::debug!("Ignoring non-type friend argument `{text}`");
                }
            }
        }

        Self {
            severity: severity.unwrap_or_default(),
            friends,
        }
    }
}
