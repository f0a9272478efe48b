//! Hand-built semantic model for unit tests.

use friend_lint_core::{
    AnnotationArg, Location, RawAnnotation, SemanticModel, Severity, SeverityArg, TypeId,
    TypeKind, TypeSymbol, UsageKind, UsageSite,
};
use std::path::PathBuf;

#[derive(Default)]
pub(crate) struct TestModel {
    symbols: Vec<TypeSymbol>,
    annotations: Vec<Vec<RawAnnotation>>,
    usages: Vec<UsageSite>,
}

impl TestModel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn declare(&mut self, name: &str) -> TypeId {
        let id = TypeId::new(u32::try_from(self.symbols.len()).expect("few types"));
        self.symbols.push(TypeSymbol {
            id,
            name: name.to_string(),
            module: vec!["crate".to_string()],
            kind: TypeKind::Struct,
            location: Location::new(PathBuf::from("src/types.rs"), self.symbols.len() + 1, 1),
        });
        self.annotations.push(Vec::new());
        id
    }

    pub(crate) fn restrict(
        &mut self,
        target: TypeId,
        friends: &[TypeId],
        severity: Option<Severity>,
    ) {
        let mut args: Vec<AnnotationArg> = friends
            .iter()
            .copied()
            .map(AnnotationArg::Type)
            .collect();
        if let Some(severity) = severity {
            args.push(AnnotationArg::Severity(SeverityArg::Tag(severity)));
        }
        self.annotations[target.index()].push(RawAnnotation::new(args));
    }

    pub(crate) fn site(&self, kind: UsageKind, caller: Option<TypeId>) -> UsageSite {
        UsageSite::new(
            kind,
            caller,
            Location::new(PathBuf::from("src/usage.rs"), self.usages.len() + 1, 5),
        )
    }

    pub(crate) fn push(&mut self, kind: UsageKind, caller: Option<TypeId>) {
        let site = self.site(kind, caller);
        self.usages.push(site);
    }
}

impl SemanticModel for TestModel {
    fn symbol(&self, id: TypeId) -> Option<&TypeSymbol> {
        self.symbols.get(id.index())
    }

    fn annotations(&self, id: TypeId) -> &[RawAnnotation] {
        self.annotations.get(id.index()).map_or(&[][..], Vec::as_slice)
    }

    fn usages(&self) -> &[UsageSite] {
        &self.usages
    }
}
