//! Which version of each stored row an import reads.
//!
//! Every import query joins a component table on `version = <selector>`,
//! where the selector is one of:
//! - an explicit version number
//! - the newest version of that component in the store
//! - the version pinned by the association row of the model snapshot

use crate::model::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector<'a> {
    Explicit(i64),
    Latest,
    /// Column of the association table holding the pinned version.
    Pinned(&'a str),
}

impl<'a> VersionSelector<'a> {
    /// Version 0 means "the newest one".
    #[must_use]
    pub const fn requested(version: i64) -> Self {
        if version == 0 {
            Self::Latest
        } else {
            Self::Explicit(version)
        }
    }

    /// Latest when the model asks for latest component versions, otherwise
    /// the version pinned in `column`.
    #[must_use]
    pub const fn for_model(model: &Model, column: &'a str) -> Self {
        if model.import_latest_version() {
            Self::Latest
        } else {
            Self::Pinned(column)
        }
    }

    /// Right-hand side of `version = ...` for rows of `table` whose
    /// identifier is given by `id_expr`.
    #[must_use]
    pub fn render(&self, table: &str, id_expr: &str) -> String {
        match self {
            Self::Explicit(version) => version.to_string(),
            Self::Latest => format!("(SELECT MAX(version) FROM {table} WHERE id = {id_expr})"),
            Self::Pinned(column) => (*column).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_zero_means_latest() {
        assert_eq!(VersionSelector::requested(0), VersionSelector::Latest);
        assert_eq!(VersionSelector::requested(4), VersionSelector::Explicit(4));
    }

    #[test]
    fn test_render() {
        assert_eq!(VersionSelector::Explicit(2).render("elements", "e.id"), "2");
        assert_eq!(
            VersionSelector::Latest.render("elements", "e.id"),
            "(SELECT MAX(version) FROM elements WHERE id = e.id)"
        );
        assert_eq!(
            VersionSelector::Pinned("eim.element_version").render("elements", "e.id"),
            "eim.element_version"
        );
    }

    #[test]
    fn test_for_model() {
        let mut model = Model::new("m1");
        assert_eq!(
            VersionSelector::for_model(&model, "fim.folder_version"),
            VersionSelector::Pinned("fim.folder_version")
        );
        model.set_import_latest_version(true);
        assert_eq!(
            VersionSelector::for_model(&model, "fim.folder_version"),
            VersionSelector::Latest
        );
    }
}
