//! Object key construction.
//!
//! Keys address version content inside the bucket and deliberately embed
//! the owner tuple, the folder's materialized path, the document id, and
//! the version number:
//!
//! ```text
//! <owner_type>/<owner_id><folder_path>/<document_id>/v<version>/<file_name>
//! ```
//!
//! The owner segment makes key prefixes unique across tenants (two tenants
//! can both own a `/reports` folder), the document id isolates same-named
//! documents across their own history, and the version segment guarantees
//! two versions never collide. Because the folder path is embedded, moving
//! or renaming a folder relocates keys by plain prefix substitution.

use uuid::Uuid;

use docvault_entity::folder::model::OwnerType;

/// Key prefix covering every object stored under a folder subtree.
pub fn folder_prefix(owner_type: OwnerType, owner_id: Uuid, folder_path: &str) -> String {
    format!("{}/{}{}", owner_type.as_str(), owner_id, folder_path)
}

/// Key prefix covering every version of one document.
pub fn document_prefix(folder_prefix: &str, document_id: Uuid) -> String {
    format!("{folder_prefix}/{document_id}")
}

/// Full object key for a single document version.
pub fn version_key(document_prefix: &str, version: i32, file_name: &str) -> String {
    format!("{document_prefix}/v{version}/{file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let owner = Uuid::nil();
        let doc = Uuid::nil();
        let fp = folder_prefix(OwnerType::User, owner, "/projects/reports");
        assert_eq!(
            fp,
            format!("user/{owner}/projects/reports")
        );
        let dp = document_prefix(&fp, doc);
        let key = version_key(&dp, 3, "q3.pdf");
        assert_eq!(
            key,
            format!("user/{owner}/projects/reports/{doc}/v3/q3.pdf")
        );
    }

    #[test]
    fn test_prefix_substitution_roundtrip() {
        let owner = Uuid::nil();
        let doc = Uuid::nil();
        let old = folder_prefix(OwnerType::Organization, owner, "/a/b");
        let new = folder_prefix(OwnerType::Organization, owner, "/c/a/b");
        let key = version_key(&document_prefix(&old, doc), 1, "x.txt");

        let suffix = key.strip_prefix(&old).unwrap();
        let relocated = format!("{new}{suffix}");
        assert_eq!(
            relocated,
            version_key(&document_prefix(&new, doc), 1, "x.txt")
        );
    }
}
