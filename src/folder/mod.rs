//! Folder hierarchy and path derivation.
//!
//! Platform folders only know their parent. [`FolderTree`] derives the full
//! root-to-leaf path of every folder in a listing and rejects listings whose
//! parent chains loop or stop short of a root, rather than walking forever.
//!
//! # Examples
//!
//! ```rust
//! use bldr_cli::folder::FolderTree;
//! use bldr_cli::platform::RawFolder;
//!
//! let tree = FolderTree::build(vec![
//!     RawFolder::new(1, "Content Builder", None),
//!     RawFolder::new(2, "Emails", Some(1)),
//! ])
//! .unwrap();
//!
//! let emails = tree.get(2).unwrap();
//! assert_eq!(emails.folder_path(), "Content Builder/Emails");
//! assert_eq!(emails.name_path("\\"), "Content Builder\\Emails");
//! ```

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::constants::FOLDER_PATH_SEPARATOR;
use crate::core::BldrError;
use crate::platform::RawFolder;

/// A folder with its derived path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Folder id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Parent folder id; `None` for a root
    pub parent_id: Option<u64>,
    /// Folder names from the root down to this folder
    #[serde(skip)]
    pub path: Vec<String>,
}

impl Folder {
    /// Path joined with `/`, as written to `category.folderPath`.
    #[must_use]
    pub fn folder_path(&self) -> String {
        self.path.join(FOLDER_PATH_SEPARATOR)
    }

    /// Path joined with an arbitrary separator.
    #[must_use]
    pub fn name_path(&self, separator: &str) -> String {
        self.path.join(separator)
    }

    /// Whether this folder is a root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// All folders of one listing, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    folders: Vec<Folder>,
    by_id: HashMap<u64, usize>,
}

impl FolderTree {
    /// Derive paths for every folder in `raw`.
    ///
    /// Duplicate ids keep their first occurrence. Fails with
    /// [`BldrError::InvalidFolderChain`] when a parent chain contains a cycle or
    /// names a parent that is not part of the listing.
    pub fn build(raw: Vec<RawFolder>) -> Result<Self, BldrError> {
        let mut unique: Vec<RawFolder> = Vec::with_capacity(raw.len());
        let mut index: HashMap<u64, usize> = HashMap::new();
        for folder in raw {
            if !index.contains_key(&folder.id) {
                index.insert(folder.id, unique.len());
                unique.push(folder);
            }
        }

        let mut folders = Vec::with_capacity(unique.len());
        for folder in &unique {
            let path = derive_path(folder, &unique, &index)?;
            folders.push(Folder {
                id: folder.id,
                name: folder.name.clone(),
                parent_id: folder.parent_id,
                path,
            });
        }

        Ok(Self {
            folders,
            by_id: index,
        })
    }

    /// Folder by id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Folder> {
        self.by_id.get(&id).map(|&i| &self.folders[i])
    }

    /// Ids of `root_id` and every folder below it, in listing order.
    ///
    /// Ancestors of `root_id` that happen to be part of the listing are left out.
    #[must_use]
    pub fn subtree_ids(&self, root_id: u64) -> Vec<u64> {
        self.folders
            .iter()
            .filter(|folder| {
                folder.id == root_id
                    || self
                        .ancestors(folder)
                        .any(|ancestor| ancestor.id == root_id)
            })
            .map(|folder| folder.id)
            .collect()
    }

    fn ancestors<'a>(&'a self, folder: &'a Folder) -> impl Iterator<Item = &'a Folder> + 'a {
        std::iter::successors(folder.parent_id.and_then(|id| self.get(id)), move |current| {
            current.parent_id.and_then(|id| self.get(id))
        })
    }

    /// Number of folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the listing was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

fn derive_path(
    folder: &RawFolder,
    folders: &[RawFolder],
    index: &HashMap<u64, usize>,
) -> Result<Vec<String>, BldrError> {
    let mut names = vec![folder.name.clone()];
    let mut visited = HashSet::from([folder.id]);
    let mut current = folder;

    while let Some(parent_id) = current.parent_id {
        if !visited.insert(parent_id) {
            return Err(BldrError::InvalidFolderChain {
                folder_id: folder.id,
                reason: format!("parent chain revisits folder {parent_id}"),
            });
        }
        let &parent_index = index.get(&parent_id).ok_or_else(|| BldrError::InvalidFolderChain {
            folder_id: folder.id,
            reason: format!("parent folder {parent_id} is not part of the listing"),
        })?;
        current = &folders[parent_index];
        names.push(current.name.clone());
    }

    names.reverse();
    Ok(names)
}
