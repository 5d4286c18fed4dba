use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::id::{Id, IdSource};
use crate::paths::{parent_of, path_key, same_component};

/// Default token placed between names of merged folders
pub const DEFAULT_SEPARATOR: &str = " - ";

/// Solution folder. Relations are indexes into [`Hierarchy`] arena
/// and into the project list the hierarchy was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub full_path: PathBuf,
    pub name: String,
    pub id: Id,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub projects: Vec<usize>,
}

/// Single rooted folder tree over project directories.
///
/// The root is synthetic and never written into a solution. Its direct
/// children and projects are top level entries.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    folders: Vec<Folder>,
    root: usize,
    placement: HashMap<usize, usize>,
    paths: HashMap<usize, PathBuf>,
}

impl Hierarchy {
    /// Builds tree from `(project index, project file path)` pairs.
    /// Returns `None` if there is nothing to place.
    pub fn build<'a, I>(projects: I, ids: &mut dyn IdSource) -> Option<Self>
    where
        I: IntoIterator<Item = (usize, &'a Path)>,
    {
        let mut entries = projects
            .into_iter()
            .map(|(index, path)| (index, path.to_path_buf()))
            .collect::<Vec<_>>();
        if entries.is_empty() {
            return None;
        }
        entries.sort_by(|(_, a), (_, b)| a.cmp(b));

        let root_path = common_root(entries.iter().map(|(_, p)| parent_of(p)));
        let root_depth = root_path.components().count();

        let mut hierarchy = Self {
            folders: vec![Folder {
                name: last_segment(&root_path),
                full_path: root_path,
                id: ids.next_id(),
                parent: None,
                children: Vec::new(),
                projects: Vec::new(),
            }],
            root: 0,
            placement: HashMap::new(),
            paths: HashMap::new(),
        };

        let mut cache = HashMap::new();
        for (index, path) in entries {
            let current = {
                let dir = parent_of(&path).components().collect::<Vec<_>>();
                let mut current = hierarchy.root;
                for depth in root_depth + 1..=dir.len() {
                    let prefix = dir[..depth].iter().collect::<PathBuf>();
                    let parent = current;
                    current = *cache
                        .entry(path_key(&prefix))
                        .or_insert_with(|| hierarchy.add_folder(prefix, parent, ids));
                }
                current
            };
            hierarchy.folders[current].projects.push(index);
            hierarchy.placement.insert(index, current);
            hierarchy.paths.insert(index, path);
        }

        for folder in &mut hierarchy.folders {
            folder.projects.sort_by(|a, b| hierarchy.paths[a].cmp(&hierarchy.paths[b]));
        }
        let order = hierarchy
            .folders
            .iter()
            .map(|f| f.full_path.clone())
            .collect::<Vec<_>>();
        for folder in &mut hierarchy.folders {
            folder.children.sort_by(|a, b| order[*a].cmp(&order[*b]));
        }
        Some(hierarchy)
    }

    fn add_folder(&mut self, full_path: PathBuf, parent: usize, ids: &mut dyn IdSource) -> usize {
        let index = self.folders.len();
        self.folders.push(Folder {
            name: last_segment(&full_path),
            full_path,
            id: ids.next_id(),
            parent: Some(parent),
            children: Vec::new(),
            projects: Vec::new(),
        });
        self.folders[parent].children.push(index);
        index
    }

    /// Merges every folder having exactly one child folder with that child.
    /// Runs bottom-up so that running it again changes nothing.
    /// The root is never written so nothing is merged into it.
    pub fn collapse(&mut self, separator: &str) {
        for child in self.folders[self.root].children.clone() {
            self.collapse_folder(child, separator);
        }
    }

    fn collapse_folder(&mut self, index: usize, separator: &str) {
        for child in self.folders[index].children.clone() {
            self.collapse_folder(child, separator);
        }
        while let [child] = self.folders[index].children[..] {
            let absorbed = &mut self.folders[child];
            absorbed.parent = None;
            let name = absorbed.name.clone();
            let children = std::mem::take(&mut absorbed.children);
            let projects = std::mem::take(&mut absorbed.projects);

            for grandchild in &children {
                self.folders[*grandchild].parent = Some(index);
            }
            for project in &projects {
                self.placement.insert(*project, index);
            }

            let paths = &self.paths;
            let folder = &mut self.folders[index];
            folder.name = format!("{}{separator}{name}", folder.name);
            folder.children = children;
            folder.projects.extend(projects);
            folder.projects.sort_by(|a, b| paths[a].cmp(&paths[b]));
        }
    }

    #[must_use]
    pub fn root(&self) -> &Folder {
        &self.folders[self.root]
    }

    #[must_use]
    pub fn folder(&self, index: usize) -> &Folder {
        &self.folders[index]
    }

    /// Folders to be written into solution, depth-first, root excluded
    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        let mut order = Vec::new();
        let mut stack = self.root().children.iter().rev().copied().collect::<Vec<_>>();
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.folders[index].children.iter().rev().copied());
        }
        order.into_iter().map(|i| &self.folders[i])
    }

    /// Folder that holds the folder specified unless it's a top level one
    #[must_use]
    pub fn parent_of_folder(&self, folder: &Folder) -> Option<&Folder> {
        folder
            .parent
            .filter(|p| *p != self.root)
            .map(|p| &self.folders[p])
    }

    /// Folder that holds the project specified unless it's a top level one
    #[must_use]
    pub fn parent_of_project(&self, project: usize) -> Option<&Folder> {
        self.placement
            .get(&project)
            .filter(|f| **f != self.root)
            .map(|f| &self.folders[*f])
    }
}

/// Longest common directory of all paths compared by whole segments ignoring case
fn common_root<'a, I>(dirs: I) -> PathBuf
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut dirs = dirs.into_iter();
    let Some(first) = dirs.next() else {
        return PathBuf::new();
    };
    let mut common = first.components().collect::<Vec<Component>>();
    for dir in dirs {
        let len = common
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| same_component(a, b))
            .count();
        common.truncate(len);
    }
    common.iter().collect()
}

fn last_segment(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[cfg(not(target_os = "windows"))]
mod tests {
    use super::*;
    use crate::id::SequentialIds;
    use proptest::prelude::*;
    use rstest::rstest;

    fn build(paths: &[&str]) -> Hierarchy {
        let mut ids = SequentialIds::new();
        Hierarchy::build(
            paths.iter().enumerate().map(|(i, p)| (i, Path::new(*p))),
            &mut ids,
        )
        .unwrap()
    }

    fn names(hierarchy: &Hierarchy) -> Vec<String> {
        hierarchy.folders().map(|f| f.name.clone()).collect()
    }

    #[rstest]
    #[case(&["/root/A/A.proj", "/root/B/A.proj"], "/root")]
    #[case(&["/src/app/a.csproj", "/src/application/b.csproj"], "/src")]
    #[case(&["/src/App/a.csproj", "/SRC/app/b.csproj"], "/SRC/app")]
    #[case(&["/src/app/a.csproj"], "/src/app")]
    #[case(&["/a/x.csproj", "/b/y.csproj"], "/")]
    #[trace]
    fn root_is_common_segment_prefix(#[case] paths: &[&str], #[case] expected: &str) {
        // Arrange

        // Act
        let hierarchy = build(paths);

        // Assert
        assert_eq!(hierarchy.root().full_path, PathBuf::from(expected));
    }

    #[test]
    fn build_empty_is_none() {
        // Arrange
        let mut ids = SequentialIds::new();

        // Act
        let hierarchy = Hierarchy::build(std::iter::empty(), &mut ids);

        // Assert
        assert!(hierarchy.is_none());
    }

    #[test]
    fn sibling_folders_scenario() {
        // Arrange
        let paths = ["/root/A/A.proj", "/root/B/A.proj"];

        // Act
        let hierarchy = build(&paths);

        // Assert
        assert_eq!(names(&hierarchy), vec!["A", "B"]);
        let a = hierarchy.parent_of_project(0).unwrap();
        let b = hierarchy.parent_of_project(1).unwrap();
        assert_eq!(a.name, "A");
        assert_eq!(b.name, "B");
        assert_eq!(a.projects, vec![0]);
        assert_eq!(b.projects, vec![1]);
        assert!(hierarchy.parent_of_folder(a).is_none());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn shared_ancestors_created_once() {
        // Arrange
        let paths = [
            "/r/src/lib/a/a.csproj",
            "/r/src/lib/b/b.csproj",
            "/r/test/t/t.csproj",
        ];

        // Act
        let hierarchy = build(&paths);

        // Assert
        assert_eq!(names(&hierarchy), vec!["src", "lib", "a", "b", "test", "t"]);
        let lib = hierarchy.folders().find(|f| f.name == "lib").unwrap();
        assert_eq!(hierarchy.parent_of_folder(lib).unwrap().name, "src");
    }

    #[test]
    fn project_in_root_is_top_level() {
        // Arrange
        let paths = ["/r/top.csproj", "/r/a/a.csproj"];

        // Act
        let hierarchy = build(&paths);

        // Assert
        assert!(hierarchy.parent_of_project(0).is_none());
        assert_eq!(hierarchy.parent_of_project(1).unwrap().name, "a");
    }

    #[test]
    fn collapse_merges_single_child_chains() {
        // Arrange
        let paths = [
            "/r/src/lib/core/core.csproj",
            "/r/src/lib/core/extra/extra.csproj",
            "/r/test/t.csproj",
        ];
        let mut hierarchy = build(&paths);

        // Act
        hierarchy.collapse(DEFAULT_SEPARATOR);

        // Assert
        assert_eq!(names(&hierarchy), vec!["src - lib - core - extra", "test"]);
        let merged = hierarchy.parent_of_project(0).unwrap();
        assert_eq!(merged.projects, vec![0, 1]);
        assert_eq!(hierarchy.parent_of_project(1).unwrap().id, merged.id);
    }

    #[test]
    fn collapse_keeps_branches() {
        // Arrange
        let paths = ["/r/a/x/x.csproj", "/r/a/y/y.csproj", "/r/b/b.csproj"];
        let mut hierarchy = build(&paths);

        // Act
        hierarchy.collapse("-");

        // Assert
        assert_eq!(names(&hierarchy), vec!["a", "x", "y", "b"]);
    }

    #[rstest]
    #[case(&["/r/top.csproj", "/r/a/b/b.csproj"], vec!["a - b"])]
    #[case(
        &["/r/top.csproj", "/r/a/b/b.csproj", "/r/a/b/c/c.csproj", "/r/a/b/d/d.csproj"],
        vec!["a - b", "c", "d"]
    )]
    #[trace]
    fn collapse_keeps_chain_under_root_as_folder(
        #[case] paths: &[&str],
        #[case] expected: Vec<&str>,
    ) {
        // Arrange
        let mut hierarchy = build(paths);

        // Act
        hierarchy.collapse(DEFAULT_SEPARATOR);

        // Assert
        assert_eq!(names(&hierarchy), expected);
        assert!(hierarchy.parent_of_project(0).is_none());
        let merged = hierarchy.parent_of_project(1).unwrap();
        assert_eq!(merged.name, "a - b");
        assert_eq!(merged.projects, vec![1]);
        assert!(hierarchy.parent_of_folder(merged).is_none());
    }

    fn snapshot(hierarchy: &Hierarchy) -> Vec<(String, Vec<usize>, Option<String>)> {
        hierarchy
            .folders()
            .map(|f| {
                (
                    f.name.clone(),
                    f.projects.clone(),
                    hierarchy.parent_of_folder(f).map(|p| p.name.clone()),
                )
            })
            .collect()
    }

    fn project_paths() -> impl Strategy<Value = Vec<String>> {
        let segment = prop_oneof![Just("a"), Just("b"), Just("c")];
        let dir = proptest::collection::vec(segment, 0..4);
        proptest::collection::btree_set(dir, 1..8).prop_map(|dirs| {
            dirs.into_iter()
                .enumerate()
                .map(|(i, d)| {
                    let mut path = String::from("/root");
                    for s in d {
                        path.push('/');
                        path.push_str(s);
                    }
                    format!("{path}/p{i}.csproj")
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn every_project_in_exactly_one_folder(paths in project_paths(), collapse in any::<bool>()) {
            let refs = paths.iter().map(String::as_str).collect::<Vec<_>>();
            let mut hierarchy = build(&refs);
            if collapse {
                hierarchy.collapse(DEFAULT_SEPARATOR);
            }

            let mut seen = hierarchy.root().projects.clone();
            for folder in hierarchy.folders() {
                seen.extend(folder.projects.iter().copied());
            }
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..paths.len()).collect::<Vec<_>>());
            prop_assert!(hierarchy.root().parent.is_none());
            prop_assert!(hierarchy.folders().all(|f| f.parent.is_some()));
        }

        #[test]
        fn collapse_is_idempotent(paths in project_paths()) {
            let refs = paths.iter().map(String::as_str).collect::<Vec<_>>();
            let mut hierarchy = build(&refs);

            hierarchy.collapse(DEFAULT_SEPARATOR);
            let once = snapshot(&hierarchy);
            hierarchy.collapse(DEFAULT_SEPARATOR);
            let twice = snapshot(&hierarchy);

            prop_assert_eq!(once, twice);
        }
    }
}
