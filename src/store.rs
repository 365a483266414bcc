//! Project/worktree/branch data model and the structural edit operations.
//!
//! All edits are value-level: they take the current worktree list and return a
//! new one. The caller owns the state and decides when to swap it in, so the
//! diagram stays a pure view over the hierarchy.

/// A project shown in the overview header.
#[derive(Clone, Debug)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Single glyph (emoji or initial) rendered in the header badge.
    pub icon_glyph: String,
}

/// A named line of work inside a worktree.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub name: String,
    pub is_default: bool,
    pub is_current: bool,
    /// Human-readable relative time of the last commit ("3h ago").
    pub last_commit: String,
}

impl Branch {
    pub fn new(name: &str, is_default: bool, is_current: bool, last_commit: &str) -> Self {
        Self {
            name: name.to_string(),
            is_default,
            is_current,
            last_commit: last_commit.to_string(),
        }
    }
}

/// A top-level grouping node: one row in the diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct Worktree {
    pub id: String,
    pub name: String,
    pub path: String,
    /// Name of the branch this worktree currently has checked out.
    pub current_branch: String,
    pub branches: Vec<Branch>,
}

impl Worktree {
    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }
}

/// Allocate an id for a new worktree: one past the highest numeric suffix
/// already in use. Derived from the list so the operation stays pure.
fn next_worktree_id(worktrees: &[Worktree]) -> String {
    let max = worktrees
        .iter()
        .filter_map(|wt| wt.id.rsplit('-').next())
        .filter_map(|s| s.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("wt-{}", max + 1)
}

/// Rename a worktree. Unknown ids leave the list unchanged.
pub fn rename_worktree(worktrees: &[Worktree], id: &str, new_name: &str) -> Vec<Worktree> {
    worktrees
        .iter()
        .map(|wt| {
            if wt.id == id {
                let mut wt = wt.clone();
                wt.name = new_name.to_string();
                wt
            } else {
                wt.clone()
            }
        })
        .collect()
}

/// Rename a branch inside a worktree. If the renamed branch was the
/// worktree's current branch, the current-branch pointer follows the rename.
pub fn rename_branch(
    worktrees: &[Worktree],
    worktree_id: &str,
    old_name: &str,
    new_name: &str,
) -> Vec<Worktree> {
    worktrees
        .iter()
        .map(|wt| {
            if wt.id != worktree_id {
                return wt.clone();
            }
            let mut wt = wt.clone();
            for br in &mut wt.branches {
                if br.name == old_name {
                    br.name = new_name.to_string();
                }
            }
            if wt.current_branch == old_name {
                wt.current_branch = new_name.to_string();
            }
            wt
        })
        .collect()
}

/// Append a branch named `branch-{n+1}` where `n` is the current branch
/// count. The new branch is neither default nor current.
pub fn add_branch(worktrees: &[Worktree], worktree_id: &str) -> Vec<Worktree> {
    worktrees
        .iter()
        .map(|wt| {
            if wt.id != worktree_id {
                return wt.clone();
            }
            let mut wt = wt.clone();
            let name = format!("branch-{}", wt.branches.len() + 1);
            wt.branches.push(Branch::new(&name, false, false, "just now"));
            wt
        })
        .collect()
}

/// Append a copy of `source` named `{source}-fork`, suffixing `-1`, `-2`, …
/// until the name is unique within the worktree. The fork keeps the source's
/// last-commit label but is neither default nor current.
pub fn fork_branch(worktrees: &[Worktree], worktree_id: &str, source: &str) -> Vec<Worktree> {
    worktrees
        .iter()
        .map(|wt| {
            if wt.id != worktree_id {
                return wt.clone();
            }
            let Some(src) = wt.branch(source).cloned() else {
                return wt.clone();
            };
            let mut wt = wt.clone();
            let base = format!("{source}-fork");
            let mut name = base.clone();
            let mut suffix = 0u32;
            while wt.branches.iter().any(|b| b.name == name) {
                suffix += 1;
                name = format!("{base}-{suffix}");
            }
            wt.branches.push(Branch {
                name,
                is_default: false,
                is_current: false,
                last_commit: src.last_commit,
            });
            wt
        })
        .collect()
}

/// Append a worktree named `Worktree-{n+1}` with a single default+current
/// `main` branch.
pub fn add_worktree(worktrees: &[Worktree]) -> Vec<Worktree> {
    let mut out: Vec<Worktree> = worktrees.to_vec();
    let name = format!("Worktree-{}", worktrees.len() + 1);
    out.push(Worktree {
        id: next_worktree_id(worktrees),
        name: name.clone(),
        path: format!("/{}", name.to_lowercase()),
        current_branch: "main".to_string(),
        branches: vec![Branch::new("main", true, true, "just now")],
    });
    out
}

/// Deep-copy a worktree under a fresh id with a `-copy` name suffix and
/// append it. Branches are copied verbatim.
pub fn duplicate_worktree(worktrees: &[Worktree], worktree_id: &str) -> Vec<Worktree> {
    let Some(src) = worktrees.iter().find(|wt| wt.id == worktree_id) else {
        return worktrees.to_vec();
    };
    let mut copy = src.clone();
    copy.id = next_worktree_id(worktrees);
    copy.name = format!("{}-copy", src.name);
    copy.path = format!("{}-copy", src.path);
    let mut out: Vec<Worktree> = worktrees.to_vec();
    out.push(copy);
    out
}

/// Remove a worktree. Deleting the last remaining worktree is silently
/// ignored: the diagram must never reach a zero-worktree state.
pub fn delete_worktree(worktrees: &[Worktree], worktree_id: &str) -> Vec<Worktree> {
    if worktrees.len() <= 1 {
        return worktrees.to_vec();
    }
    worktrees.iter().filter(|wt| wt.id != worktree_id).cloned().collect()
}

/// Demo project catalog. Stands in for the external data service at the
/// interface boundary: the diagram only ever sees `Project` + `Vec<Worktree>`.
pub fn demo_projects() -> Vec<Project> {
    vec![
        Project {
            id: "1".into(),
            name: "Helios".into(),
            icon_glyph: "H".into(),
        },
        Project {
            id: "2".into(),
            name: "Atlas Docs".into(),
            icon_glyph: "A".into(),
        },
        Project {
            id: "3".into(),
            name: "Relay".into(),
            icon_glyph: "R".into(),
        },
    ]
}

/// Worktree hierarchy for a project id, with a small default for unknown ids.
pub fn worktrees_for_project(project_id: &str) -> Vec<Worktree> {
    match project_id {
        "1" => vec![
            Worktree {
                id: "wt-1".into(),
                name: "Main".into(),
                path: "/main".into(),
                current_branch: "develop".into(),
                branches: vec![
                    Branch::new("main", true, false, "3h ago"),
                    Branch::new("develop", false, true, "25m ago"),
                    Branch::new("feature/auth", false, false, "2d ago"),
                ],
            },
            Worktree {
                id: "wt-2".into(),
                name: "feature-a".into(),
                path: "/feature-a".into(),
                current_branch: "develop-ui".into(),
                branches: vec![
                    Branch::new("main", true, false, "3h ago"),
                    Branch::new("develop-ui", false, true, "1h ago"),
                    Branch::new("feature/auth", false, false, "5h ago"),
                ],
            },
            Worktree {
                id: "wt-3".into(),
                name: "feature-b".into(),
                path: "/feature-b".into(),
                current_branch: "develop-payment".into(),
                branches: vec![
                    Branch::new("main", true, false, "3h ago"),
                    Branch::new("develop-payment", false, true, "45m ago"),
                ],
            },
        ],
        "2" => vec![
            Worktree {
                id: "wt-1".into(),
                name: "Main".into(),
                path: "/main".into(),
                current_branch: "main".into(),
                branches: vec![
                    Branch::new("main", true, true, "1h ago"),
                    Branch::new("develop", false, false, "4h ago"),
                    Branch::new("feature/api-v3", false, false, "1d ago"),
                ],
            },
            Worktree {
                id: "wt-2".into(),
                name: "docs-rewrite".into(),
                path: "/docs-rewrite".into(),
                current_branch: "docs/architecture".into(),
                branches: vec![
                    Branch::new("docs/architecture", false, true, "2h ago"),
                    Branch::new("docs/api-reference", false, false, "6h ago"),
                ],
            },
        ],
        "3" => vec![Worktree {
            id: "wt-1".into(),
            name: "Main".into(),
            path: "/main".into(),
            current_branch: "main".into(),
            branches: vec![
                Branch::new("main", true, true, "30m ago"),
                Branch::new("staging", false, false, "2h ago"),
            ],
        }],
        _ => vec![Worktree {
            id: "wt-1".into(),
            name: "Main".into(),
            path: "/main".into(),
            current_branch: "main".into(),
            branches: vec![
                Branch::new("main", true, true, "2h ago"),
                Branch::new("develop", false, false, "5h ago"),
            ],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Worktree> {
        vec![Worktree {
            id: "wt-1".into(),
            name: "Main".into(),
            path: "/main".into(),
            current_branch: "develop".into(),
            branches: vec![
                Branch::new("main", true, false, "3h ago"),
                Branch::new("develop", false, true, "25m ago"),
            ],
        }]
    }

    #[test]
    fn add_branch_counts_from_existing() {
        let wts = add_branch(&sample(), "wt-1");
        assert_eq!(wts[0].branches.len(), 3);
        assert_eq!(wts[0].branches[2].name, "branch-3");
        assert!(!wts[0].branches[2].is_default);
        assert!(!wts[0].branches[2].is_current);
    }

    #[test]
    fn fork_dedups_by_suffix() {
        let wts = fork_branch(&sample(), "wt-1", "main");
        assert_eq!(wts[0].branches[2].name, "main-fork");
        let wts = fork_branch(&wts, "wt-1", "main");
        assert_eq!(wts[0].branches[3].name, "main-fork-1");
        let wts = fork_branch(&wts, "wt-1", "main");
        assert_eq!(wts[0].branches[4].name, "main-fork-2");

        // Never two identical names inside one worktree
        let mut names: Vec<&str> = wts[0].branches.iter().map(|b| b.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), wts[0].branches.len());
    }

    #[test]
    fn fork_of_missing_source_is_noop() {
        let wts = fork_branch(&sample(), "wt-1", "nope");
        assert_eq!(wts, sample());
    }

    #[test]
    fn delete_guard_keeps_last_worktree() {
        let wts = delete_worktree(&sample(), "wt-1");
        assert_eq!(wts.len(), 1);
    }

    #[test]
    fn delete_removes_when_not_last() {
        let wts = add_worktree(&sample());
        assert_eq!(wts.len(), 2);
        let wts = delete_worktree(&wts, "wt-1");
        assert_eq!(wts.len(), 1);
        assert_eq!(wts[0].name, "Worktree-2");
    }

    #[test]
    fn add_worktree_names_and_seeds_main() {
        let wts = add_worktree(&sample());
        let new = &wts[1];
        assert_eq!(new.name, "Worktree-2");
        assert_eq!(new.id, "wt-2");
        assert_eq!(new.branches.len(), 1);
        assert!(new.branches[0].is_default && new.branches[0].is_current);
        assert_eq!(new.current_branch, "main");
    }

    #[test]
    fn duplicate_copies_branches_verbatim() {
        let wts = duplicate_worktree(&sample(), "wt-1");
        assert_eq!(wts.len(), 2);
        assert_eq!(wts[1].name, "Main-copy");
        assert_ne!(wts[1].id, wts[0].id);
        assert_eq!(wts[1].branches, wts[0].branches);
    }

    #[test]
    fn rename_branch_tracks_current() {
        let wts = rename_branch(&sample(), "wt-1", "develop", "trunk");
        assert_eq!(wts[0].branches[1].name, "trunk");
        assert_eq!(wts[0].current_branch, "trunk");

        // Renaming a non-current branch leaves the pointer alone
        let wts = rename_branch(&wts, "wt-1", "main", "stable");
        assert_eq!(wts[0].current_branch, "trunk");
    }

    #[test]
    fn rename_worktree_replaces_name_only() {
        let wts = rename_worktree(&sample(), "wt-1", "Primary");
        assert_eq!(wts[0].name, "Primary");
        assert_eq!(wts[0].id, "wt-1");
        assert_eq!(wts[0].branches.len(), 2);
    }
}
