//! Computes which packages changed between two lockfile snapshots.

use crate::lockfile::InstalledPackages;

/// A package that was added, upgraded, or downgraded on the pull request.
/// `previous_version` is absent for newly added dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedPackage {
    pub name: String,
    pub current_version: String,
    pub previous_version: Option<String>,
}

/// Compare two snapshots and report changed packages in `current`'s
/// declaration order.
///
/// Version comparison is plain string inequality. Packages present only in
/// `previous` (removed dependencies) are never reported. An absent
/// `previous` snapshot means every current package is reported as an
/// addition.
pub fn diff(
    current: &InstalledPackages,
    previous: Option<&InstalledPackages>,
) -> Vec<UpdatedPackage> {
    let mut updated = vec![];

    for (name, pkg) in current.iter() {
        let prev = previous.and_then(|pkgs| pkgs.get(name));
        match prev {
            Some(prev) if prev.version == pkg.version => {}
            _ => updated.push(UpdatedPackage {
                name: name.clone(),
                current_version: pkg.version.clone(),
                previous_version: prev.map(|p| p.version.clone()),
            }),
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockfile::InstalledPackage;

    fn snapshot(entries: &[(&str, &str)]) -> InstalledPackages {
        entries
            .iter()
            .map(|(name, version)| {
                (
                    name.to_string(),
                    InstalledPackage {
                        name: name.to_string(),
                        version: version.to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn reports_added_package() {
        let current = snapshot(&[("a", "1.0.0")]);
        let previous = snapshot(&[]);

        let updated = diff(&current, Some(&previous));
        assert_eq!(
            updated,
            vec![UpdatedPackage {
                name: "a".into(),
                current_version: "1.0.0".into(),
                previous_version: None,
            }]
        );
    }

    #[test]
    fn reports_upgraded_package() {
        let current = snapshot(&[("a", "2.0.0")]);
        let previous = snapshot(&[("a", "1.0.0")]);

        let updated = diff(&current, Some(&previous));
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].current_version, "2.0.0");
        assert_eq!(updated[0].previous_version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn ignores_unchanged_package() {
        let current = snapshot(&[("a", "1.0.0")]);
        let previous = snapshot(&[("a", "1.0.0")]);

        assert!(diff(&current, Some(&previous)).is_empty());
    }

    #[test]
    fn missing_previous_reports_everything_as_added() {
        let current = snapshot(&[("a", "1.0.0"), ("b", "2.0.0")]);

        let updated = diff(&current, None);
        assert_eq!(updated.len(), 2);
        assert!(updated.iter().all(|u| u.previous_version.is_none()));
    }

    #[test]
    fn removed_packages_are_never_reported() {
        let current = snapshot(&[("a", "1.0.0")]);
        let previous = snapshot(&[("a", "1.0.0"), ("gone", "0.1.0")]);

        assert!(diff(&current, Some(&previous)).is_empty());
    }

    #[test]
    fn preserves_current_declaration_order() {
        let current = snapshot(&[("z", "1.0.0"), ("a", "1.0.0")]);
        let previous = snapshot(&[]);

        let names: Vec<String> = diff(&current, Some(&previous))
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
