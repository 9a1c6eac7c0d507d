use scout_catalog::{CatalogEntry, Package};

pub const UNKNOWN_RUNTIME: &str = "unknown";

/// Canonical runtime for a registry kind, falling back to the package's own hint.
pub fn package_runtime(package: &Package) -> &str {
    match package.registry_type.to_ascii_lowercase().as_str() {
        "npm" => "node",
        "pypi" => "python",
        "docker" | "oci" => "docker",
        "nuget" => "dotnet",
        _ => package
            .runtime_hint
            .as_deref()
            .filter(|hint| !hint.is_empty())
            .unwrap_or(UNKNOWN_RUNTIME),
    }
}

/// Runtime of the entry's first package, or [`UNKNOWN_RUNTIME`].
pub fn detect_runtime(entry: &CatalogEntry) -> &str {
    entry
        .primary_package()
        .map_or(UNKNOWN_RUNTIME, package_runtime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_registry_kinds() {
        let cases = [
            ("npm", "node"),
            ("PyPI", "python"),
            ("oci", "docker"),
            ("docker", "docker"),
            ("nuget", "dotnet"),
            ("mcpb", UNKNOWN_RUNTIME),
        ];
        for (kind, runtime) in cases {
            assert_eq!(package_runtime(&Package::new(kind, "x", "stdio")), runtime, "{kind}");
        }
    }

    #[test]
    fn falls_back_to_runtime_hint() {
        let pkg = Package::new("mcpb", "x", "stdio").runtime_hint("deno");
        assert_eq!(package_runtime(&pkg), "deno");
    }

    #[test]
    fn entry_without_packages_is_unknown() {
        let entry = CatalogEntry::new("io.test/a", "1", "");
        assert_eq!(detect_runtime(&entry), UNKNOWN_RUNTIME);
    }
}
