//! The Legion package definition.
//!
//! Versions, variants, conflict rules and conditional dependencies for the
//! Legion runtime. Everything here is declaration; the logic that turns a
//! spec into CMake arguments lives in [`crate::builder::translate`].

use crate::builder::translate::Translator;
use crate::core::constraint::{Condition, ConflictRule, ConstraintSet};
use crate::core::dependency::{DependencyDescriptor, DependencyTable};
use crate::core::spec::CompilerFamily;
use crate::core::variant::{DirectoryOrNone, Variant, VariantSchema, NONE};

/// Transport layers accepted by `network`.
pub const NETWORKS: &[&str] = &["gasnet", "mpi", "none"];

/// GASNet conduits accepted by `conduit` (besides `none`).
pub const CONDUITS: &[&str] = &["aries", "ibv", "udp", "mpi", "ucx"];

/// Compile-time logging levels, as Legion's CMake config spells them lowercased.
pub const OUTPUT_LEVELS: &[&str] = &[
    "spew", "debug", "info", "print", "warning", "error", "fatal", "none",
];

/// 60=pascal, 70=volta, 75=turing, 80=ampere
pub const CUDA_ARCHS: &[&str] = &["60", "70", "75", "80"];

/// Kokkos release Legion interoperates with.
pub const KOKKOS_VERSION: &str = "3.3.01";

/// Buildable Legion versions: one release tag plus the tracked branches
/// (`cr` is control replication).
pub const VERSIONS: &[&str] = &["21.03.0", "stable", "master", "cr"];

/// Everything the translator needs to know about Legion.
#[derive(Debug, Clone)]
pub struct LegionPackage {
    pub versions: &'static [&'static str],
    pub schema: VariantSchema,
    pub constraints: ConstraintSet,
    pub dependencies: DependencyTable,
}

impl LegionPackage {
    pub fn new() -> Self {
        LegionPackage {
            versions: VERSIONS,
            schema: schema(),
            constraints: constraints(),
            dependencies: dependencies(),
        }
    }

    pub fn translator(&self) -> Translator<'_> {
        Translator::new(&self.schema, &self.constraints)
            .with_dependencies(&self.dependencies)
            .with_versions(self.versions)
    }
}

impl Default for LegionPackage {
    fn default() -> Self {
        LegionPackage::new()
    }
}

/// The variant catalog.
pub fn schema() -> VariantSchema {
    VariantSchema::new(vec![
        Variant::choice(
            "network",
            NETWORKS,
            "none",
            "The network communications/transport layer to use.",
        ),
        Variant::custom(
            "gasnet_root",
            DirectoryOrNone,
            NONE,
            "Path to a pre-installed version of GASNet (prefix directory).",
        ),
        Variant::choice(
            "conduit",
            &["aries", "ibv", "udp", "mpi", "ucx", "none"],
            "none",
            "The gasnet conduit(s) to enable.",
        ),
        Variant::toggle("gasnet_debug", false, "Build gasnet with debugging enabled."),
        Variant::toggle("shared", false, "Build shared libraries."),
        Variant::toggle(
            "bounds_checks",
            false,
            "Enable bounds checking in Legion accessors.",
        ),
        Variant::toggle(
            "privilege_checks",
            false,
            "Enable runtime privilege checks in Legion accessors.",
        ),
        Variant::toggle(
            "enable_tls",
            false,
            "Enable thread-local-storage of the Legion context.",
        ),
        Variant::choice(
            "output_level",
            OUTPUT_LEVELS,
            "warning",
            "Set the compile-time logging level.",
        ),
        Variant::toggle(
            "spy",
            false,
            "Enable detailed logging for Legion Spy debugging.",
        ),
        Variant::toggle("cuda", false, "Enable CUDA support."),
        Variant::toggle(
            "cuda_hijack",
            false,
            "Hijack application calls into the CUDA runtime (+cuda).",
        ),
        Variant::choice(
            "cuda_arch",
            CUDA_ARCHS,
            "70",
            "GPU/CUDA architecture to build for.",
        ),
        Variant::toggle(
            "cuda_unsupported_compiler",
            false,
            "Disable nvcc version check (--allow-unsupported-compiler).",
        ),
        Variant::toggle("fortran", false, "Enable Fortran bindings."),
        Variant::toggle("hdf5", false, "Enable support for HDF5."),
        Variant::toggle("hwloc", false, "Use hwloc for topology awareness."),
        Variant::toggle(
            "kokkos",
            false,
            "Enable support for interoperability with Kokkos.",
        ),
        Variant::toggle(
            "bindings",
            false,
            "Build runtime language bindings (excl. Fortran).",
        ),
        Variant::toggle(
            "libdl",
            true,
            "Enable support for dynamic object/library loading.",
        ),
        Variant::toggle(
            "openmp",
            false,
            "Enable support for OpenMP within Legion tasks.",
        ),
        Variant::toggle("papi", false, "Enable PAPI performance measurements."),
        Variant::toggle("python", false, "Enable Python support."),
        Variant::toggle("zlib", true, "Enable zlib support."),
        Variant::toggle(
            "redop_complex",
            false,
            "Use reduction operators for complex types.",
        ),
        // No range check; the value is forwarded as given.
        Variant::integer(
            "max_dims",
            3,
            "Set max number of dimensions for logical regions.",
        ),
        Variant::integer(
            "max_fields",
            512,
            "Maximum number of fields allowed in a logical region.",
        ),
        Variant::toggle(
            "native",
            false,
            "Enable native/host processor optimization target.",
        ),
    ])
}

fn not_gasnet() -> Condition {
    Condition::not(Condition::Equals("network", "gasnet"))
}

/// Conflict rules, checked in this order.
pub fn constraints() -> ConstraintSet {
    ConstraintSet::new(vec![
        ConflictRule::new(
            "gasnet-root-requires-gasnet",
            Condition::all([Condition::Set("gasnet_root"), not_gasnet()]),
            "'gasnet_root' is only valid when 'network=gasnet'.",
        ),
        ConflictRule::new(
            "gasnet-requires-conduit",
            Condition::all([
                Condition::Equals("conduit", "none"),
                Condition::Equals("network", "gasnet"),
            ]),
            "a conduit must be selected when 'network=gasnet'",
        ),
        ConflictRule::new(
            "conduit-requires-gasnet",
            Condition::all([
                Condition::not(Condition::Equals("conduit", "none")),
                not_gasnet(),
            ]),
            "conduit attribute requires 'network=gasnet'.",
        ),
        ConflictRule::new(
            "gasnet-debug-requires-gasnet",
            Condition::all([Condition::Enabled("gasnet_debug"), not_gasnet()]),
            "'+gasnet_debug' requires 'network=gasnet'.",
        ),
        ConflictRule::new(
            "cuda-hijack-requires-cuda",
            Condition::all([Condition::Enabled("cuda_hijack"), Condition::Disabled("cuda")]),
            "'+cuda_hijack' requires '+cuda'.",
        ),
    ])
}

/// The conditional dependency table.
///
/// The CUDA-enabled Kokkos rows are expanded over every `cuda_arch` value
/// and both supported compiler families: GCC builds go through Kokkos'
/// nvcc wrapper, Clang builds compile CUDA natively.
pub fn dependencies() -> DependencyTable {
    let mut table = DependencyTable::new()
        .depends_on(
            DependencyDescriptor::new("cmake").versions("3.16:").build_only(),
            Condition::Always,
        )
        .depends_on(
            DependencyDescriptor::new("mpi"),
            Condition::Equals("network", "mpi"),
        )
        // GASNet's build needs mpicc.
        .depends_on(
            DependencyDescriptor::new("mpi"),
            Condition::Equals("network", "gasnet"),
        )
        .depends_on(
            DependencyDescriptor::new("ucx"),
            Condition::Equals("conduit", "ucx"),
        )
        .depends_on(
            DependencyDescriptor::new("mpi"),
            Condition::Equals("conduit", "mpi"),
        )
        .depends_on(
            DependencyDescriptor::new("cuda").versions("10.0:11.9"),
            Condition::Enabled("cuda_unsupported_compiler"),
        )
        .depends_on(
            DependencyDescriptor::new("cuda").versions("10.0:11.9"),
            Condition::Enabled("cuda"),
        )
        .depends_on(
            DependencyDescriptor::new("hdf5"),
            Condition::Enabled("hdf5"),
        )
        .depends_on(
            DependencyDescriptor::new("hwloc"),
            Condition::Enabled("hwloc"),
        );

    for &arch in CUDA_ARCHS {
        for (family, wrapper) in [(CompilerFamily::Gcc, true), (CompilerFamily::Clang, false)] {
            let kokkos = DependencyDescriptor::new("kokkos")
                .versions(KOKKOS_VERSION)
                .on("cuda")
                .on("cuda_lambda");
            let kokkos = if wrapper {
                kokkos.on("wrapper")
            } else {
                kokkos.off("wrapper")
            };

            table = table.depends_on(
                kokkos.value("cuda_arch", arch),
                Condition::all([
                    Condition::Compiler(family),
                    Condition::Enabled("kokkos"),
                    Condition::Enabled("cuda"),
                    Condition::Equals("cuda_arch", arch),
                ]),
            );
        }
    }

    table
        .depends_on(
            DependencyDescriptor::new("kokkos")
                .versions(KOKKOS_VERSION)
                .off("cuda"),
            Condition::all([Condition::Enabled("kokkos"), Condition::Disabled("cuda")]),
        )
        .depends_on(
            DependencyDescriptor::new("kokkos")
                .versions(KOKKOS_VERSION)
                .off("cuda")
                .on("openmp"),
            Condition::all([Condition::Enabled("kokkos"), Condition::Enabled("openmp")]),
        )
        .depends_on(
            DependencyDescriptor::new("python").versions("3"),
            Condition::Enabled("python"),
        )
        .depends_on(
            DependencyDescriptor::new("papi"),
            Condition::Enabled("papi"),
        )
        .depends_on(
            DependencyDescriptor::new("zlib"),
            Condition::Enabled("zlib"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spec::{Compiler, Spec};
    use crate::core::variant::VariantValue;

    #[test]
    fn test_schema_defaults() {
        let schema = schema();
        assert_eq!(schema.len(), 28);

        let on_by_default: Vec<_> = schema
            .iter()
            .filter(|v| v.default == VariantValue::Bool(true))
            .map(|v| v.name)
            .collect();
        assert_eq!(on_by_default, vec!["libdl", "zlib"]);

        assert_eq!(
            schema.get("output_level").unwrap().default,
            VariantValue::Str("warning".to_string())
        );
        assert_eq!(
            schema.get("cuda_arch").unwrap().default,
            VariantValue::Str("70".to_string())
        );
        assert_eq!(
            schema.get("max_fields").unwrap().default,
            VariantValue::Int(512)
        );
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = constraints().rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "gasnet-root-requires-gasnet",
                "gasnet-requires-conduit",
                "conduit-requires-gasnet",
                "gasnet-debug-requires-gasnet",
                "cuda-hijack-requires-cuda",
            ]
        );
    }

    #[test]
    fn test_dependency_table_is_fully_enumerated() {
        let table = dependencies();
        let kokkos_cuda = table
            .rows()
            .iter()
            .filter(|row| row.dependency.name == "kokkos" && row.dependency.requires("cuda") == Some(true))
            .count();
        assert_eq!(kokkos_cuda, CUDA_ARCHS.len() * 2);
        assert_eq!(table.rows().len(), 9 + 8 + 5);
    }

    fn active(spec: &Spec) -> Vec<String> {
        let package = LegionPackage::new();
        let resolved = spec.resolve(&package.schema).unwrap();
        package
            .dependencies
            .active(&resolved)
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    #[test]
    fn test_default_dependencies() {
        assert_eq!(active(&Spec::default()), vec!["cmake@3.16:", "zlib"]);
    }

    #[test]
    fn test_kokkos_dependency_follows_compiler_and_arch() {
        let spec = Spec::default()
            .with("kokkos", true)
            .with("cuda", true)
            .with("cuda_arch", "75");
        let deps = active(&spec);
        assert!(deps.contains(&"kokkos@3.3.01+cuda+cuda_lambda+wrapper cuda_arch=75".to_string()));
        assert!(deps.contains(&"cuda@10.0:11.9".to_string()));
        assert_eq!(deps.iter().filter(|d| d.starts_with("kokkos")).count(), 1);

        let spec = spec.with_compiler(Compiler::clang());
        let deps = active(&spec);
        assert!(deps.contains(&"kokkos@3.3.01+cuda+cuda_lambda~wrapper cuda_arch=75".to_string()));

        let spec = Spec::default().with("kokkos", true).with("openmp", true);
        let deps = active(&spec);
        assert!(deps.contains(&"kokkos@3.3.01~cuda".to_string()));
        assert!(deps.contains(&"kokkos@3.3.01~cuda+openmp".to_string()));
    }

    #[test]
    fn test_network_dependencies() {
        let spec = Spec::default().with("network", "gasnet").with("conduit", "ucx");
        assert_eq!(active(&spec), vec!["cmake@3.16:", "mpi", "ucx", "zlib"]);
    }
}
